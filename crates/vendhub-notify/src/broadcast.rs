//! Broadcast operations.
//!
//! A broadcast creates one persistent record per resolved recipient with
//! channel delivery suppressed, then fans out over the real-time layer
//! with a single emission per targeted room. Recipients hear the event
//! once through their room; their unread list carries the record.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::traits::RoomTransport;
use vendhub_core::types::id::UserId;
use vendhub_entity::notification::{NotificationKind, NotificationPriority};
use vendhub_entity::user::{PreferenceKind, UserRole};
use vendhub_entity::vendor::VendorStatus;

use crate::orchestrator::{DeliveryFlags, NotificationOrchestrator, NotificationRequest};
use crate::targeting::{BroadcastTarget, TargetingResolver};

/// Event name used for broadcast fan-out.
pub const ANNOUNCEMENT_EVENT: &str = "announcement";

/// One broadcast to run.
#[derive(Debug, Clone)]
pub struct BroadcastRequest {
    /// Who receives it.
    pub target: BroadcastTarget,
    /// Notification kind for the per-recipient records.
    pub kind: NotificationKind,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Structured metadata, copied onto every record and the fan-out
    /// payload.
    pub metadata: serde_json::Value,
    /// Priority override.
    pub priority: Option<NotificationPriority>,
    /// Run at this time instead of immediately.
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl BroadcastRequest {
    /// A broadcast with no metadata, run immediately.
    pub fn new(
        target: BroadcastTarget,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target,
            kind,
            title: title.into(),
            message: message.into(),
            metadata: serde_json::Value::Null,
            priority: None,
            scheduled_at: None,
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Override the priority.
    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Defer execution until the given time.
    pub fn scheduled_for(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }
}

/// What a broadcast did.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BroadcastOutcome {
    /// Recipients the target resolved to.
    pub recipients: usize,
    /// Records successfully created.
    pub created: usize,
    /// Connections the room fan-out reached.
    pub connections_reached: u64,
    /// Per-dimension and per-recipient failures. Partial failure does
    /// not abort the broadcast.
    pub errors: Vec<String>,
    /// Set when execution was deferred to a future timestamp.
    pub deferred: bool,
}

/// Runs broadcasts: targeting, record creation, room fan-out.
#[derive(Debug)]
pub struct Broadcaster {
    orchestrator: Arc<NotificationOrchestrator>,
    resolver: TargetingResolver,
    transport: Arc<dyn RoomTransport>,
}

impl Broadcaster {
    /// Wire a broadcaster from its collaborators.
    pub fn new(
        orchestrator: Arc<NotificationOrchestrator>,
        resolver: TargetingResolver,
        transport: Arc<dyn RoomTransport>,
    ) -> Self {
        Self {
            orchestrator,
            resolver,
            transport,
        }
    }

    /// Run (or defer) a broadcast.
    pub async fn orchestrate_broadcast(
        self: &Arc<Self>,
        request: BroadcastRequest,
    ) -> AppResult<BroadcastOutcome> {
        if request.target.is_empty() {
            return Err(AppError::targeting(
                "Broadcast target carries no criteria",
            ));
        }

        if let Some(at) = request.scheduled_at {
            let delay = at - Utc::now();
            if delay > chrono::Duration::zero() {
                let this = Arc::clone(self);
                let deferred = BroadcastRequest {
                    scheduled_at: None,
                    ..request
                };
                info!(run_at = %at, "Broadcast deferred");
                // The deferred request has its schedule cleared, so the
                // spawned task runs it directly instead of re-entering
                // the scheduling path.
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(
                        delay.num_milliseconds().max(0) as u64,
                    ))
                    .await;
                    if let Err(err) = this.run(deferred).await {
                        warn!(error = %err, "Deferred broadcast failed");
                    }
                });
                return Ok(BroadcastOutcome {
                    deferred: true,
                    ..Default::default()
                });
            }
        }

        self.run(request).await
    }

    async fn run(&self, request: BroadcastRequest) -> AppResult<BroadcastOutcome> {
        let resolution = self.resolver.resolve(&request.target).await?;
        let mut outcome = BroadcastOutcome {
            recipients: resolution.recipients.len(),
            errors: resolution.errors,
            ..Default::default()
        };

        for recipient in &resolution.recipients {
            let mut req = NotificationRequest::new(
                recipient.id,
                request.kind,
                request.title.clone(),
                request.message.clone(),
            )
            .with_metadata(request.metadata.clone())
            .with_channels(DeliveryFlags::suppressed());
            if let Some(priority) = request.priority {
                req = req.with_priority(priority);
            }
            match self.orchestrator.create_notification(req).await {
                Ok(_) => outcome.created += 1,
                Err(err) => outcome.errors.push(format!("recipient {}: {err}", recipient.id)),
            }
        }

        outcome.connections_reached = self.fan_out(&request, &mut outcome.errors).await;
        self.orchestrator.stats().record_broadcast();

        info!(
            kind = %request.kind,
            recipients = outcome.recipients,
            created = outcome.created,
            connections = outcome.connections_reached,
            errors = outcome.errors.len(),
            "Broadcast completed"
        );
        Ok(outcome)
    }

    /// One emission per targeted room; explicit ids go through their
    /// personal user rooms.
    async fn fan_out(&self, request: &BroadcastRequest, errors: &mut Vec<String>) -> u64 {
        let payload = serde_json::json!({
            "kind": request.kind,
            "title": request.title,
            "message": request.message,
            "metadata": request.metadata,
            "priority": request.priority.unwrap_or_else(|| request.kind.default_priority()),
        });

        let mut reached = 0u64;
        let mut emit = |result: AppResult<u64>, room: String| match result {
            Ok(count) => reached += count,
            Err(err) => errors.push(format!("fan-out {room}: {err}")),
        };

        if request.target.all_users {
            let result = self.transport.emit_to_all(ANNOUNCEMENT_EVENT, &payload).await;
            emit(result, "*".to_string());
            return reached;
        }

        for role in &request.target.roles {
            let room = format!("role:{role}");
            let result = self
                .transport
                .emit_to_room(&room, ANNOUNCEMENT_EVENT, &payload)
                .await;
            emit(result, room);
        }
        for status in &request.target.vendor_statuses {
            let room = format!("vendor-status:{status}");
            let result = self
                .transport
                .emit_to_room(&room, ANNOUNCEMENT_EVENT, &payload)
                .await;
            emit(result, room);
        }
        for preference in &request.target.preferences {
            let room = format!("pref:{preference}");
            let result = self
                .transport
                .emit_to_room(&room, ANNOUNCEMENT_EVENT, &payload)
                .await;
            emit(result, room);
        }
        for location in &request.target.locations {
            let room = format!("location:{location}");
            let result = self
                .transport
                .emit_to_room(&room, ANNOUNCEMENT_EVENT, &payload)
                .await;
            emit(result, room);
        }
        for user_id in &request.target.user_ids {
            let result = self
                .transport
                .emit_to_user(*user_id, ANNOUNCEMENT_EVENT, &payload)
                .await;
            emit(result, format!("user:{user_id}"));
        }

        reached
    }

    /// Broadcast to every user holding a role.
    pub async fn broadcast_to_role(
        self: &Arc<Self>,
        role: UserRole,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> AppResult<BroadcastOutcome> {
        self.orchestrate_broadcast(BroadcastRequest::new(
            BroadcastTarget::role(role),
            kind,
            title,
            message,
        ))
        .await
    }

    /// Broadcast to owners of vendors in a status.
    pub async fn broadcast_to_vendor_status(
        self: &Arc<Self>,
        status: VendorStatus,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> AppResult<BroadcastOutcome> {
        self.orchestrate_broadcast(BroadcastRequest::new(
            BroadcastTarget::vendor_status(status),
            kind,
            title,
            message,
        ))
        .await
    }

    /// Broadcast to every user with a preference enabled.
    pub async fn broadcast_to_preference(
        self: &Arc<Self>,
        preference: PreferenceKind,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> AppResult<BroadcastOutcome> {
        self.orchestrate_broadcast(BroadcastRequest::new(
            BroadcastTarget::preference(preference),
            kind,
            title,
            message,
        ))
        .await
    }

    /// Broadcast to explicit recipients.
    pub async fn broadcast_targeted(
        self: &Arc<Self>,
        user_ids: Vec<UserId>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> AppResult<BroadcastOutcome> {
        self.orchestrate_broadcast(BroadcastRequest::new(
            BroadcastTarget::users(user_ids),
            kind,
            title,
            message,
        ))
        .await
    }

    /// Broadcast to every user.
    pub async fn broadcast_system_announcement(
        self: &Arc<Self>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> AppResult<BroadcastOutcome> {
        self.orchestrate_broadcast(
            BroadcastRequest::new(
                BroadcastTarget::everyone(),
                NotificationKind::SystemMaintenance,
                title,
                message,
            )
            .with_priority(NotificationPriority::Urgent),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_core::config::DeliveryConfig;
    use vendhub_entity::user::User;
    use vendhub_store::NotificationStore;
    use vendhub_store::memory::{
        MemoryNotificationStore, MemoryUserDirectory, MemoryVendorDirectory,
    };

    use crate::channel::ChannelKind;
    use crate::preferences::PreferenceResolver;
    use crate::retry::RetryScheduler;
    use crate::stats::DeliveryStats;
    use crate::test_support::{ScriptedChannel, StubTransport};

    struct Fixture {
        broadcaster: Arc<Broadcaster>,
        store: Arc<MemoryNotificationStore>,
        users: Arc<MemoryUserDirectory>,
        transport: Arc<StubTransport>,
        realtime: Arc<ScriptedChannel>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryNotificationStore::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let vendors = Arc::new(MemoryVendorDirectory::new());
        let transport = Arc::new(StubTransport::new());
        let realtime = Arc::new(ScriptedChannel::new(ChannelKind::Realtime));
        let email = Arc::new(ScriptedChannel::new(ChannelKind::Email));
        let stats = Arc::new(DeliveryStats::new());

        let retry = Arc::new(RetryScheduler::new(
            DeliveryConfig::default(),
            store.clone(),
            users.clone(),
            realtime.clone(),
            email.clone(),
            stats.clone(),
        ));
        let orchestrator = Arc::new(NotificationOrchestrator::new(
            store.clone(),
            PreferenceResolver::new(users.clone(), vendors.clone()),
            realtime.clone(),
            email,
            retry,
            stats,
            DeliveryConfig::default(),
        ));
        let broadcaster = Arc::new(Broadcaster::new(
            orchestrator,
            TargetingResolver::new(users.clone(), vendors),
            transport.clone(),
        ));
        Fixture {
            broadcaster,
            store,
            users,
            transport,
            realtime,
        }
    }

    #[tokio::test]
    async fn test_role_broadcast_creates_records_and_one_room_emission() {
        let f = fixture();
        let a = User::new("a1@test", "A1", UserRole::Admin);
        let b = User::new("a2@test", "A2", UserRole::Admin);
        f.users.insert(a.clone());
        f.users.insert(b.clone());

        let outcome = f
            .broadcaster
            .broadcast_to_role(
                UserRole::Admin,
                NotificationKind::General,
                "Policy update",
                "Review the new listing rules.",
            )
            .await
            .unwrap();

        assert_eq!(outcome.recipients, 2);
        assert_eq!(outcome.created, 2);
        assert!(outcome.errors.is_empty());

        // Per-recipient records exist but never went through the
        // per-user realtime channel.
        assert_eq!(f.realtime.attempts(), 0);
        assert_eq!(f.store.find_for_user(a.id).await.unwrap().len(), 1);
        assert_eq!(f.store.find_for_user(b.id).await.unwrap().len(), 1);

        // Exactly one room emission.
        let emissions = f.transport.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].target, "role:admin");
        assert_eq!(emissions[0].event, ANNOUNCEMENT_EVENT);
    }

    #[tokio::test]
    async fn test_broadcast_deduplicates_recipients() {
        let f = fixture();
        let admin = User::new("a@test", "A", UserRole::Admin);
        f.users.insert(admin.clone());

        let target = BroadcastTarget::role(UserRole::Admin).with_users(vec![admin.id]);
        let outcome = f
            .broadcaster
            .orchestrate_broadcast(BroadcastRequest::new(
                target,
                NotificationKind::General,
                "t",
                "m",
            ))
            .await
            .unwrap();

        assert_eq!(outcome.recipients, 1);
        assert_eq!(outcome.created, 1);
        assert_eq!(f.store.find_for_user(admin.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_target_rejected() {
        let f = fixture();
        let err = f
            .broadcaster
            .orchestrate_broadcast(BroadcastRequest::new(
                BroadcastTarget::default(),
                NotificationKind::General,
                "t",
                "m",
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind, vendhub_core::error::ErrorKind::Targeting);
    }

    #[tokio::test]
    async fn test_system_announcement_uses_global_emission() {
        let f = fixture();
        f.users.insert(User::new("x@test", "X", UserRole::Customer));

        let outcome = f
            .broadcaster
            .broadcast_system_announcement("Maintenance", "Sunday 02:00 UTC")
            .await
            .unwrap();

        assert_eq!(outcome.created, 1);
        let emissions = f.transport.emissions();
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].target, "*");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_broadcast_runs_later() {
        let f = fixture();
        let user = User::new("late@test", "Late", UserRole::Customer);
        f.users.insert(user.clone());

        let request = BroadcastRequest::new(
            BroadcastTarget::users(vec![user.id]),
            NotificationKind::General,
            "Later",
            "This arrives in a minute.",
        )
        .scheduled_for(Utc::now() + chrono::Duration::seconds(60));

        let outcome = f.broadcaster.orchestrate_broadcast(request).await.unwrap();
        assert!(outcome.deferred);
        assert!(f.store.find_for_user(user.id).await.unwrap().is_empty());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(f.store.find_for_user(user.id).await.unwrap().len(), 1);
    }
}
