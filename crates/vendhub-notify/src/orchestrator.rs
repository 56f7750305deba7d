//! Notification creation and fallback delivery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use vendhub_core::AppResult;
use vendhub_core::config::DeliveryConfig;
use vendhub_core::types::id::UserId;
use vendhub_entity::notification::{
    ChannelAttempt, Notification, NotificationKind, NotificationPriority,
};
use vendhub_entity::user::User;
use vendhub_store::NotificationStore;

use crate::channel::{ChannelKind, DeliveryChannel};
use crate::preferences::PreferenceResolver;
use crate::retry::RetryScheduler;
use crate::stats::DeliveryStats;

/// Which channels the caller wants for a notification.
///
/// Flags are ANDed with the recipient's effective preferences: a caller
/// can suppress a channel the recipient enabled, but never force one the
/// recipient disabled.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryFlags {
    /// Attempt real-time push.
    pub realtime: bool,
    /// Attempt email.
    pub email: bool,
}

impl Default for DeliveryFlags {
    fn default() -> Self {
        Self {
            realtime: true,
            email: false,
        }
    }
}

impl DeliveryFlags {
    /// Persist the record without attempting any channel. Used by
    /// broadcasts, which fan out over rooms instead.
    pub fn suppressed() -> Self {
        Self {
            realtime: false,
            email: false,
        }
    }

    /// Real-time push plus an explicit email.
    pub fn realtime_and_email() -> Self {
        Self {
            realtime: true,
            email: true,
        }
    }
}

/// One notification to create and deliver.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    /// The recipient.
    pub recipient: UserId,
    /// Notification kind, already validated against the closed enum.
    pub kind: NotificationKind,
    /// Title.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Structured metadata.
    pub metadata: serde_json::Value,
    /// Priority override; the kind's default applies when absent.
    pub priority: Option<NotificationPriority>,
    /// Expiry timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Requested channels.
    pub channels: DeliveryFlags,
}

impl NotificationRequest {
    /// A request with default channels and no metadata.
    pub fn new(
        recipient: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            metadata: serde_json::Value::Null,
            priority: None,
            expires_at: None,
            channels: DeliveryFlags::default(),
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

    /// Set an expiry.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Set the requested channels.
    pub fn with_channels(mut self, channels: DeliveryFlags) -> Self {
        self.channels = channels;
        self
    }
}

/// Creates notifications and runs fallback delivery.
///
/// Store failures during the initial persist propagate to the caller.
/// Channel failures never do: they are written into the notification's
/// delivery record and, where delivery was expected, handed to the
/// retry scheduler.
#[derive(Debug)]
pub struct NotificationOrchestrator {
    store: Arc<dyn NotificationStore>,
    preferences: PreferenceResolver,
    realtime: Arc<dyn DeliveryChannel>,
    email: Arc<dyn DeliveryChannel>,
    retry: Arc<RetryScheduler>,
    stats: Arc<DeliveryStats>,
    config: DeliveryConfig,
}

impl NotificationOrchestrator {
    /// Wire an orchestrator from its collaborators.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        preferences: PreferenceResolver,
        realtime: Arc<dyn DeliveryChannel>,
        email: Arc<dyn DeliveryChannel>,
        retry: Arc<RetryScheduler>,
        stats: Arc<DeliveryStats>,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            store,
            preferences,
            realtime,
            email,
            retry,
            stats,
            config,
        }
    }

    /// Delivery statistics shared with the retry scheduler.
    pub fn stats(&self) -> &Arc<DeliveryStats> {
        &self.stats
    }

    /// The retry scheduler, for cancellation on deletes.
    pub fn retry(&self) -> &Arc<RetryScheduler> {
        &self.retry
    }

    /// Create, persist, and deliver one notification.
    ///
    /// Returns the notification with per-channel outcomes attached.
    pub async fn create_notification(
        &self,
        request: NotificationRequest,
    ) -> AppResult<Notification> {
        let (user, snapshot) = self.preferences.resolve(request.recipient).await?;

        let allowed = snapshot.allows_kind(request.kind);
        let requested_realtime = request.channels.realtime && allowed;
        let want_realtime = requested_realtime && snapshot.realtime;
        let email_available = snapshot.email && allowed && self.email.is_enabled();
        let want_email = request.channels.email && email_available;
        let fallback_available = self.config.email_fallback && email_available;

        let mut notification = Notification::new(
            user.id,
            request.kind,
            request.title,
            request.message,
            request.metadata,
        );
        if let Some(priority) = request.priority {
            notification.priority = priority;
        }
        notification.expires_at = request.expires_at;

        self.store.create(&notification).await?;
        self.stats.record_created();
        debug!(
            notification_id = %notification.id,
            user_id = %user.id,
            kind = %notification.kind,
            "Notification persisted"
        );

        self.deliver_with_fallback(
            &mut notification,
            &user,
            requested_realtime,
            want_realtime,
            want_email,
            fallback_available,
        )
        .await;

        if notification.delivery.attempts > 0 {
            if let Err(err) = self.store.save(&notification).await {
                warn!(
                    notification_id = %notification.id,
                    error = %err,
                    "Failed to persist delivery outcome"
                );
            }
        }

        Ok(notification)
    }

    /// Real-time first, email as explicit request or as fallback.
    async fn deliver_with_fallback(
        &self,
        notification: &mut Notification,
        user: &User,
        requested_realtime: bool,
        want_realtime: bool,
        want_email: bool,
        fallback_available: bool,
    ) {
        if !want_realtime && !want_email && !(requested_realtime && fallback_available) {
            debug!(
                notification_id = %notification.id,
                user_id = %user.id,
                "No effective delivery channel, record kept silent"
            );
            return;
        }

        notification.delivery.attempts += 1;

        let mut realtime_ok = false;
        if want_realtime {
            match self.realtime.deliver(notification, user).await {
                Ok(()) => {
                    notification.delivery.realtime = ChannelAttempt::succeeded();
                    realtime_ok = true;
                    self.stats.record_realtime_delivery();
                    info!(
                        notification_id = %notification.id,
                        user_id = %user.id,
                        channel = "realtime",
                        "Delivered"
                    );
                }
                Err(err) => {
                    notification.delivery.realtime = ChannelAttempt::failed(err.message.clone());
                    warn!(
                        notification_id = %notification.id,
                        user_id = %user.id,
                        channel = "realtime",
                        error = %err,
                        "Delivery attempt failed"
                    );
                }
            }
        }

        // Email runs when explicitly requested, or as a fallback when the
        // real-time leg was requested but did not get through.
        let email_leg = want_email || (requested_realtime && !realtime_ok && fallback_available);
        let is_fallback = email_leg && !want_email;

        if email_leg {
            match self.email.deliver(notification, user).await {
                Ok(()) => {
                    notification.delivery.email = ChannelAttempt::succeeded();
                    notification.delivery.fallback_used = is_fallback;
                    self.stats.record_email_delivery();
                    if is_fallback {
                        self.stats.record_fallback();
                    }
                    info!(
                        notification_id = %notification.id,
                        user_id = %user.id,
                        channel = "email",
                        fallback = is_fallback,
                        "Delivered"
                    );
                }
                Err(err) => {
                    notification.delivery.email = ChannelAttempt::failed(err.message.clone());
                    if is_fallback {
                        notification.delivery.fallback_used = true;
                    }
                    warn!(
                        notification_id = %notification.id,
                        user_id = %user.id,
                        channel = "email",
                        error = %err,
                        "Delivery attempt failed"
                    );
                }
            }
        }

        if !notification.delivery.delivered() {
            // One retry chain, keyed to the failed channel. Real-time is
            // preferred when it was effective.
            let channel = if want_realtime {
                ChannelKind::Realtime
            } else {
                ChannelKind::Email
            };
            self.retry.schedule(notification.id, channel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendhub_entity::user::{NotificationPreferences, UserRole};
    use vendhub_store::memory::{
        MemoryNotificationStore, MemoryUserDirectory, MemoryVendorDirectory,
    };

    use crate::test_support::ScriptedChannel;

    struct Fixture {
        orchestrator: NotificationOrchestrator,
        store: Arc<MemoryNotificationStore>,
        realtime: Arc<ScriptedChannel>,
        email: Arc<ScriptedChannel>,
        user: User,
    }

    fn fixture() -> Fixture {
        fixture_with_user(User::new("u@test", "U", UserRole::Customer))
    }

    fn fixture_with_user(user: User) -> Fixture {
        let store = Arc::new(MemoryNotificationStore::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let vendors = Arc::new(MemoryVendorDirectory::new());
        let realtime = Arc::new(ScriptedChannel::new(ChannelKind::Realtime));
        let email = Arc::new(ScriptedChannel::new(ChannelKind::Email));
        let stats = Arc::new(DeliveryStats::new());

        users.insert(user.clone());

        let retry = Arc::new(RetryScheduler::new(
            DeliveryConfig::default(),
            store.clone(),
            users.clone(),
            realtime.clone(),
            email.clone(),
            stats.clone(),
        ));
        let orchestrator = NotificationOrchestrator::new(
            store.clone(),
            PreferenceResolver::new(users.clone(), vendors),
            realtime.clone(),
            email.clone(),
            retry,
            stats,
            DeliveryConfig::default(),
        );
        Fixture {
            orchestrator,
            store,
            realtime,
            email,
            user,
        }
    }

    fn request(f: &Fixture) -> NotificationRequest {
        NotificationRequest::new(f.user.id, NotificationKind::General, "Title", "Body")
    }

    #[tokio::test]
    async fn test_created_notification_is_persisted_unread() {
        let f = fixture();
        let created = f.orchestrator.create_notification(request(&f)).await.unwrap();

        assert!(created.is_unread());
        assert!(created.read_at.is_none());
        let stored = f.store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(stored.is_unread());
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_rejected_without_persist() {
        let f = fixture();
        let req =
            NotificationRequest::new(UserId::new(), NotificationKind::General, "t", "m");
        let err = f.orchestrator.create_notification(req).await.unwrap_err();
        assert_eq!(err.kind, vendhub_core::error::ErrorKind::NotFound);
        assert!(f.store.find_permanently_failed().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_realtime_success_skips_email() {
        let f = fixture();
        let created = f.orchestrator.create_notification(request(&f)).await.unwrap();

        assert!(created.delivery.realtime.success);
        assert!(!created.delivery.email.attempted);
        assert!(!created.delivery.fallback_used);
        assert_eq!(f.email.attempts(), 0);
    }

    #[tokio::test]
    async fn test_realtime_failure_falls_back_to_email() {
        let f = fixture();
        f.realtime.script(vec![Err("offline")]);

        let created = f.orchestrator.create_notification(request(&f)).await.unwrap();

        assert!(!created.delivery.realtime.success);
        assert!(created.delivery.realtime.attempted);
        assert!(created.delivery.email.success);
        assert!(created.delivery.fallback_used);
        assert_eq!(created.delivery.attempts, 1);
    }

    #[tokio::test]
    async fn test_explicit_email_runs_even_after_realtime_success() {
        let f = fixture();
        let req = request(&f).with_channels(DeliveryFlags::realtime_and_email());
        let created = f.orchestrator.create_notification(req).await.unwrap();

        assert!(created.delivery.realtime.success);
        assert!(created.delivery.email.success);
        // An explicitly requested email is not a fallback.
        assert!(!created.delivery.fallback_used);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_schedules_one_realtime_retry() {
        let f = fixture();
        f.realtime.script(vec![Err("offline")]);
        f.email.script(vec![Err("smtp down")]);

        let created = f.orchestrator.create_notification(request(&f)).await.unwrap();

        assert!(!created.delivery.delivered());
        assert_eq!(f.orchestrator.retry().pending(), 1);
        let entry = f.orchestrator.retry().entry(created.id).unwrap();
        assert_eq!(entry.channel, ChannelKind::Realtime);
    }

    #[tokio::test]
    async fn test_caller_cannot_force_disabled_channel() {
        let user = User::new("quiet@test", "Quiet", UserRole::Customer).with_preferences(
            NotificationPreferences {
                push_enabled: false,
                email_enabled: false,
                ..Default::default()
            },
        );
        let f = fixture_with_user(user);
        let req = request(&f).with_channels(DeliveryFlags::realtime_and_email());
        let created = f.orchestrator.create_notification(req).await.unwrap();

        assert_eq!(f.realtime.attempts(), 0);
        assert_eq!(f.email.attempts(), 0);
        assert_eq!(created.delivery.attempts, 0);
        // Delivery was never expected, so no failure marker and no retry.
        assert!(!created.delivery.permanently_failed);
        assert_eq!(f.orchestrator.retry().pending(), 0);
    }

    #[tokio::test]
    async fn test_kind_preference_gates_delivery() {
        let user = User::new("nostock@test", "NoStock", UserRole::Customer).with_preferences(
            NotificationPreferences {
                low_stock: false,
                ..Default::default()
            },
        );
        let f = fixture_with_user(user);
        let req = NotificationRequest::new(
            f.user.id,
            NotificationKind::LowStock,
            "Low stock",
            "Only 2 left",
        );
        let created = f.orchestrator.create_notification(req).await.unwrap();

        assert_eq!(f.realtime.attempts(), 0);
        assert_eq!(created.delivery.attempts, 0);
        // The record still exists for the in-app list.
        assert!(f.store.find_by_id(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_suppressed_flags_persist_without_delivery() {
        let f = fixture();
        let req = request(&f).with_channels(DeliveryFlags::suppressed());
        let created = f.orchestrator.create_notification(req).await.unwrap();

        assert_eq!(f.realtime.attempts(), 0);
        assert_eq!(f.email.attempts(), 0);
        assert!(f.store.find_by_id(created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_priority_override_and_default() {
        let f = fixture();
        let defaulted = f
            .orchestrator
            .create_notification(NotificationRequest::new(
                f.user.id,
                NotificationKind::SystemMaintenance,
                "Maintenance",
                "Sunday 02:00",
            ))
            .await
            .unwrap();
        assert_eq!(defaulted.priority, NotificationPriority::Urgent);

        let overridden = f
            .orchestrator
            .create_notification(request(&f).with_priority(NotificationPriority::High))
            .await
            .unwrap();
        assert_eq!(overridden.priority, NotificationPriority::High);
    }
}
