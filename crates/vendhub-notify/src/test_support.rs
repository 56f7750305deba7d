//! Shared test doubles for the collaborator traits.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::traits::RoomTransport;
use vendhub_core::traits::email::{EmailSender, OutgoingEmail};
use vendhub_core::types::id::{NotificationId, UserId};
use vendhub_entity::notification::Notification;
use vendhub_entity::user::User;

use crate::channel::{ChannelKind, DeliveryChannel};

fn lock<'a, T>(m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Email sender that records every message and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<OutgoingEmail>>,
    failures_remaining: Mutex<u32>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` sends fail.
    pub fn fail_next(&self, n: u32) {
        *lock(&self.failures_remaining) = n;
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        let mut failures = lock(&self.failures_remaining);
        if *failures > 0 {
            *failures -= 1;
            return Err(AppError::delivery("SMTP transport refused the message"));
        }
        drop(failures);
        lock(&self.sent).push(email.clone());
        Ok(())
    }
}

/// Channel adapter driven by a script of outcomes.
///
/// Pops one scripted result per `deliver` call; once the script is
/// exhausted every call succeeds.
#[derive(Debug)]
pub struct ScriptedChannel {
    kind: ChannelKind,
    enabled: bool,
    script: Mutex<Vec<Result<(), String>>>,
    delivered: Mutex<Vec<NotificationId>>,
}

impl ScriptedChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            enabled: true,
            script: Mutex::new(Vec::new()),
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn disabled(kind: ChannelKind) -> Self {
        Self {
            enabled: false,
            ..Self::new(kind)
        }
    }

    /// Queue outcomes for upcoming calls, in order.
    pub fn script(&self, outcomes: Vec<Result<(), &str>>) {
        let mut script = lock(&self.script);
        *script = outcomes
            .into_iter()
            .map(|o| o.map_err(String::from))
            .collect();
        script.reverse();
    }

    /// How many `deliver` calls were made.
    pub fn attempts(&self) -> usize {
        lock(&self.delivered).len()
    }

    /// Notification ids passed to `deliver`, in call order.
    pub fn seen(&self) -> Vec<NotificationId> {
        lock(&self.delivered).clone()
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn deliver(&self, notification: &Notification, _recipient: &User) -> AppResult<()> {
        lock(&self.delivered).push(notification.id);
        match lock(&self.script).pop() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(msg)) => Err(AppError::delivery(msg)),
        }
    }
}

/// A recorded transport emission.
#[derive(Debug, Clone)]
pub struct Emission {
    pub target: String,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Transport double with a configurable reachable-user set.
#[derive(Debug, Default)]
pub struct StubTransport {
    reachable: Mutex<HashSet<UserId>>,
    emissions: Mutex<Vec<Emission>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_reachable(&self, user_id: UserId) {
        lock(&self.reachable).insert(user_id);
    }

    pub fn emissions(&self) -> Vec<Emission> {
        lock(&self.emissions).clone()
    }

    fn record(&self, target: String, event: &str, payload: &serde_json::Value) {
        lock(&self.emissions).push(Emission {
            target,
            event: event.to_string(),
            payload: payload.clone(),
        });
    }
}

#[async_trait]
impl RoomTransport for StubTransport {
    async fn emit_to_user(
        &self,
        user_id: UserId,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64> {
        self.record(format!("user:{user_id}"), event, payload);
        Ok(u64::from(lock(&self.reachable).contains(&user_id)))
    }

    async fn emit_to_room(
        &self,
        room: &str,
        event: &str,
        payload: &serde_json::Value,
    ) -> AppResult<u64> {
        self.record(room.to_string(), event, payload);
        Ok(1)
    }

    async fn emit_to_all(&self, event: &str, payload: &serde_json::Value) -> AppResult<u64> {
        self.record("*".to_string(), event, payload);
        Ok(lock(&self.reachable).len() as u64)
    }

    fn is_reachable(&self, user_id: UserId) -> bool {
        lock(&self.reachable).contains(&user_id)
    }

    fn live_connection_ids(&self) -> Vec<Uuid> {
        Vec::new()
    }
}
