//! Retry scheduler for failed deliveries.
//!
//! One entry per notification, keyed to the channel that failed. Timers
//! are one-shot tasks that re-check map membership before executing, so
//! removing an entry cancels its pending timer without any timer
//! bookkeeping. The backoff table is fixed and clamped; attempt counts
//! never reset for a given notification.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use vendhub_core::config::DeliveryConfig;
use vendhub_core::types::id::NotificationId;
use vendhub_entity::notification::{ChannelAttempt, Notification};
use vendhub_store::{NotificationStore, UserDirectory};

use crate::channel::{ChannelKind, DeliveryChannel};
use crate::stats::DeliveryStats;

/// Pending retry state for one notification.
#[derive(Debug, Clone)]
pub struct RetryEntry {
    /// The channel being retried.
    pub channel: ChannelKind,
    /// Retry attempts executed so far.
    pub attempts: u32,
    /// When the next attempt is due.
    pub next_at: DateTime<Utc>,
    /// Set while an attempt is executing, to serialize per-id work.
    pub in_flight: bool,
}

/// Schedules and executes bounded delivery retries.
#[derive(Debug)]
pub struct RetryScheduler {
    config: DeliveryConfig,
    store: Arc<dyn NotificationStore>,
    users: Arc<dyn UserDirectory>,
    realtime: Arc<dyn DeliveryChannel>,
    email: Arc<dyn DeliveryChannel>,
    stats: Arc<DeliveryStats>,
    entries: DashMap<NotificationId, RetryEntry>,
}

impl RetryScheduler {
    /// Create a scheduler over the given collaborators.
    pub fn new(
        config: DeliveryConfig,
        store: Arc<dyn NotificationStore>,
        users: Arc<dyn UserDirectory>,
        realtime: Arc<dyn DeliveryChannel>,
        email: Arc<dyn DeliveryChannel>,
        stats: Arc<DeliveryStats>,
    ) -> Self {
        Self {
            config,
            store,
            users,
            realtime,
            email,
            stats,
            entries: DashMap::new(),
        }
    }

    /// Schedule a retry for a notification on the channel that failed.
    ///
    /// A notification already scheduled or in flight is left alone;
    /// exactly one retry chain exists per notification.
    pub fn schedule(self: &Arc<Self>, id: NotificationId, channel: ChannelKind) {
        if self.entries.contains_key(&id) {
            debug!(notification_id = %id, "Retry already scheduled, ignoring");
            return;
        }
        let delay_ms = self.config.delay_for_attempt(0);
        self.entries.insert(
            id,
            RetryEntry {
                channel,
                attempts: 0,
                next_at: Utc::now() + chrono::Duration::milliseconds(delay_ms as i64),
                in_flight: false,
            },
        );
        info!(
            notification_id = %id,
            channel = %channel,
            delay_ms,
            "Delivery retry scheduled"
        );
        self.arm_timer(id, delay_ms);
    }

    /// Cancel any pending retry for a notification.
    pub fn cancel(&self, id: NotificationId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Number of notifications with a pending retry.
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Current retry state for a notification.
    pub fn entry(&self, id: NotificationId) -> Option<RetryEntry> {
        self.entries.get(&id).map(|e| e.clone())
    }

    fn arm_timer(self: &Arc<Self>, id: NotificationId, delay_ms: u64) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            this.execute(id).await;
        });
    }

    /// Execute the pending retry for a notification.
    ///
    /// A no-op if the entry was removed since the timer was armed, or if
    /// another attempt for the same id is already in flight.
    pub async fn execute(self: &Arc<Self>, id: NotificationId) {
        let (channel, attempt_no) = {
            let Some(mut entry) = self.entries.get_mut(&id) else {
                return;
            };
            if entry.in_flight {
                return;
            }
            entry.in_flight = true;
            entry.attempts += 1;
            (entry.channel, entry.attempts)
        };

        self.stats.record_retry();

        let Ok(Some(mut notification)) = self.store.find_by_id(id).await else {
            debug!(notification_id = %id, "Notification gone, dropping retry");
            self.entries.remove(&id);
            return;
        };
        let Ok(Some(user)) = self.users.find_by_id(notification.user_id).await else {
            debug!(notification_id = %id, "Recipient gone, dropping retry");
            self.entries.remove(&id);
            return;
        };

        let adapter = match channel {
            ChannelKind::Realtime => &self.realtime,
            ChannelKind::Email => &self.email,
        };
        let result = adapter.deliver(&notification, &user).await;
        notification.delivery.attempts += 1;

        match result {
            Ok(()) => {
                self.record_success(&mut notification, channel);
                self.entries.remove(&id);
                self.persist(&notification).await;
                info!(
                    notification_id = %id,
                    channel = %channel,
                    attempt = attempt_no,
                    "Retry delivered"
                );
            }
            Err(err) => {
                let outcome = ChannelAttempt::failed(err.message.clone());
                match channel {
                    ChannelKind::Realtime => notification.delivery.realtime = outcome,
                    ChannelKind::Email => notification.delivery.email = outcome,
                }
                if attempt_no >= self.config.max_retry_attempts {
                    notification.delivery.permanently_failed = true;
                    self.entries.remove(&id);
                    self.stats.record_permanent_failure();
                    self.persist(&notification).await;
                    warn!(
                        notification_id = %id,
                        channel = %channel,
                        attempts = attempt_no,
                        "Retries exhausted, delivery permanently failed"
                    );
                } else {
                    self.persist(&notification).await;
                    let delay_ms = self.config.delay_for_attempt(attempt_no);
                    if let Some(mut entry) = self.entries.get_mut(&id) {
                        entry.in_flight = false;
                        entry.next_at =
                            Utc::now() + chrono::Duration::milliseconds(delay_ms as i64);
                    }
                    debug!(
                        notification_id = %id,
                        channel = %channel,
                        attempt = attempt_no,
                        next_delay_ms = delay_ms,
                        "Retry failed, rescheduling"
                    );
                    self.arm_timer(id, delay_ms);
                }
            }
        }
    }

    fn record_success(&self, notification: &mut Notification, channel: ChannelKind) {
        let outcome = ChannelAttempt::succeeded();
        match channel {
            ChannelKind::Realtime => {
                notification.delivery.realtime = outcome;
                self.stats.record_realtime_delivery();
            }
            ChannelKind::Email => {
                notification.delivery.email = outcome;
                self.stats.record_email_delivery();
            }
        }
        notification.delivery.retry_succeeded_at = Some(Utc::now());
    }

    async fn persist(&self, notification: &Notification) {
        if let Err(err) = self.store.save(notification).await {
            warn!(
                notification_id = %notification.id,
                error = %err,
                "Failed to persist retry outcome"
            );
        }
    }
}
