//! End-to-end notification flow tests over the full in-process stack:
//! memory stores, connection registry, local transport, channels,
//! orchestrator, broadcaster, and the domain event router.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use vendhub_core::AppResult;
use vendhub_core::config::{AppConfig, DeliveryConfig};
use vendhub_core::events::{DomainEvent, EventPayload, OrderEvent};
use vendhub_core::traits::RoomTransport;
use vendhub_core::traits::email::{EmailSender, OutgoingEmail};
use vendhub_core::types::id::OrderId;
use vendhub_entity::notification::NotificationKind;
use vendhub_entity::user::{User, UserRole};
use vendhub_entity::vendor::{Vendor, VendorStatus};
use vendhub_notify::channel::{EmailChannel, RealtimeChannel};
use vendhub_notify::preferences::PreferenceResolver;
use vendhub_notify::retry::RetryScheduler;
use vendhub_notify::targeting::TargetingResolver;
use vendhub_notify::{
    Broadcaster, DeliveryStats, EventRouter, NotificationOrchestrator, NotificationRequest,
};
use vendhub_realtime::{ConnectionRegistry, LocalTransport, OutboundMessage};
use vendhub_store::NotificationStore;
use vendhub_store::memory::{MemoryNotificationStore, MemoryUserDirectory, MemoryVendorDirectory};

#[derive(Debug, Default)]
struct RecordingEmailSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingEmailSender {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to.clone(), email.subject.clone()));
        Ok(())
    }
}

struct Stack {
    store: Arc<MemoryNotificationStore>,
    users: Arc<MemoryUserDirectory>,
    vendors: Arc<MemoryVendorDirectory>,
    registry: Arc<ConnectionRegistry>,
    orchestrator: Arc<NotificationOrchestrator>,
    broadcaster: Arc<Broadcaster>,
    router: EventRouter,
    emails: Arc<RecordingEmailSender>,
}

fn stack() -> Stack {
    let config = AppConfig::default();
    let store = Arc::new(MemoryNotificationStore::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let vendors = Arc::new(MemoryVendorDirectory::new());

    let registry = Arc::new(ConnectionRegistry::new(config.realtime.clone()));
    let transport: Arc<dyn RoomTransport> = Arc::new(LocalTransport::new(Arc::clone(&registry)));

    let emails = Arc::new(RecordingEmailSender::default());
    let realtime_channel = Arc::new(RealtimeChannel::new(Arc::clone(&transport)));
    let email_channel = Arc::new(EmailChannel::new(emails.clone(), config.email.clone()));

    let stats = Arc::new(DeliveryStats::new());
    let retry = Arc::new(RetryScheduler::new(
        DeliveryConfig::default(),
        store.clone(),
        users.clone(),
        realtime_channel.clone(),
        email_channel.clone(),
        stats.clone(),
    ));
    let orchestrator = Arc::new(NotificationOrchestrator::new(
        store.clone(),
        PreferenceResolver::new(users.clone(), vendors.clone()),
        realtime_channel,
        email_channel,
        retry,
        stats,
        DeliveryConfig::default(),
    ));
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&orchestrator),
        TargetingResolver::new(users.clone(), vendors.clone()),
        Arc::clone(&transport),
    ));
    let router = EventRouter::new(
        Arc::clone(&orchestrator),
        Arc::clone(&broadcaster),
        users.clone(),
        vendors.clone(),
        Arc::clone(&registry),
    );

    Stack {
        store,
        users,
        vendors,
        registry,
        orchestrator,
        broadcaster,
        router,
        emails,
    }
}

fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

#[tokio::test]
async fn test_order_event_reaches_connected_vendor_owner() {
    let s = stack();
    let owner = User::new("owner@example.com", "Owner", UserRole::Vendor);
    let vendor = Vendor::new(owner.id, "Acme Vending").with_status(VendorStatus::Active);
    let owner = owner.with_vendor(vendor.id);
    s.users.insert(owner.clone());
    s.vendors.insert(vendor.clone());

    let (_, mut rx) = s.registry.register(&owner, Some(&vendor));

    s.router
        .handle(DomainEvent::new(
            None,
            EventPayload::Order(OrderEvent::Placed {
                order_id: OrderId::new(),
                vendor_id: vendor.id,
                buyer_id: User::new("b@example.com", "Buyer", UserRole::Customer).id,
                total_cents: 12345,
                item_count: 2,
            }),
        ))
        .await
        .unwrap();

    let events: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|m| match m {
            OutboundMessage::Event { event, payload, .. } => Some((event, payload)),
            _ => None,
        })
        .collect();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "notification");

    let stored = s.store.find_for_user(owner.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].kind, NotificationKind::NewOrder);
    assert!(stored[0].delivery.realtime.success);
}

#[tokio::test]
async fn test_offline_recipient_falls_back_to_email() {
    let s = stack();
    let user = User::new("away@example.com", "Away", UserRole::Customer);
    s.users.insert(user.clone());

    let notification = s
        .orchestrator
        .create_notification(NotificationRequest::new(
            user.id,
            NotificationKind::OrderStatusUpdate,
            "Order shipped",
            "Your order is on its way.",
        ))
        .await
        .unwrap();

    assert!(!notification.delivery.realtime.success);
    assert!(notification.delivery.fallback_used);
    assert!(notification.delivery.delivered());

    let sent = s.emails.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "away@example.com");
    assert!(sent[0].1.starts_with("[VendHub]"));
}

#[tokio::test]
async fn test_role_broadcast_reaches_room_and_persists_silently() {
    let s = stack();
    let admin = User::new("admin@example.com", "Admin", UserRole::Admin);
    s.users.insert(admin.clone());
    let (_, mut rx) = s.registry.register(&admin, None);

    let outcome = s
        .broadcaster
        .broadcast_to_role(
            UserRole::Admin,
            NotificationKind::General,
            "Policy update",
            "Review the new listing rules.",
        )
        .await
        .unwrap();
    assert_eq!(outcome.created, 1);

    let announcements: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter(|m| matches!(m, OutboundMessage::Event { event, .. } if event == "announcement"))
        .collect();
    assert_eq!(announcements.len(), 1);

    // The record is created without per-recipient channel delivery.
    let stored = s.store.find_for_user(admin.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].delivery.attempts, 0);
    assert_eq!(s.emails.sent().len(), 0);
}

#[tokio::test]
async fn test_close_all_sends_shutdown_notice() {
    let s = stack();
    let user = User::new("u@example.com", "U", UserRole::Customer);
    s.users.insert(user.clone());
    let (_, mut rx) = s.registry.register(&user, None);

    s.registry.close_all("server shutting down");

    let messages = drain(&mut rx);
    assert!(messages.iter().any(
        |m| matches!(m, OutboundMessage::Shutdown { reason } if reason == "server shutting down")
    ));
    assert_eq!(s.registry.connection_count(), 0);
}
