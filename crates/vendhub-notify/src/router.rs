//! Domain-event to notification routing.

use std::sync::Arc;

use tracing::debug;

use vendhub_core::AppError;
use vendhub_core::AppResult;
use vendhub_core::events::{AccountEvent, CatalogEvent, DomainEvent, EventPayload, OrderEvent, SystemEvent};
use vendhub_core::types::id::{UserId, VendorId};
use vendhub_entity::notification::NotificationKind;
use vendhub_entity::user::{PreferenceKind, UserRole};
use vendhub_realtime::ConnectionRegistry;
use vendhub_store::{UserDirectory, VendorDirectory};

use crate::broadcast::{BroadcastRequest, Broadcaster};
use crate::orchestrator::{NotificationOrchestrator, NotificationRequest};
use crate::targeting::BroadcastTarget;

/// Turns marketplace domain events into notifications and broadcasts.
#[derive(Debug)]
pub struct EventRouter {
    orchestrator: Arc<NotificationOrchestrator>,
    broadcaster: Arc<Broadcaster>,
    users: Arc<dyn UserDirectory>,
    vendors: Arc<dyn VendorDirectory>,
    registry: Arc<ConnectionRegistry>,
}

impl EventRouter {
    /// Wire a router from its collaborators.
    pub fn new(
        orchestrator: Arc<NotificationOrchestrator>,
        broadcaster: Arc<Broadcaster>,
        users: Arc<dyn UserDirectory>,
        vendors: Arc<dyn VendorDirectory>,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            orchestrator,
            broadcaster,
            users,
            vendors,
            registry,
        }
    }

    /// Route one event.
    pub async fn handle(&self, event: DomainEvent) -> AppResult<()> {
        debug!(event_id = %event.id, "Routing domain event");
        match event.payload {
            EventPayload::Order(order) => self.handle_order(order).await,
            EventPayload::Catalog(catalog) => self.handle_catalog(catalog).await,
            EventPayload::Account(account) => self.handle_account(account).await,
            EventPayload::System(system) => self.handle_system(system).await,
        }
    }

    async fn handle_order(&self, event: OrderEvent) -> AppResult<()> {
        match event {
            OrderEvent::Placed {
                order_id,
                vendor_id,
                buyer_id,
                total_cents,
                item_count,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner,
                            NotificationKind::NewOrder,
                            "New order received",
                            format!(
                                "Order of {item_count} item(s) for ${}",
                                format_cents(total_cents)
                            ),
                        )
                        .with_metadata(serde_json::json!({
                            "order_id": order_id,
                            "buyer_id": buyer_id,
                            "total_cents": total_cents,
                            "item_count": item_count,
                        })),
                    )
                    .await?;
            }
            OrderEvent::StatusChanged {
                order_id,
                buyer_id,
                from,
                to,
                ..
            } => {
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            buyer_id,
                            NotificationKind::OrderStatusUpdate,
                            "Order status updated",
                            format!("Your order moved from {from} to {to}"),
                        )
                        .with_metadata(serde_json::json!({
                            "order_id": order_id,
                            "from": from,
                            "to": to,
                        })),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn handle_catalog(&self, event: CatalogEvent) -> AppResult<()> {
        match event {
            // Low stock alerts the vendor directly, every admin, and every
            // user subscribed to low-stock alerts. One broadcast resolves
            // all three dimensions so overlapping recipients get one
            // record each.
            CatalogEvent::LowStock {
                product_id,
                product_name,
                vendor_id,
                current_stock,
                threshold,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                let target = BroadcastTarget::users(vec![owner])
                    .with_role(UserRole::Admin)
                    .with_preference(PreferenceKind::LowStock);
                self.broadcaster
                    .orchestrate_broadcast(
                        BroadcastRequest::new(
                            target,
                            NotificationKind::LowStock,
                            "Low stock alert",
                            format!(
                                "{product_name} is down to {current_stock} (threshold {threshold})"
                            ),
                        )
                        .with_metadata(serde_json::json!({
                            "product_id": product_id,
                            "vendor_id": vendor_id,
                            "current_stock": current_stock,
                            "threshold": threshold,
                        })),
                    )
                    .await?;
            }
            CatalogEvent::CubicVolumeAlert {
                product_id,
                product_name,
                vendor_id,
                cubic_volume_cm3,
                limit_cm3,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner,
                            NotificationKind::CubicVolumeAlert,
                            "Packed volume limit exceeded",
                            format!(
                                "{product_name} packs to {cubic_volume_cm3:.0} cm3, over the {limit_cm3:.0} cm3 limit"
                            ),
                        )
                        .with_metadata(serde_json::json!({
                            "product_id": product_id,
                            "cubic_volume_cm3": cubic_volume_cm3,
                            "limit_cm3": limit_cm3,
                        })),
                    )
                    .await?;
            }
            CatalogEvent::ProductApproved {
                product_id,
                product_name,
                vendor_id,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner,
                            NotificationKind::ProductApproved,
                            "Product approved",
                            format!("{product_name} passed review and is now listed"),
                        )
                        .with_metadata(serde_json::json!({ "product_id": product_id })),
                    )
                    .await?;
            }
            CatalogEvent::ProductRejected {
                product_id,
                product_name,
                vendor_id,
                reason,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner,
                            NotificationKind::ProductRejected,
                            "Product rejected",
                            format!("{product_name} failed review: {reason}"),
                        )
                        .with_metadata(serde_json::json!({
                            "product_id": product_id,
                            "reason": reason,
                        })),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn handle_account(&self, event: AccountEvent) -> AppResult<()> {
        match event {
            AccountEvent::CommissionPaid {
                vendor_id,
                amount_cents,
                period,
            } => {
                let owner = self.vendor_owner(vendor_id).await?;
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner,
                            NotificationKind::CommissionPayment,
                            "Commission payment settled",
                            format!(
                                "${} was settled for period {period}",
                                format_cents(amount_cents)
                            ),
                        )
                        .with_metadata(serde_json::json!({
                            "amount_cents": amount_cents,
                            "period": period,
                        })),
                    )
                    .await?;
            }
            AccountEvent::AccountUpdated { user_id, fields } => {
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            user_id,
                            NotificationKind::AccountUpdate,
                            "Account updated",
                            format!("Changed: {}", fields.join(", ")),
                        )
                        .with_metadata(serde_json::json!({ "fields": fields })),
                    )
                    .await?;
                self.refresh_rooms_for(user_id).await?;
            }
            AccountEvent::VendorStatusChanged {
                vendor_id,
                owner_id,
                status,
            } => {
                self.orchestrator
                    .create_notification(
                        NotificationRequest::new(
                            owner_id,
                            NotificationKind::AccountUpdate,
                            "Vendor status changed",
                            format!("Your vendor account is now {status}"),
                        )
                        .with_metadata(serde_json::json!({
                            "vendor_id": vendor_id,
                            "status": status,
                        })),
                    )
                    .await?;
                self.refresh_rooms_for(owner_id).await?;
            }
        }
        Ok(())
    }

    async fn handle_system(&self, event: SystemEvent) -> AppResult<()> {
        match event {
            SystemEvent::MaintenanceScheduled {
                starts_at,
                duration_minutes,
                description,
            } => {
                self.broadcaster
                    .orchestrate_broadcast(
                        BroadcastRequest::new(
                            BroadcastTarget::everyone(),
                            NotificationKind::SystemMaintenance,
                            "Scheduled maintenance",
                            format!(
                                "{description} — starts {} for ~{duration_minutes} min",
                                starts_at.format("%Y-%m-%d %H:%M UTC")
                            ),
                        )
                        .with_metadata(serde_json::json!({
                            "starts_at": starts_at,
                            "duration_minutes": duration_minutes,
                        })),
                    )
                    .await?;
            }
            SystemEvent::ServerStarted { .. } | SystemEvent::ServerShutdown { .. } => {
                // Lifecycle events are logged by the server itself.
            }
        }
        Ok(())
    }

    /// Re-derive room membership for the user's live connections after a
    /// role, preference, or vendor-status change.
    async fn refresh_rooms_for(&self, user_id: UserId) -> AppResult<()> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Ok(());
        };
        let vendor = match user.vendor_id {
            Some(vendor_id) => self.vendors.find_by_id(vendor_id).await?,
            None => None,
        };
        self.registry.refresh_rooms(&user, vendor.as_ref());
        Ok(())
    }

    async fn vendor_owner(&self, vendor_id: VendorId) -> AppResult<UserId> {
        let vendor = self
            .vendors
            .find_by_id(vendor_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Vendor not found: {vendor_id}")))?;
        Ok(vendor.owner_id)
    }
}

fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}
