//! Background maintenance loops for the connection registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use vendhub_core::traits::RoomTransport;

use crate::registry::ConnectionRegistry;

/// Spawn the staleness sweep loop.
///
/// Every `sweep_interval_seconds` the registry drops connections whose
/// last heartbeat is older than the staleness window. Runs until the
/// token is cancelled.
pub fn spawn_stale_sweeper(
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(registry.config().sweep_interval_seconds);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick fires immediately; skip it so a fresh start does not sweep.
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Stale connection sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let dropped = registry.sweep_stale();
                    debug!(dropped, "Staleness sweep tick");
                }
            }
        }
    })
}

/// Spawn the reconciliation loop.
///
/// Every `reconcile_interval_seconds` the registry is compared against
/// the transport's authoritative live connection set; entries the
/// transport no longer reports are purged.
pub fn spawn_reconciler(
    registry: Arc<ConnectionRegistry>,
    transport: Arc<dyn RoomTransport>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(registry.config().reconcile_interval_seconds);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Registry reconciler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let live = transport.live_connection_ids();
                    let purged = registry.reconcile(&live);
                    debug!(purged, live = live.len(), "Reconciliation tick");
                }
            }
        }
    })
}
