//! VendHub Server — marketplace back-office notification platform.
//!
//! Wires the stores, connection registry, delivery channels, and
//! orchestrator together, starts the background sweeps, and runs until
//! a shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use vendhub_core::config::AppConfig;
use vendhub_core::error::AppError;
use vendhub_core::events::{DomainEvent, EventPayload, SystemEvent};
use vendhub_core::result::AppResult;
use vendhub_core::traits::RoomTransport;
use vendhub_core::traits::email::{EmailSender, OutgoingEmail};
use vendhub_notify::channel::{EmailChannel, RealtimeChannel};
use vendhub_notify::maintenance::MaintenanceScheduler;
use vendhub_notify::preferences::PreferenceResolver;
use vendhub_notify::retry::RetryScheduler;
use vendhub_notify::targeting::TargetingResolver;
use vendhub_notify::{
    Broadcaster, DeliveryStats, EventRouter, NotificationOrchestrator, NotificationService,
};
use vendhub_realtime::sweeper::{spawn_reconciler, spawn_stale_sweeper};
use vendhub_realtime::{ConnectionRegistry, LocalTransport};
use vendhub_store::memory::{MemoryNotificationStore, MemoryUserDirectory, MemoryVendorDirectory};

#[tokio::main]
async fn main() {
    let env = std::env::var("VENDHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Email sender for development: logs instead of speaking SMTP. A real
/// deployment plugs an SMTP-backed implementation in here.
#[derive(Debug, Default)]
struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email (log transport)");
        Ok(())
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting VendHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let store = Arc::new(MemoryNotificationStore::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let vendors = Arc::new(MemoryVendorDirectory::new());

    // ── Step 2: Connection registry + transport ──────────────────
    let registry = Arc::new(ConnectionRegistry::new(config.realtime.clone()));
    let transport: Arc<dyn RoomTransport> = Arc::new(LocalTransport::new(Arc::clone(&registry)));
    tracing::info!("Connection registry initialized");

    // ── Step 3: Delivery channels ────────────────────────────────
    let email_sender = Arc::new(LogEmailSender);
    let realtime_channel = Arc::new(RealtimeChannel::new(Arc::clone(&transport)));
    let email_channel = Arc::new(EmailChannel::new(email_sender, config.email.clone()));

    // ── Step 4: Orchestration ────────────────────────────────────
    let stats = Arc::new(DeliveryStats::new());
    let retry = Arc::new(RetryScheduler::new(
        config.delivery.clone(),
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
        Arc::clone(&retry),
        stats.clone(),
        config.delivery.clone(),
    ));
    let broadcaster = Arc::new(Broadcaster::new(
        Arc::clone(&orchestrator),
        TargetingResolver::new(users.clone(), vendors.clone()),
        Arc::clone(&transport),
    ));
    let service = Arc::new(NotificationService::new(store.clone(), Arc::clone(&retry)));
    let router = Arc::new(EventRouter::new(
        Arc::clone(&orchestrator),
        Arc::clone(&broadcaster),
        users.clone(),
        vendors.clone(),
        Arc::clone(&registry),
    ));
    tracing::info!("Notification orchestrator initialized");

    // ── Step 5: Domain event intake ──────────────────────────────
    // Producers (the API layer, embedding services) push events here.
    let (event_tx, mut event_rx) = mpsc::channel::<DomainEvent>(1024);
    let router_handle = {
        let router = Arc::clone(&router);
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if let Err(e) = router.handle(event).await {
                    tracing::error!("Event routing failed: {e}");
                }
            }
        })
    };
    let _ = event_tx
        .send(DomainEvent::new(
            None,
            EventPayload::System(SystemEvent::ServerStarted {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),
        ))
        .await;

    // ── Step 6: Background maintenance ───────────────────────────
    let shutdown = CancellationToken::new();
    let sweeper_handle = spawn_stale_sweeper(Arc::clone(&registry), shutdown.clone());
    let reconciler_handle = spawn_reconciler(
        Arc::clone(&registry),
        Arc::clone(&transport),
        shutdown.clone(),
    );

    let mut maintenance =
        MaintenanceScheduler::new(Arc::clone(&service), config.retention.clone()).await?;
    maintenance.start().await?;

    tracing::info!("VendHub server running");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    registry.close_all("server shutting down");
    shutdown.cancel();
    drop(event_tx);

    maintenance.shutdown().await?;
    for handle in [router_handle, sweeper_handle, reconciler_handle] {
        let _ = tokio::time::timeout(Duration::from_secs(10), handle).await;
    }

    match serde_json::to_string(&stats.snapshot()) {
        Ok(snapshot) => tracing::info!(stats = %snapshot, "Final delivery statistics"),
        Err(e) => tracing::warn!("Failed to serialize delivery statistics: {e}"),
    }
    tracing::info!("VendHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
