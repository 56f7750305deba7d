//! Cron-scheduled retention maintenance.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info};

use vendhub_core::AppError;
use vendhub_core::config::RetentionConfig;

use crate::service::NotificationService;

/// Cron-based scheduler for the nightly retention cleanup.
pub struct MaintenanceScheduler {
    scheduler: JobScheduler,
    service: Arc<NotificationService>,
    config: RetentionConfig,
}

impl std::fmt::Debug for MaintenanceScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaintenanceScheduler")
            .field("config", &self.config)
            .finish()
    }
}

impl MaintenanceScheduler {
    /// Create a scheduler over the notification service.
    pub async fn new(
        service: Arc<NotificationService>,
        config: RetentionConfig,
    ) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;
        Ok(Self {
            scheduler,
            service,
            config,
        })
    }

    /// Register the retention cleanup job and start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.register_retention_cleanup().await?;
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;
        info!("Maintenance scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;
        info!("Maintenance scheduler shut down");
        Ok(())
    }

    async fn register_retention_cleanup(&self) -> Result<(), AppError> {
        let service = Arc::clone(&self.service);
        let older_than_days = self.config.cleanup_after_days;
        let job = CronJob::new_async(self.config.cleanup_cron.as_str(), move |_uuid, _lock| {
            let service = Arc::clone(&service);
            Box::pin(async move {
                match service.cleanup(older_than_days).await {
                    Ok(deleted) => {
                        info!(deleted, "Notification retention cleanup ran");
                    }
                    Err(e) => {
                        error!("Notification retention cleanup failed: {e}");
                    }
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create retention cleanup schedule: {e}"))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add retention cleanup schedule: {e}"))
        })?;

        info!(
            cron = %self.config.cleanup_cron,
            older_than_days,
            "Registered: notification retention cleanup"
        );
        Ok(())
    }
}
