//! Background job scheduler.
//!
//! Registers the recurring sheet sync. The job fires every refresh interval;
//! ticks that start while a sync is still running are skipped by the
//! controller, so slow feeds never stack up requests.

use std::sync::Arc;
use std::time::Duration;

use igdraw_feed::CampaignFeed;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::sync::{SyncController, SyncOutcome};

/// Runs the first sheet sync to completion, then starts the recurring job.
///
/// Awaiting the first sync means links are resolvable as soon as the server
/// starts listening.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be started.
pub async fn start_sheet_sync<F>(
    controller: Arc<SyncController<F>>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError>
where
    F: CampaignFeed + 'static,
{
    run_sync_tick(&controller).await;
    build_scheduler(controller, interval).await
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler<F>(
    controller: Arc<SyncController<F>>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError>
where
    F: CampaignFeed + 'static,
{
    let scheduler = JobScheduler::new().await?;

    register_sheet_sync_job(&scheduler, controller, interval).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sheet_sync_job<F>(
    scheduler: &JobScheduler,
    controller: Arc<SyncController<F>>,
    interval: Duration,
) -> Result<(), JobSchedulerError>
where
    F: CampaignFeed + 'static,
{
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let controller = Arc::clone(&controller);

        Box::pin(async move {
            run_sync_tick(&controller).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "scheduler: sheet sync registered"
    );
    Ok(())
}

/// One scheduled sync, with its outcome logged.
pub async fn run_sync_tick<F>(controller: &SyncController<F>) -> SyncOutcome
where
    F: CampaignFeed,
{
    let outcome = controller.tick().await;
    match outcome {
        SyncOutcome::Applied { campaigns } => {
            tracing::debug!(campaigns, "scheduler: sheet sync applied");
        }
        SyncOutcome::Empty => tracing::debug!("scheduler: sheet sync produced no campaigns"),
        SyncOutcome::Failed => tracing::debug!("scheduler: sheet sync failed"),
        SyncOutcome::Skipped | SyncOutcome::Disabled => {}
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use igdraw_feed::{FeedError, SheetRow};
    use igdraw_store::CampaignStore;

    use super::*;

    struct OneCampaignFeed;

    impl CampaignFeed for OneCampaignFeed {
        async fn fetch_rows(&self) -> Result<Vec<SheetRow>, FeedError> {
            Ok(vec![SheetRow::from_texts(&[
                "https://www.instagram.com/p/FIRST/",
                "",
                "@early",
                "",
            ])])
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn first_sync_completes_before_start_returns() {
        let store = Arc::new(CampaignStore::new());
        let controller = Arc::new(SyncController::new(
            Arc::clone(&store),
            Some(OneCampaignFeed),
            PathBuf::from("missing-fallback.json"),
        ));

        let _scheduler = start_sheet_sync(controller, Duration::from_secs(3600))
            .await
            .expect("scheduler");

        assert!(store
            .lookup("https://www.instagram.com/p/FIRST/")
            .await
            .is_some());
    }
}
