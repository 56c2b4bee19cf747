use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

/// Background jobs: the overdue sweep on a fixed interval and inventory
/// snapshots on an optional cron schedule.
pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    #[must_use]
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        let cron = match &self.config.snapshot_cron {
            Some(expr) => Some(self.start_snapshot_cron(expr).await?),
            None => None,
        };

        self.run_overdue_loop().await;

        if let Some(mut sched) = cron {
            sched.shutdown().await?;
        }
        Ok(())
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
        info!("Scheduler stopped");
    }

    async fn start_snapshot_cron(&self, cron_expr: &str) -> Result<JobScheduler> {
        let sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let state = Arc::clone(&state);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                if let Err(e) = take_snapshot(&state).await {
                    error!("Scheduled inventory snapshot failed: {}", e);
                }
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Inventory snapshots scheduled with cron: {}", cron_expr);
        Ok(sched)
    }

    async fn run_overdue_loop(&self) {
        let interval_mins = self.config.overdue_check_minutes.max(1);
        info!("Overdue sweep running every {} minutes", interval_mins);

        let mut ticker = interval(Duration::from_secs(u64::from(interval_mins) * 60));

        loop {
            ticker.tick().await;
            if !*self.running.read().await {
                break;
            }
            if let Err(e) = run_overdue_sweep(&self.state).await {
                error!("Scheduled overdue sweep failed: {}", e);
            }
        }
    }
}

pub async fn run_overdue_sweep(state: &SharedState) -> Result<u64> {
    let marked = state.request_service.mark_overdue_sweep(Utc::now()).await?;
    Ok(marked)
}

pub async fn take_snapshot(state: &SharedState) -> Result<u64> {
    let count = state.inventory_service.take_snapshot().await?;
    Ok(count)
}
