//! Background recalculation of project health ratings

use flagkeeper_core::ProjectHealthService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::metrics::FlagkeeperMetrics;

/// Recompute every project's rating on each tick.
///
/// The first run happens immediately. Failures are logged and the loop keeps
/// going.
pub fn spawn_health_refresh(
    service: Arc<ProjectHealthService>,
    metrics: FlagkeeperMetrics,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match service.refresh_all_project_health().await {
                Ok(updated) => {
                    for (project, counts) in &updated {
                        metrics.observe_project_health(project, counts);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Project health refresh failed");
                }
            }
        }
    })
}
