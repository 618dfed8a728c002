use std::time::Duration;

use sea_orm::DatabaseConnection;
use tracing::{error, info};

use super::ArModelService;

/// Run the orphaned AR model sweep as a background task.
pub async fn run_orphan_sweep(db: DatabaseConnection, assets: ArModelService, every: Duration) {
    info!(
        interval_secs = every.as_secs(),
        "Starting orphaned AR model sweep"
    );

    let mut interval = tokio::time::interval(every);
    // The first tick completes immediately; skip it so startup is not slowed
    // by a full directory scan.
    interval.tick().await;

    loop {
        interval.tick().await;

        match assets.cleanup_orphans(&db).await {
            Ok(report) if report.orphaned_files > 0 => info!(
                orphaned_files = report.orphaned_files,
                deleted_files = report.deleted_files,
                "Orphan sweep removed unreferenced AR models"
            ),
            Ok(_) => {}
            Err(e) => error!(error = %e, "Orphaned AR model sweep failed"),
        }
    }
}
