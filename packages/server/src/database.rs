use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

use crate::config::DatabaseConfig;

/// Connect to Postgres and bring the `product` table up to date with the
/// entity definitions.
pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let timeout = Duration::from_secs(config.connect_timeout_secs);
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    db.get_schema_registry("luna_server::entity::*")
        .sync(&db)
        .await?;
    info!(
        max_connections = config.max_connections,
        "Database ready, product schema synced"
    );

    Ok(db)
}
