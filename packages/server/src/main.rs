use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use luna_common::LocalDisk;
use luna_server::ar_model::{ArModelService, run_orphan_sweep};
use luna_server::config::AppConfig;
use luna_server::database::init_db;
use luna_server::seed::seed_sample_products;
use luna_server::state::AppState;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("failed to connect to the database")?;
    if config.database.seed_sample_products {
        seed_sample_products(&db)
            .await
            .context("failed to seed sample products")?;
    }

    let disk = LocalDisk::new(config.storage.root.clone(), config.storage.public_url.clone())
        .await
        .with_context(|| {
            format!(
                "failed to prepare storage root {}",
                config.storage.root.display()
            )
        })?;
    let assets = ArModelService::new(
        Arc::new(disk),
        config.storage.ar_max_file_size,
        config.storage.image_max_file_size,
    );

    if config.cleanup.interval_secs > 0 {
        tokio::spawn(run_orphan_sweep(
            db.clone(),
            assets.clone(),
            Duration::from_secs(config.cleanup.interval_secs),
        ));
    } else {
        info!("Orphaned AR model sweep disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
        assets,
    };
    let app = luna_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
