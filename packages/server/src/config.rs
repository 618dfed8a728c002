use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use luna_common::asset::{DEFAULT_AR_MAX_FILE_SIZE, DEFAULT_IMAGE_MAX_FILE_SIZE};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait when opening or acquiring a pooled connection.
    pub connect_timeout_secs: u64,
    /// Insert the sample furniture catalog on startup.
    pub seed_sample_products: bool,
}

/// The public disk holding product images and AR models.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Local directory backing the disk.
    pub root: PathBuf,
    /// URL prefix under which `root` is served, e.g. `/storage`.
    pub public_url: String,
    /// Upper bound for GLB/USDZ uploads, in bytes.
    pub ar_max_file_size: u64,
    /// Upper bound for product image uploads, in bytes.
    pub image_max_file_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CleanupConfig {
    /// Seconds between orphaned AR model sweeps. `0` disables the sweep.
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub cleanup: CleanupConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 2)?
            .set_default("database.connect_timeout_secs", 8)?
            .set_default("database.seed_sample_products", false)?
            .set_default("storage.root", "./storage/public")?
            .set_default("storage.public_url", "/storage")?
            .set_default("storage.ar_max_file_size", DEFAULT_AR_MAX_FILE_SIZE)?
            .set_default("storage.image_max_file_size", DEFAULT_IMAGE_MAX_FILE_SIZE)?
            .set_default("cleanup.interval_secs", 24 * 60 * 60)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., LUNA__DATABASE__URL)
            .add_source(Environment::with_prefix("LUNA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
