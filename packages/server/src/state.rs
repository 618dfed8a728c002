use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::ar_model::ArModelService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub assets: ArModelService,
}
