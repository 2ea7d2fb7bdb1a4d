use crate::common::config::AppConfig;
use crate::common::context::Context;
use sqlx::{MySql, Pool};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<MySql>,
    pub config: Arc<AppConfig>,
}

impl Context for AppState {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }
}
