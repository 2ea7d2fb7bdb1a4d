use crate::common::config::AppConfig;
use crate::common::state::AppState;
use crate::settings::AppSettings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use tokio::fs;

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let config = AppConfig::from_settings(settings);
    initialize_storage(&config).await?;
    Ok(AppState {
        db,
        config: Arc::new(config),
    })
}

pub fn initialize_db(settings: &AppSettings) -> impl Future<Output = sqlx::Result<Pool<MySql>>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url)
}

pub async fn initialize_storage(config: &AppConfig) -> anyhow::Result<()> {
    fs::create_dir_all(&config.storage.temp_dir).await?;
    fs::create_dir_all(&config.storage.chart_dir).await?;
    fs::create_dir_all(&config.storage.replay_dir).await?;
    Ok(())
}
