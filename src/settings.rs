use crate::common::env::FromEnv;
use std::env;
use std::net::IpAddr;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,
    pub app_host: IpAddr,
    pub app_port: u16,

    pub database_url: String,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub jwt_secret: String,

    pub data_root: PathBuf,
    pub validator_path: PathBuf,
    pub dotnet_path: Option<String>,

    pub dev_mode: bool,
    pub frontend_base_url: String,
    pub mail_relay_url: Option<String>,
    pub discord_webhook_url: Option<String>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT")?;
        let level = Level::from_env("LOG_LEVEL")?;
        let app_host = IpAddr::from_env("APP_HOST")?;
        let app_port = u16::from_env("APP_PORT")?;

        let database_url = env::var("DATABASE_URL")?;
        let db_max_connections = usize::from_env("DB_MAX_CONNECTIONS")?;
        let db_wait_timeout_secs = u64::from_env("DB_WAIT_TIMEOUT_SECS")?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let jwt_secret = env::var("JWT_SECRET")?;

        let data_root = PathBuf::from(env::var("DATA_ROOT")?);
        let validator_path = PathBuf::from(env::var("VALIDATOR_PATH")?);
        let dotnet_path = env::var("DOTNET_PATH").ok();

        let dev_mode = bool::from_env("DEV_MODE").unwrap_or(false);
        let frontend_base_url = env::var("FRONTEND_BASE_URL")?;
        let mail_relay_url = env::var("MAIL_RELAY_URL").ok();
        let discord_webhook_url = env::var("DISCORD_WEBHOOK_URL").ok();

        Ok(AppSettings {
            app_component,
            level,
            app_port,
            app_host,

            database_url,
            db_max_connections,
            db_wait_timeout,

            jwt_secret,

            data_root,
            validator_path,
            dotnet_path,

            dev_mode,
            frontend_base_url,
            mail_relay_url,
            discord_webhook_url,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
