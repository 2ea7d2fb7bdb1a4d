use crate::settings::AppSettings;
use std::path::{Path, PathBuf};

/// Snapshot of everything the request pipeline needs beyond the database.
/// Built once at startup and threaded through [`crate::common::context::Context`]
/// so collaborators never read the process environment themselves.
pub struct AppConfig {
    pub storage: StoragePaths,
    pub validator: ValidatorConfig,
    pub jwt_secret: String,
    pub dev_mode: bool,
    pub frontend_base_url: String,
    pub mail_relay_url: Option<String>,
    pub discord_webhook_url: Option<String>,
}

/// Filesystem layout under the configured data root.
pub struct StoragePaths {
    pub temp_dir: PathBuf,
    pub chart_dir: PathBuf,
    pub replay_dir: PathBuf,
}

pub struct ValidatorConfig {
    pub binary: PathBuf,
    pub dotnet_path: Option<String>,
}

impl AppConfig {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            storage: StoragePaths::new(&settings.data_root),
            validator: ValidatorConfig {
                binary: settings.validator_path.clone(),
                dotnet_path: settings.dotnet_path.clone(),
            },
            jwt_secret: settings.jwt_secret.clone(),
            dev_mode: settings.dev_mode,
            frontend_base_url: settings.frontend_base_url.clone(),
            mail_relay_url: settings.mail_relay_url.clone(),
            discord_webhook_url: settings.discord_webhook_url.clone(),
        }
    }
}

impl StoragePaths {
    pub fn new(data_root: &Path) -> Self {
        Self {
            temp_dir: data_root.join("temp"),
            chart_dir: data_root.join("chart"),
            replay_dir: data_root.join("replay"),
        }
    }
}
