use crate::common::config::AppConfig;
use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::state::AppState;
use crate::models::users::User;
use crate::settings::AppSettings;
use crate::usecases::sessions;
use axum::Router;
use axum::extract::{DefaultBodyLimit, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::{get, post};
use sqlx::{MySql, Pool};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::info;

pub mod admin;
pub mod public;
pub mod replays;
pub mod songs;
pub mod status;
pub mod users;

/// Replay + chart + metadata files at 5MB each, with multipart overhead.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub struct RequestContext {
    pub db: Pool<MySql>,
    pub config: Arc<AppConfig>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::status))
        .route("/user/register", post(users::register))
        .route("/user/login", post(users::login))
        .route("/user/profile", get(users::profile))
        .route("/user/update", post(users::update))
        .route("/user/publicProfile", get(users::public_profile))
        .route("/user/all", get(users::entries))
        .route("/user/scores", get(users::scores))
        .route("/user/idToUsername", get(users::id_to_username))
        .route("/user/emailVerify", get(users::email_verify))
        .route("/user/passwordForgot", post(users::password_forgot))
        .route("/user/passwordReset", post(users::password_reset))
        .route("/song/entries", get(songs::entries))
        .route("/song/song", get(songs::song))
        .route("/song/hashToId", get(songs::hash_to_id))
        .route("/song/leaderboard", post(songs::leaderboard))
        .route("/replay/register", post(replays::register))
        .route("/public/replay", get(public::replay))
        .route("/public/song", get(public::song))
        .route("/admin/userBan", post(admin::user_ban))
        .route("/admin/songAdd", post(admin::song_add))
        .route("/admin/songUpdate", post(admin::song_update))
        .route("/admin/songDelete", post(admin::song_delete))
        .route("/admin/scoreDelete", post(admin::score_delete))
        .route("/admin/logs", get(admin::logs))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let app = router().with_state(state);
    let listener =
        tokio::net::TcpListener::bind((settings.app_host, settings.app_port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            db: state.db.clone(),
            config: state.config.clone(),
        })
    }
}

impl Context for RequestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// The requesting user, resolved from the bearer token.
pub struct AuthedUser(pub User);

impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext {
            db: state.db.clone(),
            config: state.config.clone(),
        };
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let user = sessions::authenticate(&ctx, authorization).await?;
        Ok(AuthedUser(user))
    }
}

/// Same as [`AuthedUser`], additionally requiring the admin flag.
pub struct AdminUser(pub User);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthedUser(user) = AuthedUser::from_request_parts(parts, state).await?;
        if !user.admin {
            return Err(AppError::AuthAdminRequired);
        }
        Ok(AdminUser(user))
    }
}
