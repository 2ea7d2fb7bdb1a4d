use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub username_safe: String,
    pub password_hash: String,
    pub email: String,
    pub email_verified: bool,
    pub active: bool,
    pub admin: bool,
    #[sqlx(default)]
    pub profile_photo_url: Option<String>,
    #[sqlx(default)]
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}
