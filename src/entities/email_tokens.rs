use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct EmailToken {
    pub id: i64,
    pub user_id: i64,
    pub purpose: i16,
    pub token_hash: String,
    #[sqlx(default)]
    pub used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
