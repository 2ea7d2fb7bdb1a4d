use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct AdminLog {
    pub id: i64,
    pub admin_id: i64,
    pub action: i16,
    pub item_id: i64,
    #[sqlx(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Log row joined with the acting admin's username for listings.
#[derive(Debug, FromRow)]
pub struct AdminLogEntry {
    pub id: i64,
    pub admin_id: i64,
    pub admin_username: String,
    pub action: i16,
    pub item_id: i64,
    #[sqlx(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}
