use crate::common::context::Context;
use crate::entities::email_tokens::EmailToken;
use chrono::{DateTime, Utc};

const TABLE_NAME: &str = "email_tokens";
const READ_FIELDS: &str = "id, user_id, purpose, token_hash, used_at, expires_at, created_at";

pub async fn insert<C: Context>(
    ctx: &C,
    user_id: i64,
    purpose: i16,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (user_id, purpose, token_hash, expires_at) VALUES (?, ?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(user_id)
        .bind(purpose)
        .bind(token_hash)
        .bind(expires_at)
        .execute(ctx.db())
        .await?;
    Ok(result.last_insert_id() as i64)
}

/// Atomic consume: the conditional UPDATE marks the token used only if it
/// is still unused and unexpired, so two concurrent consumers can never
/// both succeed.
pub async fn consume<C: Context>(
    ctx: &C,
    purpose: i16,
    token_hash: &str,
) -> sqlx::Result<Option<EmailToken>> {
    const UPDATE: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET used_at = NOW() WHERE purpose = ? AND token_hash = ?",
        " AND used_at IS NULL AND expires_at > NOW()"
    );
    let result = sqlx::query(UPDATE)
        .bind(purpose)
        .bind(token_hash)
        .execute(ctx.db())
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }

    const SELECT: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE purpose = ? AND token_hash = ?"
    );
    sqlx::query_as(SELECT)
        .bind(purpose)
        .bind(token_hash)
        .fetch_optional(ctx.db())
        .await
}

pub async fn delete_expired<C: Context>(ctx: &C) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "DELETE FROM ",
        TABLE_NAME,
        " WHERE expires_at <= NOW() OR used_at IS NOT NULL"
    );
    let result = sqlx::query(QUERY).execute(ctx.db()).await?;
    Ok(result.rows_affected())
}
