use crate::common::context::Context;
use crate::entities::users::User;
use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;

const TABLE_NAME: &str = "users";
const READ_FIELDS: &str = r#"
id, username, username_safe, password_hash, email, email_verified,
active, admin, profile_photo_url, country, created_at"#;

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<User> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_one_by_username<C: Context>(ctx: &C, username: &str) -> sqlx::Result<User> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE username = ?"
    );
    sqlx::query_as(QUERY)
        .bind(username)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_one_by_username_safe<C: Context>(
    ctx: &C,
    username_safe: &str,
) -> sqlx::Result<Option<User>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE username_safe = ?"
    );
    sqlx::query_as(QUERY)
        .bind(username_safe)
        .fetch_optional(ctx.db())
        .await
}

pub async fn fetch_one_by_email<C: Context>(ctx: &C, email: &str) -> sqlx::Result<Option<User>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE email = ?"
    );
    sqlx::query_as(QUERY)
        .bind(email)
        .fetch_optional(ctx.db())
        .await
}

pub async fn create<C: Context>(
    ctx: &C,
    username: &str,
    username_safe: &str,
    password_hash: &str,
    email: &str,
) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (username, username_safe, password_hash, email) VALUES (?, ?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(username)
        .bind(username_safe)
        .bind(password_hash)
        .bind(email)
        .execute(ctx.db())
        .await?;
    Ok(result.last_insert_id() as i64)
}

fn active_filter(username: Option<&str>) -> (String, MySqlArguments) {
    let mut clause = String::from(" WHERE active = TRUE");
    let mut args = MySqlArguments::default();
    if let Some(username) = username {
        clause.push_str(" AND username LIKE CONCAT('%', ?, '%')");
        let _ = args.add(username);
    }
    (clause, args)
}

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    username: Option<&str>,
    page: u32,
    limit: u32,
) -> sqlx::Result<Vec<User>> {
    let (clause, mut args) = active_filter(username);
    let query = format!(
        "SELECT {READ_FIELDS} FROM {TABLE_NAME}{clause} ORDER BY username ASC LIMIT ? OFFSET ?"
    );
    let _ = args.add(limit);
    let _ = args.add((page.saturating_sub(1)) * limit);
    sqlx::query_as_with(&query, args).fetch_all(ctx.db()).await
}

pub async fn count_entries<C: Context>(ctx: &C, username: Option<&str>) -> sqlx::Result<i64> {
    let (clause, args) = active_filter(username);
    let query = format!("SELECT COUNT(*) FROM {TABLE_NAME}{clause}");
    sqlx::query_scalar_with(&query, args)
        .fetch_one(ctx.db())
        .await
}

pub async fn set_active<C: Context>(ctx: &C, user_id: i64, active: bool) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!("UPDATE ", TABLE_NAME, " SET active = ? WHERE id = ?");
    sqlx::query(QUERY)
        .bind(active)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn set_email_verified<C: Context>(ctx: &C, user_id: i64) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET email_verified = TRUE WHERE id = ?"
    );
    sqlx::query(QUERY).bind(user_id).execute(ctx.db()).await?;
    Ok(())
}

pub async fn update_password<C: Context>(
    ctx: &C,
    user_id: i64,
    password_hash: &str,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET password_hash = ? WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(password_hash)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn update_profile_photo<C: Context>(
    ctx: &C,
    user_id: i64,
    profile_photo_url: Option<&str>,
) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET profile_photo_url = ? WHERE id = ?"
    );
    sqlx::query(QUERY)
        .bind(profile_photo_url)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}
