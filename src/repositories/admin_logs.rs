use crate::common::context::Context;
use crate::entities::admin_logs::AdminLogEntry;
use crate::models::admin::AdminAction;
use chrono::{DateTime, Utc};
use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;

const TABLE_NAME: &str = "admin_logs";

pub async fn insert<C: Context>(
    ctx: &C,
    admin_id: i64,
    action: AdminAction,
    item_id: i64,
    reason: Option<&str>,
) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (admin_id, action, item_id, reason) VALUES (?, ?, ?, ?)"
    );
    let result = sqlx::query(QUERY)
        .bind(admin_id)
        .bind(action as i16)
        .bind(item_id)
        .bind(reason)
        .execute(ctx.db())
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub struct AdminLogsFilter {
    pub admin_id: Option<i64>,
    pub action: Option<i16>,
    pub item_id: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

fn logs_filter(filter: &AdminLogsFilter) -> (String, MySqlArguments) {
    let mut clause = String::from(" WHERE 1 = 1");
    let mut args = MySqlArguments::default();
    if let Some(admin_id) = filter.admin_id {
        clause.push_str(" AND l.admin_id = ?");
        let _ = args.add(admin_id);
    }
    if let Some(action) = filter.action {
        clause.push_str(" AND l.action = ?");
        let _ = args.add(action);
    }
    if let Some(item_id) = filter.item_id {
        clause.push_str(" AND l.item_id = ?");
        let _ = args.add(item_id);
    }
    if let Some(start_date) = filter.start_date {
        clause.push_str(" AND l.created_at >= ?");
        let _ = args.add(start_date);
    }
    if let Some(end_date) = filter.end_date {
        clause.push_str(" AND l.created_at <= ?");
        let _ = args.add(end_date);
    }
    (clause, args)
}

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    filter: &AdminLogsFilter,
    page: u32,
    limit: u32,
) -> sqlx::Result<Vec<AdminLogEntry>> {
    let (clause, mut args) = logs_filter(filter);
    let query = format!(
        r#"
            SELECT l.id, l.admin_id, u.username AS admin_username,
            l.action, l.item_id, l.reason, l.created_at
            FROM {TABLE_NAME} l
            INNER JOIN users u ON u.id = l.admin_id
            {clause}
            ORDER BY l.created_at DESC
            LIMIT ? OFFSET ?
        "#
    );
    let _ = args.add(limit);
    let _ = args.add((page.saturating_sub(1)) * limit);
    sqlx::query_as_with(&query, args).fetch_all(ctx.db()).await
}

pub async fn count_entries<C: Context>(ctx: &C, filter: &AdminLogsFilter) -> sqlx::Result<i64> {
    let (clause, args) = logs_filter(filter);
    let query = format!("SELECT COUNT(*) FROM {TABLE_NAME} l{clause}");
    sqlx::query_scalar_with(&query, args)
        .fetch_one(ctx.db())
        .await
}
