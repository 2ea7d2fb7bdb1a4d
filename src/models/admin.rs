use crate::entities::admin_logs::AdminLogEntry as AdminLogRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};

/// Append-only audit actions. Values are persisted; add new items at the
/// end only.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    UserBan = 0,
    UserUnban = 1,
    SongAdd = 2,
    SongUpdate = 3,
    SongDelete = 4,
    ScoreDelete = 5,
    UserUpdate = 6,
}

impl TryFrom<i16> for AdminAction {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AdminAction::UserBan),
            1 => Ok(AdminAction::UserUnban),
            2 => Ok(AdminAction::SongAdd),
            3 => Ok(AdminAction::SongUpdate),
            4 => Ok(AdminAction::SongDelete),
            5 => Ok(AdminAction::ScoreDelete),
            6 => Ok(AdminAction::UserUpdate),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid admin action")),
        }
    }
}

impl AdminAction {
    pub const fn describe(&self) -> &'static str {
        match self {
            AdminAction::UserBan => "User banned",
            AdminAction::UserUnban => "User unbanned",
            AdminAction::SongAdd => "Song added",
            AdminAction::SongUpdate => "Song updated",
            AdminAction::SongDelete => "Song deleted",
            AdminAction::ScoreDelete => "Score deleted",
            AdminAction::UserUpdate => "User updated",
        }
    }
}

#[derive(Deserialize)]
pub struct UserBanArgs {
    pub id: Option<i64>,
    pub active: Option<bool>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct UserBanResponse {
    pub user: i64,
    pub active: bool,
}

#[derive(Deserialize)]
pub struct ScoreDeleteArgs {
    pub id: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct ScoreDeleteResponse {
    pub count: u64,
}

#[derive(Deserialize)]
pub struct SongDeleteArgs {
    pub id: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct AdminLogsArgs {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub admin: Option<i64>,
    pub action: Option<i16>,
    pub item: Option<i64>,
    #[serde(rename = "startDate")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(rename = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLogEntry {
    pub id: i64,
    pub admin: AdminLogAdmin,
    pub action: i16,
    pub item: i64,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct AdminLogAdmin {
    pub id: i64,
    pub username: String,
}

impl From<AdminLogRow> for AdminLogEntry {
    fn from(row: AdminLogRow) -> Self {
        Self {
            id: row.id,
            admin: AdminLogAdmin {
                id: row.admin_id,
                username: row.admin_username,
            },
            action: row.action,
            item: row.item_id,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}
