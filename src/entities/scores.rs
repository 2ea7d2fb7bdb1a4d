use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Score {
    pub id: i64,
    pub song_id: i64,
    pub uploader_id: i64,
    #[sqlx(default)]
    pub band_score_id: Option<i64>,
    pub replay_hash: String,
    pub replay_path: String,
    pub hidden: bool,
    pub instrument: i16,
    #[sqlx(default)]
    pub difficulty: Option<i16>,
    #[sqlx(default)]
    pub engine: Option<i16>,
    pub modifiers: i32,
    pub song_speed: f32,
    pub game_version: String,
    #[sqlx(default)]
    pub profile_name: Option<String>,
    pub score: i64,
    pub stars: i32,
    #[sqlx(default)]
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub star_power_phrases_hit: i32,
    pub star_power_activation_count: i32,
    #[sqlx(default)]
    pub overhits: Option<i32>,
    #[sqlx(default)]
    pub ghost_inputs: Option<i32>,
    #[sqlx(default)]
    pub sustain_score: Option<i64>,
    pub solo_bonuses: i64,
    pub created_at: DateTime<Utc>,
}

/// Leaderboard page row: the best qualifying score of one uploader,
/// joined with their public username.
#[derive(Debug, FromRow)]
pub struct LeaderboardScore {
    pub id: i64,
    pub song_id: i64,
    pub uploader_id: i64,
    pub uploader_username: String,
    pub instrument: i16,
    #[sqlx(default)]
    pub difficulty: Option<i16>,
    #[sqlx(default)]
    pub engine: Option<i16>,
    pub modifiers: i32,
    pub song_speed: f32,
    pub score: i64,
    pub stars: i32,
    #[sqlx(default)]
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct MinimalScore {
    pub id: i64,
    pub uploader_id: i64,
    pub replay_hash: String,
    pub replay_path: String,
}
