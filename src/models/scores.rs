use crate::entities::scores::Score as ScoreEntity;
use crate::models::modifiers::Modifiers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A score assembled by the registration workflow, not yet persisted.
#[derive(Debug, Clone)]
pub struct NewScore {
    pub song_id: i64,
    pub uploader_id: i64,
    pub band_score_id: Option<i64>,
    pub replay_hash: String,
    pub replay_path: String,
    pub instrument: i16,
    pub difficulty: Option<i16>,
    pub engine: Option<i16>,
    pub modifiers: Modifiers,
    pub song_speed: f32,
    pub game_version: String,
    pub profile_name: Option<String>,
    pub score: i64,
    pub stars: i32,
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub star_power_phrases_hit: i32,
    pub star_power_activation_count: i32,
    pub overhits: Option<i32>,
    pub ghost_inputs: Option<i32>,
    pub sustain_score: Option<i64>,
    pub solo_bonuses: i64,
}

#[derive(Deserialize)]
pub struct UserScoresArgs {
    pub id: Option<i64>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: i64,
    pub song: i64,
    pub uploader: i64,
    pub band_score: Option<i64>,
    pub instrument: i16,
    pub difficulty: Option<i16>,
    pub engine: Option<i16>,
    pub modifiers: Vec<i32>,
    pub song_speed: f32,
    pub game_version: String,
    pub profile_name: Option<String>,
    pub score: i64,
    pub stars: i32,
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub star_power_phrases_hit: i32,
    pub star_power_activation_count: i32,
    pub overhits: Option<i32>,
    pub ghost_inputs: Option<i32>,
    pub sustain_score: Option<i64>,
    pub solo_bonuses: i64,
    pub datetime: DateTime<Utc>,
}

impl From<ScoreEntity> for ScoreEntry {
    fn from(row: ScoreEntity) -> Self {
        Self {
            id: row.id,
            song: row.song_id,
            uploader: row.uploader_id,
            band_score: row.band_score_id,
            instrument: row.instrument,
            difficulty: row.difficulty,
            engine: row.engine,
            modifiers: Modifiers::from_bits_retain(row.modifiers).indices(),
            song_speed: row.song_speed,
            game_version: row.game_version,
            profile_name: row.profile_name,
            score: row.score,
            stars: row.stars,
            percent: row.percent,
            notes_hit: row.notes_hit,
            max_combo: row.max_combo,
            star_power_phrases_hit: row.star_power_phrases_hit,
            star_power_activation_count: row.star_power_activation_count,
            overhits: row.overhits,
            ghost_inputs: row.ghost_inputs,
            sustain_score: row.sustain_score,
            solo_bonuses: row.solo_bonuses,
            datetime: row.created_at,
        }
    }
}
