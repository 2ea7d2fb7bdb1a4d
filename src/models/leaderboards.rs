use crate::common::error::{AppError, ServiceResult};
use crate::entities::scores::LeaderboardScore;
use crate::models::instruments::{Difficulty, Instrument};
use crate::models::modifiers::{Engine, Modifiers};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardArgs {
    pub id: Option<i64>,
    pub instrument: Option<i16>,
    pub difficulty: Option<i16>,
    pub engine: Option<i16>,
    pub allowed_modifiers: Option<Vec<i32>>,
    pub allow_slowdowns: Option<bool>,
    pub sort_by_notes_hit: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardSort {
    Score,
    NotesHit,
}

/// Fully resolved leaderboard query. Difficulty and engine are `None` for
/// band queries, where those filters are meaningless.
#[derive(Debug, PartialEq)]
pub struct LeaderboardFilter {
    pub song_id: i64,
    pub instrument: Instrument,
    pub difficulty: Option<Difficulty>,
    pub engine: Option<Engine>,
    pub allowed_modifiers: Modifiers,
    pub allow_slowdowns: bool,
    pub sort: LeaderboardSort,
    pub page: u32,
    pub limit: u32,
}

impl LeaderboardFilter {
    pub fn resolve(args: LeaderboardArgs) -> ServiceResult<LeaderboardFilter> {
        let song_id = args
            .id
            .ok_or_else(|| AppError::InvalidQuery("id".to_owned()))?;

        let instrument = match args.instrument {
            Some(value) => Instrument::try_from(value).map_err(|_| AppError::InvalidInput)?,
            None => Instrument::Band,
        };
        let (difficulty, engine) = if instrument == Instrument::Band {
            (None, None)
        } else {
            let difficulty = match args.difficulty {
                Some(value) => Difficulty::try_from(value).map_err(|_| AppError::InvalidInput)?,
                None => Difficulty::Expert,
            };
            let engine = match args.engine {
                Some(value) => Engine::try_from(value).map_err(|_| AppError::InvalidInput)?,
                None => Engine::Default,
            };
            (Some(difficulty), Some(engine))
        };

        let allowed_modifiers = match &args.allowed_modifiers {
            Some(indices) => {
                Modifiers::from_indices(indices).map_err(|_| AppError::InvalidInput)?
            }
            None => Modifiers::default_allowed(),
        };

        let sort = if args.sort_by_notes_hit.unwrap_or(false) {
            LeaderboardSort::NotesHit
        } else {
            LeaderboardSort::Score
        };

        Ok(LeaderboardFilter {
            song_id,
            instrument,
            difficulty,
            engine,
            allowed_modifiers,
            allow_slowdowns: args.allow_slowdowns.unwrap_or(false),
            sort,
            page: args.page.unwrap_or(1).max(1),
            limit: args.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100),
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUploader {
    pub id: i64,
    pub username: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: i64,
    pub uploader: LeaderboardUploader,
    pub instrument: i16,
    pub difficulty: Option<i16>,
    pub engine: Option<i16>,
    pub modifiers: Vec<i32>,
    pub song_speed: f32,
    pub score: i64,
    pub stars: i32,
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub datetime: DateTime<Utc>,
}

impl From<LeaderboardScore> for LeaderboardEntry {
    fn from(row: LeaderboardScore) -> Self {
        Self {
            id: row.id,
            uploader: LeaderboardUploader {
                id: row.uploader_id,
                username: row.uploader_username,
            },
            instrument: row.instrument,
            difficulty: row.difficulty,
            engine: row.engine,
            modifiers: Modifiers::from_bits_retain(row.modifiers).indices(),
            song_speed: row.song_speed,
            score: row.score,
            stars: row.stars,
            percent: row.percent,
            notes_hit: row.notes_hit,
            max_combo: row.max_combo,
            datetime: row.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub count: i64,
    pub scores: Vec<LeaderboardEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for_song(song_id: i64) -> LeaderboardArgs {
        LeaderboardArgs {
            id: Some(song_id),
            ..Default::default()
        }
    }

    #[test]
    fn missing_song_id_is_rejected() {
        assert!(matches!(
            LeaderboardFilter::resolve(LeaderboardArgs::default()),
            Err(AppError::InvalidQuery(_))
        ));
    }

    #[test]
    fn defaults_match_the_band_leaderboard() {
        let filter = LeaderboardFilter::resolve(args_for_song(7)).unwrap();
        assert_eq!(filter.instrument, Instrument::Band);
        assert_eq!(filter.difficulty, None);
        assert_eq!(filter.engine, None);
        assert_eq!(filter.allowed_modifiers, Modifiers::default_allowed());
        assert!(!filter.allow_slowdowns);
        assert_eq!(filter.sort, LeaderboardSort::Score);
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn band_ignores_difficulty_and_engine() {
        let mut with_filters = args_for_song(7);
        with_filters.difficulty = Some(Difficulty::Easy as i16);
        with_filters.engine = Some(Engine::Precision as i16);

        let a = LeaderboardFilter::resolve(with_filters).unwrap();
        let b = LeaderboardFilter::resolve(args_for_song(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn non_band_gets_difficulty_and_engine_defaults() {
        let mut args = args_for_song(7);
        args.instrument = Some(Instrument::FiveFretGuitar as i16);
        let filter = LeaderboardFilter::resolve(args).unwrap();
        assert_eq!(filter.difficulty, Some(Difficulty::Expert));
        assert_eq!(filter.engine, Some(Engine::Default));
    }

    #[test]
    fn invalid_codes_are_validation_errors() {
        let mut args = args_for_song(7);
        args.instrument = Some(99);
        assert!(matches!(
            LeaderboardFilter::resolve(args),
            Err(AppError::InvalidInput)
        ));

        let mut args = args_for_song(7);
        args.allowed_modifiers = Some(vec![0, 42]);
        assert!(matches!(
            LeaderboardFilter::resolve(args),
            Err(AppError::InvalidInput)
        ));
    }

    #[test]
    fn page_zero_is_clamped_to_first_page() {
        let mut args = args_for_song(7);
        args.page = Some(0);
        let filter = LeaderboardFilter::resolve(args).unwrap();
        assert_eq!(filter.page, 1);
    }
}
