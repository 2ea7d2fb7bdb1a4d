use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct Song {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub artist: String,
    #[sqlx(default)]
    pub charter: Option<String>,
    #[sqlx(default)]
    pub album: Option<String>,
    #[sqlx(default)]
    pub year: Option<String>,
    #[sqlx(default)]
    pub pro_drums: Option<bool>,
    #[sqlx(default)]
    pub five_lane_drums: Option<bool>,
    #[sqlx(default)]
    pub sustain_cutoff_threshold: Option<i32>,
    #[sqlx(default)]
    pub hopo_frequency: Option<i32>,
    #[sqlx(default)]
    pub multiplier_note: Option<i32>,
    pub is_chart: bool,
    pub is_rb3con: bool,
    pub created_at: DateTime<Utc>,
}

/// One chartered part: which instrument/difficulty pairs exist on the chart
/// and how many notes and star power phrases each carries.
#[derive(Debug, FromRow)]
pub struct SongInstrument {
    pub song_id: i64,
    pub instrument: i16,
    pub difficulty: i16,
    pub notes: i32,
    pub star_power_phrases: i32,
}
