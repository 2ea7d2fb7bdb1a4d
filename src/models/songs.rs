use crate::common::error::{AppError, ServiceResult};
use crate::entities::songs::{Song as SongEntity, SongInstrument};
use crate::models::songdata::SongMetadata;
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};

/// A song parsed from an upload but not yet persisted. The checksum is the
/// SHA-1 of its chart file and becomes the song's permanent identity.
#[derive(Debug, Clone)]
pub struct NewSong {
    pub checksum: String,
    pub metadata: SongMetadata,
    pub is_chart: bool,
    pub is_rb3con: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct NewSongInstrument {
    pub instrument: i16,
    pub difficulty: i16,
    pub notes: i32,
    pub star_power_phrases: i32,
}

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongSort {
    Name = 1,
    Artist = 2,
    Charter = 3,
}

impl TryFrom<i16> for SongSort {
    type Error = Error;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SongSort::Name),
            2 => Ok(SongSort::Artist),
            3 => Ok(SongSort::Charter),
            _ => Err(Error::new(ErrorKind::InvalidData, "invalid song sort")),
        }
    }
}

impl SongSort {
    pub const fn column(&self) -> &'static str {
        match self {
            SongSort::Name => "name",
            SongSort::Artist => "artist",
            SongSort::Charter => "charter",
        }
    }
}

#[derive(Deserialize)]
pub struct SongEntriesArgs {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub charter: Option<String>,
    pub sort: Option<i16>,
    pub descending: Option<bool>,
}

#[derive(Deserialize)]
pub struct HashToIdArgs {
    pub hash: Option<String>,
}

#[derive(Deserialize)]
pub struct SongArgs {
    pub id: Option<i64>,
}

#[derive(Serialize)]
pub struct SongEntry {
    pub id: i64,
    pub name: String,
    pub artist: String,
    pub charter: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
}

impl From<&SongEntity> for SongEntry {
    fn from(song: &SongEntity) -> Self {
        Self {
            id: song.id,
            name: song.name.clone(),
            artist: song.artist.clone(),
            charter: song.charter.clone(),
            album: song.album.clone(),
            year: song.year.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableInstrument {
    pub instrument: i16,
    pub difficulty: i16,
    pub notes: i32,
    pub star_power_phrases: i32,
}

impl From<&SongInstrument> for AvailableInstrument {
    fn from(part: &SongInstrument) -> Self {
        Self {
            instrument: part.instrument,
            difficulty: part.difficulty,
            notes: part.notes,
            star_power_phrases: part.star_power_phrases,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetail {
    pub id: i64,
    pub checksum: String,
    pub name: String,
    pub artist: String,
    pub charter: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub pro_drums: Option<bool>,
    pub five_lane_drums: Option<bool>,
    pub sustain_cutoff_threshold: Option<i32>,
    pub hopo_frequency: Option<i32>,
    pub multiplier_note: Option<i32>,
    pub is_chart: bool,
    pub is_rb3con: bool,
    pub available_instruments: Vec<AvailableInstrument>,
}

impl SongDetail {
    pub fn from_entity(song: &SongEntity, parts: &[SongInstrument]) -> Self {
        Self {
            id: song.id,
            checksum: song.checksum.clone(),
            name: song.name.clone(),
            artist: song.artist.clone(),
            charter: song.charter.clone(),
            album: song.album.clone(),
            year: song.year.clone(),
            pro_drums: song.pro_drums,
            five_lane_drums: song.five_lane_drums,
            sustain_cutoff_threshold: song.sustain_cutoff_threshold,
            hopo_frequency: song.hopo_frequency,
            multiplier_note: song.multiplier_note,
            is_chart: song.is_chart,
            is_rb3con: song.is_rb3con,
            available_instruments: parts.iter().map(AvailableInstrument::from).collect(),
        }
    }
}

/// Partial metadata patch applied by admins. The checksum is identity and
/// stays untouchable.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongUpdateArgs {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub charter: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub pro_drums: Option<bool>,
    pub five_lane_drums: Option<bool>,
    pub sustain_cutoff_threshold: Option<i32>,
    pub hopo_frequency: Option<i32>,
    pub multiplier_note: Option<i32>,
    pub reason: Option<String>,
}

impl SongUpdateArgs {
    pub fn require_id(&self) -> ServiceResult<i64> {
        self.id.ok_or_else(|| AppError::InvalidQuery("id".to_owned()))
    }
}
