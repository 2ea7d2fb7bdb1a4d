use crate::common::config::AppConfig;
use crate::common::error::{AppError, ServiceResult};
use crate::common::hash::hex_encode;
use crate::entities::songs::Song;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hashbrown::HashMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tokio::process::Command;
use tracing::error;

/// Read mode for the validator's `-m` parameter.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadMode {
    ReplayOnly = 0,
    ReplayAndChart = 1,
    ChartOnly = 2,
    HashOnly = 3,
}

/// Chart-affecting parameters forwarded to the validator. The two trailing
/// fields come from the metadata extractor, never from a persisted song.
#[derive(Debug, Default, Clone)]
pub struct SongParams {
    pub is_rb3con: bool,
    pub pro_drums: Option<bool>,
    pub five_lane_drums: Option<bool>,
    pub sustain_cutoff_threshold: Option<i32>,
    pub multiplier_note: Option<i32>,
    pub eighth_note_hopo: Option<bool>,
    pub hopo_freq: Option<i32>,
}

impl SongParams {
    pub fn from_song(song: &Song) -> SongParams {
        SongParams {
            is_rb3con: song.is_rb3con,
            pro_drums: song.pro_drums,
            five_lane_drums: song.five_lane_drums,
            sustain_cutoff_threshold: song.sustain_cutoff_threshold,
            multiplier_note: song.multiplier_note,
            eighth_note_hopo: None,
            hopo_freq: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashPayload {
    pub hash_bytes: String,
}

impl HashPayload {
    /// The validator emits hashes base64 encoded; everything downstream
    /// works with lowercase hex.
    pub fn to_hex(&self) -> ServiceResult<String> {
        let bytes = BASE64
            .decode(&self.hash_bytes)
            .map_err(|e| AppError::from(e))?;
        Ok(hex_encode(&bytes))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HashResults {
    song_checksum: HashPayload,
}

pub type CountMap = HashMap<String, HashMap<String, i32>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub note_count: CountMap,
    pub star_power_count: CountMap,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayHeader {
    pub song_speed: f32,
    pub band_score: i64,
    pub band_stars: i32,
    pub song_checksum: HashPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub name: String,
    pub current_instrument: i16,
    pub current_difficulty: i16,
    pub current_modifiers: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_score: i64,
    pub stars: i32,
    pub percent: Option<f32>,
    pub notes_hit: i32,
    pub max_combo: i32,
    pub star_power_phrases_hit: i32,
    pub star_power_activation_count: i32,
    pub solo_bonuses: i64,
    pub overstrums: Option<i32>,
    pub overhits: Option<i32>,
    pub ghost_inputs: Option<i32>,
    pub sustain_score: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerEntry {
    pub profile: PlayerProfile,
    pub stats: PlayerStats,
    pub engine: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReplayResults {
    replay_info: ReplayHeader,
    replay_data: HashMap<String, PlayerEntry>,
    chart_data: Option<ChartData>,
    hopo_frequency: Option<i32>,
}

#[derive(Debug)]
pub struct ReplayResults {
    pub header: ReplayHeader,
    pub players: Vec<PlayerEntry>,
    pub chart_data: Option<ChartData>,
    pub hopo_frequency: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongResults {
    pub chart_data: ChartData,
    pub hopo_frequency: Option<i32>,
}

/// The validator emits C#-style PascalCase keys. Object keys are lowered to
/// camelCase recursively; arrays and primitives pass through unchanged.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let normalized = map
                .into_iter()
                .map(|(key, value)| {
                    let mut chars = key.chars();
                    let key = match chars.next() {
                        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
                        None => key,
                    };
                    (key, normalize_keys(value))
                })
                .collect();
            Value::Object(normalized)
        }
        other => other,
    }
}

fn bool_arg(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

async fn run_validator(
    config: &AppConfig,
    replay: Option<&Path>,
    chart: Option<&Path>,
    mode: ReadMode,
    params: Option<&SongParams>,
) -> ServiceResult<Value> {
    let validator = &config.validator;
    let mut command = match &validator.dotnet_path {
        Some(dotnet) => {
            let mut command = Command::new(dotnet);
            command.arg(&validator.binary);
            command
        }
        None => Command::new(&validator.binary),
    };

    // The validator requires a positional replay argument even in
    // chart-only mode; a placeholder stands in when there is no replay.
    match replay {
        Some(replay) => command.arg(replay),
        None => command.arg("_"),
    };
    if let Some(chart) = chart {
        command.arg(chart);
    }
    command.args(["-m", &(mode as u8).to_string()]);

    if let Some(params) = params {
        if params.is_rb3con {
            command.args(["-c", "true"]);
        }
        if let Some(pro_drums) = params.pro_drums {
            command.args(["-p", bool_arg(pro_drums)]);
        }
        if let Some(five_lane_drums) = params.five_lane_drums {
            command.args(["-g", bool_arg(five_lane_drums)]);
        }
        if let Some(sustain) = params.sustain_cutoff_threshold {
            command.args(["-s", &sustain.to_string()]);
        }
        if let Some(multiplier_note) = params.multiplier_note {
            command.args(["-n", &multiplier_note.to_string()]);
        }
        if let Some(eighth_note_hopo) = params.eighth_note_hopo {
            command.args(["-e", bool_arg(eighth_note_hopo)]);
        }
        if let Some(hopo_freq) = params.hopo_freq {
            command.args(["-f", &hopo_freq.to_string()]);
        }
    }

    let output = command.output().await?;
    if !output.stderr.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("Validator reported an error: {stderr}");
        return Err(match config.dev_mode {
            true => AppError::UnexpectedDetailed(stderr.trim().to_owned()),
            false => AppError::Unexpected,
        });
    }

    let stdout: Value = serde_json::from_slice(&output.stdout)?;
    Ok(normalize_keys(stdout))
}

/// Hash-only query: which chart was this replay played against?
pub async fn song_hash(config: &AppConfig, replay: &Path) -> ServiceResult<String> {
    let value = run_validator(config, Some(replay), None, ReadMode::HashOnly, None).await?;
    let results: HashResults = serde_json::from_value(value)?;
    results.song_checksum.to_hex()
}

/// Full validation of a replay against a chart. `song_known` switches the
/// validator to replay-only simulation against its cached chart data.
pub async fn replay_info(
    config: &AppConfig,
    replay: &Path,
    chart: &Path,
    song_known: bool,
    params: &SongParams,
) -> ServiceResult<ReplayResults> {
    let mode = if song_known {
        ReadMode::ReplayOnly
    } else {
        ReadMode::ReplayAndChart
    };
    let value = run_validator(config, Some(replay), Some(chart), mode, Some(params)).await?;
    let raw: RawReplayResults = serde_json::from_value(value)?;

    // Players arrive as an object keyed by stringified slot index
    let mut players: Vec<(usize, PlayerEntry)> = raw
        .replay_data
        .into_iter()
        .filter_map(|(index, player)| index.parse::<usize>().ok().map(|i| (i, player)))
        .collect();
    players.sort_by_key(|(index, _)| *index);

    Ok(ReplayResults {
        header: raw.replay_info,
        players: players.into_iter().map(|(_, player)| player).collect(),
        chart_data: raw.chart_data,
        hopo_frequency: raw.hopo_frequency,
    })
}

/// Chart-only query used by the admin song-add path.
pub async fn song_info(
    config: &AppConfig,
    chart: &Path,
    params: &SongParams,
) -> ServiceResult<SongResults> {
    let value = run_validator(config, None, Some(chart), ReadMode::ChartOnly, Some(params)).await?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_keys_recurses_into_nested_objects() {
        let value = json!({
            "ReplayInfo": {
                "BandScore": 123,
                "SongChecksum": { "HashBytes": "qrvM" }
            },
            "already": true
        });
        let normalized = normalize_keys(value);
        assert_eq!(normalized["replayInfo"]["bandScore"], 123);
        assert_eq!(normalized["replayInfo"]["songChecksum"]["hashBytes"], "qrvM");
        assert_eq!(normalized["already"], true);
    }

    #[test]
    fn normalize_keys_leaves_arrays_and_primitives_untouched() {
        let value = json!({ "Items": [ { "Inner": 1 } ], "N": 2 });
        let normalized = normalize_keys(value);
        // arrays pass through as-is, including objects inside them
        assert_eq!(normalized["items"][0]["Inner"], 1);
        assert_eq!(normalized["n"], 2);
    }

    #[test]
    fn hash_payload_decodes_base64_to_hex() {
        let payload = HashPayload {
            hash_bytes: "qrvM".to_owned(),
        };
        assert_eq!(payload.to_hex().unwrap(), "aabbcc");
    }

    #[test]
    fn replay_results_players_sorted_by_slot() {
        let value = normalize_keys(json!({
            "ReplayInfo": {
                "SongSpeed": 1.0,
                "BandScore": 1000,
                "BandStars": 5,
                "SongChecksum": { "HashBytes": "qrvM" }
            },
            "ReplayData": {
                "1": {
                    "Profile": { "Name": "second", "CurrentInstrument": 0, "CurrentDifficulty": 4, "CurrentModifiers": 0 },
                    "Stats": { "TotalScore": 1, "Stars": 1, "NotesHit": 1, "MaxCombo": 1, "StarPowerPhrasesHit": 0, "StarPowerActivationCount": 0, "SoloBonuses": 0 },
                    "Engine": 0
                },
                "0": {
                    "Profile": { "Name": "first", "CurrentInstrument": 0, "CurrentDifficulty": 4, "CurrentModifiers": 0 },
                    "Stats": { "TotalScore": 2, "Stars": 2, "NotesHit": 2, "MaxCombo": 2, "StarPowerPhrasesHit": 0, "StarPowerActivationCount": 0, "SoloBonuses": 0 },
                    "Engine": 0
                }
            },
            "HopoFrequency": 170
        }));
        let raw: RawReplayResults = serde_json::from_value(value).unwrap();
        let mut players: Vec<(usize, PlayerEntry)> = raw
            .replay_data
            .into_iter()
            .filter_map(|(index, player)| index.parse::<usize>().ok().map(|i| (i, player)))
            .collect();
        players.sort_by_key(|(index, _)| *index);
        assert_eq!(players[0].1.profile.name, "first");
        assert_eq!(players[1].1.profile.name, "second");
    }
}
