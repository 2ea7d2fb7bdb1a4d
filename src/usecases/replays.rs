use crate::adapters::validator::{self, PlayerEntry, ReplayResults, SongParams};
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::common::hash::sha1_file;
use crate::common::integrity;
use crate::common::storage::{TempSet, UploadKind, chart_file_path, promote, replay_file_path};
use crate::entities::songs::Song;
use crate::models::instruments::Instrument;
use crate::models::modifiers::{GAME_VERSION, Modifiers};
use crate::models::replays::ReqType;
use crate::models::scores::NewScore;
use crate::models::songs::NewSong;
use crate::repositories::{is_unique_violation, scores, songs};
use crate::usecases::songs as songs_usecases;
use std::path::PathBuf;
use tracing::warn;

/// What the multipart stream actually delivered into the temp set.
#[derive(Debug, Default)]
pub struct UploadSummary {
    pub req_type: Option<ReqType>,
    pub has_replay: bool,
    pub chart: Option<UploadKind>,
    pub songdata: Option<UploadKind>,
}

/// Outcome of the song resolution step. Either branch carries everything
/// the rest of the workflow needs, so no "song missing" state can exist
/// past this point.
enum SongResolution {
    Existing(Song),
    New { song: NewSong, params: SongParams },
}

pub async fn register<C: Context>(
    ctx: &C,
    uploader_id: i64,
    temp: &TempSet,
    upload: &UploadSummary,
) -> ServiceResult<i64> {
    let Some(req_type) = upload.req_type else {
        return Err(AppError::ReplaysNoReqType);
    };
    if !upload.has_replay {
        return Err(AppError::ReplaysNoFileUploaded);
    }

    let replay_hash = sha1_file(&temp.replay).await?;

    // Claim the hash up front; the primary key resolves concurrent uploads
    // of the same replay, the pre-check only shortcuts the common case.
    if scores::replay_hash_exists(ctx, &replay_hash).await? {
        return Err(AppError::ReplaysDuplicateScore);
    }
    match scores::register_replay_upload(ctx, &replay_hash, uploader_id).await {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => return Err(AppError::ReplaysDuplicateScore),
        Err(e) => return unexpected(e),
    }

    match validate_and_persist(ctx, uploader_id, temp, upload, req_type, &replay_hash).await {
        Ok(song_id) => Ok(song_id),
        Err(e) => {
            // The claim must not outlive a failed registration
            if let Err(release_err) = scores::release_replay_upload(ctx, &replay_hash).await {
                warn!("Failed to release replay upload claim: {release_err}");
            }
            Err(e)
        }
    }
}

async fn validate_and_persist<C: Context>(
    ctx: &C,
    uploader_id: i64,
    temp: &TempSet,
    upload: &UploadSummary,
    req_type: ReqType,
    replay_hash: &str,
) -> ServiceResult<i64> {
    integrity::check_replay_file(&temp.replay).await?;

    let claimed_checksum = validator::song_hash(ctx.config(), &temp.replay).await?;
    let resolution = resolve_song(ctx, temp, upload, req_type, &claimed_checksum).await?;

    let (chart_path, params, song_known): (PathBuf, SongParams, bool) = match &resolution {
        SongResolution::Existing(song) => (
            chart_file_path(&ctx.config().storage, &song.checksum, song.is_chart),
            SongParams::from_song(song),
            true,
        ),
        SongResolution::New { song, params } => {
            let kind = if song.is_chart {
                UploadKind::Chart
            } else {
                UploadKind::Midi
            };
            (temp.path(kind).to_path_buf(), params.clone(), false)
        }
    };

    let results =
        validator::replay_info(ctx.config(), &temp.replay, &chart_path, song_known, &params)
            .await?;
    if results.header.band_score == 0 {
        return Err(AppError::ReplaysNoNotesHit);
    }

    let song_id = match resolution {
        SongResolution::Existing(song) => song.id,
        SongResolution::New { mut song, .. } => {
            if song.metadata.hopo_frequency.is_none() {
                if let Some(frequency) = results.hopo_frequency.filter(|f| *f >= 0) {
                    song.metadata.hopo_frequency = Some(frequency);
                }
            }
            let Some(chart_data) = results.chart_data.as_ref() else {
                warn!("Validator returned no chart data for a new song");
                return Err(AppError::Unexpected);
            };
            let parts = songs_usecases::instruments_from_counts(chart_data);
            songs_usecases::persist_new_song(ctx, &song, &parts, &chart_path).await?
        }
    };

    persist_scores(ctx, uploader_id, song_id, replay_hash, temp, &results).await?;
    Ok(song_id)
}

/// Song resolution per request mode. `Existing` reuses the stored chart;
/// `New` is only constructible with a verified chart + parsed metadata.
async fn resolve_song<C: Context>(
    ctx: &C,
    temp: &TempSet,
    upload: &UploadSummary,
    req_type: ReqType,
    claimed_checksum: &str,
) -> ServiceResult<SongResolution> {
    if let Some(song) = songs::fetch_one_by_checksum(ctx, claimed_checksum).await? {
        // Needlessly uploaded chart/metadata files stay in the temp set
        // and die with the request-level cleanup
        return Ok(SongResolution::Existing(song));
    }
    if req_type == ReqType::ReplayOnly {
        return Err(AppError::ReplaysSongDataRequired);
    }

    let Some(chart_kind) = upload.chart else {
        return Err(AppError::ReplaysSongDataRequired);
    };
    let Some(songdata_kind) = upload.songdata else {
        return Err(AppError::ReplaysSongDataRequired);
    };

    integrity::check_chart_files(&temp.chart, &temp.midi).await?;

    // The uploaded chart must be the exact chart the replay was played on
    let chart_hash = sha1_file(temp.path(chart_kind)).await?;
    if chart_hash != claimed_checksum {
        return Err(AppError::ReplaysSongHashMismatch(
            claimed_checksum.to_owned(),
            chart_hash,
        ));
    }

    let parsed = songs_usecases::parse_song_data(temp, songdata_kind).await?;
    let is_chart = chart_kind == UploadKind::Chart;
    let song = NewSong {
        checksum: claimed_checksum.to_owned(),
        metadata: parsed.metadata,
        is_chart,
        is_rb3con: !is_chart && songdata_kind == UploadKind::Dta,
    };
    let params = SongParams {
        is_rb3con: song.is_rb3con,
        pro_drums: song.metadata.pro_drums,
        five_lane_drums: song.metadata.five_lane_drums,
        sustain_cutoff_threshold: song.metadata.sustain_cutoff_threshold,
        multiplier_note: song.metadata.multiplier_note,
        eighth_note_hopo: parsed.eighth_note_hopo,
        hopo_freq: parsed.hopo_freq,
    };
    Ok(SongResolution::New { song, params })
}

fn player_score(
    player: &PlayerEntry,
    song_id: i64,
    uploader_id: i64,
    replay_hash: &str,
    replay_path: &str,
    song_speed: f32,
) -> NewScore {
    let stats = &player.stats;
    let profile = &player.profile;
    NewScore {
        song_id,
        uploader_id,
        band_score_id: None,
        replay_hash: replay_hash.to_owned(),
        replay_path: replay_path.to_owned(),
        instrument: profile.current_instrument,
        difficulty: Some(profile.current_difficulty),
        engine: Some(player.engine as i16),
        modifiers: Modifiers::from_bits_truncate(profile.current_modifiers),
        song_speed,
        game_version: GAME_VERSION.to_owned(),
        profile_name: Some(profile.name.clone()),
        score: stats.total_score,
        stars: stats.stars,
        percent: stats.percent,
        notes_hit: stats.notes_hit,
        max_combo: stats.max_combo,
        star_power_phrases_hit: stats.star_power_phrases_hit,
        star_power_activation_count: stats.star_power_activation_count,
        // Overstrum for frets, overhit for drums/keys, neither for vocals
        overhits: stats.overstrums.or(stats.overhits),
        ghost_inputs: stats.ghost_inputs,
        sustain_score: stats.sustain_score,
        solo_bonuses: stats.solo_bonuses,
    }
}

async fn persist_scores<C: Context>(
    ctx: &C,
    uploader_id: i64,
    song_id: i64,
    replay_hash: &str,
    temp: &TempSet,
    results: &ReplayResults,
) -> ServiceResult<()> {
    let replay_path = format!("{replay_hash}.replay");
    let song_speed = results.header.song_speed;

    let mut band_valid = true;
    let mut player_scores = Vec::new();
    for player in &results.players {
        // Profiles that never played are not scores
        if player.stats.total_score == 0 {
            continue;
        }
        // Custom engines cannot be simulated, so they invalidate the band
        // aggregate while the remaining players still count individually
        if player.engine == -1 {
            band_valid = false;
            continue;
        }
        player_scores.push(player_score(
            player,
            song_id,
            uploader_id,
            replay_hash,
            &replay_path,
            song_speed,
        ));
    }
    if player_scores.is_empty() {
        return Err(AppError::ReplaysNoValidPlayers);
    }

    let band_modifiers = player_scores
        .iter()
        .fold(Modifiers::empty(), |acc, score| acc | score.modifiers);

    promote(
        &temp.replay,
        &replay_file_path(&ctx.config().storage, replay_hash),
    )
    .await?;

    let band_score_id = if band_valid {
        let band = NewScore {
            song_id,
            uploader_id,
            band_score_id: None,
            replay_hash: replay_hash.to_owned(),
            replay_path: replay_path.clone(),
            instrument: Instrument::Band as i16,
            difficulty: None,
            engine: None,
            modifiers: band_modifiers,
            song_speed,
            game_version: GAME_VERSION.to_owned(),
            profile_name: None,
            score: results.header.band_score,
            stars: results.header.band_stars,
            percent: None,
            notes_hit: player_scores.iter().map(|s| s.notes_hit).sum(),
            max_combo: player_scores.iter().map(|s| s.max_combo).max().unwrap_or(0),
            star_power_phrases_hit: player_scores
                .iter()
                .map(|s| s.star_power_phrases_hit)
                .sum(),
            star_power_activation_count: player_scores
                .iter()
                .map(|s| s.star_power_activation_count)
                .sum(),
            overhits: None,
            ghost_inputs: None,
            sustain_score: None,
            solo_bonuses: player_scores.iter().map(|s| s.solo_bonuses).sum(),
        };
        Some(scores::insert(ctx, &band).await?)
    } else {
        None
    };

    for mut score in player_scores {
        score.band_score_id = band_score_id;
        scores::insert(ctx, &score).await?;
    }
    Ok(())
}
