use crate::adapters::validator::{self, ChartData, SongParams};
use crate::adapters::discord;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::common::hash::sha1_file;
use crate::common::integrity;
use crate::common::storage::{TempSet, UploadKind, chart_file_path, promote};
use crate::entities::songs::Song;
use crate::models::admin::{AdminAction, SongDeleteArgs};
use crate::models::replies::Paginated;
use crate::models::songdata::{ParsedSongData, SongData};
use crate::models::songs::{
    NewSong, NewSongInstrument, SongDetail, SongEntriesArgs, SongEntry, SongSort, SongUpdateArgs,
};
use crate::models::users::User;
use crate::repositories::songs::{SongEntriesFilter, SongMetadataPatch};
use crate::repositories::{admin_logs, is_unique_violation, scores, songs};
use crate::usecases::replays::UploadSummary;
use tokio::fs;
use tracing::warn;

const DEFAULT_PAGE_SIZE: u32 = 15;

pub async fn fetch_one<C: Context>(ctx: &C, song_id: i64) -> ServiceResult<Song> {
    match songs::fetch_one(ctx, song_id).await {
        Ok(song) => Ok(song),
        Err(sqlx::Error::RowNotFound) => Err(AppError::SongsNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_detail<C: Context>(ctx: &C, song_id: i64) -> ServiceResult<SongDetail> {
    let song = fetch_one(ctx, song_id).await?;
    let parts = songs::fetch_instruments(ctx, song_id).await?;
    Ok(SongDetail::from_entity(&song, &parts))
}

pub async fn hash_to_id<C: Context>(ctx: &C, checksum: &str) -> ServiceResult<i64> {
    match songs::fetch_one_by_checksum(ctx, checksum).await? {
        Some(song) => Ok(song.id),
        None => Err(AppError::SongsNotFound),
    }
}

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    args: &SongEntriesArgs,
) -> ServiceResult<Paginated<SongEntry>> {
    let sort = match args.sort {
        Some(value) => Some(SongSort::try_from(value).map_err(|_| AppError::InvalidInput)?),
        None => None,
    };
    let filter = SongEntriesFilter {
        name: args.name.as_deref(),
        artist: args.artist.as_deref(),
        charter: args.charter.as_deref(),
        sort,
        descending: args.descending.unwrap_or(false),
    };
    let page = args.page.unwrap_or(1).max(1);
    let limit = args.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let entries = songs::fetch_entries(ctx, &filter, page, limit).await?;
    let total = songs::count_entries(ctx, &filter).await?;
    let entries = entries.iter().map(SongEntry::from).collect();
    Ok(Paginated::new(total, page, limit, entries))
}

/// Flattens the validator's per-instrument/difficulty count maps into the
/// rows persisted with a new song.
pub fn instruments_from_counts(chart_data: &ChartData) -> Vec<NewSongInstrument> {
    let mut parts = Vec::new();
    for (instrument, difficulties) in &chart_data.note_count {
        let Ok(instrument_code) = instrument.parse::<i16>() else {
            continue;
        };
        for (difficulty, notes) in difficulties {
            let Ok(difficulty_code) = difficulty.parse::<i16>() else {
                continue;
            };
            let star_power_phrases = chart_data
                .star_power_count
                .get(instrument)
                .and_then(|counts| counts.get(difficulty))
                .copied()
                .unwrap_or(0);
            parts.push(NewSongInstrument {
                instrument: instrument_code,
                difficulty: difficulty_code,
                notes: *notes,
                star_power_phrases,
            });
        }
    }
    parts.sort_by_key(|part| (part.instrument, part.difficulty));
    parts
}

/// Inserts the song and its instrument rows and moves the chart file into
/// permanent storage. The unique checksum index resolves races between two
/// concurrent registrations of the same chart.
pub async fn persist_new_song<C: Context>(
    ctx: &C,
    song: &NewSong,
    parts: &[NewSongInstrument],
    chart_temp: &std::path::Path,
) -> ServiceResult<i64> {
    let song_id = match songs::create(ctx, song).await {
        Ok(song_id) => song_id,
        Err(e) if is_unique_violation(&e) => return Err(AppError::SongsDuplicate),
        Err(e) => return unexpected(e),
    };
    songs::add_instruments(ctx, song_id, parts).await?;

    let permanent = chart_file_path(&ctx.config().storage, &song.checksum, song.is_chart);
    promote(chart_temp, &permanent).await?;
    Ok(song_id)
}

/// Reads the uploaded metadata file into its tagged format and parses it.
pub async fn parse_song_data(
    temp: &TempSet,
    songdata_kind: UploadKind,
) -> ServiceResult<ParsedSongData> {
    let content = fs::read_to_string(temp.path(songdata_kind)).await?;
    let songdata = match songdata_kind {
        UploadKind::Dta => SongData::Dta(content),
        _ => SongData::Ini(content),
    };
    songdata.parse()
}

/// Admin song registration: chart + metadata, no replay involved.
pub async fn admin_add<C: Context>(
    ctx: &C,
    admin: &User,
    temp: &TempSet,
    upload: &UploadSummary,
) -> ServiceResult<SongDetail> {
    let Some(chart_kind) = upload.chart else {
        return Err(AppError::SongsDataRequired);
    };
    let Some(songdata_kind) = upload.songdata else {
        return Err(AppError::SongsDataRequired);
    };

    let chart_temp = temp.path(chart_kind);
    let checksum = sha1_file(chart_temp).await?;
    if songs::fetch_one_by_checksum(ctx, &checksum).await?.is_some() {
        return Err(AppError::SongsDuplicate);
    }
    integrity::check_chart_files(&temp.chart, &temp.midi).await?;

    let parsed = parse_song_data(temp, songdata_kind).await?;
    let is_chart = chart_kind == UploadKind::Chart;
    let mut song = NewSong {
        checksum,
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

    let info = validator::song_info(ctx.config(), chart_temp, &params).await?;
    if song.metadata.hopo_frequency.is_none() {
        if let Some(frequency) = info.hopo_frequency.filter(|f| *f >= 0) {
            song.metadata.hopo_frequency = Some(frequency);
        }
    }
    let parts = instruments_from_counts(&info.chart_data);
    let song_id = persist_new_song(ctx, &song, &parts, chart_temp).await?;

    admin_logs::insert(ctx, admin.user_id, AdminAction::SongAdd, song_id, None).await?;
    let description = format!(
        "{} - {} (#{song_id}) by {} (#{})",
        song.metadata.artist, song.metadata.name, admin.username, admin.user_id,
    );
    if let Err(e) =
        discord::admin_action(ctx.config(), AdminAction::SongAdd.describe(), &description).await
    {
        warn!("Failed to notify admin action: {e:?}");
    }

    fetch_detail(ctx, song_id).await
}

/// Partial metadata patch; identity (checksum) is not editable.
pub async fn admin_update<C: Context>(
    ctx: &C,
    admin: &User,
    args: &SongUpdateArgs,
) -> ServiceResult<SongDetail> {
    let song_id = args.require_id()?;
    let _ = fetch_one(ctx, song_id).await?;

    let patch = SongMetadataPatch {
        name: args.name.as_deref(),
        artist: args.artist.as_deref(),
        charter: args.charter.as_deref(),
        album: args.album.as_deref(),
        year: args.year.as_deref(),
        pro_drums: args.pro_drums,
        five_lane_drums: args.five_lane_drums,
        sustain_cutoff_threshold: args.sustain_cutoff_threshold,
        hopo_frequency: args.hopo_frequency,
        multiplier_note: args.multiplier_note,
    };
    songs::update_metadata(ctx, song_id, &patch).await?;

    admin_logs::insert(
        ctx,
        admin.user_id,
        AdminAction::SongUpdate,
        song_id,
        args.reason.as_deref(),
    )
    .await?;
    let description = format!(
        "Song #{song_id} by {} (#{}): {}",
        admin.username,
        admin.user_id,
        args.reason.as_deref().unwrap_or_default(),
    );
    if let Err(e) =
        discord::admin_action(ctx.config(), AdminAction::SongUpdate.describe(), &description).await
    {
        warn!("Failed to notify admin action: {e:?}");
    }

    fetch_detail(ctx, song_id).await
}

/// Removes the song, its instrument rows, every score registered on it and
/// the stored chart file.
pub async fn admin_delete<C: Context>(
    ctx: &C,
    admin: &User,
    args: &SongDeleteArgs,
) -> ServiceResult<u64> {
    let Some(song_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let song = fetch_one(ctx, song_id).await?;

    let deleted_scores = scores::delete_by_song(ctx, song_id).await?;
    songs::delete(ctx, song_id).await?;

    let chart = chart_file_path(&ctx.config().storage, &song.checksum, song.is_chart);
    if fs::try_exists(&chart).await.unwrap_or(false) {
        if let Err(e) = fs::remove_file(&chart).await {
            warn!("Failed to remove chart file {}: {e}", chart.display());
        }
    }

    admin_logs::insert(
        ctx,
        admin.user_id,
        AdminAction::SongDelete,
        song_id,
        args.reason.as_deref(),
    )
    .await?;
    let description = format!(
        "{} - {} (#{song_id}) by {} (#{}): {}",
        song.artist,
        song.name,
        admin.username,
        admin.user_id,
        args.reason.as_deref().unwrap_or_default(),
    );
    if let Err(e) =
        discord::admin_action(ctx.config(), AdminAction::SongDelete.describe(), &description).await
    {
        warn!("Failed to notify admin action: {e:?}");
    }

    Ok(deleted_scores)
}
