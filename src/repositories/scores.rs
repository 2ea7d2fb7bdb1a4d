use crate::common::context::Context;
use crate::entities::scores::{LeaderboardScore, MinimalScore, Score};
use crate::models::leaderboards::{LeaderboardFilter, LeaderboardSort};
use crate::models::scores::NewScore;
use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;

const TABLE_NAME: &str = "scores";
const READ_FIELDS: &str = r#"
id, song_id, uploader_id, band_score_id, replay_hash, replay_path, hidden,
instrument, difficulty, engine, modifiers, song_speed, game_version,
profile_name, score, stars, percent, notes_hit, max_combo,
star_power_phrases_hit, star_power_activation_count, overhits,
ghost_inputs, sustain_score, solo_bonuses, created_at"#;

/// Claims a replay hash for registration. The primary key on
/// `replay_uploads` is the authority on duplicate replays; a unique
/// violation here means the play was already registered.
pub async fn register_replay_upload<C: Context>(
    ctx: &C,
    replay_hash: &str,
    uploader_id: i64,
) -> sqlx::Result<()> {
    const QUERY: &str = "INSERT INTO replay_uploads (replay_hash, uploader_id) VALUES (?, ?)";
    sqlx::query(QUERY)
        .bind(replay_hash)
        .bind(uploader_id)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn release_replay_upload<C: Context>(ctx: &C, replay_hash: &str) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM replay_uploads WHERE replay_hash = ?")
        .bind(replay_hash)
        .execute(ctx.db())
        .await?;
    Ok(())
}

pub async fn replay_hash_exists<C: Context>(ctx: &C, replay_hash: &str) -> sqlx::Result<bool> {
    const QUERY: &str = "SELECT COUNT(*) FROM replay_uploads WHERE replay_hash = ?";
    let count: i64 = sqlx::query_scalar(QUERY)
        .bind(replay_hash)
        .fetch_one(ctx.db())
        .await?;
    Ok(count > 0)
}

pub async fn insert<C: Context>(ctx: &C, score: &NewScore) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        r#" (song_id, uploader_id, band_score_id, replay_hash, replay_path,
        instrument, difficulty, engine, modifiers, song_speed, game_version,
        profile_name, score, stars, percent, notes_hit, max_combo,
        star_power_phrases_hit, star_power_activation_count, overhits,
        ghost_inputs, sustain_score, solo_bonuses)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
    );
    let result = sqlx::query(QUERY)
        .bind(score.song_id)
        .bind(score.uploader_id)
        .bind(score.band_score_id)
        .bind(&score.replay_hash)
        .bind(&score.replay_path)
        .bind(score.instrument)
        .bind(score.difficulty)
        .bind(score.engine)
        .bind(score.modifiers.bits())
        .bind(score.song_speed)
        .bind(&score.game_version)
        .bind(&score.profile_name)
        .bind(score.score)
        .bind(score.stars)
        .bind(score.percent)
        .bind(score.notes_hit)
        .bind(score.max_combo)
        .bind(score.star_power_phrases_hit)
        .bind(score.star_power_activation_count)
        .bind(score.overhits)
        .bind(score.ghost_inputs)
        .bind(score.sustain_score)
        .bind(score.solo_bonuses)
        .execute(ctx.db())
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn fetch_one<C: Context>(ctx: &C, score_id: i64) -> sqlx::Result<Score> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(score_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_minimal<C: Context>(
    ctx: &C,
    score_id: i64,
) -> sqlx::Result<Option<MinimalScore>> {
    const QUERY: &str = const_str::concat!(
        "SELECT id, uploader_id, replay_hash, replay_path FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(score_id)
        .fetch_optional(ctx.db())
        .await
}

pub async fn fetch_user_scores<C: Context>(
    ctx: &C,
    uploader_id: i64,
    page: u32,
    limit: u32,
) -> sqlx::Result<Vec<Score>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE uploader_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?"
    );
    sqlx::query_as(QUERY)
        .bind(uploader_id)
        .bind(limit)
        .bind((page.saturating_sub(1)) * limit)
        .fetch_all(ctx.db())
        .await
}

pub async fn count_user_scores<C: Context>(ctx: &C, uploader_id: i64) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*) FROM ",
        TABLE_NAME,
        " WHERE uploader_id = ?"
    );
    sqlx::query_scalar(QUERY)
        .bind(uploader_id)
        .fetch_one(ctx.db())
        .await
}

fn sort_order(sort: LeaderboardSort, prefix: &str) -> String {
    match sort {
        LeaderboardSort::Score => format!("{prefix}score DESC, {prefix}created_at ASC"),
        LeaderboardSort::NotesHit => format!(
            "{prefix}notes_hit DESC, {prefix}max_combo DESC, {prefix}created_at ASC"
        ),
    }
}

/// Shared WHERE fragment for the leaderboard page and its count, so both
/// always see the same subset. A score qualifies only when every modifier
/// it used is inside the allowed set: `modifiers & ~allowed` must be zero.
fn leaderboard_filter(filter: &LeaderboardFilter) -> (String, MySqlArguments) {
    let mut clause = String::from(
        "s.song_id = ? AND s.hidden = FALSE AND s.instrument = ? AND (s.modifiers & ?) = 0",
    );
    let mut args = MySqlArguments::default();
    let _ = args.add(filter.song_id);
    let _ = args.add(filter.instrument as i16);
    let _ = args.add(!filter.allowed_modifiers.bits());
    if let Some(difficulty) = filter.difficulty {
        clause.push_str(" AND s.difficulty = ?");
        let _ = args.add(difficulty as i16);
    }
    if let Some(engine) = filter.engine {
        clause.push_str(" AND s.engine = ?");
        let _ = args.add(engine as i16);
    }
    if !filter.allow_slowdowns {
        clause.push_str(" AND s.song_speed >= 1");
    }
    (clause, args)
}

pub async fn fetch_leaderboard<C: Context>(
    ctx: &C,
    filter: &LeaderboardFilter,
) -> sqlx::Result<Vec<LeaderboardScore>> {
    let (clause, mut args) = leaderboard_filter(filter);
    let inner_order = sort_order(filter.sort, "s.");
    let outer_order = sort_order(filter.sort, "");
    let query = format!(
        r#"
            SELECT id, song_id, uploader_id, uploader_username, instrument,
            difficulty, engine, modifiers, song_speed, score, stars, percent,
            notes_hit, max_combo, created_at
            FROM (
                SELECT s.id, s.song_id, s.uploader_id,
                u.username AS uploader_username, s.instrument, s.difficulty,
                s.engine, s.modifiers, s.song_speed, s.score, s.stars,
                s.percent, s.notes_hit, s.max_combo, s.created_at,
                ROW_NUMBER() OVER (
                    PARTITION BY s.uploader_id ORDER BY {inner_order}
                ) AS uploader_rank
                FROM {TABLE_NAME} s
                INNER JOIN users u ON u.id = s.uploader_id
                WHERE {clause}
            ) ranked
            WHERE uploader_rank = 1
            ORDER BY {outer_order}
            LIMIT ? OFFSET ?
        "#
    );
    let _ = args.add(filter.limit);
    let _ = args.add((filter.page - 1) * filter.limit);
    sqlx::query_as_with(&query, args).fetch_all(ctx.db()).await
}

pub async fn count_leaderboard<C: Context>(
    ctx: &C,
    filter: &LeaderboardFilter,
) -> sqlx::Result<i64> {
    let (clause, args) = leaderboard_filter(filter);
    let query = format!(
        "SELECT COUNT(DISTINCT s.uploader_id) FROM {TABLE_NAME} s WHERE {clause}"
    );
    sqlx::query_scalar_with(&query, args)
        .fetch_one(ctx.db())
        .await
}

pub async fn set_hidden_for_uploader<C: Context>(
    ctx: &C,
    uploader_id: i64,
    hidden: bool,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET hidden = ? WHERE uploader_id = ?"
    );
    let result = sqlx::query(QUERY)
        .bind(hidden)
        .bind(uploader_id)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}

/// Removes every score produced by one replay upload (the band score and
/// its children share the hash) and frees the hash for re-registration.
pub async fn delete_by_replay_hash<C: Context>(ctx: &C, replay_hash: &str) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE replay_hash = ?");
    let result = sqlx::query(QUERY)
        .bind(replay_hash)
        .execute(ctx.db())
        .await?;
    release_replay_upload(ctx, replay_hash).await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_song<C: Context>(ctx: &C, song_id: i64) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE song_id = ?");
    let result = sqlx::query(QUERY).bind(song_id).execute(ctx.db()).await?;
    Ok(result.rows_affected())
}
