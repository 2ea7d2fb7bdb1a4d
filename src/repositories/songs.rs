use crate::common::context::Context;
use crate::entities::songs::{Song, SongInstrument};
use crate::models::songs::{NewSong, NewSongInstrument, SongSort};
use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;

const TABLE_NAME: &str = "songs";
const READ_FIELDS: &str = r#"
id, checksum, name, artist, charter, album, year,
pro_drums, five_lane_drums, sustain_cutoff_threshold, hopo_frequency,
multiplier_note, is_chart, is_rb3con, created_at"#;

pub async fn fetch_one<C: Context>(ctx: &C, song_id: i64) -> sqlx::Result<Song> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(song_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_one_by_checksum<C: Context>(
    ctx: &C,
    checksum: &str,
) -> sqlx::Result<Option<Song>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE checksum = ?"
    );
    sqlx::query_as(QUERY)
        .bind(checksum)
        .fetch_optional(ctx.db())
        .await
}

pub async fn create<C: Context>(ctx: &C, song: &NewSong) -> sqlx::Result<i64> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        r#" (checksum, name, artist, charter, album, year,
        pro_drums, five_lane_drums, sustain_cutoff_threshold, hopo_frequency,
        multiplier_note, is_chart, is_rb3con)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
    );
    let m = &song.metadata;
    let result = sqlx::query(QUERY)
        .bind(&song.checksum)
        .bind(&m.name)
        .bind(&m.artist)
        .bind(&m.charter)
        .bind(&m.album)
        .bind(&m.year)
        .bind(m.pro_drums)
        .bind(m.five_lane_drums)
        .bind(m.sustain_cutoff_threshold)
        .bind(m.hopo_frequency)
        .bind(m.multiplier_note)
        .bind(song.is_chart)
        .bind(song.is_rb3con)
        .execute(ctx.db())
        .await?;
    Ok(result.last_insert_id() as i64)
}

pub async fn add_instruments<C: Context>(
    ctx: &C,
    song_id: i64,
    parts: &[NewSongInstrument],
) -> sqlx::Result<()> {
    const QUERY: &str = r#"
        INSERT INTO song_instruments (song_id, instrument, difficulty, notes, star_power_phrases)
        VALUES (?, ?, ?, ?, ?)
    "#;
    for part in parts {
        sqlx::query(QUERY)
            .bind(song_id)
            .bind(part.instrument)
            .bind(part.difficulty)
            .bind(part.notes)
            .bind(part.star_power_phrases)
            .execute(ctx.db())
            .await?;
    }
    Ok(())
}

pub async fn fetch_instruments<C: Context>(
    ctx: &C,
    song_id: i64,
) -> sqlx::Result<Vec<SongInstrument>> {
    const QUERY: &str = r#"
        SELECT song_id, instrument, difficulty, notes, star_power_phrases
        FROM song_instruments WHERE song_id = ?
        ORDER BY instrument ASC, difficulty ASC
    "#;
    sqlx::query_as(QUERY)
        .bind(song_id)
        .fetch_all(ctx.db())
        .await
}

pub struct SongEntriesFilter<'a> {
    pub name: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub charter: Option<&'a str>,
    pub sort: Option<SongSort>,
    pub descending: bool,
}

fn entries_filter(filter: &SongEntriesFilter<'_>) -> (String, MySqlArguments) {
    let mut clause = String::from(" WHERE 1 = 1");
    let mut args = MySqlArguments::default();
    if let Some(name) = filter.name {
        clause.push_str(" AND name LIKE CONCAT('%', ?, '%')");
        let _ = args.add(name);
    }
    if let Some(artist) = filter.artist {
        clause.push_str(" AND artist LIKE CONCAT('%', ?, '%')");
        let _ = args.add(artist);
    }
    if let Some(charter) = filter.charter {
        clause.push_str(" AND charter LIKE CONCAT('%', ?, '%')");
        let _ = args.add(charter);
    }
    (clause, args)
}

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    filter: &SongEntriesFilter<'_>,
    page: u32,
    limit: u32,
) -> sqlx::Result<Vec<Song>> {
    let (clause, mut args) = entries_filter(filter);
    let order = match filter.sort {
        Some(sort) => {
            let direction = if filter.descending { "DESC" } else { "ASC" };
            format!(" ORDER BY {} {direction}", sort.column())
        }
        None => String::new(),
    };
    let query =
        format!("SELECT {READ_FIELDS} FROM {TABLE_NAME}{clause}{order} LIMIT ? OFFSET ?");
    let _ = args.add(limit);
    let _ = args.add((page.saturating_sub(1)) * limit);
    sqlx::query_as_with(&query, args).fetch_all(ctx.db()).await
}

pub async fn count_entries<C: Context>(
    ctx: &C,
    filter: &SongEntriesFilter<'_>,
) -> sqlx::Result<i64> {
    let (clause, args) = entries_filter(filter);
    let query = format!("SELECT COUNT(*) FROM {TABLE_NAME}{clause}");
    sqlx::query_scalar_with(&query, args)
        .fetch_one(ctx.db())
        .await
}

pub struct SongMetadataPatch<'a> {
    pub name: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub charter: Option<&'a str>,
    pub album: Option<&'a str>,
    pub year: Option<&'a str>,
    pub pro_drums: Option<bool>,
    pub five_lane_drums: Option<bool>,
    pub sustain_cutoff_threshold: Option<i32>,
    pub hopo_frequency: Option<i32>,
    pub multiplier_note: Option<i32>,
}

pub async fn update_metadata<C: Context>(
    ctx: &C,
    song_id: i64,
    patch: &SongMetadataPatch<'_>,
) -> sqlx::Result<()> {
    let mut sets = Vec::new();
    let mut args = MySqlArguments::default();

    macro_rules! patch_field {
        ($field:ident) => {
            if let Some(value) = patch.$field {
                sets.push(concat!(stringify!($field), " = ?"));
                let _ = args.add(value);
            }
        };
    }
    patch_field!(name);
    patch_field!(artist);
    patch_field!(charter);
    patch_field!(album);
    patch_field!(year);
    patch_field!(pro_drums);
    patch_field!(five_lane_drums);
    patch_field!(sustain_cutoff_threshold);
    patch_field!(hopo_frequency);
    patch_field!(multiplier_note);

    if sets.is_empty() {
        return Ok(());
    }
    let query = format!("UPDATE {TABLE_NAME} SET {} WHERE id = ?", sets.join(", "));
    let _ = args.add(song_id);
    sqlx::query_with(&query, args).execute(ctx.db()).await?;
    Ok(())
}

pub async fn delete<C: Context>(ctx: &C, song_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM song_instruments WHERE song_id = ?")
        .bind(song_id)
        .execute(ctx.db())
        .await?;
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE id = ?");
    sqlx::query(QUERY).bind(song_id).execute(ctx.db()).await?;
    Ok(())
}
