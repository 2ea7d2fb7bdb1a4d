use crate::common::error::{AppError, ServiceResult};
use std::collections::HashMap;
use tracing::error;

/// Hopo threshold used when a DTA entry does not carry one.
const DTA_DEFAULT_HOPO_FREQUENCY: i32 = 170;

/// Song display and chart-affecting metadata as extracted from an upload,
/// before it becomes a persisted song.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SongMetadata {
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
}

/// Extractor output. The two side values tune the validator invocation and
/// never land on the persisted song.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSongData {
    pub metadata: SongMetadata,
    pub hopo_freq: Option<i32>,
    pub eighth_note_hopo: Option<bool>,
}

/// The two supported metadata formats, detected by file extension at the
/// upload boundary and nowhere else.
pub enum SongData {
    Ini(String),
    Dta(String),
}

impl SongData {
    pub fn parse(&self) -> ServiceResult<ParsedSongData> {
        match self {
            SongData::Ini(content) => parse_ini(content),
            SongData::Dta(content) => parse_dta(content),
        }
    }
}

/// `#` is a valid content character in song.ini files but a comment marker
/// for INI in general. Un-escape any already escaped sequence first so the
/// transform is idempotent, then escape every remaining literal `#`.
pub fn escape_hashes(content: &str) -> String {
    unescape_hashes(content).replace('#', "\\#")
}

pub fn unescape_hashes(content: &str) -> String {
    content.replace("\\#", "#")
}

fn eval_boolean_string(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1"
}

fn parse_ini_section(content: &str) -> Option<HashMap<String, String>> {
    let escaped = escape_hashes(content);
    let mut fields: Option<HashMap<String, String>> = None;
    for line in escaped.lines() {
        let line = line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            // The song section is over once the next section starts
            if fields.is_some() {
                break;
            }
            if line == "[song]" || line == "[Song]" {
                fields = Some(HashMap::new());
            }
            continue;
        }
        if let Some(section) = fields.as_mut() {
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_lowercase();
                let value = unescape_hashes(value.trim());
                section.entry(key).or_insert(value);
            }
        }
    }
    fields
}

fn parse_ini(content: &str) -> ServiceResult<ParsedSongData> {
    // A missing [song] section means the format check upstream let a bad
    // file through; that is a server-side problem, not a user error.
    let Some(fields) = parse_ini_section(content) else {
        error!("song.ini content has no [song]/[Song] section");
        return Err(AppError::Unexpected);
    };
    let Some(name) = fields.get("name").filter(|v| !v.is_empty()) else {
        error!("song.ini [song] section is missing the name field");
        return Err(AppError::Unexpected);
    };
    let Some(artist) = fields.get("artist").filter(|v| !v.is_empty()) else {
        error!("song.ini [song] section is missing the artist field");
        return Err(AppError::Unexpected);
    };

    let get_bool = |key: &str| fields.get(key).map(|v| eval_boolean_string(v));
    let get_int = |key: &str| fields.get(key).and_then(|v| v.trim().parse::<i32>().ok());

    let mut metadata = SongMetadata {
        name: name.clone(),
        artist: artist.clone(),
        charter: fields
            .get("charter")
            .or_else(|| fields.get("frets"))
            .cloned(),
        album: Some(fields.get("album").cloned().unwrap_or_else(|| "N/A".to_owned())),
        year: fields.get("year").cloned(),
        pro_drums: get_bool("pro_drums").or_else(|| get_bool("pro_drum")),
        five_lane_drums: get_bool("five_lane_drums"),
        sustain_cutoff_threshold: get_int("sustain_cutoff_threshold"),
        hopo_frequency: None,
        multiplier_note: get_int("multiplier_note").or_else(|| get_int("star_power_note")),
    };

    // Hopo aliases in priority order; only the first present one takes effect.
    let mut hopo_freq = None;
    let mut eighth_note_hopo = None;
    if let Some(frequency) = get_int("hopo_frequency") {
        metadata.hopo_frequency = Some(frequency);
    } else if let Some(eighth) = get_bool("eighthnote_hopo") {
        eighth_note_hopo = Some(eighth);
    } else if let Some(freq) = get_int("hopofreq") {
        hopo_freq = Some(freq);
    }

    Ok(ParsedSongData {
        metadata,
        hopo_freq,
        eighth_note_hopo,
    })
}

#[derive(Debug, PartialEq)]
enum SExpr {
    Atom(String),
    Str(String),
    List(Vec<SExpr>),
}

fn tokenize_dta(content: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '(' | ')' => tokens.push(c.to_string()),
            '"' => {
                let mut string = String::from('"');
                for sc in chars.by_ref() {
                    if sc == '"' {
                        break;
                    }
                    string.push(sc);
                }
                tokens.push(string);
            }
            ';' => {
                // comment runs to end of line
                for cc in chars.by_ref() {
                    if cc == '\n' {
                        break;
                    }
                }
            }
            c if c.is_whitespace() => {}
            c => {
                let mut atom = String::from(c);
                while let Some(&nc) = chars.peek() {
                    if nc.is_whitespace() || nc == '(' || nc == ')' || nc == '"' {
                        break;
                    }
                    atom.push(nc);
                    chars.next();
                }
                tokens.push(atom);
            }
        }
    }
    tokens
}

fn parse_sexpr(tokens: &[String], pos: &mut usize) -> Option<SExpr> {
    let token = tokens.get(*pos)?;
    *pos += 1;
    match token.as_str() {
        "(" => {
            let mut items = Vec::new();
            while let Some(next) = tokens.get(*pos) {
                if next == ")" {
                    *pos += 1;
                    return Some(SExpr::List(items));
                }
                items.push(parse_sexpr(tokens, pos)?);
            }
            None
        }
        ")" => None,
        quoted if quoted.starts_with('"') => Some(SExpr::Str(quoted[1..].to_owned())),
        atom => Some(SExpr::Atom(atom.to_owned())),
    }
}

fn dta_field<'a>(entry: &'a [SExpr], key: &str) -> Option<&'a SExpr> {
    entry.iter().find_map(|child| match child {
        SExpr::List(items) => match items.first() {
            Some(SExpr::Atom(atom)) if atom == key => items.get(1),
            _ => None,
        },
        _ => None,
    })
}

fn dta_string(entry: &[SExpr], key: &str) -> Option<String> {
    match dta_field(entry, key) {
        Some(SExpr::Str(s)) | Some(SExpr::Atom(s)) => Some(s.clone()),
        _ => None,
    }
}

fn dta_int(entry: &[SExpr], key: &str) -> Option<i32> {
    match dta_field(entry, key) {
        Some(SExpr::Atom(s)) | Some(SExpr::Str(s)) => s.parse().ok(),
        _ => None,
    }
}

fn parse_dta(content: &str) -> ServiceResult<ParsedSongData> {
    let tokens = tokenize_dta(content);
    let mut pos = 0;
    // The first top-level list is the first song entry; that is the one
    // the uploaded chart belongs to.
    let entry = loop {
        match parse_sexpr(&tokens, &mut pos) {
            Some(SExpr::List(items)) => break items,
            Some(_) => continue,
            None => {
                error!("DTA content has no song entry list");
                return Err(AppError::Unexpected);
            }
        }
    };

    let Some(name) = dta_string(&entry, "name") else {
        error!("DTA song entry is missing the name field");
        return Err(AppError::Unexpected);
    };
    let Some(artist) = dta_string(&entry, "artist") else {
        error!("DTA song entry is missing the artist field");
        return Err(AppError::Unexpected);
    };

    let metadata = SongMetadata {
        name,
        artist,
        charter: dta_string(&entry, "author"),
        album: dta_string(&entry, "album_name"),
        year: dta_int(&entry, "year_released").map(|y| y.to_string()),
        // Container charts always have pro drums and never five lanes
        pro_drums: Some(true),
        five_lane_drums: Some(false),
        sustain_cutoff_threshold: None,
        hopo_frequency: Some(
            dta_int(&entry, "hopo_threshold").unwrap_or(DTA_DEFAULT_HOPO_FREQUENCY),
        ),
        multiplier_note: None,
    };

    Ok(ParsedSongData {
        metadata,
        hopo_freq: None,
        eighth_note_hopo: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_escaping_round_trips_and_is_idempotent() {
        let content = "name=Song #1 \\#already";
        let escaped = escape_hashes(content);
        assert_eq!(escaped, "name=Song \\#1 \\#already");
        // escaping twice must not double up
        assert_eq!(escape_hashes(&escaped), escaped);
        assert_eq!(unescape_hashes(&escaped), "name=Song #1 #already");
    }

    #[test]
    fn ini_parses_required_and_optional_fields() {
        let content = "\
[song]
name = Through the Fire and Flames
artist = DragonForce
charter = Nobody
album = Inhuman Rampage
year = 2006
pro_drums = true
five_lane_drums = 0
sustain_cutoff_threshold = 45
multiplier_note = 116
hopo_frequency = 250
";
        let parsed = SongData::Ini(content.to_owned()).parse().unwrap();
        let m = parsed.metadata;
        assert_eq!(m.name, "Through the Fire and Flames");
        assert_eq!(m.artist, "DragonForce");
        assert_eq!(m.charter.as_deref(), Some("Nobody"));
        assert_eq!(m.album.as_deref(), Some("Inhuman Rampage"));
        assert_eq!(m.year.as_deref(), Some("2006"));
        assert_eq!(m.pro_drums, Some(true));
        assert_eq!(m.five_lane_drums, Some(false));
        assert_eq!(m.sustain_cutoff_threshold, Some(45));
        assert_eq!(m.multiplier_note, Some(116));
        assert_eq!(m.hopo_frequency, Some(250));
        assert_eq!(parsed.hopo_freq, None);
        assert_eq!(parsed.eighth_note_hopo, None);
    }

    #[test]
    fn ini_keeps_literal_hashes_in_values() {
        let content = "[song]\nname = Song #1\nartist = Band #2\n";
        let parsed = SongData::Ini(content.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.name, "Song #1");
        assert_eq!(parsed.metadata.artist, "Band #2");
    }

    #[test]
    fn ini_resolves_aliases() {
        let content = "\
[Song]
name = A
artist = B
frets = Aliased Charter
pro_drum = 1
star_power_note = 103
";
        let parsed = SongData::Ini(content.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.charter.as_deref(), Some("Aliased Charter"));
        assert_eq!(parsed.metadata.pro_drums, Some(true));
        assert_eq!(parsed.metadata.multiplier_note, Some(103));
    }

    #[test]
    fn ini_primary_alias_wins_over_fallback() {
        let content = "[song]\nname=A\nartist=B\ncharter=Primary\nfrets=Fallback\n";
        let parsed = SongData::Ini(content.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.charter.as_deref(), Some("Primary"));
    }

    #[test]
    fn ini_hopo_priority_lets_only_one_take_effect() {
        let all_three = "[song]\nname=A\nartist=B\nhopo_frequency=2\neighthnote_hopo=true\nhopofreq=1\n";
        let parsed = SongData::Ini(all_three.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.hopo_frequency, Some(2));
        assert_eq!(parsed.eighth_note_hopo, None);
        assert_eq!(parsed.hopo_freq, None);

        let eighth_first = "[song]\nname=A\nartist=B\neighthnote_hopo=TRUE\nhopofreq=1\n";
        let parsed = SongData::Ini(eighth_first.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.hopo_frequency, None);
        assert_eq!(parsed.eighth_note_hopo, Some(true));
        assert_eq!(parsed.hopo_freq, None);

        let freq_only = "[song]\nname=A\nartist=B\nhopofreq=1\n";
        let parsed = SongData::Ini(freq_only.to_owned()).parse().unwrap();
        assert_eq!(parsed.hopo_freq, Some(1));
    }

    #[test]
    fn ini_album_defaults_to_na() {
        let content = "[song]\nname=A\nartist=B\n";
        let parsed = SongData::Ini(content.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.album.as_deref(), Some("N/A"));
    }

    #[test]
    fn ini_without_song_section_is_internal_error() {
        let content = "[metadata]\nname=A\nartist=B\n";
        assert!(matches!(
            SongData::Ini(content.to_owned()).parse(),
            Err(AppError::Unexpected)
        ));
    }

    #[test]
    fn dta_maps_first_entry_with_defaults() {
        let content = r#"
(somesong
   (name "Container Song")
   (artist "Container Artist")
   (author "Container Charter")
   (album_name "Container Album")
   (year_released 2008)
   (song (name "songs/somesong/somesong"))
)
(othersong
   (name "Second Song")
   (artist "Ignored")
)
"#;
        let parsed = SongData::Dta(content.to_owned()).parse().unwrap();
        let m = parsed.metadata;
        assert_eq!(m.name, "Container Song");
        assert_eq!(m.artist, "Container Artist");
        assert_eq!(m.charter.as_deref(), Some("Container Charter"));
        assert_eq!(m.album.as_deref(), Some("Container Album"));
        assert_eq!(m.year.as_deref(), Some("2008"));
        assert_eq!(m.pro_drums, Some(true));
        assert_eq!(m.five_lane_drums, Some(false));
        assert_eq!(m.hopo_frequency, Some(170));
    }

    #[test]
    fn dta_explicit_hopo_threshold_wins() {
        let content = r#"(x (name "A") (artist "B") (hopo_threshold 250))"#;
        let parsed = SongData::Dta(content.to_owned()).parse().unwrap();
        assert_eq!(parsed.metadata.hopo_frequency, Some(250));
    }

    #[test]
    fn dta_without_entry_is_internal_error() {
        assert!(matches!(
            SongData::Dta("; just a comment".to_owned()).parse(),
            Err(AppError::Unexpected)
        ));
    }
}
