use crate::common::error::{AppError, ServiceResult};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const REPLAY_MAGICS: [[u8; 8]; 2] = [*b"YARGPLAY", *b"YAREPLAY"];
const MIDI_MAGIC: [u8; 4] = *b"MThd";
const UTF8_BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

async fn read_prefix(path: &Path, len: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path).await?;
    let mut buf = vec![0u8; len];
    let mut read = 0;
    while read < len {
        let n = file.read(&mut buf[read..]).await?;
        if n == 0 {
            break;
        }
        read += n;
    }
    buf.truncate(read);
    Ok(buf)
}

/// Replay containers start with an 8 byte signature.
pub async fn check_replay_file(path: &Path) -> ServiceResult<()> {
    let magic = read_prefix(path, 8).await?;
    if REPLAY_MAGICS
        .iter()
        .any(|expected| magic.as_slice() == expected)
    {
        Ok(())
    } else {
        Err(AppError::ReplaysInvalidReplayMagic)
    }
}

pub async fn check_midi_file(path: &Path) -> ServiceResult<()> {
    let magic = read_prefix(path, 4).await?;
    if magic.as_slice() == MIDI_MAGIC.as_slice() {
        Ok(())
    } else {
        Err(AppError::ReplaysInvalidMidiMagic)
    }
}

/// Text charts must open with a `[Song]`/`[song]` section header, allowing
/// for a UTF-8 BOM in front of it.
pub async fn check_chart_file(path: &Path) -> ServiceResult<()> {
    let prefix = read_prefix(path, 9).await?;
    let header = match prefix.strip_prefix(UTF8_BOM.as_slice()) {
        Some(rest) => rest,
        None => prefix.get(..6).unwrap_or(&prefix),
    };
    if header == b"[Song]".as_slice() || header == b"[song]".as_slice() {
        Ok(())
    } else {
        Err(AppError::ReplaysInvalidChartMagic)
    }
}

/// Checks whichever chart-type temp files exist; missing files are fine
/// here, presence requirements are enforced by the registration workflow.
pub async fn check_chart_files(chart: &Path, midi: &Path) -> ServiceResult<()> {
    if tokio::fs::try_exists(midi).await.unwrap_or(false) {
        check_midi_file(midi).await?;
    }
    if tokio::fs::try_exists(chart).await.unwrap_or(false) {
        check_chart_file(chart).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn file_with(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn accepts_both_replay_magics() {
        let dir = tempfile::tempdir().unwrap();
        for magic in [b"YARGPLAY", b"YAREPLAY"] {
            let mut content = magic.to_vec();
            content.extend_from_slice(b"rest of the file");
            let path = file_with(&dir, "ok.replay", &content).await;
            assert!(check_replay_file(&path).await.is_ok());
        }
    }

    #[tokio::test]
    async fn rejects_bad_replay_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = file_with(&dir, "bad.replay", b"NOTAPLAY....").await;
        assert!(matches!(
            check_replay_file(&path).await,
            Err(AppError::ReplaysInvalidReplayMagic)
        ));
    }

    #[tokio::test]
    async fn rejects_truncated_replay_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = file_with(&dir, "short.replay", b"YARG").await;
        assert!(check_replay_file(&path).await.is_err());
    }

    #[tokio::test]
    async fn midi_magic_must_be_mthd() {
        let dir = tempfile::tempdir().unwrap();
        let good = file_with(&dir, "good.mid", b"MThd\x00\x00\x00\x06").await;
        let bad = file_with(&dir, "bad.mid", b"RIFF....").await;
        assert!(check_midi_file(&good).await.is_ok());
        assert!(matches!(
            check_midi_file(&bad).await,
            Err(AppError::ReplaysInvalidMidiMagic)
        ));
    }

    #[tokio::test]
    async fn chart_header_allows_bom_and_lowercase() {
        let dir = tempfile::tempdir().unwrap();
        let plain = file_with(&dir, "plain.chart", b"[Song]\n{\n").await;
        let lower = file_with(&dir, "lower.chart", b"[song]\n{\n").await;
        let bom = {
            let mut content = vec![0xef, 0xbb, 0xbf];
            content.extend_from_slice(b"[Song]\n{\n");
            file_with(&dir, "bom.chart", &content).await
        };
        assert!(check_chart_file(&plain).await.is_ok());
        assert!(check_chart_file(&lower).await.is_ok());
        assert!(check_chart_file(&bom).await.is_ok());

        let bad = file_with(&dir, "bad.chart", b"[Track]\n").await;
        assert!(matches!(
            check_chart_file(&bad).await,
            Err(AppError::ReplaysInvalidChartMagic)
        ));
    }
}
