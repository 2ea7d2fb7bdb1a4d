use crate::common::config::StoragePaths;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// File kinds accepted by the upload endpoints, classified by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Replay,
    Midi,
    Chart,
    Ini,
    Dta,
}

impl UploadKind {
    pub fn from_filename(filename: &str) -> Option<UploadKind> {
        if filename.ends_with(".replay") {
            Some(UploadKind::Replay)
        } else if filename.ends_with(".mid") {
            Some(UploadKind::Midi)
        } else if filename.ends_with(".chart") {
            Some(UploadKind::Chart)
        } else if filename.ends_with(".ini") {
            Some(UploadKind::Ini)
        } else if filename.ends_with(".dta") {
            Some(UploadKind::Dta)
        } else {
            None
        }
    }
}

/// One uniquely named temp path per upload kind. Whatever happens to the
/// request, `cleanup` removes every file still sitting in the temp dir.
pub struct TempSet {
    pub replay: PathBuf,
    pub midi: PathBuf,
    pub chart: PathBuf,
    pub ini: PathBuf,
    pub dta: PathBuf,
}

impl TempSet {
    pub fn create(storage: &StoragePaths) -> Self {
        let uid = Uuid::new_v4().simple().to_string();
        Self {
            replay: storage.temp_dir.join(format!("{uid}.replay")),
            midi: storage.temp_dir.join(format!("{uid}.mid")),
            chart: storage.temp_dir.join(format!("{uid}.chart")),
            ini: storage.temp_dir.join(format!("{uid}.ini")),
            dta: storage.temp_dir.join(format!("{uid}.dta")),
        }
    }

    pub fn path(&self, kind: UploadKind) -> &Path {
        match kind {
            UploadKind::Replay => &self.replay,
            UploadKind::Midi => &self.midi,
            UploadKind::Chart => &self.chart,
            UploadKind::Ini => &self.ini,
            UploadKind::Dta => &self.dta,
        }
    }

    pub async fn cleanup(&self) {
        for path in [&self.replay, &self.midi, &self.chart, &self.ini, &self.dta] {
            if fs::try_exists(path).await.unwrap_or(false) {
                if let Err(e) = fs::remove_file(path).await {
                    warn!("Failed to remove temp file {}: {e}", path.display());
                }
            }
        }
    }
}

/// Permanent location of a song's chart file, keyed by its checksum.
pub fn chart_file_path(storage: &StoragePaths, checksum: &str, is_chart: bool) -> PathBuf {
    let ext = if is_chart { "chart" } else { "mid" };
    storage.chart_dir.join(format!("{checksum}.{ext}"))
}

/// Permanent location of a replay file, keyed by its content hash.
pub fn replay_file_path(storage: &StoragePaths, replay_hash: &str) -> PathBuf {
    storage.replay_dir.join(format!("{replay_hash}.replay"))
}

/// Copy-then-delete move; the temp dir and the permanent dirs may live on
/// different filesystems.
pub async fn promote(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::copy(from, to).await?;
    fs::remove_file(from).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::StoragePaths;

    fn storage_in(dir: &Path) -> StoragePaths {
        StoragePaths::new(dir)
    }

    #[test]
    fn upload_kind_classifies_by_extension() {
        assert_eq!(UploadKind::from_filename("a.replay"), Some(UploadKind::Replay));
        assert_eq!(UploadKind::from_filename("notes.mid"), Some(UploadKind::Midi));
        assert_eq!(UploadKind::from_filename("notes.chart"), Some(UploadKind::Chart));
        assert_eq!(UploadKind::from_filename("song.ini"), Some(UploadKind::Ini));
        assert_eq!(UploadKind::from_filename("songs.dta"), Some(UploadKind::Dta));
        assert_eq!(UploadKind::from_filename("cover.png"), None);
    }

    #[tokio::test]
    async fn cleanup_removes_only_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        tokio::fs::create_dir_all(&storage.temp_dir).await.unwrap();

        let temp = TempSet::create(&storage);
        tokio::fs::write(&temp.replay, b"data").await.unwrap();
        tokio::fs::write(&temp.ini, b"data").await.unwrap();

        temp.cleanup().await;
        assert!(!temp.replay.exists());
        assert!(!temp.ini.exists());
    }

    #[tokio::test]
    async fn two_temp_sets_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(dir.path());
        let a = TempSet::create(&storage);
        let b = TempSet::create(&storage);
        assert_ne!(a.replay, b.replay);
    }

    #[tokio::test]
    async fn promote_moves_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.bin");
        let to = dir.path().join("b.bin");
        tokio::fs::write(&from, b"payload").await.unwrap();

        promote(&from, &to).await.unwrap();
        assert!(!from.exists());
        assert_eq!(tokio::fs::read(&to).await.unwrap(), b"payload");
    }
}
