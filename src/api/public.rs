use crate::api::RequestContext;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResponse};
use crate::common::storage::{chart_file_path, replay_file_path};
use crate::usecases::songs;
use axum::extract::Query;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

#[derive(Deserialize)]
pub struct ReplayFileArgs {
    pub filename: Option<String>,
}

#[derive(Deserialize)]
pub struct SongFileArgs {
    pub id: Option<i64>,
}

fn is_valid_hash(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_hexdigit())
}

async fn serve_file(
    ctx: &RequestContext,
    path: &Path,
    download_name: &str,
) -> ServiceResponse {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(AppError::FilesNotFound);
    }
    let bytes = fs::read(path).await?;
    let mut response = (
        [(CONTENT_TYPE, "application/octet-stream".to_owned())],
        bytes,
    )
        .into_response();
    if ctx.config().dev_mode {
        let disposition = format!("attachment; filename=\"{download_name}\"");
        if let Ok(value) = disposition.parse::<axum::http::HeaderValue>() {
            response.headers_mut().insert(CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

/// Replay files are public, addressed by their content hash.
pub async fn replay(ctx: RequestContext, Query(args): Query<ReplayFileArgs>) -> ServiceResponse {
    let Some(filename) = args.filename else {
        return Err(AppError::InvalidQuery("filename".to_owned()));
    };
    if !is_valid_hash(&filename) {
        return Err(AppError::InvalidInput);
    }
    let path = replay_file_path(&ctx.config().storage, &filename);
    serve_file(&ctx, &path, &format!("{filename}.replay")).await
}

/// Chart download for a registered song.
pub async fn song(ctx: RequestContext, Query(args): Query<SongFileArgs>) -> ServiceResponse {
    let Some(song_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let song = songs::fetch_one(&ctx, song_id).await?;
    let path = chart_file_path(&ctx.config().storage, &song.checksum, song.is_chart);
    let ext = if song.is_chart { "chart" } else { "mid" };
    serve_file(&ctx, &path, &format!("{}.{ext}", song.checksum)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_validation_rejects_path_tricks() {
        assert!(is_valid_hash("a9993e364706816aba3e25717850c26c9cd0d89d"));
        assert!(!is_valid_hash(""));
        assert!(!is_valid_hash("../../../etc/passwd"));
        assert!(!is_valid_hash("abc/def"));
    }
}
