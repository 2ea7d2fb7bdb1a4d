use crate::api::RequestContext;
use crate::common::error::{AppError, ServiceResponse};
use crate::models::leaderboards::LeaderboardArgs;
use crate::models::replies::Reply;
use crate::models::songs::{HashToIdArgs, SongArgs, SongEntriesArgs};
use crate::usecases::{leaderboards, songs};
use axum::Json;
use axum::extract::Query;
use serde_json::json;

pub async fn entries(ctx: RequestContext, Query(args): Query<SongEntriesArgs>) -> ServiceResponse {
    let page = songs::fetch_entries(&ctx, &args).await?;
    Ok(Reply::ok(page))
}

pub async fn song(ctx: RequestContext, Query(args): Query<SongArgs>) -> ServiceResponse {
    let Some(song_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let song = songs::fetch_detail(&ctx, song_id).await?;
    Ok(Reply::ok(json!({ "song": song })))
}

pub async fn hash_to_id(ctx: RequestContext, Query(args): Query<HashToIdArgs>) -> ServiceResponse {
    let Some(hash) = args.hash.filter(|hash| !hash.is_empty()) else {
        return Err(AppError::InvalidQuery("hash".to_owned()));
    };
    let song_id = songs::hash_to_id(&ctx, &hash).await?;
    Ok(Reply::ok(json!({ "id": song_id })))
}

pub async fn leaderboard(
    ctx: RequestContext,
    Json(args): Json<LeaderboardArgs>,
) -> ServiceResponse {
    let response = leaderboards::fetch(&ctx, args).await?;
    Ok(Reply::ok(response))
}
