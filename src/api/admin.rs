use crate::api::replays::consume_multipart;
use crate::api::{AdminUser, RequestContext};
use crate::common::context::Context;
use crate::common::error::ServiceResponse;
use crate::common::storage::TempSet;
use crate::models::admin::{
    AdminLogsArgs, ScoreDeleteArgs, ScoreDeleteResponse, SongDeleteArgs, UserBanArgs,
};
use crate::models::replies::Reply;
use crate::models::songs::SongUpdateArgs;
use crate::usecases::{admin_logs, scores, songs, users};
use axum::Json;
use axum::extract::{Multipart, Query};
use serde_json::json;

pub async fn user_ban(
    ctx: RequestContext,
    AdminUser(admin): AdminUser,
    Json(args): Json<UserBanArgs>,
) -> ServiceResponse {
    let response = users::set_active(&ctx, &admin, &args).await?;
    Ok(Reply::ok(response))
}

/// Song registration without a replay; same upload fields as the replay
/// endpoint minus the replay file.
pub async fn song_add(
    ctx: RequestContext,
    AdminUser(admin): AdminUser,
    mut multipart: Multipart,
) -> ServiceResponse {
    let temp = TempSet::create(&ctx.config().storage);
    let result = async {
        let upload = consume_multipart(&temp, &mut multipart).await?;
        songs::admin_add(&ctx, &admin, &temp, &upload).await
    }
    .await;
    temp.cleanup().await;

    let song = result?;
    Ok(Reply::ok(json!({ "song": song })))
}

pub async fn song_update(
    ctx: RequestContext,
    AdminUser(admin): AdminUser,
    Json(args): Json<SongUpdateArgs>,
) -> ServiceResponse {
    let song = songs::admin_update(&ctx, &admin, &args).await?;
    Ok(Reply::ok(json!({ "song": song })))
}

pub async fn song_delete(
    ctx: RequestContext,
    AdminUser(admin): AdminUser,
    Json(args): Json<SongDeleteArgs>,
) -> ServiceResponse {
    let deleted_scores = songs::admin_delete(&ctx, &admin, &args).await?;
    Ok(Reply::ok(json!({ "deletedScores": deleted_scores })))
}

pub async fn score_delete(
    ctx: RequestContext,
    AdminUser(admin): AdminUser,
    Json(args): Json<ScoreDeleteArgs>,
) -> ServiceResponse {
    let count = scores::admin_delete(&ctx, &admin, &args).await?;
    Ok(Reply::ok(ScoreDeleteResponse { count }))
}

pub async fn logs(
    ctx: RequestContext,
    AdminUser(_admin): AdminUser,
    Query(args): Query<AdminLogsArgs>,
) -> ServiceResponse {
    let page = admin_logs::fetch_entries(&ctx, &args).await?;
    Ok(Reply::ok(page))
}
