use crate::adapters::discord;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::common::storage::replay_file_path;
use crate::models::admin::{AdminAction, ScoreDeleteArgs};
use crate::models::replies::Paginated;
use crate::models::scores::{ScoreEntry, UserScoresArgs};
use crate::models::users::User;
use crate::repositories::{admin_logs, scores};
use tokio::fs;
use tracing::warn;

const DEFAULT_PAGE_SIZE: u32 = 15;

pub async fn fetch_user_scores<C: Context>(
    ctx: &C,
    args: &UserScoresArgs,
) -> ServiceResult<Paginated<ScoreEntry>> {
    let Some(uploader_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let page = args.page.unwrap_or(1).max(1);
    let limit = args.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let entries = scores::fetch_user_scores(ctx, uploader_id, page, limit).await?;
    let total = scores::count_user_scores(ctx, uploader_id).await?;
    let entries = entries.into_iter().map(ScoreEntry::from).collect();
    Ok(Paginated::new(total, page, limit, entries))
}

/// Deleting one score removes every score produced by the same replay
/// upload (a band score and its children are one play) plus the stored
/// replay file.
pub async fn admin_delete<C: Context>(
    ctx: &C,
    admin: &User,
    args: &ScoreDeleteArgs,
) -> ServiceResult<u64> {
    let mut missing = Vec::new();
    if args.id.is_none() {
        missing.push("id");
    }
    if args.reason.as_deref().unwrap_or_default().is_empty() {
        missing.push("reason");
    }
    if !missing.is_empty() {
        return Err(AppError::InvalidQuery(missing.join(", ")));
    }
    let score_id = args.id.unwrap();

    let Some(score) = scores::fetch_minimal(ctx, score_id).await? else {
        return Err(AppError::ScoresNotFound);
    };

    let replay = replay_file_path(&ctx.config().storage, &score.replay_hash);
    if fs::try_exists(&replay).await.unwrap_or(false) {
        if let Err(e) = fs::remove_file(&replay).await {
            warn!("Failed to remove replay file {}: {e}", replay.display());
        }
    }

    let deleted = scores::delete_by_replay_hash(ctx, &score.replay_hash).await?;

    admin_logs::insert(
        ctx,
        admin.user_id,
        AdminAction::ScoreDelete,
        score_id,
        args.reason.as_deref(),
    )
    .await?;
    let description = format!(
        "Score #{score_id} ({deleted} rows) by {} (#{}): {}",
        admin.username,
        admin.user_id,
        args.reason.as_deref().unwrap_or_default(),
    );
    if let Err(e) =
        discord::admin_action(ctx.config(), AdminAction::ScoreDelete.describe(), &description)
            .await
    {
        warn!("Failed to notify admin action: {e:?}");
    }

    Ok(deleted)
}
