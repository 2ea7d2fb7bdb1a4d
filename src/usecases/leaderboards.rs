use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::models::leaderboards::{
    LeaderboardArgs, LeaderboardEntry, LeaderboardFilter, LeaderboardResponse,
};
use crate::repositories::scores;

/// One qualifying page: best score per uploader under the resolved filter,
/// with the total computed against the same subset.
pub async fn fetch<C: Context>(ctx: &C, args: LeaderboardArgs) -> ServiceResult<LeaderboardResponse> {
    let filter = LeaderboardFilter::resolve(args)?;
    let rows = scores::fetch_leaderboard(ctx, &filter).await?;
    let count = scores::count_leaderboard(ctx, &filter).await?;
    Ok(LeaderboardResponse {
        count,
        scores: rows.into_iter().map(LeaderboardEntry::from).collect(),
    })
}
