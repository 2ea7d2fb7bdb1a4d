use crate::common::context::Context;
use crate::common::error::ServiceResult;
use crate::usecases::email_tokens;
use tracing::info;

/// Purges used and expired email tokens; they are single-use and carry no
/// audit value once dead.
pub async fn cleanup_email_tokens<C: Context>(ctx: &C) -> ServiceResult<u64> {
    let deleted = email_tokens::cleanup_expired(ctx).await?;
    if deleted > 0 {
        info!("Removed {deleted} dead email tokens");
    }
    Ok(deleted)
}
