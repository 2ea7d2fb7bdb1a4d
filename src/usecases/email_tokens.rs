use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::common::hash::sha256_hex;
use crate::entities::email_tokens::EmailToken;
use crate::repositories::email_tokens;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{TimeDelta, Utc};
use rand::RngCore;

#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Verify = 0,
    Reset = 1,
}

impl Purpose {
    const fn ttl_minutes(&self) -> i64 {
        match self {
            Purpose::Verify => 60,
            Purpose::Reset => 30,
        }
    }
}

/// Issues a single-use token and returns its cleartext form for the email
/// link; only the digest is stored.
pub async fn issue<C: Context>(ctx: &C, user_id: i64, purpose: Purpose) -> ServiceResult<String> {
    let mut entropy = [0u8; 32];
    rand::rng().fill_bytes(&mut entropy);
    let token = URL_SAFE_NO_PAD.encode(entropy);
    let token_hash = sha256_hex(&token);
    let expires_at = Utc::now() + TimeDelta::minutes(purpose.ttl_minutes());

    email_tokens::insert(ctx, user_id, purpose as i16, &token_hash, expires_at).await?;
    Ok(token)
}

/// Consumes a token exactly once; unknown, expired and already used tokens
/// are indistinguishable to the caller.
pub async fn consume<C: Context>(
    ctx: &C,
    purpose: Purpose,
    token: &str,
) -> ServiceResult<EmailToken> {
    let token_hash = sha256_hex(token);
    match email_tokens::consume(ctx, purpose as i16, &token_hash).await {
        Ok(Some(token)) => Ok(token),
        Ok(None) => Err(AppError::EmailTokensInvalid),
        Err(e) => unexpected(e),
    }
}

pub async fn cleanup_expired<C: Context>(ctx: &C) -> ServiceResult<u64> {
    match email_tokens::delete_expired(ctx).await {
        Ok(deleted) => Ok(deleted),
        Err(e) => unexpected(e),
    }
}
