use crate::common::config::AppConfig;
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::users::User;
use crate::repositories::users;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const TOKEN_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(config: &AppConfig, user_id: i64) -> ServiceResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + TimeDelta::days(TOKEN_VALIDITY_DAYS)).timestamp(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_token(config: &AppConfig, token: &str) -> ServiceResult<i64> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthInvalidToken)?;
    Ok(data.claims.sub)
}

/// Extracts the bearer token out of the authorization header value.
pub fn bearer_token(authorization: Option<&str>) -> ServiceResult<&str> {
    let Some(authorization) = authorization else {
        return Err(AppError::AuthRequired);
    };
    let Some(token) = authorization.strip_prefix("Bearer ") else {
        return Err(AppError::AuthInvalidFormat);
    };
    if token.is_empty() || token == "null" {
        return Err(AppError::AuthInvalidFormat);
    }
    Ok(token)
}

pub async fn authenticate<C: Context>(ctx: &C, authorization: Option<&str>) -> ServiceResult<User> {
    let token = bearer_token(authorization)?;
    let user_id = verify_token(ctx.config(), token)?;
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => Ok(User::from(user)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::AuthInvalidToken),
        Err(e) => unexpected(e),
    }
}

pub async fn login<C: Context>(
    ctx: &C,
    username: &str,
    password: &str,
) -> ServiceResult<(User, String)> {
    let user = match users::fetch_one_by_username(ctx, username).await {
        Ok(user) => user,
        Err(sqlx::Error::RowNotFound) => {
            return Err(AppError::UsersLoginNotFound(username.to_owned()));
        }
        Err(e) => return unexpected(e),
    };
    let matches = bcrypt::verify(password, &user.password_hash)?;
    if !matches {
        return Err(AppError::UsersLoginPasswordMismatch);
    }
    if !user.active {
        return Err(AppError::UsersInactive);
    }
    let token = issue_token(ctx.config(), user.id)?;
    Ok((User::from(user), token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::{AppConfig, StoragePaths, ValidatorConfig};
    use std::path::Path;

    fn test_config() -> AppConfig {
        AppConfig {
            storage: StoragePaths::new(Path::new("/tmp/score-service-test")),
            validator: ValidatorConfig {
                binary: Path::new("/usr/bin/true").to_path_buf(),
                dotnet_path: None,
            },
            jwt_secret: "test-secret".to_owned(),
            dev_mode: true,
            frontend_base_url: "http://localhost:5173".to_owned(),
            mail_relay_url: None,
            discord_webhook_url: None,
        }
    }

    #[test]
    fn issued_tokens_verify_back_to_the_user() {
        let config = test_config();
        let token = issue_token(&config, 42).unwrap();
        assert_eq!(verify_token(&config, &token).unwrap(), 42);
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let config = test_config();
        let token = issue_token(&config, 42).unwrap();
        let mut other = test_config();
        other.jwt_secret = "different".to_owned();
        assert!(matches!(
            verify_token(&other, &token),
            Err(AppError::AuthInvalidToken)
        ));
    }

    #[test]
    fn bearer_extraction_handles_malformed_headers() {
        assert!(matches!(bearer_token(None), Err(AppError::AuthRequired)));
        assert!(matches!(
            bearer_token(Some("Basic abc")),
            Err(AppError::AuthInvalidFormat)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer ")),
            Err(AppError::AuthInvalidFormat)
        ));
        assert!(matches!(
            bearer_token(Some("Bearer null")),
            Err(AppError::AuthInvalidFormat)
        ));
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
    }
}
