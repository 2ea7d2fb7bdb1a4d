use crate::common::error::{AppError, ServiceResult};
use crate::entities::users::User as UserEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 32;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 48;

#[derive(Deserialize)]
pub struct RegisterArgs {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub active: bool,
    pub admin: bool,
    pub profile_photo_url: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(value: UserEntity) -> Self {
        Self {
            user_id: value.id,
            username: value.username,
            email: value.email,
            email_verified: value.email_verified,
            active: value.active,
            admin: value.admin,
            profile_photo_url: value.profile_photo_url,
            country: value.country,
            created_at: value.created_at,
        }
    }
}

/// Public projection of a user; the only shape non-admin callers ever see.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub profile_photo_url: Option<String>,
    pub country: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
            profile_photo_url: user.profile_photo_url.clone(),
            country: user.country.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub email_verified: bool,
    pub admin: bool,
    pub profile_photo_url: Option<String>,
    pub country: Option<String>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            admin: user.admin,
            profile_photo_url: user.profile_photo_url.clone(),
            country: user.country.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct UserEntriesArgs {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct IdToUsernameArgs {
    pub id: Option<i64>,
}

#[derive(Deserialize)]
pub struct EmailVerifyArgs {
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordForgotArgs {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordResetArgs {
    pub token: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateArgs {
    pub profile_photo_url: Option<String>,
}

pub fn validate_username(username: &str) -> ServiceResult<()> {
    if username.chars().count() < USERNAME_MIN {
        return Err(AppError::UsersUsernameTooSmall);
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(AppError::UsersUsernameTooBig);
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::UsersUsernameHasSpaces);
    }
    if username.chars().any(|c| matches!(c, '#' | '%' | '+')) {
        return Err(AppError::UsersUsernameForbiddenSymbols);
    }
    let edges = [username.chars().next(), username.chars().last()];
    if edges
        .into_iter()
        .flatten()
        .any(|c| matches!(c, '.' | '_' | '-'))
    {
        return Err(AppError::UsersUsernameBadEdges);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::UsersPasswordNoUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::UsersPasswordNoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::UsersPasswordNoNumber);
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return Err(AppError::UsersPasswordNoSpecialChar);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(AppError::UsersPasswordTooSmall);
    }
    if password.chars().count() > PASSWORD_MAX {
        return Err(AppError::UsersPasswordTooBig);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ServiceResult<()> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::UsersInvalidEmail);
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.is_empty();
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(AppError::UsersInvalidEmail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("phantom").is_ok());
        assert!(matches!(
            validate_username("ab"),
            Err(AppError::UsersUsernameTooSmall)
        ));
        assert!(matches!(
            validate_username(&"a".repeat(33)),
            Err(AppError::UsersUsernameTooBig)
        ));
        assert!(matches!(
            validate_username("has space"),
            Err(AppError::UsersUsernameHasSpaces)
        ));
        assert!(matches!(
            validate_username("bad#name"),
            Err(AppError::UsersUsernameForbiddenSymbols)
        ));
        assert!(matches!(
            validate_username("_leading"),
            Err(AppError::UsersUsernameBadEdges)
        ));
        assert!(matches!(
            validate_username("trailing-"),
            Err(AppError::UsersUsernameBadEdges)
        ));
        assert!(validate_username("mid.dot-ok_yes").is_ok());
    }

    #[test]
    fn password_rules_fire_in_order() {
        assert!(validate_password("Str0ng!pass").is_ok());
        assert!(matches!(
            validate_password("str0ng!pass"),
            Err(AppError::UsersPasswordNoUppercase)
        ));
        assert!(matches!(
            validate_password("STR0NG!PASS"),
            Err(AppError::UsersPasswordNoLowercase)
        ));
        assert!(matches!(
            validate_password("Strong!pass"),
            Err(AppError::UsersPasswordNoNumber)
        ));
        assert!(matches!(
            validate_password("Str0ngpass"),
            Err(AppError::UsersPasswordNoSpecialChar)
        ));
        assert!(matches!(
            validate_password("S0r!t"),
            Err(AppError::UsersPasswordTooSmall)
        ));
    }

    #[test]
    fn email_needs_local_and_dotted_domain() {
        assert!(validate_email("player@example.com").is_ok());
        assert!(validate_email("nodomain@").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("plain").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email("a@nodot").is_err());
    }
}
