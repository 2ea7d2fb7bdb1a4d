use crate::api::{AuthedUser, RequestContext};
use crate::common::error::{AppError, ServiceResponse};
use crate::models::replies::{Reply, SuccessCode};
use crate::models::scores::UserScoresArgs;
use crate::models::users::{
    EmailVerifyArgs, IdToUsernameArgs, LoginArgs, LoginResponse, PasswordForgotArgs,
    PasswordResetArgs, ProfileResponse, PublicUser, RegisterArgs, UserEntriesArgs, UserUpdateArgs,
};
use crate::usecases::{scores, sessions, users};
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::JsonRejection;
use serde_json::json;

fn body_or_error<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) | Err(JsonRejection::BytesRejection(_)) => {
            Err(AppError::EmptyBody)
        }
        Err(_) => Err(AppError::InvalidInput),
    }
}

pub async fn register(
    ctx: RequestContext,
    body: Result<Json<RegisterArgs>, JsonRejection>,
) -> ServiceResponse {
    let args = body_or_error(body)?;
    users::register(&ctx, &args).await?;
    Ok(Reply::with(SuccessCode::UserRegistered, ()))
}

pub async fn login(
    ctx: RequestContext,
    body: Result<Json<LoginArgs>, JsonRejection>,
) -> ServiceResponse {
    let args = body_or_error(body)?;
    let (_, token) = sessions::login(&ctx, &args.username, &args.password).await?;
    Ok(Reply::with(
        SuccessCode::UserLoggedIn,
        LoginResponse { token },
    ))
}

pub async fn profile(_ctx: RequestContext, AuthedUser(user): AuthedUser) -> ServiceResponse {
    let username = user.username.clone();
    Ok(Reply::with_values(
        SuccessCode::UserProfile,
        json!({ "user": ProfileResponse::from(&user) }),
        &[("username", &username)],
    ))
}

pub async fn update(
    ctx: RequestContext,
    AuthedUser(user): AuthedUser,
    Json(args): Json<UserUpdateArgs>,
) -> ServiceResponse {
    users::update_profile_photo(&ctx, &user, args.profile_photo_url.as_deref()).await?;
    Ok(Reply::ok(()))
}

pub async fn entries(ctx: RequestContext, Query(args): Query<UserEntriesArgs>) -> ServiceResponse {
    let page = users::fetch_entries(&ctx, args.username.as_deref(), args.page, args.limit).await?;
    Ok(Reply::ok(page))
}

pub async fn scores(ctx: RequestContext, Query(args): Query<UserScoresArgs>) -> ServiceResponse {
    let page = scores::fetch_user_scores(&ctx, &args).await?;
    Ok(Reply::ok(page))
}

pub async fn public_profile(
    ctx: RequestContext,
    Query(args): Query<IdToUsernameArgs>,
) -> ServiceResponse {
    let Some(user_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let user = users::fetch_one(&ctx, user_id).await?;
    Ok(Reply::ok(json!({ "user": PublicUser::from(&user) })))
}

pub async fn id_to_username(
    ctx: RequestContext,
    Query(args): Query<IdToUsernameArgs>,
) -> ServiceResponse {
    let Some(user_id) = args.id else {
        return Err(AppError::InvalidQuery("id".to_owned()));
    };
    let username = users::id_to_username(&ctx, user_id).await?;
    Ok(Reply::ok(json!({ "username": username })))
}

pub async fn email_verify(
    ctx: RequestContext,
    Query(args): Query<EmailVerifyArgs>,
) -> ServiceResponse {
    let Some(token) = args.token else {
        return Err(AppError::InvalidQuery("token".to_owned()));
    };
    users::verify_email(&ctx, &token).await?;
    Ok(Reply::ok(()))
}

pub async fn password_forgot(
    ctx: RequestContext,
    Json(args): Json<PasswordForgotArgs>,
) -> ServiceResponse {
    let Some(email) = args.email else {
        return Err(AppError::InvalidQuery("email".to_owned()));
    };
    users::forgot_password(&ctx, &email).await?;
    Ok(Reply::ok(()))
}

pub async fn password_reset(
    ctx: RequestContext,
    Json(args): Json<PasswordResetArgs>,
) -> ServiceResponse {
    let mut missing = Vec::new();
    if args.token.is_none() {
        missing.push("token");
    }
    if args.password.is_none() {
        missing.push("password");
    }
    if !missing.is_empty() {
        return Err(AppError::InvalidQuery(missing.join(", ")));
    }
    users::reset_password(&ctx, &args.token.unwrap(), &args.password.unwrap()).await?;
    Ok(Reply::ok(()))
}
