use crate::adapters::{discord, mailer};
use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::admin::{AdminAction, UserBanArgs, UserBanResponse};
use crate::models::replies::Paginated;
use crate::models::users::{
    ProfileResponse, PublicUser, RegisterArgs, User, validate_email, validate_password,
    validate_username,
};
use crate::repositories::{admin_logs, is_unique_violation, scores, users};
use crate::usecases::email_tokens::{self, Purpose};
use tracing::warn;

const BCRYPT_COST: u32 = 12;
const DEFAULT_PAGE_SIZE: u32 = 15;

pub async fn fetch_one<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<User> {
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => Ok(User::from(user)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::UsersNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn register<C: Context>(ctx: &C, args: &RegisterArgs) -> ServiceResult<()> {
    validate_username(&args.username)?;
    validate_password(&args.password)?;
    validate_email(&args.email)?;

    let username_safe = args.username.to_lowercase();
    let email = args.email.to_lowercase();

    // Friendly pre-checks; the unique indexes stay the authority below.
    if users::fetch_one_by_username_safe(ctx, &username_safe)
        .await?
        .is_some()
    {
        return Err(AppError::UsersDuplicateUsername(args.username.clone()));
    }
    if users::fetch_one_by_email(ctx, &email).await?.is_some() {
        return Err(AppError::UsersDuplicateEmail);
    }

    let password_hash = bcrypt::hash(&args.password, BCRYPT_COST)?;
    let user_id =
        match users::create(ctx, &args.username, &username_safe, &password_hash, &email).await {
            Ok(user_id) => user_id,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::UsersDuplicateUsername(args.username.clone()));
            }
            Err(e) => return unexpected(e),
        };

    // Verification mail failures must not lose the fresh registration
    let token = email_tokens::issue(ctx, user_id, Purpose::Verify).await?;
    if let Err(e) = mailer::send_verification(ctx.config(), &email, &token).await {
        warn!("Failed to send verification email: {e:?}");
    }
    Ok(())
}

pub async fn fetch_entries<C: Context>(
    ctx: &C,
    username: Option<&str>,
    page: Option<u32>,
    limit: Option<u32>,
) -> ServiceResult<Paginated<serde_json::Value>> {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let entries = users::fetch_entries(ctx, username, page, limit).await?;
    let total = users::count_entries(ctx, username).await?;
    // Production listings expose the public projection only
    let dev_mode = ctx.config().dev_mode;
    let entries = entries
        .into_iter()
        .map(User::from)
        .map(|user| {
            if dev_mode {
                serde_json::to_value(ProfileResponse::from(&user))
            } else {
                serde_json::to_value(PublicUser::from(&user))
            }
        })
        .collect::<Result<_, _>>()?;
    Ok(Paginated::new(total, page, limit, entries))
}

pub async fn id_to_username<C: Context>(ctx: &C, user_id: i64) -> ServiceResult<String> {
    let user = fetch_one(ctx, user_id).await?;
    Ok(user.username)
}

pub async fn update_profile_photo<C: Context>(
    ctx: &C,
    user: &User,
    profile_photo_url: Option<&str>,
) -> ServiceResult<()> {
    users::update_profile_photo(ctx, user.user_id, profile_photo_url).await?;
    Ok(())
}

pub async fn verify_email<C: Context>(ctx: &C, token: &str) -> ServiceResult<()> {
    let token = email_tokens::consume(ctx, Purpose::Verify, token).await?;
    let user = fetch_one(ctx, token.user_id).await?;
    if !user.email_verified {
        users::set_email_verified(ctx, user.user_id).await?;
    }
    Ok(())
}

/// Always succeeds from the caller's point of view so the endpoint does not
/// reveal which addresses are registered.
pub async fn forgot_password<C: Context>(ctx: &C, email: &str) -> ServiceResult<()> {
    let email = email.to_lowercase();
    if let Some(user) = users::fetch_one_by_email(ctx, &email).await? {
        let token = email_tokens::issue(ctx, user.id, Purpose::Reset).await?;
        if let Err(e) = mailer::send_reset(ctx.config(), &email, &token).await {
            warn!("Failed to send password reset email: {e:?}");
        }
    }
    Ok(())
}

pub async fn reset_password<C: Context>(ctx: &C, token: &str, password: &str) -> ServiceResult<()> {
    validate_password(password)?;
    let token = email_tokens::consume(ctx, Purpose::Reset, token).await?;
    let user = fetch_one(ctx, token.user_id).await?;
    let password_hash = bcrypt::hash(password, BCRYPT_COST)?;
    users::update_password(ctx, user.user_id, &password_hash).await?;
    Ok(())
}

/// Bans or unbans a user; their scores are hidden or unhidden in the same
/// stroke and the action lands in the audit log.
pub async fn set_active<C: Context>(
    ctx: &C,
    admin: &User,
    args: &UserBanArgs,
) -> ServiceResult<UserBanResponse> {
    let mut missing = Vec::new();
    if args.id.is_none() {
        missing.push("id");
    }
    if args.active.is_none() {
        missing.push("active");
    }
    if args.reason.as_deref().unwrap_or_default().is_empty() {
        missing.push("reason");
    }
    if !missing.is_empty() {
        return Err(AppError::InvalidQuery(missing.join(", ")));
    }
    let (user_id, active) = (args.id.unwrap(), args.active.unwrap());

    let user = fetch_one(ctx, user_id).await?;
    if user.active == active {
        return Err(AppError::AdminUserAlreadyInState);
    }

    scores::set_hidden_for_uploader(ctx, user_id, !active).await?;
    users::set_active(ctx, user_id, active).await?;

    let action = if active {
        AdminAction::UserUnban
    } else {
        AdminAction::UserBan
    };
    admin_logs::insert(ctx, admin.user_id, action, user_id, args.reason.as_deref()).await?;
    let description = format!(
        "{} (#{user_id}) by {} (#{}): {}",
        user.username,
        admin.username,
        admin.user_id,
        args.reason.as_deref().unwrap_or_default(),
    );
    if let Err(e) = discord::admin_action(ctx.config(), action.describe(), &description).await {
        warn!("Failed to notify admin action: {e:?}");
    }

    Ok(UserBanResponse {
        user: user_id,
        active,
    })
}
