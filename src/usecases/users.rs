use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::users::CreateUserArgs;
use crate::models::users::{RegisterArgs, User};
use crate::repositories::{inbox_cache, sessions, users};
use tracing::{info, warn};
use uuid::Uuid;

pub async fn fetch_one<C: Context>(ctx: &C, user_id: Uuid) -> ServiceResult<User> {
    match users::fetch_one(ctx, user_id).await {
        Ok(user) => User::try_from(user),
        Err(sqlx::Error::RowNotFound) => Err(AppError::UsersNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn register<C: Context>(ctx: &C, args: RegisterArgs) -> ServiceResult<User> {
    args.validate()?;
    let email = args.email.trim().to_lowercase();
    let password_hash = bcrypt::hash(&args.password, bcrypt::DEFAULT_COST)?;
    let phone_number = args
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|phone_number| !phone_number.is_empty());

    let create_args = CreateUserArgs {
        email: &email,
        first_name: args.first_name.trim(),
        last_name: args.last_name.trim(),
        phone_number,
        role: args.role.as_str(),
        password_hash: &password_hash,
    };
    let user_id = match users::create(ctx, create_args).await {
        Ok(user_id) => user_id,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(AppError::UsersEmailTaken);
        }
        Err(e) => return unexpected(e),
    };
    info!(%user_id, role = args.role.as_str(), "Registered user");
    fetch_one(ctx, user_id).await
}

/// Ends the account's sessions, then removes the account with everything it owns.
/// A failure to end the sessions leaves the account in place.
pub async fn delete_account<C: Context>(ctx: &C, user_id: Uuid) -> ServiceResult<()> {
    sessions::delete_all_for_user(ctx, user_id).await?;
    match users::delete(ctx, user_id).await {
        Ok(0) => return Err(AppError::UsersNotFound),
        Ok(_) => {}
        Err(e) => return unexpected(e),
    }
    if let Err(e) = inbox_cache::invalidate(ctx, user_id).await {
        warn!(%user_id, "Failed to drop cached inbox: {e:?}");
    }
    info!(%user_id, "Deleted user account");
    Ok(())
}
