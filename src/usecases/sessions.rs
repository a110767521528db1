use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::common::memoize::Memoized;
use crate::entities::sessions::CreateSessionArgs;
use crate::models::sessions::{LoginArgs, Session};
use crate::models::users::User;
use crate::repositories::{sessions, users};
use std::net::IpAddr;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

fn make_dummy_hash() -> String {
    bcrypt::hash("not-a-real-password", bcrypt::DEFAULT_COST).unwrap_or_default()
}

/// Verified against when the email is unknown, so both failures cost a bcrypt round.
static DUMMY_PASSWORD_HASH: Memoized<String> = Memoized::new(make_dummy_hash as fn() -> String);

pub async fn login<C: Context>(
    ctx: &C,
    args: LoginArgs,
    ip_address: IpAddr,
) -> ServiceResult<(Session, User)> {
    let email = args.email.trim().to_lowercase();
    let user = match users::fetch_one_by_email(ctx, &email).await {
        Ok(user) => user,
        Err(sqlx::Error::RowNotFound) => {
            let _ = bcrypt::verify(&args.password, DUMMY_PASSWORD_HASH.get());
            return Err(AppError::SessionsInvalidCredentials);
        }
        Err(e) => return unexpected(e),
    };

    if !bcrypt::verify(&args.password, &user.password_hash)? {
        return Err(AppError::SessionsInvalidCredentials);
    }

    let user = User::try_from(user)?;
    let session = sessions::create(
        ctx,
        CreateSessionArgs {
            ip_address,
            user_id: user.user_id,
            email: user.email.clone(),
            role: user.role.to_string(),
        },
    )
    .await?;
    info!(user_id = %user.user_id, %ip_address, "User logged in");
    Ok((Session::from(session), user))
}

pub async fn delete<C: Context>(ctx: &C, session: &Session) -> ServiceResult<()> {
    match sessions::delete(ctx, session.session_id, session.user_id).await {
        Ok(_) => Ok(()),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_one<C: Context>(
    ctx: &C,
    session_id: Uuid,
    timeout: Duration,
) -> ServiceResult<Session> {
    match sessions::fetch_one(ctx, session_id).await {
        Ok(Some(session)) => {
            let session = Session::from(session);
            if session.is_expired(timeout) {
                sessions::delete(ctx, session.session_id, session.user_id).await?;
                return Err(AppError::SessionsNotFound);
            }
            Ok(session)
        }
        Ok(None) => Err(AppError::SessionsNotFound),
        Err(e) => unexpected(e),
    }
}

pub async fn fetch_all<C: Context>(ctx: &C) -> ServiceResult<impl Iterator<Item = Session>> {
    match sessions::fetch_all(ctx).await {
        Ok(sessions) => Ok(sessions.map(Session::from)),
        Err(e) => unexpected(e),
    }
}

pub async fn extend<C: Context>(ctx: &C, session: Session) -> ServiceResult<Session> {
    match sessions::extend(ctx, session.into()).await {
        Ok(session) => Ok(Session::from(session)),
        Err(e) => unexpected(e),
    }
}
