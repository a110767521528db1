use crate::api::middleware::authentication::CurrentSession;
use crate::api::{JsonBody, RequestContext};
use crate::common::error::ServiceResponse;
use crate::models::sessions::{LoginArgs, LoginResponse, LogoutResponse};
use crate::usecases::sessions;
use axum::Json;
use tracing::info;

pub async fn login(
    ctx: RequestContext,
    JsonBody(args): JsonBody<LoginArgs>,
) -> ServiceResponse<LoginResponse> {
    let ip_address = ctx.request_ip.ip_addr;
    let (session, user) = sessions::login(&ctx, args, ip_address).await?;
    Ok(Json(LoginResponse {
        token: session.session_id,
        user,
    }))
}

pub async fn logout(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
) -> ServiceResponse<LogoutResponse> {
    sessions::delete(&ctx, &session).await?;
    info!(user_id = %session.user_id, "User logged out");
    Ok(Json(LogoutResponse {
        message: "You have been logged out.",
    }))
}
