use crate::api::middleware::authentication::CurrentSession;
use crate::api::{JsonBody, RequestContext};
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::models::users::{DeleteAccountResponse, RegisterArgs, User};
use crate::usecases::users;
use axum::Json;
use axum::http::StatusCode;

pub async fn register(
    ctx: RequestContext,
    JsonBody(args): JsonBody<RegisterArgs>,
) -> ServiceResult<(StatusCode, Json<User>)> {
    let user = users::register(&ctx, args).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn me(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
) -> ServiceResponse<User> {
    let user = users::fetch_one(&ctx, session.user_id).await?;
    Ok(Json(user))
}

pub async fn delete_account(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
) -> ServiceResponse<DeleteAccountResponse> {
    users::delete_account(&ctx, session.user_id).await?;
    Ok(Json(DeleteAccountResponse {
        message: "Your account and related data have been deleted.",
    }))
}
