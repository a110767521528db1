use crate::api::middleware::authentication::CurrentSession;
use crate::api::{JsonBody, PathArgs, QueryArgs, RequestContext};
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::models::conversations::{Conversation, ConversationArgs, ConversationListArgs};
use crate::usecases::conversations;
use axum::Json;
use axum::http::StatusCode;
use uuid::Uuid;

pub async fn list(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    QueryArgs(args): QueryArgs<ConversationListArgs>,
) -> ServiceResponse<Vec<Conversation>> {
    let conversations =
        conversations::fetch_all_for_user(&ctx, session.user_id, args.ordering).await?;
    Ok(Json(conversations))
}

pub async fn create(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    JsonBody(args): JsonBody<ConversationArgs>,
) -> ServiceResult<(StatusCode, Json<Conversation>)> {
    let conversation = conversations::create(&ctx, args, session.user_id).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn retrieve(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(conversation_id): PathArgs<Uuid>,
) -> ServiceResponse<Conversation> {
    let conversation = conversations::fetch_one(&ctx, conversation_id, session.user_id).await?;
    Ok(Json(conversation))
}

pub async fn update(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(conversation_id): PathArgs<Uuid>,
    JsonBody(args): JsonBody<ConversationArgs>,
) -> ServiceResponse<Conversation> {
    let conversation =
        conversations::update(&ctx, conversation_id, args, session.user_id).await?;
    Ok(Json(conversation))
}

pub async fn delete(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(conversation_id): PathArgs<Uuid>,
) -> ServiceResult<StatusCode> {
    conversations::delete(&ctx, conversation_id, session.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
