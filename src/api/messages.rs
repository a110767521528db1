use crate::api::middleware::authentication::CurrentSession;
use crate::api::{JsonBody, PathArgs, QueryArgs, RequestContext};
use crate::common::error::{ServiceResponse, ServiceResult};
use crate::common::state::AppState;
use crate::models::message_history::MessageHistory;
use crate::models::messages::{
    CreateMessageArgs, CreateMessageInConversationArgs, InboxEntry, Message, MessageFilter,
    ThreadNode, UnreadMessage, UpdateMessageArgs,
};
use crate::models::pagination::{Page, PageArgs};
use crate::usecases::messages;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;

pub async fn list_in_conversation(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(conversation_id): PathArgs<Uuid>,
    QueryArgs(filter): QueryArgs<MessageFilter>,
    QueryArgs(page): QueryArgs<PageArgs>,
) -> ServiceResponse<Page<Message>> {
    let page = messages::fetch_page_in_conversation(
        &ctx,
        conversation_id,
        session.user_id,
        &filter,
        &page,
    )
    .await?;
    Ok(Json(page))
}

pub async fn create_in_conversation(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(conversation_id): PathArgs<Uuid>,
    JsonBody(args): JsonBody<CreateMessageArgs>,
) -> ServiceResult<(StatusCode, Json<Message>)> {
    let message = messages::create(
        &ctx,
        session.user_id,
        conversation_id,
        &args.message_body,
        args.parent_message,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn retrieve_in_conversation(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs((conversation_id, message_id)): PathArgs<(Uuid, Uuid)>,
) -> ServiceResponse<Message> {
    let message =
        messages::fetch_one(&ctx, message_id, session.user_id, Some(conversation_id)).await?;
    Ok(Json(message))
}

pub async fn update_in_conversation(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs((conversation_id, message_id)): PathArgs<(Uuid, Uuid)>,
    JsonBody(args): JsonBody<UpdateMessageArgs>,
) -> ServiceResponse<Message> {
    let message = messages::update(
        &ctx,
        message_id,
        session.user_id,
        Some(conversation_id),
        &args.message_body,
    )
    .await?;
    Ok(Json(message))
}

pub async fn delete_in_conversation(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs((conversation_id, message_id)): PathArgs<(Uuid, Uuid)>,
) -> ServiceResult<StatusCode> {
    messages::delete(&ctx, message_id, session.user_id, Some(conversation_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    QueryArgs(filter): QueryArgs<MessageFilter>,
    QueryArgs(page): QueryArgs<PageArgs>,
) -> ServiceResponse<Page<Message>> {
    let page = messages::fetch_page(&ctx, session.user_id, &filter, &page).await?;
    Ok(Json(page))
}

pub async fn create(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    JsonBody(args): JsonBody<CreateMessageInConversationArgs>,
) -> ServiceResult<(StatusCode, Json<Message>)> {
    let message = messages::create(
        &ctx,
        session.user_id,
        args.conversation,
        &args.message_body,
        args.parent_message,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn retrieve(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
) -> ServiceResponse<Message> {
    let message = messages::fetch_one(&ctx, message_id, session.user_id, None).await?;
    Ok(Json(message))
}

pub async fn update(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
    JsonBody(args): JsonBody<UpdateMessageArgs>,
) -> ServiceResponse<Message> {
    let message =
        messages::update(&ctx, message_id, session.user_id, None, &args.message_body).await?;
    Ok(Json(message))
}

pub async fn delete(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
) -> ServiceResult<StatusCode> {
    messages::delete(&ctx, message_id, session.user_id, None).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn thread(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
) -> ServiceResponse<ThreadNode> {
    let thread = messages::fetch_thread(&ctx, message_id, session.user_id).await?;
    Ok(Json(thread))
}

pub async fn history(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
) -> ServiceResponse<Vec<MessageHistory>> {
    let history = messages::fetch_history(&ctx, message_id, session.user_id).await?;
    Ok(Json(history))
}

pub async fn unread(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
) -> ServiceResponse<Vec<UnreadMessage>> {
    let unread = messages::fetch_unread(&ctx, session.user_id).await?;
    Ok(Json(unread))
}

pub async fn mark_read(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(message_id): PathArgs<Uuid>,
) -> ServiceResponse<Message> {
    let message = messages::mark_read(&ctx, message_id, session.user_id).await?;
    Ok(Json(message))
}

pub async fn inbox(
    State(state): State<AppState>,
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
) -> ServiceResponse<Vec<InboxEntry>> {
    let inbox = messages::fetch_inbox(&ctx, session.user_id, state.inbox_cache_ttl).await?;
    Ok(Json(inbox))
}
