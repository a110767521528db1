use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::messages::{CreateMessageArgs, MessageFilterArgs};
use crate::models::message_history::MessageHistory;
use crate::models::messages::{
    InboxEntry, Message, MessageFilter, ThreadNode, UnreadMessage, build_inbox, build_thread,
    validate_message_body,
};
use crate::models::pagination::{Page, PageArgs};
use crate::repositories::{inbox_cache, message_history, messages};
use crate::usecases::conversations;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

async fn fetch_entity<C: Context>(ctx: &C, message_id: Uuid) -> ServiceResult<Message> {
    match messages::fetch_one(ctx, message_id).await {
        Ok(message) => Ok(Message::from(message)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::MessagesNotFound),
        Err(e) => unexpected(e),
    }
}

/// Fetches a message the user may see. When `conversation_id` is given the
/// message must belong to it.
pub async fn fetch_one<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
    conversation_id: Option<Uuid>,
) -> ServiceResult<Message> {
    let message = fetch_entity(ctx, message_id).await?;
    if conversation_id.is_some_and(|conversation_id| conversation_id != message.conversation) {
        return Err(AppError::MessagesNotFound);
    }
    conversations::ensure_participant(ctx, message.conversation, user_id).await?;
    Ok(message)
}

fn filter_args<'a>(
    filter: &MessageFilter,
    sender_email_pattern: Option<&'a str>,
    page: &PageArgs,
) -> MessageFilterArgs<'a> {
    MessageFilterArgs {
        sender_email_pattern,
        start_date: filter.start_date,
        end_date: filter.end_date,
        limit: page.page_size(),
        offset: page.offset(),
    }
}

pub async fn fetch_page_in_conversation<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    user_id: Uuid,
    filter: &MessageFilter,
    page: &PageArgs,
) -> ServiceResult<Page<Message>> {
    conversations::ensure_participant(ctx, conversation_id, user_id).await?;
    filter.validate()?;
    let pattern = filter.sender_email_pattern();
    let args = filter_args(filter, pattern.as_deref(), page);

    let results = messages::fetch_page_in_conversation(ctx, conversation_id, &args).await?;
    let count = messages::count_in_conversation(ctx, conversation_id, &args).await?;
    let results = results.into_iter().map(Message::from).collect();
    Ok(Page::new(results, count, page))
}

/// Messages across every conversation the user takes part in.
pub async fn fetch_page<C: Context>(
    ctx: &C,
    user_id: Uuid,
    filter: &MessageFilter,
    page: &PageArgs,
) -> ServiceResult<Page<Message>> {
    filter.validate()?;
    let pattern = filter.sender_email_pattern();
    let args = filter_args(filter, pattern.as_deref(), page);

    let results = messages::fetch_page_for_participant(ctx, user_id, &args).await?;
    let count = messages::count_for_participant(ctx, user_id, &args).await?;
    let results = results.into_iter().map(Message::from).collect();
    Ok(Page::new(results, count, page))
}

async fn invalidate_inbox<C: Context>(ctx: &C, user_id: Uuid) {
    if let Err(e) = inbox_cache::invalidate(ctx, user_id).await {
        warn!(%user_id, "Failed to drop cached inbox: {e:?}");
    }
}

/// Drops the cached inboxes a written message shows up in. Runs after the write
/// has committed, so failures are only logged.
async fn invalidate_inboxes<C: Context>(ctx: &C, message: &Message) {
    invalidate_inbox(ctx, message.sender).await;
    if let Some(parent_id) = message.parent_message {
        match messages::fetch_one(ctx, parent_id).await {
            Ok(parent) => invalidate_inbox(ctx, parent.sender_id).await,
            Err(sqlx::Error::RowNotFound) => {}
            Err(e) => warn!(%parent_id, "Failed to look up parent for inbox invalidation: {e:?}"),
        }
    }
}

pub async fn create<C: Context>(
    ctx: &C,
    sender_id: Uuid,
    conversation_id: Uuid,
    message_body: &str,
    parent_message: Option<Uuid>,
) -> ServiceResult<Message> {
    match conversations::ensure_participant(ctx, conversation_id, sender_id).await {
        Ok(()) => {}
        Err(AppError::ConversationsNotParticipant) => return Err(AppError::MessagesNotAllowed),
        Err(e) => return Err(e),
    }
    validate_message_body(message_body)?;

    if let Some(parent_id) = parent_message {
        match messages::fetch_one(ctx, parent_id).await {
            Ok(parent) if parent.conversation_id == conversation_id => {}
            Ok(_) | Err(sqlx::Error::RowNotFound) => return Err(AppError::MessagesInvalidParent),
            Err(e) => return unexpected(e),
        }
    }

    let create_args = CreateMessageArgs {
        sender_id,
        conversation_id,
        parent_message_id: parent_message,
        content: message_body,
    };
    let message_id = messages::create(ctx, create_args).await?;
    info!(%message_id, %conversation_id, %sender_id, "Message sent");

    let message = fetch_entity(ctx, message_id).await?;
    invalidate_inboxes(ctx, &message).await;
    Ok(message)
}

pub async fn update<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
    conversation_id: Option<Uuid>,
    message_body: &str,
) -> ServiceResult<Message> {
    let message = fetch_one(ctx, message_id, user_id, conversation_id).await?;
    if message.sender != user_id {
        return Err(AppError::MessagesNotSender);
    }
    validate_message_body(message_body)?;

    match messages::update_content(ctx, message_id, message_body, user_id).await {
        Ok(true) => info!(%message_id, edited_by = %user_id, "Message edited"),
        Ok(false) => return Ok(message),
        Err(sqlx::Error::RowNotFound) => return Err(AppError::MessagesNotFound),
        Err(e) => return unexpected(e),
    }
    let message = fetch_entity(ctx, message_id).await?;
    invalidate_inboxes(ctx, &message).await;
    Ok(message)
}

pub async fn delete<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
    conversation_id: Option<Uuid>,
) -> ServiceResult<()> {
    let message = fetch_one(ctx, message_id, user_id, conversation_id).await?;
    if message.sender != user_id {
        return Err(AppError::MessagesNotSender);
    }
    match messages::delete(ctx, message_id).await {
        Ok(0) => return Err(AppError::MessagesNotFound),
        Ok(_) => info!(%message_id, "Message deleted"),
        Err(e) => return unexpected(e),
    }
    invalidate_inboxes(ctx, &message).await;
    Ok(())
}

/// The message with all its replies, loaded with a single query over its conversation.
pub async fn fetch_thread<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<ThreadNode> {
    let root = fetch_one(ctx, message_id, user_id, None).await?;
    let conversation_messages = messages::fetch_by_conversation(ctx, root.conversation).await?;
    let conversation_messages = conversation_messages.into_iter().map(Message::from).collect();
    Ok(build_thread(root, conversation_messages))
}

pub async fn fetch_history<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Vec<MessageHistory>> {
    fetch_one(ctx, message_id, user_id, None).await?;
    let history = message_history::fetch_by_message(ctx, message_id).await?;
    Ok(history.into_iter().map(MessageHistory::from).collect())
}

pub async fn fetch_unread<C: Context>(ctx: &C, user_id: Uuid) -> ServiceResult<Vec<UnreadMessage>> {
    let unread = messages::fetch_unread_for_user(ctx, user_id).await?;
    Ok(unread.into_iter().map(UnreadMessage::from).collect())
}

pub async fn mark_read<C: Context>(
    ctx: &C,
    message_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Message> {
    let message = fetch_one(ctx, message_id, user_id, None).await?;
    message.ensure_recipient(user_id)?;
    messages::mark_read(ctx, message_id, user_id).await?;
    fetch_entity(ctx, message_id).await
}

/// Sent messages with their direct replies, cached per user for `ttl`.
pub async fn fetch_inbox<C: Context>(
    ctx: &C,
    user_id: Uuid,
    ttl: Duration,
) -> ServiceResult<Vec<InboxEntry>> {
    match inbox_cache::fetch(ctx, user_id).await {
        Ok(Some(inbox)) => return Ok(inbox),
        Ok(None) => {}
        Err(e) => warn!(%user_id, "Failed to read cached inbox: {e:?}"),
    }

    let sent = messages::fetch_sent_by(ctx, user_id).await?;
    let replies = messages::fetch_replies_to_sender(ctx, user_id).await?;
    let inbox = build_inbox(
        sent.into_iter().map(Message::from).collect(),
        replies.into_iter().map(Message::from).collect(),
    );
    if let Err(e) = inbox_cache::store(ctx, user_id, &inbox, ttl).await {
        warn!(%user_id, "Failed to cache inbox: {e:?}");
    }
    Ok(inbox)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::RedisDown;
    use chrono::Utc;

    fn message(parent_message: Option<Uuid>) -> Message {
        Message {
            message_id: Uuid::from_u128(1),
            sender: Uuid::from_u128(100),
            sender_email: "ada@example.com".to_string(),
            conversation: Uuid::from_u128(200),
            parent_message,
            message_body: "hello".to_string(),
            sent_at: Utc::now(),
            edited: false,
            read: false,
            edited_at: None,
            edited_by: None,
        }
    }

    #[tokio::test]
    async fn cache_failures_do_not_fail_a_committed_write() {
        let ctx = RedisDown::new();
        invalidate_inboxes(&ctx, &message(None)).await;
        assert_eq!(ctx.db_calls(), 0);
    }

    #[tokio::test]
    async fn parent_lookup_failures_are_tolerated() {
        let ctx = RedisDown::new();
        invalidate_inboxes(&ctx, &message(Some(Uuid::from_u128(2)))).await;
        assert_eq!(ctx.db_calls(), 1);
    }
}
