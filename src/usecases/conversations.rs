use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::entities::conversations::Conversation as ConversationEntity;
use crate::models::conversations::{Conversation, ConversationArgs, ConversationOrdering};
use crate::models::messages::Message;
use crate::models::users::User;
use crate::repositories::{conversations, messages, users};
use hashbrown::HashMap;
use tracing::info;
use uuid::Uuid;

async fn fetch_entity<C: Context>(ctx: &C, conversation_id: Uuid) -> ServiceResult<ConversationEntity> {
    match conversations::fetch_one(ctx, conversation_id).await {
        Ok(conversation) => Ok(conversation),
        Err(sqlx::Error::RowNotFound) => Err(AppError::ConversationsNotFound),
        Err(e) => unexpected(e),
    }
}

/// Fails with `ConversationsNotFound` for unknown ids and
/// `ConversationsNotParticipant` when `user_id` is not part of it.
pub async fn ensure_participant<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<()> {
    fetch_entity(ctx, conversation_id).await?;
    match conversations::is_participant(ctx, conversation_id, user_id).await {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::ConversationsNotParticipant),
        Err(e) => unexpected(e),
    }
}

async fn ensure_users_exist<C: Context>(ctx: &C, participant_ids: &[Uuid]) -> ServiceResult<()> {
    match users::count_existing(ctx, participant_ids).await {
        Ok(count) if count == participant_ids.len() => Ok(()),
        Ok(_) => Err(AppError::ConversationsUnknownParticipant),
        Err(e) => unexpected(e),
    }
}

async fn assemble<C: Context>(
    ctx: &C,
    conversation: ConversationEntity,
) -> ServiceResult<Conversation> {
    let participants = conversations::fetch_participants(ctx, conversation.id)
        .await?
        .into_iter()
        .map(User::try_from)
        .collect::<ServiceResult<Vec<_>>>()?;
    let conversation_messages = messages::fetch_by_conversation(ctx, conversation.id).await?;
    Ok(Conversation {
        conversation_id: conversation.id,
        participants,
        messages: conversation_messages.into_iter().map(Message::from).collect(),
        created_at: conversation.created_at,
    })
}

pub async fn fetch_all_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
    ordering: ConversationOrdering,
) -> ServiceResult<Vec<Conversation>> {
    let conversations = conversations::fetch_for_user(ctx, user_id, ordering).await?;
    let participants = conversations::fetch_participants_for_user(ctx, user_id).await?;
    let messages = messages::fetch_by_participant(ctx, user_id).await?;

    let mut participants_by_conversation: HashMap<Uuid, Vec<User>> = HashMap::new();
    for participant in participants {
        let user = User::try_from(participant.user)?;
        participants_by_conversation
            .entry(participant.conversation_id)
            .or_default()
            .push(user);
    }
    let mut messages_by_conversation: HashMap<Uuid, Vec<Message>> = HashMap::new();
    for message in messages {
        messages_by_conversation
            .entry(message.conversation_id)
            .or_default()
            .push(Message::from(message));
    }

    let conversations = conversations
        .into_iter()
        .map(|conversation| Conversation {
            conversation_id: conversation.id,
            participants: participants_by_conversation
                .remove(&conversation.id)
                .unwrap_or_default(),
            messages: messages_by_conversation
                .remove(&conversation.id)
                .unwrap_or_default(),
            created_at: conversation.created_at,
        })
        .collect();
    Ok(conversations)
}

pub async fn fetch_one<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Conversation> {
    let conversation = fetch_entity(ctx, conversation_id).await?;
    let conversation = assemble(ctx, conversation).await?;
    match conversation.has_participant(user_id) {
        true => Ok(conversation),
        false => Err(AppError::ConversationsNotParticipant),
    }
}

pub async fn create<C: Context>(
    ctx: &C,
    args: ConversationArgs,
    user_id: Uuid,
) -> ServiceResult<Conversation> {
    let participant_ids = args.validated_participant_ids()?;
    ensure_users_exist(ctx, &participant_ids).await?;
    // the creator is not implicitly a participant
    let conversation_id = conversations::create(ctx, &participant_ids).await?;
    info!(
        %conversation_id,
        created_by = %user_id,
        participants = participant_ids.len(),
        "Created conversation"
    );
    let conversation = fetch_entity(ctx, conversation_id).await?;
    assemble(ctx, conversation).await
}

pub async fn update<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    args: ConversationArgs,
    user_id: Uuid,
) -> ServiceResult<Conversation> {
    ensure_participant(ctx, conversation_id, user_id).await?;
    let participant_ids = args.validated_participant_ids()?;
    ensure_users_exist(ctx, &participant_ids).await?;
    conversations::replace_participants(ctx, conversation_id, &participant_ids).await?;
    info!(%conversation_id, updated_by = %user_id, "Replaced conversation participants");

    let conversation = fetch_entity(ctx, conversation_id).await?;
    assemble(ctx, conversation).await
}

pub async fn delete<C: Context>(ctx: &C, conversation_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
    ensure_participant(ctx, conversation_id, user_id).await?;
    conversations::delete(ctx, conversation_id).await?;
    info!(%conversation_id, deleted_by = %user_id, "Deleted conversation");
    Ok(())
}
