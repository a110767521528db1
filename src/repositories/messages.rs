use crate::common::context::Context;
use crate::entities::messages::{CreateMessageArgs, Message, MessageFilterArgs, UnreadMessage};
use uuid::Uuid;

const TABLE_NAME: &str = "messages";
const READ_FIELDS: &str = const_str::concat!(
    "m.id, m.sender_id, u.email AS sender_email, m.conversation_id, m.parent_message_id, ",
    "m.content, m.sent_at, m.edited, m.is_read, m.edited_at, m.edited_by"
);
const FROM_JOINED: &str = " FROM messages m INNER JOIN users u ON u.id = m.sender_id ";
const FILTER_CONDITIONS: &str = const_str::concat!(
    "(? IS NULL OR LOWER(u.email) LIKE ?) ",
    "AND (? IS NULL OR m.sent_at >= ?) ",
    "AND (? IS NULL OR m.sent_at <= ?)"
);
const USER_CONVERSATIONS: &str =
    "m.conversation_id IN (SELECT conversation_id FROM conversation_participants WHERE user_id = ?)";

macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.sender_email_pattern)
            .bind($filter.sender_email_pattern)
            .bind($filter.start_date)
            .bind($filter.start_date)
            .bind($filter.end_date)
            .bind($filter.end_date)
    };
}

pub async fn fetch_one<C: Context>(ctx: &C, message_id: Uuid) -> sqlx::Result<Message> {
    const QUERY: &str = const_str::concat!("SELECT ", READ_FIELDS, FROM_JOINED, "WHERE m.id = ?");
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_by_conversation<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "WHERE m.conversation_id = ? ORDER BY m.sent_at ASC"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await
}

/// Every message of every conversation `user_id` takes part in.
pub async fn fetch_by_participant<C: Context>(
    ctx: &C,
    user_id: Uuid,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "WHERE ",
        USER_CONVERSATIONS,
        " ORDER BY m.sent_at ASC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_page_in_conversation<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    filter: &MessageFilterArgs<'_>,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "WHERE m.conversation_id = ? AND ",
        FILTER_CONDITIONS,
        " ORDER BY m.sent_at ASC LIMIT ? OFFSET ?"
    );
    let query = sqlx::query_as(QUERY).bind(conversation_id);
    bind_filter!(query, filter)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(ctx.db())
        .await
}

pub async fn count_in_conversation<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    filter: &MessageFilterArgs<'_>,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*)",
        FROM_JOINED,
        "WHERE m.conversation_id = ? AND ",
        FILTER_CONDITIONS
    );
    let query = sqlx::query_scalar(QUERY).bind(conversation_id);
    let count: i64 = bind_filter!(query, filter).fetch_one(ctx.db()).await?;
    Ok(count as u64)
}

pub async fn fetch_page_for_participant<C: Context>(
    ctx: &C,
    user_id: Uuid,
    filter: &MessageFilterArgs<'_>,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "WHERE ",
        USER_CONVERSATIONS,
        " AND ",
        FILTER_CONDITIONS,
        " ORDER BY m.sent_at ASC LIMIT ? OFFSET ?"
    );
    let query = sqlx::query_as(QUERY).bind(user_id);
    bind_filter!(query, filter)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(ctx.db())
        .await
}

pub async fn count_for_participant<C: Context>(
    ctx: &C,
    user_id: Uuid,
    filter: &MessageFilterArgs<'_>,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "SELECT COUNT(*)",
        FROM_JOINED,
        "WHERE ",
        USER_CONVERSATIONS,
        " AND ",
        FILTER_CONDITIONS
    );
    let query = sqlx::query_scalar(QUERY).bind(user_id);
    let count: i64 = bind_filter!(query, filter).fetch_one(ctx.db()).await?;
    Ok(count as u64)
}

/// Stores the message and notifies every other participant of its conversation.
pub async fn create<C: Context>(ctx: &C, args: CreateMessageArgs<'_>) -> sqlx::Result<Uuid> {
    const INSERT_MESSAGE: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (id, sender_id, conversation_id, parent_message_id, content) ",
        "VALUES (?, ?, ?, ?, ?)"
    );
    const INSERT_NOTIFICATIONS: &str = const_str::concat!(
        "INSERT INTO notifications (id, user_id, message_id) ",
        "SELECT UUID_TO_BIN(UUID()), user_id, ? FROM conversation_participants ",
        "WHERE conversation_id = ? AND user_id <> ?"
    );
    let message_id = Uuid::new_v4();
    let mut tx = ctx.db().begin().await?;
    sqlx::query(INSERT_MESSAGE)
        .bind(message_id)
        .bind(args.sender_id)
        .bind(args.conversation_id)
        .bind(args.parent_message_id)
        .bind(args.content)
        .execute(&mut *tx)
        .await?;
    sqlx::query(INSERT_NOTIFICATIONS)
        .bind(message_id)
        .bind(args.conversation_id)
        .bind(args.sender_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(message_id)
}

/// Replaces the content, recording the previous one in the edit history.
/// Returns `false` without writing anything when the content is unchanged.
pub async fn update_content<C: Context>(
    ctx: &C,
    message_id: Uuid,
    content: &str,
    editor_id: Uuid,
) -> sqlx::Result<bool> {
    const SELECT_CONTENT: &str = "SELECT content FROM messages WHERE id = ? FOR UPDATE";
    const INSERT_HISTORY: &str = const_str::concat!(
        "INSERT INTO message_history (id, message_id, old_content, edited_by) ",
        "VALUES (?, ?, ?, ?)"
    );
    const UPDATE_MESSAGE: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET content = ?, edited = TRUE, edited_at = CURRENT_TIMESTAMP(6), edited_by = ? ",
        "WHERE id = ?"
    );
    let mut tx = ctx.db().begin().await?;
    let old_content: String = sqlx::query_scalar(SELECT_CONTENT)
        .bind(message_id)
        .fetch_one(&mut *tx)
        .await?;
    if old_content == content {
        tx.rollback().await?;
        return Ok(false);
    }
    sqlx::query(INSERT_HISTORY)
        .bind(Uuid::new_v4())
        .bind(message_id)
        .bind(&old_content)
        .bind(editor_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(UPDATE_MESSAGE)
        .bind(content)
        .bind(editor_id)
        .bind(message_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn delete<C: Context>(ctx: &C, message_id: Uuid) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE id = ?");
    let result = sqlx::query(QUERY).bind(message_id).execute(ctx.db()).await?;
    Ok(result.rows_affected())
}

pub async fn fetch_unread_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
) -> sqlx::Result<Vec<UnreadMessage>> {
    const QUERY: &str = const_str::concat!(
        "SELECT m.id, m.sender_id, m.content, m.sent_at FROM messages m WHERE ",
        USER_CONVERSATIONS,
        " AND m.sender_id <> ? AND m.is_read IS FALSE ORDER BY m.sent_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn mark_read<C: Context>(ctx: &C, message_id: Uuid, user_id: Uuid) -> sqlx::Result<()> {
    const UPDATE_MESSAGE: &str = "UPDATE messages SET is_read = TRUE WHERE id = ?";
    const UPDATE_NOTIFICATIONS: &str = const_str::concat!(
        "UPDATE notifications SET is_read = TRUE ",
        "WHERE message_id = ? AND user_id = ? AND is_read IS FALSE"
    );
    let mut tx = ctx.db().begin().await?;
    sqlx::query(UPDATE_MESSAGE)
        .bind(message_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query(UPDATE_NOTIFICATIONS)
        .bind(message_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub async fn fetch_sent_by<C: Context>(ctx: &C, sender_id: Uuid) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "WHERE m.sender_id = ? ORDER BY m.sent_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(sender_id)
        .fetch_all(ctx.db())
        .await
}

/// Direct replies to any message sent by `sender_id`.
pub async fn fetch_replies_to_sender<C: Context>(
    ctx: &C,
    sender_id: Uuid,
) -> sqlx::Result<Vec<Message>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        FROM_JOINED,
        "INNER JOIN messages p ON p.id = m.parent_message_id ",
        "WHERE p.sender_id = ? ORDER BY m.sent_at ASC"
    );
    sqlx::query_as(QUERY)
        .bind(sender_id)
        .fetch_all(ctx.db())
        .await
}
