use crate::common::context::Context;
use crate::entities::conversations::{Conversation, Participant};
use crate::entities::users::User;
use crate::models::conversations::ConversationOrdering;
use sqlx::{MySql, MySqlConnection, QueryBuilder};
use uuid::Uuid;

const TABLE_NAME: &str = "conversations";
const READ_FIELDS: &str = "c.id, c.created_at";
const PARTICIPANT_FIELDS: &str = const_str::concat!(
    "cp.conversation_id, u.id, u.email, u.first_name, u.last_name, ",
    "u.phone_number, u.role, u.password_hash, u.created_at"
);

async fn insert_participants(
    conn: &mut MySqlConnection,
    conversation_id: Uuid,
    participant_ids: &[Uuid],
) -> sqlx::Result<()> {
    let mut query = QueryBuilder::<MySql>::new(
        "INSERT INTO conversation_participants (conversation_id, user_id) ",
    );
    query.push_values(participant_ids, |mut row, user_id| {
        row.push_bind(conversation_id).push_bind(*user_id);
    });
    query.build().execute(conn).await?;
    Ok(())
}

pub async fn create<C: Context>(ctx: &C, participant_ids: &[Uuid]) -> sqlx::Result<Uuid> {
    const QUERY: &str = const_str::concat!("INSERT INTO ", TABLE_NAME, " (id) VALUES (?)");
    let conversation_id = Uuid::new_v4();
    let mut tx = ctx.db().begin().await?;
    sqlx::query(QUERY)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    insert_participants(&mut tx, conversation_id, participant_ids).await?;
    tx.commit().await?;
    Ok(conversation_id)
}

pub async fn fetch_one<C: Context>(ctx: &C, conversation_id: Uuid) -> sqlx::Result<Conversation> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " c WHERE c.id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
    ordering: ConversationOrdering,
) -> sqlx::Result<Vec<Conversation>> {
    const QUERY_BASE: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " c INNER JOIN conversation_participants cp ON cp.conversation_id = c.id ",
        "WHERE cp.user_id = ? ORDER BY c.created_at"
    );
    const QUERY_ASC: &str = const_str::concat!(QUERY_BASE, " ASC");
    const QUERY_DESC: &str = const_str::concat!(QUERY_BASE, " DESC");
    let query = match ordering {
        ConversationOrdering::OldestFirst => QUERY_ASC,
        ConversationOrdering::NewestFirst => QUERY_DESC,
    };
    sqlx::query_as(query)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_participants<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
) -> sqlx::Result<Vec<User>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        PARTICIPANT_FIELDS,
        " FROM conversation_participants cp INNER JOIN users u ON u.id = cp.user_id ",
        "WHERE cp.conversation_id = ? ORDER BY u.email"
    );
    let participants: Vec<Participant> = sqlx::query_as(QUERY)
        .bind(conversation_id)
        .fetch_all(ctx.db())
        .await?;
    Ok(participants.into_iter().map(|p| p.user).collect())
}

/// Participants of every conversation `user_id` takes part in.
pub async fn fetch_participants_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
) -> sqlx::Result<Vec<Participant>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        PARTICIPANT_FIELDS,
        " FROM conversation_participants cp INNER JOIN users u ON u.id = cp.user_id ",
        "WHERE cp.conversation_id IN ",
        "(SELECT conversation_id FROM conversation_participants WHERE user_id = ?) ",
        "ORDER BY u.email"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_all(ctx.db())
        .await
}

pub async fn is_participant<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<bool> {
    const QUERY: &str = const_str::concat!(
        "SELECT EXISTS(SELECT 1 FROM conversation_participants ",
        "WHERE conversation_id = ? AND user_id = ?)"
    );
    let exists: i64 = sqlx::query_scalar(QUERY)
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await?;
    Ok(exists != 0)
}

pub async fn replace_participants<C: Context>(
    ctx: &C,
    conversation_id: Uuid,
    participant_ids: &[Uuid],
) -> sqlx::Result<()> {
    const QUERY: &str = "DELETE FROM conversation_participants WHERE conversation_id = ?";
    let mut tx = ctx.db().begin().await?;
    sqlx::query(QUERY)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;
    insert_participants(&mut tx, conversation_id, participant_ids).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn delete<C: Context>(ctx: &C, conversation_id: Uuid) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE id = ?");
    let result = sqlx::query(QUERY)
        .bind(conversation_id)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}
