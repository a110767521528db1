use crate::common::context::Context;
use crate::entities::message_history::MessageHistory;
use uuid::Uuid;

const READ_FIELDS: &str = "id, message_id, old_content, edited_by, edited_at";

/// Newest edit first.
pub async fn fetch_by_message<C: Context>(
    ctx: &C,
    message_id: Uuid,
) -> sqlx::Result<Vec<MessageHistory>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM message_history WHERE message_id = ? ORDER BY edited_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(message_id)
        .fetch_all(ctx.db())
        .await
}
