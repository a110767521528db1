use crate::common::context::Context;
use crate::entities::notifications::Notification;
use uuid::Uuid;

const TABLE_NAME: &str = "notifications";
const READ_FIELDS: &str = "id, user_id, message_id, is_read, created_at";

pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
    unread_only: bool,
) -> sqlx::Result<Vec<Notification>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE user_id = ? AND (? IS FALSE OR is_read IS FALSE) ORDER BY created_at DESC"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .bind(unread_only)
        .fetch_all(ctx.db())
        .await
}

pub async fn fetch_one<C: Context>(ctx: &C, notification_id: Uuid) -> sqlx::Result<Notification> {
    const QUERY: &str =
        const_str::concat!("SELECT ", READ_FIELDS, " FROM ", TABLE_NAME, " WHERE id = ?");
    sqlx::query_as(QUERY)
        .bind(notification_id)
        .fetch_one(ctx.db())
        .await
}

/// Scoped to the owner, so foreign ids affect nothing.
pub async fn mark_read<C: Context>(
    ctx: &C,
    notification_id: Uuid,
    user_id: Uuid,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "UPDATE ",
        TABLE_NAME,
        " SET is_read = TRUE WHERE id = ? AND user_id = ?"
    );
    let result = sqlx::query(QUERY)
        .bind(notification_id)
        .bind(user_id)
        .execute(ctx.db())
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_read_before<C: Context>(
    ctx: &C,
    before: chrono::DateTime<chrono::Utc>,
) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!(
        "DELETE FROM ",
        TABLE_NAME,
        " WHERE is_read IS TRUE AND created_at < ?"
    );
    let result = sqlx::query(QUERY).bind(before).execute(ctx.db()).await?;
    Ok(result.rows_affected())
}
