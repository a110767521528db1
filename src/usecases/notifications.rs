use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::notifications::{Notification, NotificationFilter};
use crate::repositories::notifications;
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: Uuid,
    filter: &NotificationFilter,
) -> ServiceResult<Vec<Notification>> {
    let notifications = notifications::fetch_for_user(ctx, user_id, filter.unread).await?;
    Ok(notifications.into_iter().map(Notification::from).collect())
}

/// Other users' notifications are reported as missing.
pub async fn mark_read<C: Context>(
    ctx: &C,
    notification_id: Uuid,
    user_id: Uuid,
) -> ServiceResult<Notification> {
    let notification = match notifications::fetch_one(ctx, notification_id).await {
        Ok(notification) if notification.user_id == user_id => notification,
        Ok(_) | Err(sqlx::Error::RowNotFound) => return Err(AppError::NotificationsNotFound),
        Err(e) => return unexpected(e),
    };
    notifications::mark_read(ctx, notification_id, user_id).await?;
    let mut notification = Notification::from(notification);
    notification.is_read = true;
    Ok(notification)
}

/// Deletes read notifications older than `max_age`.
pub async fn delete_read_older_than<C: Context>(ctx: &C, max_age: TimeDelta) -> ServiceResult<u64> {
    let before = Utc::now() - max_age;
    match notifications::delete_read_before(ctx, before).await {
        Ok(deleted) => Ok(deleted),
        Err(e) => unexpected(e),
    }
}
