use crate::api::{PathArgs, QueryArgs, RequestContext};
use crate::api::middleware::authentication::CurrentSession;
use crate::common::error::ServiceResponse;
use crate::models::notifications::{Notification, NotificationFilter};
use crate::usecases::notifications;
use axum::Json;
use uuid::Uuid;

pub async fn list(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    QueryArgs(filter): QueryArgs<NotificationFilter>,
) -> ServiceResponse<Vec<Notification>> {
    let notifications = notifications::fetch_for_user(&ctx, session.user_id, &filter).await?;
    Ok(Json(notifications))
}

pub async fn mark_read(
    ctx: RequestContext,
    CurrentSession(session): CurrentSession,
    PathArgs(notification_id): PathArgs<Uuid>,
) -> ServiceResponse<Notification> {
    let notification = notifications::mark_read(&ctx, notification_id, session.user_id).await?;
    Ok(Json(notification))
}
