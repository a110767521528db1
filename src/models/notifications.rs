use crate::entities::notifications::Notification as NotificationEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user: Uuid,
    pub message: Uuid,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<NotificationEntity> for Notification {
    fn from(value: NotificationEntity) -> Self {
        Self {
            notification_id: value.id,
            user: value.user_id,
            message: value.message_id,
            is_read: value.is_read,
            timestamp: value.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub unread: bool,
}
