use crate::entities::message_history::MessageHistory as MessageHistoryEntity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct MessageHistory {
    pub history_id: Uuid,
    pub message: Uuid,
    pub old_content: String,
    pub edited_by: Option<Uuid>,
    pub edited_at: DateTime<Utc>,
}

impl From<MessageHistoryEntity> for MessageHistory {
    fn from(value: MessageHistoryEntity) -> Self {
        Self {
            history_id: value.id,
            message: value.message_id,
            old_content: value.old_content,
            edited_by: value.edited_by,
            edited_at: value.edited_at,
        }
    }
}
