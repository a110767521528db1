use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: String,
    pub conversation_id: Uuid,
    pub parent_message_id: Option<Uuid>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub edited: bool,
    pub is_read: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub edited_by: Option<Uuid>,
}

/// The narrow projection used for the unread listing.
#[derive(Debug, FromRow)]
pub struct UnreadMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

pub struct CreateMessageArgs<'a> {
    pub sender_id: Uuid,
    pub conversation_id: Uuid,
    pub parent_message_id: Option<Uuid>,
    pub content: &'a str,
}

pub struct MessageFilterArgs<'a> {
    pub sender_email_pattern: Option<&'a str>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: u64,
    pub offset: u64,
}
