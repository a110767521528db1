use crate::common::error::AppError;
use crate::entities::messages::{Message as MessageEntity, UnreadMessage as UnreadMessageEntity};
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: Uuid,
    pub sender: Uuid,
    pub sender_email: String,
    pub conversation: Uuid,
    pub parent_message: Option<Uuid>,
    pub message_body: String,
    pub sent_at: DateTime<Utc>,
    pub edited: bool,
    pub read: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub edited_by: Option<Uuid>,
}

impl Message {
    /// Only recipients may mark a message read; the flag is shared by all of them.
    pub fn ensure_recipient(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.sender == user_id {
            return Err(AppError::MessagesOwnMessage);
        }
        Ok(())
    }
}

impl From<MessageEntity> for Message {
    fn from(value: MessageEntity) -> Self {
        Self {
            message_id: value.id,
            sender: value.sender_id,
            sender_email: value.sender_email,
            conversation: value.conversation_id,
            parent_message: value.parent_message_id,
            message_body: value.content,
            sent_at: value.sent_at,
            edited: value.edited,
            read: value.is_read,
            edited_at: value.edited_at,
            edited_by: value.edited_by,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UnreadMessage {
    pub message_id: Uuid,
    pub sender: Uuid,
    pub message_body: String,
    pub sent_at: DateTime<Utc>,
}

impl From<UnreadMessageEntity> for UnreadMessage {
    fn from(value: UnreadMessageEntity) -> Self {
        Self {
            message_id: value.id,
            sender: value.sender_id,
            message_body: value.content,
            sent_at: value.sent_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThreadNode {
    pub message: Message,
    pub replies: Vec<ThreadNode>,
}

/// Arranges `messages` into the reply tree below `root`.
/// Replies keep the order they have in `messages`; messages outside the tree are ignored.
pub fn build_thread(root: Message, messages: Vec<Message>) -> ThreadNode {
    let mut replies_by_parent: HashMap<Uuid, Vec<Message>> = HashMap::new();
    for message in messages {
        if let Some(parent_id) = message.parent_message {
            replies_by_parent.entry(parent_id).or_default().push(message);
        }
    }
    attach_replies(root, &mut replies_by_parent)
}

fn attach_replies(message: Message, replies_by_parent: &mut HashMap<Uuid, Vec<Message>>) -> ThreadNode {
    let replies = replies_by_parent
        .remove(&message.message_id)
        .unwrap_or_default()
        .into_iter()
        .map(|reply| attach_replies(reply, replies_by_parent))
        .collect();
    ThreadNode { message, replies }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InboxEntry {
    pub message: Message,
    pub replies: Vec<Message>,
}

/// Groups direct replies under the messages they answer, keeping `sent` order.
pub fn build_inbox(sent: Vec<Message>, replies: Vec<Message>) -> Vec<InboxEntry> {
    let mut replies_by_parent: HashMap<Uuid, Vec<Message>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_message {
            replies_by_parent.entry(parent_id).or_default().push(reply);
        }
    }
    sent.into_iter()
        .map(|message| {
            let replies = replies_by_parent
                .remove(&message.message_id)
                .unwrap_or_default();
            InboxEntry { message, replies }
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageFilter {
    /// Case-insensitive substring of the sender's email.
    pub user: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl MessageFilter {
    pub fn validate(&self) -> Result<(), AppError> {
        match (self.start_date, self.end_date) {
            (Some(start_date), Some(end_date)) if start_date > end_date => {
                Err(AppError::MessagesInvalidFilter)
            }
            _ => Ok(()),
        }
    }

    pub fn sender_email_pattern(&self) -> Option<String> {
        self.user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(like_pattern)
    }
}

/// Builds a `LIKE` pattern matching `value` anywhere, lowercased and with wildcards escaped.
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageArgs {
    pub message_body: String,
    pub parent_message: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageInConversationArgs {
    pub conversation: Uuid,
    pub message_body: String,
    pub parent_message: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMessageArgs {
    pub message_body: String,
}

pub fn validate_message_body(body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::MessagesEmpty);
    }
    if body.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::MessagesTooLong);
    }
    Ok(())
}
