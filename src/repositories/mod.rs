pub mod conversations;
pub mod inbox_cache;
pub mod message_history;
pub mod messages;
pub mod notifications;
pub mod sessions;
pub mod user_data;
pub mod users;
