pub mod conversations;
pub mod message_history;
pub mod messages;
pub mod notifications;
pub mod pagination;
pub mod sessions;
pub mod users;
