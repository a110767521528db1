pub mod cleanup_notifications;
pub mod cleanup_sessions;
