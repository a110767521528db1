pub mod access_window;
pub mod authentication;
pub mod rate_limit;
pub mod request_log;
pub mod role_permission;
