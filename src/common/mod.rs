pub mod axum_ip;
pub mod context;
pub mod db;
pub mod env;
pub mod error;
pub mod init;
pub mod memoize;
pub mod nested;
pub mod redis_json;
pub mod redis_pool;
pub mod retry;
pub mod state;

#[cfg(test)]
pub mod testing;
