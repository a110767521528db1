use crate::api::middleware::access_window::AccessWindow;
use crate::api::middleware::rate_limit::RateLimiter;
use crate::common::redis_pool::RedisPool;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<MySql>,
    pub redis: RedisPool,
    pub rate_limiter: Arc<RateLimiter>,
    pub access_window: AccessWindow,
    pub session_timeout: Duration,
    pub inbox_cache_ttl: Duration,
}
