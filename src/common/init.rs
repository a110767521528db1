use crate::api::middleware::access_window::AccessWindow;
use crate::api::middleware::rate_limit::RateLimiter;
use crate::api::middleware::request_log::REQUEST_LOG_TARGET;
use crate::common::redis_pool::{RedisPool, RedisPoolManager};
use crate::common::state::AppState;
use crate::settings::AppSettings;
use deadpool::Runtime;
use redis::{AsyncConnectionConfig, Commands};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;

pub fn initialize_logging(settings: &AppSettings) -> anyhow::Result<()> {
    let request_log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.request_log_path)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .with_filter(LevelFilter::from_level(settings.level));

    // request log lines are written verbatim, one per request
    let request_log_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(request_log))
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(REQUEST_LOG_TARGET, Level::INFO));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(request_log_layer)
        .init();
    Ok(())
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    let redis = initialize_redis(settings)?;
    let rate_limiter = Arc::new(RateLimiter::new(
        settings.rate_limit_window,
        settings.rate_limit_max_messages,
    ));
    let access_window = AccessWindow {
        enabled: settings.access_window_enabled,
        start_hour: settings.access_window_start_hour,
        end_hour: settings.access_window_end_hour,
    };
    Ok(AppState {
        db,
        redis,
        rate_limiter,
        access_window,
        session_timeout: settings.session_timeout,
        inbox_cache_ttl: settings.inbox_cache_ttl,
    })
}

pub fn initialize_db(settings: &AppSettings) -> impl Future<Output = sqlx::Result<Pool<MySql>>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_wait_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url)
}

pub fn initialize_redis(settings: &AppSettings) -> anyhow::Result<RedisPool> {
    let redis_client = redis::Client::open(settings.redis_url.as_str())?;
    let mut conn = redis_client.get_connection_with_timeout(settings.redis_wait_timeout)?;
    let _: () = conn.ping()?;
    let redis_cfg = AsyncConnectionConfig::new()
        .set_connection_timeout(settings.redis_connection_timeout)
        .set_response_timeout(settings.redis_response_timeout);

    let redis_manager = RedisPoolManager::new(redis_client, redis_cfg);
    let redis = RedisPool::builder(redis_manager)
        .max_size(settings.redis_max_connections)
        .wait_timeout(Some(settings.redis_wait_timeout))
        .runtime(Runtime::Tokio1)
        .build()?;
    Ok(redis)
}
