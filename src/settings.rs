use crate::common::env::FromEnv;
use std::env;
use std::net::IpAddr;
use std::ops::Deref;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub app_component: String,
    pub level: Level,
    pub app_host: IpAddr,
    pub app_port: u16,
    pub request_log_path: String,

    pub database_url: String,
    pub db_max_connections: usize,
    pub db_wait_timeout: Duration,

    pub redis_url: String,
    pub redis_max_connections: usize,
    pub redis_connection_timeout: Duration,
    pub redis_response_timeout: Duration,
    pub redis_wait_timeout: Duration,

    pub access_window_enabled: bool,
    pub access_window_start_hour: u32,
    pub access_window_end_hour: u32,

    pub rate_limit_window: Duration,
    pub rate_limit_max_messages: usize,

    pub session_timeout: Duration,
    pub inbox_cache_ttl: Duration,

    pub seed_csv_path: String,
    pub user_data_batch_size: usize,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let app_component = env::var("APP_COMPONENT")?;
        let level = Level::from_env("LOG_LEVEL")?;
        let app_host = IpAddr::from_env("APP_HOST")?;
        let app_port = u16::from_env("APP_PORT")?;
        let request_log_path = String::from_env_or("REQUEST_LOG_PATH", "requests.log".into())?;

        let database_url = env::var("DATABASE_URL")?;
        let db_max_connections = usize::from_env("DB_MAX_CONNECTIONS")?;
        let db_wait_timeout_secs = u64::from_env("DB_WAIT_TIMEOUT_SECS")?;
        let db_wait_timeout = Duration::from_secs(db_wait_timeout_secs);

        let redis_url = env::var("REDIS_URL")?;
        let redis_max_connections = usize::from_env("REDIS_MAX_CONNECTIONS")?;
        let redis_connection_timeout_secs = u64::from_env("REDIS_CONNECTION_TIMEOUT_SECS")?;
        let redis_connection_timeout = Duration::from_secs(redis_connection_timeout_secs);
        let redis_response_timeout_secs = u64::from_env("REDIS_RESPONSE_TIMEOUT_SECS")?;
        let redis_response_timeout = Duration::from_secs(redis_response_timeout_secs);
        let redis_wait_timeout_secs = u64::from_env("REDIS_WAIT_TIMEOUT_SECS")?;
        let redis_wait_timeout = Duration::from_secs(redis_wait_timeout_secs);

        let access_window_enabled = bool::from_env_or("ACCESS_WINDOW_ENABLED", true)?;
        let access_window_start_hour = u32::from_env_or("ACCESS_WINDOW_START_HOUR", 18)?;
        let access_window_end_hour = u32::from_env_or("ACCESS_WINDOW_END_HOUR", 21)?;
        if access_window_start_hour > 23 || access_window_end_hour > 24 {
            anyhow::bail!("access window hours must lie within a day");
        }

        let rate_limit_window_secs = u64::from_env_or("RATE_LIMIT_WINDOW_SECS", 60)?;
        let rate_limit_window = Duration::from_secs(rate_limit_window_secs);
        let rate_limit_max_messages = usize::from_env_or("RATE_LIMIT_MAX_MESSAGES", 5)?;

        let session_timeout_secs = u64::from_env_or("SESSION_TIMEOUT_SECS", 60 * 60)?;
        let session_timeout = Duration::from_secs(session_timeout_secs);
        let inbox_cache_ttl_secs = u64::from_env_or("INBOX_CACHE_TTL_SECS", 60)?;
        let inbox_cache_ttl = Duration::from_secs(inbox_cache_ttl_secs);

        let seed_csv_path = String::from_env_or("SEED_CSV_PATH", "user_data.csv".into())?;
        let user_data_batch_size = usize::from_env_or("USER_DATA_BATCH_SIZE", 50)?;

        Ok(AppSettings {
            app_component,
            level,
            app_port,
            app_host,
            request_log_path,

            database_url,
            db_max_connections,
            db_wait_timeout,

            redis_url,
            redis_max_connections,
            redis_connection_timeout,
            redis_response_timeout,
            redis_wait_timeout,

            access_window_enabled,
            access_window_start_hour,
            access_window_end_hour,

            rate_limit_window,
            rate_limit_max_messages,

            session_timeout,
            inbox_cache_ttl,

            seed_csv_path,
            user_data_batch_size,
        })
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
