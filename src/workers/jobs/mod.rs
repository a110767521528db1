pub mod migrate;
pub mod seed;
pub mod user_report;

use crate::common::db::DatabaseConnection;
use crate::common::retry::retry_on_failure;
use crate::settings::AppSettings;
use std::time::Duration;

const CONNECT_RETRIES: u32 = 3;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Opens the job's own connection, retrying while the database comes up.
pub async fn connect(settings: &AppSettings) -> sqlx::Result<DatabaseConnection> {
    retry_on_failure(CONNECT_RETRIES, CONNECT_RETRY_DELAY, || {
        DatabaseConnection::open(&settings.database_url)
    })
    .await
}
