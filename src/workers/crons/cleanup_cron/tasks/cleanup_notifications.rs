use crate::common::error::ServiceResult;
use crate::common::state::AppState;
use crate::usecases::notifications;
use chrono::TimeDelta;

const READ_NOTIFICATION_RETENTION_DAYS: i64 = 30;

/// Prunes notifications that were read more than a retention period ago.
pub async fn cleanup_notifications(ctx: &AppState) -> ServiceResult<u64> {
    let max_age = TimeDelta::days(READ_NOTIFICATION_RETENTION_DAYS);
    notifications::delete_read_older_than(ctx, max_age).await
}
