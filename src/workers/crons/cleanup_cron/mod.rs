pub mod tasks;

use crate::common::init;
use crate::cron_tasks;
use crate::settings::AppSettings;
use tasks::cleanup_notifications::cleanup_notifications;
use tasks::cleanup_sessions::cleanup_sessions;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let ctx = init::initialize_state(settings).await?;
    let failed_tasks = cron_tasks! {
        &ctx,
        cleanup_sessions,
        cleanup_notifications,
    };
    if !failed_tasks.is_empty() {
        anyhow::bail!("cleanup tasks failed: {}", failed_tasks.join(", "));
    }
    Ok(())
}
