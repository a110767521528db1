use messaging_service::api;
use messaging_service::common::init;
use messaging_service::settings::AppSettings;
use messaging_service::workers::{crons, jobs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings)?;
    match settings.app_component.as_str() {
        "api" => api::serve(settings).await,
        "cleanup-cron" => crons::cleanup_cron::serve(settings).await,
        "migrate" => jobs::migrate::serve(settings).await,
        "seed" => jobs::seed::serve(settings).await,
        "user-report" => jobs::user_report::serve(settings).await,
        component => anyhow::bail!("Unknown app component: {component}"),
    }
}
