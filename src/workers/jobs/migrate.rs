use crate::common::init;
use crate::settings::AppSettings;
use tracing::info;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let db = init::initialize_db(settings).await?;
    sqlx::migrate!("./migrations").run(&db).await?;
    info!("Migrations applied");
    db.close().await;
    Ok(())
}
