use crate::settings::AppSettings;
use crate::usecases::user_data;
use crate::workers::jobs;
use std::path::Path;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let mut conn = jobs::connect(settings).await?;
    let seeded = user_data::seed(&mut conn, Path::new(&settings.seed_csv_path)).await;
    conn.close().await?;
    seeded?;
    Ok(())
}
