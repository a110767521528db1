use crate::settings::AppSettings;
use crate::usecases::user_data::{self, AGE_THRESHOLD};
use crate::workers::jobs;
use futures::TryStreamExt;
use sqlx::MySqlConnection;
use std::pin::pin;
use tracing::info;

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let mut conn = jobs::connect(settings).await?;
    let reported = report(&mut conn, settings.user_data_batch_size).await;
    conn.close().await?;
    reported
}

async fn report(conn: &mut MySqlConnection, batch_size: usize) -> anyhow::Result<()> {
    {
        let mut users = pin!(user_data::batch_processing(conn, batch_size));
        let mut selected = 0;
        while let Some(user) = users.try_next().await? {
            info!(
                user_id = %user.user_id,
                name = %user.name,
                email = %user.email,
                age = %user.age,
                "User over {AGE_THRESHOLD}"
            );
            selected += 1;
        }
        info!(selected, batch_size, "Finished batch processing");
    }

    {
        let mut pages = pin!(user_data::lazy_paginate(conn, batch_size as u64));
        let mut page_count = 0;
        let mut row_count = 0;
        while let Some(page) = pages.try_next().await? {
            page_count += 1;
            row_count += page.len();
        }
        info!(page_count, row_count, "Paginated user_data");
    }

    match user_data::average_age(conn).await? {
        Some(average_age) => info!("Average age of users: {:.2}", average_age),
        None => info!("No users to average"),
    }
    Ok(())
}
