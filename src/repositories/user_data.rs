use crate::common::db::log_query;
use crate::entities::user_data::UserData;
use futures::stream::BoxStream;
use rust_decimal::Decimal;
use sqlx::MySqlConnection;

const TABLE_NAME: &str = "user_data";
const READ_FIELDS: &str = "user_id, name, email, age";

pub async fn create_table(conn: &mut MySqlConnection) -> sqlx::Result<()> {
    const QUERY: &str = const_str::concat!(
        "CREATE TABLE IF NOT EXISTS ",
        TABLE_NAME,
        " (",
        "user_id VARCHAR(36) NOT NULL PRIMARY KEY, ",
        "name VARCHAR(255) NOT NULL, ",
        "email VARCHAR(255) NOT NULL, ",
        "age DECIMAL(5, 0) NOT NULL, ",
        "INDEX idx_user_data_user_id (user_id))"
    );
    sqlx::query(log_query(QUERY)).execute(conn).await?;
    Ok(())
}

/// Returns whether the row was new. Existing `user_id`s are left untouched.
pub async fn insert_ignore(conn: &mut MySqlConnection, user: &UserData) -> sqlx::Result<bool> {
    const QUERY: &str = const_str::concat!(
        "INSERT IGNORE INTO ",
        TABLE_NAME,
        " (",
        READ_FIELDS,
        ") VALUES (?, ?, ?, ?)"
    );
    let result = sqlx::query(log_query(QUERY))
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub fn stream_all(conn: &mut MySqlConnection) -> BoxStream<'_, sqlx::Result<UserData>> {
    const QUERY: &str = const_str::concat!("SELECT ", READ_FIELDS, " FROM ", TABLE_NAME);
    sqlx::query_as(log_query(QUERY)).fetch(conn)
}

pub async fn fetch_page(
    conn: &mut MySqlConnection,
    page_size: u64,
    offset: u64,
) -> sqlx::Result<Vec<UserData>> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " ORDER BY user_id LIMIT ? OFFSET ?"
    );
    sqlx::query_as(log_query(QUERY))
        .bind(page_size)
        .bind(offset)
        .fetch_all(conn)
        .await
}

pub fn stream_ages(conn: &mut MySqlConnection) -> BoxStream<'_, sqlx::Result<Decimal>> {
    const QUERY: &str = const_str::concat!("SELECT age FROM ", TABLE_NAME);
    sqlx::query_scalar(log_query(QUERY)).fetch(conn)
}
