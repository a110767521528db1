use crate::common::context::Context;
use crate::entities::users::{CreateUserArgs, User};
use sqlx::{MySql, QueryBuilder};
use uuid::Uuid;

const TABLE_NAME: &str = "users";
const READ_FIELDS: &str =
    "id, email, first_name, last_name, phone_number, role, password_hash, created_at";

pub async fn fetch_one<C: Context>(ctx: &C, user_id: Uuid) -> sqlx::Result<User> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE id = ?"
    );
    sqlx::query_as(QUERY)
        .bind(user_id)
        .fetch_one(ctx.db())
        .await
}

pub async fn fetch_one_by_email<C: Context>(ctx: &C, email: &str) -> sqlx::Result<User> {
    const QUERY: &str = const_str::concat!(
        "SELECT ",
        READ_FIELDS,
        " FROM ",
        TABLE_NAME,
        " WHERE email = ?"
    );
    sqlx::query_as(QUERY)
        .bind(email)
        .fetch_one(ctx.db())
        .await
}

pub async fn create<C: Context>(ctx: &C, args: CreateUserArgs<'_>) -> sqlx::Result<Uuid> {
    const QUERY: &str = const_str::concat!(
        "INSERT INTO ",
        TABLE_NAME,
        " (id, email, first_name, last_name, phone_number, role, password_hash) ",
        "VALUES (?, ?, ?, ?, ?, ?, ?)"
    );
    let user_id = Uuid::new_v4();
    sqlx::query(QUERY)
        .bind(user_id)
        .bind(args.email)
        .bind(args.first_name)
        .bind(args.last_name)
        .bind(args.phone_number)
        .bind(args.role)
        .bind(args.password_hash)
        .execute(ctx.db())
        .await?;
    Ok(user_id)
}

/// Counts how many of `user_ids` exist.
pub async fn count_existing<C: Context>(ctx: &C, user_ids: &[Uuid]) -> sqlx::Result<usize> {
    if user_ids.is_empty() {
        return Ok(0);
    }
    let mut query = QueryBuilder::<MySql>::new("SELECT COUNT(*) FROM users WHERE id IN (");
    let mut separated = query.separated(", ");
    for user_id in user_ids {
        separated.push_bind(*user_id);
    }
    separated.push_unseparated(")");
    let count: i64 = query.build_query_scalar().fetch_one(ctx.db()).await?;
    Ok(count as usize)
}

/// Deletes the user. Messages, participations, notifications and history
/// go with it through the foreign keys.
pub async fn delete<C: Context>(ctx: &C, user_id: Uuid) -> sqlx::Result<u64> {
    const QUERY: &str = const_str::concat!("DELETE FROM ", TABLE_NAME, " WHERE id = ?");
    let result = sqlx::query(QUERY).bind(user_id).execute(ctx.db()).await?;
    Ok(result.rows_affected())
}
