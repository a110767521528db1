use crate::common::context::Context;
use crate::common::redis_json::Json;
use crate::entities::sessions::{CreateSessionArgs, Session};
use redis::AsyncCommands;
use std::ops::DerefMut;
use uuid::Uuid;

const SESSIONS_KEY: &str = "messaging:sessions";

fn make_id_key(user_id: Uuid) -> String {
    format!("messaging:sessions:user_ids:{user_id}")
}

pub async fn create<C: Context>(ctx: &C, args: CreateSessionArgs) -> anyhow::Result<Session> {
    let mut redis = ctx.redis().await?;
    let now = chrono::Utc::now();
    let session = Session {
        session_id: Uuid::new_v4(),
        user_id: args.user_id,
        email: args.email,
        role: args.role,
        create_ip_address: args.ip_address,
        created_at: now,
        updated_at: now,
    };
    let user_id_key = make_id_key(args.user_id);
    redis::pipe()
        .atomic()
        .hset(SESSIONS_KEY, session.session_id, Json(&session))
        .ignore()
        .sadd(user_id_key, session.session_id)
        .ignore()
        .exec_async(redis.deref_mut())
        .await?;
    Ok(session)
}

pub async fn fetch_one<C: Context>(ctx: &C, session_id: Uuid) -> anyhow::Result<Option<Session>> {
    let mut redis = ctx.redis().await?;
    let session: Option<Json<Session>> = redis.hget(SESSIONS_KEY, session_id).await?;
    Ok(session.map(Json::into_inner))
}

pub async fn fetch_all<C: Context>(ctx: &C) -> anyhow::Result<impl Iterator<Item = Session>> {
    let mut redis = ctx.redis().await?;
    let sessions: Vec<Json<Session>> = redis.hvals(SESSIONS_KEY).await?;
    Ok(sessions.into_iter().map(Json::into_inner))
}

pub async fn extend<C: Context>(ctx: &C, mut session: Session) -> anyhow::Result<Session> {
    session.updated_at = chrono::Utc::now();
    update(ctx, session).await
}

pub async fn update<C: Context>(ctx: &C, session: Session) -> anyhow::Result<Session> {
    let mut redis = ctx.redis().await?;
    let _: () = redis
        .hset(SESSIONS_KEY, session.session_id, Json(&session))
        .await?;
    Ok(session)
}

/// Returns how many sessions the user still has open.
pub async fn delete<C: Context>(ctx: &C, session_id: Uuid, user_id: Uuid) -> anyhow::Result<u64> {
    let mut redis = ctx.redis().await?;
    let user_id_key = make_id_key(user_id);
    let size: [u64; 1] = redis::pipe()
        .atomic()
        .hdel(SESSIONS_KEY, session_id)
        .ignore()
        .srem(&user_id_key, session_id)
        .ignore()
        .scard(user_id_key)
        .query_async(redis.deref_mut())
        .await?;
    Ok(size[0])
}

pub async fn delete_all_for_user<C: Context>(ctx: &C, user_id: Uuid) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let user_id_key = make_id_key(user_id);
    let session_ids: Vec<Uuid> = redis.smembers(&user_id_key).await?;
    let mut pipe = redis::pipe();
    pipe.atomic();
    if !session_ids.is_empty() {
        pipe.hdel(SESSIONS_KEY, &session_ids).ignore();
    }
    pipe.del(user_id_key).ignore();
    pipe.exec_async(redis.deref_mut()).await?;
    Ok(())
}
