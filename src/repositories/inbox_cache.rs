use crate::common::context::Context;
use crate::common::redis_json::Json;
use crate::models::messages::InboxEntry;
use redis::AsyncCommands;
use std::time::Duration;
use uuid::Uuid;

fn make_key(user_id: Uuid) -> String {
    format!("messaging:inbox:{user_id}")
}

pub async fn fetch<C: Context>(ctx: &C, user_id: Uuid) -> anyhow::Result<Option<Vec<InboxEntry>>> {
    let mut redis = ctx.redis().await?;
    let inbox: Option<Json<Vec<InboxEntry>>> = redis.get(make_key(user_id)).await?;
    Ok(inbox.map(Json::into_inner))
}

pub async fn store<C: Context>(
    ctx: &C,
    user_id: Uuid,
    inbox: &[InboxEntry],
    ttl: Duration,
) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let _: () = redis
        .set_ex(make_key(user_id), Json(inbox), ttl.as_secs().max(1))
        .await?;
    Ok(())
}

pub async fn invalidate<C: Context>(ctx: &C, user_id: Uuid) -> anyhow::Result<()> {
    let mut redis = ctx.redis().await?;
    let _: () = redis.del(make_key(user_id)).await?;
    Ok(())
}
