use crate::common::redis_pool::PoolResult;
use crate::common::state::AppState;
use async_trait::async_trait;
use sqlx::{MySql, Pool};

#[async_trait]
pub trait Context: Sync + Send {
    fn db(&self) -> &Pool<MySql>;
    async fn redis(&self) -> PoolResult;
}

#[async_trait]
impl Context for AppState {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    async fn redis(&self) -> PoolResult {
        self.redis.get().await
    }
}
