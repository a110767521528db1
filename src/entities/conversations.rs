use crate::entities::users::User;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
pub struct Participant {
    pub conversation_id: Uuid,
    #[sqlx(flatten)]
    pub user: User,
}
