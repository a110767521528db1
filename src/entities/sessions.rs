use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub create_ip_address: IpAddr,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct CreateSessionArgs {
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub ip_address: IpAddr,
}
