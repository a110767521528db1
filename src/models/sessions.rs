use crate::entities::sessions::Session as SessionEntity;
use crate::models::users::{Role, User};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub create_ip_address: IpAddr,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, timeout: Duration) -> bool {
        let timeout = TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX);
        self.updated_at
            .checked_add_signed(timeout)
            .is_some_and(|expires_at| expires_at < Utc::now())
    }

    pub fn as_entity(&self) -> SessionEntity {
        self.clone().into()
    }
}

impl From<Session> for SessionEntity {
    fn from(value: Session) -> Self {
        SessionEntity {
            session_id: value.session_id,
            user_id: value.user_id,
            email: value.email,
            role: value.role.to_string(),
            create_ip_address: value.create_ip_address,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<SessionEntity> for Session {
    fn from(value: SessionEntity) -> Self {
        Self {
            session_id: value.session_id,
            user_id: value.user_id,
            email: value.email,
            // stored roles are validated on login, a stale one degrades to guest
            role: Role::from_str(&value.role).unwrap_or_default(),
            create_ip_address: value.create_ip_address,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct LoginArgs {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub user: User,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(updated_at: DateTime<Utc>) -> Session {
        Session {
            session_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            role: Role::Admin,
            create_ip_address: IpAddr::from([127, 0, 0, 1]),
            created_at: updated_at,
            updated_at,
        }
    }

    #[test]
    fn idle_sessions_expire() {
        let idle = session(Utc::now() - TimeDelta::minutes(61));
        assert!(idle.is_expired(Duration::from_secs(60 * 60)));
    }

    #[test]
    fn recent_sessions_are_alive() {
        let recent = session(Utc::now() - TimeDelta::minutes(5));
        assert!(!recent.is_expired(Duration::from_secs(60 * 60)));
    }

    #[test]
    fn unknown_stored_role_degrades_to_guest() {
        let mut entity = session(Utc::now()).as_entity();
        entity.role = "superuser".to_string();
        assert_eq!(Session::from(entity).role, Role::Guest);
    }
}
