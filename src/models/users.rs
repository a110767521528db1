use crate::common::error::AppError;
use crate::entities::users::User as UserEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Host,
    Moderator,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Host => "host",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Roles allowed to write to the restricted collection endpoints.
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "guest" => Ok(Role::Guest),
            "host" => Ok(Role::Host),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(AppError::UsersInvalidRole),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
}

impl TryFrom<UserEntity> for User {
    type Error = AppError;

    fn try_from(value: UserEntity) -> Result<Self, Self::Error> {
        let role = Role::from_str(&value.role)
            .map_err(|_| AppError::InternalServerError("invalid role value"))?;
        let full_name = format!("{} {}", value.first_name, value.last_name);
        Ok(Self {
            role,
            full_name,
            user_id: value.id,
            email: value.email,
            first_name: value.first_name,
            last_name: value.last_name,
            phone_number: value.phone_number,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterArgs {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl RegisterArgs {
    pub fn validate(&self) -> Result<(), AppError> {
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(AppError::UsersInvalidEmail),
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::UsersInvalidName);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::UsersPasswordTooShort);
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct DeleteAccountResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn register_args(email: &str, password: &str, first_name: &str) -> RegisterArgs {
        RegisterArgs {
            email: email.to_string(),
            password: password.to_string(),
            first_name: first_name.to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: None,
            role: Role::default(),
        }
    }

    #[rstest]
    #[case("guest", Role::Guest)]
    #[case("host", Role::Host)]
    #[case("moderator", Role::Moderator)]
    #[case("admin", Role::Admin)]
    fn parses_roles(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(Role::from_str(raw).unwrap(), expected);
        assert_eq!(expected.as_str(), raw);
    }

    #[test]
    fn only_admins_and_moderators_are_privileged() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Moderator.is_privileged());
        assert!(!Role::Host.is_privileged());
        assert!(!Role::Guest.is_privileged());
    }

    #[test]
    fn role_defaults_to_guest_when_omitted() {
        let args: RegisterArgs = serde_json::from_str(
            r#"{"email":"ada@example.com","password":"hunter2hunter2","first_name":"Ada","last_name":"Lovelace"}"#,
        )
        .unwrap();
        assert_eq!(args.role, Role::Guest);
    }

    #[rstest]
    #[case(register_args("ada@example.com", "correct horse", "Ada"), None)]
    #[case(register_args("ada.example.com", "correct horse", "Ada"), Some("users.invalid_email"))]
    #[case(register_args("@example.com", "correct horse", "Ada"), Some("users.invalid_email"))]
    #[case(register_args("ada@example.com", "short", "Ada"), Some("users.password_too_short"))]
    #[case(register_args("ada@example.com", "correct horse", "  "), Some("users.invalid_name"))]
    fn validates_registrations(#[case] args: RegisterArgs, #[case] expected: Option<&str>) {
        let result = args.validate().err().map(|e| e.code());
        assert_eq!(result, expected);
    }

    #[test]
    fn builds_full_name_from_entity() {
        let entity = UserEntity {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: None,
            role: "host".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        let user = User::try_from(entity).unwrap();
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.role, Role::Host);
    }
}
