//! Data models for user accounts

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// User status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum UserStatus {
    Disabled = 0,
    Active = 1,
}

impl From<i16> for UserStatus {
    fn from(v: i16) -> Self {
        match v {
            0 => UserStatus::Disabled,
            _ => UserStatus::Active,
        }
    }
}

impl Serialize for UserStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i16(*self as i16)
    }
}

/// User account (read-side projection of the identity service)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "i16")]
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_status_from_i16() {
        assert_eq!(UserStatus::from(0), UserStatus::Disabled);
        assert_eq!(UserStatus::from(1), UserStatus::Active);
        assert_eq!(UserStatus::from(99), UserStatus::Active); // default to Active
    }

    #[test]
    fn test_user_is_active() {
        let user = User {
            user_id: 1,
            username: "test".to_string(),
            email: "test@example.com".to_string(),
            status: UserStatus::Active,
            created_at: Utc::now(),
        };
        assert!(user.is_active());
    }
}
