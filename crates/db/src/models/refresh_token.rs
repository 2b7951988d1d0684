//! Refresh token model and DTOs.

use chirpy_core::types::{Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `refresh_tokens` table.
///
/// The token value is the primary key and is stored as issued.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Timestamp,
    pub revoked_at: Option<Timestamp>,
}

impl RefreshToken {
    /// A token can be exchanged only while it is neither revoked nor expired.
    pub fn is_usable(&self, now: Timestamp) -> bool {
        self.revoked_at.is_none() && now < self.expires_at
    }
}

/// DTO for persisting a freshly generated refresh token.
pub struct CreateRefreshToken {
    pub token: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn token(expires_at: Timestamp, revoked_at: Option<Timestamp>) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            token: "ab".repeat(32),
            user_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at,
        }
    }

    #[test]
    fn test_fresh_token_is_usable() {
        let now = Utc::now();
        assert!(token(now + Duration::days(60), None).is_usable(now));
    }

    #[test]
    fn test_revoked_token_is_not_usable() {
        let now = Utc::now();
        let row = token(now + Duration::days(60), Some(now));
        assert!(!row.is_usable(now));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let row = token(now, None);
        assert!(!row.is_usable(now), "now == expires_at must not be usable");
        assert!(row.is_usable(now - Duration::seconds(1)));
    }
}
