/// JWT Claims structure
///
/// The payload of an access token: who it was issued to, who issued it,
/// and when it stops being valid (RFC 7519 registered claims only).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (authenticated username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    /// Create claims for `subject` that expire `ttl` after `issued_at`
    pub fn new(subject: &str, issuer: &str, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.to_string(),
            exp: (issued_at + ttl).timestamp(),
            iss: issuer.to_string(),
        }
    }

    /// A token is expired once its expiry is no longer strictly in the future
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = Claims::new("admin", "test", now, Duration::minutes(30));

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.exp, now.timestamp() + 30 * 60);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::new("admin", "test", now, Duration::minutes(30));

        assert!(!claims.is_expired_at(now + Duration::minutes(29)));
        assert!(claims.is_expired_at(now + Duration::minutes(30)));
        assert!(claims.is_expired_at(now + Duration::minutes(31)));
    }

    #[test]
    fn test_serialized_claim_names() {
        let claims = Claims::new("admin", "kong-issuer", Utc::now(), Duration::minutes(30));
        let value = serde_json::to_value(&claims).expect("Failed to serialize claims");

        assert_eq!(value["sub"], "admin");
        assert_eq!(value["iss"], "kong-issuer");
        assert!(value["exp"].is_i64());
    }
}
