use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    pub iat: usize,  // Issued at
}

/// Validates bearer tokens minted by the external identity service.
/// The HS256 secret is shared with that service via configuration.
pub struct UserAuthService {
    jwt_secret: String,
}

impl UserAuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Verify a JWT token and return its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Mint a token for a user id.
    ///
    /// Production tokens come from the identity service; this is used by
    /// integration tooling and tests, which share the same secret.
    pub fn issue_token(&self, user_id: i64, ttl_hours: i64) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(ttl_hours))
            .context("token expiry out of range")?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .context("Failed to generate token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let auth = UserAuthService::new("unit-test-secret".to_string());
        let token = auth.issue_token(42, 1).expect("should issue token");

        let claims = auth.verify_token(&token).expect("should verify token");
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = UserAuthService::new("secret-a".to_string());
        let verifier = UserAuthService::new("secret-b".to_string());

        let token = issuer.issue_token(42, 1).unwrap();
        assert!(verifier.verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = UserAuthService::new("unit-test-secret".to_string());
        // Negative TTL produces an already-expired token
        let token = auth.issue_token(42, -2).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let auth = UserAuthService::new("unit-test-secret".to_string());
        assert!(auth.verify_token("not.a.jwt").is_err());
        assert!(auth.verify_token("").is_err());
    }
}
