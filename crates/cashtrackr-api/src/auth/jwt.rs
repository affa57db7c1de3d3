// Session token service
// Decision: HS256 with a shared secret, no refresh tokens
// Decision: Claims carry only the numeric user id; profile data is reloaded per request

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;

/// Claims of a session token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// User id
    pub id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and checks session tokens
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Sign a session token for `user_id`
    pub fn generate_session_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.lifetime)?;

        let claims = SessionClaims {
            id: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode session token")
    }

    /// Check signature and expiry, returning the claims
    pub fn validate_session_token(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .context("Invalid session token")?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            lifetime: StdDuration::from_secs(3600),
        }
    }

    #[test]
    fn test_generate_session_token() {
        let service = JwtService::new(test_config());
        let token = service.generate_session_token(7).unwrap();
        assert!(!token.is_empty());

        let claims = service.validate_session_token(&token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new(test_config());
        assert!(service.validate_session_token("invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let service = JwtService::new(test_config());
        let other = JwtService::new(JwtConfig {
            secret: "another-secret".to_string(),
            lifetime: StdDuration::from_secs(3600),
        });

        let token = other.generate_session_token(1).unwrap();
        assert!(service.validate_session_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(test_config());
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            id: 1,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-for-testing"),
        )
        .unwrap();

        assert!(service.validate_session_token(&token).is_err());
    }
}
