use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

/// Session claims issued by the identity provider. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
}

impl JwtService {
    pub fn new(secret: &str, issuer: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            issuer,
        }
    }

    /// Mints a session token the way the identity provider does. Used by
    /// local tooling and tests.
    pub fn issue_session_token(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Auth(format!("Failed to generate session token: {}", e)))
    }

    pub fn verify_session_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected session token: {}", e);
            AppError::Auth("Unauthorized".to_string())
        })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::Auth("Unauthorized".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_round_trip() {
        let jwt_service = JwtService::new("test-secret", None);
        let token = jwt_service
            .issue_session_token("user_2abc", Duration::hours(1))
            .unwrap();

        let claims = jwt_service.verify_session_token(&token).unwrap();
        assert_eq!(claims.sub, "user_2abc");
        assert!(claims.iss.is_none());
    }

    #[test]
    fn test_rejects_wrong_secret_and_expired_tokens() {
        let issuer = JwtService::new("secret-a", None);
        let verifier = JwtService::new("secret-b", None);
        let token = issuer.issue_session_token("u1", Duration::hours(1)).unwrap();
        assert!(matches!(
            verifier.verify_session_token(&token),
            Err(AppError::Auth(_))
        ));

        let expired = issuer.issue_session_token("u1", Duration::hours(-2)).unwrap();
        assert!(issuer.verify_session_token(&expired).is_err());
    }

    #[test]
    fn test_issuer_is_enforced_when_configured() {
        let provider = JwtService::new("secret", Some("https://id.example.com".to_string()));
        let other = JwtService::new("secret", Some("https://evil.example.com".to_string()));

        let token = other.issue_session_token("u1", Duration::hours(1)).unwrap();
        assert!(provider.verify_session_token(&token).is_err());

        let token = provider.issue_session_token("u1", Duration::hours(1)).unwrap();
        assert_eq!(provider.verify_session_token(&token).unwrap().sub, "u1");
    }

    #[test]
    fn test_rejects_blank_subject() {
        let jwt_service = JwtService::new("test-secret", None);
        let token = jwt_service.issue_session_token("  ", Duration::hours(1)).unwrap();
        assert!(jwt_service.verify_session_token(&token).is_err());
    }
}
