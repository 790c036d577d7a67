use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct DownloadClaims {
    path: String,
    exp: i64,
    iat: i64,
}

/// Issues and checks short-lived download links for stored objects.
pub struct UrlSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    base_url: String,
    ttl_secs: u64,
}

impl UrlSigner {
    pub fn new(secret: &str, base_url: &str, ttl_secs: u64) -> Self {
        // Domain-separate download links from session tokens.
        let secret = format!("download:{}", secret);
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            base_url: base_url.trim_end_matches('/').to_string(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn sign(&self, path: &str) -> Result<String> {
        self.sign_with_ttl(path, Duration::seconds(self.ttl_secs as i64))
    }

    fn sign_with_ttl(&self, path: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = DownloadClaims {
            path: path.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign URL: {}", e)))?;

        Ok(format!("{}/api/download?token={}", self.base_url, token))
    }

    /// Returns the object path a token grants access to.
    pub fn verify(&self, token: &str) -> Result<String> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<DownloadClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.path)
            .map_err(|_| AppError::Auth("Invalid or expired download link".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(url: &str) -> &str {
        url.split("token=").nth(1).unwrap()
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = UrlSigner::new("secret", "http://localhost:3000/", 60);
        let url = signer.sign("u1/a.txt").unwrap();

        assert!(url.starts_with("http://localhost:3000/api/download?token="));
        assert_eq!(signer.verify(token_of(&url)).unwrap(), "u1/a.txt");
    }

    #[test]
    fn test_expired_link_is_rejected() {
        let signer = UrlSigner::new("secret", "http://localhost:3000", 60);
        let url = signer.sign_with_ttl("u1/a.txt", Duration::hours(-1)).unwrap();
        assert!(matches!(signer.verify(token_of(&url)), Err(AppError::Auth(_))));
    }

    #[test]
    fn test_session_secret_cannot_forge_links() {
        let signer = UrlSigner::new("secret", "http://localhost:3000", 60);
        let session = crate::auth::JwtService::new("secret", None)
            .issue_session_token("u1", Duration::hours(1))
            .unwrap();
        assert!(signer.verify(&session).is_err());
    }
}
