use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, JWT_SECRET_ENV};

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Why a presented token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    #[error("authorization header is not a bearer token")]
    UnsupportedScheme,

    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

/// Signing and verification keys for HS256 bearer tokens.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], lifetime_days: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            lifetime: Duration::days(lifetime_days),
        }
    }

    /// Build keys from the configured secret.
    ///
    /// Production refuses to start without a secret. Development falls back to
    /// a random per-process secret, so issued tokens die with the process.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let configured = config
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty());

        let secret = match configured {
            Some(secret) => secret.to_string(),
            None if config.server.production => anyhow::bail!(
                "auth.jwt_secret (or {}) must be set in production mode",
                JWT_SECRET_ENV
            ),
            None => {
                tracing::warn!(
                    "No JWT secret configured; using a random secret for this process only"
                );
                generate_secret()
            }
        };

        Ok(Self::new(secret.as_bytes(), config.auth.token_days))
    }

    pub fn issue(
        &self,
        user_id: &str,
        username: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, username, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                ErrorKind::InvalidSignature => TokenRejection::BadSignature,
                _ => TokenRejection::Malformed,
            })
    }
}

/// Generate a cryptographically random 32-byte hex secret.
fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(b"test-secret", 30)
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let token = keys.issue("user-1", "carol").unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "carol");
    }

    #[test]
    fn token_expires_after_thirty_days() {
        let keys = keys();
        let now = Utc::now();
        let claims = keys.verify(&keys.issue_at("u", "carol", now).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys();
        let token = keys
            .issue_at("u", "carol", Utc::now() - Duration::days(31))
            .unwrap();
        assert_eq!(keys.verify(&token), Err(TokenRejection::Expired));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenKeys::new(b"other-secret", 30)
            .issue("u", "carol")
            .unwrap();
        assert_eq!(keys().verify(&token), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(keys().verify("not.a.jwt"), Err(TokenRejection::Malformed));
        assert_eq!(keys().verify(""), Err(TokenRejection::Malformed));
    }

    #[test]
    fn production_requires_secret() {
        let mut config = Config::default();
        config.server.production = true;
        assert!(TokenKeys::from_config(&config).is_err());

        config.auth.jwt_secret = Some("configured".to_string());
        assert!(TokenKeys::from_config(&config).is_ok());
    }

    #[test]
    fn development_falls_back_to_random_secret() {
        let config = Config::default();
        let a = TokenKeys::from_config(&config).unwrap();
        let b = TokenKeys::from_config(&config).unwrap();
        let token = a.issue("u", "carol").unwrap();
        assert!(a.verify(&token).is_ok());
        assert_eq!(b.verify(&token), Err(TokenRejection::BadSignature));
    }

    #[test]
    fn generated_secret_is_64_hex_chars() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
