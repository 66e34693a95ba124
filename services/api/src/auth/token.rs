//! services/api/src/auth/token.rs
//!
//! Issues and verifies the HS256 session tokens handed out at login.
//! Tokens are never stored server-side; a token stays valid until it expires.

use chrono::{DateTime, Duration, Utc};
use inventory_core::User;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::JwtConfig;
use crate::error::ApiError;

/// Lifetime of every issued token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: String,
    /// The username.
    pub name: String,
    pub role: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signs and checks session tokens with one server-held symmetric secret.
#[derive(Clone)]
pub struct TokenService {
    issuer: String,
    audience: String,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `user` that expires one hour from now.
    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, ApiError> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.username.clone(),
            role: user.role.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            nbf: iat,
            exp: (issued_at + Duration::seconds(TOKEN_LIFETIME_SECS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to sign session token: {:?}", e);
            ApiError::Internal("Failed to issue token".to_string())
        })
    }

    /// Checks signature, issuer, audience and the validity window.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected session token: {}", e);
                ApiError::Unauthorized("Invalid or expired token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, audience: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            issuer: "https://inventory.local".to_string(),
            audience: audience.to_string(),
        }
    }

    fn admin() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            role: "Admin".to_string(),
        }
    }

    #[test]
    fn issued_token_carries_identity_and_one_hour_lifetime() {
        let tokens = TokenService::new(&config("secret-one", "clients"));
        let token = tokens.issue(&admin()).unwrap();

        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, "1");
        assert_eq!(claims.name, "admin");
        assert_eq!(claims.role, "Admin");
        assert_eq!(claims.iss, "https://inventory.local");
        assert_eq!(claims.aud, "clients");
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = TokenService::new(&config("secret-one", "clients"))
            .issue(&admin())
            .unwrap();

        let err = TokenService::new(&config("secret-two", "clients"))
            .verify(&token)
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn token_for_another_audience_is_rejected() {
        let token = TokenService::new(&config("secret-one", "other-clients"))
            .issue(&admin())
            .unwrap();

        let err = TokenService::new(&config("secret-one", "clients"))
            .verify(&token)
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(&config("secret-one", "clients"));
        let token = tokens
            .issue_at(&admin(), Utc::now() - Duration::hours(2))
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn token_issued_in_the_future_is_rejected() {
        let tokens = TokenService::new(&config("secret-one", "clients"));
        let token = tokens
            .issue_at(&admin(), Utc::now() + Duration::minutes(10))
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new(&config("secret-one", "clients"));
        assert!(tokens.verify("not.a.token").is_err());
    }
}
