//! services/api/src/auth/mod.rs
//!
//! Registration, login and session-token verification on top of the
//! `CredentialStore` port.

pub mod password;
pub mod token;

use std::sync::Arc;

use inventory_core::domain::DEFAULT_ROLE;
use inventory_core::{CredentialStore, PortError, User};
use tracing::{error, info, warn};

use crate::error::ApiError;
use password::{hash_secret, verify_secret, SecretCheck};
use token::TokenService;

/// Identity attached to a request once its token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    /// Explicit guard for routes that are restricted to one role.
    pub fn require_role(&self, role: &str) -> Result<(), ApiError> {
        if self.role == role {
            Ok(())
        } else {
            warn!(
                user_id = self.user_id,
                role = %self.role,
                required = role,
                "Role check failed"
            );
            Err(ApiError::Forbidden(format!("Requires role {role}")))
        }
    }
}

#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
}

impl Authenticator {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Creates an account with the default role. The secret is stored hashed
    /// and never echoed back. Elevated roles are only ever granted in the store.
    pub async fn register(&self, username: &str, secret: &str) -> Result<User, ApiError> {
        if username.trim().is_empty() || secret.is_empty() {
            return Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            ));
        }

        if self.store.find_user_by_username(username).await?.is_some() {
            warn!(username, "Registration rejected: user already exists");
            return Err(already_exists());
        }

        let secret_hash = hash_secret(secret)?;

        // A concurrent registration of the same name can still win the race.
        let user = self
            .store
            .create_user(username, &secret_hash, DEFAULT_ROLE)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => already_exists(),
                other => ApiError::Port(other),
            })?;

        info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Returns a fresh session token when the credentials match.
    ///
    /// Unknown usernames and wrong secrets get the same answer.
    pub async fn login(&self, username: &str, secret: &str) -> Result<String, ApiError> {
        let Some(credentials) = self.store.find_user_by_username(username).await? else {
            warn!(username, "Login rejected");
            return Err(invalid_credentials());
        };

        match verify_secret(secret, &credentials.secret) {
            SecretCheck::Match => {}
            SecretCheck::LegacyMatch => self.upgrade_legacy_secret(credentials.id, secret).await,
            SecretCheck::Mismatch => {
                warn!(username, "Login rejected");
                return Err(invalid_credentials());
            }
        }

        let user = credentials.into_user();
        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthUser {
            user_id,
            username: claims.name,
            role: claims.role,
        })
    }

    /// Replaces a clear-text secret with its hash. A failure only means the
    /// upgrade is retried on the next login.
    async fn upgrade_legacy_secret(&self, user_id: i32, secret: &str) {
        let result = match hash_secret(secret) {
            Ok(hash) => self
                .store
                .update_user_secret(user_id, &hash)
                .await
                .map_err(ApiError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => info!(user_id, "Upgraded legacy clear-text secret"),
            Err(e) => error!(user_id, "Failed to upgrade legacy secret: {:?}", e),
        }
    }
}

fn already_exists() -> ApiError {
    ApiError::Conflict("User already exists".to_string())
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::config::JwtConfig;

    fn authenticator(store: Arc<MemoryStore>) -> Authenticator {
        let tokens = TokenService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "issuer".to_string(),
            audience: "audience".to_string(),
        });
        Authenticator::new(store, tokens)
    }

    #[tokio::test]
    async fn second_registration_conflicts_and_keeps_first_record() {
        let store = Arc::new(MemoryStore::new());
        let auth = authenticator(store.clone());

        let first = auth.register("alice", "s3cret").await.unwrap();
        let err = auth.register("alice", "other").await.unwrap_err();

        assert!(matches!(err, ApiError::Conflict(_)));
        assert_eq!(first.role, "User");
        let stored = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.clone().into_user(), first);
        assert_eq!(verify_secret("s3cret", &stored.secret), SecretCheck::Match);
    }

    #[tokio::test]
    async fn login_issues_token_with_role_and_rejects_wrong_secret() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_user("bob", &hash_secret("hunter2").unwrap(), "Admin")
            .await
            .unwrap();
        let auth = authenticator(store);

        let token = auth.login("bob", "hunter2").await.unwrap();
        let user = auth.verify(&token).unwrap();
        assert_eq!(user.username, "bob");
        assert_eq!(user.role, "Admin");

        assert!(matches!(
            auth.login("bob", "hunter3").await.unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            auth.login("nobody", "hunter2").await.unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn usernames_are_case_sensitive() {
        let store = Arc::new(MemoryStore::new());
        let auth = authenticator(store);
        auth.register("Carol", "pw").await.unwrap();

        assert!(auth.register("carol", "pw").await.is_ok());
        assert!(auth.login("CAROL", "pw").await.is_err());
    }

    #[tokio::test]
    async fn registration_always_grants_the_default_role() {
        let store = Arc::new(MemoryStore::new());
        let auth = authenticator(store.clone());

        let user = auth.register("eve", "pw").await.unwrap();
        let token = auth.login("eve", "pw").await.unwrap();

        assert_eq!(user.role, DEFAULT_ROLE);
        assert_eq!(auth.verify(&token).unwrap().role, DEFAULT_ROLE);
    }

    #[tokio::test]
    async fn legacy_secret_is_rehashed_on_login() {
        let store = Arc::new(MemoryStore::new());
        let legacy = store.create_user("user", "userpassword", "User").await.unwrap();
        let auth = authenticator(store.clone());

        auth.login("user", "userpassword").await.unwrap();

        let stored = store.find_user_by_username("user").await.unwrap().unwrap();
        assert_eq!(stored.id, legacy.id);
        assert!(stored.secret.starts_with("$argon2"));
        assert!(auth.login("user", "userpassword").await.is_ok());
    }

    #[test]
    fn role_guard_rejects_other_roles() {
        let user = AuthUser {
            user_id: 2,
            username: "user".to_string(),
            role: "User".to_string(),
        };

        assert!(user.require_role("User").is_ok());
        assert!(matches!(
            user.require_role("Admin").unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }
}
