//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Settings for signing and checking session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service against the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub jwt: JwtConfig,
    /// When set, only tokens carrying this role may create, update or delete items.
    pub inventory_write_role: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Token Settings (all required) ---
        let jwt = JwtConfig {
            secret: required(&lookup, "JWT_SECRET")?,
            issuer: required(&lookup, "JWT_ISSUER")?,
            audience: required(&lookup, "JWT_AUDIENCE")?,
        };

        let inventory_write_role =
            lookup("INVENTORY_WRITE_ROLE").filter(|role| !role.trim().is_empty());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            jwt,
            inventory_write_role,
        })
    }
}

fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue(
            name.to_string(),
            "must not be empty".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    const JWT_VARS: [(&str, &str); 3] = [
        ("JWT_SECRET", "a-long-enough-signing-secret"),
        ("JWT_ISSUER", "https://inventory.local"),
        ("JWT_AUDIENCE", "inventory-clients"),
    ];

    #[test]
    fn defaults_apply_when_optional_vars_are_absent() {
        let config = Config::from_lookup(env(&JWT_VARS)).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_url, None);
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.jwt.issuer, "https://inventory.local");
        assert_eq!(config.inventory_write_role, None);
    }

    #[test]
    fn missing_signing_secret_is_reported() {
        let err = Config::from_lookup(env(&JWT_VARS[1..])).unwrap_err();

        assert!(matches!(err, ConfigError::MissingVar(name) if name == "JWT_SECRET"));
    }

    #[test]
    fn blank_audience_is_rejected() {
        let mut vars = JWT_VARS.to_vec();
        vars[2] = ("JWT_AUDIENCE", "  ");

        let err = Config::from_lookup(env(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "JWT_AUDIENCE"));
    }

    #[test]
    fn bad_log_level_is_rejected() {
        let mut vars = JWT_VARS.to_vec();
        vars.push(("RUST_LOG", "chatty"));

        let err = Config::from_lookup(env(&vars)).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "RUST_LOG"));
    }

    #[test]
    fn debug_output_redacts_the_secret() {
        let config = Config::from_lookup(env(&JWT_VARS)).unwrap();

        assert!(!format!("{config:?}").contains("a-long-enough-signing-secret"));
    }
}
