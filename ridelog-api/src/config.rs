//! Process configuration.
//!
//! Values come from the environment (after loading `.env` with `dotenvy`).
//! Rocket's own settings (`Rocket.toml`, `ROCKET_*`) are layered underneath
//! in [`AppConfig::figment`].

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use rocket::figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "db.sqlite";
pub const DEFAULT_STATIC_DIR: &str = "static";
pub const INSECURE_SESSION_SECRET: &str = "secret-key";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

#[derive(Clone)]
pub struct AppConfig {
    /// The shared admin secret. `None` disables admin login entirely.
    pub admin_password: Option<String>,
    /// Passphrase the cookie encryption key is derived from.
    pub session_secret: String,
    /// Listening port; falls back to Rocket's config, then 3000.
    pub port: Option<u16>,
    pub database_url: String,
    /// Directory holding `rider.html`, `admin.html` and their assets.
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("session_secret", &"<redacted>")
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl AppConfig {
    /// Reads `ADMIN_PASSWORD`, `SESSION_SECRET`, `PORT`, `DATABASE_URL` and
    /// `RIDELOG_STATIC_DIR`. Empty variables count as unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let admin_password = var("ADMIN_PASSWORD");
        let session_secret = var("SESSION_SECRET")
            .or_else(|| admin_password.clone())
            .unwrap_or_else(|| INSECURE_SESSION_SECRET.to_string());
        let port = match var("PORT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(raw))?,
            ),
            None => None,
        };

        Ok(AppConfig {
            admin_password,
            session_secret,
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            static_dir: var("RIDELOG_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }

    pub fn uses_insecure_secret(&self) -> bool {
        self.session_secret == INSECURE_SESSION_SECRET
    }

    /// Rocket's `secret_key`: SHA-256 of the session passphrase, hex encoded.
    pub fn secret_key(&self) -> String {
        format!("{:x}", Sha256::digest(self.session_secret.as_bytes()))
    }

    /// The production figment: our defaults, then `Rocket.toml`, then
    /// `ROCKET_*` variables, then this config.
    pub fn figment(&self) -> Figment {
        let base = Figment::from(rocket::Config::default())
            .merge(("address", DEFAULT_ADDRESS))
            .merge(("port", DEFAULT_PORT))
            .merge(Toml::file("Rocket.toml").nested())
            .merge(Env::prefixed("ROCKET_").global());
        self.apply(base)
    }

    /// Merges the values this config owns into an existing figment.
    pub fn apply(&self, figment: Figment) -> Figment {
        let figment = figment
            .merge(("secret_key", self.secret_key()))
            .merge(("databases.sqlite_db.url", self.database_url.clone()));
        match self.port {
            Some(port) => figment.merge(("port", port)),
            None => figment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.admin_password, None);
        assert_eq!(config.session_secret, INSECURE_SESSION_SECRET);
        assert!(config.uses_insecure_secret());
        assert_eq!(config.port, None);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.static_dir, PathBuf::from(DEFAULT_STATIC_DIR));
    }

    #[test]
    fn test_session_secret_falls_back_to_admin_password() {
        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "hunter2")])).unwrap();
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.session_secret, "hunter2");

        let config = AppConfig::from_lookup(lookup(&[
            ("ADMIN_PASSWORD", "hunter2"),
            ("SESSION_SECRET", "signing"),
        ]))
        .unwrap();
        assert_eq!(config.session_secret, "signing");
        assert!(!config.uses_insecure_secret());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", ""), ("PORT", "")])).unwrap();
        assert_eq!(config.admin_password, None);
        assert_eq!(config.port, None);
    }

    #[test]
    fn test_port_parsing() {
        let config = AppConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, Some(8080));

        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("eighty".to_string()));
    }

    #[test]
    fn test_secret_key_is_stable_hex() {
        let config = AppConfig::from_lookup(lookup(&[("SESSION_SECRET", "abc")])).unwrap();
        let key = config.secret_key();
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, config.secret_key());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AppConfig::from_lookup(lookup(&[("ADMIN_PASSWORD", "hunter2")])).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
    }
}
