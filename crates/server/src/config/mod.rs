//! Configuration management for the workspace server
//!
//! Settings are stored in RON and every section falls back to defaults, so an
//! empty `Config()` is a valid file.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::slug::resolver::DEFAULT_MAX_PROBES;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub slugs: SlugSettings,
}

impl Config {
    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.database.validate()?;
        self.slugs.validate()
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Address to bind, e.g. "0.0.0.0:4000"
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Origins allowed by CORS. A single "*" allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        self.bind_address
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {}", self.bind_address, e))
    }

    fn validate(&self) -> Result<(), String> {
        self.socket_addr().map(|_| ())
    }
}

/// SQLite settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DatabaseSettings {
    /// Directory holding the database file. `WORKSPACES_DB_PATH` overrides it.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("database.max_connections must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Bearer token verification settings
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuthSettings {
    /// Environment variable holding the HS256 signing secret
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
        }
    }
}

impl AuthSettings {
    /// Read the signing secret from the configured environment variable
    pub fn resolve_secret(&self) -> Option<String> {
        std::env::var(&self.secret_env)
            .ok()
            .filter(|secret| !secret.is_empty())
    }
}

/// Slug allocation limits
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SlugSettings {
    /// Suffixes probed before giving up on a base
    #[serde(default = "default_max_probes")]
    pub max_probes: u32,

    /// Resolve-then-write rounds when a concurrent writer takes the slug first
    #[serde(default = "default_reserve_attempts")]
    pub reserve_attempts: u32,

    /// Longest slug that may be stored, in bytes
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

impl Default for SlugSettings {
    fn default() -> Self {
        Self {
            max_probes: default_max_probes(),
            reserve_attempts: default_reserve_attempts(),
            max_length: default_max_length(),
        }
    }
}

impl SlugSettings {
    fn validate(&self) -> Result<(), String> {
        if self.max_probes == 0 {
            return Err("slugs.max_probes must be at least 1".to_string());
        }
        if self.reserve_attempts == 0 {
            return Err("slugs.reserve_attempts must be at least 1".to_string());
        }
        if self.max_length == 0 {
            return Err("slugs.max_length must be at least 1".to_string());
        }
        Ok(())
    }
}

fn default_bind_address() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_max_connections() -> u32 {
    5
}

fn default_secret_env() -> String {
    "JWT_SECRET".to_string()
}

fn default_max_probes() -> u32 {
    DEFAULT_MAX_PROBES
}

fn default_reserve_attempts() -> u32 {
    3
}

fn default_max_length() -> usize {
    255
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.bind_address, "0.0.0.0:4000");
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:3000"]);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.auth.secret_env, "JWT_SECRET");
        assert_eq!(config.slugs.max_probes, 10_000);
        assert_eq!(config.slugs.reserve_attempts, 3);
        assert_eq!(config.slugs.max_length, 255);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = Config::default();
        config.server.bind_address = "not-an-address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = Config::default();
        config.slugs.max_probes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.slugs.reserve_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_secret() {
        unsafe {
            std::env::set_var("WORKSPACES_TEST_SECRET", "s3cret");
            std::env::set_var("WORKSPACES_TEST_EMPTY_SECRET", "");
        }

        let auth = AuthSettings {
            secret_env: "WORKSPACES_TEST_SECRET".to_string(),
        };
        assert_eq!(auth.resolve_secret(), Some("s3cret".to_string()));

        let empty = AuthSettings {
            secret_env: "WORKSPACES_TEST_EMPTY_SECRET".to_string(),
        };
        assert_eq!(empty.resolve_secret(), None);

        unsafe {
            std::env::remove_var("WORKSPACES_TEST_SECRET");
            std::env::remove_var("WORKSPACES_TEST_EMPTY_SECRET");
        }
    }
}
