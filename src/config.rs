//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/cypher-mcp/config.toml` (XDG) or platform config dir
//! 2. Project config: `.cypher-mcp.toml`
//! 3. Environment variables: `NEO4J_*`
//!
//! The environment names match the server's deployment contract:
//! `NEO4J_URI`, `NEO4J_USERNAME`, `NEO4J_PASSWORD`, `NEO4J_DATABASE`,
//! `NEO4J_READ_ONLY`, `NEO4J_NAMESPACE`, `NEO4J_RESPONSE_TOKEN_LIMIT`,
//! `NEO4J_READ_TIMEOUT`, `NEO4J_SCHEMA_SAMPLE_SIZE`.
//!
//! Loading never fails on missing credentials: connection fields are
//! optional here and validated by [`Settings::connection`] at the moment
//! the binding is first needed. A process that starts before its secrets
//! are available self-heals once they appear, without a restart.

use std::fmt;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use thiserror::Error;

/// Configuration resolution errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration source could not be read or parsed.
    /// Boxed to keep Result sizes small on the stack.
    #[error("{0}")]
    Invalid(Box<figment::Error>),

    /// A required connection field is absent or empty.
    #[error("missing required setting `{key}` (set {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },

    /// The resolved values cannot be turned into a driver configuration.
    #[error("invalid connection configuration: {0}")]
    Driver(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Server settings, resolved from the layered configuration source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bolt endpoint URI (e.g. `neo4j+s://host:7687`). Required at first use.
    pub uri: Option<String>,
    /// Database principal. Required at first use.
    pub username: Option<String>,
    /// Database credential. Required at first use; never logged.
    pub password: Option<String>,
    /// Target database name.
    pub database: String,
    /// When set, the write tool is withheld from the exposed set and
    /// write intent is rejected at the gateway.
    pub read_only: bool,
    /// Optional prefix applied to every exposed tool name.
    pub namespace: String,
    /// Response budget in estimated tokens. Unset or zero means unlimited.
    pub response_token_limit: Option<usize>,
    /// Per-query timeout in seconds.
    pub read_timeout: u64,
    /// Instances sampled per label/relationship type during schema inspection.
    pub schema_sample_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            uri: None,
            username: None,
            password: None,
            database: "neo4j".to_string(),
            read_only: false,
            namespace: String::new(),
            response_token_limit: None,
            read_timeout: 30,
            schema_sample_size: 1000,
        }
    }
}

/// Validated connection configuration, extracted from [`Settings`] at
/// first use. Immutable once the binding is constructed.
#[derive(Clone)]
pub struct ConnectionConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

// Credential is redacted from any debug/log output.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

impl Settings {
    /// Load settings with layered resolution (user -> project -> env).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Extract settings from an explicit figment (also used by tests).
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        figment.extract().map_err(ConfigError::from)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file(".cypher-mcp.toml"))
            .merge(Env::prefixed("NEO4J_"))
    }

    /// User config path: ~/.config/cypher-mcp/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("cypher-mcp").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        dirs::config_dir()
            .map(|p| p.join("cypher-mcp").join("config.toml"))
            .unwrap_or_default()
    }

    /// Validate the connection fields, failing if any is absent or empty.
    pub fn connection(&self) -> Result<ConnectionConfig, ConfigError> {
        Ok(ConnectionConfig {
            uri: require(&self.uri, "uri", "NEO4J_URI")?,
            username: require(&self.username, "username", "NEO4J_USERNAME")?,
            password: require(&self.password, "password", "NEO4J_PASSWORD")?,
            database: self.database.clone(),
        })
    }

    /// Effective response budget; a configured zero means unlimited.
    pub fn response_budget(&self) -> Option<usize> {
        match self.response_token_limit {
            None | Some(0) => None,
            Some(limit) => Some(limit),
        }
    }
}

fn require(
    field: &Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(ConfigError::Missing { key, env }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn env_only() -> Figment {
        Figment::new().merge(Env::prefixed("NEO4J_"))
    }

    #[test]
    fn defaults_apply_without_any_source() {
        Jail::expect_with(|_jail| {
            let settings = Settings::from_figment(&env_only()).unwrap();
            assert_eq!(settings.database, "neo4j");
            assert!(!settings.read_only);
            assert_eq!(settings.namespace, "");
            assert_eq!(settings.read_timeout, 30);
            assert_eq!(settings.schema_sample_size, 1000);
            assert_eq!(settings.response_budget(), None);
            Ok(())
        });
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("NEO4J_URI", "neo4j://db:7687");
            jail.set_env("NEO4J_USERNAME", "neo4j");
            jail.set_env("NEO4J_PASSWORD", "secret");
            jail.set_env("NEO4J_DATABASE", "flights");
            jail.set_env("NEO4J_READ_ONLY", "true");
            jail.set_env("NEO4J_NAMESPACE", "g");
            jail.set_env("NEO4J_RESPONSE_TOKEN_LIMIT", "512");
            jail.set_env("NEO4J_READ_TIMEOUT", "5");
            jail.set_env("NEO4J_SCHEMA_SAMPLE_SIZE", "10");

            let settings = Settings::from_figment(&env_only()).unwrap();
            assert_eq!(settings.database, "flights");
            assert!(settings.read_only);
            assert_eq!(settings.namespace, "g");
            assert_eq!(settings.response_budget(), Some(512));
            assert_eq!(settings.read_timeout, 5);
            assert_eq!(settings.schema_sample_size, 10);

            let conn = settings.connection().unwrap();
            assert_eq!(conn.uri, "neo4j://db:7687");
            assert_eq!(conn.database, "flights");
            Ok(())
        });
    }

    #[test]
    fn missing_credential_is_reported_by_field() {
        Jail::expect_with(|jail| {
            jail.set_env("NEO4J_URI", "neo4j://db:7687");
            jail.set_env("NEO4J_USERNAME", "neo4j");

            let settings = Settings::from_figment(&env_only()).unwrap();
            let err = settings.connection().unwrap_err();
            assert!(err.to_string().contains("NEO4J_PASSWORD"));
            Ok(())
        });
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        Jail::expect_with(|jail| {
            jail.set_env("NEO4J_URI", "neo4j://db:7687");
            jail.set_env("NEO4J_USERNAME", "  ");
            jail.set_env("NEO4J_PASSWORD", "secret");

            let settings = Settings::from_figment(&env_only()).unwrap();
            let err = settings.connection().unwrap_err();
            assert!(err.to_string().contains("NEO4J_USERNAME"));
            Ok(())
        });
    }

    #[test]
    fn zero_token_limit_means_unlimited() {
        Jail::expect_with(|jail| {
            jail.set_env("NEO4J_RESPONSE_TOKEN_LIMIT", "0");
            let settings = Settings::from_figment(&env_only()).unwrap();
            assert_eq!(settings.response_budget(), None);
            Ok(())
        });
    }

    #[test]
    fn debug_output_redacts_password() {
        let conn = ConnectionConfig {
            uri: "neo4j://db:7687".into(),
            username: "neo4j".into(),
            password: "hunter2".into(),
            database: "neo4j".into(),
        };
        let rendered = format!("{conn:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
