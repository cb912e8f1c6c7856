//! Application configuration.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origin allowed by CORS (the web client).
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

/// Database connection configuration.
///
/// Relationship transactions always run at read committed.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `TOBAEKI_ENV`)
    /// 4. Environment variables with `TOBAEKI__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("TOBAEKI_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TOBAEKI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse(
            r#"
            [database]
            url = "postgres://localhost/tobaeki"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origin, "http://localhost:5173");
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.database.min_connections, 5);
    }

    #[test]
    fn test_server_section_parsed() {
        let config = parse(
            r#"
            [server]
            port = 8080
            [database]
            url = "postgres://localhost/tobaeki"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_isolation_override_rejected() {
        let result = parse(
            r#"
            [database]
            url = "postgres://localhost/tobaeki"
            isolation = "serializable"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_database_url_rejected() {
        let result = parse(
            r"
            [server]
            port = 8080
            ",
        );
        assert!(result.is_err());
    }
}
