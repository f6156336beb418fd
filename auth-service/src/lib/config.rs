use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

/// Upper bound for any token lifetime: one year.
const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    /// Absent means users live in process memory only
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "JwtConfig::default_expiration_minutes")]
    pub expiration_minutes: i64,
    /// Lifetime of tokens re-issued by the check-token route; falls back to `expiration_minutes`
    #[serde(default)]
    pub check_token_expiration_minutes: Option<i64>,
}

impl JwtConfig {
    fn default_expiration_minutes() -> i64 {
        60
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.expiration_minutes)
    }

    pub fn check_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(
            self.check_token_expiration_minutes
                .unwrap_or(self.expiration_minutes),
        )
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_minutes", &self.expiration_minutes)
            .field(
                "check_token_expiration_minutes",
                &self.check_token_expiration_minutes,
            )
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, DATABASE__URL, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// A missing or empty `jwt.secret` is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set to a non-empty value".to_string(),
            ));
        }
        validate_ttl("jwt.expiration_minutes", self.jwt.expiration_minutes)?;
        if let Some(minutes) = self.jwt.check_token_expiration_minutes {
            validate_ttl("jwt.check_token_expiration_minutes", minutes)?;
        }
        Ok(())
    }
}

fn validate_ttl(key: &str, minutes: i64) -> Result<(), ConfigError> {
    if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        return Err(ConfigError::Message(format!(
            "{} must be between 1 and {} minutes, got {}",
            key, MAX_TOKEN_TTL_MINUTES, minutes
        )));
    }
    Ok(())
}
