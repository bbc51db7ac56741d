//! Configuration management for the emodiary service.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. Configuration is read once at startup and then
//! handed to the components that need it; request handlers never touch the environment.
//!
//! # Environment Variables
//!
//! - `EMODIARY_DB`: Path to the SQLite database (defaults to ~/.local/share/emodiary/emodiary.db)
//! - `EMODIARY_BIND`: Listen address (defaults to 127.0.0.1:8000)
//! - `EMODIARY_AI_BASE_URL`, `EMODIARY_AI_MODEL`, `EMODIARY_AI_TEMPERATURE`,
//!   `EMODIARY_AI_TIMEOUT_SECS`, `EMODIARY_AI_MAX_RETRIES`: augmentation client settings
//! - `OPENAI_API_KEY`: API key for the augmentation endpoint
//! - `EMODIARY_TOKEN_SECRET`, `EMODIARY_TOKEN_TTL_SECS`, `EMODIARY_REQUIRE_TOKEN`: bearer tokens
//! - `EMODIARY_CORS_ORIGINS`: comma-separated allowed origins, or `*`
//! - `EMODIARY_LOG_FORMAT`: `text` or `json`

use crate::constants::{
    DEFAULT_AI_BASE_URL, DEFAULT_AI_MAX_RETRIES, DEFAULT_AI_TIMEOUT_SECS, DEFAULT_BIND_ADDR,
    DEFAULT_CHAT_MODEL, DEFAULT_DB_PATH, DEFAULT_TEMPERATURE, DEFAULT_TOKEN_TTL_SECS,
    ENV_VAR_AI_API_KEY, ENV_VAR_AI_BASE_URL, ENV_VAR_AI_MAX_RETRIES, ENV_VAR_AI_MODEL,
    ENV_VAR_AI_TEMPERATURE, ENV_VAR_AI_TIMEOUT_SECS, ENV_VAR_BIND, ENV_VAR_CORS_ORIGINS,
    ENV_VAR_DB_PATH, ENV_VAR_LOG_FORMAT, ENV_VAR_REQUIRE_TOKEN, ENV_VAR_TOKEN_SECRET,
    ENV_VAR_TOKEN_TTL_SECS, LOG_FORMAT_JSON, LOG_FORMAT_TEXT, MAX_AI_RETRIES,
    MAX_TOKEN_TTL_SECS, MIN_TOKEN_SECRET_LEN, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use zeroize::Zeroizing;

/// Settings for the text augmentation client.
#[derive(Clone)]
pub struct AiConfig {
    /// Base URL of the chat-completions API, without the trailing `/chat/completions`.
    pub base_url: String,
    /// Bearer key. Empty when not configured.
    pub api_key: Zeroizing<String>,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature, 0.0 to 2.0.
    pub temperature: f32,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &REDACTED_PLACEHOLDER)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            api_key: Zeroizing::new(String::new()),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            max_retries: DEFAULT_AI_MAX_RETRIES,
        }
    }
}

/// Settings for bearer token issuance.
#[derive(Clone)]
pub struct TokenConfig {
    /// Signing secret. Empty when not configured.
    pub secret: Zeroizing<String>,
    /// Lifetime of an issued token in seconds.
    pub ttl_secs: i64,
    /// Whether diary routes demand a token whose subject matches `member_id`.
    pub require_token: bool,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &REDACTED_PLACEHOLDER)
            .field("ttl_secs", &self.ttl_secs)
            .field("require_token", &self.require_token)
            .finish()
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            secret: Zeroizing::new(String::new()),
            ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            require_token: false,
        }
    }
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Invalid log format '{}': expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }
}

/// Configuration for the emodiary service.
///
/// # Examples
///
/// Starting from defaults and overriding what a test needs:
/// ```
/// use emodiary::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/tmp/emodiary-test.db"),
///     ..Config::default()
/// };
/// assert!(config.validate_storage().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
    /// Augmentation client settings.
    pub ai: AiConfig,
    /// Token settings.
    pub token: TokenConfig,
    /// Allowed CORS origins; `["*"]` allows any.
    pub cors_origins: Vec<String>,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(""),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            ai: AiConfig::default(),
            token: TokenConfig::default(),
            cors_origins: vec!["*".to_string()],
            log_format: LogFormat::Text,
        }
    }
}

/// Reads an optional variable and parses it, naming the variable on failure.
fn parse_var<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {}", key, e))),
        _ => Ok(default),
    }
}

fn parse_bool(key: &str) -> AppResult<bool> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "no" | "off" => Ok(false),
            "1" | "true" | "yes" | "on" => Ok(true),
            other => Err(AppError::Config(format!(
                "Invalid value for {}: '{}' is not a boolean",
                key, other
            ))),
        },
        Err(_) => Ok(false),
    }
}

/// Expands `~` and environment references in a database path.
pub fn expand_db_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// Secrets are read but not required here; `validate` checks what the
    /// `serve` command needs, while `init-db` only needs a database path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any variable is present but unparseable,
    /// or if the database path cannot be expanded.
    pub fn load() -> AppResult<Self> {
        let db_raw = env::var(ENV_VAR_DB_PATH).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let db_path = expand_db_path(&db_raw)?;

        let default_bind = DEFAULT_BIND_ADDR
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("Invalid default bind address: {}", e)))?;
        let bind_addr: SocketAddr = parse_var(ENV_VAR_BIND, default_bind)?;

        let ai = AiConfig {
            base_url: env::var(ENV_VAR_AI_BASE_URL)
                .unwrap_or_else(|_| DEFAULT_AI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: Zeroizing::new(env::var(ENV_VAR_AI_API_KEY).unwrap_or_default()),
            model: env::var(ENV_VAR_AI_MODEL).unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            temperature: parse_var(ENV_VAR_AI_TEMPERATURE, DEFAULT_TEMPERATURE)?,
            timeout: Duration::from_secs(parse_var(
                ENV_VAR_AI_TIMEOUT_SECS,
                DEFAULT_AI_TIMEOUT_SECS,
            )?),
            max_retries: parse_var(ENV_VAR_AI_MAX_RETRIES, DEFAULT_AI_MAX_RETRIES)?,
        };

        let token = TokenConfig {
            secret: Zeroizing::new(env::var(ENV_VAR_TOKEN_SECRET).unwrap_or_default()),
            ttl_secs: parse_var(ENV_VAR_TOKEN_TTL_SECS, DEFAULT_TOKEN_TTL_SECS)?,
            require_token: parse_bool(ENV_VAR_REQUIRE_TOKEN)?,
        };

        let cors_origins = env::var(ENV_VAR_CORS_ORIGINS)
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let log_format = parse_var(ENV_VAR_LOG_FORMAT, LogFormat::Text)?;

        Ok(Config {
            db_path,
            bind_addr,
            ai,
            token,
            cors_origins,
            log_format,
        })
    }

    /// Validates the settings every command needs.
    pub fn validate_storage(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }
        Ok(())
    }

    /// Validates that the configuration is usable for serving HTTP.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the database path is empty, the API key
    /// or token secret is missing, the token secret is too short, or a numeric
    /// setting is out of range.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_storage()?;

        if self.ai.base_url.is_empty() {
            return Err(AppError::Config(
                "Augmentation base URL is empty".to_string(),
            ));
        }

        if self.ai.api_key.trim().is_empty() {
            return Err(AppError::Config(format!("{} is not set", ENV_VAR_AI_API_KEY)));
        }

        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(AppError::Config(format!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.ai.temperature
            )));
        }

        if self.ai.timeout.is_zero() {
            return Err(AppError::Config(
                "Augmentation timeout must be at least one second".to_string(),
            ));
        }

        if self.ai.max_retries > MAX_AI_RETRIES {
            return Err(AppError::Config(format!(
                "Augmentation retries must not exceed {}",
                MAX_AI_RETRIES
            )));
        }

        if self.token.secret.len() < MIN_TOKEN_SECRET_LEN {
            return Err(AppError::Config(format!(
                "{} must be at least {} bytes",
                ENV_VAR_TOKEN_SECRET, MIN_TOKEN_SECRET_LEN
            )));
        }

        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token.ttl_secs) {
            return Err(AppError::Config(format!(
                "{} must be between 1 and {}, got {}",
                ENV_VAR_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS, self.token.ttl_secs
            )));
        }

        if self.cors_origins.is_empty() {
            return Err(AppError::Config(
                "At least one CORS origin is required".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ALL_VARS: &[&str] = &[
        ENV_VAR_DB_PATH,
        ENV_VAR_BIND,
        ENV_VAR_AI_BASE_URL,
        ENV_VAR_AI_API_KEY,
        ENV_VAR_AI_MODEL,
        ENV_VAR_AI_TEMPERATURE,
        ENV_VAR_AI_TIMEOUT_SECS,
        ENV_VAR_AI_MAX_RETRIES,
        ENV_VAR_TOKEN_SECRET,
        ENV_VAR_TOKEN_TTL_SECS,
        ENV_VAR_REQUIRE_TOKEN,
        ENV_VAR_CORS_ORIGINS,
        ENV_VAR_LOG_FORMAT,
    ];

    /// Clears every variable the loader reads and returns the previous values.
    fn setup() -> Vec<(&'static str, Option<String>)> {
        ALL_VARS
            .iter()
            .map(|&key| {
                let orig = env::var(key).ok();
                env::remove_var(key);
                (key, orig)
            })
            .collect()
    }

    fn restore(saved: Vec<(&'static str, Option<String>)>) {
        for (key, value) in saved {
            match value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    fn valid_config() -> Config {
        let mut config = Config {
            db_path: PathBuf::from("/tmp/emodiary.db"),
            ..Config::default()
        };
        config.ai.api_key = Zeroizing::new("sk-test".to_string());
        config.token.secret = Zeroizing::new("0123456789abcdef0123".to_string());
        config
    }

    #[test]
    fn test_debug_impl_redacts_secrets() {
        let config = valid_config();

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("sk-test"));
        assert!(!debug_output.contains("0123456789abcdef0123"));
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let saved = setup();
        env::set_var(ENV_VAR_DB_PATH, "/tmp/defaults.db");

        let config = Config::load().unwrap();

        restore(saved);

        assert_eq!(config.db_path, PathBuf::from("/tmp/defaults.db"));
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.ai.base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(config.ai.model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.ai.max_retries, DEFAULT_AI_MAX_RETRIES);
        assert_eq!(config.token.ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert!(!config.token.require_token);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    #[serial]
    fn test_load_with_overrides() {
        let saved = setup();
        env::set_var(ENV_VAR_DB_PATH, "/tmp/override.db");
        env::set_var(ENV_VAR_BIND, "0.0.0.0:9000");
        env::set_var(ENV_VAR_AI_BASE_URL, "http://localhost:1234/v1/");
        env::set_var(ENV_VAR_AI_MODEL, "gpt-4o-mini");
        env::set_var(ENV_VAR_AI_TEMPERATURE, "0.2");
        env::set_var(ENV_VAR_AI_MAX_RETRIES, "1");
        env::set_var(ENV_VAR_REQUIRE_TOKEN, "true");
        env::set_var(ENV_VAR_CORS_ORIGINS, "http://localhost:3000, http://localhost:8000");
        env::set_var(ENV_VAR_LOG_FORMAT, "JSON");

        let config = Config::load().unwrap();

        restore(saved);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.ai.base_url, "http://localhost:1234/v1");
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert!((config.ai.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.ai.max_retries, 1);
        assert!(config.token.require_token);
        assert_eq!(
            config.cors_origins,
            vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string()
            ]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_load_rejects_unparseable_number() {
        let saved = setup();
        env::set_var(ENV_VAR_DB_PATH, "/tmp/x.db");
        env::set_var(ENV_VAR_AI_TIMEOUT_SECS, "soon");

        let result = Config::load();

        restore(saved);

        match result {
            Err(AppError::Config(msg)) => assert!(msg.contains(ENV_VAR_AI_TIMEOUT_SECS)),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_load_rejects_bad_boolean() {
        let saved = setup();
        env::set_var(ENV_VAR_DB_PATH, "/tmp/x.db");
        env::set_var(ENV_VAR_REQUIRE_TOKEN, "maybe");

        let result = Config::load();

        restore(saved);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_api_key() {
        let mut config = valid_config();
        config.ai.api_key = Zeroizing::new(String::new());

        match config.validate() {
            Err(AppError::Config(msg)) => assert!(msg.contains(ENV_VAR_AI_API_KEY)),
            other => panic!("Expected Config error about API key, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_short_token_secret() {
        let mut config = valid_config();
        config.token.secret = Zeroizing::new("short".to_string());

        match config.validate() {
            Err(AppError::Config(msg)) => assert!(msg.contains("at least")),
            other => panic!("Expected Config error about secret length, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_out_of_range_values() {
        let mut config = valid_config();
        config.ai.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.ai.max_retries = MAX_AI_RETRIES + 1;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.ai.timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.token.ttl_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.token.ttl_secs = 9_000_000_000_000;
        match config.validate() {
            Err(AppError::Config(msg)) => assert!(msg.contains(ENV_VAR_TOKEN_TTL_SECS)),
            other => panic!("Expected Config error for oversized TTL, got {:?}", other),
        }

        let mut config = valid_config();
        config.token.ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_db_path() {
        let config = Config::default();

        match config.validate_storage() {
            Err(AppError::Config(message)) => {
                assert!(message.contains("Database path is empty"));
            }
            _ => panic!("Expected Config error about empty database path"),
        }
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!(" Json ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    #[serial]
    fn test_expand_db_path_uses_home() {
        let orig_home = env::var("HOME").ok();
        env::set_var("HOME", "/home/tester");

        let path = expand_db_path("~/diary.db").unwrap();

        match orig_home {
            Some(val) => env::set_var("HOME", val),
            None => env::remove_var("HOME"),
        }

        assert_eq!(path, PathBuf::from("/home/tester/diary.db"));
    }
}
