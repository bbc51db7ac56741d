//! Constants used throughout the application.
//!
//! This module contains all constants used in the emodiary service, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "emodiary";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A diary backend that decorates entries with emoji";

// Logging
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Path of the SQLite database file.
pub const ENV_VAR_DB_PATH: &str = "EMODIARY_DB";
/// Socket address the HTTP server binds to.
pub const ENV_VAR_BIND: &str = "EMODIARY_BIND";
/// Base URL of the chat-completions API.
pub const ENV_VAR_AI_BASE_URL: &str = "EMODIARY_AI_BASE_URL";
/// API key for the chat-completions API.
pub const ENV_VAR_AI_API_KEY: &str = "OPENAI_API_KEY";
/// Model identifier sent with every completion request.
pub const ENV_VAR_AI_MODEL: &str = "EMODIARY_AI_MODEL";
/// Sampling temperature.
pub const ENV_VAR_AI_TEMPERATURE: &str = "EMODIARY_AI_TEMPERATURE";
/// Per-attempt timeout in seconds.
pub const ENV_VAR_AI_TIMEOUT_SECS: &str = "EMODIARY_AI_TIMEOUT_SECS";
/// Number of retries after the first attempt.
pub const ENV_VAR_AI_MAX_RETRIES: &str = "EMODIARY_AI_MAX_RETRIES";
/// Secret used to sign bearer tokens.
pub const ENV_VAR_TOKEN_SECRET: &str = "EMODIARY_TOKEN_SECRET";
/// Bearer token lifetime in seconds.
pub const ENV_VAR_TOKEN_TTL_SECS: &str = "EMODIARY_TOKEN_TTL_SECS";
/// Whether diary routes require a bearer token.
pub const ENV_VAR_REQUIRE_TOKEN: &str = "EMODIARY_REQUIRE_TOKEN";
/// Comma-separated CORS origins, or `*`.
pub const ENV_VAR_CORS_ORIGINS: &str = "EMODIARY_CORS_ORIGINS";
/// Log output format (`text` or `json`).
pub const ENV_VAR_LOG_FORMAT: &str = "EMODIARY_LOG_FORMAT";

// Defaults
/// Default database location, shell-expanded at load time.
pub const DEFAULT_DB_PATH: &str = "~/.local/share/emodiary/emodiary.db";
/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
/// Default chat-completions base URL.
pub const DEFAULT_AI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
/// Default per-attempt timeout for the augmentation call.
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 20;
/// Default retry budget for the augmentation call.
pub const DEFAULT_AI_MAX_RETRIES: u32 = 2;
/// Delay before the first retry; later retries wait a multiple of it.
pub const AI_RETRY_BACKOFF_MS: u64 = 500;
/// Default bearer token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
/// Longest accepted token lifetime (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;
/// Shortest accepted token secret, in bytes.
pub const MIN_TOKEN_SECRET_LEN: usize = 16;
/// Upper bound on retries so a misconfiguration cannot pin a request forever.
pub const MAX_AI_RETRIES: u32 = 5;

// Augmentation
/// Most emoji requested from the model.
pub const MAX_SUGGESTED_EMOJI: usize = 4;

// Database
/// Maximum pooled SQLite connections.
pub const DB_POOL_MAX_SIZE: u32 = 8;
/// How long SQLite waits on a locked database before failing.
pub const DB_BUSY_TIMEOUT_MS: u64 = 5_000;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";

// Security
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";
/// Context string for deriving the token signing key.
pub const TOKEN_KEY_CONTEXT: &str = "emodiary 2024 bearer token signing key";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "emodiary";
/// Name for the span wrapping a single HTTP request.
pub const TRACING_REQUEST_SPAN_NAME: &str = "http_request";
