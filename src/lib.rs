/*!
# emodiary

emodiary is a small diary backend. Members sign up and log in, write diary
entries that get a line of fitting emoji appended by a chat-completions
model, and read or delete the entries for a given date.

## Architecture

- `ai`: chat-completions client and the emoji prompt
- `auth`: password hashing and bearer tokens
- `cli`: command-line interface using clap
- `config`: configuration loading and validation
- `db`: SQLite storage behind an r2d2 pool
- `errors`: error handling infrastructure
- `logging`: tracing subscriber setup
- `ops`: request-level operations (write, read, delete, signup, login)
- `server`: axum router and handlers

## Usage Example

```rust,no_run
use emodiary::ai::TextAugmenter;
use emodiary::db::Database;
use emodiary::ops;

struct Smiley;

impl TextAugmenter for Smiley {
    fn suggest_emoji(&self, _text: &str) -> emodiary::AppResult<String> {
        Ok("😊".to_string())
    }
}

fn main() -> emodiary::AppResult<()> {
    let db = Database::open(std::path::Path::new("/tmp/emodiary.db"))?;
    db.initialize_schema()?;

    ops::signup(&db, "u1", "Kim", "secret", "kim@example.com")?;
    let date = ops::parse_entry_date("2024-05-01")?;
    let entry = ops::write_entry(&db, &Smiley, "u1", "A good day", date)?;
    assert_eq!(entry.detail, "A good day 😊");
    Ok(())
}
```
*/

/// Text augmentation client
pub mod ai;
/// Passwords and bearer tokens
pub mod auth;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
pub mod constants;
/// Database storage
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
pub mod logging;
/// Diary and account operations
pub mod ops;
/// HTTP router and handlers
pub mod server;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
