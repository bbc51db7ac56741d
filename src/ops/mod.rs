//! Request-level operations.
//!
//! These functions orchestrate storage, credentials, and the augmentation
//! service. They are synchronous; the HTTP layer runs them on the blocking
//! thread pool.

pub mod account;
pub mod diary;

pub use account::{login, signup, LoginOutcome};
pub use diary::{compose_detail, delete_entries, parse_entry_date, read_entries, write_entry};
