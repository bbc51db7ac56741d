//! Text augmentation for diary entries.
//!
//! This module provides the client for a chat-completions style API and the
//! prompt used to ask it for emoji that fit a diary entry.
//!
//! # Module Structure
//!
//! - `client`: Blocking HTTP client with timeout and bounded retries
//! - `prompts`: Prompt builder and response clean-up
//!
//! # Example
//!
//! ```no_run
//! use emodiary::ai::{ChatClient, TextAugmenter};
//! use emodiary::config::AiConfig;
//!
//! let client = ChatClient::new(&AiConfig::default())?;
//! let emoji = client.suggest_emoji("A quiet walk by the river")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod client;
pub mod prompts;

use crate::errors::AppResult;

// Re-export commonly used types
pub use client::{ChatClient, Message};
pub use prompts::{emoji_prompt, extract_suffix};

/// Produces the emoji suffix appended to a diary entry.
///
/// Implementations perform blocking I/O and are called from a blocking
/// context. The returned string is already trimmed and never empty.
pub trait TextAugmenter: Send + Sync {
    fn suggest_emoji(&self, text: &str) -> AppResult<String>;
}
