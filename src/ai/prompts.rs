//! Prompt builder and response clean-up for emoji augmentation.

use super::client::Message;
use crate::constants::MAX_SUGGESTED_EMOJI;
use crate::errors::AIError;

/// Builds the single user message asking for emoji that fit the entry.
///
/// # Arguments
///
/// * `entry_text` - The diary text as written by the member
pub fn emoji_prompt(entry_text: &str) -> Vec<Message> {
    vec![Message::user(format!(
        r#"Here is a diary entry:
---
{}
---
Reply with up to {} emoji that capture the mood of this entry.
Put them on a single line and output nothing but the emoji."#,
        entry_text, MAX_SUGGESTED_EMOJI
    ))]
}

/// Reduces a model reply to the suffix stored after the entry text.
///
/// Takes the first non-blank line, trimmed. Models occasionally add a second
/// line of commentary; it is dropped.
///
/// # Errors
///
/// Returns `AIError::InvalidResponse` if the reply has no visible content.
pub fn extract_suffix(reply: &str) -> Result<String, AIError> {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AIError::InvalidResponse("completion contained no text".to_string()))
}
