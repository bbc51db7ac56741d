//! Member credentials and bearer tokens.
//!
//! - `password`: Argon2id hashing and verification
//! - `token`: blake3-signed, time-limited bearer tokens

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, IssuedToken, TokenSigner};
