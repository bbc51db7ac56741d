//! Member signup and login.

use crate::auth::{hash_password, verify_password, IssuedToken, TokenSigner};
use crate::db::members::{self, MemberProfile};
use crate::db::Database;
use crate::errors::{AppError, AppResult, AuthError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// What a successful login hands back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: MemberProfile,
    pub token: IssuedToken,
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// Registers a new member and returns their public profile.
///
/// The password is hashed before it reaches storage. An id that is already
/// taken yields `DatabaseError::Duplicate` and leaves the existing member as
/// it was.
pub fn signup(
    db: &Database,
    id: &str,
    name: &str,
    password: &str,
    email: &str,
) -> AppResult<MemberProfile> {
    require("id", id)?;
    require("name", name)?;
    require("password", password)?;
    require("email", email)?;

    let password_hash = hash_password(password)?;

    let conn = db.get_conn()?;
    members::insert_member(&conn, id, name, &password_hash, email)?;

    info!("Registered member {}", id);
    Ok(MemberProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Checks a member's credentials and issues a bearer token.
///
/// An unknown id and a wrong password both produce
/// `AuthError::InvalidCredentials`.
pub fn login(
    db: &Database,
    tokens: &TokenSigner,
    id: &str,
    password: &str,
    now: DateTime<Utc>,
) -> AppResult<LoginOutcome> {
    require("id", id)?;
    require("password", password)?;

    let member = {
        let conn = db.get_conn()?;
        members::get_member(&conn, id)?
    };

    let member = match member {
        Some(member) if verify_password(password, &member.password_hash)? => member,
        _ => {
            warn!("Failed login for member {}", id);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = tokens.issue(&member.id, now)?;

    info!("Member {} logged in", id);
    Ok(LoginOutcome {
        user: MemberProfile::from(&member),
        token,
    })
}
