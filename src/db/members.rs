//! Member insert and lookup.
//!
//! Members are created on signup and never mutated afterwards. The `password`
//! column holds an argon2 PHC string produced by `auth::password`.

use crate::errors::{AppResult, DatabaseError};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use tracing::debug;

/// A member row, including the stored password hash.
#[derive(Debug, Clone)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub password_hash: String,
    pub email: String,
    pub created_at: String,
}

/// The parts of a member that are safe to hand back to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&Member> for MemberProfile {
    fn from(member: &Member) -> Self {
        MemberProfile {
            id: member.id.clone(),
            name: member.name.clone(),
            email: member.email.clone(),
        }
    }
}

/// Inserts a new member.
///
/// # Errors
///
/// Returns `DatabaseError::Duplicate` if the id is already taken; the existing
/// row is left untouched. Any other failure is `DatabaseError::Sqlite`.
pub fn insert_member(
    conn: &Connection,
    id: &str,
    name: &str,
    password_hash: &str,
    email: &str,
) -> AppResult<()> {
    debug!("Inserting member {}", id);

    conn.execute(
        "INSERT INTO member (id, name, password, email) VALUES (?1, ?2, ?3, ?4)",
        params![id, name, password_hash, email],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref err, _) if err.code == ErrorCode::ConstraintViolation => {
            DatabaseError::Duplicate(format!("member '{}'", id))
        }
        _ => DatabaseError::Sqlite(e),
    })?;

    Ok(())
}

/// Retrieves a member by id.
///
/// Returns `Ok(None)` if no member has that id.
pub fn get_member(conn: &Connection, id: &str) -> AppResult<Option<Member>> {
    debug!("Getting member {}", id);

    conn.query_row(
        "SELECT id, name, password, email, created_at FROM member WHERE id = ?1",
        params![id],
        |row| {
            Ok(Member {
                id: row.get(0)?,
                name: row.get(1)?,
                password_hash: row.get(2)?,
                email: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| DatabaseError::Sqlite(e).into())
}

/// Checks whether a member with the given id exists.
#[cfg(test)]
pub fn member_exists(conn: &Connection, id: &str) -> AppResult<bool> {
    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM member WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )
        .map_err(DatabaseError::Sqlite)?;
    Ok(exists)
}
