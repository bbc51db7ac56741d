//! Diary entry operations.
//!
//! This module provides functions for inserting, querying, and deleting diary
//! entries. Every query is scoped by member, and read/delete are scoped by both
//! member and date.
//!
//! Functions take a `&Connection`; a `rusqlite::Transaction` derefs to one, so
//! callers decide whether a statement runs inside a transaction.

use crate::constants::DATE_FORMAT_ISO;
use crate::errors::{AppResult, DatabaseError};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, Row};
use serde::Serialize;
use tracing::debug;

/// Represents a diary entry in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiaryEntry {
    pub id: i64,
    pub member_id: String,
    pub date: NaiveDate,
    pub detail: String,
    pub created_at: String,
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<DiaryEntry> {
    Ok(DiaryEntry {
        id: row.get(0)?,
        member_id: row.get(1)?,
        date: NaiveDate::parse_from_str(&row.get::<_, String>(2)?, DATE_FORMAT_ISO).map_err(
            |e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            },
        )?,
        detail: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT_ISO).to_string()
}

/// Inserts a diary entry and returns the stored row.
///
/// # Errors
///
/// Returns `DatabaseError::UnknownMember` if `member_id` does not reference an
/// existing member, or `DatabaseError::Sqlite` for any other failure.
pub fn insert_entry(
    conn: &Connection,
    member_id: &str,
    date: NaiveDate,
    detail: &str,
) -> AppResult<DiaryEntry> {
    debug!("Inserting diary entry for member {} on {}", member_id, date);

    let entry = conn
        .query_row(
            r#"
            INSERT INTO diary (member_id, date, detail)
            VALUES (?1, ?2, ?3)
            RETURNING id, member_id, date, detail, created_at
            "#,
            params![member_id, date_key(date), detail],
            row_to_entry,
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(ref err, _)
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                DatabaseError::UnknownMember(member_id.to_string())
            }
            _ => DatabaseError::Sqlite(e),
        })?;

    debug!("Diary entry inserted with id {}", entry.id);
    Ok(entry)
}

/// Lists the entries a member wrote on a date, ordered by id ascending.
///
/// Returns an empty vector when nothing matches; deciding whether that is an
/// error is left to the caller.
pub fn list_entries(
    conn: &Connection,
    date: NaiveDate,
    member_id: &str,
) -> AppResult<Vec<DiaryEntry>> {
    debug!("Listing diary entries for member {} on {}", member_id, date);

    let mut stmt = conn
        .prepare(
            r#"
            SELECT id, member_id, date, detail, created_at
            FROM diary
            WHERE date = ?1 AND member_id = ?2
            ORDER BY id ASC
            "#,
        )
        .map_err(DatabaseError::Sqlite)?;

    let entries = stmt
        .query_map(params![date_key(date), member_id], row_to_entry)
        .map_err(DatabaseError::Sqlite)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(DatabaseError::Sqlite)?;

    debug!("Found {} entries", entries.len());
    Ok(entries)
}

/// Deletes every entry a member wrote on a date.
///
/// Returns the number of rows removed, which may be zero.
pub fn delete_entries(conn: &Connection, date: NaiveDate, member_id: &str) -> AppResult<usize> {
    debug!("Deleting diary entries for member {} on {}", member_id, date);

    let rows_affected = conn
        .execute(
            "DELETE FROM diary WHERE date = ?1 AND member_id = ?2",
            params![date_key(date), member_id],
        )
        .map_err(DatabaseError::Sqlite)?;

    debug!("Deleted {} entries", rows_affected);
    Ok(rows_affected)
}

/// Counts all entries owned by a member.
#[cfg(test)]
pub fn count_entries(conn: &Connection, member_id: &str) -> AppResult<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM diary WHERE member_id = ?1",
        params![member_id],
        |row| row.get(0),
    )
    .map_err(|e| DatabaseError::Sqlite(e).into())
}
