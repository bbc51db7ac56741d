//! Write, read, and delete diary entries.
//!
//! Each function is one request's worth of work: it takes what it needs by
//! reference, checks out at most one pooled connection, and keeps nothing
//! between calls.

use crate::ai::TextAugmenter;
use crate::constants::DATE_FORMAT_ISO;
use crate::db::entries::{self, DiaryEntry};
use crate::db::Database;
use crate::errors::{AppError, AppResult, DatabaseError};
use chrono::NaiveDate;
use tracing::{debug, info};

/// Parses an entry date in `YYYY-MM-DD` or `YYYYMMDD` form.
///
/// # Errors
///
/// Returns `AppError::Validation` for anything else.
pub fn parse_entry_date(raw: &str) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("date is required".to_string()));
    }

    NaiveDate::parse_from_str(raw, DATE_FORMAT_ISO)
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y%m%d"))
        .map_err(|_| {
            AppError::Validation(format!(
                "invalid date '{}': expected YYYY-MM-DD or YYYYMMDD",
                raw
            ))
        })
}

/// Joins the member's text and the emoji suffix with a single space.
pub fn compose_detail(text: &str, suffix: &str) -> String {
    format!("{} {}", text, suffix)
}

fn require_member_id(member_id: &str) -> AppResult<()> {
    if member_id.trim().is_empty() {
        return Err(AppError::Validation("member_id is required".to_string()));
    }
    Ok(())
}

/// Saves a diary entry decorated with emoji.
///
/// # Flow
///
/// 1. Validate the text and member id
/// 2. Ask the augmenter for an emoji suffix (no connection is held yet)
/// 3. Insert `"<text> <suffix>"` in a transaction and commit
/// 4. Return the stored entry
///
/// # Errors
///
/// Returns an error if:
/// - The text or member id is empty (nothing else is attempted)
/// - The augmenter fails (nothing is written)
/// - The member does not exist or the insert fails (the transaction is rolled back)
pub fn write_entry(
    db: &Database,
    augmenter: &dyn TextAugmenter,
    member_id: &str,
    text: &str,
    date: NaiveDate,
) -> AppResult<DiaryEntry> {
    require_member_id(member_id)?;
    if text.trim().is_empty() {
        return Err(AppError::Validation("detail must not be empty".to_string()));
    }

    info!("Writing diary entry for member {} on {}", member_id, date);

    let suffix = augmenter.suggest_emoji(text)?;
    debug!("Augmentation returned {} chars", suffix.chars().count());

    let detail = compose_detail(text, &suffix);
    let entry = db.with_transaction(|tx| entries::insert_entry(tx, member_id, date, &detail))?;

    info!("Saved diary entry {}", entry.id);
    Ok(entry)
}

/// Returns the entries a member wrote on a date, ordered by id.
///
/// # Errors
///
/// Returns `DatabaseError::NotFound` when nothing matches, which callers can
/// tell apart from a storage failure.
pub fn read_entries(db: &Database, member_id: &str, date: NaiveDate) -> AppResult<Vec<DiaryEntry>> {
    require_member_id(member_id)?;

    let conn = db.get_conn()?;
    let found = entries::list_entries(&conn, date, member_id)?;

    if found.is_empty() {
        return Err(DatabaseError::NotFound(format!(
            "no diary entries for member '{}' on {}",
            member_id, date
        ))
        .into());
    }

    debug!("Read {} entries for member {} on {}", found.len(), member_id, date);
    Ok(found)
}

/// Deletes every entry a member wrote on a date and returns how many went.
///
/// The affected-row count is checked before committing; when it is zero the
/// transaction is rolled back and `DatabaseError::NotFound` is returned.
pub fn delete_entries(db: &Database, member_id: &str, date: NaiveDate) -> AppResult<usize> {
    require_member_id(member_id)?;

    let removed = db.with_transaction(|tx| {
        let removed = entries::delete_entries(tx, date, member_id)?;
        if removed == 0 {
            return Err(DatabaseError::NotFound(format!(
                "no diary entries for member '{}' on {}",
                member_id, date
            ))
            .into());
        }
        Ok(removed)
    })?;

    info!("Deleted {} entries for member {} on {}", removed, member_id, date);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::members::insert_member;
    use crate::errors::AIError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct FixedAugmenter {
        suffix: &'static str,
        calls: AtomicUsize,
    }

    impl FixedAugmenter {
        fn new(suffix: &'static str) -> Self {
            Self {
                suffix,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextAugmenter for FixedAugmenter {
        fn suggest_emoji(&self, _text: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.suffix.to_string())
        }
    }

    struct FailingAugmenter;

    impl TextAugmenter for FailingAugmenter {
        fn suggest_emoji(&self, _text: &str) -> AppResult<String> {
            Err(AIError::RateLimited { attempts: 3 }.into())
        }
    }

    fn setup() -> (TempDir, Database) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::open(&temp_dir.path().join("diary.db")).unwrap();
        db.initialize_schema().unwrap();
        let conn = db.get_conn().unwrap();
        insert_member(&conn, "u1", "Kim", "hash", "kim@example.com").unwrap();
        insert_member(&conn, "u2", "Lee", "hash", "lee@example.com").unwrap();
        (temp_dir, db)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn count(db: &Database, member_id: &str) -> i64 {
        let conn = db.get_conn().unwrap();
        entries::count_entries(&conn, member_id).unwrap()
    }

    #[test]
    fn test_parse_entry_date() {
        assert_eq!(parse_entry_date("2024-05-01").unwrap(), day(1));
        assert_eq!(parse_entry_date(" 20240501 ").unwrap(), day(1));
        assert!(matches!(
            parse_entry_date("05/01/2024"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(parse_entry_date(""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_write_appends_suffix_with_single_space() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("😊🎉");

        let entry = write_entry(&db, &augmenter, "u1", "오늘 하루는 즐거웠다", day(1)).unwrap();

        assert_eq!(entry.detail, "오늘 하루는 즐거웠다 😊🎉");
        assert!(entry.detail.starts_with("오늘 하루는 즐거웠다"));
        assert!(entry.detail.ends_with("😊🎉"));
        assert_eq!(count(&db, "u1"), 1);

        let stored = read_entries(&db, "u1", day(1)).unwrap();
        assert_eq!(stored, vec![entry]);
    }

    #[test]
    fn test_write_rejects_empty_input_without_side_effects() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("😊");

        assert!(matches!(
            write_entry(&db, &augmenter, "u1", "   ", day(1)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            write_entry(&db, &augmenter, "", "hello", day(1)),
            Err(AppError::Validation(_))
        ));

        assert_eq!(augmenter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(count(&db, "u1"), 0);
    }

    #[test]
    fn test_augmentation_failure_writes_nothing() {
        let (_dir, db) = setup();

        let result = write_entry(&db, &FailingAugmenter, "u1", "stormy day", day(1));

        assert!(matches!(result, Err(AppError::AI(_))));
        assert_eq!(count(&db, "u1"), 0);
    }

    #[test]
    fn test_storage_failure_after_augmentation_rolls_back() {
        let (_dir, db) = setup();
        {
            let conn = db.get_conn().unwrap();
            conn.execute_batch(
                r#"
                CREATE TRIGGER fail_diary_insert AFTER INSERT ON diary
                BEGIN
                    SELECT RAISE(ABORT, 'disk full');
                END;
                "#,
            )
            .unwrap();
        }
        let augmenter = FixedAugmenter::new("😊");

        let result = write_entry(&db, &augmenter, "u1", "hello", day(1));

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::Sqlite(_)))
        ));
        assert_eq!(augmenter.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            read_entries(&db, "u1", day(1)),
            Err(AppError::Database(DatabaseError::NotFound(_)))
        ));
    }

    #[test]
    fn test_write_for_unknown_member() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("👻");

        let result = write_entry(&db, &augmenter, "ghost", "boo", day(1));

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::UnknownMember(_)))
        ));
        assert_eq!(count(&db, "ghost"), 0);
    }

    #[test]
    fn test_read_has_no_cross_member_leakage() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("🙂");
        let mine = write_entry(&db, &augmenter, "u1", "mine", day(1)).unwrap();
        write_entry(&db, &augmenter, "u2", "theirs", day(1)).unwrap();
        write_entry(&db, &augmenter, "u1", "other day", day(2)).unwrap();

        let found = read_entries(&db, "u1", day(1)).unwrap();

        assert_eq!(found, vec![mine]);
    }

    #[test]
    fn test_read_empty_is_not_found() {
        let (_dir, db) = setup();

        match read_entries(&db, "u1", day(1)) {
            Err(AppError::Database(err)) => assert!(err.is_not_found()),
            other => panic!("Expected not-found, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_removes_all_and_only_matches() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("🙂");
        write_entry(&db, &augmenter, "u1", "a", day(1)).unwrap();
        write_entry(&db, &augmenter, "u1", "b", day(1)).unwrap();
        write_entry(&db, &augmenter, "u1", "c", day(2)).unwrap();
        write_entry(&db, &augmenter, "u2", "d", day(1)).unwrap();

        assert_eq!(delete_entries(&db, "u1", day(1)).unwrap(), 2);

        assert!(read_entries(&db, "u1", day(1)).is_err());
        assert_eq!(read_entries(&db, "u1", day(2)).unwrap().len(), 1);
        assert_eq!(read_entries(&db, "u2", day(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_missing_is_not_found_and_store_unchanged() {
        let (_dir, db) = setup();
        let augmenter = FixedAugmenter::new("🙂");
        write_entry(&db, &augmenter, "u1", "a", day(1)).unwrap();

        let result = delete_entries(&db, "u1", day(9));

        assert!(matches!(
            result,
            Err(AppError::Database(DatabaseError::NotFound(_)))
        ));
        assert_eq!(count(&db, "u1"), 1);
    }
}
