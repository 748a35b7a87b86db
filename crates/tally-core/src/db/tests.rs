//! Database tests

use super::*;
use crate::models::TransactionRecord;
use chrono::{Duration, TimeZone};

fn record(description: &str, amount: f64, category: &str) -> TransactionRecord {
    TransactionRecord {
        category: category.to_string(),
        ..TransactionRecord::unclassified(description, amount)
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_transactions().unwrap().is_empty());
    assert!(db.list_budgets().unwrap().is_empty());
    assert!(!db.is_encrypted().unwrap());
}

#[test]
fn test_schema_has_unique_budget_category() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let unique: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_index_list('budgets') WHERE \"unique\" = 1",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(unique, 1);
}

#[test]
fn test_insert_and_get_transaction() {
    let db = Database::in_memory().unwrap();
    let date = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 0).unwrap();

    let tx = db
        .insert_transaction(&TransactionRecord {
            notes: "team lunch".to_string(),
            date,
            ..record("Chipotle", -18.25, "Food & Dining")
        })
        .unwrap();

    assert!(tx.id > 0);
    assert_eq!(tx.description, "Chipotle");
    assert_eq!(tx.amount, -18.25);
    assert_eq!(tx.category, "Food & Dining");
    assert_eq!(tx.notes, "team lunch");
    assert_eq!(tx.date, date);

    let fetched = db.get_transaction(tx.id).unwrap().unwrap();
    assert_eq!(fetched, tx);
    assert!(db.get_transaction(tx.id + 100).unwrap().is_none());
}

#[test]
fn test_list_newest_first() {
    let db = Database::in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();

    for (i, name) in ["oldest", "middle", "newest"].iter().enumerate() {
        db.insert_transaction(&TransactionRecord {
            date: now + Duration::days(i as i64),
            ..record(name, -1.0, "Other")
        })
        .unwrap();
    }

    let names: Vec<String> = db
        .list_transactions()
        .unwrap()
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(names, vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_insert_list_delete_round_trip() {
    let db = Database::in_memory().unwrap();
    db.insert_transaction(&record("Rent", -1500.0, "Housing & Utilities"))
        .unwrap();
    let before = db.list_transactions().unwrap();

    let tx = db.insert_transaction(&record("Salary", 3000.0, "Income")).unwrap();
    assert_eq!(db.count_transactions().unwrap(), 2);
    assert!(db.list_transactions().unwrap().iter().any(|t| t.id == tx.id));

    assert!(db.delete_transaction(tx.id).unwrap());
    assert_eq!(db.list_transactions().unwrap(), before);
}

#[test]
fn test_delete_missing_transaction() {
    let db = Database::in_memory().unwrap();
    assert!(!db.delete_transaction(42).unwrap());
}

#[test]
fn test_upsert_budget_creates_then_updates() {
    let db = Database::in_memory().unwrap();

    let created = db.upsert_budget("Groceries", 400.0).unwrap();
    assert_eq!(created.amount, 400.0);

    let updated = db.upsert_budget("Groceries", 325.5).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.amount, 325.5);
    assert_eq!(updated.created_at, created.created_at);

    let budgets = db.list_budgets().unwrap();
    assert_eq!(budgets.len(), 1);
    assert_eq!(db.get_budget("Groceries").unwrap().unwrap().amount, 325.5);
    assert!(db.get_budget("Travel").unwrap().is_none());
}

#[test]
fn test_budgets_ordered_by_category() {
    let db = Database::in_memory().unwrap();
    db.upsert_budget("Shopping", 100.0).unwrap();
    db.upsert_budget("Entertainment", 50.0).unwrap();
    db.upsert_budget("Groceries", 300.0).unwrap();

    let names: Vec<String> = db
        .list_budgets()
        .unwrap()
        .into_iter()
        .map(|b| b.category)
        .collect();
    assert_eq!(names, vec!["Entertainment", "Groceries", "Shopping"]);
}

#[test]
fn test_negative_budget_rejected_by_schema() {
    let db = Database::in_memory().unwrap();
    assert!(db.upsert_budget("Groceries", -1.0).is_err());
    assert!(db.list_budgets().unwrap().is_empty());
}

#[test]
fn test_concurrent_upserts_keep_one_row() {
    let db = Database::in_memory().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let db = db.clone();
            std::thread::spawn(move || db.upsert_budget("Shopping", i as f64 * 10.0))
        })
        .collect();

    // Busy errors are acceptable under contention; duplicates are not
    let written: Vec<f64> = handles
        .into_iter()
        .filter_map(|handle| handle.join().unwrap().ok())
        .map(|budget| budget.amount)
        .collect();
    assert!(!written.is_empty());

    let budgets = db.list_budgets().unwrap();
    assert_eq!(budgets.len(), 1);
    // Last writer wins, and it must be one of the successful writes
    assert!(written.contains(&budgets[0].amount));
}

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();

    db.log_audit("api-key-1", "create_transaction", Some("transaction"), Some(7), None)
        .unwrap();
    db.log_audit("api-key-1", "set_budget", Some("budget"), None, Some("Groceries=300"))
        .unwrap();

    let entries = db.list_audit_log(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "set_budget");
    assert_eq!(entries[0].details.as_deref(), Some("Groceries=300"));
    assert_eq!(entries[1].entity_id, Some(7));

    assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
}

#[test]
fn test_derive_key_is_stable() {
    let a = derive_key("correct horse").unwrap();
    let b = derive_key("correct horse").unwrap();
    let c = derive_key("battery staple").unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.len(), 64);
}

#[test]
fn test_datetime_round_trip() {
    let dt = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
    assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    assert_eq!(format_datetime(&dt), "2023-12-31 23:59:59");
}

#[test]
fn test_subsecond_date_is_kept() {
    let db = Database::in_memory().unwrap();
    let date = Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0).unwrap() + Duration::milliseconds(250);

    let stored = db
        .insert_transaction(&TransactionRecord {
            date,
            ..record("Coffee", -4.5, "Dining")
        })
        .unwrap();
    assert_eq!(stored.date, date);
    assert_eq!(db.list_transactions().unwrap()[0].date, date);
}

#[test]
fn test_unparsable_stored_timestamp_is_invalid_data() {
    assert!(matches!(parse_datetime("yesterday"), Err(Error::InvalidData(_))));

    let db = Database::in_memory().unwrap();
    db.insert_transaction(&record("Coffee", -4.5, "Dining")).unwrap();
    db.conn()
        .unwrap()
        .execute("UPDATE transactions SET date = 'not a date'", [])
        .unwrap();

    let err = db.list_transactions().unwrap_err();
    assert!(matches!(err, Error::InvalidData(_)), "got {:?}", err);
}
