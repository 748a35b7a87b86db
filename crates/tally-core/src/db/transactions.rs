//! Transaction operations

use rusqlite::{params, OptionalExtension, Row};

use super::{datetime_column, format_datetime, Database};
use crate::error::Result;
use crate::models::{Transaction, TransactionRecord};

const SELECT_COLUMNS: &str =
    "SELECT id, description, amount, category, notes, date, created_at FROM transactions";

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row.get(3)?,
        notes: row.get(4)?,
        date: datetime_column(row, 5)?,
        created_at: datetime_column(row, 6)?,
    })
}

impl Database {
    /// Insert a classified transaction and return it as stored
    pub fn insert_transaction(&self, record: &TransactionRecord) -> Result<Transaction> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO transactions (description, amount, category, notes, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                record.description,
                record.amount,
                record.category,
                record.notes,
                format_datetime(&record.date),
            ],
        )?;

        let id = conn.last_insert_rowid();
        let tx = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            params![id],
            row_to_transaction,
        )?;
        Ok(tx)
    }

    /// All transactions, newest first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY date DESC, id DESC", SELECT_COLUMNS))?;

        let transactions = stmt
            .query_map([], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Fetch one transaction by id
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let tx = conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_transaction,
            )
            .optional()?;
        Ok(tx)
    }

    /// Delete a transaction; returns false if no row had that id
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}
