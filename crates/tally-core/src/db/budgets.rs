//! Budget operations

use rusqlite::{params, OptionalExtension, Row};

use super::{datetime_column, Database};
use crate::error::Result;
use crate::models::Budget;

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(0)?,
        category: row.get(1)?,
        amount: row.get(2)?,
        created_at: datetime_column(row, 3)?,
        updated_at: datetime_column(row, 4)?,
    })
}

impl Database {
    /// Create or overwrite the budget for a category in one statement
    ///
    /// Keyed on the UNIQUE category column, so there is no read-then-write
    /// window between concurrent callers. Callers validate the amount first.
    pub fn upsert_budget(&self, category: &str, amount: f64) -> Result<Budget> {
        let conn = self.conn()?;

        let budget = conn.query_row(
            r#"
            INSERT INTO budgets (category, amount)
            VALUES (?, ?)
            ON CONFLICT(category) DO UPDATE SET
                amount = excluded.amount,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id, category, amount, created_at, updated_at
            "#,
            params![category, amount],
            row_to_budget,
        )?;

        Ok(budget)
    }

    /// All budgets ordered by category name
    pub fn list_budgets(&self) -> Result<Vec<Budget>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, category, amount, created_at, updated_at FROM budgets ORDER BY category",
        )?;

        let budgets = stmt
            .query_map([], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    pub fn get_budget(&self, category: &str) -> Result<Option<Budget>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, category, amount, created_at, updated_at FROM budgets WHERE category = ?",
                params![category],
                row_to_budget,
            )
            .optional()?;
        Ok(budget)
    }
}
