//! Transaction export (CSV and JSON)

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Budget, Transaction};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(Error::Validation(format!(
                "Unknown export format '{}' (expected csv or json)",
                other
            ))),
        }
    }
}

/// Options for transaction export
#[derive(Debug, Clone, Default)]
pub struct TransactionExportOptions {
    /// Start date filter (inclusive)
    pub from: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub to: Option<NaiveDate>,
}

impl TransactionExportOptions {
    fn includes(&self, tx: &Transaction) -> bool {
        let day = tx.date.date_naive();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

/// One CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    category: &'a str,
    notes: &'a str,
}

/// Everything in the database, for JSON export
#[derive(Debug, Serialize)]
pub struct JsonExport {
    pub exported_at: chrono::DateTime<chrono::Utc>,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
}

impl Database {
    /// Transactions matching the options, newest first
    pub fn export_transactions(&self, opts: &TransactionExportOptions) -> Result<Vec<Transaction>> {
        Ok(self
            .list_transactions()?
            .into_iter()
            .filter(|tx| opts.includes(tx))
            .collect())
    }

    /// Export transactions to CSV format
    pub fn export_transactions_csv(&self, opts: &TransactionExportOptions) -> Result<String> {
        let transactions = self.export_transactions(opts)?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        for tx in &transactions {
            writer.serialize(CsvRow {
                date: tx.date.format("%Y-%m-%d").to_string(),
                description: &tx.description,
                amount: format!("{:.2}", tx.amount),
                category: &tx.category,
                notes: &tx.notes,
            })?;
        }

        // The header row only appears once a record is serialized
        if transactions.is_empty() {
            writer.write_record(["date", "description", "amount", "category", "notes"])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::InvalidData(format!("Failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
    }

    /// Export transactions and budgets as pretty-printed JSON
    pub fn export_json(&self, opts: &TransactionExportOptions) -> Result<String> {
        let export = JsonExport {
            exported_at: chrono::Utc::now(),
            transactions: self.export_transactions(opts)?,
            budgets: self.list_budgets()?,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Export in the requested format
    pub fn export(&self, format: ExportFormat, opts: &TransactionExportOptions) -> Result<String> {
        match format {
            ExportFormat::Csv => self.export_transactions_csv(opts),
            ExportFormat::Json => self.export_json(opts),
        }
    }
}
