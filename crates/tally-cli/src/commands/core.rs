//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `open_tracker` - Database plus the AI backend from the environment
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{AIClient, Database, Tracker};
use tracing::debug;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    debug!(path = path_str, encrypted = !no_encrypt, "Opening database");
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Open the database and wire it to the AI backend configured in the environment
pub fn open_tracker(db_path: &Path, no_encrypt: bool) -> Result<Tracker> {
    let db = open_db(db_path, no_encrypt)?;
    let ai = AIClient::from_env();
    if ai.is_none() {
        debug!("No AI backend configured; new transactions will be filed as Other");
    }
    Ok(Tracker::new(db, ai))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Migrations run on open
    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a transaction: tally add \"WHOLE FOODS\" -- -54.20");
    println!("  2. Set a budget: tally budgets set Groceries 400");
    println!("  3. Start web UI: tally serve");

    Ok(())
}
