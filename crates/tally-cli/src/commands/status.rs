//! Status command implementation

use std::path::Path;

use anyhow::Result;
use tally_core::db::DB_KEY_ENV;
use tally_core::{AIBackend, AIClient};

use super::open_db;

pub async fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!();
    println!("📊 Tally Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = std::fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Encryption
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                println!();
                println!("   Transactions: {}", db.count_transactions()?);
                println!("   Budgets: {}", db.list_budgets()?.len());
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {:#}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                }
            }
        }
    }

    // AI backend
    println!();
    match AIClient::from_env() {
        Some(client) => {
            let info = client.router_info();
            let health = if client.health_check().await {
                "✅ connected"
            } else {
                "⚠️  not responding"
            };
            println!("   AI backend: {} at {} ({})", client.kind(), client.host(), health);
            println!("   Default model: {}", info.default_model);
            if let Some(ref fallback) = info.fallback_model {
                println!("   Fallback model: {}", fallback);
            }
            for (task, model) in &info.task_models {
                println!("     - {}: {}", task, model);
            }
        }
        None => {
            println!("   AI backend: not configured");
            println!("   💡 Set OLLAMA_HOST (or AI_BACKEND=openai_compatible) for categorization and coaching");
        }
    }

    Ok(())
}
