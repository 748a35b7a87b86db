//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Track spending, set budgets, get AI coaching
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Self-hosted budgeting with AI categorization", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tally.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TALLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record a transaction (category is assigned automatically)
    Add {
        /// What the money was for, e.g. "WHOLE FOODS MARKET"
        description: String,

        /// Signed amount: negative for expenses, positive for income
        #[arg(allow_hyphen_values = true)]
        amount: f64,

        /// Free-form notes
        #[arg(short, long)]
        notes: Option<String>,

        /// Transaction date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// List or delete transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage budgets
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Show spending by category and income vs. expenses
    Dashboard {
        /// Print the raw dashboard data as JSON
        #[arg(long)]
        json: bool,
    },

    /// Get AI coaching on your spending
    Analyze {
        /// Include income transactions in the analysis
        #[arg(long)]
        include_income: bool,
    },

    /// List the spending categories
    Categories,

    /// Export transactions
    Export {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date filter (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date filter (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show database and AI backend status
    Status,

    /// Manage AI prompts
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires a Bearer key from TALLY_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Permanently delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List all budgets
    List,

    /// Create or replace the budget for a category
    Set {
        /// Category name, e.g. "Groceries"
        category: String,

        /// Monthly budget amount
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },

    /// Ask the AI backend for a budget suggestion
    Suggest {
        /// Category name
        category: String,
    },

    /// Show spending against each budget
    Progress,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., classify_transaction, suggest_budget)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
