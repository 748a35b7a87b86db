//! Tally CLI - Budgeting with AI categorization
//!
//! Usage:
//!   tally init                          Initialize database
//!   tally add "WHOLE FOODS" -- -54.20   Record a transaction
//!   tally budgets set Groceries 400     Set a monthly budget
//!   tally serve --port 3000             Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Add {
            description,
            amount,
            notes,
            date,
        } => {
            let tracker = commands::open_tracker(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &tracker,
                &description,
                amount,
                notes.as_deref(),
                date.as_deref(),
            )
            .await
            .map(|_| ())
        }
        Commands::Transactions { action } => {
            let tracker = commands::open_tracker(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&tracker, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&tracker, limit)
                }
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&tracker, id)
                }
            }
        }
        Commands::Budgets { action } => {
            let tracker = commands::open_tracker(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&tracker),
                Some(BudgetsAction::Set { category, amount }) => {
                    commands::cmd_budgets_set(&tracker, &category, amount)
                }
                Some(BudgetsAction::Suggest { category }) => {
                    commands::cmd_budgets_suggest(&tracker, &category).await
                }
                Some(BudgetsAction::Progress) => commands::cmd_budgets_progress(&tracker),
            }
        }
        Commands::Dashboard { json } => {
            let tracker = commands::open_tracker(&cli.db, cli.no_encrypt)?;
            commands::cmd_dashboard(&tracker, json)
        }
        Commands::Analyze { include_income } => {
            let tracker = commands::open_tracker(&cli.db, cli.no_encrypt)?;
            commands::cmd_analyze(&tracker, include_income).await
        }
        Commands::Categories => commands::cmd_categories(),
        Commands::Export {
            format,
            output,
            from,
            to,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(
                &db,
                &format,
                output.as_deref(),
                from.as_deref(),
                to.as_deref(),
            )
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt).await,
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
