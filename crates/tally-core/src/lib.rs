//! Tally Core Library
//!
//! Shared functionality for the Tally personal finance tracker:
//! - Database access and migrations (transactions, budgets, audit log)
//! - Pluggable AI backends (Ollama, OpenAI-compatible, mock) behind one `generate` call
//! - Model router for task-based model selection and timeouts
//! - Prompt library for customizable AI prompts
//! - Transaction classifier with a fixed category set
//! - Spending aggregation and budget progress
//! - Budget suggestions and spending analysis

pub mod aggregate;
pub mod ai;
pub mod analysis;
pub mod budgets;
pub mod categories;
pub mod classifier;
pub mod db;
pub mod error;
pub mod export;
pub mod model_router;
pub mod models;
pub mod prompts;
pub mod suggest;
pub mod tracker;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OllamaBackend, OpenAICompatibleBackend, RouterInfo};
pub use analysis::SpendingAnalyst;
pub use categories::CategorySet;
pub use classifier::{Classification, Classifier};
pub use db::{AuditEntry, Database};
pub use models::*;
pub use error::{Error, Result};
pub use export::{ExportFormat, TransactionExportOptions};
pub use model_router::{ModelRouter, RouterConfig, TaskConfig, TaskType};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use suggest::BudgetAdvisor;
pub use tracker::{AnalysisScope, Tracker};
