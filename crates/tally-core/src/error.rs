//! Error types for Tally

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before any store or AI call
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The text-generation backend failed or is not configured
    #[error("AI service error: {0}")]
    Ai(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl Error {
    /// True for failures that came from the AI backend rather than from our own data
    pub fn is_ai_failure(&self) -> bool {
        matches!(self, Self::Ai(_) | Self::Http(_))
    }
}

impl From<rusqlite::Error> for Error {
    /// Row mappers wrap our own errors in a conversion failure; unwrap those
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(idx, ty, inner) => {
                match inner.downcast::<Error>() {
                    Ok(own) => *own,
                    Err(inner) => {
                        Error::Database(rusqlite::Error::FromSqlConversionFailure(idx, ty, inner))
                    }
                }
            }
            err => Error::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
