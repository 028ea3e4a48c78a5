//! Error types for mealdedup library.

use std::io;
use thiserror::Error;

/// Result type alias for mealdedup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mealdedup library.
///
/// The deduplication engine itself never fails on its input; these errors
/// come from option validation, file I/O and the apply step's store.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// An option value is out of range.
    #[error("Invalid option {name} = {value}: {reason}")]
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The backing store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// A meal id was referenced that the store does not know.
    #[error("Unknown meal id: {0}")]
    UnknownMeal(u64),

    /// Transaction protocol misuse (nested begin, commit without begin, ...).
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
