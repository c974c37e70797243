use std::fmt;

use thiserror::Error;

/// Transaction step at which a batch insert failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Begin,
    Execute,
    Commit,
}

impl fmt::Display for BatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchStage::Begin => "starting transaction",
            BatchStage::Execute => "executing batch insert",
            BatchStage::Commit => "committing transaction",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error inserting batch {first}-{last}: error {stage}: {source}")]
    BatchInsert {
        first: usize,
        last: usize,
        stage: BatchStage,
        #[source]
        source: sqlx::Error,
    },

    #[error("Error {step}: {source}")]
    SeederWrite {
        step: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No items to generate seeder")]
    NoItems,

    #[error("Invalid column count: {0} (must be at least 1)")]
    InvalidColumnCount(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl AppError {
    pub(crate) fn seeder_write(step: impl Into<String>, source: std::io::Error) -> Self {
        AppError::SeederWrite {
            step: step.into(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
