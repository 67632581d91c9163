use common::PairsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no {column} column")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path} line {line}: {message}")]
    Parse {
        path: String,
        line: u64,
        message: String,
    },

    #[error(transparent)]
    Pairs(#[from] PairsError),
}
