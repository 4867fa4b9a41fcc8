use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum StatsError {
    #[error("invalid taxonomy id: {0}")]
    InvalidTaxId(String),

    #[error("input not found: {0}")]
    InputNotFound(PathBuf),

    #[error("failed to read input: {0}")]
    Read(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("server returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config value: {0}")]
    InvalidConfig(String),

    #[error("header is missing required column: {0}")]
    MissingColumn(String),

    #[error("malformed species group {taxid}: {reason}")]
    #[diagnostic(help("buckets are only populated through GroupAggregator::ingest"))]
    MalformedGroup { taxid: u32, reason: String },

    #[error("failed to write output: {0}")]
    Write(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
