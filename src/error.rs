use std::path::PathBuf;
use thiserror::Error;

/// A single field could not be converted into its normalized form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot parse {field} from [{raw}]: {reason}")]
pub struct ParseError {
    pub field: String,
    pub raw: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(field: &str, raw: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Record-level problems found before or after field parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Expected {expected} fields but found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Unreadable row: {reason}")]
    Unreadable { reason: String },
}

/// The sink refused or failed a single insert.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Write failed: {message}")]
pub struct WriteError {
    pub message: String,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that abort a file or the whole run.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Cannot open input file '{path}': {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read input file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot reach sink: {message}")]
    Connection { message: String },

    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EtlError>;
