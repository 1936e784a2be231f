use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListSiftError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error), // Converts io::Error into ListSiftError automatically

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] Box<figment::Error>),

    #[error("Invalid page size: {0} (must be greater than zero)")]
    InvalidPageSize(usize),

    #[error("Record is missing a string or numeric 'id' field")]
    MissingId,

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}
