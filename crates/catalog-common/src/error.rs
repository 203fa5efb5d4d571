//! Error types for catalog export

use thiserror::Error;

/// Result type alias for catalog export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for catalog export
///
/// Only failures that abort a run travel through this type. Per-leaf failures
/// are handled where they occur and never surface here.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl ExportError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn output(msg: impl Into<String>) -> Self {
        Self::Output(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExportError::config("bad timeout");
        assert_eq!(err.to_string(), "Configuration error: bad timeout");

        let err = ExportError::catalog("status 503");
        assert_eq!(err.to_string(), "Catalog error: status 503");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExportError = io.into();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
