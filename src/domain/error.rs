use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    /// Hard precondition violated by the caller's input (e.g. fewer than two columns).
    InputError(String),
    /// Upload body was empty.
    MissingUpload,
    /// Upload body exceeded the configured size limit.
    PayloadTooLarge { limit_mb: u64 },
    ParseError(String),
    ConfigError(String),
    LLMError(String),
    StorageError(String),
    LedgerError(String),
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::InputError(msg) => write!(f, "Input error: {}", msg),
            AppError::MissingUpload => write!(f, "Input error: no file uploaded"),
            AppError::PayloadTooLarge { limit_mb } => {
                write!(f, "File too large (limit {} MB)", limit_mb)
            }
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Blob store error: {}", msg),
            AppError::LedgerError(msg) => write!(f, "Ledger error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Message without the category prefix that `Display` adds
    pub fn detail(&self) -> String {
        match self {
            AppError::Internal(msg)
            | AppError::InputError(msg)
            | AppError::ParseError(msg)
            | AppError::ConfigError(msg)
            | AppError::LLMError(msg)
            | AppError::StorageError(msg)
            | AppError::LedgerError(msg)
            | AppError::IoError(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status the interface layer answers with when this error escapes a handler.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InputError(_) | AppError::ParseError(_) => 400,
            AppError::MissingUpload => 422,
            AppError::PayloadTooLarge { .. } => 413,
            AppError::LLMError(_) | AppError::LedgerError(_) => 502,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InputError("x".into()).status_code(), 400);
        assert_eq!(AppError::MissingUpload.status_code(), 422);
        assert_eq!(AppError::PayloadTooLarge { limit_mb: 20 }.status_code(), 413);
        assert_eq!(AppError::StorageError("x".into()).status_code(), 500);
    }

    #[test]
    fn test_detail_drops_prefix() {
        let err = AppError::LedgerError("no_blob_hash".into());
        assert_eq!(err.detail(), "no_blob_hash");
        assert_eq!(
            AppError::PayloadTooLarge { limit_mb: 1 }.detail(),
            "File too large (limit 1 MB)"
        );
    }

    #[test]
    fn test_display_prefixes() {
        let err = AppError::InputError("Data must have at least 2 columns.".into());
        assert_eq!(
            err.to_string(),
            "Input error: Data must have at least 2 columns."
        );
    }
}
