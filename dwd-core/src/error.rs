use std::path::PathBuf;

use thiserror::Error;

/// Broad failure category of a [`DwdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reference file could not be opened or read.
    Io,
    /// Reference file contains malformed rows or fields.
    Parse,
    /// Request construction or transport failure, including non-success statuses.
    Network,
    /// Malformed JSON or date string in a forecast response.
    Decode,
    /// Well-formed response without any forecast entries.
    Semantic,
    /// Operation called on a session that was never initialized.
    Precondition,
}

#[derive(Debug, Error)]
pub enum DwdError {
    #[error("Failed to read station file '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed station file")]
    Csv(#[from] csv::Error),

    #[error("Row {row}: invalid {column} value '{value}': {reason}")]
    InvalidField {
        row: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    #[error("Forecast request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to parse forecast JSON")]
    Json(#[from] serde_json::Error),

    #[error("Invalid forecast date '{value}'")]
    InvalidDate {
        value: String,
        #[source]
        source: Option<chrono::ParseError>,
    },

    #[error("answer didn't contain forecast entries")]
    NoForecastEntries,

    #[error("Session is not initialized; call `Session::init` first")]
    NotInitialized,
}

impl DwdError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DwdError::Io { .. } => ErrorKind::Io,
            DwdError::Csv(err) if err.is_io_error() => ErrorKind::Io,
            DwdError::Csv(_) | DwdError::InvalidField { .. } => ErrorKind::Parse,
            DwdError::Http(_) | DwdError::Status { .. } | DwdError::InvalidHeader(_) => {
                ErrorKind::Network
            }
            DwdError::Json(_) | DwdError::InvalidDate { .. } => ErrorKind::Decode,
            DwdError::NoForecastEntries => ErrorKind::Semantic,
            DwdError::NotInitialized => ErrorKind::Precondition,
        }
    }
}
