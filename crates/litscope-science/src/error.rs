use litscope_core::{CoreError, ExitCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScienceError {
    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("store error: {0}")]
    Store(#[from] CoreError),
}

impl ScienceError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidDoi(_) | Self::Parse(_) | Self::UnsupportedFormat(_) => ExitCode::InvalidArgs,
            Self::Io(_) => ExitCode::FileSystemError,
            Self::Json(_) | Self::Csv(_) => ExitCode::GeneralError,
            Self::Store(err) => err.exit_code(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScienceError>;
