use thiserror::Error;

use crate::models::RecordId;

/// All errors that can occur in litscope-core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the CLI.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
}

impl CoreError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::RecordNotFound(_) => ExitCode::NotFound,
            Self::Validation(_) | Self::Config(_) | Self::TomlParse(_) => ExitCode::InvalidArgs,
            Self::Io(_) => ExitCode::FileSystemError,
            _ => ExitCode::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
