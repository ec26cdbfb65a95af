use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FlashError {
    #[error("invalid country code: {0}")]
    InvalidCountryCode(String),

    #[error("failed to read facts CSV at {0}")]
    CsvRead(PathBuf),

    #[error("failed to parse facts CSV: {0}")]
    CsvParse(String),

    #[error("missing config file at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to read document template at {0}")]
    TemplateRead(PathBuf),

    #[error("flag request failed: {0}")]
    FlagHttp(String),

    #[error("flag server returned status {status}: {message}")]
    FlagStatus { status: u16, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
