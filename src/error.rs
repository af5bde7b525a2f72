use std::path::PathBuf;

use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarvestError {
    #[error("source file {0} not found")]
    MissingInput(Utf8PathBuf),

    #[error("malformed source file: {0}")]
    SourceFormat(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("posts request failed: {0}")]
    Http(String),

    #[error("posts endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode posts response: {0}")]
    Decode(String),

    #[error("failed to write archive: {0}")]
    Archive(String),

    #[error("failed to store posts: {0}")]
    Persistence(String),
}

