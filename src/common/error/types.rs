//! Unified error types for the stronghelp library.
use thiserror::Error;

use crate::common::binary::BinaryError;
use crate::markup::MarkupError;

/// Main error type for stronghelp operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Read outside the archive buffer or otherwise undecodable bytes
    #[error("Binary error: {0}")]
    Binary(#[from] BinaryError),

    /// Buffer is neither a HELP image nor a supported container
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Corrupted or malformed archive structure
    #[error("Corrupted file: {0}")]
    CorruptedFile(String),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Page markup could not be converted
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Manual, page or entry not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unsupported feature
    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    /// Feature disabled at compile time
    #[error("Feature '{0}' is disabled. Enable it with --features {0}")]
    FeatureDisabled(String),
}

/// Result type for stronghelp operations.
pub type Result<T> = std::result::Result<T, Error>;
