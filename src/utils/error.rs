//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding an `.npz` archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid zip container: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Archive has no member named '{0}'")]
    MissingMember(String),

    #[error("Invalid .npy data: {0}")]
    InvalidNpy(String),

    #[error("Pickle decoding failed at byte {offset}: {message}")]
    Pickle { offset: usize, message: String },

    #[error("Unsupported value: {0}")]
    Unsupported(String),
}

impl ArchiveError {
    pub(crate) fn pickle(offset: usize, message: impl Into<String>) -> Self {
        ArchiveError::Pickle {
            offset,
            message: message.into(),
        }
    }
}

/// Errors that can occur while loading and reshaping binned spectra
#[derive(Error, Debug)]
pub enum SpectraError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Key not found in spectra archive: {0}")]
    KeyNotFound(String),

    #[error("Number of bins must be at least 1")]
    InvalidBinCount,

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Errors that can occur while reading CLASS output headers
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("No headers found in file: {0}")]
    NoHeaders(PathBuf),

    #[error("Invalid column pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading parameter lists
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Failed to read parameter lists: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter lists JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while trimming chain files
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("Invalid fraction: {0}")]
    InvalidFraction(String),
}

impl ChainError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChainError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
