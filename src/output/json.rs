//! JSON spectra dump writer.
//!
//! Writes reshaped spectra to JSON files with proper formatting.

use crate::spectra::SpectraResult;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Top-level structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectraDump {
    /// Schema version for compatibility checking
    pub version: String,

    /// Archive the spectra were read from
    pub source: String,

    pub spectra: SpectraResult,
}

impl SpectraDump {
    pub fn new(source: impl AsRef<Path>, spectra: SpectraResult) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            source: source.as_ref().display().to_string(),
            spectra,
        }
    }
}

/// Write a spectra dump to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `dump` - Spectra and provenance to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_spectra_json(
    dump: &SpectraDump,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing spectra to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, dump).map_err(OutputError::SerializationFailed)?;

    info!(
        "Spectra written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Read a spectra dump back from a JSON file
///
/// **Public** - lets downstream tools skip the archive decode
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_spectra_json(input_path: impl AsRef<Path>) -> Result<SpectraDump, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading spectra dump from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let dump: SpectraDump =
        serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)?;

    debug!(
        "Spectra dump loaded: version {}, {} bins",
        dump.version, dump.spectra.nbins
    );

    Ok(dump)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
