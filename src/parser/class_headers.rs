//! Column headers of CLASS output tables.
//!
//! CLASS writes a block of `#` comment lines before the data; the last one
//! names the columns as `1:name 2:name ...`.

use crate::utils::error::HeaderError;
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

/// Read column names from the header block of a CLASS output file
///
/// **Public** - main entry point for header parsing
///
/// # Arguments
/// * `path` - CLASS output file
///
/// # Returns
/// Column names from the last `#` line, in file order
///
/// # Errors
/// * `HeaderError::FileNotFound` - `path` does not exist
/// * `HeaderError::NoHeaders` - The file does not start with a `#` line
/// * `HeaderError::Io` - Read failure
pub fn read_class_file_headers(path: impl AsRef<Path>) -> Result<Vec<String>, HeaderError> {
    let path = path.as_ref();
    debug!("Reading CLASS headers from: {}", path.display());

    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => HeaderError::FileNotFound(path.to_path_buf()),
        _ => HeaderError::Io(e),
    })?;

    let mut headers = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        match line.trim().strip_prefix('#') {
            Some(header) => headers.push(header.trim().to_string()),
            None => break,
        }
    }

    let last = headers
        .last()
        .ok_or_else(|| HeaderError::NoHeaders(path.to_path_buf()))?;

    debug!("Found {} header lines", headers.len());
    split_column_names(last)
}

/// Split a `1:x 2:y(z) ...` header line into column names
pub fn split_column_names(line: &str) -> Result<Vec<String>, HeaderError> {
    let numbered = Regex::new(r"\d+:")?;
    Ok(numbered
        .split(line)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect())
}
