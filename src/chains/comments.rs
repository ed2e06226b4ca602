//! Strip the leading comment block of a chain file.

use super::{read_lines, write_lines};
use crate::utils::error::ChainError;
use log::{debug, info};
use std::path::Path;

/// Remove every line up to and including the last `#` line
///
/// **Public** - used on chains that carry a run log before the samples
///
/// A line counts as a comment when it starts with `#` after leading
/// whitespace. Files without any comment line are left untouched.
///
/// # Returns
/// `true` if the file was rewritten
///
/// # Errors
/// * `ChainError::Io` - File cannot be read or written
pub fn delete_before_last_hash_line(path: impl AsRef<Path>) -> Result<bool, ChainError> {
    let path = path.as_ref();
    let lines = read_lines(path)?;

    let Some(last_hash) = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with('#'))
    else {
        debug!("No comment lines in {}", path.display());
        return Ok(false);
    };

    write_lines(path, &lines[last_hash + 1..])?;
    info!(
        "Removed {} leading lines from {}",
        last_hash + 1,
        path.display()
    );
    Ok(true)
}
