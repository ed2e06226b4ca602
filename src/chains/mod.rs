//! Trimming of Markov-chain text files.
//!
//! Chain files are plain text, one sample per line, optionally preceded by
//! `#` comment lines. All operations work on whole lines and keep their
//! original line endings.

pub mod burn_in;
pub mod comments;
pub mod cut;

// Re-export main functions
pub use burn_in::{delete_burn_in, BurnInReport};
pub use comments::delete_before_last_hash_line;
pub use cut::{cut_files_by_percentage, default_cut_folder, CutReport, CutFile};

use crate::utils::error::ChainError;
use globset::Glob;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a file as lines, each keeping its trailing newline
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>, ChainError> {
    let text = fs::read_to_string(path).map_err(|e| ChainError::io(path, e))?;
    Ok(text.split_inclusive('\n').map(str::to_string).collect())
}

/// Write lines back verbatim
pub(crate) fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> Result<(), ChainError> {
    let text: String = lines.iter().map(AsRef::as_ref).collect();
    fs::write(path, text).map_err(|e| ChainError::io(path, e))
}

/// Number of leading lines selected by `fraction` of `total` (rounded down)
pub(crate) fn fraction_of(total: usize, fraction: f64) -> usize {
    ((total as f64) * fraction).floor() as usize
}

/// Reject fractions outside `[0, 1]`
pub(crate) fn check_fraction(name: &str, fraction: f64) -> Result<(), ChainError> {
    if (0.0..=1.0).contains(&fraction) {
        Ok(())
    } else {
        Err(ChainError::InvalidFraction(format!(
            "{} must be within [0, 1], got {}",
            name, fraction
        )))
    }
}

/// Files directly inside `folder` whose name matches the glob `pattern`
///
/// Sorted by path for a stable processing order.
pub(crate) fn matching_files(folder: &Path, pattern: &str) -> Result<Vec<PathBuf>, ChainError> {
    let matcher = Glob::new(pattern)?.compile_matcher();

    let entries = fs::read_dir(folder).map_err(|e| ChainError::io(folder, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ChainError::io(folder, e))?;
        let path = entry.path();
        if path.is_file() && matcher.is_match(entry.file_name()) {
            files.push(path);
        }
    }
    files.sort();

    debug!(
        "{} files in {} match '{}'",
        files.len(),
        folder.display(),
        pattern
    );
    Ok(files)
}
