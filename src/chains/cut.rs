//! Copy a fractional window of every chain into a new folder.

use super::{check_fraction, fraction_of, matching_files, read_lines, write_lines};
use crate::utils::config::{LOG_PARAM_FILE, PARAMNAMES_EXTENSION};
use crate::utils::error::ChainError;
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// One chain written by [`cut_files_by_percentage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutFile {
    pub source: PathBuf,
    pub output: PathBuf,

    /// First kept line (inclusive)
    pub start_line: usize,

    /// End of the kept window (exclusive)
    pub end_line: usize,
}

impl CutFile {
    pub fn kept_lines(&self) -> usize {
        self.end_line - self.start_line
    }
}

/// Summary of a cut run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutReport {
    pub output_folder: PathBuf,

    /// Side files copied unchanged
    pub copied: Vec<PathBuf>,

    /// Side files that were expected but absent
    pub missing: Vec<String>,

    pub files: Vec<CutFile>,
}

/// Default output folder: `<folder>_cut_<start>-<end>`
pub fn default_cut_folder(folder: &Path, start_frac: f64, end_frac: f64) -> PathBuf {
    let mut name = folder.as_os_str().to_os_string();
    name.push(format!("_cut_{:?}-{:?}", start_frac, end_frac));
    PathBuf::from(name)
}

/// Cut every `<prefix>_<n>.txt` chain to the window `[start_frac, end_frac)`
///
/// **Public** - main entry point for chain cutting
///
/// For a file of `total` lines, lines `floor(total * start_frac)` up to
/// (excluding) `floor(total * end_frac)` are written to
/// `output_folder/<prefix>_<n>.txt`. `<prefix>.paramnames` and `log.param`
/// are copied alongside when present. Chains are processed in numeric
/// order of `<n>`; files whose suffix is not a number are skipped.
///
/// # Arguments
/// * `folder` - Folder holding the chains
/// * `prefix` - Chain file prefix
/// * `start_frac` - Start of the kept window, within `[0, 1]`
/// * `end_frac` - End of the kept window, within `[start_frac, 1]`
/// * `output_folder` - Destination; defaults to [`default_cut_folder`]
///
/// # Errors
/// * `ChainError::InvalidFraction` - Fractions out of range or reversed
/// * `ChainError::Io` - Any read, copy or write failure
pub fn cut_files_by_percentage(
    folder: impl AsRef<Path>,
    prefix: &str,
    start_frac: f64,
    end_frac: f64,
    output_folder: Option<PathBuf>,
) -> Result<CutReport, ChainError> {
    let folder = folder.as_ref();
    check_fraction("start_frac", start_frac)?;
    check_fraction("end_frac", end_frac)?;
    if start_frac > end_frac {
        return Err(ChainError::InvalidFraction(format!(
            "start_frac {} is after end_frac {}",
            start_frac, end_frac
        )));
    }

    let output_folder =
        output_folder.unwrap_or_else(|| default_cut_folder(folder, start_frac, end_frac));
    fs::create_dir_all(&output_folder).map_err(|e| ChainError::io(&output_folder, e))?;

    let mut copied = Vec::new();
    let mut missing = Vec::new();
    for side_file in [format!("{}.{}", prefix, PARAMNAMES_EXTENSION), LOG_PARAM_FILE.to_string()] {
        let source = folder.join(&side_file);
        if source.is_file() {
            let dest = output_folder.join(&side_file);
            fs::copy(&source, &dest).map_err(|e| ChainError::io(&source, e))?;
            info!("Copied {}", side_file);
            copied.push(dest);
        } else {
            warn!("{} not found in {}", side_file, folder.display());
            missing.push(side_file);
        }
    }

    let mut numbered: Vec<(u64, String, PathBuf)> = Vec::new();
    for path in matching_files(folder, &format!("{}_*.txt", prefix))? {
        match chain_number(&path) {
            Some((n, label)) => numbered.push((n, label, path)),
            None => warn!("Skipping {}: no numeric chain index", path.display()),
        }
    }
    numbered.sort_by_key(|(n, _, _)| *n);

    let mut files = Vec::with_capacity(numbered.len());
    for (_, label, source) in numbered {
        let lines = read_lines(&source)?;
        let total = lines.len();
        let start_line = fraction_of(total, start_frac);
        let end_line = fraction_of(total, end_frac);

        let output = output_folder.join(format!("{}_{}.txt", prefix, label));
        write_lines(&output, &lines[start_line..end_line])?;

        info!(
            "Processed {}: kept lines {} to {} ({} lines)",
            source.display(),
            start_line,
            end_line,
            end_line - start_line
        );
        files.push(CutFile {
            source,
            output,
            start_line,
            end_line,
        });
    }

    Ok(CutReport {
        output_folder,
        copied,
        missing,
        files,
    })
}

/// Chain index from `<prefix>_<n>.txt`, with its original spelling
fn chain_number(path: &Path) -> Option<(u64, String)> {
    let stem = path.file_stem()?.to_str()?;
    let label = stem.rsplit('_').next()?;
    let n = label.parse::<u64>().ok()?;
    Some((n, label.to_string()))
}
