//! Burn-in removal for chain files written as `<root>.<n>.txt`.

use super::{check_fraction, fraction_of, matching_files, read_lines, write_lines};
use crate::utils::error::ChainError;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Outcome for one rewritten chain file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnInReport {
    pub path: PathBuf,

    /// Sample lines before trimming (header excluded)
    pub samples_before: usize,

    /// Sample lines kept
    pub samples_after: usize,
}

/// Remove the burn-in phase from every `<root>.*.txt` file in `folder`
///
/// **Public** - main entry point for burn-in removal
///
/// The first line of each file is a header and is always kept. Of the `n`
/// remaining lines, the first `floor(n * burn_in)` are dropped. Files are
/// rewritten in place; empty files are skipped.
///
/// # Arguments
/// * `folder` - Folder holding the chains
/// * `root` - File root shared by the chains
/// * `burn_in` - Fraction of samples to drop, within `[0, 1]`
///
/// # Errors
/// * `ChainError::InvalidFraction` - `burn_in` outside `[0, 1]`
/// * `ChainError::Io` - Folder or file cannot be read or written
pub fn delete_burn_in(
    folder: impl AsRef<Path>,
    root: &str,
    burn_in: f64,
) -> Result<Vec<BurnInReport>, ChainError> {
    let folder = folder.as_ref();
    check_fraction("burn_in", burn_in)?;

    let files = matching_files(folder, &format!("{}.*.txt", root))?;
    if files.is_empty() {
        warn!("No chains matching {}.*.txt in {}", root, folder.display());
    }

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let lines = read_lines(&path)?;
        let Some((header, samples)) = lines.split_first() else {
            warn!("Skipping empty chain file: {}", path.display());
            continue;
        };

        let cut = fraction_of(samples.len(), burn_in);
        let mut kept = Vec::with_capacity(samples.len() - cut + 1);
        kept.push(header.as_str());
        kept.extend(samples[cut..].iter().map(String::as_str));
        write_lines(&path, &kept)?;

        info!(
            "Trimmed {}: dropped {} of {} samples",
            path.display(),
            cut,
            samples.len()
        );
        reports.push(BurnInReport {
            path,
            samples_before: samples.len(),
            samples_after: samples.len() - cut,
        });
    }

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_keeps_header_and_tail() {
        let dir = tempfile::tempdir().unwrap();
        let chain = dir.path().join("run.1.txt");
        fs::write(&chain, "# header\n1\n2\n3\n4\n").unwrap();

        let reports = delete_burn_in(dir.path(), "run", 0.5).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].samples_before, 4);
        assert_eq!(reports[0].samples_after, 2);
        assert_eq!(fs::read_to_string(&chain).unwrap(), "# header\n3\n4\n");
    }

    #[test]
    fn test_uses_given_folder_and_root_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.1.txt"), "h\n1\n2\n").unwrap();
        fs::write(dir.path().join("other.1.txt"), "h\n1\n2\n").unwrap();
        fs::write(dir.path().join("run.log"), "h\n1\n2\n").unwrap();

        let reports = delete_burn_in(dir.path(), "run", 0.5).unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("other.1.txt")).unwrap(),
            "h\n1\n2\n"
        );
    }

    #[test]
    fn test_empty_file_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.1.txt"), "").unwrap();

        let reports = delete_burn_in(dir.path(), "run", 0.3).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_invalid_fraction() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            delete_burn_in(dir.path(), "run", 1.2),
            Err(ChainError::InvalidFraction(_))
        ));
    }
}
