//! Chain trimming commands.

use crate::chains::{cut_files_by_percentage, delete_before_last_hash_line, delete_burn_in};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

/// Arguments for the burn-in command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct BurnInArgs {
    pub folder: PathBuf,
    pub root: String,

    /// Fraction of samples to drop
    pub fraction: f64,
}

/// Arguments for the cut command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CutArgs {
    pub folder: PathBuf,
    pub prefix: String,
    pub start: f64,
    pub end: f64,

    /// Destination folder (defaults next to `folder`)
    pub output: Option<PathBuf>,
}

impl Default for CutArgs {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("chains"),
            prefix: String::new(),
            start: 0.0,
            end: 1.0,
            output: None,
        }
    }
}

/// Execute the burn-in command
///
/// **Public** - main entry point called from main.rs
pub fn execute_burn_in(args: BurnInArgs) -> Result<()> {
    if !args.folder.is_dir() {
        anyhow::bail!("Chain folder not found: {}", args.folder.display());
    }
    if args.root.is_empty() {
        anyhow::bail!("Chain root cannot be empty");
    }

    let reports = delete_burn_in(&args.folder, &args.root, args.fraction)
        .with_context(|| format!("Failed to remove burn-in in {}", args.folder.display()))?;

    let dropped: usize = reports
        .iter()
        .map(|r| r.samples_before - r.samples_after)
        .sum();
    info!(
        "✓ Trimmed {} chains, {} samples dropped",
        reports.len(),
        dropped
    );
    Ok(())
}

/// Execute the strip-comments command
///
/// **Public** - main entry point called from main.rs
pub fn execute_strip_comments(file: &Path) -> Result<()> {
    let rewritten = delete_before_last_hash_line(file)
        .with_context(|| format!("Failed to strip comments from {}", file.display()))?;

    if rewritten {
        info!("✓ Comment block removed from: {}", file.display());
    } else {
        info!("No comment block in: {}", file.display());
    }
    Ok(())
}

/// Execute the cut command
///
/// **Public** - main entry point called from main.rs
pub fn execute_cut(args: CutArgs) -> Result<()> {
    validate_cut_args(&args)?;

    let report = cut_files_by_percentage(
        &args.folder,
        &args.prefix,
        args.start,
        args.end,
        args.output,
    )
    .with_context(|| format!("Failed to cut chains in {}", args.folder.display()))?;

    info!(
        "✓ {} chains written to: {}",
        report.files.len(),
        report.output_folder.display()
    );
    Ok(())
}

/// Validate cut arguments
///
/// **Public** - can be called before execute_cut for early validation
pub fn validate_cut_args(args: &CutArgs) -> Result<()> {
    if args.prefix.is_empty() {
        anyhow::bail!("Chain prefix cannot be empty");
    }

    if !args.folder.is_dir() {
        anyhow::bail!("Chain folder not found: {}", args.folder.display());
    }

    if args.start > args.end {
        anyhow::bail!("start ({}) must not exceed end ({})", args.start, args.end);
    }

    Ok(())
}
