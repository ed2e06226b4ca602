//! Spectra command implementation.
//!
//! The spectra command:
//! 1. Loads the `all_cl` dictionary from the archive
//! 2. Reshapes it by redshift bin
//! 3. Optionally writes a JSON dump and prints a summary

use crate::output::{write_spectra_json, SpectraDump};
use crate::spectra::read_spectra;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the spectra command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct SpectraArgs {
    /// Archive holding the pickled `all_cl` dictionary
    pub file: PathBuf,

    /// Number of redshift bins
    pub nbins: usize,

    /// Output path for the JSON dump (optional)
    pub output_json: Option<PathBuf>,

    /// Print entry counts to stdout
    pub print_summary: bool,
}

impl Default for SpectraArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::from("cls.npz"),
            nbins: 1,
            output_json: None,
            print_summary: false,
        }
    }
}

/// Execute the spectra command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Archive read or decode failures
/// * Missing spectra for the requested bin count
/// * JSON write errors
pub fn execute_spectra(args: SpectraArgs) -> Result<()> {
    let start_time = Instant::now();

    info!(
        "Reading {} bins of spectra from: {}",
        args.nbins,
        args.file.display()
    );

    // Step 1: Load and reshape
    info!("Step 1/2: Loading and reshaping spectra...");
    let spectra = read_spectra(args.nbins, &args.file)
        .with_context(|| format!("Failed to read spectra from {}", args.file.display()))?;

    let stats = spectra.stats();
    debug!("Spectra stats: {:?}", stats);

    // Step 2: Write outputs
    if let Some(output) = &args.output_json {
        info!("Step 2/2: Writing JSON dump...");
        let dump = SpectraDump::new(&args.file, spectra);
        write_spectra_json(&dump, output).context("Failed to write spectra JSON")?;
        info!("✓ Spectra written to: {}", output.display());
    } else {
        info!("Step 2/2: Skipping JSON dump (not requested)");
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("SPECTRA SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Archive:        {}", args.file.display());
        println!("Bins:           {}", stats.nbins);
        println!("CMB multipoles: {}", stats.cmb_multipoles);
        println!("LSS multipoles: {}", stats.lss_multipoles);
        println!("Triangle pairs: {}", stats.triangle_pairs);
        println!("Square pairs:   {}", stats.square_pairs);
        println!(
            "IA entries:     {} present, {} absent",
            stats.ia_present, stats.ia_missing
        );
        println!("{}", "=".repeat(80));
    } else {
        info!("{}", stats.summary());
    }

    info!(
        "Spectra completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Validate spectra arguments
///
/// **Public** - can be called before execute_spectra for early validation
pub fn validate_spectra_args(args: &SpectraArgs) -> Result<()> {
    if args.nbins == 0 {
        anyhow::bail!("nbins must be greater than 0");
    }

    if !args.file.exists() {
        anyhow::bail!("Archive not found: {}", args.file.display());
    }

    if let Some(output) = &args.output_json {
        if output.extension().and_then(|e| e.to_str()) != Some("json") {
            anyhow::bail!("Output file must have a .json extension");
        }
    }

    Ok(())
}
