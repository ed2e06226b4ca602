//! Cosette CLI
//!
//! Command-line helpers for cosmological parameter inference: binned
//! spectra archives, CLASS table headers, parameter lists and MCMC chains.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use cosette::commands::{
    execute_burn_in, execute_cut, execute_exclude, execute_headers, execute_latex,
    execute_spectra, execute_strip_comments, validate_spectra_args, BurnInArgs, CutArgs,
    ExcludeArgs, SpectraArgs,
};
use cosette::params::ExcludeFlags;
use cosette::utils::config::{DEFAULT_PARAMS_LISTS_FILE, SCHEMA_VERSION};

/// Cosette - helpers for cosmological parameter inference
#[derive(Parser, Debug)]
#[command(name = "cosette")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read binned spectra from an .npz archive
    Spectra {
        /// Archive holding the pickled all_cl dictionary
        #[arg(short, long)]
        file: PathBuf,

        /// Number of redshift bins
        #[arg(short, long)]
        nbins: usize,

        /// Output path for a JSON dump (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print entry counts to stdout
        #[arg(long)]
        summary: bool,
    },

    /// List the column names of a CLASS output table
    Headers {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print LaTeX labels for parameter names
    Latex {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Select the parameters to hold fixed in a fit
    Exclude {
        /// JSON file with the parameter lists
        #[arg(short, long, env = "COSETTE_PARAMS_FILE", default_value = DEFAULT_PARAMS_LISTS_FILE)]
        params_file: PathBuf,

        /// Exclude the nuisance parameters instead of the cosmological ones
        #[arg(long)]
        exclude_nuisance: bool,

        /// Keep tau free when excluding nuisance parameters
        #[arg(long)]
        no_tau: bool,

        /// Also exclude mnu when excluding nuisance parameters
        #[arg(long)]
        mnu: bool,

        /// Exclude everything except the shear bias parameters
        #[arg(long)]
        only_shear_bias: bool,

        /// Exclude the shear bias along with the cosmological parameters
        #[arg(long)]
        nuis_without_shear_bias: bool,
    },

    /// Remove the burn-in phase from <root>.*.txt chains
    BurnIn {
        #[arg(short, long)]
        folder: PathBuf,

        #[arg(short, long)]
        root: String,

        /// Fraction of samples to drop
        #[arg(long, default_value = "0.3")]
        fraction: f64,
    },

    /// Remove everything up to the last '#' line of a file
    StripComments {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Copy a fractional window of <prefix>_N.txt chains into a new folder
    Cut {
        #[arg(short, long)]
        folder: PathBuf,

        #[arg(short, long)]
        prefix: String,

        /// Start of the kept window, as a fraction
        #[arg(long, default_value = "0.0")]
        start: f64,

        /// End of the kept window, as a fraction
        #[arg(long, default_value = "1.0")]
        end: f64,

        /// Destination folder (defaults to <folder>_cut_<start>-<end>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Spectra {
            file,
            nbins,
            output,
            summary,
        } => {
            let args = SpectraArgs {
                file,
                nbins,
                output_json: output,
                print_summary: summary,
            };

            // Validate args first
            validate_spectra_args(&args)?;

            execute_spectra(args)?;
        }

        Commands::Headers { file } => {
            execute_headers(&file)?;
        }

        Commands::Latex { names } => {
            execute_latex(&names)?;
        }

        Commands::Exclude {
            params_file,
            exclude_nuisance,
            no_tau,
            mnu,
            only_shear_bias,
            nuis_without_shear_bias,
        } => {
            let flags = ExcludeFlags {
                excl_nuis: exclude_nuisance,
                tau: !no_tau,
                mnu,
                only_shear_bias,
                nuis_without_shear_bias,
            };
            execute_exclude(ExcludeArgs { params_file, flags })?;
        }

        Commands::BurnIn {
            folder,
            root,
            fraction,
        } => {
            execute_burn_in(BurnInArgs {
                folder,
                root,
                fraction,
            })?;
        }

        Commands::StripComments { file } => {
            execute_strip_comments(&file)?;
        }

        Commands::Cut {
            folder,
            prefix,
            start,
            end,
            output,
        } => {
            execute_cut(CutArgs {
                folder,
                prefix,
                start,
                end,
                output,
            })?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Cosette v{}", env!("CARGO_PKG_VERSION"));
    println!("Spectra JSON Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Helpers for cosmological parameter inference.");
}
