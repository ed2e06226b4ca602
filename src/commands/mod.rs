//! CLI command implementations.
//!
//! Each command group is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod chains;
pub mod params;
pub mod spectra;

// Re-export main command functions
pub use chains::{
    execute_burn_in, execute_cut, execute_strip_comments, validate_cut_args, BurnInArgs, CutArgs,
};
pub use params::{execute_exclude, execute_headers, execute_latex, ExcludeArgs};
pub use spectra::{execute_spectra, validate_spectra_args, SpectraArgs};
