//! Binned angular power spectra.
//!
//! Loads the flat `all_cl` dictionary written by the spectra pipeline and
//! reorganises it by redshift bin and tracer channel.

pub mod reader;
pub mod schema;

// Re-export main types
pub use reader::{read_spectra, reshape_spectra};
pub use schema::{BinMap, Channel, PairMap, SpectraResult, SpectraStats, Spectrum};
