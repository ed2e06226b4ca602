//! Output file generation (JSON).

pub mod json;

// Re-export main functions
pub use json::{read_spectra_json, write_spectra_json, SpectraDump};
