//! Cosette
//!
//! Helpers for cosmological parameter inference: reading binned angular
//! power spectra from numpy archives, parsing CLASS output headers,
//! naming and selecting fit parameters, and trimming MCMC chains.
//!
//! ## Getting Started
//!
//! ```no_run
//! let spectra = cosette::spectra::read_spectra(3, "cls.npz")?;
//! println!("{}", spectra.stats().summary());
//! # Ok::<(), cosette::utils::SpectraError>(())
//! ```
//!
//! The same operations are available from the `cosette` CLI:
//!
//! ```bash
//! cosette spectra --file cls.npz --nbins 3 --summary
//! cosette --help
//! ```

pub mod archive;
pub mod chains;
pub mod commands;
pub mod output;
pub mod params;
pub mod parser;
pub mod spectra;
pub mod utils;
