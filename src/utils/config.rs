//! Configuration and constants for the library and CLI.

/// Current JSON dump schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Top-level archive entry holding the pickled spectra dictionary
pub const ALL_CL_KEY: &str = "all_cl";

/// Magic prefix of every `.npy` payload
pub const NPY_MAGIC: &[u8] = b"\x93NUMPY";

// Multipole arrays of the CMB and LSS spectra
pub const ELL_CMB_KEY: &str = "ell1";
pub const ELL_LSS_KEY: &str = "ell2";

/// `b{i}`, `bM{i}` and `m{i}` get LaTeX labels for `i` below this bound
pub const LATEX_INDEXED_LIMIT: u32 = 14;

/// Default location of the cosmological/nuisance parameter lists
pub const DEFAULT_PARAMS_LISTS_FILE: &str = "params_lists.json";

// Side files that travel with a MontePython-style chain folder
pub const LOG_PARAM_FILE: &str = "log.param";
pub const PARAMNAMES_EXTENSION: &str = "paramnames";
