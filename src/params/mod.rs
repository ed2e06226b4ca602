//! Parameter naming and selection for fits.

pub mod exclude;
pub mod latex;

// Re-export main types and functions
pub use exclude::{exclude_nuisance, ExcludeFlags, Exclusion, ParamType, ParamsLists};
pub use latex::{latex_name, latex_pnames};
