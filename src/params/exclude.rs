//! Choose which parameters to hold fixed in a fit.
//!
//! The parameter groups come from a JSON file of the form:
//!
//! ```json
//! {
//!   "cosmo": ["om", "ob", "h", "ns", "sigma8"],
//!   "nuisance": ["aIA", "eIA", "b0", "m0"],
//!   "all_but_shear_bias": ["om", "ob", "aIA", "b0"],
//!   "shear_bias": ["m0"]
//! }
//! ```

use crate::utils::error::ParamsError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Named parameter groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsLists {
    pub cosmo: Vec<String>,
    pub nuisance: Vec<String>,
    pub all_but_shear_bias: Vec<String>,
    pub shear_bias: Vec<String>,
}

impl ParamsLists {
    /// Load parameter groups from a JSON file
    ///
    /// # Errors
    /// * `ParamsError::Io` - File cannot be opened
    /// * `ParamsError::Json` - File is not a valid parameter-lists document
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        debug!("Loading parameter lists from: {}", path.display());

        let file = File::open(path)?;
        let lists: ParamsLists = serde_json::from_reader(BufReader::new(file))?;

        debug!(
            "Loaded {} cosmological and {} nuisance parameters",
            lists.cosmo.len(),
            lists.nuisance.len()
        );
        Ok(lists)
    }
}

/// Which group the fit still varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Cosmo,
    Nuisance,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Cosmo => write!(f, "cosmo"),
            ParamType::Nuisance => write!(f, "nuisance"),
        }
    }
}

/// Flags controlling [`exclude_nuisance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludeFlags {
    /// Exclude the nuisance parameters (otherwise the cosmological ones)
    pub excl_nuis: bool,

    /// Also exclude `tau` when excluding nuisance parameters
    pub tau: bool,

    /// Also exclude `mnu` when excluding nuisance parameters
    pub mnu: bool,

    /// Exclude everything except the shear bias parameters
    pub only_shear_bias: bool,

    /// Exclude the shear bias parameters along with the cosmological ones
    pub nuis_without_shear_bias: bool,
}

impl Default for ExcludeFlags {
    fn default() -> Self {
        Self {
            excl_nuis: false,
            tau: true,
            mnu: false,
            only_shear_bias: false,
            nuis_without_shear_bias: false,
        }
    }
}

/// Parameters to exclude and the group left free
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub exclude: Vec<String>,
    pub partype: ParamType,
}

/// Select the parameters to exclude from a fit
///
/// **Public** - main entry point for parameter selection
///
/// `only_shear_bias` takes precedence over `excl_nuis`. The input lists
/// are not modified.
pub fn exclude_nuisance(lists: &ParamsLists, flags: ExcludeFlags) -> Exclusion {
    let exclusion = if flags.only_shear_bias {
        Exclusion {
            exclude: lists.all_but_shear_bias.clone(),
            partype: ParamType::Nuisance,
        }
    } else if flags.excl_nuis {
        let mut exclude = Vec::with_capacity(lists.nuisance.len() + 2);
        if flags.tau {
            exclude.push("tau".to_string());
        }
        if flags.mnu {
            exclude.push("mnu".to_string());
        }
        exclude.extend(lists.nuisance.iter().cloned());
        Exclusion {
            exclude,
            partype: ParamType::Cosmo,
        }
    } else {
        let mut exclude = lists.cosmo.clone();
        if flags.nuis_without_shear_bias {
            exclude.extend(lists.shear_bias.iter().cloned());
        }
        Exclusion {
            exclude,
            partype: ParamType::Nuisance,
        }
    };

    debug!(
        "Excluding {} parameters, fitting {}",
        exclusion.exclude.len(),
        exclusion.partype
    );
    exclusion
}
