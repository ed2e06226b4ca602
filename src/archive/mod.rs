//! Reading numpy `.npz` archives produced by the upstream Cl pipeline.
//!
//! This module handles:
//! - Opening the zip container and parsing `.npy` members
//! - Decoding pickle streams of object arrays
//! - Rebuilding numpy arrays, scalars and dtypes as plain `f64` data

pub mod npz;
pub mod numpy;
pub mod pickle;

// Re-export main types
pub use npz::{parse_npy, NpyFile, NpyHeader, NpzArchive};
pub use numpy::{decode_array_dict, object_array_item, to_ndarray, Dtype, DtypeKind, NdArray};
pub use pickle::{unpickle, PyObject, PyValue};

use crate::utils::error::ArchiveError;
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;

/// Named arrays as stored in one pickled dictionary
pub type ArrayMap = BTreeMap<String, NdArray>;

/// Load the dictionary pickled as a 0-d object array under `key`
///
/// **Public** - main entry point for archive loading
///
/// Equivalent to `np.load(path, allow_pickle=True)[key].item()`.
///
/// # Errors
/// * `ArchiveError::Io` / `ArchiveError::Zip` - Unreadable archive
/// * `ArchiveError::MissingMember` - No member named `key`
/// * `ArchiveError::Pickle` / `ArchiveError::Unsupported` - Undecodable content
pub fn load_pickled_dict(path: impl AsRef<Path>, key: &str) -> Result<ArrayMap, ArchiveError> {
    let mut archive = NpzArchive::open(path)?;
    let member = archive.read(key)?;

    let value = member.to_pyvalue()?;
    let dict = object_array_item(&value)?;
    let arrays = decode_array_dict(dict)?;

    debug!(
        "Decoded {} arrays from '{}' in {}",
        arrays.len(),
        key,
        archive.path().display()
    );
    Ok(arrays)
}
