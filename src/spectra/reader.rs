//! Load the `all_cl` dictionary and reshape it by redshift bin.

use super::schema::{BinMap, PairMap, SpectraResult, Spectrum};
use crate::archive::{load_pickled_dict, ArrayMap};
use crate::utils::config::{ALL_CL_KEY, ELL_CMB_KEY, ELL_LSS_KEY};
use crate::utils::error::{ArchiveError, SpectraError};
use log::{debug, info};
use std::io::ErrorKind;
use std::path::Path;

use super::schema::Channel::{Density as D, IntrinsicAlignment as I, Lensing as L};

/// Read binned spectra from an `.npz` archive
///
/// **Public** - main entry point for spectra loading
///
/// # Arguments
/// * `nbins` - Number of redshift bins (at least 1)
/// * `path` - Archive holding the pickled `all_cl` dictionary
///
/// # Returns
/// The reshaped spectra; intrinsic-alignment entries absent from the
/// archive are stored as `None`
///
/// # Errors
/// * `SpectraError::FileNotFound` - `path` does not exist
/// * `SpectraError::KeyNotFound` - `all_cl` or a required spectrum is missing
/// * `SpectraError::InvalidBinCount` - `nbins` is 0
/// * `SpectraError::Archive` - Archive cannot be decoded
pub fn read_spectra(nbins: usize, path: impl AsRef<Path>) -> Result<SpectraResult, SpectraError> {
    let path = path.as_ref();
    info!("Reading spectra for {} bins from: {}", nbins, path.display());

    if nbins == 0 {
        return Err(SpectraError::InvalidBinCount);
    }

    let all_cl = load_pickled_dict(path, ALL_CL_KEY).map_err(|e| match e {
        ArchiveError::Io(io) if io.kind() == ErrorKind::NotFound => {
            SpectraError::FileNotFound(path.to_path_buf())
        }
        ArchiveError::MissingMember(key) => SpectraError::KeyNotFound(key),
        other => SpectraError::Archive(other),
    })?;

    reshape_spectra(nbins, &all_cl)
}

/// Reshape an already loaded flat dictionary
///
/// **Public** - lets callers reuse one decoded archive for several bin counts
///
/// # Errors
/// * `SpectraError::KeyNotFound` - A required spectrum is missing
/// * `SpectraError::InvalidBinCount` - `nbins` is 0
pub fn reshape_spectra(nbins: usize, all_cl: &ArrayMap) -> Result<SpectraResult, SpectraError> {
    if nbins == 0 {
        return Err(SpectraError::InvalidBinCount);
    }
    debug!("Reshaping {} arrays into {} bins", all_cl.len(), nbins);

    let cl = Lookup { all_cl };

    let l = cl.required(ELL_CMB_KEY)?;
    let lls = cl.required(ELL_LSS_KEY)?;
    let tt = cl.required("tt")?;
    let ee = cl.required("ee")?;
    let te = cl.required("te")?;
    let pp = cl.required("pp")?;
    let tp = cl.required("tp")?;
    let ep = cl.required("ep")?;

    let mut td = BinMap::new();
    let mut dd_auto = BinMap::new();
    let mut ll_auto = BinMap::new();
    let mut ii_auto = BinMap::new();
    let mut dd = PairMap::new();
    let mut ll = PairMap::new();
    let mut ii = PairMap::new();
    let mut dl = PairMap::new();
    let mut di = PairMap::new();
    let mut il = PairMap::new();

    for bin1 in 0..nbins {
        td.insert(bin1, cl.required(&format!("td{}", bin1))?);
        dd_auto.insert(bin1, cl.required(&D.key(bin1, D, bin1))?);
        ll_auto.insert(bin1, cl.required(&L.key(bin1, L, bin1))?);
        ii_auto.insert(bin1, cl.optional(&I.key(bin1, I, bin1)));

        let dd_row: &mut BinMap<Spectrum> = dd.entry(bin1).or_default();
        let ll_row: &mut BinMap<Spectrum> = ll.entry(bin1).or_default();
        let ii_row: &mut BinMap<Option<Spectrum>> = ii.entry(bin1).or_default();
        for bin2 in bin1..nbins {
            dd_row.insert(bin2, cl.required(&D.key(bin1, D, bin2))?);
            ll_row.insert(bin2, cl.required(&L.key(bin1, L, bin2))?);
            ii_row.insert(bin2, cl.optional(&I.key(bin1, I, bin2)));
        }

        let dl_row: &mut BinMap<Spectrum> = dl.entry(bin1).or_default();
        let di_row: &mut BinMap<Option<Spectrum>> = di.entry(bin1).or_default();
        let il_row: &mut BinMap<Option<Spectrum>> = il.entry(bin1).or_default();
        for bin2 in 0..nbins {
            dl_row.insert(bin2, cl.required(&D.key(bin1, L, bin2))?);
            di_row.insert(bin2, cl.optional(&D.key(bin1, I, bin2)));
            il_row.insert(bin2, cl.optional(&I.key(bin1, L, bin2)));
        }
    }

    let result = SpectraResult {
        nbins,
        l,
        lls,
        tt,
        ee,
        te,
        pp,
        tp,
        ep,
        td,
        dd_auto,
        ll_auto,
        ii_auto,
        dd,
        ll,
        ii,
        dl,
        di,
        il,
    };

    let stats = result.stats();
    if stats.ia_missing > 0 {
        info!(
            "{} intrinsic-alignment spectra not in archive, stored as absent",
            stats.ia_missing
        );
    }
    debug!("Spectra reshaped: {}", stats.summary());

    Ok(result)
}

/// Key lookups over the flat dictionary
struct Lookup<'a> {
    all_cl: &'a ArrayMap,
}

impl Lookup<'_> {
    fn required(&self, key: &str) -> Result<Spectrum, SpectraError> {
        self.all_cl
            .get(key)
            .cloned()
            .ok_or_else(|| SpectraError::KeyNotFound(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<Spectrum> {
        let found = self.all_cl.get(key).cloned();
        if found.is_none() {
            debug!("Optional spectrum '{}' absent", key);
        }
        found
    }
}
