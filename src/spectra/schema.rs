//! Bin-indexed angular power spectra.
//!
//! Same-channel cross spectra (`dd`, `ll`, `ii`) are symmetric in the bin
//! pair, so only the upper triangle `bin2 >= bin1` is stored. Cross-channel
//! spectra (`dl`, `di`, `il`) are stored for the full square.

use crate::archive::NdArray;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One spectrum (or multipole array) as loaded from the archive
pub type Spectrum = NdArray;

/// Bin index -> value
pub type BinMap<T> = BTreeMap<usize, T>;

/// `bin1` -> `bin2` -> value
pub type PairMap<T> = BTreeMap<usize, BTreeMap<usize, T>>;

/// Tracer channel of a tomographic spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Density,
    Lensing,
    IntrinsicAlignment,
}

impl Channel {
    /// Single-letter prefix used in archive keys
    pub fn prefix(self) -> char {
        match self {
            Channel::Density => 'd',
            Channel::Lensing => 'l',
            Channel::IntrinsicAlignment => 'i',
        }
    }

    /// Archive key of the spectrum between `self` at `bin1` and `other` at `bin2`
    pub fn key(self, bin1: usize, other: Channel, bin2: usize) -> String {
        format!("{}{}{}{}", self.prefix(), bin1, other.prefix(), bin2)
    }
}

/// Reshaped spectra for a fixed number of redshift bins
///
/// Optional (intrinsic-alignment) entries are always present in their maps;
/// a spectrum missing from the archive is stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectraResult {
    /// Number of redshift bins the result was built for
    pub nbins: usize,

    /// CMB multipoles (`ell1`)
    pub l: Spectrum,

    /// LSS multipoles (`ell2`)
    pub lls: Spectrum,

    pub tt: Spectrum,
    pub ee: Spectrum,
    pub te: Spectrum,
    pub pp: Spectrum,
    pub tp: Spectrum,
    pub ep: Spectrum,

    /// Temperature x density per bin
    pub td: BinMap<Spectrum>,

    pub dd_auto: BinMap<Spectrum>,
    pub ll_auto: BinMap<Spectrum>,
    pub ii_auto: BinMap<Option<Spectrum>>,

    /// Upper triangle only
    pub dd: PairMap<Spectrum>,
    /// Upper triangle only
    pub ll: PairMap<Spectrum>,
    /// Upper triangle only
    pub ii: PairMap<Option<Spectrum>>,

    /// Full square
    pub dl: PairMap<Spectrum>,
    /// Full square
    pub di: PairMap<Option<Spectrum>>,
    /// Full square
    pub il: PairMap<Option<Spectrum>>,
}

impl SpectraResult {
    /// Same-channel spectrum for an unordered bin pair
    ///
    /// Looks up the stored upper-triangle entry, so `(1, 0)` returns `(0, 1)`.
    pub fn symmetric<T>(map: &PairMap<T>, bin1: usize, bin2: usize) -> Option<&T> {
        let (lo, hi) = if bin1 <= bin2 { (bin1, bin2) } else { (bin2, bin1) };
        map.get(&lo).and_then(|row| row.get(&hi))
    }

    /// Counts of stored and missing entries
    pub fn stats(&self) -> SpectraStats {
        let pairs = |map: &PairMap<Spectrum>| map.values().map(BTreeMap::len).sum::<usize>();
        let optional_pairs = |map: &PairMap<Option<Spectrum>>| {
            map.values()
                .flat_map(BTreeMap::values)
                .fold((0, 0), |(present, missing), entry| match entry {
                    Some(_) => (present + 1, missing),
                    None => (present, missing + 1),
                })
        };

        let (auto_present, auto_missing) =
            self.ii_auto
                .values()
                .fold((0, 0), |(present, missing), entry| match entry {
                    Some(_) => (present + 1, missing),
                    None => (present, missing + 1),
                });
        let (ii_present, ii_missing) = optional_pairs(&self.ii);
        let (di_present, di_missing) = optional_pairs(&self.di);
        let (il_present, il_missing) = optional_pairs(&self.il);

        SpectraStats {
            nbins: self.nbins,
            cmb_multipoles: self.l.len(),
            lss_multipoles: self.lls.len(),
            triangle_pairs: pairs(&self.dd),
            square_pairs: pairs(&self.dl),
            ia_present: auto_present + ii_present + di_present + il_present,
            ia_missing: auto_missing + ii_missing + di_missing + il_missing,
        }
    }
}

/// Entry counts of a [`SpectraResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpectraStats {
    pub nbins: usize,
    pub cmb_multipoles: usize,
    pub lss_multipoles: usize,

    /// Entries per same-channel map, `nbins * (nbins + 1) / 2`
    pub triangle_pairs: usize,

    /// Entries per cross-channel map, `nbins * nbins`
    pub square_pairs: usize,

    /// Intrinsic-alignment entries found in the archive
    pub ia_present: usize,

    /// Intrinsic-alignment entries stored as absent
    pub ia_missing: usize,
}

impl SpectraStats {
    /// Format as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "{} bins, {} CMB / {} LSS multipoles, {} triangle + {} square pairs, IA {} present / {} missing",
            self.nbins,
            self.cmb_multipoles,
            self.lss_multipoles,
            self.triangle_pairs,
            self.square_pairs,
            self.ia_present,
            self.ia_missing
        )
    }
}
