//! `.npz` container and `.npy` payload reader.
//!
//! An `.npz` file is a zip archive whose members are `.npy` files named
//! after the keyword they were saved under (`np.savez(path, all_cl=...)`
//! produces `all_cl.npy`).

use super::numpy::{shaped, Dtype, DtypeKind, NdArray};
use super::pickle::{unpickle, PyValue};
use crate::utils::config::NPY_MAGIC;
use crate::utils::error::ArchiveError;
use log::debug;
use regex::Regex;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// An opened `.npz` archive
pub struct NpzArchive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl NpzArchive {
    /// Open an archive for reading
    ///
    /// # Errors
    /// * `ArchiveError::Io` - File cannot be opened
    /// * `ArchiveError::Zip` - File is not a zip container
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        debug!("Opening archive: {}", path.display());

        let file = File::open(path)?;
        let zip = ZipArchive::new(BufReader::new(file))?;

        debug!("Archive holds {} members", zip.len());
        Ok(Self {
            path: path.to_path_buf(),
            zip,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keys stored in the archive (member names without `.npy`)
    pub fn keys(&self) -> Vec<String> {
        self.zip
            .file_names()
            .map(|name| name.strip_suffix(".npy").unwrap_or(name).to_string())
            .collect()
    }

    /// Read and parse the member stored under `key`
    ///
    /// # Errors
    /// * `ArchiveError::MissingMember` - No `<key>.npy` member
    /// * `ArchiveError::InvalidNpy` - Member is not a valid `.npy` payload
    pub fn read(&mut self, key: &str) -> Result<NpyFile, ArchiveError> {
        let member = format!("{}.npy", key);
        let mut entry = match self.zip.by_name(&member) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingMember(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        debug!("Read member {} ({} bytes)", member, bytes.len());

        parse_npy(&bytes)
    }
}

/// Header dictionary of a `.npy` payload
#[derive(Debug, Clone, PartialEq)]
pub struct NpyHeader {
    pub descr: String,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

/// A parsed `.npy` payload
#[derive(Debug, Clone)]
pub struct NpyFile {
    pub header: NpyHeader,
    pub data: Vec<u8>,
}

impl NpyFile {
    /// Whether the payload is a pickle stream rather than a raw buffer
    pub fn is_object(&self) -> bool {
        self.header
            .descr
            .trim_start_matches(['|', '<', '>', '='])
            .starts_with('O')
    }

    /// Unpickle an object array
    pub fn to_pyvalue(&self) -> Result<PyValue, ArchiveError> {
        if !self.is_object() {
            return Err(ArchiveError::Unsupported(format!(
                "dtype '{}' is not an object array",
                self.header.descr
            )));
        }
        unpickle(&self.data)
    }

    /// Decode a plain numeric array
    pub fn to_ndarray(&self) -> Result<NdArray, ArchiveError> {
        let dtype = Dtype::parse(&self.header.descr)?;
        if dtype.kind == DtypeKind::Object {
            return Err(ArchiveError::Unsupported(
                "object arrays must be unpickled".to_string(),
            ));
        }
        let count: usize = self.header.shape.iter().product();
        let needed = count * dtype.size;
        if self.data.len() < needed {
            return Err(ArchiveError::InvalidNpy(format!(
                "payload of {} bytes is shorter than {} needed",
                self.data.len(),
                needed
            )));
        }
        let values = dtype.decode(&self.data[..needed])?;
        shaped(self.header.shape.clone(), values, self.header.fortran_order)
    }
}

/// Parse a complete `.npy` byte stream
///
/// **Public** - also used directly on standalone `.npy` files
///
/// # Errors
/// * `ArchiveError::InvalidNpy` - Bad magic, unknown version, or malformed header
pub fn parse_npy(bytes: &[u8]) -> Result<NpyFile, ArchiveError> {
    let invalid = |msg: &str| ArchiveError::InvalidNpy(msg.to_string());

    if !bytes.starts_with(NPY_MAGIC) {
        return Err(invalid("missing \\x93NUMPY magic"));
    }
    let version_at = NPY_MAGIC.len();
    let major = *bytes.get(version_at).ok_or_else(|| invalid("truncated version"))?;

    // Version 1.x stores a u16 header length, 2.x and 3.x a u32
    let len_at = version_at + 2;
    let (header_len, header_at) = match major {
        1 => {
            let raw = bytes
                .get(len_at..len_at + 2)
                .ok_or_else(|| invalid("truncated header length"))?;
            (usize::from(u16::from_le_bytes([raw[0], raw[1]])), len_at + 2)
        }
        2 | 3 => {
            let raw = bytes
                .get(len_at..len_at + 4)
                .ok_or_else(|| invalid("truncated header length"))?;
            let len = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            (len as usize, len_at + 4)
        }
        other => {
            return Err(ArchiveError::InvalidNpy(format!(
                "unsupported format version {}",
                other
            )))
        }
    };

    let data_at = header_at + header_len;
    let header_bytes = bytes
        .get(header_at..data_at)
        .ok_or_else(|| invalid("truncated header"))?;
    let header_text = String::from_utf8_lossy(header_bytes);
    let header = parse_header_dict(&header_text)?;

    debug!(
        "npy header: descr={} fortran_order={} shape={:?}",
        header.descr, header.fortran_order, header.shape
    );

    Ok(NpyFile {
        header,
        data: bytes[data_at..].to_vec(),
    })
}

/// Parse the Python dict literal of a `.npy` header
fn parse_header_dict(text: &str) -> Result<NpyHeader, ArchiveError> {
    let field = |pattern: &str, name: &str| -> Result<String, ArchiveError> {
        let re = Regex::new(pattern)
            .map_err(|e| ArchiveError::InvalidNpy(format!("header pattern: {}", e)))?;
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ArchiveError::InvalidNpy(format!("header has no '{}' field", name)))
    };

    let descr = field(r#"['"]descr['"]\s*:\s*['"]([^'"]*)['"]"#, "descr")?;
    let fortran = field(r#"['"]fortran_order['"]\s*:\s*(True|False)"#, "fortran_order")?;
    let shape_text = field(r#"['"]shape['"]\s*:\s*\(([^)]*)\)"#, "shape")?;

    let shape = shape_text
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| ArchiveError::InvalidNpy(format!("bad dimension '{}'", dim)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NpyHeader {
        descr,
        fortran_order: fortran == "True",
        shape,
    })
}
