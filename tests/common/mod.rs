//! Fixture builders shared by the integration tests.
//!
//! Writes `.npz` archives laid out the way `np.savez(path, all_cl=dict)`
//! does: a zip member `all_cl.npy` holding a 0-d object array whose payload
//! is a protocol 3 pickle of the dictionary.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Value stored under one `all_cl` key
#[derive(Debug, Clone)]
pub enum Entry {
    /// `np.array(values, dtype='<f8')`
    Array(Vec<f64>),

    /// Plain Python float
    Float(f64),

    /// Python `str`, such as a run label
    Text(String),

    /// The same array object already stored under another key
    SameAs(String),

    /// Python `None`
    Null,
}

/// Numpy module path used for the pickled globals
#[derive(Debug, Clone, Copy)]
pub enum NumpyPath {
    /// `numpy.core.multiarray` (numpy 1.x)
    V1,

    /// `numpy._core.multiarray` (numpy 2.x)
    V2,
}

impl NumpyPath {
    fn multiarray(self) -> &'static str {
        match self {
            NumpyPath::V1 => "numpy.core.multiarray",
            NumpyPath::V2 => "numpy._core.multiarray",
        }
    }
}

/// Items per `SETITEMS` batch, as in CPython's pickler
const BATCH_SIZE: usize = 1000;

/// Pickle emitter mirroring what CPython writes for numpy's dict of arrays
///
/// Every string, bytes buffer, tuple, global and reduced object is
/// memoized, and repeated globals or shared arrays are fetched back with
/// `BINGET`/`LONG_BINGET`.
struct PickleWriter {
    buf: Vec<u8>,
    next_memo: u32,
    path: NumpyPath,
    globals: HashMap<(String, String), u32>,
    f8_dtype_memo: Option<u32>,
    arrays: HashMap<String, u32>,
}

impl PickleWriter {
    fn new(path: NumpyPath) -> Self {
        Self {
            buf: vec![0x80, 3],
            next_memo: 0,
            path,
            globals: HashMap::new(),
            f8_dtype_memo: None,
            arrays: HashMap::new(),
        }
    }

    fn op(&mut self, op: u8) {
        self.buf.push(op);
    }

    /// `BINPUT` below 256, `LONG_BINPUT` above
    fn put(&mut self) -> u32 {
        let id = self.next_memo;
        self.next_memo += 1;
        match u8::try_from(id) {
            Ok(short) => self.buf.extend_from_slice(&[b'q', short]),
            Err(_) => {
                self.op(b'r');
                self.buf.extend_from_slice(&id.to_le_bytes());
            }
        }
        id
    }

    fn get(&mut self, id: u32) {
        match u8::try_from(id) {
            Ok(short) => self.buf.extend_from_slice(&[b'h', short]),
            Err(_) => {
                self.op(b'j');
                self.buf.extend_from_slice(&id.to_le_bytes());
            }
        }
    }

    fn global(&mut self, module: &str, name: &str) {
        let key = (module.to_string(), name.to_string());
        if let Some(&id) = self.globals.get(&key) {
            self.get(id);
            return;
        }
        self.op(b'c');
        self.buf.extend_from_slice(module.as_bytes());
        self.op(b'\n');
        self.buf.extend_from_slice(name.as_bytes());
        self.op(b'\n');
        let id = self.put();
        self.globals.insert(key, id);
    }

    fn text(&mut self, s: &str) {
        self.op(b'X');
        self.buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
        self.buf.extend_from_slice(s.as_bytes());
        self.put();
    }

    fn bytes(&mut self, b: &[u8]) {
        if b.len() < 256 {
            self.op(b'C');
            self.buf.push(b.len() as u8);
        } else {
            self.op(b'B');
            self.buf.extend_from_slice(&(b.len() as u32).to_le_bytes());
        }
        self.buf.extend_from_slice(b);
        self.put();
    }

    fn int(&mut self, i: i32) {
        self.op(b'J');
        self.buf.extend_from_slice(&i.to_le_bytes());
    }

    fn float(&mut self, f: f64) {
        self.op(b'G');
        self.buf.extend_from_slice(&f.to_be_bytes());
    }

    fn bool(&mut self, b: bool) {
        self.op(if b { 0x88 } else { 0x89 });
    }

    /// `TUPLE1`..`TUPLE3` opcode, memoized like any other tuple
    fn small_tuple(&mut self, len: u8) {
        self.op(0x84 + len);
        self.put();
    }

    /// Close a `MARK`-delimited tuple and memoize it
    fn mark_tuple(&mut self) {
        self.op(b't');
        self.put();
    }

    /// `dtype(descr, False, True)` followed by its `BUILD` state
    fn dtype(&mut self, descr: &str, byte_order: &str) -> u32 {
        self.global("numpy", "dtype");
        self.text(descr);
        self.bool(false);
        self.bool(true);
        self.small_tuple(3);
        self.op(b'R');
        let id = self.put();
        self.op(b'(');
        self.int(3);
        self.text(byte_order);
        self.op(b'N');
        self.op(b'N');
        self.op(b'N');
        self.int(-1);
        self.int(-1);
        self.int(0);
        self.mark_tuple();
        self.op(b'b');
        id
    }

    /// `_reconstruct(ndarray, (0,), b'b')`, left on the stack awaiting state
    fn reconstruct_header(&mut self) -> u32 {
        let module = self.path.multiarray();
        self.global(module, "_reconstruct");
        self.global("numpy", "ndarray");
        self.int(0);
        self.small_tuple(1);
        self.bytes(b"b");
        self.small_tuple(3);
        self.op(b'R');
        self.put()
    }

    fn f8_dtype(&mut self) {
        match self.f8_dtype_memo {
            Some(id) => self.get(id),
            None => {
                let id = self.dtype("f8", "<");
                self.f8_dtype_memo = Some(id);
            }
        }
    }

    fn f8_array(&mut self, values: &[f64]) -> u32 {
        let id = self.reconstruct_header();
        self.op(b'(');
        self.int(1);
        self.int(values.len() as i32);
        self.small_tuple(1);
        self.f8_dtype();
        self.bool(false);
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.bytes(&data);
        self.mark_tuple();
        self.op(b'b');
        id
    }

    fn entry(&mut self, key: &str, entry: &Entry) {
        match entry {
            Entry::Array(values) => {
                let id = self.f8_array(values);
                self.arrays.insert(key.to_string(), id);
            }
            Entry::Float(f) => self.float(*f),
            Entry::Text(s) => self.text(s),
            Entry::SameAs(other) => {
                let id = *self
                    .arrays
                    .get(other)
                    .unwrap_or_else(|| panic!("fixture has no array {} yet", other));
                self.get(id);
            }
            Entry::Null => self.op(b'N'),
        }
    }

    /// The dict wrapped in a 0-d object array
    fn object_array_of_dict(&mut self, entries: &[(String, Entry)]) {
        self.reconstruct_header();
        self.op(b'(');
        self.int(1);
        self.op(b')'); // EMPTY_TUPLE shape
        self.dtype("O8", "|");
        self.bool(false);

        self.op(b']');
        self.put();
        self.op(b'}');
        self.put();
        for batch in entries.chunks(BATCH_SIZE) {
            if let [(key, entry)] = batch {
                self.text(key);
                self.entry(key, entry);
                self.op(b's'); // SETITEM
                continue;
            }
            self.op(b'(');
            for (key, entry) in batch {
                self.text(key);
                self.entry(key, entry);
            }
            self.op(b'u'); // SETITEMS into the memoized dict
        }
        self.op(b'a'); // APPEND the dict to the memoized list

        self.mark_tuple();
        self.op(b'b');
    }

    fn finish(mut self) -> Vec<u8> {
        self.op(b'.');
        self.buf
    }

    fn memo_len(&self) -> u32 {
        self.next_memo
    }
}

/// Pickle bytes of `np.array(dict, dtype=object)`
pub fn pickle_all_cl(entries: &[(String, Entry)], path: NumpyPath) -> Vec<u8> {
    pickle_all_cl_with_memo(entries, path).0
}

/// Pickle bytes plus the number of memo slots the stream uses
pub fn pickle_all_cl_with_memo(entries: &[(String, Entry)], path: NumpyPath) -> (Vec<u8>, u32) {
    let mut writer = PickleWriter::new(path);
    writer.object_array_of_dict(entries);
    let memo = writer.memo_len();
    (writer.finish(), memo)
}

/// `.npy` v1.0 payload with the given header fields
pub fn npy_bytes(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({}), }}",
        descr, shape
    );
    // Magic (6) + version (2) + length (2) + header, padded to 64 bytes
    let unpadded = 10 + header.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = b"\x93NUMPY".to_vec();
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(payload);
    out
}

/// Write a zip archive with the given `(member name, bytes)` pairs
pub fn write_zip(path: &Path, members: &[(&str, Vec<u8>)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, bytes) in members {
        zip.start_file(*name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

/// Write an `.npz` archive holding `all_cl = entries`
pub fn write_all_cl(path: &Path, entries: &[(String, Entry)], numpy: NumpyPath) {
    let pickle = pickle_all_cl(entries, numpy);
    write_zip(path, &[("all_cl.npy", npy_bytes("|O", "", &pickle))]);
}

/// Every key required for `nbins` bins, each holding `[v, v + 1]`
///
/// Values are distinct per key so mismatched lookups show up in asserts.
/// Intrinsic-alignment keys are only added when `with_ia` is set.
pub fn full_entries(nbins: usize, with_ia: bool) -> Vec<(String, Entry)> {
    let mut keys: Vec<String> = ["ell1", "ell2", "tt", "ee", "te", "pp", "tp", "ep"]
        .iter()
        .map(|k| k.to_string())
        .collect();

    for b1 in 0..nbins {
        keys.push(format!("td{}", b1));
        for b2 in b1..nbins {
            keys.push(format!("d{}d{}", b1, b2));
            keys.push(format!("l{}l{}", b1, b2));
            if with_ia {
                keys.push(format!("i{}i{}", b1, b2));
            }
        }
        for b2 in 0..nbins {
            keys.push(format!("d{}l{}", b1, b2));
            if with_ia {
                keys.push(format!("d{}i{}", b1, b2));
                keys.push(format!("i{}l{}", b1, b2));
            }
        }
    }

    keys.into_iter()
        .enumerate()
        .map(|(i, key)| {
            let v = i as f64;
            (key, Entry::Array(vec![v, v + 1.0]))
        })
        .collect()
}

/// Value `[v, v + 1]` stored for `key` in `entries`
pub fn first_value(entries: &[(String, Entry)], key: &str) -> f64 {
    entries
        .iter()
        .find_map(|(k, e)| match e {
            Entry::Array(values) if k == key => Some(values[0]),
            _ => None,
        })
        .unwrap_or_else(|| panic!("fixture has no key {}", key))
}
