//! Interpretation of pickled numpy objects.
//!
//! Turns the opaque [`PyObject`]s produced by the pickle decoder back into
//! plain numeric arrays. Covers what `np.save(..., allow_pickle=True)`
//! writes for dictionaries of arrays:
//! - `ndarray` via `_reconstruct` + `BUILD` state (protocols 2-4)
//! - `ndarray` via `_frombuffer` (protocol 5)
//! - numpy scalars via `scalar`
//! - `dtype` objects, including their byte order from `BUILD` state
//!
//! Both numpy 1.x (`numpy.core.*`) and 2.x (`numpy._core.*`) module paths
//! are accepted since only the callable name is inspected.

use super::pickle::{PyObject, PyValue};
use crate::utils::error::ArchiveError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dense numeric array in C (row-major) order, widened to `f64`
///
/// Scalars have an empty shape and a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdArray {
    pub shape: Vec<usize>,
    #[serde(with = "float_values")]
    pub values: Vec<f64>,
}

/// JSON has no NaN or infinity, so those are written as `"NaN"`, `"inf"`
/// and `"-inf"` and read back from the same labels
mod float_values {
    use serde::de::Error;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum JsonFloat {
        Number(f64),
        Label(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            match value {
                v if v.is_nan() => seq.serialize_element("NaN")?,
                v if *v == f64::INFINITY => seq.serialize_element("inf")?,
                v if *v == f64::NEG_INFINITY => seq.serialize_element("-inf")?,
                v => seq.serialize_element(v)?,
            }
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<JsonFloat>::deserialize(deserializer)?
            .into_iter()
            .map(|value| match value {
                JsonFloat::Number(v) => Ok(v),
                JsonFloat::Label(label) => match label.as_str() {
                    "NaN" => Ok(f64::NAN),
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    other => Err(D::Error::custom(format!("'{}' is not a number", other))),
                },
            })
            .collect()
    }
}

impl NdArray {
    /// 1-d array from values
    pub fn from_vec(values: Vec<f64>) -> Self {
        Self {
            shape: vec![values.len()],
            values,
        }
    }

    /// 0-d array holding one value
    pub fn scalar(value: f64) -> Self {
        Self {
            shape: Vec::new(),
            values: vec![value],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }
}

/// Read a fixed-width number from a chunk of exactly its size
macro_rules! endian {
    ($ty:ty, $chunk:expr, $little:expr) => {{
        let mut raw = [0u8; std::mem::size_of::<$ty>()];
        raw.copy_from_slice($chunk);
        if $little {
            <$ty>::from_le_bytes(raw)
        } else {
            <$ty>::from_be_bytes(raw)
        }
    }};
}

/// Element kind of a numpy dtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeKind {
    Bool,
    Int,
    UInt,
    Float,
    Object,
}

/// The subset of numpy dtypes we can widen to `f64`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dtype {
    pub kind: DtypeKind,
    pub size: usize,
    pub little_endian: bool,
}

impl Dtype {
    /// Parse an array-protocol type string such as `<f8`, `|b1`, `i4` or `|O`
    pub fn parse(descr: &str) -> Result<Self, ArchiveError> {
        let unsupported = || ArchiveError::Unsupported(format!("dtype '{}'", descr));

        let (little_endian, rest) = match descr.chars().next() {
            Some('>') | Some('!') => (false, &descr[1..]),
            Some('<') | Some('|') => (true, &descr[1..]),
            Some('=') => (cfg!(target_endian = "little"), &descr[1..]),
            _ => (cfg!(target_endian = "little"), descr),
        };

        let mut chars = rest.chars();
        let kind_char = chars.next().ok_or_else(unsupported)?;
        let digits = chars.as_str();

        let kind = match kind_char {
            'b' | '?' => DtypeKind::Bool,
            'i' => DtypeKind::Int,
            'u' => DtypeKind::UInt,
            'f' => DtypeKind::Float,
            'O' => DtypeKind::Object,
            _ => return Err(unsupported()),
        };

        let size = if digits.is_empty() {
            match kind {
                DtypeKind::Bool => 1,
                DtypeKind::Object => 8,
                _ => return Err(unsupported()),
            }
        } else {
            digits.parse::<usize>().map_err(|_| unsupported())?
        };

        let valid = match kind {
            DtypeKind::Bool => size == 1,
            DtypeKind::Int | DtypeKind::UInt => matches!(size, 1 | 2 | 4 | 8),
            DtypeKind::Float => matches!(size, 4 | 8),
            DtypeKind::Object => true,
        };
        if !valid {
            return Err(unsupported());
        }

        Ok(Self {
            kind,
            size,
            little_endian,
        })
    }

    /// Rebuild a dtype from its pickled `numpy.dtype(descr, align, copy)` form
    ///
    /// The `BUILD` state tuple carries the byte order as its second item.
    pub fn from_pickled(value: &PyValue) -> Result<Self, ArchiveError> {
        let obj = value
            .as_object()
            .filter(|obj| obj.class_name() == Some("dtype"))
            .ok_or_else(|| {
                ArchiveError::Unsupported(format!("expected a dtype, found {}", value.type_name()))
            })?;

        let descr = obj
            .args
            .as_sequence()
            .and_then(|args| args.first())
            .and_then(PyValue::as_str)
            .ok_or_else(|| ArchiveError::Unsupported("dtype without a type string".to_string()))?;

        let mut dtype = Self::parse(descr)?;

        let byte_order = obj
            .state
            .as_ref()
            .and_then(PyValue::as_sequence)
            .and_then(|state| state.get(1))
            .and_then(PyValue::as_str);

        match byte_order {
            Some(">") => dtype.little_endian = false,
            Some("<") => dtype.little_endian = true,
            _ => {}
        }

        Ok(dtype)
    }

    /// Decode a raw buffer of this dtype into `f64` values
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, ArchiveError> {
        if bytes.len() % self.size != 0 {
            return Err(ArchiveError::InvalidNpy(format!(
                "buffer of {} bytes is not a multiple of item size {}",
                bytes.len(),
                self.size
            )));
        }

        let convert: fn(&[u8], bool) -> f64 = match (self.kind, self.size) {
            (DtypeKind::Bool, _) => |c, _| f64::from(u8::from(c[0] != 0)),
            (DtypeKind::Int, 1) => |c, _| f64::from(c[0] as i8),
            (DtypeKind::Int, 2) => |c, le| f64::from(endian!(i16, c, le)),
            (DtypeKind::Int, 4) => |c, le| f64::from(endian!(i32, c, le)),
            (DtypeKind::Int, _) => |c, le| endian!(i64, c, le) as f64,
            (DtypeKind::UInt, 1) => |c, _| f64::from(c[0]),
            (DtypeKind::UInt, 2) => |c, le| f64::from(endian!(u16, c, le)),
            (DtypeKind::UInt, 4) => |c, le| f64::from(endian!(u32, c, le)),
            (DtypeKind::UInt, _) => |c, le| endian!(u64, c, le) as f64,
            (DtypeKind::Float, 4) => |c, le| f64::from(endian!(f32, c, le)),
            (DtypeKind::Float, _) => |c, le| endian!(f64, c, le),
            (DtypeKind::Object, _) => {
                return Err(ArchiveError::Unsupported(
                    "object dtype has no raw buffer".to_string(),
                ))
            }
        };

        Ok(bytes
            .chunks_exact(self.size)
            .map(|chunk| convert(chunk, self.little_endian))
            .collect())
    }
}

/// Convert a decoded Python value into a numeric array
///
/// **Public** - used for every entry of the spectra dictionary
///
/// Accepts Python numbers, flat lists/tuples of numbers, numpy scalars
/// and numeric ndarrays.
pub fn to_ndarray(value: &PyValue) -> Result<NdArray, ArchiveError> {
    match value {
        PyValue::Int(_) | PyValue::Float(_) | PyValue::Bool(_) => {
            Ok(NdArray::scalar(as_number(value)?))
        }
        PyValue::List(items) | PyValue::Tuple(items) => {
            let values = items.iter().map(as_number).collect::<Result<Vec<_>, _>>()?;
            Ok(NdArray::from_vec(values))
        }
        PyValue::Object(obj) => match obj.class_name() {
            Some("_reconstruct") => reconstructed_array(obj),
            Some("_frombuffer") => frombuffer_array(obj),
            Some("scalar") => numpy_scalar(obj),
            _ => Err(ArchiveError::Unsupported(format!(
                "object of class {}.{}",
                obj.class_module().unwrap_or("?"),
                obj.class_name().unwrap_or("?")
            ))),
        },
        other => Err(ArchiveError::Unsupported(format!(
            "{} is not numeric",
            other.type_name()
        ))),
    }
}

/// Return the single item of a pickled 0-d object array (`arr.item()`)
///
/// A bare value that is not an ndarray is returned unchanged.
pub fn object_array_item(value: &PyValue) -> Result<&PyValue, ArchiveError> {
    let obj = match value.as_object() {
        Some(obj) if obj.class_name() == Some("_reconstruct") => obj,
        _ => return Ok(value),
    };

    let state = ArrayState::from_object(obj)?;
    match state.data {
        PyValue::List(items) if items.len() == 1 => Ok(&items[0]),
        PyValue::List(items) => Err(ArchiveError::Unsupported(format!(
            "object array with {} items where one was expected",
            items.len()
        ))),
        other => Err(ArchiveError::Unsupported(format!(
            "expected an object array, found {} data",
            other.type_name()
        ))),
    }
}

/// Decode a pickled `dict[str, array]` into named arrays
///
/// Entries whose value is `None` or not numeric (labels, nested dicts) are
/// skipped with a warning, so they read as absent keys.
pub fn decode_array_dict(value: &PyValue) -> Result<BTreeMap<String, NdArray>, ArchiveError> {
    let entries = match value {
        PyValue::Dict(entries) => entries,
        other => {
            return Err(ArchiveError::Unsupported(format!(
                "expected a dict, found {}",
                other.type_name()
            )))
        }
    };

    let mut arrays = BTreeMap::new();
    for (key, item) in entries {
        let name = match key {
            PyValue::Str(s) => s.clone(),
            PyValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            other => {
                return Err(ArchiveError::Unsupported(format!(
                    "dict key of type {}",
                    other.type_name()
                )))
            }
        };
        if *item == PyValue::None {
            continue;
        }
        match to_ndarray(item) {
            Ok(array) => {
                arrays.insert(name, array);
            }
            Err(e) => warn!("Skipping entry '{}': {}", name, e),
        }
    }
    Ok(arrays)
}

/// `ndarray.__reduce__` state: `(version, shape, dtype, is_fortran, data)`
struct ArrayState<'v> {
    shape: Vec<usize>,
    dtype: &'v PyValue,
    fortran_order: bool,
    data: &'v PyValue,
}

impl<'v> ArrayState<'v> {
    fn from_object(obj: &'v PyObject) -> Result<Self, ArchiveError> {
        let state = obj
            .state
            .as_ref()
            .and_then(PyValue::as_sequence)
            .ok_or_else(|| ArchiveError::Unsupported("ndarray without state".to_string()))?;

        // Very old pickles omit the leading version number
        let fields = match state.len() {
            5 => &state[1..],
            4 => state,
            n => {
                return Err(ArchiveError::Unsupported(format!(
                    "ndarray state with {} fields",
                    n
                )))
            }
        };

        Ok(Self {
            shape: parse_shape(&fields[0])?,
            dtype: &fields[1],
            fortran_order: fields[2].as_bool().unwrap_or(false),
            data: &fields[3],
        })
    }
}

fn reconstructed_array(obj: &PyObject) -> Result<NdArray, ArchiveError> {
    let state = ArrayState::from_object(obj)?;
    let dtype = Dtype::from_pickled(state.dtype)?;

    let values = match (dtype.kind, state.data) {
        (DtypeKind::Object, PyValue::List(items)) => {
            items.iter().map(as_number).collect::<Result<Vec<_>, _>>()?
        }
        (_, PyValue::Bytes(bytes)) => dtype.decode(bytes)?,
        (_, other) => {
            return Err(ArchiveError::Unsupported(format!(
                "ndarray data of type {}",
                other.type_name()
            )))
        }
    };

    shaped(state.shape, values, state.fortran_order)
}

/// Protocol 5: `_frombuffer(buffer, dtype, shape, order)`
fn frombuffer_array(obj: &PyObject) -> Result<NdArray, ArchiveError> {
    let args = match obj.args.as_sequence() {
        Some(args) if args.len() == 4 => args,
        _ => {
            return Err(ArchiveError::Unsupported(
                "_frombuffer expects 4 arguments".to_string(),
            ))
        }
    };

    let bytes = args[0]
        .as_bytes()
        .ok_or_else(|| ArchiveError::Unsupported("_frombuffer without a buffer".to_string()))?;
    let dtype = Dtype::from_pickled(&args[1])?;
    let shape = parse_shape(&args[2])?;
    let fortran_order = args[3].as_str() == Some("F");

    shaped(shape, dtype.decode(bytes)?, fortran_order)
}

/// `scalar(dtype, raw_bytes)`
fn numpy_scalar(obj: &PyObject) -> Result<NdArray, ArchiveError> {
    let (dtype, raw) = match obj.args.as_sequence() {
        Some([dtype, raw, ..]) => (Dtype::from_pickled(dtype)?, raw),
        _ => {
            return Err(ArchiveError::Unsupported(
                "numpy scalar without arguments".to_string(),
            ))
        }
    };

    let values = match raw {
        PyValue::Bytes(bytes) => dtype.decode(bytes)?,
        other => vec![as_number(other)?],
    };
    if values.len() != 1 {
        return Err(ArchiveError::InvalidNpy(format!(
            "numpy scalar decoded to {} values",
            values.len()
        )));
    }
    Ok(NdArray {
        shape: Vec::new(),
        values,
    })
}

fn as_number(value: &PyValue) -> Result<f64, ArchiveError> {
    match value {
        PyValue::Float(f) => Ok(*f),
        PyValue::Int(i) => Ok(*i as f64),
        PyValue::Bool(b) => Ok(f64::from(u8::from(*b))),
        PyValue::Object(obj) if obj.class_name() == Some("scalar") => {
            Ok(numpy_scalar(obj)?.values[0])
        }
        other => Err(ArchiveError::Unsupported(format!(
            "{} is not a number",
            other.type_name()
        ))),
    }
}

pub(crate) fn parse_shape(value: &PyValue) -> Result<Vec<usize>, ArchiveError> {
    let dims = value
        .as_sequence()
        .ok_or_else(|| ArchiveError::Unsupported(format!("shape of type {}", value.type_name())))?;
    dims.iter()
        .map(|dim| {
            dim.as_int()
                .and_then(|d| usize::try_from(d).ok())
                .ok_or_else(|| ArchiveError::Unsupported("negative or non-integer dimension".to_string()))
        })
        .collect()
}

/// Check the element count and bring Fortran-ordered data into C order
pub(crate) fn shaped(
    shape: Vec<usize>,
    values: Vec<f64>,
    fortran_order: bool,
) -> Result<NdArray, ArchiveError> {
    let expected: usize = shape.iter().product();
    if expected != values.len() {
        return Err(ArchiveError::InvalidNpy(format!(
            "shape {:?} needs {} values, found {}",
            shape,
            expected,
            values.len()
        )));
    }

    let values = if fortran_order && shape.len() > 1 {
        fortran_to_c(&values, &shape)
    } else {
        values
    };

    Ok(NdArray { shape, values })
}

fn fortran_to_c(values: &[f64], shape: &[usize]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut index = vec![0usize; shape.len()];

    for _ in 0..values.len() {
        let mut offset = 0;
        let mut stride = 1;
        for (i, dim) in index.iter().zip(shape) {
            offset += i * stride;
            stride *= dim;
        }
        out.push(values[offset]);

        // Advance the C-order index, last axis fastest
        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dtype_value(descr: &str, byte_order: &str) -> PyValue {
        PyValue::Object(Box::new(PyObject {
            callable: PyValue::Global {
                module: "numpy".to_string(),
                name: "dtype".to_string(),
            },
            args: PyValue::Tuple(vec![
                PyValue::Str(descr.to_string()),
                PyValue::Bool(false),
                PyValue::Bool(true),
            ]),
            state: Some(PyValue::Tuple(vec![
                PyValue::Int(3),
                PyValue::Str(byte_order.to_string()),
                PyValue::None,
            ])),
        }))
    }

    fn reconstruct(shape: Vec<i64>, dtype: PyValue, fortran: bool, data: PyValue) -> PyValue {
        PyValue::Object(Box::new(PyObject {
            callable: PyValue::Global {
                module: "numpy._core.multiarray".to_string(),
                name: "_reconstruct".to_string(),
            },
            args: PyValue::Tuple(vec![]),
            state: Some(PyValue::Tuple(vec![
                PyValue::Int(1),
                PyValue::Tuple(shape.into_iter().map(PyValue::Int).collect()),
                dtype,
                PyValue::Bool(fortran),
                data,
            ])),
        }))
    }

    #[test]
    fn test_dtype_parse() {
        let dtype = Dtype::parse("<f8").unwrap();
        assert_eq!(dtype.kind, DtypeKind::Float);
        assert_eq!(dtype.size, 8);
        assert!(dtype.little_endian);

        let dtype = Dtype::parse(">i4").unwrap();
        assert_eq!(dtype.kind, DtypeKind::Int);
        assert!(!dtype.little_endian);

        assert_eq!(Dtype::parse("|O").unwrap().kind, DtypeKind::Object);
        assert_eq!(Dtype::parse("b1").unwrap().kind, DtypeKind::Bool);
        assert!(Dtype::parse("<c16").is_err());
        assert!(Dtype::parse("<f2").is_err());
        assert!(Dtype::parse("").is_err());
    }

    #[test]
    fn test_decode_big_endian_ints() {
        let dtype = Dtype::parse(">i2").unwrap();
        let values = dtype.decode(&[0x00, 0x02, 0xff, 0xfe]).unwrap();
        assert_eq!(values, vec![2.0, -2.0]);
    }

    #[test]
    fn test_decode_rejects_ragged_buffer() {
        let dtype = Dtype::parse("<f8").unwrap();
        assert!(dtype.decode(&[0u8; 7]).is_err());
    }

    #[test]
    fn test_reconstructed_float_array() {
        let bytes: Vec<u8> = [1.0f64, 2.5].iter().flat_map(|v| v.to_le_bytes()).collect();
        let value = reconstruct(vec![2], dtype_value("f8", "<"), false, PyValue::Bytes(bytes));

        let array = to_ndarray(&value).unwrap();
        assert_eq!(array.shape, vec![2]);
        assert_eq!(array.values, vec![1.0, 2.5]);
    }

    #[test]
    fn test_byte_order_from_build_state() {
        let bytes = 7i32.to_be_bytes().to_vec();
        let value = reconstruct(vec![1], dtype_value("i4", ">"), false, PyValue::Bytes(bytes));
        assert_eq!(to_ndarray(&value).unwrap().values, vec![7.0]);
    }

    #[test]
    fn test_fortran_order_transposed() {
        // 2x3 matrix [[1,2,3],[4,5,6]] stored column-major
        let column_major = [1.0f64, 4.0, 2.0, 5.0, 3.0, 6.0];
        let bytes: Vec<u8> = column_major.iter().flat_map(|v| v.to_le_bytes()).collect();
        let value = reconstruct(vec![2, 3], dtype_value("f8", "<"), true, PyValue::Bytes(bytes));

        let array = to_ndarray(&value).unwrap();
        assert_eq!(array.shape, vec![2, 3]);
        assert_eq!(array.values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let bytes = 1.0f64.to_le_bytes().to_vec();
        let value = reconstruct(vec![3], dtype_value("f8", "<"), false, PyValue::Bytes(bytes));
        assert!(matches!(to_ndarray(&value), Err(ArchiveError::InvalidNpy(_))));
    }

    #[test]
    fn test_numpy_scalar() {
        let value = PyValue::Object(Box::new(PyObject {
            callable: PyValue::Global {
                module: "numpy.core.multiarray".to_string(),
                name: "scalar".to_string(),
            },
            args: PyValue::Tuple(vec![
                dtype_value("f8", "<"),
                PyValue::Bytes(0.25f64.to_le_bytes().to_vec()),
            ]),
            state: None,
        }));

        let array = to_ndarray(&value).unwrap();
        assert!(array.is_scalar());
        assert_eq!(array.values, vec![0.25]);
    }

    #[test]
    fn test_frombuffer_array() {
        let bytes: Vec<u8> = [3u16, 4].iter().flat_map(|v| v.to_le_bytes()).collect();
        let value = PyValue::Object(Box::new(PyObject {
            callable: PyValue::Global {
                module: "numpy._core.numeric".to_string(),
                name: "_frombuffer".to_string(),
            },
            args: PyValue::Tuple(vec![
                PyValue::Bytes(bytes),
                dtype_value("u2", "<"),
                PyValue::Tuple(vec![PyValue::Int(2)]),
                PyValue::Str("C".to_string()),
            ]),
            state: None,
        }));

        assert_eq!(to_ndarray(&value).unwrap().values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_object_array_item_and_dict() {
        let dict = PyValue::Dict(vec![
            (
                PyValue::Str("tt".to_string()),
                PyValue::List(vec![PyValue::Float(1.0), PyValue::Int(2)]),
            ),
            (PyValue::Str("i0i0".to_string()), PyValue::None),
        ]);
        let wrapper = reconstruct(
            vec![],
            dtype_value("O8", "|"),
            false,
            PyValue::List(vec![dict]),
        );

        let item = object_array_item(&wrapper).unwrap();
        let arrays = decode_array_dict(item).unwrap();
        assert_eq!(arrays.len(), 1);
        assert_eq!(arrays["tt"].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_non_numeric_entries_read_as_absent() {
        let dict = PyValue::Dict(vec![
            (
                PyValue::Str("cosmo_label".to_string()),
                PyValue::Str("LCDM".to_string()),
            ),
            (
                PyValue::Str("tt".to_string()),
                PyValue::List(vec![PyValue::Float(1.0)]),
            ),
            (
                PyValue::Str("meta".to_string()),
                PyValue::Dict(vec![(PyValue::Str("h".to_string()), PyValue::Float(0.67))]),
            ),
        ]);
        let arrays = decode_array_dict(&dict).unwrap();
        assert_eq!(arrays.keys().collect::<Vec<_>>(), vec!["tt"]);
    }

    #[test]
    fn test_non_finite_values_survive_json() {
        let array = NdArray::from_vec(vec![f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 2.0]);
        let json = serde_json::to_string(&array).unwrap();
        assert_eq!(json, r#"{"shape":[4],"values":["NaN","inf","-inf",2.0]}"#);

        let back: NdArray = serde_json::from_str(&json).unwrap();
        assert!(back.values[0].is_nan());
        assert_eq!(&back.values[1..], &[f64::INFINITY, f64::NEG_INFINITY, 2.0]);
    }

    #[test]
    fn test_unknown_float_label_rejected() {
        let err = serde_json::from_str::<NdArray>(r#"{"shape":[1],"values":["nan?"]}"#);
        assert!(err.is_err());
    }
}
