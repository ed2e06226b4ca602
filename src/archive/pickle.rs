//! Pickle stream decoder.
//!
//! Runs the subset of the pickle virtual machine that numpy emits when it
//! stores object arrays (protocols 0-5, binary opcodes plus the few text
//! opcodes still seen in old archives). Python callables are never
//! executed: a `REDUCE`/`NEWOBJ` becomes an opaque [`PyObject`] holding its
//! callable, arguments and `BUILD` state, and interpretation is left to the
//! caller (see `archive::numpy`).

use crate::utils::error::ArchiveError;
use log::trace;
use std::collections::HashMap;

// Opcodes, named after CPython's pickletools
const MARK: u8 = b'(';
const STOP: u8 = b'.';
const POP: u8 = b'0';
const POP_MARK: u8 = b'1';
const DUP: u8 = b'2';
const FLOAT: u8 = b'F';
const INT: u8 = b'I';
const BININT: u8 = b'J';
const BININT1: u8 = b'K';
const LONG: u8 = b'L';
const BININT2: u8 = b'M';
const NONE: u8 = b'N';
const REDUCE: u8 = b'R';
const BINSTRING: u8 = b'T';
const SHORT_BINSTRING: u8 = b'U';
const BINUNICODE: u8 = b'X';
const APPEND: u8 = b'a';
const BUILD: u8 = b'b';
const GLOBAL: u8 = b'c';
const DICT: u8 = b'd';
const EMPTY_DICT: u8 = b'}';
const APPENDS: u8 = b'e';
const GET: u8 = b'g';
const BINGET: u8 = b'h';
const LONG_BINGET: u8 = b'j';
const LIST: u8 = b'l';
const EMPTY_LIST: u8 = b']';
const PUT: u8 = b'p';
const BINPUT: u8 = b'q';
const LONG_BINPUT: u8 = b'r';
const SETITEM: u8 = b's';
const TUPLE: u8 = b't';
const EMPTY_TUPLE: u8 = b')';
const SETITEMS: u8 = b'u';
const BINFLOAT: u8 = b'G';
const PROTO: u8 = 0x80;
const NEWOBJ: u8 = 0x81;
const TUPLE1: u8 = 0x85;
const TUPLE2: u8 = 0x86;
const TUPLE3: u8 = 0x87;
const NEWTRUE: u8 = 0x88;
const NEWFALSE: u8 = 0x89;
const LONG1: u8 = 0x8a;
const LONG4: u8 = 0x8b;
const BINBYTES: u8 = b'B';
const SHORT_BINBYTES: u8 = b'C';
const SHORT_BINUNICODE: u8 = 0x8c;
const BINUNICODE8: u8 = 0x8d;
const BINBYTES8: u8 = 0x8e;
const EMPTY_SET: u8 = 0x8f;
const ADDITEMS: u8 = 0x90;
const FROZENSET: u8 = 0x91;
const NEWOBJ_EX: u8 = 0x92;
const STACK_GLOBAL: u8 = 0x93;
const MEMOIZE: u8 = 0x94;
const FRAME: u8 = 0x95;
const BYTEARRAY8: u8 = 0x96;

/// Highest pickle protocol understood
pub const HIGHEST_PROTOCOL: u8 = 5;

/// A decoded Python value
#[derive(Debug, Clone, PartialEq)]
pub enum PyValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<PyValue>),
    /// Lists and sets
    List(Vec<PyValue>),
    /// Dicts keep insertion order
    Dict(Vec<(PyValue, PyValue)>),
    Global { module: String, name: String },
    Object(Box<PyObject>),
}

/// An object produced by `REDUCE` or `NEWOBJ` that we did not evaluate
#[derive(Debug, Clone, PartialEq)]
pub struct PyObject {
    pub callable: PyValue,
    pub args: PyValue,
    pub state: Option<PyValue>,
}

impl PyObject {
    /// Name of the constructing callable, e.g. `_reconstruct` or `dtype`
    pub fn class_name(&self) -> Option<&str> {
        match &self.callable {
            PyValue::Global { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Module of the constructing callable, e.g. `numpy.core.multiarray`
    pub fn class_module(&self) -> Option<&str> {
        match &self.callable {
            PyValue::Global { module, .. } => Some(module),
            _ => None,
        }
    }
}

impl PyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PyValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PyValue::Int(i) => Some(*i),
            PyValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PyValue::Bool(b) => Some(*b),
            PyValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PyValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Items of a tuple or list
    pub fn as_sequence(&self) -> Option<&[PyValue]> {
        match self {
            PyValue::Tuple(items) | PyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PyObject> {
        match self {
            PyValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Python-ish type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PyValue::None => "None",
            PyValue::Bool(_) => "bool",
            PyValue::Int(_) => "int",
            PyValue::Float(_) => "float",
            PyValue::Str(_) => "str",
            PyValue::Bytes(_) => "bytes",
            PyValue::Tuple(_) => "tuple",
            PyValue::List(_) => "list",
            PyValue::Dict(_) => "dict",
            PyValue::Global { .. } => "global",
            PyValue::Object(_) => "object",
        }
    }
}

/// Decode a complete pickle stream
///
/// **Public** - main entry point for pickle decoding
///
/// # Arguments
/// * `data` - Raw pickle bytes; anything after the `STOP` opcode is ignored
///
/// # Returns
/// The value left on the stack at `STOP`
///
/// # Errors
/// * `ArchiveError::Pickle` - Truncated stream, unknown opcode, or stack misuse
pub fn unpickle(data: &[u8]) -> Result<PyValue, ArchiveError> {
    Unpickler::new(data).run()
}

/// A stack entry and the memo slots that alias it
struct Item {
    value: PyValue,
    memo_ids: Vec<usize>,
}

impl Item {
    fn new(value: PyValue) -> Self {
        Self {
            value,
            memo_ids: Vec::new(),
        }
    }
}

struct Unpickler<'a> {
    data: &'a [u8],
    pos: usize,
    stack: Vec<Item>,
    marks: Vec<usize>,
    memo: HashMap<usize, PyValue>,
}

impl<'a> Unpickler<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            stack: Vec::new(),
            marks: Vec::new(),
            memo: HashMap::new(),
        }
    }

    fn run(mut self) -> Result<PyValue, ArchiveError> {
        loop {
            let op = self.read_u8()?;
            trace!("pickle opcode 0x{:02x} at {}", op, self.pos - 1);

            match op {
                PROTO => {
                    let proto = self.read_u8()?;
                    if proto > HIGHEST_PROTOCOL {
                        return Err(self.error(format!("unsupported pickle protocol {}", proto)));
                    }
                }
                FRAME => {
                    // Frames only bound read sizes; the stream is already in memory
                    self.read_bytes(8)?;
                }
                STOP => return self.pop().map(|item| item.value),

                MARK => self.marks.push(self.stack.len()),
                POP => {
                    if self.marks.last() == Some(&self.stack.len()) {
                        self.marks.pop();
                    } else {
                        self.pop()?;
                    }
                }
                POP_MARK => {
                    self.pop_mark()?;
                }
                DUP => {
                    let top = self.top()?;
                    let copy = Item {
                        value: top.value.clone(),
                        memo_ids: top.memo_ids.clone(),
                    };
                    self.stack.push(copy);
                }

                NONE => self.push(PyValue::None),
                NEWTRUE => self.push(PyValue::Bool(true)),
                NEWFALSE => self.push(PyValue::Bool(false)),
                INT => {
                    let line = self.read_line()?;
                    let value = match line.as_str() {
                        "00" => PyValue::Bool(false),
                        "01" => PyValue::Bool(true),
                        text => PyValue::Int(self.parse_text_int(text)?),
                    };
                    self.push(value);
                }
                LONG => {
                    let line = self.read_line()?;
                    let value = self.parse_text_int(line.trim_end_matches('L'))?;
                    self.push(PyValue::Int(value));
                }
                BININT => {
                    let raw = self.read_array::<4>()?;
                    self.push(PyValue::Int(i64::from(i32::from_le_bytes(raw))));
                }
                BININT1 => {
                    let value = self.read_u8()?;
                    self.push(PyValue::Int(i64::from(value)));
                }
                BININT2 => {
                    let raw = self.read_array::<2>()?;
                    self.push(PyValue::Int(i64::from(u16::from_le_bytes(raw))));
                }
                LONG1 => {
                    let len = usize::from(self.read_u8()?);
                    let bytes = self.read_bytes(len)?;
                    let value = self.decode_long(bytes)?;
                    self.push(PyValue::Int(value));
                }
                LONG4 => {
                    let len = self.read_len_u32()?;
                    let bytes = self.read_bytes(len)?;
                    let value = self.decode_long(bytes)?;
                    self.push(PyValue::Int(value));
                }
                FLOAT => {
                    let line = self.read_line()?;
                    let value = line
                        .trim()
                        .parse::<f64>()
                        .map_err(|e| self.error(format!("bad FLOAT literal '{}': {}", line, e)))?;
                    self.push(PyValue::Float(value));
                }
                BINFLOAT => {
                    let raw = self.read_array::<8>()?;
                    self.push(PyValue::Float(f64::from_be_bytes(raw)));
                }

                BINUNICODE => {
                    let len = self.read_len_u32()?;
                    self.push_unicode(len)?;
                }
                SHORT_BINUNICODE => {
                    let len = usize::from(self.read_u8()?);
                    self.push_unicode(len)?;
                }
                BINUNICODE8 => {
                    let len = self.read_len_u64()?;
                    self.push_unicode(len)?;
                }
                // Python 2 `str` is a byte string
                BINSTRING | BINBYTES => {
                    let len = self.read_len_u32()?;
                    self.push_bytes(len)?;
                }
                SHORT_BINSTRING | SHORT_BINBYTES => {
                    let len = usize::from(self.read_u8()?);
                    self.push_bytes(len)?;
                }
                BINBYTES8 | BYTEARRAY8 => {
                    let len = self.read_len_u64()?;
                    self.push_bytes(len)?;
                }

                EMPTY_TUPLE => self.push(PyValue::Tuple(Vec::new())),
                TUPLE => {
                    let items = self.pop_mark()?;
                    self.push(PyValue::Tuple(items));
                }
                TUPLE1 | TUPLE2 | TUPLE3 => {
                    let n = usize::from(op - TUPLE1 + 1);
                    let items = self.pop_n(n)?;
                    self.push(PyValue::Tuple(items));
                }

                EMPTY_LIST | EMPTY_SET => self.push(PyValue::List(Vec::new())),
                LIST | FROZENSET => {
                    let items = self.pop_mark()?;
                    self.push(PyValue::List(items));
                }
                APPEND => {
                    let value = self.pop()?.value;
                    self.extend_list(vec![value])?;
                }
                APPENDS | ADDITEMS => {
                    let values = self.pop_mark()?;
                    self.extend_list(values)?;
                }

                EMPTY_DICT => self.push(PyValue::Dict(Vec::new())),
                DICT => {
                    let items = self.pop_mark()?;
                    let pairs = self.pair_up(items)?;
                    self.push(PyValue::Dict(pairs));
                }
                SETITEM => {
                    let value = self.pop()?.value;
                    let key = self.pop()?.value;
                    self.extend_dict(vec![(key, value)])?;
                }
                SETITEMS => {
                    let items = self.pop_mark()?;
                    let pairs = self.pair_up(items)?;
                    self.extend_dict(pairs)?;
                }

                GLOBAL => {
                    let module = self.read_line()?;
                    let name = self.read_line()?;
                    self.push(PyValue::Global { module, name });
                }
                STACK_GLOBAL => {
                    let name = self.pop()?.value;
                    let module = self.pop()?.value;
                    match (module, name) {
                        (PyValue::Str(module), PyValue::Str(name)) => {
                            self.push(PyValue::Global { module, name })
                        }
                        _ => return Err(self.error("STACK_GLOBAL expects two strings")),
                    }
                }
                REDUCE => {
                    let args = self.pop()?.value;
                    let callable = self.pop()?.value;
                    let value = self.reduce(callable, args)?;
                    self.push(value);
                }
                NEWOBJ => {
                    let args = self.pop()?.value;
                    let class = self.pop()?.value;
                    self.push(new_object(class, args));
                }
                NEWOBJ_EX => {
                    let _kwargs = self.pop()?;
                    let args = self.pop()?.value;
                    let class = self.pop()?.value;
                    self.push(new_object(class, args));
                }
                BUILD => {
                    let state = self.pop()?.value;
                    self.build(state)?;
                }

                PUT => {
                    let line = self.read_line()?;
                    let id = self.parse_memo_id(&line)?;
                    self.memoize(id)?;
                }
                BINPUT => {
                    let id = usize::from(self.read_u8()?);
                    self.memoize(id)?;
                }
                LONG_BINPUT => {
                    let id = self.read_len_u32()?;
                    self.memoize(id)?;
                }
                MEMOIZE => {
                    let id = self.memo.len();
                    self.memoize(id)?;
                }
                GET => {
                    let line = self.read_line()?;
                    let id = self.parse_memo_id(&line)?;
                    self.recall(id)?;
                }
                BINGET => {
                    let id = usize::from(self.read_u8()?);
                    self.recall(id)?;
                }
                LONG_BINGET => {
                    let id = self.read_len_u32()?;
                    self.recall(id)?;
                }

                other => {
                    return Err(self.error(format!("unsupported opcode 0x{:02x}", other)));
                }
            }
        }
    }

    // ---- stream access ----

    fn error(&self, message: impl Into<String>) -> ArchiveError {
        ArchiveError::pickle(self.pos, message)
    }

    fn read_u8(&mut self) -> Result<u8, ArchiveError> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ArchiveError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.error("unexpected end of stream"))?;
        let data: &'a [u8] = self.data;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ArchiveError> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(self.read_bytes(N)?);
        Ok(raw)
    }

    fn read_len_u32(&mut self) -> Result<usize, ArchiveError> {
        let raw = self.read_array::<4>()?;
        Ok(u32::from_le_bytes(raw) as usize)
    }

    fn read_len_u64(&mut self) -> Result<usize, ArchiveError> {
        let raw = self.read_array::<8>()?;
        usize::try_from(u64::from_le_bytes(raw)).map_err(|_| self.error("length overflows usize"))
    }

    /// Read a newline-terminated text argument (without the newline)
    fn read_line(&mut self) -> Result<String, ArchiveError> {
        let rest = &self.data[self.pos..];
        let len = rest
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| self.error("unterminated text argument"))?;
        let line = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(line)
    }

    fn parse_text_int(&self, text: &str) -> Result<i64, ArchiveError> {
        text.trim()
            .parse::<i64>()
            .map_err(|e| self.error(format!("bad integer literal '{}': {}", text, e)))
    }

    fn parse_memo_id(&self, text: &str) -> Result<usize, ArchiveError> {
        text.trim()
            .parse::<usize>()
            .map_err(|e| self.error(format!("bad memo key '{}': {}", text, e)))
    }

    /// Little-endian two's complement, as written by LONG1/LONG4
    fn decode_long(&self, bytes: &[u8]) -> Result<i64, ArchiveError> {
        if bytes.len() > 8 {
            return Err(self.error(format!("{}-byte integer does not fit in i64", bytes.len())));
        }
        let mut value: i64 = 0;
        for (i, byte) in bytes.iter().enumerate() {
            value |= i64::from(*byte) << (8 * i);
        }
        let len = bytes.len();
        if len > 0 && len < 8 && bytes[len - 1] & 0x80 != 0 {
            value -= 1i64 << (8 * len);
        }
        Ok(value)
    }

    fn push_unicode(&mut self, len: usize) -> Result<(), ArchiveError> {
        let bytes = self.read_bytes(len)?;
        let text = std::str::from_utf8(bytes)
            .map_err(|e| self.error(format!("invalid UTF-8 string: {}", e)))?
            .to_string();
        self.push(PyValue::Str(text));
        Ok(())
    }

    fn push_bytes(&mut self, len: usize) -> Result<(), ArchiveError> {
        let bytes = self.read_bytes(len)?.to_vec();
        self.push(PyValue::Bytes(bytes));
        Ok(())
    }

    // ---- stack ----

    fn push(&mut self, value: PyValue) {
        self.stack.push(Item::new(value));
    }

    fn pop(&mut self) -> Result<Item, ArchiveError> {
        if self.marks.last().is_some_and(|mark| *mark >= self.stack.len()) {
            return Err(self.error("pop across a mark"));
        }
        self.stack.pop().ok_or_else(|| self.error("stack underflow"))
    }

    fn pop_n(&mut self, n: usize) -> Result<Vec<PyValue>, ArchiveError> {
        let floor = self.marks.last().copied().unwrap_or(0);
        if self.stack.len() < floor + n {
            return Err(self.error("stack underflow"));
        }
        let start = self.stack.len() - n;
        Ok(self.stack.drain(start..).map(|item| item.value).collect())
    }

    fn pop_mark(&mut self) -> Result<Vec<PyValue>, ArchiveError> {
        let mark = self.marks.pop().ok_or_else(|| self.error("no mark on stack"))?;
        if mark > self.stack.len() {
            return Err(self.error("mark beyond stack top"));
        }
        Ok(self.stack.drain(mark..).map(|item| item.value).collect())
    }

    fn top(&self) -> Result<&Item, ArchiveError> {
        self.stack.last().ok_or_else(|| self.error("stack underflow"))
    }

    /// Apply `mutate` to the top value and refresh every memo slot aliasing it
    fn mutate_top<F>(&mut self, mutate: F) -> Result<(), ArchiveError>
    where
        F: FnOnce(&mut PyValue) -> Result<(), String>,
    {
        let pos = self.pos;
        let item = self
            .stack
            .last_mut()
            .ok_or_else(|| ArchiveError::pickle(pos, "stack underflow"))?;
        mutate(&mut item.value).map_err(|message| ArchiveError::pickle(pos, message))?;
        for id in &item.memo_ids {
            self.memo.insert(*id, item.value.clone());
        }
        Ok(())
    }

    fn pair_up(&self, items: Vec<PyValue>) -> Result<Vec<(PyValue, PyValue)>, ArchiveError> {
        if items.len() % 2 != 0 {
            return Err(self.error("odd number of dict items"));
        }
        let mut pairs = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            pairs.push((key, value));
        }
        Ok(pairs)
    }

    fn extend_list(&mut self, values: Vec<PyValue>) -> Result<(), ArchiveError> {
        self.mutate_top(|target| match target {
            PyValue::List(items) => {
                items.extend(values);
                Ok(())
            }
            other => Err(format!("cannot append to {}", other.type_name())),
        })
    }

    fn extend_dict(&mut self, pairs: Vec<(PyValue, PyValue)>) -> Result<(), ArchiveError> {
        self.mutate_top(|target| match target {
            PyValue::Dict(entries) => {
                for (key, value) in pairs {
                    match entries.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(())
            }
            other => Err(format!("cannot set items on {}", other.type_name())),
        })
    }

    fn build(&mut self, state: PyValue) -> Result<(), ArchiveError> {
        self.mutate_top(|target| match target {
            PyValue::Object(obj) => {
                obj.state = Some(state);
                Ok(())
            }
            other => Err(format!("cannot BUILD a {}", other.type_name())),
        })
    }

    fn memoize(&mut self, id: usize) -> Result<(), ArchiveError> {
        let pos = self.pos;
        let item = self
            .stack
            .last_mut()
            .ok_or_else(|| ArchiveError::pickle(pos, "memoize on empty stack"))?;
        item.memo_ids.push(id);
        self.memo.insert(id, item.value.clone());
        Ok(())
    }

    fn recall(&mut self, id: usize) -> Result<(), ArchiveError> {
        let value = self
            .memo
            .get(&id)
            .cloned()
            .ok_or_else(|| self.error(format!("memo key {} not found", id)))?;
        self.stack.push(Item {
            value,
            memo_ids: vec![id],
        });
        Ok(())
    }

    /// Evaluate the handful of builtins that only rebuild plain data
    fn reduce(&self, callable: PyValue, args: PyValue) -> Result<PyValue, ArchiveError> {
        if let PyValue::Global { module, name } = &callable {
            let builtin = matches!(module.as_str(), "builtins" | "__builtin__");
            match (module.as_str(), name.as_str()) {
                // Protocol 2 writes py3 bytes as _codecs.encode(text, 'latin1')
                ("_codecs", "encode") => return self.codecs_encode(&args),
                (_, "bytes" | "bytearray") if builtin => {
                    let bytes = match args.as_sequence() {
                        Some([]) => Some(Vec::new()),
                        Some([PyValue::Bytes(b)]) => Some(b.clone()),
                        _ => None,
                    };
                    if let Some(bytes) = bytes {
                        return Ok(PyValue::Bytes(bytes));
                    }
                }
                _ => {}
            }
        }
        Ok(new_object(callable, args))
    }

    fn codecs_encode(&self, args: &PyValue) -> Result<PyValue, ArchiveError> {
        let (text, encoding) = match args.as_sequence() {
            Some([PyValue::Str(text), PyValue::Str(encoding)]) => (text, encoding.as_str()),
            Some([PyValue::Str(text)]) => (text, "utf-8"),
            _ => return Err(self.error("_codecs.encode expects (str, encoding)")),
        };
        match encoding {
            "latin1" | "latin-1" | "iso-8859-1" => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)))
                .collect::<Result<Vec<u8>, _>>()
                .map(PyValue::Bytes)
                .map_err(|_| self.error("character outside latin-1 range")),
            "utf-8" | "utf8" => Ok(PyValue::Bytes(text.as_bytes().to_vec())),
            other => Err(self.error(format!("unsupported codec '{}'", other))),
        }
    }
}

fn new_object(callable: PyValue, args: PyValue) -> PyValue {
    PyValue::Object(Box::new(PyObject {
        callable,
        args,
        state: None,
    }))
}
