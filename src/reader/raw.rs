//! Header-less binary grids.
//!
//! Each variable is a run of fixed-size elements in row-major order starting at
//! a known byte offset, the layout used by packed model output such as ARL
//! records. Offsets and dimensions come from an external header.

use super::{DataReader, Variable};
use crate::array::{byte_len, Array, DataType, Value};
use crate::dim_array::DimArray;
use crate::error::{GridError, Result};
use num_complex::Complex64;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Byte order of stored elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Most significant byte first.
    #[default]
    BigEndian,
    /// Least significant byte first.
    LittleEndian,
}

macro_rules! decode_chunks {
    ($bytes:expr, $ty:ty, $order:expr) => {{
        const N: usize = std::mem::size_of::<$ty>();
        $bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                match $order {
                    ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                    ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                }
            })
            .collect::<Vec<$ty>>()
    }};
}

macro_rules! encode_value {
    ($out:expr, $value:expr, $order:expr) => {
        match $order {
            ByteOrder::BigEndian => $out.extend_from_slice(&$value.to_be_bytes()),
            ByteOrder::LittleEndian => $out.extend_from_slice(&$value.to_le_bytes()),
        }
    };
}

/// Decode `bytes` into an array of the given type and shape.
///
/// Complex elements are stored as a real `f64` followed by an imaginary `f64`.
///
/// # Errors
/// Returns [`GridError::Allocation`] if the shape's byte count overflows, or
/// [`GridError::ShapeMismatch`] if the byte count does not match `shape` and
/// `data_type`.
pub fn decode_array(
    bytes: &[u8],
    data_type: DataType,
    shape: &[usize],
    byte_order: ByteOrder,
) -> Result<Array> {
    let expected = byte_len(data_type, shape)?;
    if bytes.len() != expected {
        return Err(GridError::shape_mismatch(format!(
            "{} bytes cannot hold {:?} {} elements",
            bytes.len(),
            shape,
            data_type
        )));
    }
    match data_type {
        DataType::Int => Array::from_vec(shape, decode_chunks!(bytes, i32, byte_order)),
        DataType::Long => Array::from_vec(shape, decode_chunks!(bytes, i64, byte_order)),
        DataType::Float => Array::from_vec(shape, decode_chunks!(bytes, f32, byte_order)),
        DataType::Double => Array::from_vec(shape, decode_chunks!(bytes, f64, byte_order)),
        DataType::Complex => {
            let parts = decode_chunks!(bytes, f64, byte_order);
            let values = parts
                .chunks_exact(2)
                .map(|pair| Complex64::new(pair[0], pair[1]))
                .collect();
            Array::from_vec::<Complex64>(shape, values)
        }
    }
}

/// Encode the elements of `array` in row-major order.
///
/// # Errors
/// Returns [`GridError::ShapeMismatch`] if the array layout does not fit its buffer.
pub fn encode_array(array: &Array, byte_order: ByteOrder) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(byte_len(array.data_type(), array.shape())?);
    for value in array.values()? {
        match value {
            Value::Int(v) => encode_value!(out, v, byte_order),
            Value::Long(v) => encode_value!(out, v, byte_order),
            Value::Float(v) => encode_value!(out, v, byte_order),
            Value::Double(v) => encode_value!(out, v, byte_order),
            Value::Complex(v) => {
                encode_value!(out, v.re, byte_order);
                encode_value!(out, v.im, byte_order);
            }
        }
    }
    Ok(out)
}

/// Reads variables from a header-less binary file.
#[derive(Debug, Clone)]
pub struct RawDataReader {
    path: PathBuf,
    byte_order: ByteOrder,
    variables: Vec<Variable>,
    offsets: Vec<u64>,
}

impl RawDataReader {
    /// Create a reader for `path` with no variables.
    pub fn new(path: impl Into<PathBuf>, byte_order: ByteOrder) -> Self {
        Self {
            path: path.into(),
            byte_order,
            variables: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Register a variable stored at `byte_offset`.
    pub fn add_variable(&mut self, variable: Variable, byte_offset: u64) -> &mut Self {
        self.variables.push(variable);
        self.offsets.push(byte_offset);
        self
    }

    /// Register a variable stored at `byte_offset`.
    #[must_use]
    pub fn with_variable(mut self, variable: Variable, byte_offset: u64) -> Self {
        self.add_variable(variable, byte_offset);
        self
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte order of stored elements.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }
}

impl DataReader for RawDataReader {
    fn variables(&self) -> &[Variable] {
        &self.variables
    }

    fn read(&self, name: &str) -> Result<DimArray> {
        let index = self
            .variables
            .iter()
            .position(|v| v.name() == name)
            .ok_or_else(|| GridError::variable_not_found(name))?;
        let variable = &self.variables[index];
        let offset = self.offsets[index];
        let shape = variable.shape();
        let len = byte_len(variable.data_type(), &shape)?;
        tracing::debug!(
            path = %self.path.display(),
            variable = name,
            offset,
            len,
            "Reading raw variable"
        );

        let file = File::open(&self.path)
            .map_err(|e| GridError::file_open(self.path.clone(), e))?;
        let available = file.metadata()?.len();
        let end = offset.checked_add(len as u64);
        if end.map_or(true, |end| end > available) {
            return Err(GridError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "variable {} needs {} bytes at offset {}, file has {}",
                    name, len, offset, available
                ),
            )));
        }
        let mut file = BufReader::new(file);
        file.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; len];
        file.read_exact(&mut bytes)?;

        let data = decode_array(&bytes, variable.data_type(), &shape, self.byte_order)?;
        DimArray::new(data, variable.dimensions().to_vec())
    }
}
