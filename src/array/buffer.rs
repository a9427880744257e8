//! Typed backing storage shared between an array and its sections.

use super::data_type::{DataType, Element, Value};
use crate::error::{GridError, Result};
use ndarray::{ArrayViewD, ArrayViewMutD, IxDyn, ShapeBuilder};
use num_complex::Complex64;

/// Flat element storage, one variant per element type.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    /// `int` elements.
    Int(Vec<i32>),
    /// `long` elements.
    Long(Vec<i64>),
    /// `float` elements.
    Float(Vec<f32>),
    /// `double` elements.
    Double(Vec<f64>),
    /// `complex` elements.
    Complex(Vec<Complex64>),
}

/// Run `$body` with `$v` bound to the typed vector of any variant.
macro_rules! with_buffer {
    ($buffer:expr, $v:ident => $body:expr) => {
        match $buffer {
            Buffer::Int($v) => $body,
            Buffer::Long($v) => $body,
            Buffer::Float($v) => $body,
            Buffer::Double($v) => $body,
            Buffer::Complex($v) => $body,
        }
    };
}

/// Like `with_buffer!`, rebuilding a buffer of the same variant from `$body`.
macro_rules! map_buffer {
    ($buffer:expr, $v:ident => $body:expr) => {
        match $buffer {
            Buffer::Int($v) => Buffer::Int($body),
            Buffer::Long($v) => Buffer::Long($body),
            Buffer::Float($v) => Buffer::Float($body),
            Buffer::Double($v) => Buffer::Double($body),
            Buffer::Complex($v) => Buffer::Complex($body),
        }
    };
}

/// Where the elements of an array sit inside a buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Layout<'a> {
    pub(crate) shape: &'a [usize],
    pub(crate) strides: &'a [isize],
    pub(crate) offset: usize,
}

impl Layout<'_> {
    fn stride_shape(&self) -> Result<ndarray::StrideShape<IxDyn>> {
        let strides = self
            .strides
            .iter()
            .map(|&stride| usize::try_from(stride))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| GridError::shape_mismatch(format!("negative strides {:?}", self.strides)))?;
        Ok(IxDyn(self.shape).strides(IxDyn(&strides)))
    }

    fn outside(&self, len: usize) -> GridError {
        GridError::shape_mismatch(format!(
            "offset {} outside buffer of {} elements",
            self.offset, len
        ))
    }

    /// Strided view of the addressed elements.
    pub(crate) fn view<'d, T>(&self, data: &'d [T]) -> Result<ArrayViewD<'d, T>> {
        let tail = data.get(self.offset..).ok_or_else(|| self.outside(data.len()))?;
        ArrayViewD::from_shape(self.stride_shape()?, tail)
            .map_err(|e| GridError::shape_mismatch(e.to_string()))
    }

    /// Mutable strided view of the addressed elements.
    pub(crate) fn view_mut<'d, T>(&self, data: &'d mut [T]) -> Result<ArrayViewMutD<'d, T>> {
        let len = data.len();
        let tail = data.get_mut(self.offset..).ok_or_else(|| self.outside(len))?;
        ArrayViewMutD::from_shape(self.stride_shape()?, tail)
            .map_err(|e| GridError::shape_mismatch(e.to_string()))
    }
}

impl Buffer {
    /// Zero-filled buffer of `len` elements.
    pub(crate) fn zeros(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Int => Self::Int(vec![0; len]),
            DataType::Long => Self::Long(vec![0; len]),
            DataType::Float => Self::Float(vec![0.0; len]),
            DataType::Double => Self::Double(vec![0.0; len]),
            DataType::Complex => Self::Complex(vec![Complex64::new(0.0, 0.0); len]),
        }
    }

    /// Take ownership of a typed vector.
    pub(crate) fn from_vec<T: Element>(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }

    pub(crate) fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::Complex(_) => DataType::Complex,
        }
    }

    pub(crate) fn len(&self) -> usize {
        with_buffer!(self, v => v.len())
    }

    /// Element at a multi-dimensional index of `layout`, `None` when outside it.
    pub(crate) fn get(&self, layout: Layout<'_>, indices: &[usize]) -> Result<Option<Value>> {
        with_buffer!(self, v => Ok(layout.view(v)?.get(IxDyn(indices)).map(|x| x.into_value())))
    }

    /// Store a value at a multi-dimensional index of `layout`, coercing it to
    /// the buffer type. Returns `false` when the index is outside the layout.
    pub(crate) fn set(&mut self, layout: Layout<'_>, indices: &[usize], value: Value) -> Result<bool> {
        with_buffer!(self, v => {
            let mut view = layout.view_mut(v)?;
            Ok(match view.get_mut(IxDyn(indices)) {
                Some(slot) => {
                    *slot = Element::from_value(value);
                    true
                }
                None => false,
            })
        })
    }

    /// New contiguous buffer holding the elements of `layout` in row-major order.
    pub(crate) fn gather(&self, layout: Layout<'_>) -> Result<Self> {
        Ok(map_buffer!(self, v => layout.view(v)?.iter().copied().collect()))
    }

    /// Elements of `layout` in row-major order.
    pub(crate) fn values(&self, layout: Layout<'_>) -> Result<Vec<Value>> {
        with_buffer!(self, v => Ok(layout.view(v)?.iter().map(|x| x.into_value()).collect()))
    }

    /// Convert every element to another type.
    pub(crate) fn cast(&self, data_type: DataType) -> Self {
        if self.data_type() == data_type {
            return self.clone();
        }
        match data_type {
            DataType::Int => Self::Int(self.converted()),
            DataType::Long => Self::Long(self.converted()),
            DataType::Float => Self::Float(self.converted()),
            DataType::Double => Self::Double(self.converted()),
            DataType::Complex => Self::Complex(self.converted()),
        }
    }

    fn converted<T: Element>(&self) -> Vec<T> {
        with_buffer!(self, v => v.iter().map(|x| T::from_value(x.into_value())).collect())
    }

    /// Elements as `f64`.
    pub(crate) fn to_f64(&self) -> Vec<f64> {
        self.converted()
    }
}
