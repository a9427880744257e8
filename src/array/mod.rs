//! Typed N-dimensional arrays.
//!
//! An [`Array`] is a flat buffer of one [`DataType`] addressed through a shape,
//! per-axis strides and an offset. Sections created with [`Array::section`]
//! share the buffer of their parent through reference counting, so the buffer
//! lives as long as any array that addresses it.
//!
//! Writes need `&mut Array` and are copy-on-write: writing to an array whose
//! buffer is shared first materializes its own copy, so other arrays never
//! observe the change.

mod buffer;
mod data_type;
mod ops;
mod range;
mod stats;

pub use data_type::{DataType, Element, Value};
pub use range::Range;
pub use stats::Statistics;

use crate::error::{GridError, Result};
use buffer::{Buffer, Layout};
use ndarray::{ArrayD, IxDyn};
use std::sync::Arc;

/// A typed N-dimensional array, possibly a view into another array's buffer.
#[derive(Debug, Clone)]
pub struct Array {
    buffer: Arc<Buffer>,
    shape: Vec<usize>,
    strides: Vec<isize>,
    offset: usize,
}

/// Row-major strides for a shape.
fn row_major_strides(shape: &[usize]) -> Vec<isize> {
    let mut strides = vec![1isize; shape.len()];
    for i in (0..shape.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * shape[i + 1] as isize;
    }
    strides
}

/// Number of elements of a shape, `None` when it overflows.
fn checked_size(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &len| acc.checked_mul(len))
        .filter(|&size| size <= isize::MAX as usize)
}

/// Bytes needed for `shape` elements of `data_type`.
///
/// Returns [`GridError::Allocation`] when the count overflows.
pub(crate) fn byte_len(data_type: DataType, shape: &[usize]) -> Result<usize> {
    checked_size(shape)
        .and_then(|size| size.checked_mul(data_type.element_size()))
        .ok_or_else(|| {
            let signed: Vec<i64> = shape.iter().map(|&len| len as i64).collect();
            GridError::allocation(&signed, "byte count overflows")
        })
}

impl Array {
    /// Allocate a zero-filled array.
    ///
    /// The shape is signed so that lengths read from file headers can be
    /// passed through unchecked.
    ///
    /// # Errors
    /// Returns [`GridError::Allocation`] if any length is negative or the
    /// element count is not representable.
    pub fn factory(data_type: DataType, shape: &[i64]) -> Result<Self> {
        if let Some(len) = shape.iter().find(|&&len| len < 0) {
            return Err(GridError::allocation(
                shape,
                format!("negative dimension length {}", len),
            ));
        }
        let shape_usize = shape
            .iter()
            .map(|&len| usize::try_from(len))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| GridError::allocation(shape, e.to_string()))?;
        Self::zeros(data_type, &shape_usize)
    }

    /// Allocate a zero-filled array.
    ///
    /// # Errors
    /// Returns [`GridError::Allocation`] if the element count overflows.
    pub fn zeros(data_type: DataType, shape: &[usize]) -> Result<Self> {
        let size = checked_size(shape).ok_or_else(|| {
            let signed: Vec<i64> = shape.iter().map(|&len| len as i64).collect();
            GridError::allocation(&signed, "element count overflows")
        })?;
        tracing::trace!(%data_type, ?shape, "Allocating array");
        Ok(Self::from_buffer(Buffer::zeros(data_type, size), shape.to_vec()))
    }

    /// Wrap a typed vector laid out in row-major order.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `data.len()` differs from the shape's size.
    pub fn from_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self> {
        Self::check_len(shape, data.len())?;
        Ok(Self::from_buffer(Buffer::from_vec(data), shape.to_vec()))
    }

    /// Build an array of the given type from `f64` values in row-major order.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `values.len()` differs from the shape's size.
    pub fn from_values(data_type: DataType, shape: &[usize], values: &[f64]) -> Result<Self> {
        Self::check_len(shape, values.len())?;
        let buffer = Buffer::from_vec(values.to_vec()).cast(data_type);
        Ok(Self::from_buffer(buffer, shape.to_vec()))
    }

    /// A rank-0 array holding one value.
    pub fn scalar(value: impl Into<Value>) -> Self {
        let value = value.into();
        let mut buffer = Buffer::zeros(value.data_type(), 1);
        let layout = Layout {
            shape: &[],
            strides: &[],
            offset: 0,
        };
        buffer
            .set(layout, &[], value)
            .expect("rank-0 layout addresses the single element");
        Self::from_buffer(buffer, Vec::new())
    }

    /// Convert from an `ndarray` array.
    pub fn from_ndarray<T: Element>(array: &ArrayD<T>) -> Self {
        let data: Vec<T> = array.iter().copied().collect();
        Self::from_buffer(Buffer::from_vec(data), array.shape().to_vec())
    }

    fn check_len(shape: &[usize], len: usize) -> Result<()> {
        match checked_size(shape) {
            Some(size) if size == len => Ok(()),
            _ => Err(GridError::shape_mismatch(format!(
                "{} values do not fill shape {:?}",
                len, shape
            ))),
        }
    }

    fn from_buffer(buffer: Buffer, shape: Vec<usize>) -> Self {
        Self {
            buffer: Arc::new(buffer),
            strides: row_major_strides(&shape),
            shape,
            offset: 0,
        }
    }

    /// Element type.
    pub fn data_type(&self) -> DataType {
        self.buffer.data_type()
    }

    /// Length of every axis.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Buffer step of every axis.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Buffer position of the first element.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether the elements occupy one row-major run of the buffer.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1isize;
        for (&len, &stride) in self.shape.iter().zip(&self.strides).rev() {
            if len > 1 && stride != expected {
                return false;
            }
            expected *= len as isize;
        }
        true
    }

    /// Whether both arrays address the same buffer.
    pub fn shares_storage_with(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer)
    }

    fn layout(&self) -> Layout<'_> {
        Layout {
            shape: &self.shape,
            strides: &self.strides,
            offset: self.offset,
        }
    }

    /// Multi-dimensional index of a row-major linear index below `size()`.
    fn unravel(&self, linear: usize) -> Vec<usize> {
        let mut indices = vec![0; self.rank()];
        let mut remainder = linear;
        for (index, &len) in indices.iter_mut().zip(&self.shape).rev() {
            *index = remainder % len;
            remainder /= len;
        }
        indices
    }

    fn outside(&self, indices: &[usize]) -> GridError {
        GridError::shape_mismatch(format!(
            "indices {:?} outside shape {:?}",
            indices, self.shape
        ))
    }

    fn check_linear(&self, linear: usize) -> Result<()> {
        let size = self.size();
        if linear >= size {
            return Err(GridError::IndexOutOfRange { index: linear, size });
        }
        Ok(())
    }

    fn check_indices(&self, indices: &[usize]) -> Result<()> {
        if indices.len() != self.rank() {
            return Err(GridError::shape_mismatch(format!(
                "{} indices for array of rank {}",
                indices.len(),
                self.rank()
            )));
        }
        for (&index, &size) in indices.iter().zip(&self.shape) {
            if index >= size {
                return Err(GridError::IndexOutOfRange { index, size });
            }
        }
        Ok(())
    }

    /// Element at a row-major linear index.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if `linear >= size()`.
    pub fn get(&self, linear: usize) -> Result<Value> {
        self.check_linear(linear)?;
        self.get_at(&self.unravel(linear))
    }

    /// Element at a row-major linear index, as `f64`.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if `linear >= size()`.
    pub fn get_f64(&self, linear: usize) -> Result<f64> {
        self.get(linear).map(Value::as_f64)
    }

    /// Element at a multi-dimensional index.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if any index exceeds its axis.
    pub fn get_at(&self, indices: &[usize]) -> Result<Value> {
        self.check_indices(indices)?;
        self.buffer
            .get(self.layout(), indices)?
            .ok_or_else(|| self.outside(indices))
    }

    /// Store a value at a row-major linear index, coercing it to the element type.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if `linear >= size()`.
    pub fn set(&mut self, linear: usize, value: impl Into<Value>) -> Result<()> {
        self.check_linear(linear)?;
        let indices = self.unravel(linear);
        self.set_at(&indices, value)
    }

    /// Store an `f64` at a row-major linear index.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if `linear >= size()`.
    pub fn set_f64(&mut self, linear: usize, value: f64) -> Result<()> {
        self.set(linear, value)
    }

    /// Store a value at a multi-dimensional index.
    ///
    /// # Errors
    /// Returns [`GridError::IndexOutOfRange`] if any index exceeds its axis.
    pub fn set_at(&mut self, indices: &[usize], value: impl Into<Value>) -> Result<()> {
        self.check_indices(indices)?;
        self.make_unique()?;
        let layout = Layout {
            shape: &self.shape,
            strides: &self.strides,
            offset: self.offset,
        };
        // Unique after `make_unique`, so this never clones.
        let written = Arc::make_mut(&mut self.buffer).set(layout, indices, value.into())?;
        if written {
            Ok(())
        } else {
            Err(self.outside(indices))
        }
    }

    /// Detach from a shared buffer before writing.
    fn make_unique(&mut self) -> Result<()> {
        if Arc::get_mut(&mut self.buffer).is_none() {
            tracing::trace!(shape = ?self.shape, "Copying shared buffer before write");
            *self = self.copy()?;
        }
        Ok(())
    }

    /// Select a sub-array without copying.
    ///
    /// One range per axis, in axis order. The result shares this array's
    /// buffer, so sectioning never copies elements. Writes are copy-on-write:
    /// [`set`](Self::set) on a section detaches it onto its own buffer first,
    /// so the parent never observes writes made through a section, and a
    /// section never observes later writes to its parent.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if the number of ranges differs from
    /// the rank or a range reaches past the end of its axis.
    pub fn section(&self, ranges: &[Range]) -> Result<Array> {
        if ranges.len() != self.rank() {
            return Err(GridError::invalid_range(format!(
                "{} ranges for array of rank {}",
                ranges.len(),
                self.rank()
            )));
        }
        let mut offset = self.offset as isize;
        let mut shape = Vec::with_capacity(ranges.len());
        let mut strides = Vec::with_capacity(ranges.len());
        for (axis, (range, (&len, &stride))) in ranges
            .iter()
            .zip(self.shape.iter().zip(&self.strides))
            .enumerate()
        {
            if range.last() >= len {
                return Err(GridError::invalid_range(format!(
                    "range {} exceeds axis {} of length {}",
                    range, axis, len
                )));
            }
            offset += range.first() as isize * stride;
            shape.push(range.length());
            strides.push(stride * range.stride() as isize);
        }
        tracing::trace!(?shape, offset, "Sectioning array");
        Ok(Array {
            buffer: Arc::clone(&self.buffer),
            shape,
            strides,
            offset: offset as usize,
        })
    }

    /// Ranges covering every axis in full.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if any axis is empty.
    pub fn full_ranges(&self) -> Result<Vec<Range>> {
        self.shape.iter().map(|&len| Range::full(len)).collect()
    }

    /// Materialize into a freshly owned, contiguous buffer.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the layout does not fit the buffer.
    pub fn copy(&self) -> Result<Array> {
        let buffer = self.buffer.gather(self.layout())?;
        Ok(Self::from_buffer(buffer, self.shape.clone()))
    }

    /// Contiguous copy converted to another element type.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the layout does not fit the buffer.
    pub fn as_type(&self, data_type: DataType) -> Result<Array> {
        let buffer = self.contiguous_buffer()?.cast(data_type);
        Ok(Self::from_buffer(buffer, self.shape.clone()))
    }

    /// Owned buffer of the elements in row-major order.
    fn contiguous_buffer(&self) -> Result<Buffer> {
        if self.is_contiguous() && self.offset == 0 && self.buffer.len() == self.size() {
            Ok((*self.buffer).clone())
        } else {
            self.buffer.gather(self.layout())
        }
    }

    /// Same elements under a new shape.
    ///
    /// Contiguous arrays keep sharing their buffer; views are copied first.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the element count changes.
    pub fn reshape(&self, shape: &[usize]) -> Result<Array> {
        if checked_size(shape) != Some(self.size()) {
            return Err(GridError::shape_mismatch(format!(
                "cannot reshape {:?} into {:?}",
                self.shape, shape
            )));
        }
        let source = if self.is_contiguous() {
            self.clone()
        } else {
            self.copy()?
        };
        Ok(Array {
            buffer: source.buffer,
            shape: shape.to_vec(),
            strides: row_major_strides(shape),
            offset: source.offset,
        })
    }

    /// Elements in row-major order.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the layout does not fit the buffer.
    pub fn values(&self) -> Result<Vec<Value>> {
        self.buffer.values(self.layout())
    }

    /// Elements in row-major order, as `f64`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the layout does not fit the buffer.
    pub fn to_vec_f64(&self) -> Result<Vec<f64>> {
        Ok(self.contiguous_buffer()?.to_f64())
    }

    /// Elements in row-major order, converted to `T`.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the layout does not fit the buffer.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        Ok(self.values()?.into_iter().map(T::from_value).collect())
    }

    /// Convert to an `ndarray` array of `f64`, e.g. for linear-algebra code.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `ndarray` rejects the shape.
    pub fn to_ndarray(&self) -> Result<ArrayD<f64>> {
        ArrayD::from_shape_vec(IxDyn(&self.shape), self.to_vec_f64()?)
            .map_err(|e| GridError::shape_mismatch(e.to_string()))
    }
}

impl PartialEq for Array {
    /// Equal when shape, element type and every element match; storage layout is ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.shape != other.shape || self.data_type() != other.data_type() {
            return false;
        }
        match (self.values(), other.values()) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arange(shape: &[usize]) -> Array {
        let size: usize = shape.iter().product();
        let values: Vec<f64> = (0..size).map(|v| v as f64).collect();
        Array::from_vec(shape, values).unwrap()
    }

    #[test]
    fn factory_zero_fills() {
        let array = Array::factory(DataType::Int, &[2, 3]).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.strides(), &[3, 1]);
        assert_eq!(array.size(), 6);
        assert!(array.values().unwrap().iter().all(|v| *v == Value::Int(0)));
    }

    #[test]
    fn factory_rejects_negative_length() {
        let err = Array::factory(DataType::Double, &[3, -1]).unwrap_err();
        assert!(matches!(err, GridError::Allocation { .. }));
    }

    #[test]
    fn zeros_rejects_overflow() {
        let err = Array::zeros(DataType::Double, &[usize::MAX, 2]).unwrap_err();
        assert!(matches!(err, GridError::Allocation { .. }));
    }

    #[test]
    fn rank_zero_is_scalar() {
        let array = Array::scalar(4.5);
        assert_eq!(array.rank(), 0);
        assert_eq!(array.size(), 1);
        assert_eq!(array.get_f64(0).unwrap(), 4.5);
    }

    #[test]
    fn get_is_bounds_checked() {
        let array = arange(&[2, 2]);
        assert!(matches!(
            array.get(4),
            Err(GridError::IndexOutOfRange { index: 4, size: 4 })
        ));
        assert!(matches!(
            array.get_at(&[0, 2]),
            Err(GridError::IndexOutOfRange { index: 2, size: 2 })
        ));
    }

    #[test]
    fn set_is_bounds_checked() {
        let mut array = arange(&[2, 3]);
        assert!(matches!(
            array.set(6, 1.0),
            Err(GridError::IndexOutOfRange { index: 6, size: 6 })
        ));
        assert!(matches!(
            array.set_at(&[2, 0], 1.0),
            Err(GridError::IndexOutOfRange { index: 2, size: 2 })
        ));
        assert!(matches!(
            array.set_at(&[1], 1.0),
            Err(GridError::ShapeMismatch(_))
        ));
        assert_eq!(array, arange(&[2, 3]));
    }

    #[test]
    fn set_truncates_into_integer_array() {
        let mut array = Array::factory(DataType::Int, &[3]).unwrap();
        array.set(0, 2.99).unwrap();
        array.set_f64(1, -2.99).unwrap();
        array.set_at(&[2], 7i64).unwrap();
        assert_eq!(array.to_vec::<i32>().unwrap(), vec![2, -2, 7]);
    }

    #[test]
    fn section_shares_storage() {
        let array = arange(&[3, 4]);
        let ranges = [Range::new(1, 2, 1).unwrap(), Range::new(0, 3, 2).unwrap()];
        let view = array.section(&ranges).unwrap();
        assert_eq!(view.shape(), &[2, 2]);
        assert_eq!(view.strides(), &[4, 2]);
        assert_eq!(view.offset(), 4);
        assert!(view.shares_storage_with(&array));
        assert!(!view.is_contiguous());
        assert_eq!(view.to_vec_f64().unwrap(), vec![4.0, 6.0, 8.0, 10.0]);
        assert_eq!(view.get_f64(3).unwrap(), 10.0);
        assert_eq!(view.get_at(&[1, 0]).unwrap(), Value::Double(8.0));
    }

    #[test]
    fn section_of_section_composes() {
        let array = arange(&[10]);
        let view = array.section(&[Range::new(2, 9, 2).unwrap()]).unwrap();
        let inner = view.section(&[Range::new(1, 3, 2).unwrap()]).unwrap();
        assert_eq!(inner.to_vec_f64().unwrap(), vec![4.0, 8.0]);
    }

    #[test]
    fn section_rejects_out_of_bounds_range() {
        let array = arange(&[3, 4]);
        let ranges = [Range::full(3).unwrap(), Range::new(0, 4, 1).unwrap()];
        assert!(matches!(array.section(&ranges), Err(GridError::InvalidRange(_))));
        assert!(matches!(
            array.section(&[Range::full(3).unwrap()]),
            Err(GridError::InvalidRange(_))
        ));
    }

    #[test]
    fn write_through_view_does_not_leak() {
        let array = arange(&[4]);
        let mut view = array.section(&[Range::new(1, 2, 1).unwrap()]).unwrap();
        view.set(0, 100.0).unwrap();
        assert_eq!(view.to_vec_f64().unwrap(), vec![100.0, 2.0]);
        assert_eq!(array.to_vec_f64().unwrap(), vec![0.0, 1.0, 2.0, 3.0]);
        assert!(!view.shares_storage_with(&array));
    }

    #[test]
    fn write_into_strided_view() {
        let array = arange(&[3, 4]);
        let mut view = array
            .section(&[Range::full(3).unwrap(), Range::new(1, 3, 2).unwrap()])
            .unwrap();
        view.set_at(&[2, 1], -1.0).unwrap();
        view.set(0, -2.0).unwrap();
        assert_eq!(
            view.to_vec_f64().unwrap(),
            vec![-2.0, 3.0, 5.0, 7.0, 9.0, -1.0]
        );
        assert_eq!(array.get_at(&[2, 3]).unwrap(), Value::Double(11.0));
    }

    #[test]
    fn unshared_write_stays_in_place() {
        let mut array = arange(&[2]);
        let before = Arc::as_ptr(&array.buffer);
        array.set(1, 9.0).unwrap();
        assert_eq!(Arc::as_ptr(&array.buffer), before);
    }

    #[test]
    fn copy_is_contiguous() {
        let array = arange(&[3, 3]);
        let view = array
            .section(&[Range::new(0, 2, 2).unwrap(), Range::full(3).unwrap()])
            .unwrap();
        let copy = view.copy().unwrap();
        assert!(copy.is_contiguous());
        assert!(!copy.shares_storage_with(&array));
        assert_eq!(copy, view);
    }

    #[test]
    fn reshape_keeps_elements() {
        let array = arange(&[2, 3]);
        let reshaped = array.reshape(&[3, 2]).unwrap();
        assert!(reshaped.shares_storage_with(&array));
        assert_eq!(reshaped.get_at(&[2, 1]).unwrap(), Value::Double(5.0));
        assert!(matches!(array.reshape(&[4]), Err(GridError::ShapeMismatch(_))));
    }

    #[test]
    fn ndarray_round_trip() {
        let array = arange(&[2, 3]);
        let nd = array.to_ndarray().unwrap();
        assert_eq!(nd[[1, 2]], 5.0);
        assert_eq!(Array::from_ndarray(&nd), array);
    }

    #[test]
    fn as_type_converts() {
        let array = Array::from_vec(&[2], vec![1.7f64, -1.7]).unwrap();
        let ints = array.as_type(DataType::Long).unwrap();
        assert_eq!(ints.to_vec::<i64>().unwrap(), vec![1, -1]);
    }
}
