//! Element-wise arithmetic.
//!
//! Binary operations require identical shapes; there is no broadcasting.
//! Both operands are converted to the promoted element type before the
//! operation. Elements are combined with [`ndarray::Zip`], and large outputs
//! are computed on the rayon thread pool. Each output element depends only on
//! the two inputs at the same position, so the parallel result is
//! bit-identical to the sequential one.

use super::buffer::Buffer;
use super::data_type::Value;
use super::Array;
use crate::error::{GridError, Result};
use crate::options::global_options;
use ndarray::{ArrayD, ArrayViewD, IxDyn, Zip};
use num_complex::Complex64;

/// Arithmetic operator applied element by element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Per-type arithmetic.
trait Arithmetic: Copy + Send + Sync + PartialEq {
    /// Divisor with no defined quotient, for types where one exists.
    const UNDEFINED_DIVISOR: Option<Self>;

    fn apply(op: BinaryOp, a: Self, b: Self) -> Self;
}

macro_rules! impl_integer_arithmetic {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            const UNDEFINED_DIVISOR: Option<Self> = Some(0);

            // Integer arithmetic wraps on overflow.
            fn apply(op: BinaryOp, a: Self, b: Self) -> Self {
                match op {
                    BinaryOp::Add => a.wrapping_add(b),
                    BinaryOp::Sub => a.wrapping_sub(b),
                    BinaryOp::Mul => a.wrapping_mul(b),
                    // Zero divisors are rejected before `apply` is reached.
                    BinaryOp::Div if b == 0 => 0,
                    BinaryOp::Div => a.wrapping_div(b),
                }
            }
        }
    )*};
}

macro_rules! impl_float_arithmetic {
    ($($ty:ty),*) => {$(
        impl Arithmetic for $ty {
            const UNDEFINED_DIVISOR: Option<Self> = None;

            fn apply(op: BinaryOp, a: Self, b: Self) -> Self {
                match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                }
            }
        }
    )*};
}

impl_integer_arithmetic!(i32, i64);
impl_float_arithmetic!(f32, f64, Complex64);

/// Reject a division whose divisors include one without a defined quotient.
fn check_divisors<T: Arithmetic>(op: BinaryOp, divisors: &ArrayViewD<'_, T>) -> Result<()> {
    let Some(zero) = T::UNDEFINED_DIVISOR.filter(|_| op == BinaryOp::Div) else {
        return Ok(());
    };
    match divisors.iter().position(|&b| b == zero) {
        Some(index) => Err(GridError::DivideByZero { index }),
        None => Ok(()),
    }
}

fn row_major<'a, T: Arithmetic>(shape: &[usize], data: &'a [T]) -> Result<ArrayViewD<'a, T>> {
    ArrayViewD::from_shape(IxDyn(shape), data).map_err(|e| GridError::shape_mismatch(e.to_string()))
}

fn into_vec<T: Arithmetic>(array: ArrayD<T>) -> Vec<T> {
    if array.is_standard_layout() {
        array.into_raw_vec_and_offset().0
    } else {
        array.iter().copied().collect()
    }
}

fn zip_with<T: Arithmetic>(op: BinaryOp, shape: &[usize], lhs: &[T], rhs: &[T]) -> Result<Vec<T>> {
    let lhs = row_major(shape, lhs)?;
    let rhs = row_major(shape, rhs)?;
    check_divisors(op, &rhs)?;
    let zip = Zip::from(&lhs).and(&rhs);
    let out = if global_options().is_parallel(lhs.len()) {
        zip.par_map_collect(|&a, &b| T::apply(op, a, b))
    } else {
        zip.map_collect(|&a, &b| T::apply(op, a, b))
    };
    Ok(into_vec(out))
}

fn map_with<T: Arithmetic>(op: BinaryOp, shape: &[usize], lhs: &[T], scalar: T) -> Result<Vec<T>> {
    let lhs = row_major(shape, lhs)?;
    if op == BinaryOp::Div && !lhs.is_empty() && T::UNDEFINED_DIVISOR == Some(scalar) {
        return Err(GridError::DivideByZero { index: 0 });
    }
    let zip = Zip::from(&lhs);
    let out = if global_options().is_parallel(lhs.len()) {
        zip.par_map_collect(|&a| T::apply(op, a, scalar))
    } else {
        zip.map_collect(|&a| T::apply(op, a, scalar))
    };
    Ok(into_vec(out))
}

fn combine(op: BinaryOp, shape: &[usize], lhs: &Buffer, rhs: &Buffer) -> Result<Buffer> {
    Ok(match (lhs, rhs) {
        (Buffer::Int(a), Buffer::Int(b)) => Buffer::Int(zip_with(op, shape, a, b)?),
        (Buffer::Long(a), Buffer::Long(b)) => Buffer::Long(zip_with(op, shape, a, b)?),
        (Buffer::Float(a), Buffer::Float(b)) => Buffer::Float(zip_with(op, shape, a, b)?),
        (Buffer::Double(a), Buffer::Double(b)) => Buffer::Double(zip_with(op, shape, a, b)?),
        (Buffer::Complex(a), Buffer::Complex(b)) => Buffer::Complex(zip_with(op, shape, a, b)?),
        (a, b) => {
            return Err(GridError::shape_mismatch(format!(
                "operands of {} and {} after promotion",
                a.data_type(),
                b.data_type()
            )))
        }
    })
}

fn combine_scalar(op: BinaryOp, shape: &[usize], lhs: &Buffer, scalar: Value) -> Result<Buffer> {
    Ok(match (lhs, scalar) {
        (Buffer::Int(a), Value::Int(s)) => Buffer::Int(map_with(op, shape, a, s)?),
        (Buffer::Long(a), Value::Long(s)) => Buffer::Long(map_with(op, shape, a, s)?),
        (Buffer::Float(a), Value::Float(s)) => Buffer::Float(map_with(op, shape, a, s)?),
        (Buffer::Double(a), Value::Double(s)) => Buffer::Double(map_with(op, shape, a, s)?),
        (Buffer::Complex(a), Value::Complex(s)) => Buffer::Complex(map_with(op, shape, a, s)?),
        (a, s) => {
            return Err(GridError::shape_mismatch(format!(
                "operand of {} and scalar of {} after promotion",
                a.data_type(),
                s.data_type()
            )))
        }
    })
}

impl Array {
    pub(crate) fn binary(&self, other: &Array, op: BinaryOp) -> Result<Array> {
        if self.shape != other.shape {
            return Err(GridError::shape_mismatch(format!(
                "{:?} {:?} {:?}",
                self.shape, op, other.shape
            )));
        }
        let data_type = self.data_type().promote(other.data_type());
        let lhs = self.contiguous_buffer()?.cast(data_type);
        let rhs = other.contiguous_buffer()?.cast(data_type);
        let buffer = combine(op, &self.shape, &lhs, &rhs)?;
        Ok(Array::from_buffer(buffer, self.shape.clone()))
    }

    pub(crate) fn binary_scalar(&self, scalar: Value, op: BinaryOp) -> Result<Array> {
        let data_type = self.data_type().promote_scalar(scalar.data_type());
        let lhs = self.contiguous_buffer()?.cast(data_type);
        let buffer = combine_scalar(op, &self.shape, &lhs, scalar.cast(data_type))?;
        Ok(Array::from_buffer(buffer, self.shape.clone()))
    }

    /// Element-wise sum.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn add(&self, other: &Array) -> Result<Array> {
        self.binary(other, BinaryOp::Add)
    }

    /// Element-wise difference.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn sub(&self, other: &Array) -> Result<Array> {
        self.binary(other, BinaryOp::Sub)
    }

    /// Element-wise product.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ.
    pub fn mul(&self, other: &Array) -> Result<Array> {
        self.binary(other, BinaryOp::Mul)
    }

    /// Element-wise quotient.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if the shapes differ, or
    /// [`GridError::DivideByZero`] for an integer division by zero.
    pub fn div(&self, other: &Array) -> Result<Array> {
        self.binary(other, BinaryOp::Div)
    }

    /// Add a scalar to every element.
    ///
    /// # Errors
    /// Never fails for addition; the `Result` matches the other scalar operations.
    pub fn add_scalar(&self, scalar: impl Into<Value>) -> Result<Array> {
        self.binary_scalar(scalar.into(), BinaryOp::Add)
    }

    /// Subtract a scalar from every element.
    ///
    /// # Errors
    /// Never fails for subtraction; the `Result` matches the other scalar operations.
    pub fn sub_scalar(&self, scalar: impl Into<Value>) -> Result<Array> {
        self.binary_scalar(scalar.into(), BinaryOp::Sub)
    }

    /// Multiply every element by a scalar.
    ///
    /// # Errors
    /// Never fails for multiplication; the `Result` matches the other scalar operations.
    pub fn mul_scalar(&self, scalar: impl Into<Value>) -> Result<Array> {
        self.binary_scalar(scalar.into(), BinaryOp::Mul)
    }

    /// Divide every element by a scalar.
    ///
    /// # Errors
    /// Returns [`GridError::DivideByZero`] for integer division by zero.
    pub fn div_scalar(&self, scalar: impl Into<Value>) -> Result<Array> {
        self.binary_scalar(scalar.into(), BinaryOp::Div)
    }
}
