//! Element type tags, scalar values and the coercion rules between them.
//!
//! Every conversion between element types goes through [`Value::cast`], so an
//! `f64` stored into an `Int` array behaves the same whether it arrives via
//! [`Array::set`](crate::Array::set), a constructor or an arithmetic result:
//!
//! - floating point to integer truncates toward zero, saturating at the bounds
//!   of the target type (`NaN` becomes `0`),
//! - narrowing integer conversions saturate,
//! - integer to floating point and `f64` to `f32` round to nearest,
//! - real to complex sets the imaginary part to zero,
//! - complex to real keeps the real part.

use super::buffer::Buffer;
use num_complex::Complex64;
use std::fmt;

/// Element type of an [`Array`](crate::Array).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Complex number with 64-bit real and imaginary parts.
    Complex,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn element_size(self) -> usize {
        match self {
            Self::Int | Self::Float => 4,
            Self::Long | Self::Double => 8,
            Self::Complex => 16,
        }
    }

    /// Lowercase type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::Complex => "complex",
        }
    }

    /// `Int` or `Long`.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Int | Self::Long)
    }

    /// `Float` or `Double`.
    pub fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Position in the widening order `Int < Long < Float < Double < Complex`.
    fn width(self) -> u8 {
        match self {
            Self::Int => 0,
            Self::Long => 1,
            Self::Float => 2,
            Self::Double => 3,
            Self::Complex => 4,
        }
    }

    /// The wider of two element types.
    ///
    /// Integers promote to floating point when the other side is floating point.
    pub fn promote(self, other: DataType) -> DataType {
        if self.width() >= other.width() {
            self
        } else {
            other
        }
    }

    /// Result type of combining an array of this type with a scalar.
    ///
    /// A floating array keeps its own precision against any real scalar; an
    /// integer array combined with a floating scalar becomes `Double`.
    pub fn promote_scalar(self, scalar: DataType) -> DataType {
        match (self, scalar) {
            (_, Self::Complex) | (Self::Complex, _) => Self::Complex,
            (array, _) if array.is_floating() => array,
            (_, scalar) if scalar.is_floating() => Self::Double,
            (array, scalar) => array.promote(scalar),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single element of any supported type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Complex number.
    Complex(Complex64),
}

impl Value {
    /// Element type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::Complex(_) => DataType::Complex,
        }
    }

    /// Zero of the given type.
    pub fn zero(data_type: DataType) -> Self {
        Self::Int(0).cast(data_type)
    }

    /// Convert to another element type.
    pub fn cast(self, data_type: DataType) -> Self {
        match data_type {
            DataType::Int => Self::Int(self.as_i32()),
            DataType::Long => Self::Long(self.as_i64()),
            DataType::Float => Self::Float(self.as_f64() as f32),
            DataType::Double => Self::Double(self.as_f64()),
            DataType::Complex => Self::Complex(self.as_complex()),
        }
    }

    /// Value as `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => f64::from(v),
            Self::Long(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
            Self::Complex(v) => v.re,
        }
    }

    /// Value as `i64`, truncating toward zero.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Int(v) => i64::from(v),
            Self::Long(v) => v,
            // `as` truncates toward zero and saturates, NaN maps to 0
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
            Self::Complex(v) => v.re as i64,
        }
    }

    /// Value as `i32`, truncating toward zero and saturating.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Int(v) => v,
            Self::Long(v) => v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
            Self::Float(v) => v as i32,
            Self::Double(v) => v as i32,
            Self::Complex(v) => v.re as i32,
        }
    }

    /// Value as a complex number.
    pub fn as_complex(self) -> Complex64 {
        match self {
            Self::Complex(v) => v,
            other => Complex64::new(other.as_f64(), 0.0),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Long(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Complex(v) => write!(f, "{}", v),
        }
    }
}

mod private {
    use super::Buffer;

    pub trait Sealed: Sized {
        /// Move a typed vector into the matching buffer variant.
        fn into_buffer(data: Vec<Self>) -> Buffer;
    }
}

/// Rust types that can be stored in an [`Array`](crate::Array).
pub trait Element: private::Sealed + Copy + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Matching element type tag.
    const DATA_TYPE: DataType;

    /// Convert from a value using the shared coercion rules.
    fn from_value(value: Value) -> Self;

    /// Wrap as a value.
    fn into_value(self) -> Value;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $convert:ident) => {
        impl private::Sealed for $ty {
            fn into_buffer(data: Vec<Self>) -> Buffer {
                Buffer::$variant(data)
            }
        }

        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_value(value: Value) -> Self {
                value.$convert()
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

impl_element!(i32, Int, as_i32);
impl_element!(i64, Long, as_i64);
impl_element!(f64, Double, as_f64);
impl_element!(Complex64, Complex, as_complex);

impl private::Sealed for f32 {
    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::Float(data)
    }
}

impl Element for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn from_value(value: Value) -> Self {
        value.as_f64() as f32
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}
