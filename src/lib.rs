//! Meteogrid - labeled multidimensional arrays for meteorological grids.
//!
//! Meteogrid is the data-access layer that format readers and grid analysis
//! share: typed N-dimensional arrays, named dimensions that may be staggered,
//! zero-copy sectioning and destaggering of WRF-style edge values.
//!
//! # Features
//!
//! - Arrays of `int`, `long`, `float`, `double` and `complex` elements
//! - Strided sections that share storage with their parent
//! - Copy-on-write writes, safe to share across threads
//! - Destaggering with exact pairwise means
//! - `ndarray` interop for numerical code
//!
//! # Example
//!
//! ```
//! use meteogrid::{destagger, Array, DimArray, Dimension};
//!
//! let data = Array::from_vec(&[4], vec![1.0, 2.0, 3.0, 4.0])?;
//! let dims = vec![Dimension::new("west_east_stag", 4).staggered(true)];
//! let u = DimArray::new(data, dims)?;
//!
//! let centered = destagger(&u)?;
//! assert_eq!(centered.data().to_vec_f64()?, vec![1.5, 2.5, 3.5]);
//! # Ok::<(), meteogrid::GridError>(())
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod array;
pub mod destagger;
pub mod dim_array;
pub mod dimension;
pub mod error;
pub mod options;
pub mod reader;

pub use array::{Array, DataType, Element, Range, Statistics, Value};
pub use destagger::{destagger, destagger_array, destagger_axis, geopotential_height, GRAVITY};
pub use dim_array::DimArray;
pub use dimension::{Dimension, DimensionKind};
pub use error::{GridError, Result};
pub use options::{global_options, set_global_options, ComputeOptions};
pub use reader::{ByteOrder, DataReader, RawDataReader, Variable};
