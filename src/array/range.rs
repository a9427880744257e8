//! Per-axis index ranges used for sectioning.

use crate::error::{GridError, Result};
use std::fmt;

/// An inclusive, strided selection of indices along one axis.
///
/// A range always selects at least one index: `first <= last` and `stride >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    first: usize,
    last: usize,
    stride: usize,
}

impl Range {
    /// Create a range from `first` to `last` (inclusive) with the given stride.
    ///
    /// Arguments are signed because they usually come straight from file
    /// headers or index arithmetic.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if `first < 0`, `stride < 1` or `last < first`.
    pub fn new(first: i64, last: i64, stride: i64) -> Result<Self> {
        if first < 0 {
            return Err(GridError::invalid_range(format!(
                "first index {} is negative",
                first
            )));
        }
        if stride < 1 {
            return Err(GridError::invalid_range(format!(
                "stride {} must be at least 1",
                stride
            )));
        }
        if last < first {
            return Err(GridError::invalid_range(format!(
                "last index {} is before first index {}",
                last, first
            )));
        }
        let to_usize = |v: i64| {
            usize::try_from(v)
                .map_err(|_| GridError::invalid_range(format!("index {} is not addressable", v)))
        };
        Ok(Self {
            first: to_usize(first)?,
            last: to_usize(last)?,
            stride: to_usize(stride)?,
        })
    }

    /// Create a unit-stride range of `length` indices starting at `first`.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if `first < 0` or `length < 1`.
    pub fn with_length(first: i64, length: i64) -> Result<Self> {
        let last = first
            .checked_add(length)
            .and_then(|end| end.checked_sub(1))
            .ok_or_else(|| GridError::invalid_range(format!("length {} overflows", length)))?;
        Self::new(first, last, 1)
    }

    /// The range covering a whole axis of `length` elements.
    ///
    /// # Errors
    /// Returns [`GridError::InvalidRange`] if `length` is zero.
    pub fn full(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(GridError::invalid_range("cannot cover an empty axis"));
        }
        Ok(Self {
            first: 0,
            last: length - 1,
            stride: 1,
        })
    }

    /// First selected index.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Upper bound (inclusive). The last selected index may be smaller when
    /// the stride does not divide the span.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Step between selected indices.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of selected indices.
    pub fn length(&self) -> usize {
        (self.last - self.first) / self.stride + 1
    }

    /// The `i`-th selected index.
    pub fn index(&self, i: usize) -> Option<usize> {
        (i < self.length()).then(|| self.first + i * self.stride)
    }

    /// Iterate the selected indices.
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        (self.first..=self.last).step_by(self.stride)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.stride == 1 {
            write!(f, "{}:{}", self.first, self.last)
        } else {
            write!(f, "{}:{}:{}", self.first, self.last, self.stride)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_follows_stride() {
        assert_eq!(Range::new(0, 9, 1).unwrap().length(), 10);
        assert_eq!(Range::new(0, 9, 3).unwrap().length(), 4);
        assert_eq!(Range::new(2, 2, 5).unwrap().length(), 1);
        assert_eq!(Range::with_length(3, 4).unwrap().last(), 6);
    }

    #[test]
    fn rejects_invalid_bounds() {
        assert!(matches!(Range::new(-1, 3, 1), Err(GridError::InvalidRange(_))));
        assert!(matches!(Range::new(0, 3, 0), Err(GridError::InvalidRange(_))));
        assert!(matches!(Range::new(4, 3, 1), Err(GridError::InvalidRange(_))));
        assert!(matches!(Range::with_length(0, 0), Err(GridError::InvalidRange(_))));
        assert!(matches!(Range::full(0), Err(GridError::InvalidRange(_))));
    }

    #[test]
    fn iterates_selected_indices() {
        let range = Range::new(1, 8, 3).unwrap();
        assert_eq!(range.iter().collect::<Vec<_>>(), vec![1, 4, 7]);
        assert_eq!(range.index(2), Some(7));
        assert_eq!(range.index(3), None);
        assert_eq!(range.to_string(), "1:8:3");
    }
}
