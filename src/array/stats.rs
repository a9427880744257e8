//! Summary statistics over array elements.

use super::Array;
use crate::error::Result;

/// Summary of the finite elements of an array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Smallest finite value.
    pub min: f64,
    /// Largest finite value.
    pub max: f64,
    /// Arithmetic mean of finite values.
    pub mean: f64,
    /// Sample standard deviation, `None` with fewer than two values.
    pub std: Option<f64>,
    /// Count of finite values.
    pub valid_count: usize,
}

impl Array {
    /// Compute statistics, skipping `NaN` and infinite values.
    ///
    /// Complex elements contribute their real part. Returns `Ok(None)` when no
    /// element is finite.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`](crate::GridError::ShapeMismatch) if
    /// the layout does not fit the buffer.
    pub fn statistics(&self) -> Result<Option<Statistics>> {
        let values: Vec<f64> = self
            .to_vec_f64()?
            .into_iter()
            .filter(|v| v.is_finite())
            .collect();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0f64;
        for &v in &values {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let count = values.len();
        if count == 0 {
            return Ok(None);
        }
        let mean = sum / count as f64;
        let std = (count > 1).then(|| {
            let ssd: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ssd / (count - 1) as f64).sqrt()
        });
        Ok(Some(Statistics {
            min,
            max,
            mean,
            std,
            valid_count: count,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_non_finite_values() {
        let array = Array::from_vec(&[5], vec![1.0, f64::NAN, 3.0, f64::INFINITY, 5.0]).unwrap();
        let stats = array.statistics().unwrap().unwrap();
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.std, Some(2.0));
    }

    #[test]
    fn empty_of_valid_values() {
        let array = Array::from_vec(&[2], vec![f64::NAN, f64::NAN]).unwrap();
        assert_eq!(array.statistics().unwrap(), None);
        let single = Array::from_vec(&[1], vec![7i32]).unwrap();
        assert_eq!(single.statistics().unwrap().unwrap().std, None);
    }
}
