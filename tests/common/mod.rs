//! Shared helpers for integration tests.

#![allow(dead_code)]

use meteogrid::Array;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber, honouring `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `0, 1, 2, ...` as doubles in the given shape.
pub fn arange(shape: &[usize]) -> Array {
    let size: usize = shape.iter().product();
    Array::from_vec(shape, (0..size).map(|v| v as f64).collect()).expect("shape matches data")
}
