//! Compute options for element-wise array work.

use std::sync::RwLock;

const DEFAULT_PARALLEL_THRESHOLD: usize = 65_536;

/// Options controlling how element-wise loops are executed.
///
/// The default values are:
/// - `parallel_threshold`: `65_536` elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeOptions {
    parallel_threshold: usize,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ComputeOptions {
    /// Return the parallel threshold.
    ///
    /// Element-wise operations producing at least this many elements are
    /// sharded across the rayon thread pool.
    #[must_use]
    pub fn parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Set the parallel threshold.
    pub fn set_parallel_threshold(&mut self, parallel_threshold: usize) -> &mut Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Set the parallel threshold.
    #[must_use]
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    /// Whether a loop over `len` elements should run in parallel.
    pub(crate) fn is_parallel(&self, len: usize) -> bool {
        len >= self.parallel_threshold
    }
}

static GLOBAL_OPTIONS: RwLock<ComputeOptions> = RwLock::new(ComputeOptions {
    parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
});

/// Return the process-wide compute options.
#[must_use]
pub fn global_options() -> ComputeOptions {
    match GLOBAL_OPTIONS.read() {
        Ok(options) => *options,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Replace the process-wide compute options.
pub fn set_global_options(options: ComputeOptions) {
    tracing::debug!(?options, "Updating global compute options");
    match GLOBAL_OPTIONS.write() {
        Ok(mut guard) => *guard = options,
        Err(poisoned) => *poisoned.into_inner() = options,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_update_threshold() {
        let options = ComputeOptions::default().with_parallel_threshold(10);
        assert_eq!(options.parallel_threshold(), 10);
        assert!(options.is_parallel(10));
        assert!(!options.is_parallel(9));

        let mut options = ComputeOptions::default();
        options.set_parallel_threshold(3);
        assert_eq!(options.parallel_threshold(), 3);
    }
}
