//! Numeric-array utilities
//!
//! Small building blocks shared by the step-size controller:
//!
//! - **`products`**: inner products over sequences of state components
//! - **`tolerance`**: tolerances, error-tolerance construction and the RMS norm
//!
//! # Preconditions
//!
//! [`rms_norm`] divides by the element count and the error tolerance divides
//! the error estimate. Empty states and zero tolerances (`rtol = atol = 0`)
//! are caller errors: they are not defended against here and produce
//! non-finite values. Use [`TolerancePair::validate`] in the driver to reject
//! them up front.

pub mod products;
pub mod tolerance;

pub use products::{dot_product, possibly_nonzero, scaled_dot_product};
pub use tolerance::{Tolerance, TolerancePair, error_tolerance, rms_norm};

// =================================================================================================
// Parallel threshold
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// State size above which elementwise passes may run on rayon
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

// Relaxed loads: the threshold only tunes performance, results never depend on it.
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Element count above which [`error_tolerance`] and
/// [`compute_error_ratio`](crate::solver::compute_error_ratio) go parallel
///
/// Has no effect unless the crate is built with the `parallel` feature.
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Change the parallel threshold for the whole process
///
/// # Panics
///
/// When `threshold` is 0.
///
/// # Example
///
/// ```rust
/// use adaptive_ode::numeric::{parallel_threshold, set_parallel_threshold};
///
/// let default = parallel_threshold();
/// set_parallel_threshold(10_000);
/// assert_eq!(parallel_threshold(), 10_000);
/// set_parallel_threshold(default);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Sets the threshold for the duration of a test, restoring it on drop
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
}

#[cfg(test)]
impl ThresholdGuard {
    pub(crate) fn save(threshold: usize) -> Self {
        let previous = parallel_threshold();
        set_parallel_threshold(threshold);
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        set_parallel_threshold(self.previous);
    }
}

// =================================================================================================
// Tests
// =================================================================================================
