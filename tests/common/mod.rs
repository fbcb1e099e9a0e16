//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_rhs;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_rhs::{ConstantGrowth, ExponentialDecay, HarmonicOscillator};
pub use test_helpers::{
    DriverOutput,
    assert_vectors_close,
    heun_euler,
    relative_error,
};
