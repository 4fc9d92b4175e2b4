//! Shared test utilities for the rain-nowcast workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic patch/label generators with decodable values
//! - Encoded `.npy` payloads for API tests
//! - Directory-tree fixtures for mirror tests
//! - Approximate float assertions
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert that every element of a slice lies in `[lo, hi]`.
#[macro_export]
macro_rules! assert_all_in_range {
    ($values:expr, $lo:expr, $hi:expr) => {{
        for (i, v) in $values.iter().enumerate() {
            let v = *v as f64;
            if !(v >= $lo as f64 && v <= $hi as f64) {
                panic!(
                    "assertion failed: element {} = {:?} outside [{:?}, {:?}]",
                    i, v, $lo, $hi
                );
            }
        }
    }};
}
