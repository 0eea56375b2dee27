//! Shared test utilities for the heatmap overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate float assertions
//! - A channel-tolerant color assertion
//! - Synthetic density grid generators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;

pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
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

/// Assert two colors agree channel by channel within `tolerance` (0-255 units).
///
/// Works with any value exposing `r`, `g`, `b` integer fields.
#[macro_export]
macro_rules! assert_color_near {
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let left = &$left;
        let right = &$right;
        let tolerance: i32 = $tolerance;
        let channels = [
            ("r", left.r as i32, right.r as i32),
            ("g", left.g as i32, right.g as i32),
            ("b", left.b as i32, right.b as i32),
        ];
        for (name, l, r) in channels {
            if (l - r).abs() > tolerance {
                panic!(
                    "assertion failed: color channel `{}` differs: left `{:?}`, right `{:?}` (tolerance {})",
                    name, left, right, tolerance
                );
            }
        }
    }};
}
