//! Technical indicator implementations.
//!
//! Indicators are plain functions over a slice of closes and return one value per
//! input element, so a value at index `i` only ever depends on `values[..=i]`.

pub mod ema;
pub mod rsi;

/// Sign of `v` as -1, 0 or 1.
pub fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}
