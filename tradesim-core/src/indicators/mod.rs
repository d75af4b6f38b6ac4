//! Indicator library.
//!
//! Indicators are pure functions: bar history in, numeric series out, one value
//! per bar. No value at bar t may depend on bars after t, so computing on
//! `bars[..=t]` and on the full series gives the same value at t.
//!
//! Undefined positions are `f64::NAN` unless the indicator documents an
//! explicit floor (ATR uses 0.0). Callers decide how to neutralize NaN.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::{true_range, Atr};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdLines};
pub use rsi::{rsi_of_series, Rsi};
pub use sma::{sma_at, sma_of_series, Sma};

use crate::domain::Bar;

/// Trait for single-series indicators.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces its first
    /// full-window value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    ///
    /// Returns a `Vec<f64>` of the same length as `bars`.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Value at the last bar, if any.
    fn last(&self, bars: &[Bar]) -> Option<f64> {
        self.compute(bars).last().copied()
    }
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
