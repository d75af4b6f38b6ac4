//! Relative Strength Index, Wilder smoothing.
//!
//! The first defined value sits at index `period` and is seeded with the plain
//! average of the first `period` gains and losses. After that:
//!
//! ```text
//! avg_gain[t] = (avg_gain[t-1] * (period - 1) + gain[t]) / period
//! RSI[t]      = 100 - 100 / (1 + avg_gain[t] / avg_loss[t])
//! ```
//!
//! A window with no losses reads 100, no gains reads 0, and a flat window
//! reads [`NEUTRAL_RSI`]. Undefined positions are NaN; the RSI filter
//! substitutes the neutral value.

use super::Indicator;
use crate::domain::Bar;

/// Neutral RSI reading used when the indicator is undefined.
pub const NEUTRAL_RSI: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi_of_series(&closes, self.period)
    }
}

/// RSI of an arbitrary series. A NaN inside the seed window leaves the whole
/// output undefined; a NaN later on leaves everything from it onward undefined.
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let split = |delta: f64| (delta.max(0.0), (-delta).max(0.0));
    let mut deltas = values.windows(2).map(|w| w[1] - w[0]);

    let (mut avg_gain, mut avg_loss) = (0.0, 0.0);
    for delta in deltas.by_ref().take(period) {
        if delta.is_nan() {
            return out;
        }
        let (gain, loss) = split(delta);
        avg_gain += gain;
        avg_loss += loss;
    }
    let p = period as f64;
    avg_gain /= p;
    avg_loss /= p;
    out[period] = rsi_from_averages(avg_gain, avg_loss);

    for (slot, delta) in out[period + 1..].iter_mut().zip(deltas) {
        if delta.is_nan() {
            break;
        }
        let (gain, loss) = split(delta);
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        *slot = rsi_from_averages(avg_gain, avg_loss);
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    match (avg_gain == 0.0, avg_loss == 0.0) {
        (true, true) => NEUTRAL_RSI,
        (false, true) => 100.0,
        (true, false) => 0.0,
        (false, false) => 100.0 - 100.0 / (1.0 + avg_gain / avg_loss),
    }
}
