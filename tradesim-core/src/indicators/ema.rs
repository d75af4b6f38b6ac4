//! Exponential Moving Average (EMA).
//!
//! EMA[t] = EMA[t-1] + alpha * (x[t] - EMA[t-1]) with alpha = 2 / (period + 1),
//! seeded with the mean of the first `period` defined values.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            name: format!("ema_{period}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.period)
    }
}

/// EMA of an arbitrary series.
///
/// Leading NaNs are skipped, which lets composed indicators (MACD signal line)
/// smooth a series that is itself undefined during its own warmup. A NaN after
/// the seed taints every later value.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return out;
    };
    let seed_index = start + period - 1;
    if seed_index >= values.len() {
        return out;
    }

    let seed_window = &values[start..=seed_index];
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut ema = seed_window.iter().sum::<f64>() / period as f64;
    out[seed_index] = ema;

    let alpha = 2.0 / (period as f64 + 1.0);
    for (slot, &x) in out[seed_index + 1..].iter_mut().zip(&values[seed_index + 1..]) {
        if x.is_nan() {
            break;
        }
        ema += alpha * (x - ema);
        *slot = ema;
    }
    out
}
