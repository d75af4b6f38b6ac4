//! Moving Average Convergence Divergence (MACD).
//!
//! macd = EMA_fast(close) - EMA_slow(close)
//! signal = EMA_signal(macd), seeded once the macd line is defined
//! histogram = macd - signal
//!
//! All three lines are NaN until defined.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// The three MACD series, each the same length as the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD periods must be >= 1"
        );
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    pub fn compute_lines(&self, bars: &[Bar]) -> MacdLines {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdLines {
            macd,
            signal,
            histogram,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fast.max(self.slow) - 1 + self.signal - 1
    }

    /// The macd line. Use [`Macd::compute_lines`] for signal and histogram.
    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.compute_lines(bars).macd
    }
}
