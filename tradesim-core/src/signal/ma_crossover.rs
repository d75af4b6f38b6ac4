//! Moving average crossover signal, golden cross and death cross detection.
//!
//! Buy when the fast SMA crosses above the slow SMA, Sell when it crosses
//! below. Optional RSI and MACD filters must all agree before a Buy or Sell
//! leaves the generator.

use tracing::trace;

use crate::domain::{Bar, Signal};
use crate::error::ParamError;
use crate::indicators::sma_at;

use super::config::SignalConfig;
use super::crossover::crossover;
use super::filter::{MacdFilter, RsiFilter, SignalFilter};
use super::SignalGenerator;

/// SMA crossover generator with composed filters.
///
/// SMAs use the min-periods convention, so a crossover can fire from the
/// second bar onward.
pub struct MaCrossover {
    fast_window: usize,
    slow_window: usize,
    filters: Vec<Box<dyn SignalFilter>>,
}

impl std::fmt::Debug for MaCrossover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<&str> = self.filters.iter().map(|flt| flt.name()).collect();
        f.debug_struct("MaCrossover")
            .field("fast_window", &self.fast_window)
            .field("slow_window", &self.slow_window)
            .field("filters", &filters)
            .finish()
    }
}

impl MaCrossover {
    pub fn new(config: &SignalConfig) -> Result<Self, ParamError> {
        config.validate()?;

        let mut filters: Vec<Box<dyn SignalFilter>> = Vec::new();
        if let Some(rsi) = &config.rsi {
            filters.push(Box::new(RsiFilter::new(rsi)));
        }
        if let Some(macd) = &config.macd {
            let (fast, slow, signal) = macd.periods(config.fast_window, config.slow_window);
            filters.push(Box::new(MacdFilter::new(fast, slow, signal)));
        }

        Ok(Self {
            fast_window: config.fast_window,
            slow_window: config.slow_window,
            filters,
        })
    }

    pub fn fast_window(&self) -> usize {
        self.fast_window
    }

    pub fn slow_window(&self) -> usize {
        self.slow_window
    }

    /// Names of the active filters, in evaluation order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Fast minus slow SMA at `index` of `closes`.
    fn spread(&self, closes: &[f64], index: usize) -> f64 {
        sma_at(closes, self.fast_window, index) - sma_at(closes, self.slow_window, index)
    }
}

impl SignalGenerator for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn on_candle(&self, history: &[Bar]) -> Signal {
        let n = history.len();
        if n < 2 {
            return Signal::Hold;
        }

        // Only the windows behind the last two points matter.
        let start = n.saturating_sub(self.slow_window + 1);
        let closes: Vec<f64> = history[start..].iter().map(|b| b.close).collect();
        let last = closes.len() - 1;

        let raw = crossover(self.spread(&closes, last - 1), self.spread(&closes, last));
        if raw == Signal::Hold {
            return raw;
        }

        match self.filters.iter().find(|f| !f.allows(raw, history)) {
            Some(filter) => {
                trace!(filter = filter.name(), signal = %raw, bar = n - 1, "signal vetoed");
                Signal::Hold
            }
            None => raw,
        }
    }
}
