//! Signal filters: conjunctive gates applied to Buy/Sell signals.
//!
//! A filter only ever vetoes. Hold always passes, and no filter can turn a
//! veto into a different direction.

use crate::domain::{Bar, Signal};
use crate::indicators::rsi::NEUTRAL_RSI;
use crate::indicators::{Indicator, Macd, Rsi};

use super::config::RsiFilterConfig;

/// Trait for signal filters.
///
/// Filters see market data only, never portfolio state.
pub trait SignalFilter: Send + Sync {
    /// Human-readable name (e.g., "rsi_filter").
    fn name(&self) -> &str;

    /// Whether `signal`, raised on the last bar of `history`, may pass.
    fn allows(&self, signal: Signal, history: &[Bar]) -> bool;
}

/// Mean-reversion gate: buy only when oversold, sell only when overbought.
#[derive(Debug, Clone)]
pub struct RsiFilter {
    rsi: Rsi,
    oversold: f64,
    overbought: f64,
}

impl RsiFilter {
    pub fn new(config: &RsiFilterConfig) -> Self {
        Self {
            rsi: Rsi::new(config.period),
            oversold: config.oversold,
            overbought: config.overbought,
        }
    }

    /// RSI at the last bar, neutral (50) when undefined.
    pub fn current(&self, history: &[Bar]) -> f64 {
        match self.rsi.last(history) {
            Some(v) if v.is_finite() => v,
            _ => NEUTRAL_RSI,
        }
    }
}

impl SignalFilter for RsiFilter {
    fn name(&self) -> &str {
        "rsi_filter"
    }

    fn allows(&self, signal: Signal, history: &[Bar]) -> bool {
        match signal {
            Signal::Hold => true,
            Signal::Buy => self.current(history) < self.oversold,
            Signal::Sell => self.current(history) > self.overbought,
        }
    }
}

/// Momentum gate: buy only above the signal line, sell only below it.
#[derive(Debug, Clone)]
pub struct MacdFilter {
    macd: Macd,
}

impl MacdFilter {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            macd: Macd::new(fast, slow, signal),
        }
    }

    /// `(macd, signal)` at the last bar. Both read 0 unless both are defined.
    pub fn current(&self, history: &[Bar]) -> (f64, f64) {
        let lines = self.macd.compute_lines(history);
        match (lines.macd.last(), lines.signal.last()) {
            (Some(&m), Some(&s)) if m.is_finite() && s.is_finite() => (m, s),
            _ => (0.0, 0.0),
        }
    }
}

impl SignalFilter for MacdFilter {
    fn name(&self) -> &str {
        "macd_filter"
    }

    fn allows(&self, signal: Signal, history: &[Bar]) -> bool {
        if signal == Signal::Hold {
            return true;
        }
        let (macd, line) = self.current(history);
        match signal {
            Signal::Buy => macd > line,
            Signal::Sell => macd < line,
            Signal::Hold => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::bars_from_closes;

    fn rsi_filter() -> RsiFilter {
        RsiFilter::new(&RsiFilterConfig {
            period: 3,
            ..Default::default()
        })
    }

    #[test]
    fn hold_always_passes() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        assert!(rsi_filter().allows(Signal::Hold, &bars));
        assert!(MacdFilter::new(2, 4, 3).allows(Signal::Hold, &bars));
    }

    #[test]
    fn rsi_buy_needs_oversold() {
        let falling = bars_from_closes(&[110.0, 108.0, 105.0, 101.0, 96.0]);
        let rising = bars_from_closes(&[96.0, 101.0, 105.0, 108.0, 110.0]);
        let filter = rsi_filter();
        assert!(filter.allows(Signal::Buy, &falling));
        assert!(!filter.allows(Signal::Buy, &rising));
        assert!(filter.allows(Signal::Sell, &rising));
        assert!(!filter.allows(Signal::Sell, &falling));
    }

    #[test]
    fn undefined_rsi_is_neutral_and_blocks() {
        let short = bars_from_closes(&[100.0, 90.0]);
        let filter = rsi_filter();
        assert_eq!(filter.current(&short), NEUTRAL_RSI);
        assert!(!filter.allows(Signal::Buy, &short));
        assert!(!filter.allows(Signal::Sell, &short));
    }

    #[test]
    fn macd_gate_follows_momentum() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        closes.extend((0..4).map(|i| 82.0 + 4.0 * i as f64));
        let turning_up = bars_from_closes(&closes);
        let filter = MacdFilter::new(2, 5, 3);
        assert!(filter.allows(Signal::Buy, &turning_up));
        assert!(!filter.allows(Signal::Sell, &turning_up));
    }

    #[test]
    fn undefined_macd_blocks_both_directions() {
        let short = bars_from_closes(&[100.0, 101.0, 102.0]);
        let filter = MacdFilter::new(3, 6, 4);
        assert_eq!(filter.current(&short), (0.0, 0.0));
        assert!(!filter.allows(Signal::Buy, &short));
        assert!(!filter.allows(Signal::Sell, &short));
    }
}
