//! Signal generation.
//!
//! A generator maps a bar history (ending at the current bar) to exactly one
//! `Signal`. Generators never see portfolio state: they answer "what does the
//! market say?", and the engine decides what to do with the answer.

pub mod config;
pub mod crossover;
pub mod filter;
pub mod ma_crossover;

pub use config::{MacdFilterConfig, RsiFilterConfig, SignalConfig};
pub use crossover::crossover;
pub use filter::{MacdFilter, RsiFilter, SignalFilter};
pub use ma_crossover::MaCrossover;

use crate::domain::{Bar, Signal};

/// Trait for signal generators.
///
/// `on_candle` must be deterministic and may only read `history`, whose last
/// element is the current bar.
pub trait SignalGenerator: Send + Sync {
    /// Human-readable name (e.g., "ma_crossover").
    fn name(&self) -> &str;

    /// Decide on the current bar.
    fn on_candle(&self, history: &[Bar]) -> Signal;

    /// Signal for every bar, evaluated on each prefix in turn.
    fn generate_series(&self, bars: &[Bar]) -> Vec<Signal> {
        (0..bars.len())
            .map(|t| self.on_candle(&bars[..=t]))
            .collect()
    }
}

/// Generator that never trades.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSignal;

impl SignalGenerator for NullSignal {
    fn name(&self) -> &str {
        "null"
    }

    fn on_candle(&self, _history: &[Bar]) -> Signal {
        Signal::Hold
    }
}
