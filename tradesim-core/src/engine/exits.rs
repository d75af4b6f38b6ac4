//! Stop-loss and take-profit rules.
//!
//! Percentage mode: levels are fixed bands around the entry price.
//! ATR mode: the stop sits `atr_multiplier * ATR` away from entry, with ATR
//! recomputed on every bar; the target keeps the percentage band. An ATR of
//! 0.0 (warmup) puts the stop at the entry price.

use crate::domain::{ExitReason, PositionSide};
use crate::params::ParameterSet;

/// Exit levels for one position on one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl ExitLevels {
    /// Levels for a position entered at `entry`. `atr` is only read in ATR mode.
    pub fn compute(side: PositionSide, entry: f64, params: &ParameterSet, atr: f64) -> Self {
        let sign = side.sign();
        let stop_loss = if params.use_atr_stop_loss {
            entry - sign * params.atr_multiplier * atr
        } else {
            entry * (1.0 - sign * params.stop_loss_pct)
        };
        Self {
            stop_loss,
            take_profit: entry * (1.0 + sign * params.take_profit_pct),
        }
    }

    /// Which rule, if any, closes the position at `price`. The stop is checked
    /// first. A non-finite price never triggers.
    pub fn check(&self, side: PositionSide, price: f64) -> Option<ExitReason> {
        if !price.is_finite() {
            return None;
        }
        let (stopped, target_hit) = match side {
            PositionSide::Long => (price <= self.stop_loss, price >= self.take_profit),
            PositionSide::Short => (price >= self.stop_loss, price <= self.take_profit),
        };
        if stopped {
            Some(ExitReason::StopLoss)
        } else if target_hit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        }
    }
}
