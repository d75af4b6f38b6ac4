//! ParameterSet: the tunable knobs of one strategy run.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Named numeric fields consumed by the signal generator, the sizer and the
/// exit rules. A plain value object: the optimizer samples these, the engine
/// reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    /// Fast SMA period.
    pub fast_window: usize,
    /// Slow SMA period. Must be strictly greater than `fast_window`.
    pub slow_window: usize,
    /// Fraction of available cash risked per trade, in (0, 1].
    pub risk_per_trade: f64,
    /// Percentage stop-loss band (0.02 = 2%).
    pub stop_loss_pct: f64,
    /// Percentage take-profit band (0.05 = 5%).
    pub take_profit_pct: f64,
    /// Stop distance in ATR units when `use_atr_stop_loss` is set.
    pub atr_multiplier: f64,
    /// Use `entry - atr_multiplier * ATR` instead of the percentage stop.
    pub use_atr_stop_loss: bool,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            fast_window: 20,
            slow_window: 50,
            risk_per_trade: 0.01,
            stop_loss_pct: 0.02,
            take_profit_pct: 0.05,
            atr_multiplier: 2.0,
            use_atr_stop_loss: false,
        }
    }
}

impl ParameterSet {
    /// Reject parameter sets that cannot describe a valid run.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.fast_window == 0 {
            return Err(ParamError::invalid("fast_window", "must be >= 1"));
        }
        if self.fast_window >= self.slow_window {
            return Err(ParamError::invalid(
                "fast_window",
                format!(
                    "must be < slow_window ({} >= {})",
                    self.fast_window, self.slow_window
                ),
            ));
        }
        if !(self.risk_per_trade > 0.0 && self.risk_per_trade <= 1.0) {
            return Err(ParamError::invalid(
                "risk_per_trade",
                format!("must be in (0, 1], got {}", self.risk_per_trade),
            ));
        }
        if !(self.stop_loss_pct >= 0.0 && self.stop_loss_pct.is_finite()) {
            return Err(ParamError::invalid(
                "stop_loss_pct",
                format!("must be >= 0, got {}", self.stop_loss_pct),
            ));
        }
        if !(self.take_profit_pct >= 0.0 && self.take_profit_pct.is_finite()) {
            return Err(ParamError::invalid(
                "take_profit_pct",
                format!("must be >= 0, got {}", self.take_profit_pct),
            ));
        }
        if !(self.atr_multiplier >= 0.0 && self.atr_multiplier.is_finite()) {
            return Err(ParamError::invalid(
                "atr_multiplier",
                format!("must be >= 0, got {}", self.atr_multiplier),
            ));
        }
        Ok(())
    }
}
