//! Signal configuration: crossover windows plus optional filters.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::params::ParameterSet;

/// RSI gate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiFilterConfig {
    pub period: usize,
    /// Buy passes only below this level.
    pub oversold: f64,
    /// Sell passes only above this level.
    pub overbought: f64,
}

impl Default for RsiFilterConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiFilterConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.period == 0 {
            return Err(ParamError::invalid("rsi.period", "must be >= 1"));
        }
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !(in_range(self.oversold) && in_range(self.overbought))
            || self.oversold >= self.overbought
        {
            return Err(ParamError::invalid(
                "rsi.oversold",
                format!(
                    "need 0 <= oversold < overbought <= 100, got {} / {}",
                    self.oversold, self.overbought
                ),
            ));
        }
        Ok(())
    }
}

/// MACD gate settings. Unset periods fall back to the crossover windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdFilterConfig {
    pub fast: Option<usize>,
    pub slow: Option<usize>,
    pub signal: usize,
}

impl Default for MacdFilterConfig {
    fn default() -> Self {
        Self {
            fast: None,
            slow: None,
            signal: 9,
        }
    }
}

impl MacdFilterConfig {
    /// Concrete `(fast, slow, signal)` periods given the crossover windows.
    pub fn periods(&self, fast_window: usize, slow_window: usize) -> (usize, usize, usize) {
        (
            self.fast.unwrap_or(fast_window),
            self.slow.unwrap_or(slow_window),
            self.signal,
        )
    }
}

/// Everything needed to build an [`MaCrossover`](super::MaCrossover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi: Option<RsiFilterConfig>,
    pub macd: Option<MacdFilterConfig>,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::crossover(20, 50)
    }
}

impl SignalConfig {
    /// Plain crossover with no filters.
    pub fn crossover(fast_window: usize, slow_window: usize) -> Self {
        Self {
            fast_window,
            slow_window,
            rsi: None,
            macd: None,
        }
    }

    /// Crossover windows taken from a parameter set.
    pub fn from_params(params: &ParameterSet) -> Self {
        Self::crossover(params.fast_window, params.slow_window)
    }

    pub fn with_rsi(mut self, rsi: RsiFilterConfig) -> Self {
        self.rsi = Some(rsi);
        self
    }

    pub fn with_macd(mut self, macd: MacdFilterConfig) -> Self {
        self.macd = Some(macd);
        self
    }

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
        if let Some(rsi) = &self.rsi {
            rsi.validate()?;
        }
        if let Some(macd) = &self.macd {
            let (fast, slow, signal) = macd.periods(self.fast_window, self.slow_window);
            if fast == 0 || slow == 0 || signal == 0 {
                return Err(ParamError::invalid("macd", "periods must be >= 1"));
            }
            if fast >= slow {
                return Err(ParamError::invalid(
                    "macd.fast",
                    format!("must be < macd.slow ({fast} >= {slow})"),
                ));
            }
        }
        Ok(())
    }
}
