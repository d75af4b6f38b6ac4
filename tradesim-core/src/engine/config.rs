//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::params::ParameterSet;
use crate::sizing::RiskSizer;

/// Which directions a flat engine may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingMode {
    /// Buy opens a long; Sell while flat is ignored.
    #[default]
    LongOnly,
    /// Buy opens a long, Sell opens a short.
    LongShort,
}

/// What a signal against the open position does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrarySignalPolicy {
    /// Only the stop and target rules close positions.
    #[default]
    Ignore,
    /// Close at the bar's close with reason `Signal`. Nothing opens on that bar.
    Close,
}

/// Configuration for a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub initial_capital: f64,
    pub params: ParameterSet,
    /// ATR window for ATR-mode stops.
    pub atr_period: usize,
    pub sizer: RiskSizer,
    pub trading_mode: TradingMode,
    pub contrary_signal: ContrarySignalPolicy,
    /// Key in the position table.
    pub instrument: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            params: ParameterSet::default(),
            atr_period: 14,
            sizer: RiskSizer::new(0.001, None),
            trading_mode: TradingMode::LongOnly,
            contrary_signal: ContrarySignalPolicy::Ignore,
            instrument: "default".into(),
        }
    }
}

impl EngineConfig {
    pub fn new(initial_capital: f64, params: ParameterSet) -> Self {
        Self {
            initial_capital,
            params,
            ..Default::default()
        }
    }

    pub fn with_sizer(mut self, sizer: RiskSizer) -> Self {
        self.sizer = sizer;
        self
    }

    pub fn with_trading_mode(mut self, mode: TradingMode) -> Self {
        self.trading_mode = mode;
        self
    }

    pub fn with_contrary_signal(mut self, policy: ContrarySignalPolicy) -> Self {
        self.contrary_signal = policy;
        self
    }

    /// Same configuration with a different parameter set.
    pub fn with_params(&self, params: ParameterSet) -> Self {
        Self {
            params,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.initial_capital > 0.0 && self.initial_capital.is_finite()) {
            return Err(ParamError::invalid(
                "initial_capital",
                format!("must be > 0, got {}", self.initial_capital),
            ));
        }
        if self.atr_period == 0 {
            return Err(ParamError::invalid("atr_period", "must be >= 1"));
        }
        if self.instrument.is_empty() {
            return Err(ParamError::invalid("instrument", "must not be empty"));
        }
        self.params.validate()?;
        self.sizer.validate()
    }
}
