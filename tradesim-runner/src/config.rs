//! TOML configuration for backtest and optimization runs.
//!
//! Every key has a default, so an empty file is a valid configuration:
//!
//! ```toml
//! [backtest]
//! initial_capital = 10000.0
//! instrument = "BTCUSDT"
//! trading_mode = "long_only"      # or "long_short"
//! contrary_signal = "ignore"      # or "close"
//! atr_period = 14
//!
//! [strategy]
//! fast_window = 20
//! slow_window = 50
//! risk_per_trade = 0.01
//! stop_loss_pct = 0.02
//! take_profit_pct = 0.05
//! atr_multiplier = 2.0
//! use_atr_stop_loss = false
//!
//! [filters.rsi]                   # present = enabled
//! period = 14
//!
//! [sizing]
//! min_lot = 0.001
//!
//! [optimizer]
//! num_trials = 50
//! seed = 42
//!
//! [optimizer.ranges]
//! fast_window = [5, 30]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradesim_core::signal::{MacdFilterConfig, RsiFilterConfig, SignalConfig};
use tradesim_core::{
    ContrarySignalPolicy, EngineConfig, ParamError, ParameterSet, RiskSizer, TradingMode,
};

use crate::optimizer::ParameterRanges;

/// Errors from reading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] ParamError),
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub backtest: BacktestSection,
    pub strategy: ParameterSet,
    pub filters: FiltersSection,
    pub sizing: SizingSection,
    pub optimizer: OptimizerSection,
}

/// `[backtest]`: account and engine behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub initial_capital: f64,
    pub instrument: String,
    pub trading_mode: TradingMode,
    pub contrary_signal: ContrarySignalPolicy,
    pub atr_period: usize,
}

impl Default for BacktestSection {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            initial_capital: engine.initial_capital,
            instrument: engine.instrument,
            trading_mode: engine.trading_mode,
            contrary_signal: engine.contrary_signal,
            atr_period: engine.atr_period,
        }
    }
}

/// `[filters]`: a filter is enabled by the presence of its table.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiFilterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdFilterConfig>,
}

impl FiltersSection {
    pub fn is_empty(&self) -> bool {
        self.rsi.is_none() && self.macd.is_none()
    }

    /// Names of the enabled filters, RSI first.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if self.rsi.is_some() {
            names.push("rsi".to_string());
        }
        if self.macd.is_some() {
            names.push("macd".to_string());
        }
        names
    }
}

/// `[sizing]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingSection {
    pub min_lot: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_position_fraction: Option<f64>,
}

impl Default for SizingSection {
    fn default() -> Self {
        let sizer = EngineConfig::default().sizer;
        Self {
            min_lot: sizer.min_lot,
            max_position_fraction: sizer.max_position_fraction,
        }
    }
}

impl From<SizingSection> for RiskSizer {
    fn from(section: SizingSection) -> Self {
        RiskSizer::new(section.min_lot, section.max_position_fraction)
    }
}

/// `[optimizer]`: random-search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSection {
    pub num_trials: usize,
    pub seed: u64,
    /// Run trials on the rayon thread pool.
    pub parallel: bool,
    pub ranges: ParameterRanges,
}

impl Default for OptimizerSection {
    fn default() -> Self {
        Self {
            num_trials: 50,
            seed: 42,
            parallel: true,
            ranges: ParameterRanges::default(),
        }
    }
}

impl SimConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Crossover windows from `[strategy]` plus the enabled filters.
    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            rsi: self.filters.rsi.clone(),
            macd: self.filters.macd.clone(),
            ..SignalConfig::from_params(&self.strategy)
        }
    }

    /// Engine configuration for a single run with the `[strategy]` parameters.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.backtest.initial_capital,
            params: self.strategy.clone(),
            atr_period: self.backtest.atr_period,
            sizer: self.sizing.into(),
            trading_mode: self.backtest.trading_mode,
            contrary_signal: self.backtest.contrary_signal,
            instrument: self.backtest.instrument.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_engine_config().validate()?;
        self.signal_config().validate()?;
        self.optimizer.ranges.validate().map_err(|e| {
            ConfigError::Invalid(ParamError::invalid("optimizer.ranges", e.to_string()))
        })?;
        Ok(())
    }
}
