//! Runner: ties config, data and the engine together.
//!
//! The core engine never does I/O. This module resolves a [`SimConfig`] into
//! an engine or optimizer, runs it on a loaded history and wraps the output in
//! a serializable report.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use tradesim_core::metrics::TradeStats;
use tradesim_core::{Bar, ParamError, ParameterSet, RunOutput, SimulationEngine};

use crate::config::{ConfigError, SimConfig};
use crate::data_loader::{load_csv, LoadError};
use crate::optimizer::{OptimizationResult, OptimizeError, Optimizer};

/// Current version of persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from a full run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("optimization error: {0}")]
    Optimize(#[from] OptimizeError),
}

/// Everything produced by one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub schema_version: u32,
    pub instrument: String,
    pub signal: String,
    /// Enabled filters, in evaluation order.
    pub filters: Vec<String>,
    pub params: ParameterSet,
    pub stats: TradeStats,
    pub output: RunOutput,
}

/// A search plus a full re-run of the winning parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub schema_version: u32,
    pub seed: u64,
    pub trial_count: usize,
    pub search: OptimizationResult,
    pub best_run: BacktestReport,
}

/// Run one backtest with the `[strategy]` parameters.
pub fn run_backtest(config: &SimConfig, bars: &[Bar]) -> Result<BacktestReport, RunError> {
    run_with_params(config, config.strategy.clone(), bars)
}

/// Run one backtest with `params` in place of `[strategy]`.
pub fn run_with_params(
    config: &SimConfig,
    params: ParameterSet,
    bars: &[Bar],
) -> Result<BacktestReport, RunError> {
    let engine_config = config.to_engine_config().with_params(params);
    let engine = SimulationEngine::with_filters(
        engine_config,
        config.filters.rsi.clone(),
        config.filters.macd.clone(),
    )?;

    let output = engine.run(bars);
    let stats = TradeStats::from_trades(&output.trades);
    let result = &output.result;
    if result.trade_count == 0 {
        warn!(signal = engine.signal_name(), "no trades executed");
    }
    info!(
        signal = engine.signal_name(),
        bars = bars.len(),
        final_equity = result.final_equity,
        total_return = result.total_return,
        sharpe = result.sharpe_approx,
        max_drawdown = result.max_drawdown,
        trades = result.trade_count,
        "backtest complete"
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        instrument: engine.config().instrument.clone(),
        signal: engine.signal_name().to_string(),
        filters: config.filters.names(),
        params: engine.config().params.clone(),
        stats,
        output,
    })
}

/// Search `trial_count` parameter sets (the configured count when `None`)
/// and re-run the best one.
pub fn run_optimization(
    config: &SimConfig,
    bars: &[Bar],
    trial_count: Option<usize>,
    seed: Option<u64>,
) -> Result<OptimizationReport, RunError> {
    let trial_count = trial_count.unwrap_or(config.optimizer.num_trials);
    let seed = seed.unwrap_or(config.optimizer.seed);

    let optimizer = Optimizer::new(
        config.optimizer.ranges.clone(),
        config.to_engine_config(),
        seed,
    )
    .with_parallelism(config.optimizer.parallel)
    .with_filters(config.filters.rsi.clone(), config.filters.macd.clone());

    let search = optimizer.search(bars, trial_count)?;
    let best_run = run_with_params(config, search.best.clone(), bars)?;

    Ok(OptimizationReport {
        schema_version: SCHEMA_VERSION,
        seed,
        trial_count,
        search,
        best_run,
    })
}

/// Load a config (defaults when `config_path` is `None`) and a CSV history.
pub fn load_inputs(
    config_path: Option<&Path>,
    data_path: &Path,
) -> Result<(SimConfig, Vec<Bar>), RunError> {
    let config = match config_path {
        Some(path) => SimConfig::from_path(path)?,
        None => SimConfig::default(),
    };
    let bars = load_csv(data_path)?;
    Ok((config, bars))
}
