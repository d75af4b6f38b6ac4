//! TradeSim Runner: orchestration around the core engine.
//!
//! This crate builds on `tradesim-core` to provide:
//! - TOML configuration with defaults for every key
//! - CSV bar loading and a seeded synthetic bar generator
//! - Single-backtest runner producing serializable reports
//! - Random-search parameter optimizer (sequential or rayon-parallel)
//! - CSV and JSON export of equity curves, trades and trial leaderboards

pub mod config;
pub mod data_loader;
pub mod export;
pub mod optimizer;
pub mod runner;
pub mod synthetic;

pub use config::{ConfigError, SimConfig};
pub use data_loader::{load_csv, read_bars, LoadError};
pub use export::{
    save_backtest, save_bars, save_optimization, BacktestArtifacts, OptimizationArtifacts,
};
pub use optimizer::{
    sample_parameter_set, AtrModeChoice, OptimizationResult, OptimizeError, Optimizer,
    ParameterRanges, TrialOutcome, TrialRecord,
};
pub use runner::{
    load_inputs, run_backtest, run_optimization, run_with_params, BacktestReport,
    OptimizationReport, RunError,
};
pub use synthetic::{generate_bars, Crash, SyntheticConfig};
