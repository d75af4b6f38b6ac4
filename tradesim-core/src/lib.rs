//! TradeSim Core: domain types, indicators, signals, sizing, the simulation
//! engine and run metrics.
//!
//! This crate contains the deterministic heart of the backtester:
//! - Domain types (bars, signals, positions, fills, trades, equity points)
//! - Indicator library (SMA, EMA, RSI, MACD, ATR)
//! - SMA crossover signal generation with composable RSI/MACD filters
//! - Risk-based position sizing
//! - Bar-by-bar simulation with percentage or ATR stops
//! - Equity-curve metrics and a seeded RNG hierarchy

pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod params;
pub mod rng;
pub mod signal;
pub mod sizing;

pub use domain::{Bar, EquityPoint, Fill, Position, Signal, TradeRecord};
pub use engine::{ContrarySignalPolicy, EngineConfig, RunOutput, SimulationEngine, TradingMode};
pub use error::ParamError;
pub use metrics::RunResult;
pub use params::ParameterSet;
pub use rng::RngHierarchy;
pub use sizing::RiskSizer;
