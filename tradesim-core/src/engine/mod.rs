//! Simulation engine: a per-instrument FLAT ⇄ IN_POSITION state machine
//! replayed bar by bar.
//!
//! The engine owns its state for the duration of a run and shares nothing
//! mutable, so many runs can proceed in parallel over one borrowed history.

pub mod config;
pub mod exits;
pub mod positions;
pub mod simulation;
pub mod state;

pub use config::{ContrarySignalPolicy, EngineConfig, TradingMode};
pub use exits::ExitLevels;
pub use positions::PositionTable;
pub use simulation::SimulationEngine;
pub use state::{EngineState, RunOutput};
