//! Domain types for TradeSim.

pub mod bar;
pub mod equity;
pub mod fill;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use equity::EquityPoint;
pub use fill::{Fill, FillSide};
pub use position::{Position, PositionSide};
pub use signal::Signal;
pub use trade::{ExitReason, TradeRecord};
