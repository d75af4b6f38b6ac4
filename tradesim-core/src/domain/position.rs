//! Position: a single open position on one instrument.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    /// +1.0 for long, -1.0 for short.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

/// An open position. `size` is always positive; direction lives in `side`.
///
/// `stop_loss` and `take_profit` are the levels fixed at entry. In ATR mode
/// the engine recomputes the effective stop every bar instead of reading
/// `stop_loss`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: f64,
    pub size: f64,
    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub stop_loss: f64,
    pub take_profit: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.side == PositionSide::Long
    }

    pub fn is_short(&self) -> bool {
        self.side == PositionSide::Short
    }

    /// Size with sign: positive for long, negative for short.
    pub fn signed_size(&self) -> f64 {
        self.side.sign() * self.size
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.signed_size() * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.signed_size() * (price - self.entry_price)
    }
}
