use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Total portfolio value at the close of one bar: cash plus the marked value
/// of any open position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}
