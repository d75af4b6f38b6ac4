use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of an executed fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillSide {
    Buy,
    Sell,
}

/// One executed entry or exit at the bar's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub bar_index: usize,
    pub timestamp: NaiveDateTime,
    pub side: FillSide,
    pub price: f64,
    pub size: f64,
}
