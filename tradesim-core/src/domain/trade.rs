//! TradeRecord: a closed round trip.

use super::position::PositionSide;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    /// Closed by a contrary signal (only under `ContrarySignalPolicy::Close`).
    Signal,
}

/// A complete round trip: entry → exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: PositionSide,

    pub entry_bar: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,

    pub exit_bar: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,

    pub size: f64,
    pub pnl: f64,
    pub bars_held: usize,
    pub exit_reason: ExitReason,
}

impl TradeRecord {
    /// Return on the trade as a fraction of entry notional.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price == 0.0 || self.size == 0.0 {
            return 0.0;
        }
        self.pnl / (self.entry_price * self.size)
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_trade(side: PositionSide, exit_price: f64) -> TradeRecord {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let pnl = side.sign() * 10.0 * (exit_price - 100.0);
        TradeRecord {
            side,
            entry_bar: 4,
            entry_time: t0,
            entry_price: 100.0,
            exit_bar: 8,
            exit_time: t0 + chrono::Duration::hours(4),
            exit_price,
            size: 10.0,
            pnl,
            bars_held: 4,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn long_winner_return() {
        let trade = sample_trade(PositionSide::Long, 110.0);
        assert!(trade.is_winner());
        assert!((trade.return_pct() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn short_loser_return() {
        let trade = sample_trade(PositionSide::Short, 110.0);
        assert!(!trade.is_winner());
        assert!((trade.return_pct() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn exit_reason_snake_case() {
        let json = serde_json::to_string(&ExitReason::StopLoss).unwrap();
        assert_eq!(json, "\"stop_loss\"");
    }
}
