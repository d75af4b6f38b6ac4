//! Mutable run state and the run output.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    EquityPoint, ExitReason, Fill, FillSide, Position, PositionSide, TradeRecord,
};
use crate::metrics::RunResult;

use super::positions::PositionTable;

/// State that evolves bar-by-bar during one run. Owned by that run only.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub cash: f64,
    pub positions: PositionTable,
    pub fills: Vec<Fill>,
    pub trades: Vec<TradeRecord>,
    pub equity_curve: Vec<EquityPoint>,
    /// Last finite close, used to mark open positions through void bars.
    pub last_valid_close: Option<f64>,
    /// Bars whose close could not be traded (NaN, infinite or <= 0).
    pub degenerate_bars: usize,
}

impl EngineState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            positions: PositionTable::new(),
            fills: Vec::new(),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            last_valid_close: None,
            degenerate_bars: 0,
        }
    }

    /// Open `position` on `instrument`, moving `signed_size * price` out of cash.
    /// Returns false (and changes nothing) if the instrument already has one.
    pub fn open_position(&mut self, instrument: &str, position: Position) -> bool {
        let cost = position.market_value(position.entry_price);
        let fill = Fill {
            bar_index: position.entry_bar,
            timestamp: position.entry_time,
            side: match position.side {
                PositionSide::Long => FillSide::Buy,
                PositionSide::Short => FillSide::Sell,
            },
            price: position.entry_price,
            size: position.size,
        };
        let side = position.side;
        if self.positions.open(instrument, position).is_err() {
            return false;
        }
        debug!(
            instrument,
            side = ?side,
            price = fill.price,
            size = fill.size,
            bar = fill.bar_index,
            "open position"
        );
        self.cash -= cost;
        self.fills.push(fill);
        true
    }

    /// Close the position on `instrument` at `price`, returning the trade.
    pub fn close_position(
        &mut self,
        instrument: &str,
        price: f64,
        bar_index: usize,
        timestamp: NaiveDateTime,
        reason: ExitReason,
    ) -> Option<&TradeRecord> {
        let position = self.positions.close(instrument)?;
        self.cash += position.market_value(price);

        self.fills.push(Fill {
            bar_index,
            timestamp,
            side: match position.side {
                PositionSide::Long => FillSide::Sell,
                PositionSide::Short => FillSide::Buy,
            },
            price,
            size: position.size,
        });

        let trade = TradeRecord {
            side: position.side,
            entry_bar: position.entry_bar,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_bar: bar_index,
            exit_time: timestamp,
            exit_price: price,
            size: position.size,
            pnl: position.unrealized_pnl(price),
            bars_held: bar_index.saturating_sub(position.entry_bar),
            exit_reason: reason,
        };
        debug!(
            instrument,
            side = ?trade.side,
            price,
            pnl = trade.pnl,
            reason = ?reason,
            bar = bar_index,
            "close position"
        );
        self.trades.push(trade);
        self.trades.last()
    }

    /// Equity at the last valid close: cash plus the market value of every
    /// open position.
    pub fn equity(&self) -> f64 {
        let position_value: f64 = match self.last_valid_close {
            Some(price) => self.positions.iter().map(|(_, p)| p.market_value(price)).sum(),
            None => 0.0,
        };
        self.cash + position_value
    }

    /// Append one equity point, checking the accounting identity in debug builds.
    pub fn mark(&mut self, bar_index: usize, timestamp: NaiveDateTime) -> f64 {
        let equity = self.equity();

        #[cfg(debug_assertions)]
        {
            assert!(
                self.positions.len() <= 1,
                "more than one open position at bar {bar_index}"
            );
            if self.positions.is_empty() {
                assert!(
                    (equity - self.cash).abs() < 1e-9,
                    "equity accounting violated: flat equity={equity} != cash={}",
                    self.cash
                );
            }
        }

        self.equity_curve.push(EquityPoint {
            bar_index,
            timestamp,
            equity,
        });
        equity
    }

    /// Finish the run: reduce the curve into a `RunResult`.
    pub fn into_output(self, initial_capital: f64) -> RunOutput {
        let curve: Vec<f64> = self.equity_curve.iter().map(|p| p.equity).collect();
        let result = RunResult::reduce(initial_capital, &curve, self.fills.len());
        RunOutput {
            result,
            equity_curve: self.equity_curve,
            trades: self.trades,
            fills: self.fills,
        }
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub result: RunResult,
    /// One point per input bar.
    pub equity_curve: Vec<EquityPoint>,
    /// Closed round trips. A position still open at the end is not included.
    pub trades: Vec<TradeRecord>,
    pub fills: Vec<Fill>,
}

impl RunOutput {
    /// Equity values without timestamps.
    pub fn equity_values(&self) -> Vec<f64> {
        self.equity_curve.iter().map(|p| p.equity).collect()
    }
}
