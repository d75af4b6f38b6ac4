//! Run metrics: pure reductions over an equity curve.
//!
//! Nothing here knows about the engine. An equity curve (and, for
//! [`TradeStats`], a trade list) goes in, scalars come out, so stored curves
//! can be re-scored without re-running a simulation.

use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;

/// Summary of one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub initial_capital: f64,
    pub final_equity: f64,
    /// (final - initial) / initial.
    pub total_return: f64,
    /// Per-bar mean / std of equity changes, not annualized.
    pub sharpe_approx: f64,
    /// Worst peak-to-trough decline as a fraction, always <= 0.
    pub max_drawdown: f64,
    /// Executed fills, entries and exits both counted.
    pub trade_count: usize,
}

impl RunResult {
    /// Assemble a result from an equity curve. An empty curve means nothing
    /// happened: final equity equals the initial capital.
    pub fn reduce(initial_capital: f64, equity_curve: &[f64], trade_count: usize) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        Self {
            initial_capital,
            final_equity,
            total_return: total_return(initial_capital, final_equity),
            sharpe_approx: sharpe_approx(equity_curve),
            max_drawdown: max_drawdown(equity_curve),
            trade_count,
        }
    }
}

/// Total return as a fraction. 0.0 for a non-positive starting capital.
pub fn total_return(initial: f64, final_equity: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_equity - initial) / initial
}

/// Bar-over-bar fractional changes; 0.0 where the previous value is <= 0.
pub fn pct_changes(equity_curve: &[f64]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 {
                (w[1] - w[0]) / w[0]
            } else {
                0.0
            }
        })
        .collect()
}

/// Sharpe-like ratio: mean(pct) / std(pct), sample std (ddof = 1).
///
/// Returns 0.0 with fewer than 2 changes, or when the std is zero or not finite.
pub fn sharpe_approx(equity_curve: &[f64]) -> f64 {
    let returns = pct_changes(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if !std.is_finite() || std < 1e-15 {
        return 0.0;
    }
    let ratio = mean_f64(&returns) / std;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Maximum drawdown as a negative fraction (0.0 when the curve never dips).
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Round-trip statistics over closed trades, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradeStats {
    pub closed_trades: usize,
    pub win_rate: f64,
    /// Gross profit / gross loss. 0.0 without losers or winners.
    pub profit_factor: f64,
    pub avg_bars_held: f64,
    pub realized_pnl: f64,
}

impl TradeStats {
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }
        let n = trades.len() as f64;
        let winners = trades.iter().filter(|t| t.is_winner()).count();
        let gross_profit: f64 = trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.pnl < 0.0)
            .map(|t| t.pnl.abs())
            .sum();
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            0.0
        };

        Self {
            closed_trades: trades.len(),
            win_rate: winners as f64 / n,
            profit_factor,
            avg_bars_held: trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / n,
            realized_pnl: trades.iter().map(|t| t.pnl).sum(),
        }
    }
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
