//! Result export: CSV for charting tools, JSON for archiving.
//!
//! - **Bars CSV**: `timestamp,open,high,low,close,volume`, readable by the loader
//! - **Equity CSV**: `timestamp,close,equity`, one row per bar
//! - **Trades CSV**: the closed-trade tape
//! - **JSON**: pretty-printed backtest or optimization reports
//!
//! `save_*` functions write a fixed set of files into an output directory and
//! return their paths.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tradesim_core::{Bar, EquityPoint, TradeRecord};

use crate::optimizer::OptimizationResult;
use crate::runner::{BacktestReport, OptimizationReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize any report to pretty JSON.
pub fn export_json<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize report to JSON")
}

/// Bars in the format [`read_bars`](crate::data_loader::read_bars) accepts.
pub fn export_bars_csv(bars: &[Bar]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        wtr.write_record(&[
            bar.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush bars CSV")?;
    String::from_utf8(bytes).context("bars CSV is not valid UTF-8")
}

/// Write bars to `path`, creating parent directories as needed.
pub fn save_bars(bars: &[Bar], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir: {}", parent.display()))?;
    }
    write_file(path, &export_bars_csv(bars)?)
}

/// Equity curve joined with the bar closes it was marked against.
///
/// The curve must be the one produced from `bars` (one point per bar).
pub fn export_equity_csv(bars: &[Bar], equity_curve: &[EquityPoint]) -> Result<String> {
    if bars.len() != equity_curve.len() {
        bail!(
            "equity curve has {} points but there are {} bars",
            equity_curve.len(),
            bars.len()
        );
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["timestamp", "close", "equity"])?;
    for (bar, point) in bars.iter().zip(equity_curve) {
        wtr.write_record(&[
            point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.2}", bar.close),
            format!("{:.2}", point.equity),
        ])?;
    }
    let bytes = wtr.into_inner().context("failed to flush equity CSV")?;
    String::from_utf8(bytes).context("equity CSV is not valid UTF-8")
}

/// Closed-trade tape.
///
/// Columns: side, entry_bar, entry_time, entry_price, exit_bar, exit_time,
/// exit_price, size, pnl, return_pct, bars_held, exit_reason
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "side",
        "entry_bar",
        "entry_time",
        "entry_price",
        "exit_bar",
        "exit_time",
        "exit_price",
        "size",
        "pnl",
        "return_pct",
        "bars_held",
        "exit_reason",
    ])?;

    for t in trades {
        wtr.write_record(&[
            label(&t.side)?,
            t.entry_bar.to_string(),
            t.entry_time.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", t.entry_price),
            t.exit_bar.to_string(),
            t.exit_time.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", t.exit_price),
            format!("{:.6}", t.size),
            format!("{:.4}", t.pnl),
            format!("{:.6}", t.return_pct()),
            t.bars_held.to_string(),
            label(&t.exit_reason)?,
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush trades CSV")?;
    String::from_utf8(bytes).context("trades CSV is not valid UTF-8")
}

/// Leaderboard of the `n` best completed trials.
///
/// Columns: rank, trial, fast_window, slow_window, risk_per_trade,
/// stop_loss_pct, take_profit_pct, atr_multiplier, use_atr_stop_loss,
/// total_return, sharpe_approx, max_drawdown, trade_count
pub fn export_trials_csv(result: &OptimizationResult, n: usize) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "rank",
        "trial",
        "fast_window",
        "slow_window",
        "risk_per_trade",
        "stop_loss_pct",
        "take_profit_pct",
        "atr_multiplier",
        "use_atr_stop_loss",
        "total_return",
        "sharpe_approx",
        "max_drawdown",
        "trade_count",
    ])?;

    for (rank, trial) in result.top_n(n).into_iter().enumerate() {
        let Some(r) = trial.result() else { continue };
        let p = &trial.params;
        wtr.write_record(&[
            (rank + 1).to_string(),
            trial.index.to_string(),
            p.fast_window.to_string(),
            p.slow_window.to_string(),
            format!("{:.4}", p.risk_per_trade),
            format!("{:.4}", p.stop_loss_pct),
            format!("{:.4}", p.take_profit_pct),
            format!("{:.4}", p.atr_multiplier),
            p.use_atr_stop_loss.to_string(),
            format!("{:.6}", r.total_return),
            format!("{:.6}", r.sharpe_approx),
            format!("{:.6}", r.max_drawdown),
            r.trade_count.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush trials CSV")?;
    String::from_utf8(bytes).context("trials CSV is not valid UTF-8")
}

/// snake_case name of a unit enum variant, as serde writes it.
fn label<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_value(value).context("failed to serialize label")?;
    match json {
        serde_json::Value::String(s) => Ok(s),
        other => bail!("expected a string label, got {other}"),
    }
}

/// Paths of files written for one backtest.
#[derive(Debug, Clone)]
pub struct BacktestArtifacts {
    pub report_json: PathBuf,
    pub equity_csv: PathBuf,
    pub trades_csv: PathBuf,
}

/// Paths of files written for one optimization.
#[derive(Debug, Clone)]
pub struct OptimizationArtifacts {
    pub report_json: PathBuf,
    pub trials_csv: PathBuf,
    pub best_run: BacktestArtifacts,
}

/// Write `report.json`, `equity.csv` and `trades.csv` into `output_dir`.
pub fn save_backtest(
    report: &BacktestReport,
    bars: &[Bar],
    output_dir: &Path,
) -> Result<BacktestArtifacts> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let artifacts = BacktestArtifacts {
        report_json: output_dir.join("report.json"),
        equity_csv: output_dir.join("equity.csv"),
        trades_csv: output_dir.join("trades.csv"),
    };
    write_file(&artifacts.report_json, &export_json(report)?)?;
    write_file(
        &artifacts.equity_csv,
        &export_equity_csv(bars, &report.output.equity_curve)?,
    )?;
    write_file(
        &artifacts.trades_csv,
        &export_trades_csv(&report.output.trades)?,
    )?;
    Ok(artifacts)
}

/// Write `optimization.json` and `trials.csv` into `output_dir`, plus the
/// best run's backtest files under `output_dir/best`.
pub fn save_optimization(
    report: &OptimizationReport,
    bars: &[Bar],
    output_dir: &Path,
) -> Result<OptimizationArtifacts> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let report_json = output_dir.join("optimization.json");
    let trials_csv = output_dir.join("trials.csv");
    write_file(&report_json, &export_json(report)?)?;
    write_file(
        &trials_csv,
        &export_trials_csv(&report.search, report.search.trials.len())?,
    )?;
    let best_run = save_backtest(&report.best_run, bars, &output_dir.join("best"))?;

    Ok(OptimizationArtifacts {
        report_json,
        trials_csv,
        best_run,
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}
