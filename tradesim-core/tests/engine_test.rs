//! Integration tests for the simulation engine.
//!
//! Tests:
//! 1. Hand-computed reference trace (SMA 1/2 crossover, 5% stop, 10% target)
//! 2. Contrary signals under both policies
//! 3. Short side in LongShort mode
//! 4. ATR stops versus percentage stops
//! 5. Degenerate inputs (always-Hold, zero and NaN prices)

use chrono::NaiveDate;
use tradesim_core::domain::{Bar, ExitReason, FillSide, PositionSide, Signal};
use tradesim_core::engine::{ContrarySignalPolicy, EngineConfig, SimulationEngine, TradingMode};
use tradesim_core::signal::{NullSignal, SignalGenerator};
use tradesim_core::ParameterSet;

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Hourly bars with a fixed ±1 range around each close.
fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: base + chrono::Duration::hours(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        })
        .collect()
}

fn trace_params() -> ParameterSet {
    ParameterSet {
        fast_window: 1,
        slow_window: 2,
        risk_per_trade: 0.1,
        stop_loss_pct: 0.05,
        take_profit_pct: 0.10,
        atr_multiplier: 2.0,
        use_atr_stop_loss: false,
    }
}

fn crossover_engine(config: EngineConfig) -> SimulationEngine {
    SimulationEngine::from_params(config).unwrap()
}

/// Replays a fixed list of signals, one per bar.
struct Scripted(Vec<Signal>);

impl SignalGenerator for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn on_candle(&self, history: &[Bar]) -> Signal {
        self.0
            .get(history.len().saturating_sub(1))
            .copied()
            .unwrap_or(Signal::Hold)
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "actual={actual}, expected={expected}"
    );
}

// ──────────────────────────────────────────────
// Reference trace
// ──────────────────────────────────────────────

#[test]
fn reference_trace() {
    let bars = make_bars(&[100.0, 105.0, 95.0, 90.0, 120.0]);
    let out = crossover_engine(EngineConfig::new(10_000.0, trace_params())).run(&bars);

    // Buy @105, stop @95 (95 <= 99.75), Sell crossover ignored while flat,
    // Buy @120 left open.
    assert_eq!(out.fills.len(), 3);
    assert_eq!(out.result.trade_count, 3);
    assert_eq!(out.fills[0].side, FillSide::Buy);
    assert_eq!(out.fills[0].bar_index, 1);
    assert_eq!(out.fills[1].side, FillSide::Sell);
    assert_eq!(out.fills[1].bar_index, 2);
    assert_eq!(out.fills[2].side, FillSide::Buy);
    assert_eq!(out.fills[2].bar_index, 4);
    assert_close(out.fills[2].price, 120.0);

    assert_eq!(out.trades.len(), 1);
    assert_eq!(out.trades[0].exit_reason, ExitReason::StopLoss);
    assert_close(out.trades[0].pnl, -(1_000.0 / 105.0) * 10.0);

    let expected_final = 10_000.0 - (1_000.0 / 105.0) * 10.0;
    let curve = out.equity_values();
    let expected_curve = [
        10_000.0,
        10_000.0,
        expected_final,
        expected_final,
        expected_final,
    ];
    for (a, e) in curve.iter().zip(expected_curve) {
        assert_close(*a, e);
    }

    assert_close(out.result.final_equity, 9_904.761_904_76);
    assert_close(out.result.total_return, -0.009_523_809_52);
    assert_close(out.result.max_drawdown, -0.009_523_809_52);
    assert!(out.result.sharpe_approx < 0.0);
    assert_eq!(out.result.initial_capital, 10_000.0);
}

#[test]
fn reference_trace_is_bit_identical_across_runs() {
    let bars = make_bars(&[100.0, 105.0, 95.0, 90.0, 120.0]);
    let engine = crossover_engine(EngineConfig::new(10_000.0, trace_params()));
    let a = engine.run(&bars);
    let b = engine.run(&bars);
    assert_eq!(a, b);
    assert_eq!(
        a.result.final_equity.to_bits(),
        b.result.final_equity.to_bits()
    );
}

// ──────────────────────────────────────────────
// Contrary signals
// ──────────────────────────────────────────────

/// Buy @105, Sell @103, Buy @104, Sell @101 (fast 1 / slow 2). No stop or
/// target is reached.
const CONTRARY: [f64; 5] = [100.0, 105.0, 103.0, 104.0, 101.0];

#[test]
fn contrary_signal_ignored_by_default() {
    let bars = make_bars(&CONTRARY);
    let out = crossover_engine(EngineConfig::new(10_000.0, trace_params())).run(&bars);

    assert_eq!(out.fills.len(), 1);
    assert!(out.trades.is_empty());
    assert_close(out.result.final_equity, 9_000.0 + (1_000.0 / 105.0) * 101.0);
}

#[test]
fn contrary_signal_closes_under_close_policy() {
    let bars = make_bars(&CONTRARY);
    let config = EngineConfig::new(10_000.0, trace_params())
        .with_contrary_signal(ContrarySignalPolicy::Close);
    let out = crossover_engine(config).run(&bars);

    assert_eq!(out.fills.len(), 4);
    assert_eq!(out.trades.len(), 2);
    assert!(out
        .trades
        .iter()
        .all(|t| t.exit_reason == ExitReason::Signal));
    assert_eq!(out.trades[0].exit_bar, 2);
    assert_close(out.trades[0].exit_price, 103.0);
    // Re-entry waits for the next Buy; nothing opens on the closing bar.
    assert_eq!(out.trades[1].entry_bar, 3);
}

#[test]
fn same_direction_signal_is_ignored() {
    let bars = make_bars(&[100.0, 101.0, 102.0, 103.0]);
    let engine = SimulationEngine::new(
        EngineConfig::new(10_000.0, trace_params()),
        Box::new(Scripted(vec![Signal::Hold, Signal::Buy, Signal::Buy, Signal::Buy])),
    )
    .unwrap();
    let out = engine.run(&bars);
    assert_eq!(out.fills.len(), 1);
}

// ──────────────────────────────────────────────
// Short side
// ──────────────────────────────────────────────

#[test]
fn long_short_opens_and_covers_short() {
    // Sell @95 opens a short (stop 99.75, target 85.5); target hit @80.
    let bars = make_bars(&[100.0, 95.0, 97.0, 90.0, 80.0]);
    let config =
        EngineConfig::new(10_000.0, trace_params()).with_trading_mode(TradingMode::LongShort);
    let out = crossover_engine(config).run(&bars);

    assert_eq!(out.fills[0].side, FillSide::Sell);
    assert_eq!(out.trades.len(), 1);
    let trade = &out.trades[0];
    assert_eq!(trade.side, PositionSide::Short);
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_close(trade.exit_price, 80.0);

    let size = 1_000.0 / 95.0;
    assert_close(trade.pnl, size * 15.0);
    assert_close(out.result.final_equity, 10_000.0 + size * 15.0);
    assert!(out.result.total_return > 0.0);
}

#[test]
fn long_only_never_shorts() {
    let bars = make_bars(&[100.0, 95.0, 97.0, 90.0, 80.0]);
    let out = crossover_engine(EngineConfig::new(10_000.0, trace_params())).run(&bars);
    assert!(out.trades.iter().all(|t| t.side == PositionSide::Long));
    assert_eq!(out.fills.first().map(|f| f.side), Some(FillSide::Buy));
}

#[test]
fn short_equity_marks_against_rising_price() {
    let bars = make_bars(&[100.0, 100.0, 102.0]);
    let params = ParameterSet {
        stop_loss_pct: 0.5,
        take_profit_pct: 0.5,
        ..trace_params()
    };
    let engine = SimulationEngine::new(
        EngineConfig::new(1_000.0, params).with_trading_mode(TradingMode::LongShort),
        Box::new(Scripted(vec![Signal::Hold, Signal::Sell, Signal::Hold])),
    )
    .unwrap();
    let out = engine.run(&bars);
    // size 1, cash 1100; at 102: 1100 - 102
    assert_close(out.equity_values()[2], 998.0);
}

// ──────────────────────────────────────────────
// ATR stops
// ──────────────────────────────────────────────

/// ATR(2) over these bars is [0, 2, 2.5, 2.5, 2.5].
fn atr_bars() -> Vec<Bar> {
    make_bars(&[100.0, 100.0, 102.0, 101.0, 99.0])
}

fn atr_engine(use_atr: bool) -> SimulationEngine {
    let params = ParameterSet {
        stop_loss_pct: 0.005,
        take_profit_pct: 0.10,
        atr_multiplier: 1.0,
        use_atr_stop_loss: use_atr,
        ..trace_params()
    };
    let config = EngineConfig {
        atr_period: 2,
        ..EngineConfig::new(10_000.0, params)
    };
    SimulationEngine::new(
        config,
        Box::new(Scripted(vec![
            Signal::Hold,
            Signal::Hold,
            Signal::Buy,
            Signal::Hold,
            Signal::Hold,
        ])),
    )
    .unwrap()
}

#[test]
fn atr_stop_is_wider_than_tight_percentage_stop() {
    let pct = atr_engine(false).run(&atr_bars());
    assert_eq!(pct.trades[0].exit_bar, 3);
    assert_close(pct.trades[0].exit_price, 101.0);

    // Stop at 102 - 1.0 * 2.5 = 99.5: survives 101, exits at 99.
    let atr = atr_engine(true).run(&atr_bars());
    assert_eq!(atr.trades.len(), 1);
    assert_eq!(atr.trades[0].exit_bar, 4);
    assert_eq!(atr.trades[0].exit_reason, ExitReason::StopLoss);
    assert_close(atr.trades[0].exit_price, 99.0);
}

// ──────────────────────────────────────────────
// Degenerate inputs
// ──────────────────────────────────────────────

#[test]
fn always_hold_gives_constant_curve() {
    let bars = make_bars(&[100.0, 150.0, 50.0, 120.0, 80.0]);
    let engine =
        SimulationEngine::new(EngineConfig::new(2_500.0, trace_params()), Box::new(NullSignal))
            .unwrap();
    let out = engine.run(&bars);
    assert!(out.equity_values().iter().all(|&e| e == 2_500.0));
    assert_eq!(out.result.trade_count, 0);
    assert_eq!(out.result.total_return, 0.0);
    assert_eq!(out.result.sharpe_approx, 0.0);
    assert_eq!(out.result.max_drawdown, 0.0);
}

#[test]
fn nan_close_carries_mark_forward() {
    let mut bars = make_bars(&[100.0, 100.0, 100.0, 110.0]);
    bars[2].close = f64::NAN;
    let params = ParameterSet {
        stop_loss_pct: 0.5,
        take_profit_pct: 0.5,
        ..trace_params()
    };
    let engine = SimulationEngine::new(
        EngineConfig::new(1_000.0, params),
        Box::new(Scripted(vec![Signal::Hold, Signal::Buy])),
    )
    .unwrap();
    let out = engine.run(&bars);
    let curve = out.equity_values();
    assert!(curve.iter().all(|e| e.is_finite()));
    assert_close(curve[2], 1_000.0);
    assert_close(curve[3], 1_000.0 + 1.0 * 10.0);
}

#[test]
fn zero_close_opens_nothing() {
    let bars = make_bars(&[100.0, 0.0, 0.0]);
    let engine = SimulationEngine::new(
        EngineConfig::new(1_000.0, trace_params()),
        Box::new(Scripted(vec![Signal::Hold, Signal::Buy, Signal::Sell])),
    )
    .unwrap();
    let out = engine.run(&bars);
    assert!(out.fills.is_empty());
    assert_eq!(out.result.final_equity, 1_000.0);
}
