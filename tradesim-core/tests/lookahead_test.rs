//! Look-ahead contamination tests for indicators and signals.
//!
//! Invariant: no value at bar t may depend on bars after t.
//!
//! Method: compute on a truncated series (bars 0..100) and on the full series
//! (bars 0..200). Bars 0..100 must be identical between both runs.

use chrono::NaiveDate;
use tradesim_core::domain::Bar;
use tradesim_core::indicators::*;
use tradesim_core::signal::{MaCrossover, MacdFilterConfig, RsiFilterConfig, SignalConfig, SignalGenerator};

/// Generate N bars of synthetic OHLCV data with realistic variation.
fn make_test_bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0;

    for i in 0..n {
        // Deterministic pseudo-random walk using a simple LCG
        let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
        let change = ((seed % 200) as f64 - 100.0) * 0.05; // -5.0 to +5.0
        price += change;
        price = price.max(10.0); // floor at 10

        let open = price - 0.5;
        let close = price + 0.3;
        bars.push(Bar {
            timestamp: base + chrono::Duration::hours(i as i64),
            open,
            high: open.max(close) + 2.0,
            low: open.min(close) - 2.0,
            close,
            volume: 1000.0 + (i as f64 * 100.0),
        });
    }
    bars
}

fn assert_prefix_identical(name: &str, truncated: &[f64], full: &[f64]) {
    for (t, (a, b)) in truncated.iter().zip(full).enumerate() {
        assert!(
            (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits(),
            "{name} look-ahead at bar {t}: truncated={a}, full={b}"
        );
    }
}

#[test]
fn indicators_do_not_look_ahead() {
    let bars = make_test_bars(200);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(20)),
        Box::new(Ema::new(12)),
        Box::new(Rsi::new(14)),
        Box::new(Atr::new(14)),
        Box::new(Macd::new(12, 26, 9)),
    ];
    for ind in &indicators {
        let truncated = ind.compute(&bars[..100]);
        let full = ind.compute(&bars);
        assert_prefix_identical(ind.name(), &truncated, &full[..100]);
    }
}

#[test]
fn macd_signal_line_does_not_look_ahead() {
    let bars = make_test_bars(200);
    let macd = Macd::new(12, 26, 9);
    let truncated = macd.compute_lines(&bars[..100]);
    let full = macd.compute_lines(&bars);
    assert_prefix_identical("macd_signal", &truncated.signal, &full.signal[..100]);
}

#[test]
fn filtered_signals_do_not_look_ahead() {
    let bars = make_test_bars(200);
    let config = SignalConfig::crossover(5, 20)
        .with_rsi(RsiFilterConfig {
            oversold: 45.0,
            overbought: 55.0,
            ..Default::default()
        })
        .with_macd(MacdFilterConfig::default());
    let signal = MaCrossover::new(&config).unwrap();

    let truncated = signal.generate_series(&bars[..100]);
    let full = signal.generate_series(&bars);
    assert_eq!(truncated, full[..100].to_vec());
}

#[test]
fn generate_series_equals_per_prefix_on_candle() {
    let bars = make_test_bars(120);
    let signal = MaCrossover::new(&SignalConfig::crossover(3, 11)).unwrap();
    let series = signal.generate_series(&bars);
    for t in 0..bars.len() {
        assert_eq!(series[t], signal.on_candle(&bars[..=t]), "bar {t}");
    }
}
