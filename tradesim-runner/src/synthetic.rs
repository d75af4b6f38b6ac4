//! Synthetic bar generation for demos and tests.
//!
//! Produces an hourly random walk: each bar's open is the previous open plus
//! a normal step with the configured drift and volatility. High and low are
//! jittered around the open by up to three volatilities, and the close is the
//! mean of open, high and low. An optional crash scales every price from a
//! given bar onward. Prices are rounded to cents; volume is an integer in
//! `[10, 50)`.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tradesim_core::{Bar, ParamError, RngHierarchy};

const SYNTHETIC_STREAM: &str = "synthetic";

/// A sudden drop applied from `at_bar` to the end of the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crash {
    pub at_bar: usize,
    /// Fractional drop, e.g. 0.2 for -20%.
    pub amplitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub start: NaiveDateTime,
    pub bars: usize,
    pub initial_price: f64,
    /// Standard deviation of the per-bar step.
    pub volatility: f64,
    /// Mean of the per-bar step.
    pub drift: f64,
    pub crash: Option<Crash>,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    /// January 2024, hourly, with a 20% crash at mid-month.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or_default(),
            bars: 744,
            initial_price: 100.0,
            volatility: 0.02,
            drift: 0.0005,
            crash: Some(Crash {
                at_bar: 348,
                amplitude: 0.2,
            }),
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.initial_price > 0.0 && self.initial_price.is_finite()) {
            return Err(ParamError::invalid(
                "initial_price",
                format!("must be > 0, got {}", self.initial_price),
            ));
        }
        if !(self.volatility >= 0.0 && self.volatility.is_finite()) {
            return Err(ParamError::invalid(
                "volatility",
                format!("must be >= 0, got {}", self.volatility),
            ));
        }
        if !self.drift.is_finite() {
            return Err(ParamError::invalid("drift", "must be finite"));
        }
        if let Some(crash) = self.crash {
            if !(0.0..1.0).contains(&crash.amplitude) {
                return Err(ParamError::invalid(
                    "crash.amplitude",
                    format!("must be in [0, 1), got {}", crash.amplitude),
                ));
            }
        }
        Ok(())
    }
}

/// Generate the configured series. Same config, same bars.
pub fn generate_bars(config: &SyntheticConfig) -> Result<Vec<Bar>, ParamError> {
    config.validate()?;

    let mut rng = RngHierarchy::new(config.seed).rng_for(SYNTHETIC_STREAM, 0);
    let band = config.volatility * 3.0;
    let mut open = config.initial_price;

    let bars = (0..config.bars)
        .map(|i| {
            open += config.drift + config.volatility * standard_normal(&mut rng);
            let high = open + uniform(&mut rng, band);
            let low = open - uniform(&mut rng, band);
            let close = (open + high + low) / 3.0;
            let volume = rng.gen_range(10..50u32);

            let scale = match config.crash {
                Some(crash) if i >= crash.at_bar => 1.0 - crash.amplitude,
                _ => 1.0,
            };

            Bar::new(
                config.start + Duration::hours(i as i64),
                round_cents(open * scale),
                round_cents(high * scale),
                round_cents(low * scale),
                round_cents(close * scale),
                f64::from(volume),
            )
        })
        .collect();

    Ok(bars)
}

/// Box-Muller transform. `u1` is drawn from (0, 1] so the log is finite.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn uniform(rng: &mut StdRng, upper: f64) -> f64 {
    if upper > 0.0 {
        rng.gen_range(0.0..upper)
    } else {
        0.0
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
