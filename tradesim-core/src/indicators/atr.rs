//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), TR[0] = high-low.
//! ATR is the simple rolling mean of TR over `period` bars.
//! Positions before `period-1` are 0.0, as is any window that contains a NaN TR.
//! Stops treat 0.0 as "no volatility information", so this floor is part of the
//! contract rather than a missing value.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Compute the True Range series from bars.
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high[t]-low[t], |high[t]-close[t-1]|, |low[t]-close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let n = bars.len();
    let mut tr = vec![f64::NAN; n];

    if n == 0 {
        return tr;
    }

    let (h, l) = (bars[0].high, bars[0].low);
    if !(h.is_nan() || l.is_nan()) {
        tr[0] = h - l;
    }

    for i in 1..n {
        let h = bars[i].high;
        let l = bars[i].low;
        let pc = bars[i - 1].close;
        if !(h.is_nan() || l.is_nan() || pc.is_nan()) {
            tr[i] = (h - l).max((h - pc).abs()).max((l - pc).abs());
        }
    }

    tr
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let tr = true_range(bars);
        let n = tr.len();
        let mut result = vec![0.0; n];

        if n < self.period {
            return result;
        }

        // Window sums are recomputed from scratch so a prefix and the full
        // series produce bit-identical values.
        for i in (self.period - 1)..n {
            let window = &tr[i + 1 - self.period..=i];
            if window.iter().any(|v| v.is_nan()) {
                continue;
            }
            let mean = window.iter().sum::<f64>() / self.period as f64;
            result[i] = if mean.is_finite() { mean } else { 0.0 };
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::bars_from_closes;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn make_bar(day: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(
            NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open,
            high,
            low,
            close,
            1000.0,
        )
    }

    #[test]
    fn true_range_uses_previous_close() {
        let bars = vec![
            make_bar(1, 100.0, 105.0, 95.0, 100.0),
            // Gap up: |high - prev_close| = 15 dominates high - low = 5
            make_bar(2, 112.0, 115.0, 110.0, 113.0),
            // Gap down: |low - prev_close| = 23 dominates
            make_bar(3, 95.0, 96.0, 90.0, 92.0),
        ];
        let tr = true_range(&bars);
        assert_approx(tr[0], 10.0, DEFAULT_EPSILON);
        assert_approx(tr[1], 15.0, DEFAULT_EPSILON);
        assert_approx(tr[2], 23.0, DEFAULT_EPSILON);
    }

    #[test]
    fn atr_is_simple_mean_of_true_range() {
        // TR = [2, 3, 3, 3]
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0]);
        let atr = Atr::new(3).compute(&bars);
        assert_eq!(atr[0], 0.0);
        assert_eq!(atr[1], 0.0);
        assert_approx(atr[2], 8.0 / 3.0, DEFAULT_EPSILON);
        assert_approx(atr[3], 3.0, DEFAULT_EPSILON);
    }

    #[test]
    fn short_history_is_all_zero() {
        let bars = bars_from_closes(&[10.0, 11.0]);
        assert_eq!(Atr::new(14).compute(&bars), vec![0.0, 0.0]);
    }

    #[test]
    fn nan_window_is_zero() {
        let mut bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].high = f64::NAN;
        let atr = Atr::new(2).compute(&bars);
        assert_eq!(atr[2], 0.0);
        assert!(atr[4] > 0.0);
        assert!(atr.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn atr_lookback() {
        assert_eq!(Atr::new(14).lookback(), 13);
    }
}
