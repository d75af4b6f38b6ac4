//! Simple Moving Average (SMA) with a minimum-periods convention.
//!
//! SMA[t] = mean(close[t-period+1..=t]). The first `period - 1` points are
//! averaged over however many closes are available, so the series has no
//! leading gaps: SMA[0] = close[0], SMA[1] = mean(close[0..=1]), ...
//! A NaN close makes every window that contains it NaN.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Rolling mean with min_periods = 1 over an arbitrary series.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 {
        return result;
    }

    // Finite values are summed; NaNs are counted so a window containing one
    // reports NaN without poisoning the running sum.
    let mut sum = 0.0;
    let mut nan_count = 0usize;

    for i in 0..n {
        let entering = values[i];
        if entering.is_nan() {
            nan_count += 1;
        } else {
            sum += entering;
        }

        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }

        let len = (i + 1).min(period);
        result[i] = if nan_count > 0 {
            f64::NAN
        } else {
            sum / len as f64
        };
    }

    result
}

/// Min-periods mean of the window ending at `index`, without building the
/// whole series. NaN if the window holds a NaN or `index` is out of range.
pub fn sma_at(values: &[f64], period: usize, index: usize) -> f64 {
    if period == 0 || index >= values.len() {
        return f64::NAN;
    }
    let start = (index + 1).saturating_sub(period);
    let window = &values[start..=index];
    if window.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    window.iter().sum::<f64>() / window.len() as f64
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        sma_of_series(&closes, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::bars_from_closes;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);
        let result = Sma::new(5).compute(&bars);

        assert_eq!(result.len(), 7);
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        // SMA[5] = mean(11,12,13,14,15) = 13.0
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        // SMA[6] = mean(12,13,14,15,16) = 14.0
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn leading_points_use_available_history() {
        let bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0]);
        let result = Sma::new(5).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 11.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_close() {
        let bars = bars_from_closes(&[100.0, 200.0, 300.0]);
        let result = Sma::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn reference_slow_series() {
        // Closes used by the engine's hand-computed trace.
        let result = sma_of_series(&[100.0, 105.0, 95.0, 90.0, 120.0], 2);
        let expected = [100.0, 102.5, 100.0, 92.5, 105.0];
        for (r, e) in result.iter().zip(expected) {
            assert_approx(*r, e, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn sma_nan_propagation() {
        let mut bars = bars_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        bars[2].close = f64::NAN;
        let result = Sma::new(3).compute(&bars);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        // Windows [10,11,NaN], [11,NaN,13], [NaN,13,14] → NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // Window [13,14,15] → 14.0
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).lookback(), 19);
        assert_eq!(Sma::new(1).lookback(), 0);
    }

    #[test]
    fn sma_at_matches_series() {
        let values = [3.0, 7.0, 5.0, 9.0, 11.0, 4.0];
        let series = sma_of_series(&values, 4);
        for (i, &expected) in series.iter().enumerate() {
            assert_approx(sma_at(&values, 4, i), expected, DEFAULT_EPSILON);
        }
        assert!(sma_at(&values, 4, 6).is_nan());
        assert!(sma_at(&[1.0, f64::NAN, 2.0], 2, 1).is_nan());
    }
}
