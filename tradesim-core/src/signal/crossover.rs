//! Sign-change detection on a spread series.

use crate::domain::Signal;

/// Classify the move of a spread (fast minus slow) from `prev` to `cur`.
///
/// Buy when the spread goes from non-positive to positive, Sell when it goes
/// from non-negative to negative. Touching zero from either side, staying at
/// zero, or any non-finite input is Hold.
pub fn crossover(prev: f64, cur: f64) -> Signal {
    if !prev.is_finite() || !cur.is_finite() {
        return Signal::Hold;
    }
    if prev <= 0.0 && cur > 0.0 {
        Signal::Buy
    } else if prev >= 0.0 && cur < 0.0 {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upward_cross_is_buy() {
        assert_eq!(crossover(-1.0, 1.0), Signal::Buy);
        assert_eq!(crossover(0.0, 0.5), Signal::Buy);
    }

    #[test]
    fn downward_cross_is_sell() {
        assert_eq!(crossover(1.0, -1.0), Signal::Sell);
        assert_eq!(crossover(0.0, -0.5), Signal::Sell);
    }

    #[test]
    fn no_cross_is_hold() {
        assert_eq!(crossover(1.0, 2.0), Signal::Hold);
        assert_eq!(crossover(-1.0, -2.0), Signal::Hold);
        assert_eq!(crossover(0.0, 0.0), Signal::Hold);
        assert_eq!(crossover(1.0, 0.0), Signal::Hold);
        assert_eq!(crossover(-1.0, 0.0), Signal::Hold);
    }

    #[test]
    fn non_finite_is_hold() {
        assert_eq!(crossover(f64::NAN, 1.0), Signal::Hold);
        assert_eq!(crossover(-1.0, f64::NAN), Signal::Hold);
        assert_eq!(crossover(-1.0, f64::INFINITY), Signal::Hold);
    }
}
