//! Risk sizer: converts a risk budget into a position size.
//!
//! # Formula
//! ```text
//! risk = capital * risk_per_trade
//! size = risk / stop_distance      (stop distance known and > 0)
//!      = risk / price              (otherwise)
//! size = max(size, min_lot)
//! size = min(size, capital * max_position_fraction)   (when a cap is set)
//! ```
//!
//! # Example
//! - Capital: $10,000, risk per trade 10% ($1,000)
//! - Price: $105, no stop distance
//! - Size: 1,000 / 105 ≈ 9.52 units

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Stateless position sizer. Safe to share across threads.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSizer {
    /// Smallest tradeable size. Applied as a floor once a price is valid.
    pub min_lot: f64,
    /// Optional cap, compared against `capital * fraction`.
    pub max_position_fraction: Option<f64>,
}

impl RiskSizer {
    pub fn new(min_lot: f64, max_position_fraction: Option<f64>) -> Self {
        Self {
            min_lot,
            max_position_fraction,
        }
    }

    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.min_lot >= 0.0 && self.min_lot.is_finite()) {
            return Err(ParamError::invalid(
                "min_lot",
                format!("must be >= 0, got {}", self.min_lot),
            ));
        }
        if let Some(f) = self.max_position_fraction {
            if !(f > 0.0 && f <= 1.0) {
                return Err(ParamError::invalid(
                    "max_position_fraction",
                    format!("must be in (0, 1], got {f}"),
                ));
            }
        }
        Ok(())
    }

    /// Size for a new position. Returns 0.0 when no position should open:
    /// a non-positive or non-finite price, or a result that is not a finite
    /// non-negative number.
    pub fn position_size(
        &self,
        capital: f64,
        price: f64,
        risk_per_trade: f64,
        stop_distance: Option<f64>,
    ) -> f64 {
        if !(price > 0.0 && price.is_finite()) {
            return 0.0;
        }

        let risk = capital * risk_per_trade;
        let mut size = match stop_distance {
            Some(d) if d > 0.0 => risk / d,
            _ => risk / price,
        };

        size = size.max(self.min_lot);
        if let Some(f) = self.max_position_fraction {
            size = size.min(capital * f);
        }

        if size.is_finite() && size >= 0.0 {
            size
        } else {
            0.0
        }
    }
}
