//! Signal: the three-valued output of a signal generator.

use serde::{Deserialize, Serialize};

/// What the strategy wants to do on the current bar.
///
/// `Hold` is a value, not an absence: insufficient history, undefined
/// indicators and numeric faults all map to `Hold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// True for `Buy` and `Sell`.
    pub fn is_entry(&self) -> bool {
        !matches!(self, Self::Hold)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
