//! Construction-time errors.
//!
//! Only configuration can fail. Once an engine or signal generator has been
//! built, a run always completes; degenerate inputs (zero prices, missing
//! indicator history) are handled where they occur.

use thiserror::Error;

/// A parameter was rejected before a run started.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ParamError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        match self {
            Self::InvalidParameter { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_parameter() {
        let err = ParamError::invalid("fast_window", "must be < slow_window (20 >= 10)");
        assert_eq!(
            err.to_string(),
            "invalid parameter `fast_window`: must be < slow_window (20 >= 10)"
        );
        assert_eq!(err.parameter(), "fast_window");
    }
}
