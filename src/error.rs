//! Error types for path follower configuration.

use thiserror::Error;

/// Reasons a [`PathFollowerParams`](crate::path_follow::PathFollowerParams)
/// value is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    /// A parameter is NaN or infinite.
    #[error("parameter `{name}` is not finite: {value}")]
    NotFinite {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// A parameter that must be zero or positive is negative.
    #[error("parameter `{name}` must not be negative, got {value}")]
    Negative {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f32,
    },
}

impl ParamsError {
    /// Check that `value` is finite and not negative.
    pub(crate) fn check_non_negative(name: &'static str, value: f32) -> Result<(), Self> {
        if !value.is_finite() {
            return Err(Self::NotFinite { name, value });
        }
        if value < 0.0 {
            return Err(Self::Negative { name, value });
        }
        Ok(())
    }
}
