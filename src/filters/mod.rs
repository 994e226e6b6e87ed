//! Signal filtering for smoothing fingertip coordinates.
//!
//! Raw landmark positions jitter from frame to frame; the cursor follows a
//! filtered position instead. Each axis is filtered independently.

/// Recursive Kalman lowpass, one instance per axis
pub mod kalman;

use crate::{Error, Result};
use kalman::{KalmanCursorFilter, KalmanParams};

/// Smooths the index fingertip before it is mapped onto the viewport.
///
/// Implementations see one sample per frame that had a hand, in source
/// pixels. Frames without a hand never reach the filter.
pub trait CursorFilter: Send + Sync {
    /// Take one fingertip sample and return the smoothed position
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64);

    /// Forget all history; the next sample starts from the initial estimate
    fn reset(&mut self);

    /// Name for log output
    fn name(&self) -> &str;
}

/// Hands the raw fingertip straight to the cursor
pub struct Passthrough;

impl CursorFilter for Passthrough {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "Passthrough"
    }
}

/// Build the cursor filter named in the config (`kalman` or `none`) with the
/// default noise parameters
///
/// # Errors
///
/// Returns `FilterError` for an unknown name.
pub fn create_filter(filter_type: &str) -> Result<Box<dyn CursorFilter>> {
    create_filter_with(filter_type, KalmanParams::default())
}

/// Build the cursor filter named in the config, tuned with the configured
/// measurement and process noise.
///
/// Names are case-insensitive. `none` and `passthrough` ignore `params`.
///
/// # Errors
///
/// Returns `FilterError` for an unknown name or noise parameters that are
/// not positive.
pub fn create_filter_with(filter_type: &str, params: KalmanParams) -> Result<Box<dyn CursorFilter>> {
    match filter_type.to_lowercase().as_str() {
        "none" | "passthrough" => Ok(Box::new(Passthrough)),
        "kalman" => {
            params.validate()?;
            Ok(Box::new(KalmanCursorFilter::new(params)))
        }
        other => Err(Error::FilterError(format!(
            "Unknown cursor filter '{other}', expected 'kalman' or 'none'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_keeps_fingertip() {
        let mut filter = Passthrough;
        assert_eq!(filter.apply(10.0, 20.0), (10.0, 20.0));
        filter.reset();
        assert_eq!(filter.apply(-3.0, 700.0), (-3.0, 700.0));
    }

    #[test]
    fn test_create_filter_names() {
        assert_eq!(create_filter("none").unwrap().name(), "Passthrough");
        assert_eq!(create_filter("PassThrough").unwrap().name(), "Passthrough");
        assert_eq!(create_filter("Kalman").unwrap().name(), "KalmanFilter");
        assert!(matches!(create_filter("median"), Err(Error::FilterError(_))));
    }

    #[test]
    fn test_create_filter_rejects_bad_params() {
        let params = KalmanParams {
            measurement_noise: -0.5,
            ..KalmanParams::default()
        };
        assert!(create_filter_with("kalman", params).is_err());
        assert!(create_filter_with("none", params).is_ok());
    }
}
