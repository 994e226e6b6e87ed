use super::CursorFilter;
use crate::constants::{
    DEFAULT_INITIAL_COVARIANCE, DEFAULT_INITIAL_ESTIMATE, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE,
};
use crate::{Error, Result};

/// Noise parameters and starting state of a scalar Kalman filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KalmanParams {
    /// Measurement noise (R)
    pub measurement_noise: f64,
    /// Process noise (Q)
    pub process_noise: f64,
    /// Initial estimate (x0)
    pub initial_estimate: f64,
    /// Initial covariance (P0)
    pub initial_covariance: f64,
}

impl Default for KalmanParams {
    fn default() -> Self {
        Self {
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            process_noise: DEFAULT_PROCESS_NOISE,
            initial_estimate: DEFAULT_INITIAL_ESTIMATE,
            initial_covariance: DEFAULT_INITIAL_COVARIANCE,
        }
    }
}

impl KalmanParams {
    /// Check the parameters describe a stable filter
    ///
    /// # Errors
    ///
    /// Returns `FilterError` if a noise term is not positive or the
    /// initial covariance is negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.measurement_noise > 0.0 && self.measurement_noise.is_finite()) {
            return Err(Error::FilterError(format!(
                "Measurement noise must be positive, got {}",
                self.measurement_noise
            )));
        }
        if !(self.process_noise > 0.0 && self.process_noise.is_finite()) {
            return Err(Error::FilterError(format!(
                "Process noise must be positive, got {}",
                self.process_noise
            )));
        }
        if !(self.initial_covariance >= 0.0 && self.initial_covariance.is_finite()) {
            return Err(Error::FilterError(format!(
                "Initial covariance must be non-negative, got {}",
                self.initial_covariance
            )));
        }
        Ok(())
    }

    /// Gain the filter settles to under a constant noise model.
    ///
    /// Every update after the first few uses a gain at or near this value;
    /// it is the fraction of a single outlier that reaches the output.
    #[must_use]
    pub fn steady_state_gain(&self) -> f64 {
        let q = self.process_noise;
        let r = self.measurement_noise;
        let prior = (q + q.mul_add(q, 4.0 * q * r).sqrt()) / 2.0;
        prior / (prior + r)
    }
}

/// One-dimensional recursive Kalman filter (random-walk model).
///
/// Holds only the current estimate and covariance, so memory is constant.
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    params: KalmanParams,
    estimate: f64,
    covariance: f64,
    gain: f64,
}

impl ScalarKalman {
    #[must_use]
    pub fn new(params: KalmanParams) -> Self {
        Self {
            params,
            estimate: params.initial_estimate,
            covariance: params.initial_covariance,
            gain: 0.0,
        }
    }

    /// Fold one measurement into the estimate and return the new estimate
    pub fn filter(&mut self, measurement: f64) -> f64 {
        // Predict
        let prior = self.covariance + self.params.process_noise;

        // Update
        self.gain = prior / (prior + self.params.measurement_noise);
        self.estimate += self.gain * (measurement - self.estimate);
        self.covariance = (1.0 - self.gain) * prior;

        self.estimate
    }

    #[must_use]
    pub const fn estimate(&self) -> f64 {
        self.estimate
    }

    #[must_use]
    pub const fn covariance(&self) -> f64 {
        self.covariance
    }

    /// Gain used by the most recent update (0 before the first one)
    #[must_use]
    pub const fn gain(&self) -> f64 {
        self.gain
    }

    #[must_use]
    pub const fn params(&self) -> &KalmanParams {
        &self.params
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.params);
    }
}

impl Default for ScalarKalman {
    fn default() -> Self {
        Self::new(KalmanParams::default())
    }
}

/// Independent Kalman filters for the two screen axes
#[derive(Debug, Clone, Default)]
pub struct KalmanCursorFilter {
    x: ScalarKalman,
    y: ScalarKalman,
}

impl KalmanCursorFilter {
    #[must_use]
    pub fn new(params: KalmanParams) -> Self {
        Self {
            x: ScalarKalman::new(params),
            y: ScalarKalman::new(params),
        }
    }
}

impl CursorFilter for KalmanCursorFilter {
    fn apply(&mut self, x: f64, y: f64) -> (f64, f64) {
        (self.x.filter(x), self.y.filter(y))
    }

    fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    fn name(&self) -> &str {
        "KalmanFilter"
    }
}
