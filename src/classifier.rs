//! Per-frame gesture classification.
//!
//! Both classifiers are pure functions of one frame's [`HandPoints`], in
//! source pixel space with y growing downward. The V-sign is checked first;
//! the pinch only counts when the V-sign condition fails.

use crate::constants::{
    DEFAULT_FINGER_DISTANCE_RANGE, DEFAULT_INDEX_ANGLE_RANGE, DEFAULT_MIDDLE_ANGLE_RANGE, DEFAULT_PINCH_THRESHOLD,
};
use crate::landmarks::HandPoints;
use crate::{Error, Result};
use nalgebra::{distance, Point2};

/// Outcome of classifying a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Neither gesture is present
    None,
    /// Thumb and index tips pinched together
    Click,
    /// Index and middle fingers raised in a V
    VSign,
}

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub min: f64,
    pub max: f64,
}

impl Window {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive at both edges
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "{what} window [{}, {}] is empty",
                self.min, self.max
            )))
        }
    }
}

impl From<(f64, f64)> for Window {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Angular and spacing windows a V-sign must fall inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VSignWindows {
    /// Angle of (index tip - wrist), degrees
    pub index_angle: Window,
    /// Angle of (middle tip - wrist), degrees
    pub middle_angle: Window,
    /// Distance between index and middle tips
    pub finger_distance: Window,
}

impl Default for VSignWindows {
    fn default() -> Self {
        Self {
            index_angle: DEFAULT_INDEX_ANGLE_RANGE.into(),
            middle_angle: DEFAULT_MIDDLE_ANGLE_RANGE.into(),
            finger_distance: DEFAULT_FINGER_DISTANCE_RANGE.into(),
        }
    }
}

impl VSignWindows {
    /// All three conditions must hold together
    #[must_use]
    pub fn matches(&self, index_angle: f64, middle_angle: f64, finger_distance: f64) -> bool {
        self.index_angle.contains(index_angle)
            && self.middle_angle.contains(middle_angle)
            && self.finger_distance.contains(finger_distance)
    }
}

/// Direction of `to - from` in degrees, `atan2(dy, dx)`
#[must_use]
pub fn angle_degrees(from: &Point2<f64>, to: &Point2<f64>) -> f64 {
    let v = to - from;
    v.y.atan2(v.x).to_degrees()
}

/// Stateless classifier for pinch-click and V-sign
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureClassifier {
    pinch_threshold: f64,
    v_sign: VSignWindows,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            v_sign: VSignWindows::default(),
        }
    }
}

impl GestureClassifier {
    /// # Errors
    ///
    /// Returns `InvalidInput` for a non-positive pinch threshold or an
    /// empty window.
    pub fn new(pinch_threshold: f64, v_sign: VSignWindows) -> Result<Self> {
        if !(pinch_threshold > 0.0 && pinch_threshold.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "Pinch threshold must be positive, got {pinch_threshold}"
            )));
        }
        v_sign.index_angle.validate("Index angle")?;
        v_sign.middle_angle.validate("Middle angle")?;
        v_sign.finger_distance.validate("Finger distance")?;
        Ok(Self {
            pinch_threshold,
            v_sign,
        })
    }

    /// Thumb tip and index tip closer than the pinch threshold
    #[must_use]
    pub fn is_pinch(&self, points: &HandPoints) -> bool {
        distance(&points.thumb_tip, &points.index_tip) < self.pinch_threshold
    }

    /// Index and middle fingers raised and spread
    #[must_use]
    pub fn is_v_sign(&self, points: &HandPoints) -> bool {
        let index_angle = angle_degrees(&points.wrist, &points.index_tip);
        let middle_angle = angle_degrees(&points.wrist, &points.middle_tip);
        let spread = distance(&points.index_tip, &points.middle_tip);
        self.v_sign.matches(index_angle, middle_angle, spread)
    }

    #[must_use]
    pub fn classify(&self, points: &HandPoints) -> Verdict {
        if self.is_v_sign(points) {
            Verdict::VSign
        } else if self.is_pinch(points) {
            Verdict::Click
        } else {
            Verdict::None
        }
    }
}
