//! Hand landmark types and the fingertip extractor.
//!
//! A [`Hand`] always carries the full 21-point skeleton of the pose model;
//! partial hands are rejected when constructed. [`extract`] reduces the
//! first detected hand to the four points the classifiers look at.

use crate::constants::{INDEX_TIP, MIDDLE_TIP, NUM_HAND_LANDMARKS, THUMB_TIP, WRIST};
use crate::{Error, Result};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A single tracked point in source pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr", into = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    /// Relative depth, when the model provides one
    pub z: Option<f64>,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    #[must_use]
    pub const fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Planar position, depth dropped
    #[must_use]
    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Recorded form: `[x, y]` or `[x, y, z]`
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Planar([f64; 2]),
    Spatial([f64; 3]),
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Planar([x, y]) => Self::new(x, y),
            LandmarkRepr::Spatial([x, y, z]) => Self::with_depth(x, y, z),
        }
    }
}

impl From<Landmark> for LandmarkRepr {
    fn from(landmark: Landmark) -> Self {
        match landmark.z {
            Some(z) => Self::Spatial([landmark.x, landmark.y, z]),
            None => Self::Planar([landmark.x, landmark.y]),
        }
    }
}

/// One detected hand with all 21 landmarks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct Hand {
    landmarks: [Landmark; NUM_HAND_LANDMARKS],
}

impl Hand {
    /// Build a hand from model output
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless exactly 21 landmarks are given.
    pub fn from_landmarks(landmarks: Vec<Landmark>) -> Result<Self> {
        let count = landmarks.len();
        let landmarks: [Landmark; NUM_HAND_LANDMARKS] = landmarks.try_into().map_err(|_| {
            Error::InvalidInput(format!(
                "A hand needs {NUM_HAND_LANDMARKS} landmarks, got {count}"
            ))
        })?;
        Ok(Self { landmarks })
    }

    /// Landmark by model index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    #[must_use]
    pub const fn landmarks(&self) -> &[Landmark; NUM_HAND_LANDMARKS] {
        &self.landmarks
    }

    /// The named points used by the gesture classifiers
    #[must_use]
    pub fn points(&self) -> HandPoints {
        HandPoints {
            wrist: self.landmarks[WRIST].point(),
            thumb_tip: self.landmarks[THUMB_TIP].point(),
            index_tip: self.landmarks[INDEX_TIP].point(),
            middle_tip: self.landmarks[MIDDLE_TIP].point(),
        }
    }
}

impl TryFrom<Vec<Landmark>> for Hand {
    type Error = Error;

    fn try_from(landmarks: Vec<Landmark>) -> Result<Self> {
        Self::from_landmarks(landmarks)
    }
}

impl From<Hand> for Vec<Landmark> {
    fn from(hand: Hand) -> Self {
        hand.landmarks.to_vec()
    }
}

/// Fingertips and wrist of one hand, in source pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPoints {
    pub wrist: Point2<f64>,
    pub thumb_tip: Point2<f64>,
    pub index_tip: Point2<f64>,
    pub middle_tip: Point2<f64>,
}

/// Pick the named points of the first detected hand.
///
/// Returns `None` when the frame has no hands.
#[must_use]
pub fn extract(hands: &[Hand]) -> Option<HandPoints> {
    hands.first().map(Hand::points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_hand() -> Hand {
        let landmarks = (0..NUM_HAND_LANDMARKS)
            .map(|i| Landmark::new(i as f64, (i * 10) as f64))
            .collect();
        Hand::from_landmarks(landmarks).unwrap()
    }

    #[test]
    fn test_partial_hand_rejected() {
        let landmarks = vec![Landmark::new(0.0, 0.0); 20];
        assert!(matches!(Hand::from_landmarks(landmarks), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_extract_uses_model_indices() {
        let points = extract(&[numbered_hand()]).unwrap();
        assert_eq!(points.wrist, Point2::new(0.0, 0.0));
        assert_eq!(points.thumb_tip, Point2::new(4.0, 40.0));
        assert_eq!(points.index_tip, Point2::new(8.0, 80.0));
        assert_eq!(points.middle_tip, Point2::new(12.0, 120.0));
    }

    #[test]
    fn test_extract_empty_frame() {
        assert!(extract(&[]).is_none());
    }

    #[test]
    fn test_extract_takes_first_hand() {
        let first = numbered_hand();
        let second = Hand::from_landmarks(vec![Landmark::new(500.0, 500.0); NUM_HAND_LANDMARKS]).unwrap();
        let points = extract(&[first, second]).unwrap();
        assert_eq!(points.index_tip, Point2::new(8.0, 80.0));
    }

    #[test]
    fn test_hand_yaml_shapes() {
        let mut yaml = String::new();
        for i in 0..NUM_HAND_LANDMARKS {
            if i % 2 == 0 {
                yaml.push_str(&format!("- [{i}.0, 1.0]\n"));
            } else {
                yaml.push_str(&format!("- [{i}.0, 1.0, -0.5]\n"));
            }
        }
        let hand: Hand = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(hand.get(2).unwrap().z, None);
        assert_eq!(hand.get(3).unwrap().z, Some(-0.5));

        let short = "- [1.0, 2.0]\n- [3.0, 4.0]\n";
        assert!(serde_yaml::from_str::<Hand>(short).is_err());
    }
}
