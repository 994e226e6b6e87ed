//! Providers of hand landmarks.
//!
//! The engine only talks to the [`PoseSource`] trait. [`ReplaySource`] plays
//! back a recorded session from YAML; the webcam-backed source lives in
//! [`crate::camera`] behind the `camera` feature.

use crate::landmarks::Hand;
use crate::{Error, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::Path;

/// Which camera to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user
    #[default]
    User,
    /// Rear camera
    Environment,
}

/// Camera plus pose model, polled once per render tick
pub trait PoseSource: Send {
    /// Load the pose model; called once before the first tick
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadFailure` if the model cannot be initialized.
    fn load(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Acquire the capture device
    ///
    /// # Errors
    ///
    /// Returns `CameraUnavailable` when permission is denied or no device
    /// exists.
    fn start(&mut self, facing: FacingMode) -> Result<()>;

    /// Whether a frame is available to estimate on
    fn is_ready(&self) -> bool;

    /// Detect hands in the current frame.
    ///
    /// The engine awaits each call before issuing the next one.
    fn estimate(&mut self) -> impl Future<Output = Result<Vec<Hand>>> + Send;

    /// Release the capture device; safe to call repeatedly
    fn stop(&mut self);
}

/// One recorded estimation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    #[serde(default)]
    pub hands: Vec<Hand>,
}

/// A recorded landmark session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Load a recording from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `InvalidInput` if it does
    /// not parse (including hands without 21 landmarks).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| Error::InvalidInput(format!("Failed to parse recording: {e}")))
    }

    /// Save a recording to a YAML file
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if serialization fails and `Io` if writing does.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::InvalidInput(format!("Failed to serialize recording: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Plays a [`Recording`] back one frame per estimation
#[derive(Debug, Clone)]
pub struct ReplaySource {
    recording: Recording,
    position: usize,
    looping: bool,
    running: bool,
}

impl ReplaySource {
    #[must_use]
    pub const fn new(recording: Recording, looping: bool) -> Self {
        Self {
            recording,
            position: 0,
            looping,
            running: false,
        }
    }

    /// # Errors
    ///
    /// See [`Recording::from_file`].
    pub fn from_file<P: AsRef<Path>>(path: P, looping: bool) -> Result<Self> {
        Ok(Self::new(Recording::from_file(path)?, looping))
    }

    /// Every recorded frame has been played and looping is off
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        !self.looping && self.position >= self.recording.frames.len()
    }

    fn next_frame(&mut self) -> Vec<Hand> {
        let len = self.recording.frames.len();
        if len == 0 {
            return Vec::new();
        }
        if self.position >= len {
            if !self.looping {
                return Vec::new();
            }
            self.position = 0;
        }
        let hands = self.recording.frames[self.position].hands.clone();
        self.position += 1;
        hands
    }
}

impl PoseSource for ReplaySource {
    async fn load(&mut self) -> Result<()> {
        info!("Replay source with {} recorded frames", self.recording.frames.len());
        Ok(())
    }

    fn start(&mut self, facing: FacingMode) -> Result<()> {
        debug!("Replay started ({facing:?} facing requested)");
        self.running = true;
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.running
    }

    async fn estimate(&mut self) -> Result<Vec<Hand>> {
        if !self.running {
            return Err(Error::EstimationError("Replay source is not started".to_string()));
        }
        Ok(self.next_frame())
    }

    fn stop(&mut self) {
        if self.running {
            debug!("Replay stopped at frame {}", self.position);
        }
        self.running = false;
    }
}
