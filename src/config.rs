//! Configuration management for the gesture overlay

use crate::classifier::{GestureClassifier, VSignWindows, Window};
use crate::constants::{
    DEFAULT_CLICK_COOLDOWN_MS, DEFAULT_CONFIRMATION_FRAMES, DEFAULT_CONFIRMATION_MS, DEFAULT_CURSOR_SIZE,
    DEFAULT_FINGER_DISTANCE_RANGE, DEFAULT_INDEX_ANGLE_RANGE, DEFAULT_INITIAL_COVARIANCE, DEFAULT_INITIAL_ESTIMATE,
    DEFAULT_MEASUREMENT_NOISE, DEFAULT_MIDDLE_ANGLE_RANGE, DEFAULT_NAVIGATE_COOLDOWN_MS, DEFAULT_PALM_INTERVAL_MS, DEFAULT_PINCH_THRESHOLD,
    DEFAULT_POINTER_SUPPRESSION_MS, DEFAULT_PROCESS_NOISE, DEFAULT_SOURCE_HEIGHT, DEFAULT_SOURCE_WIDTH,
    DEFAULT_STABILITY_WINDOW_MS, DEFAULT_TARGET_FPS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH,
};
use crate::cursor::{CursorMapper, Extent};
use crate::debounce::{GateConfig, GestureGate};
use crate::dispatch::Dispatcher;
use crate::engine::EngineSettings;
use crate::filters::{create_filter_with, kalman::KalmanParams, CursorFilter};
use crate::pipeline::GesturePipeline;
use crate::pose_source::FacingMode;
use crate::targets::Bindings;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pose model configuration
    pub model: ModelConfig,

    /// Camera configuration
    pub camera: CameraConfig,

    /// Cursor smoothing configuration
    pub filter: FilterConfig,

    /// Render loop and cursor geometry
    pub overlay: OverlayConfig,

    /// Pinch-click detection and debouncing
    pub click: ClickConfig,

    /// V-sign detection and confirmation
    pub v_gesture: VGestureConfig,

    /// Palm-count prompt
    pub palms: PalmConfig,

    /// Targets of the screen run by the binary
    pub screen: Bindings,
}

/// Model file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to the 21-point hand landmark ONNX model
    pub hand_landmarks: PathBuf,

    /// Square input size of the landmark model
    pub input_size: u32,

    /// Minimum hand presence score to report a hand (0.0-1.0)
    pub presence_threshold: f32,
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Capture device index
    pub index: i32,

    /// Facing mode requested when the camera starts
    pub facing: FacingMode,

    /// Requested capture width, also the landmark coordinate space
    pub width: u32,

    /// Requested capture height
    pub height: u32,
}

/// Filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter type ("kalman" or "none")
    pub filter_type: String,

    /// Kalman measurement noise (R)
    pub measurement_noise: f64,

    /// Kalman process noise (Q)
    pub process_noise: f64,

    /// Kalman initial estimate
    pub initial_estimate: f64,

    /// Kalman initial covariance
    pub initial_covariance: f64,
}

/// Overlay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Render ticks per second
    pub target_fps: u32,

    /// Viewport width in pixels
    pub viewport_width: f64,

    /// Viewport height in pixels
    pub viewport_height: f64,

    /// Rendered cursor size in pixels
    pub cursor_size: f64,

    /// Confirmation message lifetime in milliseconds
    pub confirmation_ms: u64,

    /// Gesture pause after a real pointer click, in milliseconds
    pub pointer_suppression_ms: u64,

    /// Gesture mode when the overlay starts
    pub gesture_mode: bool,
}

/// Click configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickConfig {
    /// Thumb-to-index distance (source pixels) below which a frame pinches
    pub pinch_threshold: f64,

    /// Minimum time between fired clicks, in milliseconds
    pub cooldown_ms: u64,

    /// Quiet period after any detection before a click fires, in milliseconds
    pub stability_ms: u64,
}

/// V-sign configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VGestureConfig {
    /// Index finger angle window in degrees, [min, max]
    pub index_angle: [f64; 2],

    /// Middle finger angle window in degrees, [min, max]
    pub middle_angle: [f64; 2],

    /// Index-to-middle distance window in source pixels, [min, max]
    pub finger_distance: [f64; 2],

    /// Consecutive frames required to navigate
    pub confirmation_frames: u32,

    /// Minimum time between navigations, in milliseconds
    pub cooldown_ms: u64,
}

/// Palm-count prompt configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PalmConfig {
    /// Show the one/two palm prompt
    pub enabled: bool,

    /// Sampling interval in milliseconds
    pub interval_ms: u64,
}

impl Default for PalmConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: DEFAULT_PALM_INTERVAL_MS,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            hand_landmarks: PathBuf::from("assets/hand_landmarks.onnx"),
            input_size: 224,
            presence_threshold: 0.5,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            facing: FacingMode::User,
            width: DEFAULT_SOURCE_WIDTH as u32,
            height: DEFAULT_SOURCE_HEIGHT as u32,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_type: "kalman".to_string(),
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            process_noise: DEFAULT_PROCESS_NOISE,
            initial_estimate: DEFAULT_INITIAL_ESTIMATE,
            initial_covariance: DEFAULT_INITIAL_COVARIANCE,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            cursor_size: DEFAULT_CURSOR_SIZE,
            confirmation_ms: DEFAULT_CONFIRMATION_MS,
            pointer_suppression_ms: DEFAULT_POINTER_SUPPRESSION_MS,
            gesture_mode: true,
        }
    }
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            cooldown_ms: DEFAULT_CLICK_COOLDOWN_MS,
            stability_ms: DEFAULT_STABILITY_WINDOW_MS,
        }
    }
}

impl Default for VGestureConfig {
    fn default() -> Self {
        Self {
            index_angle: [DEFAULT_INDEX_ANGLE_RANGE.0, DEFAULT_INDEX_ANGLE_RANGE.1],
            middle_angle: [DEFAULT_MIDDLE_ANGLE_RANGE.0, DEFAULT_MIDDLE_ANGLE_RANGE.1],
            finger_distance: [DEFAULT_FINGER_DISTANCE_RANGE.0, DEFAULT_FINGER_DISTANCE_RANGE.1],
            confirmation_frames: DEFAULT_CONFIRMATION_FRAMES,
            cooldown_ms: DEFAULT_NAVIGATE_COOLDOWN_MS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Kalman parameters from the filter section
    #[must_use]
    pub fn kalman_params(&self) -> KalmanParams {
        KalmanParams {
            measurement_noise: self.filter.measurement_noise,
            process_noise: self.filter.process_noise,
            initial_estimate: self.filter.initial_estimate,
            initial_covariance: self.filter.initial_covariance,
        }
    }

    /// Create a filter from configuration
    pub fn create_filter(&self) -> Result<Box<dyn CursorFilter>> {
        create_filter_with(&self.filter.filter_type, self.kalman_params())
    }

    /// Source-to-viewport mapping for the cursor
    pub fn cursor_mapper(&self) -> Result<CursorMapper> {
        CursorMapper::new(
            Extent::new(f64::from(self.camera.width), f64::from(self.camera.height)),
            Extent::new(self.overlay.viewport_width, self.overlay.viewport_height),
            self.overlay.cursor_size,
        )
    }

    /// Gesture classifier with the configured thresholds
    pub fn classifier(&self) -> Result<GestureClassifier> {
        let window = |[min, max]: [f64; 2]| Window::new(min, max);
        GestureClassifier::new(
            self.click.pinch_threshold,
            VSignWindows {
                index_angle: window(self.v_gesture.index_angle),
                middle_angle: window(self.v_gesture.middle_angle),
                finger_distance: window(self.v_gesture.finger_distance),
            },
        )
    }

    /// Debounce gate with the configured timings
    pub fn gate(&self) -> Result<GestureGate> {
        GestureGate::new(GateConfig {
            click_cooldown: Duration::from_millis(self.click.cooldown_ms),
            stability_window: Duration::from_millis(self.click.stability_ms),
            confirmation_frames: self.v_gesture.confirmation_frames,
            navigate_cooldown: Duration::from_millis(self.v_gesture.cooldown_ms),
        })
    }

    /// Assemble the per-tick pipeline for a screen's bindings
    pub fn create_pipeline(&self, bindings: Bindings) -> Result<GesturePipeline> {
        self.validate()?;
        bindings.validate()?;
        Ok(GesturePipeline::new(
            self.create_filter()?,
            self.cursor_mapper()?,
            self.classifier()?,
            self.gate()?,
            Dispatcher::new(bindings),
        ))
    }

    /// Loop timing for the engine
    #[must_use]
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            facing: self.camera.facing,
            frame_interval: Duration::from_secs(1) / self.overlay.target_fps.max(1),
            confirmation: Duration::from_millis(self.overlay.confirmation_ms),
            pointer_suppression: Duration::from_millis(self.overlay.pointer_suppression_ms),
            start_enabled: self.overlay.gesture_mode,
            palm_interval: self
                .palms
                .enabled
                .then(|| Duration::from_millis(self.palms.interval_ms)),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate model settings
        if self.model.input_size == 0 {
            return Err(Error::ConfigError("Model input size must be greater than 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.model.presence_threshold) {
            return Err(Error::ConfigError(
                "Presence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }

        // Validate camera settings
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::ConfigError("Camera size must be greater than 0".to_string()));
        }

        // Validate filter parameters
        self.kalman_params()
            .validate()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        // Validate overlay settings
        if self.overlay.target_fps == 0 {
            return Err(Error::ConfigError("Target FPS must be greater than 0".to_string()));
        }
        if self.overlay.confirmation_ms == 0 {
            return Err(Error::ConfigError(
                "Confirmation message duration must be greater than 0".to_string(),
            ));
        }

        // Validate gesture thresholds
        self.cursor_mapper().map_err(|e| Error::ConfigError(e.to_string()))?;
        self.classifier().map_err(|e| Error::ConfigError(e.to_string()))?;
        if self.palms.enabled && self.palms.interval_ms == 0 {
            return Err(Error::ConfigError("Palm interval must be greater than 0".to_string()));
        }
        if self.v_gesture.confirmation_frames == 0 {
            return Err(Error::ConfigError(
                "V gesture confirmation frames must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Gesture Overlay Configuration

# Hand landmark model
model:
  hand_landmarks: "assets/hand_landmarks.onnx"
  input_size: 224
  presence_threshold: 0.5

# Camera; landmarks are reported in width x height pixels
camera:
  index: 0
  facing: user
  width: 640
  height: 480

# Cursor smoothing
filter:
  filter_type: "kalman"
  measurement_noise: 0.01
  process_noise: 0.1
  initial_estimate: 0.0
  initial_covariance: 1.0

# Render loop and cursor
overlay:
  target_fps: 60
  viewport_width: 1280
  viewport_height: 720
  cursor_size: 20
  confirmation_ms: 2000
  pointer_suppression_ms: 300
  gesture_mode: true

# Pinch click
click:
  pinch_threshold: 60.0
  cooldown_ms: 800
  stability_ms: 300

# V-sign navigation
v_gesture:
  index_angle: [-110.0, -90.0]
  middle_angle: [-100.0, -80.0]
  finger_distance: [40.0, 100.0]
  confirmation_frames: 5
  cooldown_ms: 300

# Palm-count prompt (comparison screen)
palms:
  enabled: false
  interval_ms: 5000

# Gallery screen targets, in priority order
screen:
  targets:
    - region:
        name: register
        bounds: { left: 440.0, top: 400.0, right: 620.0, bottom: 460.0 }
      route: /register
      label: Register
    - region:
        name: login
        bounds: { left: 660.0, top: 400.0, right: 840.0, bottom: 460.0 }
      route: /login
      label: Login
  v_sign:
    route: /settings
    label: settings
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert_eq!(config.screen.targets.len(), 2);
        assert_eq!(config.screen.targets[0].route, "/register");
        assert_eq!(config.screen.v_sign.as_ref().unwrap().route, "/settings");
        assert_eq!(config.camera.facing, FacingMode::User);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("click:\n  cooldown_ms: 1000\n").unwrap();
        assert_eq!(config.click.cooldown_ms, 1000);
        assert_eq!(config.click.pinch_threshold, DEFAULT_PINCH_THRESHOLD);
        assert_eq!(config.v_gesture.confirmation_frames, DEFAULT_CONFIRMATION_FRAMES);
    }

    #[test]
    fn test_engine_settings() {
        let settings = Config::default().engine_settings();
        assert_eq!(settings.confirmation, Duration::from_millis(2000));
        assert_eq!(settings.frame_interval, Duration::from_secs(1) / 60);
        assert!(settings.start_enabled);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.overlay.target_fps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.v_gesture.finger_distance = [100.0, 40.0];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filter.process_noise = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.filter.filter_type = "median".to_string();
        assert!(config.create_filter().is_err());
    }
}
