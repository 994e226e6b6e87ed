//! Constants used throughout the overlay

/// Number of landmarks in a complete hand
pub const NUM_HAND_LANDMARKS: usize = 21;

/// Landmark indices in the 21-point hand model
pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;

/// Source video dimensions the landmarks are expressed in
pub const DEFAULT_SOURCE_WIDTH: f64 = 640.0;
pub const DEFAULT_SOURCE_HEIGHT: f64 = 480.0;

/// Default viewport the cursor is mapped onto
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 720.0;

/// Rendered cursor size, kept fully inside the viewport
pub const DEFAULT_CURSOR_SIZE: f64 = 20.0;

/// Scalar Kalman defaults
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 0.01;
pub const DEFAULT_PROCESS_NOISE: f64 = 0.1;
pub const DEFAULT_INITIAL_ESTIMATE: f64 = 0.0;
pub const DEFAULT_INITIAL_COVARIANCE: f64 = 1.0;

/// Pinch distance (source pixels) below which a frame is a click candidate
pub const DEFAULT_PINCH_THRESHOLD: f64 = 60.0;

/// Minimum time between two fired clicks
pub const DEFAULT_CLICK_COOLDOWN_MS: u64 = 800;

/// Quiet period after any raw detection before a click may fire
pub const DEFAULT_STABILITY_WINDOW_MS: u64 = 300;

/// V-sign windows, in degrees and source pixels
pub const DEFAULT_INDEX_ANGLE_RANGE: (f64, f64) = (-110.0, -90.0);
pub const DEFAULT_MIDDLE_ANGLE_RANGE: (f64, f64) = (-100.0, -80.0);
pub const DEFAULT_FINGER_DISTANCE_RANGE: (f64, f64) = (40.0, 100.0);

/// Consecutive V-sign frames required before navigating
pub const DEFAULT_CONFIRMATION_FRAMES: u32 = 5;

/// Minimum time between two fired navigations
pub const DEFAULT_NAVIGATE_COOLDOWN_MS: u64 = 300;

/// How long a confirmation message stays visible
pub const DEFAULT_CONFIRMATION_MS: u64 = 2000;

/// Gesture suppression after a real pointer click
pub const DEFAULT_POINTER_SUPPRESSION_MS: u64 = 300;

/// Render loop rate
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// User-visible messages
pub const MSG_CAMERA_UNAVAILABLE: &str = "Error accessing webcam. Please check your camera permissions.";
pub const MSG_NO_TARGET: &str = "Gesture detected but not on a button";

/// Hand-count sampling interval on the comparison screen (milliseconds)
pub const DEFAULT_PALM_INTERVAL_MS: u64 = 5000;

/// Palm count prompts
pub const MSG_TWO_PALMS: &str = "Two palms detected! You may now compare two products.";
pub const MSG_ONE_PALM: &str =
    "Only one palm detected. You can still compare products. Select two products to compare.";
pub const MSG_NO_PALMS: &str = "No palms detected. Please show both palms.";
