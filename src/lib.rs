//! Hand gesture overlay engine for hands-free navigation.
//!
//! A pose source reports hand landmarks every frame. The index fingertip drives
//! an on-screen cursor after Kalman smoothing, a thumb-to-index pinch clicks the
//! target under the cursor, and a held V-sign triggers a bound navigation.
//!
//! The per-frame pipeline consists of:
//! 1. Landmark extraction (wrist, thumb, index and middle fingertips)
//! 2. Kalman smoothing of the index fingertip, mapped to viewport pixels
//! 3. Gesture classification (pinch click, V-sign)
//! 4. Debouncing (click cooldown, V-sign confirmation frames)
//! 5. Hit testing against the target regions and dispatch to the UI
//!
//! # Examples
//!
//! ## Driving the pipeline directly
//!
//! ```no_run
//! use gesture_gallery::{
//!     config::Config,
//!     landmarks::{Hand, Landmark},
//!     targets::{Bindings, Rect, TargetBinding},
//! };
//! use tokio::time::Instant;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bindings = Bindings::new()
//!     .target(TargetBinding::new("login", Rect::new(440.0, 300.0, 640.0, 360.0), "/login"));
//! let mut pipeline = Config::default().create_pipeline(bindings)?;
//!
//! let mut points = vec![Landmark::new(300.0, 400.0); 21];
//! points[4] = Landmark::new(280.0, 170.0);
//! points[8] = Landmark::new(270.0, 165.0);
//! let hand = Hand::from_landmarks(points)?;
//!
//! if let Some(dispatch) = pipeline.process(&[hand], Instant::now()) {
//!     println!("{}", dispatch.message);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Smoothing a signal
//!
//! ```
//! use gesture_gallery::filters::create_filter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut filter = create_filter("kalman")?;
//! let (x, y) = filter.apply(320.0, 240.0);
//! assert!(x > 0.0 && x < 320.0);
//! assert!(y > 0.0 && y < 240.0);
//! filter.reset();
//! # Ok(())
//! # }
//! ```

/// Error types and result handling
pub mod error;

/// Constants used throughout the engine
pub mod constants;

/// Hand landmark types and key point extraction
pub mod landmarks;

/// Signal filtering algorithms for smoothing the cursor
pub mod filters;

/// Source-to-viewport cursor mapping
pub mod cursor;

/// Per-frame gesture classification
pub mod classifier;

/// Cooldowns and confirmation for classified gestures
pub mod debounce;

/// Clickable target regions and gesture bindings
pub mod targets;

/// Turning admitted gestures into UI effects
pub mod dispatch;

/// Per-frame gesture processing
pub mod pipeline;

/// Hand counting on a slow interval
pub mod palms;

/// Pose source abstraction and recorded replay
pub mod pose_source;

/// Async render loop
pub mod engine;

/// Configuration management
pub mod config;

/// Webcam pose source
#[cfg(feature = "camera")]
pub mod camera;

pub use error::{Error, Result};
