//! The render loop that drives gesture recognition.
//!
//! [`GestureEngine::spawn`] moves the pose source, the action sink and the
//! [`GesturePipeline`] into one tokio task that ticks at the configured
//! frame rate. Everything mutable lives in that task; the UI talks to it
//! only through the returned [`EngineHandle`]:
//!
//! - UI flags (gesture mode, pointer suppression) go in through a watch
//!   channel and are copied once at the top of each tick.
//! - Status, cursor position and gate state come out through watch channels.
//! - [`EngineHandle::stop`] cancels the loop. A pending estimation is
//!   dropped with its future, so its result is never applied, and the
//!   camera is released before `stop` returns. Dropping the handle sends
//!   the same signal without waiting.
//!
//! ```no_run
//! use gesture_gallery::{
//!     config::Config,
//!     dispatch::ActionSink,
//!     engine::GestureEngine,
//!     pose_source::ReplaySource,
//!     targets::{Bindings, Rect, TargetBinding},
//! };
//!
//! struct Router;
//!
//! impl ActionSink for Router {
//!     fn navigate(&mut self, route: &str) {
//!         println!("-> {route}");
//!     }
//!
//!     fn show_message(&mut self, message: Option<&str>) {
//!         println!("{}", message.unwrap_or(""));
//!     }
//! }
//!
//! # async fn run() -> gesture_gallery::Result<()> {
//! let config = Config::default();
//! let bindings = Bindings::new()
//!     .target(TargetBinding::new("register", Rect::new(40.0, 300.0, 240.0, 360.0), "/register"))
//!     .on_v_sign("/settings", "settings");
//! let source = ReplaySource::from_file("session.yaml", false)?;
//!
//! let engine = GestureEngine::from_config(source, Router, bindings, &config)?;
//! let handle = engine.spawn();
//! handle.set_gesture_mode(true);
//! // ... later, when the screen goes away
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

use crate::config::Config;
use crate::constants::{
    DEFAULT_CONFIRMATION_MS, DEFAULT_POINTER_SUPPRESSION_MS, DEFAULT_TARGET_FPS, MSG_CAMERA_UNAVAILABLE,
};
use crate::cursor::CursorPosition;
use crate::debounce::GateState;
use crate::dispatch::{ActionSink, ConfirmationBanner, Dispatch};
use crate::palms::PalmObserver;
use crate::pipeline::GesturePipeline;
use crate::pose_source::{FacingMode, PoseSource};
use crate::targets::Bindings;
use crate::Result;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Loop timing and camera selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub facing: FacingMode,
    /// Time between render ticks
    pub frame_interval: Duration,
    /// How long a confirmation message stays up
    pub confirmation: Duration,
    /// How long a real pointer click pauses gesture detection
    pub pointer_suppression: Duration,
    /// Gesture mode when the engine starts
    pub start_enabled: bool,
    /// Sample the hand count for the palm prompt this often; `None` disables it
    pub palm_interval: Option<Duration>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            frame_interval: Duration::from_secs(1) / DEFAULT_TARGET_FPS,
            confirmation: Duration::from_millis(DEFAULT_CONFIRMATION_MS),
            pointer_suppression: Duration::from_millis(DEFAULT_POINTER_SUPPRESSION_MS),
            start_enabled: true,
            palm_interval: None,
        }
    }
}

/// UI-owned flags, read as one snapshot per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub gesture_enabled: bool,
    /// Gesture detection is skipped until this instant
    pub suppressed_until: Option<Instant>,
}

impl Controls {
    #[must_use]
    pub fn is_suppressed(&self, now: Instant) -> bool {
        self.suppressed_until.is_some_and(|until| now < until)
    }
}

/// What the engine is currently doing, for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    /// Pose model still loading
    Loading,
    /// Camera running, gestures recognized
    Running,
    /// Gesture mode switched off, camera released
    Paused,
    /// Camera could not be opened; idle until gesture mode is toggled
    CameraUnavailable(String),
    /// Pose model failed to load; the loop never started
    ModelLoadFailed(String),
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraState {
    Off,
    On,
    Failed,
}

/// A configured engine, not yet running
pub struct GestureEngine<S, K> {
    source: S,
    sink: K,
    pipeline: GesturePipeline,
    settings: EngineSettings,
}

impl<S, K> GestureEngine<S, K>
where
    S: PoseSource + 'static,
    K: ActionSink + 'static,
{
    #[must_use]
    pub fn new(source: S, sink: K, pipeline: GesturePipeline, settings: EngineSettings) -> Self {
        Self {
            source,
            sink,
            pipeline,
            settings,
        }
    }

    /// Build the pipeline and settings from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration or bindings are invalid.
    pub fn from_config(source: S, sink: K, bindings: Bindings, config: &Config) -> Result<Self> {
        let pipeline = config.create_pipeline(bindings)?;
        Ok(Self::new(source, sink, pipeline, config.engine_settings()))
    }

    /// Start the render loop on the current tokio runtime
    #[must_use]
    pub fn spawn(self) -> EngineHandle {
        let initial = Controls {
            gesture_enabled: self.settings.start_enabled,
            suppressed_until: None,
        };
        let (controls_tx, controls_rx) = watch::channel(initial);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(EngineStatus::Loading);
        let (cursor_tx, cursor_rx) = watch::channel(self.pipeline.cursor());
        let (gate_tx, gate_rx) = watch::channel(self.pipeline.gate_state());

        let task = EngineTask {
            source: self.source,
            sink: self.sink,
            pipeline: self.pipeline,
            settings: self.settings,
            banner: ConfirmationBanner::new(self.settings.confirmation),
            palms: self.settings.palm_interval.map(PalmObserver::new),
            camera: CameraState::Off,
            released: true,
            controls: controls_rx,
            shutdown: shutdown_rx,
            status: status_tx,
            cursor: cursor_tx,
            gate: gate_tx,
        };

        EngineHandle {
            controls: controls_tx,
            shutdown: shutdown_tx,
            status: status_rx,
            cursor: cursor_rx,
            gate: gate_rx,
            pointer_suppression: self.settings.pointer_suppression,
            task: Some(tokio::spawn(task.run())),
        }
    }
}

/// Owner's side of a running engine.
///
/// Dropping the handle without calling [`stop`](Self::stop) still shuts the
/// loop down and releases the camera, but does not wait for it.
pub struct EngineHandle {
    controls: watch::Sender<Controls>,
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<EngineStatus>,
    cursor: watch::Receiver<CursorPosition>,
    gate: watch::Receiver<GateState>,
    pointer_suppression: Duration,
    task: Option<JoinHandle<()>>,
}

impl EngineHandle {
    /// Switch gesture mode on or off; takes effect on the next tick
    pub fn set_gesture_mode(&self, enabled: bool) {
        self.controls.send_modify(|c| c.gesture_enabled = enabled);
    }

    /// Flip gesture mode and return the new setting
    pub fn toggle_gesture_mode(&self) -> bool {
        let mut enabled = false;
        self.controls.send_modify(|c| {
            c.gesture_enabled = !c.gesture_enabled;
            enabled = c.gesture_enabled;
        });
        enabled
    }

    /// A real pointer click happened; pause gesture detection briefly
    pub fn pointer_clicked(&self) {
        let until = Instant::now() + self.pointer_suppression;
        self.controls.send_modify(|c| c.suppressed_until = Some(until));
    }

    #[must_use]
    pub fn controls(&self) -> Controls {
        *self.controls.borrow()
    }

    #[must_use]
    pub fn status(&self) -> EngineStatus {
        self.status.borrow().clone()
    }

    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<EngineStatus> {
        self.status.clone()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorPosition {
        *self.cursor.borrow()
    }

    #[must_use]
    pub fn subscribe_cursor(&self) -> watch::Receiver<CursorPosition> {
        self.cursor.clone()
    }

    /// V-sign confirmation progress as of the last tick
    #[must_use]
    pub fn gate_state(&self) -> GateState {
        *self.gate.borrow()
    }

    /// Whether the loop task has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Cancel the loop and wait until the camera is released
    pub async fn stop(mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Gesture engine task ended abnormally: {e}");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        // The loop sees this (or the closed channel) at its next await and
        // leaves through `finish`
        self.shutdown.send_replace(true);
    }
}

struct EngineTask<S: PoseSource, K: ActionSink> {
    source: S,
    sink: K,
    pipeline: GesturePipeline,
    settings: EngineSettings,
    banner: ConfirmationBanner,
    palms: Option<PalmObserver>,
    camera: CameraState,
    /// Source stopped since it was last started
    released: bool,
    controls: watch::Receiver<Controls>,
    shutdown: watch::Receiver<bool>,
    status: watch::Sender<EngineStatus>,
    cursor: watch::Sender<CursorPosition>,
    gate: watch::Sender<GateState>,
}

/// The task can also be dropped mid-await (runtime shutdown); the camera
/// goes with it.
impl<S: PoseSource, K: ActionSink> Drop for EngineTask<S, K> {
    fn drop(&mut self) {
        if !self.released {
            self.source.stop();
        }
    }
}

impl<S: PoseSource, K: ActionSink> EngineTask<S, K> {
    async fn run(mut self) {
        info!("Loading hand pose model");
        let loaded = tokio::select! {
            biased;
            _ = self.shutdown.changed() => None,
            result = self.source.load() => Some(result),
        };
        match loaded {
            None => return self.finish(),
            Some(Err(e)) => {
                error!("Hand pose model failed to load: {e}");
                let message = e.to_string();
                self.sink.show_message(Some(&message));
                self.set_status(EngineStatus::ModelLoadFailed(message));
                return;
            }
            Some(Ok(())) => info!("Hand pose model ready, filter: {}", self.pipeline.filter_name()),
        }

        let mut ticker = tokio::time::interval(self.settings.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let stopping = tokio::select! {
                biased;
                _ = self.shutdown.changed() => true,
                _ = ticker.tick() => false,
            };
            if stopping {
                break;
            }

            let controls = *self.controls.borrow_and_update();
            self.expire_banner(Instant::now());

            if !self.sync_camera(&controls) {
                continue;
            }
            if controls.is_suppressed(Instant::now()) || !self.source.is_ready() {
                continue;
            }

            let estimated = tokio::select! {
                biased;
                _ = self.shutdown.changed() => None,
                result = self.source.estimate() => Some(result),
            };
            // Shutdown won the race: whatever the estimation held is discarded
            let Some(result) = estimated else { break };

            let now = Instant::now();
            let dispatch = match result {
                Ok(hands) => {
                    self.count_palms(hands.len(), now);
                    self.pipeline.process(&hands, now)
                }
                Err(e) => {
                    warn!("Pose estimation failed, treating frame as empty: {e}");
                    self.pipeline.skip();
                    None
                }
            };

            let cursor = self.pipeline.cursor();
            self.cursor.send_if_modified(|current| {
                let changed = *current != cursor;
                *current = cursor;
                changed
            });
            self.gate.send_replace(self.pipeline.gate_state());

            if let Some(dispatch) = dispatch {
                self.apply(dispatch, now);
            }
        }

        self.finish();
    }

    /// Bring the camera in line with gesture mode; true when it is running
    fn sync_camera(&mut self, controls: &Controls) -> bool {
        match (controls.gesture_enabled, self.camera) {
            (true, CameraState::On) => true,
            (true, CameraState::Failed) => false,
            (true, CameraState::Off) => match self.source.start(self.settings.facing) {
                Ok(()) => {
                    info!("Camera started ({:?} facing)", self.settings.facing);
                    self.camera = CameraState::On;
                    self.released = false;
                    self.set_status(EngineStatus::Running);
                    true
                }
                Err(e) => {
                    error!("Camera unavailable: {e}");
                    self.camera = CameraState::Failed;
                    self.banner.pin(MSG_CAMERA_UNAVAILABLE);
                    self.sink.show_message(Some(MSG_CAMERA_UNAVAILABLE));
                    self.set_status(EngineStatus::CameraUnavailable(e.to_string()));
                    false
                }
            },
            (false, state) => {
                match state {
                    CameraState::On => {
                        info!("Gesture mode off, releasing camera");
                        self.source.stop();
                        self.released = true;
                        // Frames after the camera reopens start a new run
                        self.pipeline.skip();
                        self.gate.send_replace(self.pipeline.gate_state());
                        if let Some(palms) = &mut self.palms {
                            palms.reset();
                        }
                    }
                    CameraState::Failed => {
                        self.banner.clear();
                        self.sink.show_message(None);
                    }
                    CameraState::Off => {}
                }
                self.camera = CameraState::Off;
                self.set_status(EngineStatus::Paused);
                false
            }
        }
    }

    fn apply(&mut self, dispatch: Dispatch, now: Instant) {
        debug!("Dispatching {:?}", dispatch.gesture);
        if let Some(route) = &dispatch.route {
            self.sink.navigate(route);
        }
        self.banner.show(&dispatch.message, now);
        self.sink.show_message(Some(&dispatch.message));
    }

    fn count_palms(&mut self, hands: usize, now: Instant) {
        let Some(count) = self.palms.as_mut().and_then(|p| p.observe(hands, now)) else {
            return;
        };
        let message = count.message();
        if self.banner.message() != Some(message) {
            debug!("Palm count changed: {count:?}");
            self.banner.pin(message);
            self.sink.show_message(Some(message));
        }
    }

    fn expire_banner(&mut self, now: Instant) {
        if self.banner.expire(now) {
            self.sink.show_message(None);
        }
    }

    fn set_status(&self, status: EngineStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
    }

    fn finish(&mut self) {
        self.source.stop();
        self.released = true;
        self.camera = CameraState::Off;
        self.set_status(EngineStatus::Stopped);
        info!("Gesture engine stopped");
    }
}
