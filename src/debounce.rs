//! Temporal gate turning per-frame verdicts into confirmed gestures.
//!
//! Clicks are rate limited by a cooldown and held back until the hand has
//! been quiet for a short stability window. V-signs must be seen on a run of
//! consecutive frames; any frame that breaks the run starts it over.

use crate::classifier::Verdict;
use crate::constants::{
    DEFAULT_CLICK_COOLDOWN_MS, DEFAULT_CONFIRMATION_FRAMES, DEFAULT_NAVIGATE_COOLDOWN_MS, DEFAULT_STABILITY_WINDOW_MS,
};
use crate::{Error, Result};
use log::debug;
use std::time::Duration;
use tokio::time::Instant;

/// Navigation gestures the engine recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationGesture {
    /// Index and middle fingers held up in a V
    VSign,
}

/// A gesture that passed the gate and should be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    Click,
    Navigate(NavigationGesture),
}

/// Timing parameters of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    /// Minimum time between two fired clicks
    pub click_cooldown: Duration,
    /// Quiet period after any raw detection before a click may fire
    pub stability_window: Duration,
    /// Consecutive V-sign frames needed to navigate
    pub confirmation_frames: u32,
    /// Minimum time between two fired navigations
    pub navigate_cooldown: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            click_cooldown: Duration::from_millis(DEFAULT_CLICK_COOLDOWN_MS),
            stability_window: Duration::from_millis(DEFAULT_STABILITY_WINDOW_MS),
            confirmation_frames: DEFAULT_CONFIRMATION_FRAMES,
            navigate_cooldown: Duration::from_millis(DEFAULT_NAVIGATE_COOLDOWN_MS),
        }
    }
}

/// Where the V-sign confirmation currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    /// Consecutive V-sign frames seen so far, below the confirmation count
    Accumulating(u32),
}

/// Debounce state carried across frames
#[derive(Debug, Clone)]
pub struct GestureGate {
    config: GateConfig,
    last_click: Option<Instant>,
    last_detection: Option<Instant>,
    last_navigate: Option<Instant>,
    streak: u32,
}

impl Default for GestureGate {
    fn default() -> Self {
        Self {
            config: GateConfig::default(),
            last_click: None,
            last_detection: None,
            last_navigate: None,
            streak: 0,
        }
    }
}

/// True when `since` is unset or more than `window` before `now`
fn elapsed_exceeds(since: Option<Instant>, now: Instant, window: Duration) -> bool {
    since.map_or(true, |t| now.saturating_duration_since(t) > window)
}

impl GestureGate {
    /// # Errors
    ///
    /// Returns `InvalidInput` if no confirmation frames are required.
    pub fn new(config: GateConfig) -> Result<Self> {
        if config.confirmation_frames == 0 {
            return Err(Error::InvalidInput(
                "V-sign confirmation needs at least one frame".to_string(),
            ));
        }
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Feed one frame's verdict, observed at `now`
    pub fn admit(&mut self, verdict: Verdict, now: Instant) -> Option<GestureEvent> {
        match verdict {
            Verdict::None => {
                self.streak = 0;
                None
            }
            Verdict::Click => {
                self.streak = 0;
                let ready = elapsed_exceeds(self.last_click, now, self.config.click_cooldown)
                    && elapsed_exceeds(self.last_detection, now, self.config.stability_window);
                self.last_detection = Some(now);
                if ready {
                    self.last_click = Some(now);
                    Some(GestureEvent::Click)
                } else {
                    None
                }
            }
            Verdict::VSign => {
                self.last_detection = Some(now);
                self.streak += 1;
                if self.streak < self.config.confirmation_frames {
                    return None;
                }
                self.streak = 0;
                if elapsed_exceeds(self.last_navigate, now, self.config.navigate_cooldown) {
                    self.last_navigate = Some(now);
                    Some(GestureEvent::Navigate(NavigationGesture::VSign))
                } else {
                    debug!("V-sign confirmed within navigate cooldown, suppressed");
                    None
                }
            }
        }
    }

    /// A frame without a usable hand breaks any V-sign run
    pub fn miss(&mut self) {
        self.streak = 0;
    }

    #[must_use]
    pub const fn state(&self) -> GateState {
        if self.streak == 0 {
            GateState::Idle
        } else {
            GateState::Accumulating(self.streak)
        }
    }

    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }
}
