//! Turning confirmed gestures into navigation and on-screen feedback.

use crate::constants::{DEFAULT_CONFIRMATION_MS, MSG_NO_TARGET};
use crate::cursor::CursorPosition;
use crate::debounce::{GestureEvent, NavigationGesture};
use crate::targets::Bindings;
use log::{debug, info};
use std::time::Duration;
use tokio::time::Instant;

/// Where the engine sends its effects.
///
/// Implemented by the embedding screen: `navigate` hands a route to its
/// router, `show_message` sets or clears the overlay's message line.
pub trait ActionSink: Send {
    fn navigate(&mut self, route: &str);

    fn show_message(&mut self, message: Option<&str>);
}

/// Effect chosen for one confirmed gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub gesture: GestureEvent,
    /// Route to open, if the gesture landed on one
    pub route: Option<String>,
    /// Confirmation shown to the user
    pub message: String,
}

/// Resolves gestures against the screen's bindings
#[derive(Debug, Clone)]
pub struct Dispatcher {
    bindings: Bindings,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(bindings: Bindings) -> Self {
        Self { bindings }
    }

    #[must_use]
    pub const fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Decide what a gesture at `cursor` does.
    ///
    /// Returns `None` only for a navigation gesture with nothing bound.
    #[must_use]
    pub fn dispatch(&self, cursor: &CursorPosition, gesture: GestureEvent) -> Option<Dispatch> {
        match gesture {
            GestureEvent::Click => Some(match self.bindings.hit_test(cursor) {
                Some(target) => {
                    info!("Click on '{}' at ({:.0}, {:.0})", target.region.name, cursor.x, cursor.y);
                    Dispatch {
                        gesture,
                        route: Some(target.route.clone()),
                        message: format!("Gesture detected: Navigating to {}", target.label()),
                    }
                }
                None => {
                    debug!("Click at ({:.0}, {:.0}) outside every target", cursor.x, cursor.y);
                    Dispatch {
                        gesture,
                        route: None,
                        message: MSG_NO_TARGET.to_string(),
                    }
                }
            }),
            GestureEvent::Navigate(NavigationGesture::VSign) => {
                let Some(nav) = &self.bindings.v_sign else {
                    debug!("V-sign confirmed but this screen binds no route");
                    return None;
                };
                info!("V-sign navigation to {}", nav.route);
                Some(Dispatch {
                    gesture,
                    route: Some(nav.route.clone()),
                    message: format!("V gesture detected! Navigating to {}...", nav.label()),
                })
            }
        }
    }
}

/// Message line with optional expiry
#[derive(Debug, Clone)]
pub struct ConfirmationBanner {
    duration: Duration,
    message: Option<String>,
    expires_at: Option<Instant>,
}

impl Default for ConfirmationBanner {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_CONFIRMATION_MS))
    }
}

impl ConfirmationBanner {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            message: None,
            expires_at: None,
        }
    }

    /// Show `message` until the banner duration has passed
    pub fn show(&mut self, message: &str, now: Instant) {
        self.message = Some(message.to_string());
        self.expires_at = Some(now + self.duration);
    }

    /// Show `message` until replaced or cleared
    pub fn pin(&mut self, message: &str) {
        self.message = Some(message.to_string());
        self.expires_at = None;
    }

    pub fn clear(&mut self) {
        self.message = None;
        self.expires_at = None;
    }

    /// Drop an expired message; true if one was dropped
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::{Rect, TargetBinding};

    fn gallery() -> Dispatcher {
        Dispatcher::new(
            Bindings::new()
                .target(TargetBinding::new("register", Rect::new(0.0, 0.0, 100.0, 100.0), "/register").with_label("Register"))
                .target(TargetBinding::new("login", Rect::new(200.0, 200.0, 300.0, 300.0), "/login").with_label("Login")),
        )
    }

    #[test]
    fn test_click_on_target() {
        let d = gallery().dispatch(&CursorPosition::new(50.0, 50.0), GestureEvent::Click).unwrap();
        assert_eq!(d.route.as_deref(), Some("/register"));
        assert_eq!(d.message, "Gesture detected: Navigating to Register");
    }

    #[test]
    fn test_click_off_target() {
        let d = gallery().dispatch(&CursorPosition::new(150.0, 150.0), GestureEvent::Click).unwrap();
        assert_eq!(d.route, None);
        assert_eq!(d.message, MSG_NO_TARGET);
    }

    #[test]
    fn test_v_sign_ignores_cursor() {
        let dispatcher = Dispatcher::new(Bindings::new().on_v_sign("/settings", "settings"));
        let gesture = GestureEvent::Navigate(NavigationGesture::VSign);
        for cursor in [CursorPosition::new(0.0, 0.0), CursorPosition::new(999.0, 999.0)] {
            let d = dispatcher.dispatch(&cursor, gesture).unwrap();
            assert_eq!(d.route.as_deref(), Some("/settings"));
            assert_eq!(d.message, "V gesture detected! Navigating to settings...");
        }
    }

    #[test]
    fn test_v_sign_unbound() {
        let gesture = GestureEvent::Navigate(NavigationGesture::VSign);
        assert!(gallery().dispatch(&CursorPosition::default(), gesture).is_none());
    }

    #[test]
    fn test_banner_expiry() {
        let mut banner = ConfirmationBanner::default();
        let start = Instant::now();
        banner.show("hello", start);
        assert!(!banner.expire(start + Duration::from_millis(1999)));
        assert_eq!(banner.message(), Some("hello"));
        assert!(banner.expire(start + Duration::from_millis(2000)));
        assert_eq!(banner.message(), None);
    }

    #[test]
    fn test_pinned_message_stays() {
        let mut banner = ConfirmationBanner::default();
        banner.pin("camera");
        assert!(!banner.expire(Instant::now() + Duration::from_secs(3600)));
        assert_eq!(banner.message(), Some("camera"));
    }
}
