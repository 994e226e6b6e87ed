//! Gesture recognition from landmarks through classification, gating and dispatch


use gesture_gallery::classifier::{GestureClassifier, VSignWindows, Verdict};
use gesture_gallery::config::Config;
use gesture_gallery::constants::MSG_NO_TARGET;
use gesture_gallery::cursor::CursorPosition;
use gesture_gallery::debounce::{GestureEvent, NavigationGesture};
use gesture_gallery::dispatch::Dispatcher;
use gesture_gallery::landmarks::extract;
use gesture_gallery::pipeline::GesturePipeline;
use gesture_gallery::targets::{Bindings, Rect, TargetBinding};
use std::time::Duration;
use test_helpers::{hand, open_hand, pinch_hand, v_sign_hand};
use tokio::time::Instant;

fn classify(h: &gesture_gallery::landmarks::Hand) -> Verdict {
    GestureClassifier::default().classify(&extract(std::slice::from_ref(h)).unwrap())
}

fn two_buttons() -> Bindings {
    Bindings::new()
        .target(TargetBinding::new("a", Rect::new(0.0, 0.0, 100.0, 100.0), "/a").with_label("A"))
        .target(TargetBinding::new("b", Rect::new(200.0, 200.0, 300.0, 300.0), "/b").with_label("B"))
}

fn pipeline(bindings: Bindings) -> GesturePipeline {
    let mut config = Config::default();
    config.filter.filter_type = "none".to_string();
    config.create_pipeline(bindings).unwrap()
}

#[test]
fn test_reference_hands() {
    assert_eq!(classify(&v_sign_hand()), Verdict::VSign);
    assert_eq!(classify(&pinch_hand(100.0, 100.0)), Verdict::Click);
    assert_eq!(classify(&open_hand()), Verdict::None);
}

#[test]
fn test_pinch_threshold_is_strict() {
    // Wrist to the side so the V-sign windows never match
    let at = |gap: f64| hand((0.0, 0.0), (100.0 + gap, 100.0), (100.0, 100.0), (100.0, 100.0));
    assert_eq!(classify(&at(59.9)), Verdict::Click);
    assert_eq!(classify(&at(60.0)), Verdict::None);
    assert_eq!(classify(&at(60.1)), Verdict::None);
}

#[test]
fn test_v_sign_wins_over_pinch() {
    // Thumb tucked onto the index tip of a valid V
    let h = hand((300.0, 400.0), (266.0, 203.0), (265.0, 202.0), (317.0, 202.0));
    assert_eq!(classify(&h), Verdict::VSign);
}

#[test]
fn test_v_sign_rejects_pointing_down() {
    // Same shape mirrored below the wrist: angles near +90
    let h = hand((300.0, 0.0), (200.0, 100.0), (265.0, 198.0), (317.0, 198.0));
    assert_eq!(classify(&h), Verdict::None);
}

#[test]
fn test_v_sign_distance_window() {
    // Both angles in range; tips 30 px apart, then 130 px apart
    let too_close = hand((300.0, 400.0), (100.0, 400.0), (300.0, 200.0), (330.0, 200.0));
    assert_eq!(classify(&too_close), Verdict::None);
    let too_far = hand((300.0, 400.0), (100.0, 400.0), (200.0, 100.0), (330.0, 100.0));
    assert_eq!(classify(&too_far), Verdict::None);
}

#[test]
fn test_v_sign_windows_inclusive_edges() {
    let windows = VSignWindows::default();
    assert!(windows.matches(-110.0, -100.0, 40.0));
    assert!(windows.matches(-90.0, -80.0, 100.0));
    assert!(!windows.matches(-110.001, -90.0, 50.0));
    assert!(!windows.matches(-100.0, -79.999, 50.0));
    assert!(!windows.matches(-100.0, -90.0, 100.001));
}

#[test]
fn test_hit_test_picks_containing_target() {
    let dispatcher = Dispatcher::new(two_buttons());

    let hit = dispatcher.dispatch(&CursorPosition::new(50.0, 50.0), GestureEvent::Click).unwrap();
    assert_eq!(hit.route.as_deref(), Some("/a"));
    assert_eq!(hit.message, "Gesture detected: Navigating to A");

    let miss = dispatcher.dispatch(&CursorPosition::new(150.0, 150.0), GestureEvent::Click).unwrap();
    assert_eq!(miss.route, None);
    assert_eq!(miss.message, MSG_NO_TARGET);
}

#[test]
fn test_unbound_v_sign_does_nothing() {
    let dispatcher = Dispatcher::new(two_buttons());
    let event = GestureEvent::Navigate(NavigationGesture::VSign);
    assert!(dispatcher.dispatch(&CursorPosition::new(50.0, 50.0), event).is_none());
}

#[test]
fn test_pipeline_click_maps_into_viewport() {
    let mut p = pipeline(two_buttons());
    let start = Instant::now();

    // (125, 130) source px is (250, 195) on a 1280x720 viewport: just above B
    let d = p.process(&[pinch_hand(125.0, 130.0)], start).unwrap();
    assert_eq!(d.route, None);
    assert_eq!(p.cursor(), CursorPosition::new(250.0, 195.0));

    // (125, 140) is (250, 210): inside B, once cooldown and quiet time pass
    assert!(p.process(&[pinch_hand(125.0, 140.0)], start + Duration::from_millis(500)).is_none());
    assert!(p.process(&[], start + Duration::from_millis(700)).is_none());
    let d = p.process(&[pinch_hand(125.0, 140.0)], start + Duration::from_millis(900)).unwrap();
    assert_eq!(d.route.as_deref(), Some("/b"));
}

#[test]
fn test_pipeline_v_sign_needs_five_frames() {
    let mut p = pipeline(two_buttons().on_v_sign("/settings", "settings"));
    let start = Instant::now();
    let frame = |i: u64| start + Duration::from_millis(i * 16);

    for i in 0..4 {
        assert!(p.process(&[v_sign_hand()], frame(i)).is_none());
    }
    // A lost hand breaks the run
    assert!(p.process(&[], frame(4)).is_none());
    for i in 5..9 {
        assert!(p.process(&[v_sign_hand()], frame(i)).is_none());
    }
    let d = p.process(&[v_sign_hand()], frame(9)).unwrap();
    assert_eq!(d.gesture, GestureEvent::Navigate(NavigationGesture::VSign));
    assert_eq!(d.route.as_deref(), Some("/settings"));
    assert_eq!(d.message, "V gesture detected! Navigating to settings...");
}
