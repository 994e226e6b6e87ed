//! One render tick's worth of gesture processing.
//!
//! [`GesturePipeline`] owns all state that survives between frames (filter,
//! cursor, debounce gate) and runs extraction → smoothing → classification →
//! gating → hit testing on a single estimation result. It has no clock or
//! I/O of its own, so it can be driven directly with synthetic frames.

use crate::classifier::{GestureClassifier, Verdict};
use crate::cursor::{CursorMapper, CursorPosition};
use crate::debounce::{GateState, GestureGate};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::filters::CursorFilter;
use crate::landmarks::{extract, Hand};
use tokio::time::Instant;

pub struct GesturePipeline {
    filter: Box<dyn CursorFilter>,
    mapper: CursorMapper,
    cursor: CursorPosition,
    classifier: GestureClassifier,
    gate: GestureGate,
    dispatcher: Dispatcher,
}

impl GesturePipeline {
    #[must_use]
    pub fn new(
        filter: Box<dyn CursorFilter>,
        mapper: CursorMapper,
        classifier: GestureClassifier,
        gate: GestureGate,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            filter,
            cursor: mapper.centre(),
            mapper,
            classifier,
            gate,
            dispatcher,
        }
    }

    /// Process one estimation result observed at `now`.
    ///
    /// Returns the effect to apply when a gesture passed the gate.
    pub fn process(&mut self, hands: &[Hand], now: Instant) -> Option<Dispatch> {
        let Some(points) = extract(hands) else {
            // Cursor holds its last position
            self.gate.miss();
            return None;
        };

        let (sx, sy) = self.filter.apply(points.index_tip.x, points.index_tip.y);
        self.cursor = self.mapper.map(sx, sy);

        let verdict = self.classifier.classify(&points);
        if verdict != Verdict::None {
            log::trace!("Frame verdict {:?} at ({:.0}, {:.0})", verdict, self.cursor.x, self.cursor.y);
        }

        let gesture = self.gate.admit(verdict, now)?;
        self.dispatcher.dispatch(&self.cursor, gesture)
    }

    /// A tick that produced no estimation at all
    pub fn skip(&mut self) {
        self.gate.miss();
    }

    #[must_use]
    pub const fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    #[must_use]
    pub const fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    #[must_use]
    pub fn filter_name(&self) -> &str {
        self.filter.name()
    }
}
