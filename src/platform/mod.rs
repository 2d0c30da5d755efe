//! Platform abstraction layer
//!
//! Turns host frame timestamps into fixed simulation ticks. On `wasm32` the
//! `web` module exposes each game to JavaScript.

use crate::consts::{MAX_FRAME_MS, MAX_SUBSTEPS, NOMINAL_TICK_MS};
use crate::sim::GameEvent;

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Fixed-step accumulator fed by animation-frame timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    last_ms: Option<f64>,
    accumulator_ms: f64,
    running: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_ms: None,
            accumulator_ms: 0.0,
            running: true,
        }
    }

    /// Number of nominal ticks to run for a frame at `now_ms`
    ///
    /// The first frame only primes the clock. Gaps longer than `MAX_FRAME_MS`
    /// (a backgrounded tab) are clamped and at most `MAX_SUBSTEPS` ticks are
    /// released per frame.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.running {
            return 0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };

        let dt = (now_ms - last).clamp(0.0, MAX_FRAME_MS);
        self.accumulator_ms += dt;

        let mut substeps = 0;
        while self.accumulator_ms >= NOMINAL_TICK_MS && substeps < MAX_SUBSTEPS {
            self.accumulator_ms -= NOMINAL_TICK_MS;
            substeps += 1;
        }
        substeps
    }

    /// No ticks are released after this until `resume`
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator_ms = 0.0;
    }

    /// Restart without replaying the time spent stopped
    pub fn resume(&mut self) {
        self.running = true;
        self.last_ms = None;
        self.accumulator_ms = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Run however many fixed ticks the frame at `now_ms` releases
pub fn drive(
    clock: &mut FrameClock,
    now_ms: f64,
    mut tick: impl FnMut(f64) -> Vec<GameEvent>,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    for _ in 0..clock.advance(now_ms) {
        events.extend(tick(NOMINAL_TICK_MS));
    }
    events
}
