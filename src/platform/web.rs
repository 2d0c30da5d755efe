//! JavaScript bindings
//!
//! Each game is wrapped with its own frame clock. `frame` is meant to be called
//! from `requestAnimationFrame`; events and snapshots cross the boundary as
//! JSON strings. Tuning JSON is optional and is merged over the chosen
//! preset, so fields it leaves out keep the preset's values.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use super::{FrameClock, drive};
use crate::sim::{DropGame, FlipGame, GameEvent, PaddleGame, TimingGame};
use crate::tuning::{DropTuning, FlipTuning, PaddleTuning, TimingTuning, Tuning};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) is harmless
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("bottle arcade {}", env!("CARGO_PKG_VERSION"));
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

fn tuning_or<T: Tuning>(json: Option<String>, preset: T) -> Result<T, JsError> {
    match json {
        Some(json) => {
            T::from_json_over(&preset, &json).map_err(|e| JsError::new(&e.to_string()))
        }
        None => Ok(preset),
    }
}

fn events_json(events: &[GameEvent]) -> Result<String, JsError> {
    to_json(&events)
}

#[wasm_bindgen]
pub struct WebFlipGame {
    game: FlipGame,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebFlipGame {
    /// `preset` is one of "classic", "strict" or "arcade"
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, preset: &str, tuning_json: Option<String>) -> Result<WebFlipGame, JsError> {
        let preset = match preset {
            "strict" => FlipTuning::strict(),
            "arcade" => FlipTuning::arcade(),
            _ => FlipTuning::classic(),
        };
        let tuning = tuning_or(tuning_json, preset)?;
        let game = FlipGame::new(tuning, seed as u64).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            game,
            clock: FrameClock::new(),
        })
    }

    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        let game = &mut self.game;
        events_json(&drive(&mut self.clock, now_ms, |dt| game.tick(dt)))
    }

    pub fn trigger(&mut self) -> Result<String, JsError> {
        events_json(&self.game.trigger())
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, _x: f32, _y: f32) -> Result<String, JsError> {
        self.trigger()
    }

    pub fn reset(&mut self) -> Result<String, JsError> {
        events_json(&self.game.reset())
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        to_json(&self.game.snapshot())
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }
}

#[wasm_bindgen]
pub struct WebDropGame {
    game: DropGame,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebDropGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, tuning_json: Option<String>) -> Result<WebDropGame, JsError> {
        let tuning = tuning_or(tuning_json, DropTuning::default())?;
        let game = DropGame::new(tuning, seed as u64).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            game,
            clock: FrameClock::new(),
        })
    }

    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        let game = &mut self.game;
        events_json(&drive(&mut self.clock, now_ms, |dt| game.tick(dt)))
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<String, JsError> {
        events_json(&self.game.pointer_down(x, y))
    }

    pub fn reset(&mut self) -> Result<String, JsError> {
        events_json(&self.game.reset())
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        to_json(&self.game.snapshot())
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }
}

#[wasm_bindgen]
pub struct WebPaddleGame {
    game: PaddleGame,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebPaddleGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, tuning_json: Option<String>) -> Result<WebPaddleGame, JsError> {
        let tuning = tuning_or(tuning_json, PaddleTuning::default())?;
        let game =
            PaddleGame::new(tuning, seed as u64).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            game,
            clock: FrameClock::new(),
        })
    }

    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        let game = &mut self.game;
        events_json(&drive(&mut self.clock, now_ms, |dt| game.tick(dt)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32) {
        self.game.pointer_move(x);
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<String, JsError> {
        events_json(&self.game.pointer_down(x, y))
    }

    pub fn reset(&mut self) -> Result<String, JsError> {
        events_json(&self.game.reset())
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        to_json(&self.game.snapshot())
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }
}

#[wasm_bindgen]
pub struct WebTimingGame {
    game: TimingGame,
    clock: FrameClock,
}

#[wasm_bindgen]
impl WebTimingGame {
    #[wasm_bindgen(constructor)]
    pub fn new(tuning_json: Option<String>) -> Result<WebTimingGame, JsError> {
        let tuning = tuning_or(tuning_json, TimingTuning::default())?;
        let game = TimingGame::new(tuning).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self {
            game,
            clock: FrameClock::new(),
        })
    }

    pub fn frame(&mut self, now_ms: f64) -> Result<String, JsError> {
        let game = &mut self.game;
        events_json(&drive(&mut self.clock, now_ms, |dt| game.tick(dt)))
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<String, JsError> {
        events_json(&self.game.pointer_down(x, y))
    }

    pub fn reset(&mut self) -> Result<String, JsError> {
        events_json(&self.game.reset())
    }

    pub fn snapshot(&self) -> Result<String, JsError> {
        to_json(&self.game.snapshot())
    }

    pub fn stop(&mut self) {
        self.clock.stop();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }
}
