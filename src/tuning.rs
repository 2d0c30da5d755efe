//! Data-driven game balance
//!
//! Each game takes a tuning struct. Presets reproduce the shipped games, and
//! any of them can be overridden from JSON; missing fields, nested ones
//! included, keep the preset's value. Constructors validate, so a bad file fails before the first frame.

use std::f32::consts::PI;

use glam::Vec2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, require_positive};
use crate::sim::body::{DampingMode, PhysicsConstants};
use crate::sim::category::{Category, HazardPolicy, ScoreRules, Size};
use crate::sim::hit::{Aabb, HitMode, HitRules};
use crate::sim::landing::{LandingRules, SettleMode, UprightBand};
use crate::sim::spawn::{CategorySpec, SpawnOrigin, SpawnPolicy};

/// Common loading behaviour for tuning structs
pub trait Tuning: Serialize + DeserializeOwned + Default + Sized {
    fn validate(&self) -> Result<(), ConfigError>;

    /// Parse and validate a JSON tuning document over the default preset
    fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_json_over(&Self::default(), json)
    }

    /// Parse a partial JSON document on top of `preset`
    ///
    /// Objects merge key by key at every depth, so `{"spawn": {"max_concurrent": 5}}`
    /// keeps the rest of the preset's spawn policy. Arrays and scalars replace.
    fn from_json_over(preset: &Self, json: &str) -> Result<Self, ConfigError> {
        let patch: Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(preset)?;
        merge(&mut merged, patch);
        let tuning: Self = serde_json::from_value(merged)?;
        tuning.validate()?;
        Ok(tuning)
    }
}

fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

fn out_of_range(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        reason: reason.into(),
    }
}

fn require_unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(out_of_range(field, format!("must lie in (0, 1] (got {})", value)))
    }
}

/// Playfield dimensions in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("playfield width", self.width as f64)?;
        require_positive("playfield height", self.height as f64)
    }
}

/// Range the launch spin is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinRange {
    pub min: f32,
    pub max: f32,
    /// Flip the sign on a coin toss
    pub either_direction: bool,
}

// ============================================================================
// Flip
// ============================================================================

/// Balance for the single-attempt bottle flip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipTuning {
    pub physics: PhysicsConstants,
    /// Horizontal position of the bottle
    pub body_x: f32,
    /// Distance from the bottle's center to its base
    pub half_height: f32,
    /// Upward velocity given at launch (negative is up)
    pub launch_impulse: f32,
    pub spin: SpinRange,
    pub landing: LandingRules,
    pub upright_points: i64,
    /// A fall blocks further launches until `reset`
    pub fall_requires_reset: bool,
}

impl Default for FlipTuning {
    fn default() -> Self {
        Self::classic()
    }
}

impl FlipTuning {
    /// Bottle on a table: must land a near-full turn, eases over when it misses
    pub fn classic() -> Self {
        Self {
            physics: PhysicsConstants {
                gravity: 0.6,
                air_resistance: 1.0,
                spin_resistance: 0.985,
                floor_y: 400.0,
                damping: DampingMode::Normalized,
            },
            body_x: 200.0,
            half_height: 0.0,
            launch_impulse: -15.0,
            spin: SpinRange {
                min: 0.1,
                max: 0.3,
                either_direction: false,
            },
            landing: LandingRules {
                bands: vec![UprightBand {
                    center: 6.0,
                    half_width: 0.5,
                    rest: 0.0,
                }],
                spin_threshold: None,
                settle: SettleMode::Ease {
                    step: 0.05,
                    final_band: 0.06,
                    jitter: 0.05,
                },
            },
            upright_points: 1,
            fall_requires_reset: true,
        }
    }

    /// Narrower landing band
    pub fn strict() -> Self {
        let mut tuning = Self::classic();
        tuning.landing.bands = vec![UprightBand {
            center: 6.05,
            half_width: 0.35,
            rest: 0.0,
        }];
        tuning
    }

    /// Bottle that can stand on base or cap, falls instantly, flips again at once
    pub fn arcade() -> Self {
        let half = 30f32.to_radians();
        Self {
            physics: PhysicsConstants {
                gravity: 0.5,
                air_resistance: 0.995,
                spin_resistance: 0.995,
                floor_y: 600.0,
                damping: DampingMode::Normalized,
            },
            body_x: 200.0,
            half_height: 50.0,
            launch_impulse: -15.0,
            spin: SpinRange {
                min: 0.2,
                max: 0.2,
                either_direction: true,
            },
            landing: LandingRules {
                bands: vec![UprightBand::around(0.0, half), UprightBand::around(PI, half)],
                spin_threshold: Some(0.15),
                settle: SettleMode::Snap,
            },
            upright_points: 1,
            fall_requires_reset: false,
        }
    }
}

impl Tuning for FlipTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.physics;
        require_positive("gravity", p.gravity as f64)?;
        require_unit_interval("air_resistance", p.air_resistance)?;
        require_unit_interval("spin_resistance", p.spin_resistance)?;
        if !p.floor_y.is_finite() {
            return Err(out_of_range("floor_y", "must be finite"));
        }
        if !(self.half_height >= 0.0) {
            return Err(out_of_range("half_height", "must not be negative"));
        }
        if !(self.launch_impulse < 0.0) {
            return Err(out_of_range(
                "launch_impulse",
                format!("must point upward (negative, got {})", self.launch_impulse),
            ));
        }
        if !(self.spin.min <= self.spin.max) || !self.spin.max.is_finite() {
            return Err(out_of_range("spin", "min must not exceed max"));
        }
        if self.landing.bands.is_empty() {
            return Err(out_of_range("landing.bands", "needs at least one upright band"));
        }
        for band in &self.landing.bands {
            require_positive("band half_width", band.half_width as f64)?;
        }
        if let Some(threshold) = self.landing.spin_threshold {
            require_positive("spin_threshold", threshold as f64)?;
        }
        if let SettleMode::Ease {
            step,
            final_band,
            jitter,
        } = self.landing.settle
        {
            require_positive("settle step", step as f64)?;
            require_positive("settle final_band", final_band as f64)?;
            if !(jitter >= 0.0) {
                return Err(out_of_range("settle jitter", "must not be negative"));
            }
        }
        if self.upright_points < 0 {
            return Err(out_of_range("upright_points", "must not be negative"));
        }
        Ok(())
    }
}

// ============================================================================
// Drop-catch
// ============================================================================

/// Fall speed that rises with score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallSpeed {
    /// px per nominal tick at zero difficulty
    pub base: f32,
    pub per_point: f32,
}

impl FallSpeed {
    pub fn at(&self, difficulty: f32) -> f32 {
        self.base + difficulty.max(0.0) * self.per_point
    }
}

/// Balance for the continuous click-to-catch game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTuning {
    pub playfield: Playfield,
    pub spawn: SpawnPolicy,
    pub fall: FallSpeed,
    pub hit: HitRules,
    pub hit_mode: HitMode,
    pub scoring: ScoreRules,
    /// An entity leaves once `y + exit_margin` reaches the playfield bottom
    pub exit_margin: f32,
    /// How long penalty notices stay up
    pub notice_ms: f64,
}

impl Default for DropTuning {
    fn default() -> Self {
        Self {
            playfield: Playfield {
                width: 500.0,
                height: 800.0,
            },
            spawn: SpawnPolicy::default(),
            fall: FallSpeed {
                base: 3.0,
                per_point: 0.05,
            },
            hit: HitRules::default(),
            hit_mode: HitMode::All,
            scoring: ScoreRules::default(),
            exit_margin: 60.0,
            notice_ms: 2000.0,
        }
    }
}

impl Tuning for DropTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        self.playfield.validate()?;
        self.spawn.validate(self.playfield.width)?;
        require_positive("fall base", self.fall.base as f64)?;
        if !(self.fall.per_point >= 0.0) {
            return Err(out_of_range("fall per_point", "must not be negative"));
        }
        self.hit.validate()?;
        let s = &self.scoring;
        if s.reward_points < 0 || s.penalty_points < 0 {
            return Err(out_of_range("scoring", "point values must not be negative"));
        }
        if let HazardPolicy::Penalty(points) = s.hazard {
            if points < 0 {
                return Err(out_of_range("hazard penalty", "must not be negative"));
            }
        }
        if !(self.exit_margin >= 0.0) {
            return Err(out_of_range("exit_margin", "must not be negative"));
        }
        require_positive("notice_ms", self.notice_ms)
    }
}

// ============================================================================
// Paddle-catch
// ============================================================================

/// Balance for the paddle game: catch every variant exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleTuning {
    pub playfield: Playfield,
    /// Difficulty for the interval is the number of drops spawned so far
    pub spawn: SpawnPolicy,
    pub base_speed: f32,
    pub speed_per_catch: f32,
    pub paddle: Size,
    /// Distance from the playfield bottom to the paddle center
    pub paddle_inset: f32,
}

impl Default for PaddleTuning {
    fn default() -> Self {
        Self {
            playfield: Playfield {
                width: 500.0,
                height: 800.0,
            },
            spawn: SpawnPolicy {
                categories: vec![
                    CategorySpec::new(Category::Reward, 1.0)
                        .with_size(Size::new(100.0, 100.0))
                        .with_variants(6),
                ],
                max_concurrent: 32,
                base_interval_ms: 1000.0,
                floor_interval_ms: 200.0,
                decay_ms: 10.0,
                padding: 0.0,
                origin: SpawnOrigin::HalfAbove,
            },
            base_speed: 2.0,
            speed_per_catch: 0.1,
            paddle: Size::new(50.0, 30.0),
            paddle_inset: 10.0,
        }
    }
}

impl PaddleTuning {
    /// Distinct variants that must be caught to win
    pub fn variant_count(&self) -> u32 {
        self.spawn
            .categories
            .iter()
            .map(|c| c.variants as u32)
            .max()
            .unwrap_or(1)
    }
}

impl Tuning for PaddleTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        self.playfield.validate()?;
        self.spawn.validate(self.playfield.width)?;
        require_positive("base_speed", self.base_speed as f64)?;
        if !(self.speed_per_catch >= 0.0) {
            return Err(out_of_range("speed_per_catch", "must not be negative"));
        }
        require_positive("paddle width", self.paddle.width as f64)?;
        require_positive("paddle height", self.paddle.height as f64)?;
        if self.paddle.width > self.playfield.width {
            return Err(out_of_range("paddle width", "wider than the playfield"));
        }
        if !(self.paddle_inset >= 0.0 && self.paddle_inset < self.playfield.height) {
            return Err(out_of_range("paddle_inset", "must lie inside the playfield"));
        }
        Ok(())
    }
}

// ============================================================================
// Timing-catch
// ============================================================================

/// Balance for the stop-the-piece timing game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Leftmost x of the piece's travel
    pub track_min_x: f32,
    /// Rightmost x of the piece's left edge
    pub track_max_x: f32,
    pub piece: Size,
    pub piece_y: f32,
    /// px per nominal tick
    pub speed: f32,
    /// Target the piece must be stopped inside
    pub frame: Aabb,
    /// Overhang allowed on each edge, in px
    pub tolerance: f32,
    pub catch_points: i64,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            track_min_x: 0.0,
            track_max_x: 440.0,
            piece: Size::new(60.0, 120.0),
            piece_y: 100.0,
            speed: 4.0,
            frame: Aabb::from_pos_size(Vec2::new(190.0, 90.0), 80.0, 140.0),
            tolerance: 2.0,
            catch_points: 1,
        }
    }
}

impl Tuning for TimingTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        require_positive("piece width", self.piece.width as f64)?;
        require_positive("piece height", self.piece.height as f64)?;
        require_positive("speed", self.speed as f64)?;
        if !(self.track_max_x > self.track_min_x) {
            return Err(out_of_range("track", "track_max_x must exceed track_min_x"));
        }
        let frame = &self.frame;
        if !(frame.max.x > frame.min.x && frame.max.y > frame.min.y) {
            return Err(out_of_range("frame", "must have positive area"));
        }
        if !(self.tolerance >= 0.0) {
            return Err(out_of_range("tolerance", "must not be negative"));
        }
        Ok(())
    }
}
