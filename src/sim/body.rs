//! Rigid body motion for single-body games
//!
//! Semi-implicit Euler, measured in nominal 60 Hz tick units. One call to
//! `advance` is one integration step; there is no sub-stepping. The floor
//! check runs after every step, so a falling body can never end a step below
//! the floor line.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Motion phase of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyPhase {
    /// Resting on the floor, velocities zero
    Grounded,
    /// In flight under gravity
    Airborne,
    /// Touched down, orientation still being resolved
    Settling,
}

/// How per-tick damping responds to frame length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DampingMode {
    /// Damping raised to the number of elapsed nominal ticks
    #[default]
    Normalized,
    /// Damping applied once per step regardless of frame length
    FrameCoupled,
}

/// World constants for one game
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConstants {
    /// Downward acceleration (px per tick²)
    pub gravity: f32,
    /// Multiplicative damping on linear velocity per tick
    pub air_resistance: f32,
    /// Multiplicative damping on angular velocity per tick
    pub spin_resistance: f32,
    /// Y coordinate of the floor line
    pub floor_y: f32,
    pub damping: DampingMode,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            air_resistance: 1.0,
            spin_resistance: 0.985,
            floor_y: 400.0,
            damping: DampingMode::Normalized,
        }
    }
}

impl PhysicsConstants {
    fn damping_factor(&self, per_tick: f32, dt_units: f32) -> f32 {
        match self.damping {
            DampingMode::Normalized => per_tick.powf(dt_units),
            DampingMode::FrameCoupled => per_tick,
        }
    }
}

/// A simulated rigid object (the bottle)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position, y grows downward
    pub pos: Vec2,
    /// Accumulated rotation in radians (not wrapped)
    pub rotation: f32,
    pub vel: Vec2,
    pub angular_vel: f32,
    /// Distance from center to the bottom edge when standing
    pub half_height: f32,
    pub phase: BodyPhase,
}

impl Body {
    /// Body at rest on the floor
    pub fn grounded(x: f32, floor_y: f32, half_height: f32) -> Self {
        Self {
            pos: Vec2::new(x, floor_y - half_height),
            rotation: 0.0,
            vel: Vec2::ZERO,
            angular_vel: 0.0,
            half_height,
            phase: BodyPhase::Grounded,
        }
    }

    /// Throw the body upward with the given vertical impulse and spin
    pub fn launch(&mut self, impulse: f32, spin: f32) {
        self.vel = Vec2::new(0.0, impulse);
        self.angular_vel = spin;
        self.rotation = 0.0;
        self.phase = BodyPhase::Airborne;
    }

    /// Come to rest at the given orientation
    pub fn ground(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.vel = Vec2::ZERO;
        self.angular_vel = 0.0;
        self.phase = BodyPhase::Grounded;
    }

    /// Ground contact predicate
    #[inline]
    pub fn touches_floor(&self, floor_y: f32) -> bool {
        self.pos.y >= floor_y - self.half_height
    }
}

/// Result of one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Advance {
    pub body: Body,
    /// The body reached the floor during this step
    pub contact: bool,
}

/// Advance an airborne body by `dt_units` nominal ticks
///
/// Bodies that are not airborne come back unchanged. On contact the body is
/// clamped to the floor, its linear velocity is zeroed and it moves to
/// `Settling`; angular velocity is kept so the landing can be classified.
pub fn advance(body: Body, dt_units: f32, constants: &PhysicsConstants) -> Advance {
    if body.phase != BodyPhase::Airborne || dt_units <= 0.0 {
        return Advance {
            body,
            contact: false,
        };
    }

    let mut next = body;
    next.vel.y += constants.gravity * dt_units;
    next.vel *= constants.damping_factor(constants.air_resistance, dt_units);
    next.pos += next.vel * dt_units;
    next.rotation += next.angular_vel * dt_units;
    next.angular_vel *= constants.damping_factor(constants.spin_resistance, dt_units);

    let contact = next.touches_floor(constants.floor_y);
    if contact {
        next.pos.y = constants.floor_y - next.half_height;
        next.vel = Vec2::ZERO;
        next.phase = BodyPhase::Settling;
    }

    Advance {
        body: next,
        contact,
    }
}
