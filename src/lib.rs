//! Bottle Arcade - real-time engine for a family of browser mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, landing, spawning, hit-testing, game phases)
//! - `tuning`: Data-driven game balance
//! - `platform`: Frame clock and browser bindings
//!
//! Rendering, asset loading and persistence live in the host page. The host
//! calls into a game once per frame (`tick`) and once per pointer event.

pub mod error;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::{DropTuning, FlipTuning, PaddleTuning, TimingTuning};

use std::f32::consts::TAU;

/// Engine-wide constants
pub mod consts {
    /// Display refresh the per-tick tuning constants assume
    pub const NOMINAL_HZ: f64 = 60.0;
    /// Length of one nominal tick in milliseconds
    pub const NOMINAL_TICK_MS: f64 = 1000.0 / NOMINAL_HZ;
    /// Longest wall-clock gap accepted in one frame (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f64 = 100.0;
    /// Maximum catch-up ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Convert elapsed milliseconds into nominal tick units
#[inline]
pub fn tick_units(elapsed_ms: f64) -> f32 {
    (elapsed_ms.max(0.0) / consts::NOMINAL_TICK_MS) as f32
}

/// Normalize angle to [0, 2π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Shortest unsigned distance between two angles, in [0, π]
#[inline]
pub fn angular_distance(a: f32, b: f32) -> f32 {
    let d = normalize_angle(a - b);
    d.min(TAU - d)
}

/// Signed shortest rotation that takes `from` onto `to`, in (-π, π]
#[inline]
pub fn angular_delta(from: f32, to: f32) -> f32 {
    let d = normalize_angle(to - from);
    if d > std::f32::consts::PI { d - TAU } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(7.8) - (7.8 - TAU)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(-1e-9), 0.0);
    }

    #[test]
    fn test_angular_distance_wraps() {
        assert!((angular_distance(0.1, TAU - 0.1) - 0.2).abs() < 1e-5);
        assert!((angular_distance(PI, 0.0) - PI).abs() < 1e-5);
    }

    #[test]
    fn test_angular_delta_sign() {
        assert!(angular_delta(0.1, 0.3) > 0.0);
        assert!(angular_delta(0.1, TAU - 0.1) < 0.0);
    }

    #[test]
    fn test_tick_units() {
        assert!((tick_units(consts::NOMINAL_TICK_MS) - 1.0).abs() < 1e-6);
        assert_eq!(tick_units(-5.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_normalized_angle_in_range(angle in -1000.0f32..1000.0f32) {
            let n = normalize_angle(angle);
            prop_assert!((0.0..TAU).contains(&n));
        }
    }
}
