//! Landing classification and the post-fall settle
//!
//! A landing is Upright when the wrapped rotation sits inside one of the
//! configured bands (inclusive) and the spin is below the threshold. A fallen
//! body then eases toward whichever lying orientation is nearer and freezes
//! there with a little jitter.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use crate::{angular_delta, angular_distance, normalize_angle};

/// Terminal classification of a flip attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Upright,
    Fallen,
}

/// Tolerance band around a standing orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UprightBand {
    /// Band center (radians)
    pub center: f32,
    /// Accepted distance either side of the center (radians)
    pub half_width: f32,
    /// Orientation the body snaps to when it lands inside the band
    pub rest: f32,
}

impl UprightBand {
    /// Band that snaps back onto its own center
    pub fn around(center: f32, half_width: f32) -> Self {
        Self {
            center,
            half_width,
            rest: center,
        }
    }

    /// Inclusive membership test on the wrapped circle
    pub fn contains(&self, rotation: f32) -> bool {
        angular_distance(rotation, self.center) <= self.half_width
    }
}

/// Side a fallen body ends up lying on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallSide {
    /// Lying at π/2
    Right,
    /// Lying at 3π/2
    Left,
}

impl FallSide {
    pub fn orientation(self) -> f32 {
        match self {
            FallSide::Right => FRAC_PI_2,
            FallSide::Left => PI + FRAC_PI_2,
        }
    }

    /// The lying orientation closest to `rotation`
    pub fn nearest(rotation: f32) -> Self {
        let right = angular_distance(rotation, FallSide::Right.orientation());
        let left = angular_distance(rotation, FallSide::Left.orientation());
        if right <= left {
            FallSide::Right
        } else {
            FallSide::Left
        }
    }
}

/// How a fallen body reaches its resting orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SettleMode {
    /// Rotate toward the nearer lying orientation a fixed step per tick
    Ease {
        /// Radians per nominal tick
        step: f32,
        /// Distance from the lying orientation at which the body freezes
        final_band: f32,
        /// Maximum random offset of the frozen orientation
        jitter: f32,
    },
    /// Drop straight onto a randomly chosen side
    Snap,
}

/// Rules for classifying a landing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingRules {
    pub bands: Vec<UprightBand>,
    /// Landings spinning at or above this rate fall over; `None` ignores spin
    pub spin_threshold: Option<f32>,
    pub settle: SettleMode,
}

impl Default for LandingRules {
    fn default() -> Self {
        Self {
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
        }
    }
}

/// Outcome of classifying a landing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landing {
    pub classification: Classification,
    /// Rotation wrapped to [0, 2π)
    pub rotation: f32,
    /// Orientation to snap to when upright
    pub rest: Option<f32>,
}

/// Classify a landing from its final rotation and spin
pub fn classify(rotation: f32, angular_vel: f32, rules: &LandingRules) -> Landing {
    let wrapped = normalize_angle(rotation);
    let calm = rules
        .spin_threshold
        .is_none_or(|threshold| angular_vel.abs() < threshold);

    let band = rules.bands.iter().find(|band| band.contains(wrapped));
    match band {
        Some(band) if calm => Landing {
            classification: Classification::Upright,
            rotation: wrapped,
            rest: Some(normalize_angle(band.rest)),
        },
        _ => Landing {
            classification: Classification::Fallen,
            rotation: wrapped,
            rest: None,
        },
    }
}

/// Progress of the post-fall settle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SettlePhase {
    /// Landed, direction not chosen yet
    Resolving,
    /// Easing toward a lying orientation
    Settling { side: FallSide },
    /// Frozen at its final orientation
    Settled { rotation: f32 },
}

/// Settle routine for a fallen body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settle {
    pub phase: SettlePhase,
    mode: SettleMode,
}

impl Settle {
    pub fn new(mode: SettleMode) -> Self {
        Self {
            phase: SettlePhase::Resolving,
            mode,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SettlePhase::Settled { .. })
    }

    /// Advance one tick, rewriting `rotation` in place
    ///
    /// Returns the final orientation on the tick the body freezes.
    pub fn step(
        &mut self,
        rotation: &mut f32,
        dt_units: f32,
        rng: &mut impl RandomSource,
    ) -> Option<f32> {
        match (self.phase, self.mode) {
            (SettlePhase::Settled { .. }, _) => None,

            (SettlePhase::Resolving, SettleMode::Snap) => {
                let side = if rng.coin() {
                    FallSide::Right
                } else {
                    FallSide::Left
                };
                Some(self.freeze(rotation, side.orientation()))
            }

            (SettlePhase::Resolving, SettleMode::Ease { final_band, .. }) => {
                let wrapped = normalize_angle(*rotation);
                let side = FallSide::nearest(wrapped);
                *rotation = wrapped;
                if angular_distance(wrapped, side.orientation()) <= final_band {
                    // Already lying down
                    return Some(self.freeze(rotation, wrapped));
                }
                self.phase = SettlePhase::Settling { side };
                None
            }

            (
                SettlePhase::Settling { side },
                SettleMode::Ease {
                    step,
                    final_band,
                    jitter,
                },
            ) => {
                let target = side.orientation();
                let delta = angular_delta(*rotation, target);
                let max_step = step * dt_units;
                *rotation = normalize_angle(*rotation + delta.clamp(-max_step, max_step));

                if angular_distance(*rotation, target) <= final_band {
                    let rest = target + rng.range(-jitter, jitter);
                    return Some(self.freeze(rotation, normalize_angle(rest)));
                }
                None
            }

            (SettlePhase::Settling { side }, SettleMode::Snap) => {
                Some(self.freeze(rotation, side.orientation()))
            }
        }
    }

    fn freeze(&mut self, rotation: &mut f32, value: f32) -> f32 {
        *rotation = value;
        self.phase = SettlePhase::Settled { rotation: value };
        value
    }
}
