//! Falling object categories and their capabilities
//!
//! Adding a category means adding a variant here; every capability below is
//! an exhaustive match, so the compiler lists what else needs a decision.

use serde::{Deserialize, Serialize};

/// Kind of falling object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Collectible worth points (the correct bottle)
    Reward,
    /// Bomb: clicking it costs a large penalty or ends the run
    Hazard,
    /// Decoy: clicking it costs a small penalty (a wrong bottle)
    Penalty,
}

/// Geometry used when testing a pointer against an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitShape {
    /// Distance from the center against half the larger side
    Circle,
    /// Inflated box extended upward to lead fast falling targets
    ForgivingRect,
}

/// Width and height of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Points awarded per category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    pub reward_points: i64,
    pub penalty_points: i64,
    pub hazard: HazardPolicy,
    /// Lowest value the score can fall to
    pub floor: i64,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            reward_points: 1,
            penalty_points: 1,
            hazard: HazardPolicy::Penalty(5),
            floor: 0,
        }
    }
}

/// What touching a hazard does to a continuous run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPolicy {
    /// Lose this many points and keep playing
    Penalty(i64),
    /// Game over
    EndRun,
}

/// Effect of hitting an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreEffect {
    Gain(i64),
    Lose(i64),
    EndRun,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Hazard, Category::Penalty, Category::Reward];

    pub fn hit_shape(self) -> HitShape {
        match self {
            Category::Hazard => HitShape::Circle,
            Category::Reward | Category::Penalty => HitShape::ForgivingRect,
        }
    }

    /// Missing one of these at the bottom ends the run
    pub fn is_required(self) -> bool {
        match self {
            Category::Reward => true,
            Category::Hazard | Category::Penalty => false,
        }
    }

    /// Drawn size used by the drop-catch presets
    pub fn default_size(self) -> Size {
        // Icon width 30 px; bombs are 0.6 wide-to-tall, bottles 0.3
        match self {
            Category::Hazard => Size::new(30.0, 50.0),
            Category::Reward | Category::Penalty => Size::new(30.0, 100.0),
        }
    }

    pub fn score_effect(self, rules: &ScoreRules) -> ScoreEffect {
        match self {
            Category::Reward => ScoreEffect::Gain(rules.reward_points),
            Category::Penalty => ScoreEffect::Lose(rules.penalty_points),
            Category::Hazard => match rules.hazard {
                HazardPolicy::Penalty(points) => ScoreEffect::Lose(points),
                HazardPolicy::EndRun => ScoreEffect::EndRun,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Reward => "reward",
            Category::Hazard => "hazard",
            Category::Penalty => "penalty",
        }
    }
}
