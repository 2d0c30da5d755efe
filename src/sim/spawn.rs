//! Timed spawning of falling entities
//!
//! The interval shrinks linearly with difficulty down to a floor. A spawn is
//! skipped, never queued, when the playfield already holds `max_concurrent`
//! entities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::{Category, Size};
use super::random::RandomSource;
use crate::error::{ConfigError, require_positive};

/// A falling object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique per spawn, never reused
    pub id: u32,
    pub category: Category,
    /// Rendering variant within the category (which sprite)
    pub variant: u8,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Size,
    /// Fall speed in px per nominal tick
    pub vertical_speed: f32,
}

impl Entity {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.size.width, self.size.height) * 0.5
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.height
    }

    /// Fall for `dt_units` nominal ticks
    pub fn fall(&mut self, dt_units: f32) {
        self.pos.y += self.vertical_speed * dt_units;
    }
}

/// One entry of the weighted category table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub category: Category,
    pub weight: f32,
    pub size: Size,
    /// Number of sprite variants to pick from
    #[serde(default = "one")]
    pub variants: u8,
}

fn one() -> u8 {
    1
}

impl CategorySpec {
    pub fn new(category: Category, weight: f32) -> Self {
        Self {
            category,
            weight,
            size: category.default_size(),
            variants: 1,
        }
    }

    pub fn with_variants(mut self, variants: u8) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }
}

/// Where new entities appear vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnOrigin {
    /// Top edge at y = 0
    #[default]
    TopEdge,
    /// Top edge at y = -height / 2, entering from above
    HalfAbove,
}

/// Spawn configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPolicy {
    /// Categories in draw order; cumulative weights follow this order
    pub categories: Vec<CategorySpec>,
    pub max_concurrent: usize,
    pub base_interval_ms: f64,
    pub floor_interval_ms: f64,
    /// Interval reduction per difficulty point
    pub decay_ms: f64,
    /// Horizontal margin kept free on both sides
    pub padding: f32,
    pub origin: SpawnOrigin,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            // Bomb 20%, wrong bottle 20%, correct bottle the rest
            categories: vec![
                CategorySpec::new(Category::Hazard, 0.2),
                CategorySpec::new(Category::Penalty, 0.2).with_variants(4),
                CategorySpec::new(Category::Reward, 0.6),
            ],
            max_concurrent: 10,
            base_interval_ms: 1000.0,
            floor_interval_ms: 200.0,
            decay_ms: 10.0,
            padding: 50.0,
            origin: SpawnOrigin::TopEdge,
        }
    }
}

impl SpawnPolicy {
    /// Check the policy against a playfield of the given width
    pub fn validate(&self, playfield_width: f32) -> Result<(), ConfigError> {
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        let total: f32 = self.categories.iter().map(|c| c.weight).sum();
        let any_negative = self.categories.iter().any(|c| !(c.weight >= 0.0));
        if any_negative || !(total > 0.0) || !total.is_finite() {
            return Err(ConfigError::InvalidWeights { total });
        }
        for spec in &self.categories {
            require_positive("category width", spec.size.width as f64)?;
            require_positive("category height", spec.size.height as f64)?;
            if spec.variants == 0 {
                return Err(ConfigError::OutOfRange {
                    field: "variants",
                    reason: format!("{} needs at least one variant", spec.category.as_str()),
                });
            }
            let span = playfield_width - 2.0 * self.padding - spec.size.width;
            if span < 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "padding",
                    reason: format!(
                        "{} px wide {} does not fit a {} px playfield with {} px padding",
                        spec.size.width,
                        spec.category.as_str(),
                        playfield_width,
                        self.padding
                    ),
                });
            }
        }
        if self.max_concurrent == 0 {
            return Err(ConfigError::NonPositive {
                field: "max_concurrent",
                value: 0.0,
            });
        }
        require_positive("base_interval_ms", self.base_interval_ms)?;
        require_positive("floor_interval_ms", self.floor_interval_ms)?;
        if !(self.decay_ms >= 0.0) {
            return Err(ConfigError::OutOfRange {
                field: "decay_ms",
                reason: format!("must not be negative (got {})", self.decay_ms),
            });
        }
        if self.padding < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "padding",
                reason: format!("must not be negative (got {})", self.padding),
            });
        }
        Ok(())
    }

    /// Spawn interval at the given difficulty
    pub fn current_interval(&self, difficulty: f64) -> f64 {
        let decayed = self.base_interval_ms - difficulty.max(0.0) * self.decay_ms;
        decayed.max(self.floor_interval_ms)
    }

    /// Pick a category by partitioning `draw` in [0, 1) over cumulative weights
    pub fn pick(&self, draw: f32) -> Option<&CategorySpec> {
        let total: f32 = self.categories.iter().map(|c| c.weight).sum();
        let target = draw.clamp(0.0, 1.0) * total;
        let mut cumulative = 0.0;
        for spec in &self.categories {
            cumulative += spec.weight;
            if target < cumulative {
                return Some(spec);
            }
        }
        // Rounding can leave a draw of ~1.0 past the last boundary
        self.categories.iter().rev().find(|c| c.weight > 0.0)
    }
}

/// Whether a spawn is due
pub fn should_spawn(
    now_ms: f64,
    last_spawn_ms: Option<f64>,
    live_count: usize,
    difficulty: f64,
    policy: &SpawnPolicy,
) -> bool {
    if live_count >= policy.max_concurrent {
        return false;
    }
    match last_spawn_ms {
        None => true,
        Some(last) => now_ms - last > policy.current_interval(difficulty),
    }
}

/// Spawn bookkeeping for one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Spawner {
    last_spawn_ms: Option<f64>,
    next_id: u32,
    /// Entities emitted since the last reset
    spawned: u32,
}

impl Spawner {
    pub fn new() -> Self {
        Self {
            last_spawn_ms: None,
            next_id: 1,
            spawned: 0,
        }
    }

    pub fn last_spawn_ms(&self) -> Option<f64> {
        self.last_spawn_ms
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Forget timing for a new run; ids keep counting
    pub fn reset(&mut self) {
        self.last_spawn_ms = None;
        self.spawned = 0;
    }

    /// Emit a new entity if the interval has elapsed and there is room
    pub fn maybe_spawn(
        &mut self,
        now_ms: f64,
        live_count: usize,
        difficulty: f64,
        policy: &SpawnPolicy,
        playfield_width: f32,
        rng: &mut impl RandomSource,
    ) -> Option<Entity> {
        if !should_spawn(now_ms, self.last_spawn_ms, live_count, difficulty, policy) {
            return None;
        }
        let spec = policy.pick(rng.unit())?;

        let span = (playfield_width - 2.0 * policy.padding - spec.size.width).max(0.0);
        let x = policy.padding + rng.unit() * span;
        let y = match policy.origin {
            SpawnOrigin::TopEdge => 0.0,
            SpawnOrigin::HalfAbove => -spec.size.height / 2.0,
        };
        let variant = if spec.variants > 1 {
            ((rng.unit() * spec.variants as f32) as u8).min(spec.variants - 1)
        } else {
            0
        };

        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.last_spawn_ms = Some(now_ms);
        self.spawned += 1;

        log::debug!(
            "spawn #{} {} at x={:.1} (interval {:.0} ms)",
            id,
            spec.category.as_str(),
            x,
            policy.current_interval(difficulty)
        );

        Some(Entity {
            id,
            category: spec.category,
            variant,
            pos: Vec2::new(x, y),
            size: spec.size,
            vertical_speed: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::{ScriptedRandom, SeededRandom};
    use proptest::prelude::*;

    #[test]
    fn test_interval_decay_and_floor() {
        let policy = SpawnPolicy::default();
        assert_eq!(policy.current_interval(0.0), 1000.0);
        assert_eq!(policy.current_interval(30.0), 700.0);
        assert_eq!(policy.current_interval(500.0), 200.0);
        assert_eq!(policy.current_interval(-10.0), 1000.0);
    }

    #[test]
    fn test_first_spawn_is_immediate_then_waits() {
        let policy = SpawnPolicy::default();
        let mut spawner = Spawner::new();
        let mut rng = SeededRandom::new(1);

        assert!(spawner.maybe_spawn(0.0, 0, 0.0, &policy, 500.0, &mut rng).is_some());
        assert!(spawner.maybe_spawn(500.0, 1, 0.0, &policy, 500.0, &mut rng).is_none());
        // Strictly greater than the interval
        assert!(spawner.maybe_spawn(1000.0, 1, 0.0, &policy, 500.0, &mut rng).is_none());
        assert!(spawner.maybe_spawn(1000.5, 1, 0.0, &policy, 500.0, &mut rng).is_some());
    }

    #[test]
    fn test_full_playfield_skips_without_backlog() {
        let policy = SpawnPolicy::default();
        let mut spawner = Spawner::new();
        let mut rng = SeededRandom::new(2);
        assert!(spawner.maybe_spawn(0.0, 10, 0.0, &policy, 500.0, &mut rng).is_none());
        assert_eq!(spawner.last_spawn_ms(), None);
        // Room again: one spawn, not a burst
        assert!(spawner.maybe_spawn(5000.0, 9, 0.0, &policy, 500.0, &mut rng).is_some());
        assert!(spawner.maybe_spawn(5000.0, 9, 0.0, &policy, 500.0, &mut rng).is_none());
    }

    #[test]
    fn test_category_partition_order() {
        let policy = SpawnPolicy::default();
        assert_eq!(policy.pick(0.0).map(|c| c.category), Some(Category::Hazard));
        assert_eq!(policy.pick(0.19).map(|c| c.category), Some(Category::Hazard));
        assert_eq!(policy.pick(0.2).map(|c| c.category), Some(Category::Penalty));
        assert_eq!(policy.pick(0.39).map(|c| c.category), Some(Category::Penalty));
        assert_eq!(policy.pick(0.41).map(|c| c.category), Some(Category::Reward));
        assert_eq!(policy.pick(1.0).map(|c| c.category), Some(Category::Reward));
    }

    #[test]
    fn test_unnormalized_weights() {
        let policy = SpawnPolicy {
            categories: vec![
                CategorySpec::new(Category::Hazard, 1.0),
                CategorySpec::new(Category::Reward, 3.0),
            ],
            ..Default::default()
        };
        assert!(policy.validate(500.0).is_ok());
        assert_eq!(policy.pick(0.24).map(|c| c.category), Some(Category::Hazard));
        assert_eq!(policy.pick(0.26).map(|c| c.category), Some(Category::Reward));
    }

    #[test]
    fn test_spawn_placement() {
        let policy = SpawnPolicy::default();
        let mut spawner = Spawner::new();
        // category draw, x draw
        let mut rng = ScriptedRandom::new(vec![0.9, 0.0]);
        let left = spawner
            .maybe_spawn(0.0, 0, 0.0, &policy, 500.0, &mut rng)
            .expect("spawn");
        assert_eq!(left.category, Category::Reward);
        assert_eq!(left.pos, Vec2::new(50.0, 0.0));

        let mut rng = ScriptedRandom::new(vec![0.9, 1.0]);
        let right = spawner
            .maybe_spawn(2000.0, 0, 0.0, &policy, 500.0, &mut rng)
            .expect("spawn");
        assert!(right.pos.x <= 500.0 - 50.0 - right.size.width + 1e-3);
        assert!(right.id > left.id);
    }

    #[test]
    fn test_half_above_origin_and_variants() {
        let policy = SpawnPolicy {
            categories: vec![
                CategorySpec::new(Category::Reward, 1.0)
                    .with_size(Size::new(100.0, 100.0))
                    .with_variants(6),
            ],
            padding: 0.0,
            origin: SpawnOrigin::HalfAbove,
            ..Default::default()
        };
        let mut spawner = Spawner::new();
        let mut rng = ScriptedRandom::new(vec![0.5, 0.5, 0.99]);
        let entity = spawner
            .maybe_spawn(0.0, 0, 0.0, &policy, 500.0, &mut rng)
            .expect("spawn");
        assert_eq!(entity.pos.y, -50.0);
        assert_eq!(entity.variant, 5);
    }

    #[test]
    fn test_validation() {
        let mut policy = SpawnPolicy::default();
        assert!(policy.validate(500.0).is_ok());
        assert!(matches!(
            policy.validate(100.0),
            Err(ConfigError::OutOfRange { field: "padding", .. })
        ));

        policy.categories.iter_mut().for_each(|c| c.weight = 0.0);
        assert!(matches!(policy.validate(500.0), Err(ConfigError::InvalidWeights { .. })));

        let policy = SpawnPolicy {
            categories: vec![],
            ..Default::default()
        };
        assert!(matches!(policy.validate(500.0), Err(ConfigError::NoCategories)));

        let policy = SpawnPolicy {
            base_interval_ms: 0.0,
            ..Default::default()
        };
        assert!(matches!(policy.validate(500.0), Err(ConfigError::NonPositive { .. })));

        let mut policy = SpawnPolicy::default();
        policy.categories[0].weight = -0.5;
        policy.categories[2].weight = 2.0;
        assert!(matches!(policy.validate(500.0), Err(ConfigError::InvalidWeights { .. })));
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_max_concurrent(
            steps in proptest::collection::vec((0.0f64..400.0, any::<bool>()), 1..200),
            seed in any::<u64>(),
        ) {
            let policy = SpawnPolicy::default();
            let mut spawner = Spawner::new();
            let mut rng = SeededRandom::new(seed);
            let mut live = 0usize;
            let mut now = 0.0;
            for (gap, despawn) in steps {
                now += gap;
                if despawn && live > 0 {
                    live -= 1;
                }
                if spawner.maybe_spawn(now, live, 0.0, &policy, 500.0, &mut rng).is_some() {
                    live += 1;
                }
                prop_assert!(live <= policy.max_concurrent);
            }
        }

        #[test]
        fn prop_interval_non_increasing(a in 0.0f64..1000.0, b in 0.0f64..1000.0) {
            let policy = SpawnPolicy::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(policy.current_interval(hi) <= policy.current_interval(lo));
            prop_assert!(policy.current_interval(hi) >= policy.floor_interval_ms);
        }
    }
}
