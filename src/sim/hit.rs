//! Pointer hit-testing against falling entities
//!
//! Circles are tested by distance from the center. Rectangles are inflated by
//! the hit multiplier and shifted upward by a lead fraction of their height,
//! so a click slightly above a fast target still lands. Both grow with
//! difficulty and are capped so the forgiveness never exceeds the entity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::HitShape;
use super::spawn::Entity;
use crate::error::ConfigError;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, width: f32, height: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::new(width, height),
        }
    }

    pub fn from_center(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width, height) * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Inclusive point test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// `inner` lies within `self`, allowing `tolerance` px of overhang per edge
    pub fn encloses(&self, inner: &Aabb, tolerance: f32) -> bool {
        inner.min.x + tolerance >= self.min.x
            && inner.max.x - tolerance <= self.max.x
            && inner.min.y + tolerance >= self.min.y
            && inner.max.y - tolerance <= self.max.y
    }
}

/// Difficulty-scaled hit forgiveness
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitRules {
    /// Hit area scale at zero difficulty
    pub base_multiplier: f32,
    /// Added to the multiplier per difficulty point
    pub multiplier_growth: f32,
    /// Hard cap on the multiplier (at most 2.0)
    pub max_multiplier: f32,
    /// Upward extension as a fraction of height at zero difficulty
    pub base_lead: f32,
    pub lead_growth: f32,
    /// Hard cap on the lead fraction
    pub max_lead: f32,
}

impl Default for HitRules {
    fn default() -> Self {
        Self {
            base_multiplier: 1.2,
            multiplier_growth: 0.004,
            max_multiplier: 1.5,
            base_lead: 0.5,
            lead_growth: 0.002,
            max_lead: 0.7,
        }
    }
}

impl HitRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let out_of_range = |field, reason: String| ConfigError::OutOfRange { field, reason };
        if !(self.base_multiplier >= 1.0) {
            return Err(out_of_range(
                "base_multiplier",
                format!("must be at least 1.0 (got {})", self.base_multiplier),
            ));
        }
        if !(self.max_multiplier >= self.base_multiplier && self.max_multiplier <= 2.0) {
            return Err(out_of_range(
                "max_multiplier",
                format!(
                    "must lie in [base_multiplier, 2.0] (got {})",
                    self.max_multiplier
                ),
            ));
        }
        if !(self.multiplier_growth >= 0.0 && self.lead_growth >= 0.0) {
            return Err(out_of_range("growth", "must not be negative".to_string()));
        }
        if !(self.base_lead >= 0.0 && self.max_lead >= self.base_lead && self.max_lead <= 1.0) {
            return Err(out_of_range(
                "max_lead",
                format!("must lie in [base_lead, 1.0] (got {})", self.max_lead),
            ));
        }
        // The entity center must stay inside the shifted box
        if self.max_lead > self.base_multiplier - 0.5 {
            return Err(out_of_range(
                "max_lead",
                format!(
                    "{} would push the hit box above the entity center",
                    self.max_lead
                ),
            ));
        }
        Ok(())
    }

    /// Forgiveness at the given difficulty
    pub fn tolerance_at(&self, difficulty: f32) -> HitTolerance {
        let d = difficulty.max(0.0);
        HitTolerance {
            multiplier: (self.base_multiplier + d * self.multiplier_growth)
                .min(self.max_multiplier),
            lead: (self.base_lead + d * self.lead_growth).min(self.max_lead),
        }
    }
}

/// Resolved forgiveness for one pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    pub multiplier: f32,
    /// Upward extension as a fraction of entity height
    pub lead: f32,
}

/// How many overlapping entities a single click consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitMode {
    /// Only the first hit in live order
    First,
    /// Every entity under the pointer
    #[default]
    All,
}

/// Region a pointer must fall in to hit a rectangular entity
pub fn forgiving_rect(entity: &Entity, tolerance: &HitTolerance) -> Aabb {
    let w = entity.size.width;
    let h = entity.size.height;
    let grow_x = (w * tolerance.multiplier - w) / 2.0;
    let lead = h * tolerance.lead;
    Aabb {
        min: Vec2::new(entity.pos.x - grow_x, entity.pos.y - lead),
        max: Vec2::new(
            entity.pos.x + w + grow_x,
            entity.pos.y + h * tolerance.multiplier - lead,
        ),
    }
}

/// Whether `pointer` hits `entity`
pub fn is_hit(pointer: Vec2, entity: &Entity, tolerance: &HitTolerance) -> bool {
    match entity.category.hit_shape() {
        HitShape::Circle => {
            let radius = entity.size.width.max(entity.size.height) / 2.0 * tolerance.multiplier;
            pointer.distance(entity.center()) <= radius
        }
        HitShape::ForgivingRect => forgiving_rect(entity, tolerance).contains(pointer),
    }
}

/// First entity under the pointer, in live order
pub fn hit_test<'a>(
    pointer: Vec2,
    entities: &'a [Entity],
    tolerance: &HitTolerance,
) -> Option<&'a Entity> {
    entities.iter().find(|e| is_hit(pointer, e, tolerance))
}

/// Remove and return the entities a click consumes, preserving live order
pub fn take_hits(
    pointer: Vec2,
    entities: &mut Vec<Entity>,
    tolerance: &HitTolerance,
    mode: HitMode,
) -> Vec<Entity> {
    let mut hits = Vec::new();
    entities.retain(|entity| {
        let consumed = match mode {
            HitMode::First if !hits.is_empty() => false,
            _ => is_hit(pointer, entity, tolerance),
        };
        if consumed {
            hits.push(entity.clone());
        }
        !consumed
    });
    hits
}
