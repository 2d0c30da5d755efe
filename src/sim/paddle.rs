//! Paddle catch: collect every variant exactly once
//!
//! Drops fall from above the playfield and are caught by a paddle that slides
//! along the bottom following the pointer. Catching a variant already in the
//! collection ends the run; completing the collection wins it. Clicks only
//! move between screens.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::Serialize;

use super::hit::Aabb;
use super::random::{RandomSource, SeededRandom};
use super::spawn::{Entity, Spawner};
use super::state::{
    ActiveNotice, GameEvent, GamePhase, Notice, NoticeBoard, PhaseCell, Score, apply_score,
};
use crate::error::ConfigError;
use crate::tick_units;
use crate::tuning::{PaddleTuning, Tuning};

#[derive(Debug, Clone, Serialize)]
pub struct PaddleSnapshot {
    pub phase: GamePhase,
    pub score: i64,
    pub entities: Vec<Entity>,
    pub paddle: Aabb,
    /// Variants collected this run, ascending
    pub caught: Vec<u8>,
    pub notice: Option<ActiveNotice>,
}

#[derive(Debug, Clone)]
pub struct PaddleGame<R: RandomSource = SeededRandom> {
    tuning: PaddleTuning,
    phase: PhaseCell,
    score: Score,
    entities: Vec<Entity>,
    spawner: Spawner,
    clock_ms: f64,
    /// Paddle center x, already clamped
    paddle_x: f32,
    caught: BTreeSet<u8>,
    notices: NoticeBoard,
    rng: R,
}

impl PaddleGame<SeededRandom> {
    pub fn new(tuning: PaddleTuning, seed: u64) -> Result<Self, ConfigError> {
        Self::with_random(tuning, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> PaddleGame<R> {
    pub fn with_random(tuning: PaddleTuning, rng: R) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let paddle_x = tuning.playfield.width / 2.0;
        Ok(Self {
            tuning,
            phase: PhaseCell::new(),
            score: Score::new(0),
            entities: Vec::new(),
            spawner: Spawner::new(),
            clock_ms: 0.0,
            paddle_x,
            caught: BTreeSet::new(),
            notices: NoticeBoard::default(),
            rng,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase.get()
    }

    pub fn score(&self) -> i64 {
        self.score.value()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn notice(&self) -> Option<&ActiveNotice> {
        self.notices.current()
    }

    pub fn caught(&self) -> impl Iterator<Item = u8> + '_ {
        self.caught.iter().copied()
    }

    /// Paddle rectangle in playfield coordinates
    pub fn paddle(&self) -> Aabb {
        let size = self.tuning.paddle;
        let center = Vec2::new(
            self.paddle_x,
            self.tuning.playfield.height - self.tuning.paddle_inset,
        );
        Aabb::from_center(center, size.width, size.height)
    }

    pub fn snapshot(&self) -> PaddleSnapshot {
        PaddleSnapshot {
            phase: self.phase.get(),
            score: self.score.value(),
            entities: self.entities.clone(),
            paddle: self.paddle(),
            caught: self.caught.iter().copied().collect(),
            notice: self.notices.current().cloned(),
        }
    }

    /// Fall speed grows with every catch
    fn fall_speed(&self) -> f32 {
        self.tuning.base_speed + self.tuning.speed_per_catch * self.caught.len() as f32
    }

    /// Move the paddle under the pointer, kept fully on the playfield
    pub fn pointer_move(&mut self, x: f32) {
        let half = self.tuning.paddle.width / 2.0;
        let max = self.tuning.playfield.width - half;
        self.paddle_x = if x.is_finite() { x.clamp(half, max) } else { self.paddle_x };
    }

    /// Click: start from the title screen, or return to it after a run
    pub fn pointer_down(&mut self, x: f32, _y: f32) -> Vec<GameEvent> {
        self.pointer_move(x);
        match self.phase.get() {
            GamePhase::Idle => {
                let mut events = Vec::new();
                self.clear_run();
                self.phase.set(GamePhase::Active, &mut events);
                events
            }
            GamePhase::GameOver | GamePhase::Resolved => self.reset(),
            GamePhase::Active => Vec::new(),
        }
    }

    /// Back to the title screen with an empty field
    pub fn reset(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.clear_run();
        self.phase.set(GamePhase::Idle, &mut events);
        events
    }

    fn clear_run(&mut self) {
        self.entities.clear();
        self.spawner.reset();
        self.score.reset();
        self.caught.clear();
        self.clock_ms = 0.0;
        self.notices.cancel();
    }

    pub fn tick(&mut self, elapsed_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(cleared) = self.notices.tick(elapsed_ms) {
            events.push(cleared);
        }
        if !self.phase.is(GamePhase::Active) {
            return events;
        }

        self.clock_ms += elapsed_ms.max(0.0);
        let dt = tick_units(elapsed_ms);

        // Every spawn so far tightens the interval
        let spawned = self.spawner.spawned() as f64;
        if let Some(entity) = self.spawner.maybe_spawn(
            self.clock_ms,
            self.entities.len(),
            spawned,
            &self.tuning.spawn,
            self.tuning.playfield.width,
            &mut self.rng,
        ) {
            events.push(GameEvent::Spawned {
                id: entity.id,
                category: entity.category,
            });
            self.entities.push(entity);
        }

        let speed = self.fall_speed();
        let paddle = self.paddle();
        let bottom = self.tuning.playfield.height;
        let live = std::mem::take(&mut self.entities);
        for mut entity in live {
            if !self.phase.is(GamePhase::Active) {
                self.entities.push(entity);
                continue;
            }
            entity.vertical_speed = speed;
            entity.fall(dt);

            if entity.center().y > bottom {
                events.push(GameEvent::Exited {
                    id: entity.id,
                    category: entity.category,
                });
            } else if in_catch_zone(&entity, &paddle) {
                self.catch(&entity, &mut events);
            } else {
                self.entities.push(entity);
            }
        }
        events
    }

    fn catch(&mut self, entity: &Entity, events: &mut Vec<GameEvent>) {
        events.push(GameEvent::Caught {
            id: entity.id,
            variant: entity.variant,
        });
        if !self.caught.insert(entity.variant) {
            log::info!(
                "variant {} caught twice, final score {}",
                entity.variant,
                self.score.value()
            );
            events.push(self.notices.show(Notice::DuplicateCatch, None));
            self.phase.set(GamePhase::GameOver, events);
            return;
        }

        apply_score(&mut self.score, 1, events);
        let total = self.tuning.variant_count();
        if self.caught.len() as u32 >= total {
            log::info!("all {} variants caught", total);
            events.push(self.notices.show(Notice::AllCaught { total }, None));
            self.phase.set(GamePhase::Resolved, events);
        }
    }
}

/// The drop's lower edge has reached the paddle top and the two overlap
/// horizontally
fn in_catch_zone(entity: &Entity, paddle: &Aabb) -> bool {
    let center = entity.center();
    let reach = (entity.size.width + (paddle.max.x - paddle.min.x)) / 2.0;
    let paddle_x = (paddle.min.x + paddle.max.x) / 2.0;
    entity.bottom() > paddle.min.y && (center.x - paddle_x).abs() < reach
}
