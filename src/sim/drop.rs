//! Continuous drop-catch run
//!
//! Entities rain down while the player clicks them. Score doubles as the
//! difficulty: higher scores spawn faster, fall faster and enlarge hit areas.
//! The run ends when a required entity leaves the bottom unclicked, or on a
//! hazard hit if the scoring rules say so.

use glam::Vec2;
use serde::Serialize;

use super::category::{Category, HazardPolicy, ScoreEffect};
use super::hit::take_hits;
use super::random::{RandomSource, SeededRandom};
use super::spawn::{Entity, Spawner};
use super::state::{
    ActiveNotice, GameEvent, GamePhase, Notice, NoticeBoard, PhaseCell, Score, apply_score,
};
use crate::error::ConfigError;
use crate::tick_units;
use crate::tuning::{DropTuning, Tuning};

/// Read-only view handed to the renderer
#[derive(Debug, Clone, Serialize)]
pub struct DropSnapshot {
    pub phase: GamePhase,
    pub score: i64,
    pub entities: Vec<Entity>,
    pub notice: Option<ActiveNotice>,
    /// Run time in ms
    pub elapsed_ms: f64,
}

#[derive(Debug, Clone)]
pub struct DropGame<R: RandomSource = SeededRandom> {
    tuning: DropTuning,
    phase: PhaseCell,
    score: Score,
    /// Live entities in spawn order
    entities: Vec<Entity>,
    spawner: Spawner,
    /// Simulated run time; spawning is scheduled against this
    clock_ms: f64,
    notices: NoticeBoard,
    rng: R,
}

impl DropGame<SeededRandom> {
    pub fn new(tuning: DropTuning, seed: u64) -> Result<Self, ConfigError> {
        Self::with_random(tuning, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> DropGame<R> {
    pub fn with_random(tuning: DropTuning, rng: R) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let score = Score::new(tuning.scoring.floor);
        Ok(Self {
            tuning,
            phase: PhaseCell::new(),
            score,
            entities: Vec::new(),
            spawner: Spawner::new(),
            clock_ms: 0.0,
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

    pub fn elapsed_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn tuning(&self) -> &DropTuning {
        &self.tuning
    }

    pub fn snapshot(&self) -> DropSnapshot {
        DropSnapshot {
            phase: self.phase.get(),
            score: self.score.value(),
            entities: self.entities.clone(),
            notice: self.notices.current().cloned(),
            elapsed_ms: self.clock_ms,
        }
    }

    fn difficulty(&self) -> f64 {
        self.score.value() as f64
    }

    /// Begin a run from Idle
    pub fn start(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase.is(GamePhase::Idle) {
            self.phase.set(GamePhase::Active, &mut events);
        }
        events
    }

    /// Clear the field and zero the score
    pub fn reset(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.entities.clear();
        self.spawner.reset();
        self.score.reset();
        self.clock_ms = 0.0;
        self.notices.cancel();
        self.phase.set(GamePhase::Idle, &mut events);
        events
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
        let difficulty = self.difficulty();

        if let Some(entity) = self.spawner.maybe_spawn(
            self.clock_ms,
            self.entities.len(),
            difficulty,
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

        let speed = self.tuning.fall.at(difficulty as f32);
        for entity in &mut self.entities {
            entity.vertical_speed = speed;
            entity.fall(dt);
        }

        let limit = self.tuning.playfield.height - self.tuning.exit_margin;
        let mut missed_required = false;
        self.entities.retain(|entity| {
            if entity.pos.y < limit {
                return true;
            }
            missed_required |= entity.category.is_required();
            events.push(GameEvent::Exited {
                id: entity.id,
                category: entity.category,
            });
            false
        });

        if missed_required {
            log::info!("required entity missed, final score {}", self.score.value());
            events.push(self.notices.show(Notice::MissedRequired, None));
            self.phase.set(GamePhase::GameOver, &mut events);
        }
        events
    }

    /// Click at playfield coordinates
    ///
    /// Starts the run from Idle and restarts it after a game over; otherwise
    /// resolves hits against the live entities.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Vec<GameEvent> {
        match self.phase.get() {
            GamePhase::Idle => self.start(),
            GamePhase::GameOver | GamePhase::Resolved => {
                let mut events = self.reset();
                events.extend(self.start());
                events
            }
            GamePhase::Active => self.click(Vec2::new(x, y)),
        }
    }

    fn click(&mut self, pointer: Vec2) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let tolerance = self.tuning.hit.tolerance_at(self.difficulty() as f32);
        let hits = take_hits(
            pointer,
            &mut self.entities,
            &tolerance,
            self.tuning.hit_mode,
        );
        if hits.is_empty() {
            return events;
        }

        let rules = self.tuning.scoring;
        let ttl = Some(self.tuning.notice_ms);
        let mut hazard_hit = false;
        let mut gained = 0;
        for entity in &hits {
            log::debug!("hit #{} {}", entity.id, entity.category.as_str());
            events.push(GameEvent::Hit {
                id: entity.id,
                category: entity.category,
            });
            if entity.category == Category::Hazard {
                hazard_hit = true;
                continue;
            }
            match entity.category.score_effect(&rules) {
                ScoreEffect::Gain(points) => gained += points,
                ScoreEffect::Lose(points) => {
                    apply_score(&mut self.score, -points, &mut events);
                    events.push(self.notices.show(Notice::WrongPick { penalty: points }, ttl));
                }
                ScoreEffect::EndRun => hazard_hit = true,
            }
        }

        // A hazard in the same click voids any reward
        if hazard_hit {
            match rules.hazard {
                HazardPolicy::Penalty(points) => {
                    apply_score(&mut self.score, -points, &mut events);
                    events.push(self.notices.show(Notice::BombClicked { penalty: points }, ttl));
                }
                HazardPolicy::EndRun => {
                    log::info!("hazard ended the run, final score {}", self.score.value());
                    events.push(self.notices.show(Notice::BombEndedRun, None));
                    self.phase.set(GamePhase::GameOver, &mut events);
                }
            }
        } else if gained > 0 {
            apply_score(&mut self.score, gained, &mut events);
        }
        events
    }
}
