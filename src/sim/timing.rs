//! Timing catch: stop a sliding piece inside the frame
//!
//! The piece sweeps back and forth along a horizontal track. A click freezes it
//! and scores it against the target frame; the next click sets it moving again.

use glam::Vec2;
use serde::Serialize;

use super::hit::Aabb;
use super::state::{
    ActiveNotice, GameEvent, GamePhase, Notice, NoticeBoard, PhaseCell, Score, apply_score,
};
use crate::error::ConfigError;
use crate::tick_units;
use crate::tuning::{TimingTuning, Tuning};

#[derive(Debug, Clone, Serialize)]
pub struct TimingSnapshot {
    pub phase: GamePhase,
    pub score: i64,
    pub piece: Aabb,
    pub frame: Aabb,
    /// Result of the latest stop, `None` before the first
    pub last_caught: Option<bool>,
    pub notice: Option<ActiveNotice>,
}

#[derive(Debug, Clone)]
pub struct TimingGame {
    tuning: TimingTuning,
    phase: PhaseCell,
    score: Score,
    /// Left edge of the piece
    piece_x: f32,
    /// +1 sliding right, -1 sliding left
    direction: f32,
    last_caught: Option<bool>,
    notices: NoticeBoard,
}

impl TimingGame {
    pub fn new(tuning: TimingTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let piece_x = tuning.track_min_x;
        Ok(Self {
            tuning,
            phase: PhaseCell::new(),
            score: Score::new(0),
            piece_x,
            direction: 1.0,
            last_caught: None,
            notices: NoticeBoard::default(),
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase.get()
    }

    pub fn score(&self) -> i64 {
        self.score.value()
    }

    pub fn notice(&self) -> Option<&ActiveNotice> {
        self.notices.current()
    }

    pub fn last_caught(&self) -> Option<bool> {
        self.last_caught
    }

    pub fn piece(&self) -> Aabb {
        Aabb::from_pos_size(
            Vec2::new(self.piece_x, self.tuning.piece_y),
            self.tuning.piece.width,
            self.tuning.piece.height,
        )
    }

    pub fn snapshot(&self) -> TimingSnapshot {
        TimingSnapshot {
            phase: self.phase.get(),
            score: self.score.value(),
            piece: self.piece(),
            frame: self.tuning.frame,
            last_caught: self.last_caught,
            notice: self.notices.current().cloned(),
        }
    }

    pub fn tick(&mut self, elapsed_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Some(cleared) = self.notices.tick(elapsed_ms) {
            events.push(cleared);
        }
        if self.phase.is(GamePhase::Active) {
            self.slide(tick_units(elapsed_ms));
        }
        events
    }

    /// Move along the track, reflecting off either end
    fn slide(&mut self, dt_units: f32) {
        let min = self.tuning.track_min_x;
        let max = self.tuning.track_max_x;
        let mut x = self.piece_x + self.direction * self.tuning.speed * dt_units;
        if x > max {
            x = max - (x - max);
            self.direction = -1.0;
        } else if x < min {
            x = min + (min - x);
            self.direction = 1.0;
        }
        self.piece_x = x.clamp(min, max);
    }

    /// Any click toggles between sliding and stopped
    pub fn pointer_down(&mut self, _x: f32, _y: f32) -> Vec<GameEvent> {
        self.trigger()
    }

    pub fn trigger(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.phase.get() {
            GamePhase::Idle | GamePhase::Resolved | GamePhase::GameOver => {
                self.notices.cancel();
                self.phase.set(GamePhase::Active, &mut events);
            }
            GamePhase::Active => self.stop(&mut events),
        }
        events
    }

    fn stop(&mut self, events: &mut Vec<GameEvent>) {
        let caught = self.tuning.frame.encloses(&self.piece(), self.tuning.tolerance);
        log::info!(
            "piece stopped at x={:.1}: {}",
            self.piece_x,
            if caught { "caught" } else { "missed" }
        );
        self.last_caught = Some(caught);
        let notice = if caught {
            apply_score(&mut self.score, self.tuning.catch_points, events);
            Notice::PieceCaught
        } else {
            Notice::PieceMissed
        };
        events.push(self.notices.show(notice, None));
        self.phase.set(GamePhase::Resolved, events);
    }

    /// Park the piece at the start of the track; score and notice stay
    pub fn reset(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        self.piece_x = self.tuning.track_min_x;
        self.direction = 1.0;
        self.phase.set(GamePhase::Idle, &mut events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NOMINAL_TICK_MS;

    fn game() -> TimingGame {
        TimingGame::new(TimingTuning::default()).expect("valid tuning")
    }

    #[test]
    fn test_piece_waits_until_first_click() {
        let mut game = game();
        game.tick(NOMINAL_TICK_MS);
        assert_eq!(game.piece().min.x, 0.0);

        game.pointer_down(0.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Active);
        game.tick(NOMINAL_TICK_MS);
        assert!((game.piece().min.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_piece_bounces_between_track_ends() {
        let mut game = game();
        game.trigger();
        let mut max_seen: f32 = 0.0;
        for _ in 0..160 {
            game.tick(NOMINAL_TICK_MS);
            let x = game.piece().min.x;
            assert!((0.0..=440.0).contains(&x));
            max_seen = max_seen.max(x);
        }
        assert!((max_seen - 440.0).abs() < 1e-3);
        // 110 ticks out, 50 back
        assert!((game.piece().min.x - 240.0).abs() < 1e-2);
        assert_eq!(game.direction, -1.0);
    }

    #[test]
    fn test_stop_inside_frame_scores() {
        let mut game = game();
        game.trigger();
        game.piece_x = 200.0;
        let events = game.pointer_down(0.0, 0.0);

        assert_eq!(game.phase(), GamePhase::Resolved);
        assert_eq!(game.score(), 1);
        assert_eq!(game.last_caught(), Some(true));
        assert!(events.contains(&GameEvent::ScoreChanged { delta: 1, score: 1 }));

        // Frozen while stopped
        game.tick(NOMINAL_TICK_MS);
        assert_eq!(game.piece().min.x, 200.0);

        // Resuming clears the message
        game.pointer_down(0.0, 0.0);
        assert_eq!(game.phase(), GamePhase::Active);
        assert!(game.notice().is_none());
    }

    #[test]
    fn test_stop_outside_frame_misses() {
        let mut game = game();
        game.trigger();
        game.piece_x = 100.0;
        game.trigger();
        assert_eq!(game.score(), 0);
        assert_eq!(game.last_caught(), Some(false));
        assert_eq!(
            game.notice().map(|n| n.notice.clone()),
            Some(Notice::PieceMissed)
        );
    }

    #[test]
    fn test_tolerance_edges() {
        for (x, expected) in [(188.0, true), (187.5, false), (212.0, true), (212.5, false)] {
            let mut game = game();
            game.trigger();
            game.piece_x = x;
            game.trigger();
            assert_eq!(game.last_caught(), Some(expected), "x = {x}");
        }
    }

    #[test]
    fn test_reset_parks_piece_keeps_score() {
        let mut game = game();
        game.trigger();
        game.piece_x = 200.0;
        game.trigger();
        game.reset();
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.piece().min.x, 0.0);
        assert_eq!(game.score(), 1);
    }
}
