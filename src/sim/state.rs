//! Shared game state types
//!
//! Phases, the clamped score counter, outcome records, notices and the events
//! each tick or pointer call hands back to the presentation layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::Category;
use super::landing::Classification;

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    Idle,
    /// Attempt or run in progress
    Active,
    /// Attempt finished with an outcome
    Resolved,
    /// Run ended by a mistake
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "Idle",
            GamePhase::Active => "Active",
            GamePhase::Resolved => "Resolved",
            GamePhase::GameOver => "GameOver",
        }
    }
}

/// Integer score clamped at a floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    value: i64,
    floor: i64,
}

impl Score {
    pub fn new(floor: i64) -> Self {
        Self {
            value: floor.max(0),
            floor,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Apply a delta, returning the change actually applied
    pub fn apply(&mut self, delta: i64) -> i64 {
        let before = self.value;
        self.value = before.saturating_add(delta).max(self.floor);
        self.value - before
    }

    pub fn reset(&mut self) {
        self.value = self.floor.max(0);
    }
}

/// Result of one finished flip attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub classification: Classification,
    pub score_delta: i64,
}

/// Message surfaced to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notice {
    StoodUpright,
    Fell,
    BombClicked { penalty: i64 },
    /// A hazard ended the run outright
    BombEndedRun,
    WrongPick { penalty: i64 },
    MissedRequired,
    DuplicateCatch,
    AllCaught { total: u32 },
    PieceCaught,
    PieceMissed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::StoodUpright => write!(f, "The bottle stood upright! Great flip!"),
            Notice::Fell => write!(f, "The bottle fell! Try again."),
            Notice::BombClicked { penalty } => write!(f, "Bomb clicked! -{} points", penalty),
            Notice::BombEndedRun => write!(f, "Bomb clicked! Game over."),
            Notice::WrongPick { penalty } => write!(f, "Incorrect bottle! -{} point", penalty),
            Notice::MissedRequired => write!(f, "You let a bottle drop! Game over."),
            Notice::DuplicateCatch => write!(f, "You caught the same image twice!"),
            Notice::AllCaught { total } => write!(f, "You caught all {} images!", total),
            Notice::PieceCaught => write!(f, "Congratulations! You caught the bottle!"),
            Notice::PieceMissed => write!(f, "Sorry! You missed the bottle. Try again"),
        }
    }
}

/// The notice currently on screen, optionally clearing itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveNotice {
    pub notice: Notice,
    /// Milliseconds until it clears; `None` stays until replaced
    pub remaining_ms: Option<f64>,
}

/// Holder for the on-screen notice and its auto-clear timer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoticeBoard {
    current: Option<ActiveNotice>,
}

impl NoticeBoard {
    pub fn current(&self) -> Option<&ActiveNotice> {
        self.current.as_ref()
    }

    /// Show a notice, replacing (and cancelling the timer of) any previous one
    pub fn show(&mut self, notice: Notice, ttl_ms: Option<f64>) -> GameEvent {
        self.current = Some(ActiveNotice {
            notice: notice.clone(),
            remaining_ms: ttl_ms,
        });
        GameEvent::Notice {
            text: notice.to_string(),
            notice,
        }
    }

    /// Drop the notice and its timer without emitting anything
    pub fn cancel(&mut self) {
        self.current = None;
    }

    /// Run the auto-clear timer
    pub fn tick(&mut self, elapsed_ms: f64) -> Option<GameEvent> {
        let active = self.current.as_mut()?;
        let remaining = active.remaining_ms.as_mut()?;
        *remaining -= elapsed_ms;
        if *remaining <= 0.0 {
            self.current = None;
            return Some(GameEvent::NoticeCleared);
        }
        None
    }
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Launched { spin: f32 },
    Landed(Outcome),
    Settled { rotation: f32 },
    Spawned { id: u32, category: Category },
    Hit { id: u32, category: Category },
    Exited { id: u32, category: Category },
    Caught { id: u32, variant: u8 },
    ScoreChanged { delta: i64, score: i64 },
    Notice { notice: Notice, text: String },
    NoticeCleared,
}

/// Phase holder that records every transition as an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCell {
    phase: GamePhase,
}

impl PhaseCell {
    pub fn new() -> Self {
        Self {
            phase: GamePhase::Idle,
        }
    }

    pub fn get(&self) -> GamePhase {
        self.phase
    }

    pub fn is(&self, phase: GamePhase) -> bool {
        self.phase == phase
    }

    pub fn set(&mut self, to: GamePhase, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::info!("{} -> {}", from.as_str(), to.as_str());
        events.push(GameEvent::PhaseChanged { from, to });
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a score delta and record it when something actually changed
pub(crate) fn apply_score(score: &mut Score, delta: i64, events: &mut Vec<GameEvent>) -> i64 {
    let applied = score.apply(delta);
    if applied != 0 {
        events.push(GameEvent::ScoreChanged {
            delta: applied,
            score: score.value(),
        });
    }
    applied
}
