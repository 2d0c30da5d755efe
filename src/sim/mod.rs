//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as the elapsed ms passed to `tick`
//! - Seeded or scripted randomness only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod body;
pub mod category;
pub mod drop;
pub mod flip;
pub mod hit;
pub mod landing;
pub mod paddle;
pub mod random;
pub mod spawn;
pub mod state;
pub mod timing;

pub use body::{Advance, Body, BodyPhase, DampingMode, PhysicsConstants, advance};
pub use category::{Category, HazardPolicy, HitShape, ScoreEffect, ScoreRules, Size};
pub use drop::{DropGame, DropSnapshot};
pub use flip::{FlipGame, FlipSnapshot};
pub use hit::{Aabb, HitMode, HitRules, HitTolerance, hit_test, is_hit, take_hits};
pub use landing::{
    Classification, FallSide, Landing, LandingRules, Settle, SettleMode, SettlePhase,
    UprightBand, classify,
};
pub use paddle::{PaddleGame, PaddleSnapshot};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use spawn::{CategorySpec, Entity, SpawnOrigin, SpawnPolicy, Spawner, should_spawn};
pub use state::{ActiveNotice, GameEvent, GamePhase, Notice, NoticeBoard, Outcome, Score};
pub use timing::{TimingGame, TimingSnapshot};
