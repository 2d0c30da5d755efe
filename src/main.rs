//! Bottle Arcade entry point
//!
//! The browser build exposes the games through `platform::web`. Natively this
//! binary plays a short headless session of each game so the engine can be
//! watched through the log.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use bottle_arcade::consts::NOMINAL_TICK_MS;
    use bottle_arcade::platform::{FrameClock, drive};
    use bottle_arcade::sim::{
        Category, DropGame, FlipGame, GameEvent, GamePhase, PaddleGame, TimingGame,
    };
    use bottle_arcade::{ConfigError, DropTuning, FlipTuning, PaddleTuning, TimingTuning};

    /// Feed a game with 60 Hz frame timestamps for `seconds`
    fn frames(seconds: f64, mut tick: impl FnMut(f64) -> Vec<GameEvent>) -> Vec<GameEvent> {
        let mut clock = FrameClock::new();
        let mut events = Vec::new();
        let mut now = 0.0;
        while now <= seconds * 1000.0 {
            events.extend(drive(&mut clock, now, &mut tick));
            now += NOMINAL_TICK_MS;
        }
        events
    }

    fn flips(seed: u64) -> Result<(), ConfigError> {
        for (name, tuning) in [
            ("classic", FlipTuning::classic()),
            ("arcade", FlipTuning::arcade()),
        ] {
            let mut game = FlipGame::new(tuning, seed)?;
            for attempt in 1..=5 {
                if !game.can_launch() {
                    game.reset();
                }
                game.trigger();
                for event in frames(4.0, |dt| game.tick(dt)) {
                    if let GameEvent::Landed(outcome) = event {
                        log::info!("{name} flip {attempt}: {:?}", outcome.classification);
                    }
                }
            }
            log::info!("{name} flips scored {}", game.score());
        }
        Ok(())
    }

    /// Click the lowest correct bottle a few times a second
    fn drop_run(seed: u64) -> Result<(), ConfigError> {
        let mut game = DropGame::new(DropTuning::default(), seed)?;
        game.start();
        let mut ticks = 0u32;
        frames(60.0, |dt| {
            let mut events = game.tick(dt);
            ticks += 1;
            if ticks % 15 == 0 && game.phase() == GamePhase::Active {
                let target = game
                    .entities()
                    .iter()
                    .filter(|e| e.category == Category::Reward)
                    .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                    .map(|e| e.center());
                if let Some(target) = target {
                    events.extend(game.pointer_down(target.x, target.y));
                }
            }
            events
        });
        log::info!(
            "drop run ended in {} with score {} after {:.1} s",
            game.phase().as_str(),
            game.score(),
            game.elapsed_ms() / 1000.0
        );
        Ok(())
    }

    /// Keep the paddle under the lowest drop
    fn paddle_run(seed: u64) -> Result<(), ConfigError> {
        let mut game = PaddleGame::new(PaddleTuning::default(), seed)?;
        game.pointer_down(250.0, 0.0);
        frames(60.0, |dt| {
            let lowest = game
                .entities()
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.center().x);
            if let Some(x) = lowest {
                game.pointer_move(x);
            }
            game.tick(dt)
        });
        log::info!(
            "paddle run ended in {} with {} caught",
            game.phase().as_str(),
            game.score()
        );
        Ok(())
    }

    /// Stop the piece after a fixed delay, repeatedly
    fn timing_run() -> Result<(), ConfigError> {
        let mut game = TimingGame::new(TimingTuning::default())?;
        for delay in [10u32, 25, 50, 120] {
            game.trigger();
            for _ in 0..delay {
                game.tick(NOMINAL_TICK_MS);
            }
            game.trigger();
            log::info!("timing stop after {delay} ticks: {:?}", game.last_caught());
        }
        log::info!("timing game scored {}", game.score());
        Ok(())
    }

    pub fn run() -> Result<(), ConfigError> {
        let seed = std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(42);
        log::info!("Bottle Arcade (native) demo, seed {seed}");

        flips(seed)?;
        drop_run(seed)?;
        paddle_run(seed)?;
        timing_run()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = demo::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
