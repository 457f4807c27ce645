//! Relativistic Asteroids entry point
//!
//! Runs a headless session flown by the autopilot and logs what happened.
//!
//! Usage: `relativistic-asteroids [settings.json] [ticks]`

use relativistic_asteroids::consts::SIM_DT;
use relativistic_asteroids::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use relativistic_asteroids::{Error, HighScores, Result, Settings};

const DEFAULT_TICKS: u64 = 60 * 60;
const HIGH_SCORES_FILE: &str = "highscores.json";

fn main() -> Result<()> {
    env_logger::init();
    log::info!("Relativistic Asteroids (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let ticks = match args.next() {
        Some(n) => n
            .parse::<u64>()
            .map_err(|e| Error::InvalidSetting(format!("tick count {n:?}: {e}")))?,
        None => DEFAULT_TICKS,
    };

    let mut state = GameState::new(settings);
    state.high_scores = HighScores::load(HIGH_SCORES_FILE)?;

    let input = TickInput {
        autopilot: true,
        ..Default::default()
    };

    let mut games = 0;
    let mut shots = 0;
    let mut destroyed = 0;
    for _ in 0..ticks {
        for event in tick(&mut state, &input, SIM_DT) {
            match event {
                GameEvent::GameStarted => games += 1,
                GameEvent::BulletFired { .. } => shots += 1,
                GameEvent::AsteroidDestroyed { .. } => destroyed += 1,
                GameEvent::ShipHit { health } => log::info!("Ship hit, health {}", health),
                GameEvent::GameOver { score, rank } => {
                    log::info!("Game over: score {} rank {:?}", score, rank)
                }
                _ => {}
            }
        }
    }

    if state.phase == GamePhase::Playing {
        log::info!(
            "Session stopped mid-game: score={} health={} ammo={} c={:.3} v={:.3}c clock={:.2}s",
            state.score,
            state.health,
            state.ammo,
            state.c.get(),
            state.beta(),
            state.clock
        );
    }
    log::info!(
        "{} ticks, {} games, {} shots, {} asteroids destroyed, top score {:?}",
        ticks,
        games,
        shots,
        destroyed,
        state.high_scores.top_score()
    );

    state.high_scores.save(HIGH_SCORES_FILE)?;
    Ok(())
}
