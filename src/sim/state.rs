//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here, including the current speed
//! of light and the RNG, so runs are reproducible from a seed.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particle::{Particle, Spawn};
use super::pool::{ParticlePool, PoolConfig};
use super::vector::VecExt;
use crate::consts::*;
use crate::highscores::HighScores;
use crate::map_range;
use crate::settings::Settings;

/// Current screen / phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start input
    MainMenu,
    /// Active gameplay
    Playing,
    /// Ship destroyed; debris keeps flying until the game over screen
    Ending { since: f64 },
    /// Score screen, waiting for input to return to the menu
    GameOver,
}

/// Things that happened during a tick, for audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    BulletFired { bullet: usize },
    ShipHit { health: i32 },
    InvincibilityEnded,
    /// A large asteroid broke into small ones
    AsteroidSplit { asteroid: usize, children: Vec<usize> },
    AsteroidDestroyed { asteroid: usize, pos: DVec2 },
    /// Speed of light started ramping towards `target`
    LightSlowing { target: f64 },
    ShipDestroyed,
    GameOver { score: u64, rank: Option<usize> },
    NewHighScore { score: u64 },
    ReturnedToMenu,
}

/// The speed of light and its linear ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedOfLight {
    current: f64,
    initial: f64,
    target: f64,
    /// Simulated time the ramp started
    start: f64,
    duration: f64,
    ramping: bool,
}

impl SpeedOfLight {
    pub fn new(c: f64, duration: f64) -> Self {
        Self {
            current: c,
            initial: c,
            target: c,
            start: 0.0,
            duration,
            ramping: false,
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.current
    }

    pub fn is_ramping(&self) -> bool {
        self.ramping
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Start ramping from the current value to `target` over the configured duration
    pub fn begin_ramp(&mut self, target: f64, now: f64) {
        self.initial = self.current;
        self.target = target;
        self.start = now;
        self.ramping = true;
    }

    /// Move along the ramp to simulated time `now`
    pub fn advance(&mut self, now: f64) {
        if !self.ramping {
            return;
        }
        let elapsed = now - self.start;
        if elapsed > self.duration {
            self.current = self.target;
            self.ramping = false;
        } else {
            self.current = map_range(elapsed, 0.0, self.duration, self.initial, self.target);
        }
    }
}

/// Asteroid pool: collides with itself, two sprite variants
pub fn asteroid_config() -> PoolConfig {
    PoolConfig {
        sprite_count: 2,
        ..Default::default()
    }
}

/// Bullet pool: no self-collision, limited lifetime
pub fn bullet_config(lifetime: f64) -> PoolConfig {
    PoolConfig {
        max_lifetime: Some(lifetime),
        collisions: false,
        ..Default::default()
    }
}

/// Explosion debris: short-lived, fades out, no self-collision
pub fn explosion_config(lifetime: f64) -> PoolConfig {
    PoolConfig {
        max_lifetime: Some(lifetime),
        fade_over_lifetime: true,
        collisions: false,
        ..Default::default()
    }
}

/// Random direction
pub fn rand_unit(rng: &mut impl Rng) -> DVec2 {
    DVec2::from_angle(rng.random::<f64>() * TAU)
}

/// Random small-asteroid / fragment radius and its mass (area)
fn small_body(rng: &mut impl Rng) -> (f64, f64) {
    let radius = rng.random::<f64>() * 0.5 + 0.5;
    (radius, PI * radius * radius)
}

/// Scatter `n` asteroids on a ring of radius `area`. 2 in 5 are small.
pub fn new_asteroid_pool(n: usize, area: f64, rng: &mut impl Rng) -> ParticlePool {
    let mut pool = ParticlePool::new(n, asteroid_config());
    for _ in 0..n {
        let (radius, variant) = if rng.random_range(0..5) < 2 {
            (rng.random::<f64>() * 0.5 + 0.5, ASTEROID_SMALL)
        } else {
            (rng.random::<f64>() + 1.0, ASTEROID_LARGE)
        };

        pool.activate(
            Spawn {
                pos: rand_unit(rng) * area,
                rapidity: rand_unit(rng) * 0.5,
                ang_pos: rng.random::<f64>() * TAU,
                ang_vel: rng.random::<f64>() * 0.25 - 0.125,
                mass: PI * radius * radius,
                radius,
            },
            variant,
        );
    }
    pool
}

/// Burst of fragments radiating from `target`
pub fn explode(pool: &mut ParticlePool, target: &Particle, rng: &mut impl Rng) {
    let (radius, mass) = small_body(rng);

    for i in 0..EXPLOSION_FRAGMENTS {
        let dir = DVec2::X.rotated(i as f64 * TAU / EXPLOSION_FRAGMENTS as f64);
        pool.activate(
            Spawn {
                pos: target.pos + dir * 0.2,
                rapidity: target.rap + dir * 0.5,
                ang_pos: rng.random::<f64>() * TAU,
                ang_vel: rng.random::<f64>() * 0.25 - 0.125,
                mass,
                radius,
            },
            0,
        );
    }
}

/// Break a large asteroid into small ones around its position. Returns the child slots.
pub fn split_asteroid(pool: &mut ParticlePool, parent: &Particle, rng: &mut impl Rng) -> Vec<usize> {
    (0..SPLIT_CHILDREN)
        .map(|i| {
            let dir = DVec2::X.rotated(i as f64 * TAU / SPLIT_CHILDREN as f64);
            let (radius, mass) = small_body(rng);
            pool.activate(
                Spawn {
                    pos: parent.pos + dir * 0.2,
                    rapidity: parent.rap + dir * 0.1,
                    ang_pos: rng.random::<f64>() * TAU,
                    ang_vel: rng.random::<f64>() * 0.25 - 0.125,
                    mass,
                    radius,
                },
                ASTEROID_SMALL,
            )
        })
        .collect()
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub settings: Settings,
    pub rng: Pcg32,
    /// Seed handed to background/starfield effects
    pub effect_seed: f64,

    pub phase: GamePhase,
    pub health: i32,
    pub ammo: i32,
    pub score: u64,
    pub high_scores: HighScores,
    /// Whether the last finished run topped the leaderboard
    pub new_high_score: bool,

    pub ship: Particle,
    pub thrusting: bool,
    pub asteroids: ParticlePool,
    pub bullets: ParticlePool,
    pub explosions: ParticlePool,

    pub c: SpeedOfLight,
    /// Simulated time the current invincibility started
    pub invincible_since: Option<f64>,

    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulated coordinate time (seconds)
    pub time: f64,
    /// Time on a stationary observer's clock, dilated by the ship's speed
    pub clock: f64,
}

impl GameState {
    /// New session sitting on the main menu
    pub fn new(settings: Settings) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let effect_seed = rng.random::<f64>() * 10000.0 - 5000.0;
        let c = SpeedOfLight::new(settings.speed_of_light, settings.c_lerp_seconds);

        Self {
            rng,
            effect_seed,
            phase: GamePhase::MainMenu,
            health: settings.start_health,
            ammo: settings.start_ammo,
            score: 0,
            high_scores: HighScores::new(),
            new_high_score: false,
            ship: Particle::new(Spawn::default()),
            thrusting: false,
            asteroids: ParticlePool::new(0, asteroid_config()),
            bullets: ParticlePool::new(0, bullet_config(settings.bullet_lifetime)),
            explosions: ParticlePool::new(0, explosion_config(settings.explosion_lifetime)),
            c,
            invincible_since: None,
            time_ticks: 0,
            time: 0.0,
            clock: 0.0,
            settings,
        }
    }

    /// Reset ship, pools, score and c for a fresh run
    pub fn start_game(&mut self) {
        log::info!("Starting new game");
        let s = &self.settings;

        self.c = SpeedOfLight::new(s.speed_of_light, s.c_lerp_seconds);
        self.health = s.start_health;
        self.ammo = s.start_ammo;
        self.score = 0;
        self.new_high_score = false;

        self.ship = Particle::new(Spawn::default());
        self.thrusting = false;
        self.invincible_since = None;

        self.asteroids = new_asteroid_pool(s.asteroid_count, s.spawn_area, &mut self.rng);
        self.bullets = ParticlePool::new(s.bullet_capacity, bullet_config(s.bullet_lifetime));
        self.explosions =
            ParticlePool::new(s.explosion_capacity, explosion_config(s.explosion_lifetime));
        log::debug!("all pools initialised, starting game");

        self.time_ticks = 0;
        self.time = 0.0;
        self.clock = 0.0;
        self.phase = GamePhase::Playing;
    }

    /// Finish the run: record the score and let the wreck play out.
    /// Returns the leaderboard rank, if any. No-op outside `Playing`.
    pub fn end_game(&mut self) -> Option<usize> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        log::info!("Game over: score={} clock={:.2}", self.score, self.clock);

        let rank = self.high_scores.add_score(self.score, self.clock);
        self.new_high_score = rank == Some(1);
        if self.new_high_score {
            log::info!("New high score: {}", self.score);
        }
        self.phase = GamePhase::Ending { since: self.time };
        rank
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_since.is_some()
    }

    /// The ship's rest frame; everything is simulated as the pilot sees it
    pub fn frame(&self) -> DVec2 {
        self.ship.vel
    }

    /// Ship speed as a fraction of c (for the HUD)
    pub fn beta(&self) -> f64 {
        self.ship.vel.length() / self.c.get()
    }
}
