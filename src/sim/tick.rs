//! Fixed timestep simulation tick
//!
//! Advances the game one step: ship control, collisions, bullet hits, the
//! speed of light ramp and the observer clock.

use glam::DVec2;
use rand::Rng;

use super::kinematics::{drag_force, relative_gamma};
use super::particle::Spawn;
use super::state::{GameEvent, GamePhase, GameState, explode, split_asteroid};
use super::vector::VecExt;
use crate::consts::*;
use crate::normalize_angle;

/// Spin given to the ship when an asteroid hits it (rad/s)
const HIT_SPIN: f64 = 10.0;

/// Autopilot fires at most once per this many ticks
const AUTOPILOT_FIRE_TICKS: u64 = 20;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Fire one bullet (edge-triggered by the caller)
    pub fire: bool,
    /// Start a game / leave the game over screen
    pub start: bool,
    /// Give up the current run
    pub quit: bool,
    /// Demo mode - the autopilot flies the ship
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f64) -> Vec<GameEvent> {
    let mut events = Vec::new();

    match state.phase {
        GamePhase::MainMenu => {
            if input.start || input.autopilot {
                state.start_game();
                events.push(GameEvent::GameStarted);
            }
            return events;
        }
        GamePhase::GameOver => {
            if input.start || input.autopilot {
                log::info!("Returning to main menu");
                state.phase = GamePhase::MainMenu;
                events.push(GameEvent::ReturnedToMenu);
            }
            return events;
        }
        GamePhase::Ending { since } => {
            state.time += dt;
            state.time_ticks += 1;
            if state.time - since > state.settings.game_end_delay {
                log::debug!("moving to game over screen");
                state.phase = GamePhase::GameOver;
                return events;
            }
            // The wreck keeps drifting in the ship's last frame
            let frame = state.frame();
            let c = state.c.get();
            state.asteroids.update(frame, c, dt);
            state.bullets.update(frame, c, dt);
            state.explosions.update(frame, c, dt);
            return events;
        }
        GamePhase::Playing => {}
    }

    state.time += dt;
    state.time_ticks += 1;

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    if input.quit {
        log::debug!("quit requested");
        finish_game(state, &mut events);
    }

    // Ship control
    let mut thrust = DVec2::ZERO;
    state.thrusting = input.thrust;
    if input.thrust {
        thrust = facing(state.ship.ang_pos);
    }

    if input.turn_left {
        state.ship.ang_pos -= state.settings.turn_rate;
    } else if input.turn_right {
        state.ship.ang_pos += state.settings.turn_rate;
    }

    if input.fire && state.ammo > 0 {
        let bullet = state.bullets.activate(
            Spawn {
                pos: state.ship.pos,
                rapidity: state.ship.rap
                    + facing(state.ship.ang_pos) * state.settings.muzzle_rapidity,
                ang_pos: 0.0,
                ang_vel: 1.0,
                mass: 1.0,
                radius: 1.0,
            },
            0,
        );
        state.ammo -= 1;
        events.push(GameEvent::BulletFired { bullet });
    }

    let force =
        thrust * state.settings.thrust_force + drag_force(state.ship.vel, state.settings.drag);
    let c = state.c.get();
    state.ship.update(force, state.ship.vel, c, dt);

    // Ship vs asteroids
    let frame = state.frame();
    if !state.is_invincible() && !state.asteroids.collisions(&state.ship, frame).is_empty() {
        log::debug!("ship hit an asteroid");
        state.invincible_since = Some(state.time);
        state.health -= 1;
        let spin = if state.rng.random_bool(0.5) { HIT_SPIN } else { -HIT_SPIN };
        state.ship.ang_vel += spin;
        events.push(GameEvent::ShipHit {
            health: state.health,
        });
    }

    if let Some(since) = state.invincible_since {
        if state.time - since > state.settings.invincibility_seconds {
            log::debug!("invincibility period ended");
            state.invincible_since = None;
            state.ship.ang_vel = 0.0;
            events.push(GameEvent::InvincibilityEnded);
        }
    }

    if state.phase == GamePhase::Playing && (state.health <= 0 || state.ammo <= 0) {
        log::debug!("ship lost: health={} ammo={}", state.health, state.ammo);
        explode(&mut state.explosions, &state.ship, &mut state.rng);
        events.push(GameEvent::ShipDestroyed);
        finish_game(state, &mut events);
    }

    // Pools, with the ship taking part in asteroid collisions
    state
        .asteroids
        .update_with(frame, c, dt, &mut [&mut state.ship]);
    let frame = state.frame();
    state.bullets.update(frame, c, dt);
    state.explosions.update(frame, c, dt);

    // Bullet hits. Pairs name slots as they were when collected; split
    // children may land in a slot freed earlier in this loop.
    let hits = state.bullets.pool_collisions(&state.asteroids, frame);
    let mut consumed = vec![false; state.asteroids.len()];
    for (bullet, asteroid) in hits {
        // One bullet destroys one asteroid
        if consumed[asteroid] || !state.bullets.is_active(bullet) {
            continue;
        }
        log::debug!("bullet {} hit asteroid {}", bullet, asteroid);
        consumed[asteroid] = true;
        state.bullets.deactivate(bullet);

        let Some(parent) = state.asteroids.get(asteroid).cloned() else {
            continue;
        };
        if state.asteroids.variant(asteroid) == Some(ASTEROID_LARGE) {
            let children = split_asteroid(&mut state.asteroids, &parent, &mut state.rng);
            state.score += 3;
            state.ammo += 3;
            events.push(GameEvent::AsteroidSplit { asteroid, children });
        } else {
            state.score += 1;
            state.ammo += 1;
        }

        explode(&mut state.explosions, &parent, &mut state.rng);
        state.asteroids.deactivate(asteroid);
        events.push(GameEvent::AsteroidDestroyed {
            asteroid,
            pos: parent.pos,
        });

        let target = state.settings.next_speed_of_light(state.c.get());
        state.c.begin_ramp(target, state.time);
        events.push(GameEvent::LightSlowing { target });
    }

    state.c.advance(state.time);

    let (gamma, _) = relative_gamma(state.ship.vel, DVec2::ZERO, state.c.get());
    state.clock += dt * gamma;

    events
}

/// Unit thrust direction for a ship rotated by `ang_pos` (0 points up)
fn facing(ang_pos: f64) -> DVec2 {
    DVec2::new(ang_pos.sin(), -ang_pos.cos())
}

fn finish_game(state: &mut GameState, events: &mut Vec<GameEvent>) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let rank = state.end_game();
    events.push(GameEvent::GameOver {
        score: state.score,
        rank,
    });
    if state.new_high_score {
        events.push(GameEvent::NewHighScore { score: state.score });
    }
}

/// Turn towards the nearest asteroid, thrust when roughly facing it and fire on a cadence
fn autopilot(state: &GameState, input: &mut TickInput) {
    if state.asteroids.iter_active().next().is_none() {
        return;
    }
    let target = state.asteroids.closest(state.ship.pos);
    let desired = -state.ship.pos.heading_to(target);
    let error = normalize_angle(desired - state.ship.ang_pos);
    if !error.is_finite() {
        return;
    }

    let turn_rate = state.settings.turn_rate;
    input.turn_right = error > turn_rate;
    input.turn_left = error < -turn_rate;

    let aligned = error.abs() < 0.3;
    input.thrust = aligned && state.beta() < 0.5;
    input.fire = aligned && state.time_ticks % AUTOPILOT_FIRE_TICKS == 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::pool::ParticlePool;
    use crate::sim::state::asteroid_config;
    use std::f64::consts::{PI, TAU};

    fn slow_light() -> Settings {
        Settings {
            speed_of_light: 100.0,
            ..Default::default()
        }
    }

    /// A running game with no asteroids
    fn empty_game() -> GameState {
        let mut state = GameState::new(slow_light());
        state.start_game();
        state.asteroids = ParticlePool::new(0, asteroid_config());
        state
    }

    fn rock(x: f64, y: f64) -> Spawn {
        Spawn {
            pos: DVec2::new(x, y),
            mass: PI,
            radius: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_menu_waits_for_start() {
        let mut state = GameState::new(slow_light());
        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.is_empty());
        assert_eq!(state.phase, GamePhase::MainMenu);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let events = tick(&mut state, &start, SIM_DT);
        assert_eq!(events, vec![GameEvent::GameStarted]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.asteroids.active_count(), 64);
        assert_eq!(state.health, 3);
        assert_eq!(state.ammo, 10);
    }

    #[test]
    fn test_turn_and_thrust() {
        let mut state = empty_game();
        let input = TickInput {
            turn_right: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!((state.ship.ang_pos - 0.05).abs() < 1e-12);

        let mut state = empty_game();
        let input = TickInput {
            thrust: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.thrusting);
        // Facing up means thrusting towards -y
        assert!(state.ship.rap.y < 0.0);
        assert!(state.ship.rap.x.abs() < 1e-12);
    }

    #[test]
    fn test_fire_spends_ammo() {
        let mut state = empty_game();
        let input = TickInput {
            fire: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(matches!(events[0], GameEvent::BulletFired { .. }));
        assert_eq!(state.ammo, 9);
        assert_eq!(state.bullets.active_count(), 1);

        let (_, bullet) = state.bullets.iter_active().next().unwrap();
        assert!((bullet.rap - DVec2::new(0.0, -3.0)).length() < 1e-12);
        assert!(bullet.pos.y < 0.0);
    }

    #[test]
    fn test_observer_clock_at_rest() {
        let mut state = empty_game();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!((state.clock - SIM_DT).abs() < 1e-15);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_bullet_splits_large_asteroid() {
        let mut state = empty_game();
        let asteroid = state.asteroids.activate(rock(10.0, 0.0), ASTEROID_LARGE);
        state.bullets.activate(
            Spawn {
                pos: DVec2::new(10.0, 0.1),
                ..Default::default()
            },
            0,
        );

        let events = tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(!state.asteroids.is_active(asteroid));
        assert_eq!(state.bullets.active_count(), 0);
        assert_eq!(state.score, 3);
        assert_eq!(state.ammo, 13);
        assert_eq!(state.explosions.active_count(), EXPLOSION_FRAGMENTS);

        let children = events
            .iter()
            .find_map(|e| match e {
                GameEvent::AsteroidSplit { children, .. } => Some(children.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(state.asteroids.active_count(), 3);
        for (k, &i) in children.iter().enumerate() {
            let child = state.asteroids.get(i).unwrap();
            let expected = DVec2::new(10.0, 0.0) + DVec2::from_angle(k as f64 * TAU / 3.0) * 0.2;
            assert!((child.pos - expected).length() < 1e-12);
            assert_eq!(state.asteroids.variant(i), Some(ASTEROID_SMALL));
        }

        // c starts ramping towards c/8 + 10
        assert!(state.c.is_ramping());
        assert_eq!(state.c.target(), 22.5);
        assert!(events.contains(&GameEvent::LightSlowing { target: 22.5 }));
    }

    #[test]
    fn test_bullet_destroys_small_asteroid() {
        let mut state = empty_game();
        state.asteroids.activate(rock(10.0, 0.0), ASTEROID_SMALL);
        state.asteroids.activate(rock(-10.0, 0.0), ASTEROID_SMALL);
        state.bullets.activate(
            Spawn {
                pos: DVec2::new(10.0, 0.1),
                ..Default::default()
            },
            0,
        );

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 1);
        assert_eq!(state.ammo, 11);
        assert_eq!(state.asteroids.active_count(), 1);
        assert_eq!(state.explosions.active_count(), EXPLOSION_FRAGMENTS);
    }

    #[test]
    fn test_split_child_in_freed_slot_survives() {
        let mut state = empty_game();
        let small = state.asteroids.activate(rock(10.0, 0.0), ASTEROID_SMALL);
        let large = state.asteroids.activate(rock(-10.0, 0.0), ASTEROID_LARGE);
        assert_eq!((small, large), (0, 1));
        for pos in [
            DVec2::new(10.0, 0.1),
            DVec2::new(-10.0, 0.1),
            DVec2::new(10.0, -0.1),
        ] {
            state.bullets.activate(
                Spawn {
                    pos,
                    ..Default::default()
                },
                0,
            );
        }

        let events = tick(&mut state, &TickInput::default(), SIM_DT);

        let destroyed: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                GameEvent::AsteroidDestroyed { asteroid, .. } => Some(*asteroid),
                _ => None,
            })
            .collect();
        assert_eq!(destroyed, vec![small, large]);
        assert_eq!(state.score, 4);
        // The first child took the small asteroid's old slot and is untouched
        assert_eq!(state.asteroids.active_count(), 3);
        assert_eq!(state.asteroids.variant(small), Some(ASTEROID_SMALL));
        let child = state.asteroids.get(small).unwrap();
        assert!((child.pos - DVec2::new(-9.8, 0.0)).length() < 1e-12);
        // The third bullet found nothing left to hit
        assert_eq!(state.bullets.active_count(), 1);
    }

    #[test]
    fn test_one_bullet_one_asteroid() {
        let mut state = empty_game();
        // Two rocks side by side, one bullet touching both
        state.asteroids.activate(rock(10.0, -0.25), ASTEROID_SMALL);
        state.asteroids.activate(rock(10.0, 0.25), ASTEROID_SMALL);
        state.bullets.activate(
            Spawn {
                pos: DVec2::new(10.0, 0.0),
                ..Default::default()
            },
            0,
        );

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 1);
        assert_eq!(state.asteroids.active_count(), 1);
    }

    #[test]
    fn test_ship_hit_and_invincibility() {
        let mut state = empty_game();
        state.asteroids.activate(rock(0.2, 0.0), ASTEROID_LARGE);

        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.contains(&GameEvent::ShipHit { health: 2 }));
        assert_eq!(state.health, 2);
        assert!(state.is_invincible());
        assert_eq!(state.ship.ang_vel.abs(), HIT_SPIN);

        let mut ended = false;
        for _ in 0..70 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT);
            if events.contains(&GameEvent::InvincibilityEnded) {
                ended = true;
                break;
            }
        }
        assert!(ended);
        assert!(!state.is_invincible());
        assert_eq!(state.ship.ang_vel, 0.0);
        assert_eq!(state.health, 2);
    }

    #[test]
    fn test_out_of_ammo_ends_game() {
        let mut state = empty_game();
        state.score = 4;
        state.ammo = 1;
        let input = TickInput {
            fire: true,
            ..Default::default()
        };

        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.contains(&GameEvent::ShipDestroyed));
        assert!(events.contains(&GameEvent::GameOver {
            score: 4,
            rank: Some(1)
        }));
        assert!(events.contains(&GameEvent::NewHighScore { score: 4 }));
        assert!(matches!(state.phase, GamePhase::Ending { .. }));
        assert_eq!(state.explosions.active_count(), EXPLOSION_FRAGMENTS);

        // Debris keeps simulating, then expires
        for _ in 0..2 {
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.explosions.active_count(), 0);
        assert!(matches!(state.phase, GamePhase::Ending { .. }));

        for _ in 0..4 {
            tick(&mut state, &TickInput::default(), 1.0);
        }
        assert_eq!(state.phase, GamePhase::GameOver);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let events = tick(&mut state, &start, SIM_DT);
        assert_eq!(events, vec![GameEvent::ReturnedToMenu]);
        assert_eq!(state.phase, GamePhase::MainMenu);
    }

    #[test]
    fn test_quit_ends_without_explosion() {
        let mut state = empty_game();
        let input = TickInput {
            quit: true,
            ..Default::default()
        };
        let events = tick(&mut state, &input, SIM_DT);
        assert!(events.contains(&GameEvent::GameOver {
            score: 0,
            rank: None
        }));
        assert!(!events.contains(&GameEvent::ShipDestroyed));
        assert_eq!(state.explosions.active_count(), 0);
    }

    #[test]
    fn test_autopilot_turns_towards_target() {
        let mut state = empty_game();
        state.asteroids.activate(rock(10.0, 0.0), ASTEROID_LARGE);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        tick(&mut state, &input, SIM_DT);
        assert!((state.ship.ang_pos - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(slow_light());
        let mut b = GameState::new(slow_light());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..600 {
            let ea = tick(&mut a, &input, SIM_DT);
            let eb = tick(&mut b, &input, SIM_DT);
            assert_eq!(ea, eb);
        }
        assert_eq!(a.ship, b.ship);
        assert_eq!(a.score, b.score);
        assert_eq!(a.clock, b.clock);
        assert_eq!(a.c.get(), b.c.get());
    }

    #[test]
    fn test_speed_stays_below_light() {
        let mut state = GameState::new(Settings {
            speed_of_light: 5.0,
            ..Default::default()
        });
        state.start_game();
        state.asteroids = ParticlePool::new(0, asteroid_config());
        let input = TickInput {
            thrust: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut state, &input, SIM_DT);
        }
        assert!(state.beta() < 1.0);
        assert!(state.clock > state.time);
    }
}
