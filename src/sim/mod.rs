//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering or platform dependencies
//!
//! Every particle is simulated as seen from a chosen reference frame (the
//! ship's velocity), against a finite speed of light `c`.

pub mod collision;
pub mod kinematics;
pub mod particle;
pub mod pool;
pub mod state;
pub mod tick;
pub mod vector;

pub use collision::{Contact, resolve, solve_collisions};
pub use kinematics::{
    add_velocities, drag_force, lorentz_factor, rapidity_from_velocity, relative_gamma,
    subtract_velocities, velocity_from_rapidity,
};
pub use particle::{Apparent, Particle, Spawn};
pub use pool::{ParticlePool, PoolConfig};
pub use state::{
    GameEvent, GamePhase, GameState, SpeedOfLight, explode, new_asteroid_pool, split_asteroid,
};
pub use tick::{TickInput, tick};
pub use vector::VecExt;
