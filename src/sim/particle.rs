//! A single relativistic body
//!
//! Rapidity is the integration state; velocity is its bounded image. Every
//! per-tick quantity (spin, clock, position) advances by the dilated step
//! `dt * gamma` measured relative to the observer's frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::kinematics::{rapidity_from_velocity, relative_gamma, velocity_from_rapidity};
use super::vector::VecExt;
use crate::consts::PHYS_SCALE;

/// Initial conditions for a freshly created particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub pos: DVec2,
    pub rapidity: DVec2,
    pub ang_pos: f64,
    pub ang_vel: f64,
    pub mass: f64,
    pub radius: f64,
}

impl Default for Spawn {
    fn default() -> Self {
        Self {
            pos: DVec2::ZERO,
            rapidity: DVec2::ZERO,
            ang_pos: 0.0,
            ang_vel: 0.0,
            mass: 1.0,
            radius: 1.0,
        }
    }
}

/// A physical body: ship, asteroid, bullet or explosion fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: DVec2,
    /// Unbounded integration state; `vel` is derived from it
    pub rap: DVec2,
    /// Always strictly below the speed of light
    pub vel: DVec2,
    /// Acceleration applied during the previous step
    pub acc: DVec2,

    pub ang_pos: f64,
    pub ang_vel: f64,

    pub mass: f64,
    pub radius: f64,

    /// Lorentz factor relative to the frame of the last update
    pub gamma: f64,
    /// Proper time elapsed on the particle
    pub clock: f64,
}

impl Particle {
    /// Create a particle at rest in its own clock (zero velocity/acceleration, gamma 1)
    pub fn new(spawn: Spawn) -> Self {
        Self {
            pos: spawn.pos,
            rap: spawn.rapidity,
            vel: DVec2::ZERO,
            acc: DVec2::ZERO,
            ang_pos: spawn.ang_pos,
            ang_vel: spawn.ang_vel,
            mass: spawn.mass,
            radius: spawn.radius,
            gamma: 1.0,
            clock: 0.0,
        }
    }

    /// Advance one fixed step under `force`, as observed from `frame`
    pub fn update(&mut self, force: DVec2, frame: DVec2, c: f64, dt: f64) {
        let (gamma, _) = relative_gamma(self.vel, frame, c);
        self.gamma = gamma;
        let dtr = dt * gamma;

        self.clock += dtr;
        self.ang_pos += self.ang_vel * dtr;

        let acc = force / self.mass;
        let rap = self.rap + (self.acc + acc) * (dtr / 2.0);
        let vel = velocity_from_rapidity(rap, c);
        // Linear term is the old rapidity, not the velocity
        let pos = self.pos + self.rap * dtr + self.acc * (dtr * dtr / 2.0);

        self.acc = acc;
        self.rap = rap;
        self.vel = vel;
        self.pos = pos;
    }

    /// Radius in collision units
    #[inline]
    pub fn scaled_radius(&self) -> f64 {
        self.radius * PHYS_SCALE
    }

    /// Radius along `axis` after length contraction relative to `frame`.
    ///
    /// Interpolates between the full radius (motion across the axis) and
    /// `radius / gamma` (motion along it). Degenerate directions fall back to
    /// the uncontracted radius.
    pub fn effective_radius(&self, axis: DVec2, frame: DVec2) -> f64 {
        let base = self.scaled_radius();
        let alignment = (self.vel - frame).unit().dot(axis).abs();
        let radius = base * (1.0 - alignment * (1.0 - 1.0 / self.gamma));
        if radius.is_finite() { radius } else { base }
    }

    /// Whether the two particles overlap, accounting for length contraction
    pub fn check_collision(&self, other: &Particle, frame: DVec2) -> bool {
        let offset = self.pos - other.pos;
        let axis = offset.unit();

        let distance = offset.length();
        distance < self.effective_radius(axis, frame) + other.effective_radius(axis, frame)
    }

    /// Relativistic momentum `m * gamma * v`
    #[inline]
    pub fn momentum(&self) -> DVec2 {
        self.vel * (self.mass * self.gamma)
    }

    /// Relativistic mass `m * gamma`
    #[inline]
    pub fn mass_rel(&self) -> f64 {
        self.mass * self.gamma
    }

    /// Overwrite velocity (e.g. after a collision), keeping rapidity consistent
    pub fn set_velocity(&mut self, vel: DVec2, c: f64) {
        self.rap = rapidity_from_velocity(vel, c);
        self.vel = if vel.length() < c {
            vel
        } else {
            velocity_from_rapidity(self.rap, c)
        };
    }

    /// How the particle looks to an observer at `observer` moving with `frame`
    pub fn apparent(&self, observer: DVec2, frame: DVec2, c: f64) -> Apparent {
        let (_, axis) = relative_gamma(self.vel, frame, c);
        let contract = DVec2::new(1.0 / self.gamma, 1.0);
        let offset = ((self.pos - observer).rotated(-axis) * contract).rotated(axis);

        Apparent {
            offset,
            axis,
            scale: DVec2::new(self.radius / self.gamma, self.radius),
            rotation: self.ang_pos - axis,
        }
    }

    /// JSON snapshot of the kinematic state
    pub fn to_json(&self) -> serde_json::Result<String> {
        #[derive(Serialize)]
        struct Snapshot {
            pos: DVec2,
            vel: DVec2,
            acc: DVec2,
            rap: DVec2,
        }

        serde_json::to_string_pretty(&Snapshot {
            pos: self.pos,
            vel: self.vel,
            acc: self.acc,
            rap: self.rap,
        })
    }
}

/// Observed geometry of a particle, for renderers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Apparent {
    /// Position relative to the observer, contracted along the motion axis
    pub offset: DVec2,
    /// Direction of motion relative to the observer's frame (radians)
    pub axis: f64,
    /// Extent along the motion axis (x) and across it (y)
    pub scale: DVec2,
    /// Sprite rotation before aligning with `axis`
    pub rotation: f64,
}

/// Advance every particle one step with no applied force
pub fn integrate_all(particles: &mut [&mut Particle], frame: DVec2, c: f64, dt: f64) {
    for particle in particles.iter_mut() {
        particle.update(DVec2::ZERO, frame, c, dt);
    }
}
