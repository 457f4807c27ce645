//! Collision response between relativistic particles
//!
//! The bounce is defined in the centre-of-momentum frame: both particles are
//! boosted into it, their velocities reversed, and boosted back out. This is
//! a gameplay approximation, not a mass-ratio-aware elastic collision.

use glam::DVec2;

use super::kinematics::{add_velocities, subtract_velocities};
use super::particle::Particle;
use super::vector::VecExt;

/// Extra separation added on top of the overlap so rounding never leaves
/// the pair touching-and-overlapping
pub const SEPARATION_SLOP: f64 = 1e-9;

/// Geometry of a resolved contact
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit vector from the second particle towards the first
    pub axis: DVec2,
    /// Overlap that was removed (collision units)
    pub penetration: f64,
}

/// Push two overlapping particles apart and bounce them in their centre-of-momentum frame.
///
/// Coincident centres have no separation axis; the positional correction is
/// skipped and only the velocities are exchanged. The outcome does not depend
/// on the observing frame.
pub fn resolve(p: &mut Particle, q: &mut Particle, _frame: DVec2, c: f64) -> Contact {
    let offset = p.pos - q.pos;
    let distance = offset.length();
    let axis = offset.unit();

    // Separate by the uncontracted radii, which bound the contracted ones
    let penetration = p.scaled_radius() + q.scaled_radius() - distance;
    if axis.is_finite() && penetration > 0.0 {
        let step = 0.5 * (penetration + SEPARATION_SLOP);
        p.pos += axis * step;
        q.pos -= axis * step;
    }

    let momentum = p.momentum() + q.momentum();
    let com = momentum / (p.mass_rel() + q.mass_rel());

    let p_com = subtract_velocities(p.vel, com, c);
    let q_com = subtract_velocities(q.vel, com, c);

    // Reverse in the CoM frame, then boost back out
    let p_vel = add_velocities(-p_com, com, c);
    let q_vel = add_velocities(-q_com, com, c);

    p.set_velocity(p_vel, c);
    q.set_velocity(q_vel, c);

    Contact {
        axis,
        penetration: penetration.max(0.0),
    }
}

/// Resolve every colliding pair in `particles`. Returns the number of pairs resolved.
pub fn solve_collisions(particles: &mut [&mut Particle], frame: DVec2, c: f64) -> usize {
    let mut resolved = 0;
    let n = particles.len();
    for i in 0..n.saturating_sub(1) {
        for j in (i + 1)..n {
            let (head, tail) = particles.split_at_mut(j);
            let p = &mut *head[i];
            let q = &mut *tail[0];
            if p.check_collision(q, frame) {
                let contact = resolve(p, q, frame, c);
                log::trace!("resolved pair ({}, {}) penetration={}", i, j, contact.penetration);
                resolved += 1;
            }
        }
    }
    resolved
}
