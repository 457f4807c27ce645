//! Special-relativity helpers
//!
//! Velocities are always derived from rapidity through `c * tanh(|rap| / c)`,
//! which is what keeps every particle below the speed of light no matter how
//! much thrust is applied.

use glam::DVec2;

use super::vector::VecExt;

/// Largest `|v| / c` the engine will ever produce.
///
/// `tanh` rounds to exactly 1.0 for arguments above ~19, so the mapping is
/// clamped just below it to keep `|v| < c` strict.
pub const MAX_BETA: f64 = 1.0 - 1e-12;

/// Lorentz factor `1 / sqrt(1 - v²/c²)`. Non-finite for `speed >= c`.
#[inline]
pub fn lorentz_factor(speed: f64, c: f64) -> f64 {
    1.0 / (1.0 - (speed * speed) / (c * c)).sqrt()
}

/// Lorentz factor and motion axis of `velocity` as seen from `frame`.
///
/// Zero relative speed returns exactly `(1.0, 0.0)`. A non-finite factor
/// (relative speed at or beyond c) is clamped to 1.
pub fn relative_gamma(velocity: DVec2, frame: DVec2, c: f64) -> (f64, f64) {
    let relative = velocity - frame;
    let speed = relative.length();
    if speed == 0.0 {
        return (1.0, 0.0);
    }

    let gamma = lorentz_factor(speed, c);
    let gamma = if gamma.is_finite() { gamma } else { 1.0 };
    (gamma, relative.to_angle())
}

/// Quadratic air resistance `-k|v|²` along `velocity`
#[inline]
pub fn drag_force(velocity: DVec2, k: f64) -> DVec2 {
    velocity.set_mag(-k * velocity.length_squared())
}

/// Bounded velocity for an unbounded rapidity
#[inline]
pub fn velocity_from_rapidity(rapidity: DVec2, c: f64) -> DVec2 {
    let beta = (rapidity.length() / c).tanh().min(MAX_BETA);
    rapidity.set_mag(c * beta)
}

/// Inverse of [`velocity_from_rapidity`]. Speeds at or above c are clamped.
#[inline]
pub fn rapidity_from_velocity(velocity: DVec2, c: f64) -> DVec2 {
    let beta = (velocity.length() / c).min(MAX_BETA);
    velocity.set_mag(c * beta.atanh())
}

/// Relativistic velocity addition `(u + v) / (1 + u·v/c²)`
#[inline]
pub fn add_velocities(u: DVec2, v: DVec2, c: f64) -> DVec2 {
    (u + v) * (1.0 / (1.0 + u.dot(v) / (c * c)))
}

/// Velocity `v` expressed in a frame moving at `frame`: `(v - frame) / (1 - v·frame/c²)`
#[inline]
pub fn subtract_velocities(v: DVec2, frame: DVec2, c: f64) -> DVec2 {
    (v - frame) * (1.0 / (1.0 - v.dot(frame) / (c * c)))
}
