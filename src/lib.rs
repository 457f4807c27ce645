//! Relativistic Asteroids - an Asteroids clone with a finite (and shrinking) speed of light
//!
//! Core modules:
//! - `sim`: Deterministic simulation (relativistic kinematics, particle pools, collisions, game state)
//! - `settings`: Data-driven game tunables
//! - `highscores`: Leaderboard persisted as JSON
//! - `error`: Error type for the I/O-facing surfaces

pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Conversion from simulation radius units to collision units
    pub const PHYS_SCALE: f64 = 0.3;

    /// Speed of light every game starts with (m/s)
    pub const REAL_SPEED_OF_LIGHT: f64 = 299_792_458.0;

    /// Seconds taken to ramp the speed of light to a new target
    pub const C_LERP_SECONDS: f64 = 2.0;
    /// Seconds of invincibility after the ship is hit
    pub const INVINCIBILITY_SECONDS: f64 = 1.0;
    /// Seconds between the ship exploding and the game over screen
    pub const GAME_END_DELAY_SECONDS: f64 = 5.0;

    /// Fragments spawned by every explosion
    pub const EXPLOSION_FRAGMENTS: usize = 16;
    /// Small asteroids spawned when a large one is shot
    pub const SPLIT_CHILDREN: usize = 3;

    /// Asteroid variant tags
    pub const ASTEROID_LARGE: u8 = 0;
    pub const ASTEROID_SMALL: u8 = 1;
}

/// Linearly map `v` from `[min_in, max_in]` onto `[min_out, max_out]`
#[inline]
pub fn map_range(v: f64, min_in: f64, max_in: f64, min_out: f64, max_out: f64) -> f64 {
    (v - min_in) / (max_in - min_in) * (max_out - min_out) + min_out
}

/// Wrap an angle into `[-PI, PI)`. Non-finite input gives NaN.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(0.0, 0.0, 2.0, 10.0, 20.0), 10.0);
        assert_eq!(map_range(1.0, 0.0, 2.0, 10.0, 20.0), 15.0);
        assert_eq!(map_range(2.0, 0.0, 2.0, 10.0, 20.0), 20.0);
        // Descending output range
        assert_eq!(map_range(1.0, 0.0, 2.0, 20.0, 10.0), 15.0);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f64::consts::PI;
        assert!((normalize_angle(3.0 * PI + 0.5) - (0.5 - PI)).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
        // Large angles wrap in constant time
        let wrapped = normalize_angle(1e6);
        assert!((-PI..PI).contains(&wrapped));
        assert!((wrapped.sin() - 1e6_f64.sin()).abs() < 1e-6);
        assert!((wrapped.cos() - 1e6_f64.cos()).abs() < 1e-6);
        assert!(normalize_angle(f64::INFINITY).is_nan());
        assert!(normalize_angle(f64::NEG_INFINITY).is_nan());
    }
}
