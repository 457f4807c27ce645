//! Game tunables
//!
//! Defaults reproduce the arcade feel; a JSON file can override any subset.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for asteroid layout, fragment sizes and spins
    pub seed: u64,

    // === Speed of light ===
    /// Speed of light at the start of every game
    pub speed_of_light: f64,
    /// Seconds taken to ramp c to its next value
    pub c_lerp_seconds: f64,
    /// Each destroyed asteroid ramps c towards `c / c_divisor + c_floor`
    pub c_divisor: f64,
    pub c_floor: f64,

    // === Ship ===
    /// Force applied while thrusting
    pub thrust_force: f64,
    /// Quadratic drag coefficient on the ship
    pub drag: f64,
    /// Radians turned per tick
    pub turn_rate: f64,
    /// Rapidity added to the ship's for each bullet
    pub muzzle_rapidity: f64,
    pub start_health: i32,
    pub start_ammo: i32,
    pub invincibility_seconds: f64,

    // === Pools ===
    pub asteroid_count: usize,
    /// Radius of the ring asteroids spawn on
    pub spawn_area: f64,
    pub bullet_capacity: usize,
    pub bullet_lifetime: f64,
    pub explosion_capacity: usize,
    pub explosion_lifetime: f64,

    /// Seconds the wreck keeps simulating before the game over screen
    pub game_end_delay: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,

            speed_of_light: REAL_SPEED_OF_LIGHT,
            c_lerp_seconds: C_LERP_SECONDS,
            c_divisor: 8.0,
            c_floor: 10.0,

            thrust_force: 10.0,
            drag: 0.1,
            turn_rate: 0.05,
            muzzle_rapidity: 3.0,
            start_health: 3,
            start_ammo: 10,
            invincibility_seconds: INVINCIBILITY_SECONDS,

            asteroid_count: 64,
            spawn_area: 20.0,
            bullet_capacity: 256,
            bullet_lifetime: 10.0,
            explosion_capacity: 256,
            explosion_lifetime: 1.0,

            game_end_delay: GAME_END_DELAY_SECONDS,
        }
    }
}

impl Settings {
    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("speed_of_light", self.speed_of_light),
            ("c_divisor", self.c_divisor),
            ("c_lerp_seconds", self.c_lerp_seconds),
            ("bullet_lifetime", self.bullet_lifetime),
            ("explosion_lifetime", self.explosion_lifetime),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidSetting(format!("{name} must be > 0, got {value}")));
            }
        }

        let non_negative = [
            ("c_floor", self.c_floor),
            ("thrust_force", self.thrust_force),
            ("drag", self.drag),
            ("turn_rate", self.turn_rate),
            ("muzzle_rapidity", self.muzzle_rapidity),
            ("spawn_area", self.spawn_area),
            ("invincibility_seconds", self.invincibility_seconds),
            ("game_end_delay", self.game_end_delay),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidSetting(format!("{name} must be >= 0, got {value}")));
            }
        }

        // c must stay positive once it starts ramping down
        if self.c_floor == 0.0 {
            return Err(Error::InvalidSetting("c_floor must be > 0".into()));
        }
        if self.start_health <= 0 || self.start_ammo <= 0 {
            return Err(Error::InvalidSetting(
                "start_health and start_ammo must be > 0".into(),
            ));
        }
        if self.bullet_capacity == 0 || self.explosion_capacity == 0 {
            return Err(Error::InvalidSetting("pool capacities must be > 0".into()));
        }
        Ok(())
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Where c ramps to after an asteroid is destroyed at speed `c`
    pub fn next_speed_of_light(&self, c: f64) -> f64 {
        c / self.c_divisor + self.c_floor
    }
}
