//! Fixed-slot particle pools
//!
//! Slots live in parallel arrays (particle, active flag, activation time,
//! variant tag) and are never reordered, so indices stay valid as collision
//! pair identifiers for the rest of a tick. Full pools grow instead of
//! dropping a spawn.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::solve_collisions;
use super::particle::{Particle, Spawn, integrate_all};

/// Pool-wide behaviour, fixed when the pool is created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Particles older than this (simulated seconds) are removed on the next update
    pub max_lifetime: Option<f64>,
    /// Renderers should fade particles out over `max_lifetime`
    pub fade_over_lifetime: bool,
    /// Resolve collisions between members of this pool
    pub collisions: bool,
    /// Number of sprite variants the pool draws with
    pub sprite_count: u8,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_lifetime: None,
            fade_over_lifetime: false,
            collisions: true,
            sprite_count: 1,
        }
    }
}

/// A growable arena of particles addressed by stable slot index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlePool {
    config: PoolConfig,
    particles: Vec<Option<Particle>>,
    active: Vec<bool>,
    activated_at: Vec<f64>,
    variants: Vec<u8>,
    /// Simulated time, advanced by every update
    now: f64,
}

impl ParticlePool {
    /// Create a pool with `capacity` empty slots
    pub fn new(capacity: usize, config: PoolConfig) -> Self {
        log::debug!("creating new pool n={} config={:?}", capacity, config);
        Self {
            config,
            particles: vec![None; capacity],
            active: vec![false; capacity],
            activated_at: vec![0.0; capacity],
            variants: vec![0; capacity],
            now: 0.0,
        }
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Simulated time of this pool
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of slots, active or not
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index).and_then(Option::as_mut)
    }

    /// Variant tag of an active slot
    pub fn variant(&self, index: usize) -> Option<u8> {
        self.is_active(index).then(|| self.variants[index])
    }

    /// Active slots in index order
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.particles
            .iter()
            .enumerate()
            .zip(&self.active)
            .filter(|(_, active)| **active)
            .filter_map(|((i, p), _)| p.as_ref().map(|p| (i, p)))
    }

    /// Opacity for fading pools: 1 when spawned, 0 at `max_lifetime`
    pub fn alpha(&self, index: usize) -> f32 {
        match self.config.max_lifetime {
            Some(max) if self.config.fade_over_lifetime && max > 0.0 => {
                let age = self.now - self.activated_at.get(index).copied().unwrap_or(self.now);
                (1.0 - age / max).clamp(0.0, 1.0) as f32
            }
            _ => 1.0,
        }
    }

    /// Place a fresh particle in the first free slot, growing if none is free.
    /// Returns the slot index.
    pub fn activate(&mut self, spawn: Spawn, variant: u8) -> usize {
        log::debug!(
            "activating particle pos={:?} rap={:?} mass={} radius={} variant={}",
            spawn.pos,
            spawn.rapidity,
            spawn.mass,
            spawn.radius,
            variant
        );
        if variant >= self.config.sprite_count {
            log::warn!(
                "variant {} has no sprite (pool has {})",
                variant,
                self.config.sprite_count
            );
        }

        let particle = Particle::new(spawn);
        if let Some(i) = self.active.iter().position(|a| !*a) {
            self.active[i] = true;
            self.activated_at[i] = self.now;
            self.variants[i] = variant;
            self.particles[i] = Some(particle);
            return i;
        }

        log::debug!("no inactive slot, growing pool to {}", self.particles.len() + 1);
        self.active.push(true);
        self.activated_at.push(self.now);
        self.variants.push(variant);
        self.particles.push(Some(particle));
        self.particles.len() - 1
    }

    /// Free a slot. Returns false if it was not active.
    pub fn deactivate(&mut self, index: usize) -> bool {
        log::debug!("deactivating particle i={}", index);
        if !self.is_active(index) {
            return false;
        }
        self.active[index] = false;
        self.particles[index] = None;
        true
    }

    /// Free every slot, keeping the capacity
    pub fn reset(&mut self) {
        log::debug!("resetting pool");
        for i in 0..self.particles.len() {
            if self.active[i] {
                self.particles[i] = None;
                self.active[i] = false;
                self.activated_at[i] = 0.0;
                self.variants[i] = 0;
            }
        }
    }

    /// Advance the pool clock, expire old particles, integrate the rest and
    /// resolve collisions between them
    pub fn update(&mut self, frame: DVec2, c: f64, dt: f64) {
        self.update_with(frame, c, dt, &mut []);
    }

    /// As [`update`](Self::update), but `external` particles (already advanced
    /// by the caller) also take part in collision solving
    pub fn update_with(&mut self, frame: DVec2, c: f64, dt: f64, external: &mut [&mut Particle]) {
        self.now += dt;
        self.expire();

        let collisions = self.config.collisions;
        let mut working: Vec<&mut Particle> = self.active_mut();
        integrate_all(&mut working, frame, c, dt);

        if collisions {
            working.extend(external.iter_mut().map(|p| &mut **p));
            solve_collisions(&mut working, frame, c);
        }
    }

    /// Every (self, other) index pair whose particles overlap. Nothing is resolved.
    pub fn pool_collisions(&self, other: &ParticlePool, frame: DVec2) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, p) in self.iter_active() {
            for (j, q) in other.iter_active() {
                if p.check_collision(q, frame) {
                    out.push((i, j));
                }
            }
        }
        out
    }

    /// Indices of active particles overlapping `particle`
    pub fn collisions(&self, particle: &Particle, frame: DVec2) -> Vec<usize> {
        self.iter_active()
            .filter(|(_, p)| p.check_collision(particle, frame))
            .map(|(i, _)| i)
            .collect()
    }

    /// Position of the nearest active particle, or the zero vector if there is none
    pub fn closest(&self, pos: DVec2) -> DVec2 {
        let mut closest = DVec2::ZERO;
        let mut min_sqr_dist = f64::MAX;
        for (_, p) in self.iter_active() {
            let sqr_dist = p.pos.distance_squared(pos);
            if sqr_dist < min_sqr_dist {
                min_sqr_dist = sqr_dist;
                closest = p.pos;
            }
        }
        closest
    }

    fn expire(&mut self) {
        let Some(max) = self.config.max_lifetime else {
            return;
        };
        for i in 0..self.particles.len() {
            if self.active[i] && self.now - self.activated_at[i] > max {
                self.deactivate(i);
            }
        }
    }

    fn active_mut(&mut self) -> Vec<&mut Particle> {
        self.particles
            .iter_mut()
            .zip(&self.active)
            .filter(|(_, active)| **active)
            .filter_map(|(p, _)| p.as_mut())
            .collect()
    }
}
