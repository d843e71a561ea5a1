//! Seeded random particle creation.
//!
//! A [`Spawner`] owns the field's RNG. Seeding it explicitly makes a field
//! fully reproducible, which the tests and headless snapshots rely on.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use crate::config::FieldConfig;
use crate::particle::Particle;

/// Random source for new particles.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    /// Create a spawner with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create a spawner seeded from the configured seed, or from the clock.
    pub fn from_config(config: &FieldConfig) -> Self {
        Self::seeded(config.seed.unwrap_or_else(clock_seed))
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform random point over `[0, bounds)`.
    pub fn random_in_rect(&mut self, bounds: Vec2) -> Vec2 {
        Vec2::new(
            self.random_range(0.0, bounds.x),
            self.random_range(0.0, bounds.y),
        )
    }

    /// Random unit vector.
    pub fn random_direction(&mut self) -> Vec2 {
        let angle = self.rng.gen_range(0.0..TAU);
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Spawn one particle for a container of the given logical size.
    ///
    /// Speed is `base_speed`, scaled by `mean_radius / radius` when
    /// `speed_by_radius` is set, with `speed_jitter` added per component.
    pub fn spawn(&mut self, bounds: Vec2, config: &FieldConfig) -> Particle {
        let (r_min, r_max) = config.radius_range;
        let radius = self.random_range(r_min, r_max);
        let (a_min, a_max) = config.alpha_range;
        let alpha = self.random_range(a_min, a_max);

        let speed = if config.speed_by_radius && radius > 0.0 {
            config.base_speed * config.mean_radius() / radius
        } else {
            config.base_speed
        };
        let jitter = config.speed_jitter;
        let velocity = self.random_direction() * speed
            + Vec2::new(
                self.random_range(-jitter, jitter),
                self.random_range(-jitter, jitter),
            );

        Particle::new(self.random_in_rect(bounds), velocity, radius, alpha)
    }
}

fn clock_seed() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}
