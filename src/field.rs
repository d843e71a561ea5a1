//! Live state of one particle field.
//!
//! [`FieldState`] is everything the physics and render steps read and write:
//! container dimensions, the particle population, the pointer, and the link
//! threshold. It is owned by a single [`ParticleField`](crate::ParticleField);
//! nothing here is global.

use glam::Vec2;

use crate::config::FieldConfig;
use crate::input::POINTER_ABSENT;
use crate::particle::Particle;
use crate::spawn::Spawner;

/// Pointer as seen by the physics and render steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Container-local position, or [`POINTER_ABSENT`].
    pub position: Vec2,
    /// Repulsion radius.
    pub radius: f32,
    /// Link-break radius.
    pub break_radius: Option<f32>,
}

impl Pointer {
    pub fn new(radius: f32, break_radius: Option<f32>) -> Self {
        Self {
            position: POINTER_ABSENT,
            radius,
            break_radius,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.position == POINTER_ABSENT
    }

    /// Reset to the absent sentinel.
    pub fn clear(&mut self) {
        self.position = POINTER_ABSENT;
    }
}

/// Dimensions, particles and pointer of one field.
#[derive(Debug, Clone)]
pub struct FieldState {
    /// Logical container width.
    pub width: f32,
    /// Logical container height.
    pub height: f32,
    /// Render order only.
    pub particles: Vec<Particle>,
    pub pointer: Pointer,
    pub link_distance: f32,
    /// Whether a tick frame is currently scheduled.
    pub running: bool,
}

impl FieldState {
    pub fn new(config: &FieldConfig) -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            pointer: Pointer::new(config.pointer_radius, config.break_radius),
            link_distance: config.link_distance,
            running: false,
        }
    }

    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Bring the population to `target`.
    ///
    /// An empty field is filled with exactly `target` particles. Otherwise new
    /// particles are appended or the tail is truncated; existing particles are
    /// never regenerated.
    pub fn reconcile(&mut self, target: usize, spawner: &mut Spawner, config: &FieldConfig) {
        let bounds = self.bounds();
        let current = self.particles.len();
        if current < target {
            self.particles.reserve(target - current);
            for _ in current..target {
                self.particles.push(spawner.spawn(bounds, config));
            }
        } else if current > target {
            self.particles.truncate(target);
        }
    }
}
