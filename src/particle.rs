//! The simulated point.

use glam::Vec2;

/// A particle in container-local logical coordinates.
///
/// Velocity is a per-frame displacement, not a per-second rate: the field
/// advances exactly one step per rendered frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Draw radius. Also the wall offset and the repulsion mass proxy.
    pub radius: f32,
    /// Fill opacity.
    pub alpha: f32,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2, radius: f32, alpha: f32) -> Self {
        Self {
            position,
            velocity,
            radius,
            alpha,
        }
    }

    /// Whether the particle lies inside `[radius, bounds - radius]` on both axes.
    pub fn is_contained(&self, bounds: Vec2) -> bool {
        let r = self.radius;
        self.position.x >= r
            && self.position.x <= bounds.x - r
            && self.position.y >= r
            && self.position.y <= bounds.y - r
    }
}
