//! Per-frame physics step.
//!
//! Each particle, in order:
//!
//! 1. **Pointer repulsion** (when enabled): an impulse applied directly to
//!    position, pushing the particle away from the pointer with linear falloff
//!    `(radius - distance) / radius`, scaled by `repel_strength` and the mass
//!    factor.
//! 2. **Integration**: `position += velocity`.
//! 3. **Walls**: a coordinate outside `[radius, extent - radius]` is clamped
//!    back and the velocity component is reflected to point inward.
//!
//! There is no particle–particle interaction.

use glam::Vec2;

use crate::config::{FieldConfig, MassModel};
use crate::field::{FieldState, Pointer};
use crate::particle::Particle;

/// Advance every particle by one frame.
pub fn step(state: &mut FieldState, config: &FieldConfig) {
    let bounds = state.bounds();
    let pointer = state.pointer;

    for p in &mut state.particles {
        if config.repel {
            p.position += repulsion(p, &pointer, config);
        }
        p.position += p.velocity;
        bounce(p, bounds);
    }
}

/// Displacement the pointer applies to a particle this frame.
///
/// Zero at or beyond the repulsion radius, and zero when the particle sits
/// exactly on the pointer (no direction to push in).
pub fn repulsion(p: &Particle, pointer: &Pointer, config: &FieldConfig) -> Vec2 {
    let away = p.position - pointer.position;
    let dist = away.length();
    if dist >= pointer.radius || dist <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let falloff = (pointer.radius - dist) / pointer.radius;
    away / dist * falloff * config.repel_strength * mass_factor(p.radius, config)
}

/// Repulsion weight for a particle of the given radius.
pub fn mass_factor(radius: f32, config: &FieldConfig) -> f32 {
    match config.mass {
        MassModel::Uniform => 1.0,
        MassModel::InverseRadius => {
            if radius > 0.0 {
                (config.radius_range.0 / radius).min(1.0)
            } else {
                1.0
            }
        }
    }
}

/// Keep a particle inside `[radius, bounds - radius]` on both axes.
///
/// Returns `true` if either axis reflected.
pub fn bounce(p: &mut Particle, bounds: Vec2) -> bool {
    let rx = reflect_axis(&mut p.position.x, &mut p.velocity.x, p.radius, bounds.x);
    let ry = reflect_axis(&mut p.position.y, &mut p.velocity.y, p.radius, bounds.y);
    rx || ry
}

fn reflect_axis(pos: &mut f32, vel: &mut f32, radius: f32, extent: f32) -> bool {
    let lo = radius;
    let hi = extent - radius;
    if hi < lo {
        // Container thinner than the particle: pin it to the centre line.
        *pos = extent * 0.5;
        return false;
    }
    if *pos < lo {
        *pos = lo;
        *vel = vel.abs();
        true
    } else if *pos > hi {
        *pos = hi;
        *vel = -vel.abs();
        true
    } else {
        false
    }
}
