//! Links between nearby particles.
//!
//! Every unordered pair closer than the link distance is a link. Its opacity
//! falls linearly from `link_opacity` at zero separation to zero at the
//! threshold. When a break radius is configured, a link whose segment passes
//! within that radius of the pointer is marked `broken` and is not drawn.
//!
//! The scan is O(n²); the population clamp keeps n small enough for a frame.

use glam::Vec2;

use crate::config::FieldConfig;
use crate::field::FieldState;

/// A candidate link between particles `a < b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub alpha: f32,
    /// The segment passes through the pointer's break radius.
    pub broken: bool,
}

/// Opacity of a link at the given separation, or `None` if the pair is not
/// linked (`distance >= link_distance`).
pub fn link_alpha(distance: f32, link_distance: f32, max_opacity: f32) -> Option<f32> {
    if distance < link_distance {
        Some((1.0 - distance / link_distance) * max_opacity)
    } else {
        None
    }
}

/// Whether segment `a`–`b` passes within `radius` of `center`.
///
/// Uses the closest point on the segment, so a segment lying entirely inside
/// the circle counts as intersecting. A zero-length segment is treated as the
/// point `a`.
pub fn segment_circle_intersects(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    let t = if len_sq > f32::EPSILON {
        ((center - a).dot(ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = a + ab * t;
    closest.distance_squared(center) <= radius * radius
}

/// All links of the current field, in `(a, b)` lexicographic order.
pub fn links<'a>(state: &'a FieldState, config: &'a FieldConfig) -> impl Iterator<Item = Link> + 'a {
    let particles = &state.particles;
    let link_distance = state.link_distance;
    let pointer = state.pointer;
    let n = particles.len();

    (0..n).flat_map(move |i| {
        let a = particles[i].position;
        (i + 1..n).filter_map(move |j| {
            let b = particles[j].position;
            let distance = a.distance(b);
            let alpha = link_alpha(distance, link_distance, config.link_opacity)?;
            let broken = match pointer.break_radius {
                Some(r) if !pointer.is_absent() => segment_circle_intersects(a, b, pointer.position, r),
                _ => false,
            };
            Some(Link {
                a: i,
                b: j,
                distance,
                alpha,
                broken,
            })
        })
    })
}
