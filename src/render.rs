//! Per-frame render step.

use glam::Vec2;

use crate::config::FieldConfig;
use crate::field::FieldState;
use crate::links::links;
use crate::surface::DrawSurface;

/// What the last render step drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub particles: usize,
    /// Links drawn.
    pub links: usize,
    /// Links within the threshold that were suppressed by the pointer.
    pub broken_links: usize,
}

/// Clear the field's logical area, then draw particles and links.
pub fn render<D: DrawSurface + ?Sized>(
    surface: &mut D,
    state: &FieldState,
    config: &FieldConfig,
) -> FrameStats {
    surface.clear(Vec2::ZERO, state.bounds());

    for p in &state.particles {
        surface.fill_circle(p.position, p.radius, config.color.with_alpha(p.alpha));
    }

    let mut stats = FrameStats {
        particles: state.particles.len(),
        ..FrameStats::default()
    };
    for link in links(state, config) {
        if link.broken {
            stats.broken_links += 1;
            continue;
        }
        let a = state.particles[link.a].position;
        let b = state.particles[link.b].position;
        surface.stroke_line(a, b, config.color.with_alpha(link.alpha), config.link_width);
        stats.links += 1;
    }
    stats
}
