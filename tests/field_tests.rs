//! Integration tests for the particle field engine.
//!
//! These drive a full `ParticleField` through its public API with a
//! deterministic scheduler and the CPU canvas, the way a host would.

use pfe::prelude::*;
use pfe::{links::links, physics, FieldState, Particle, Spawner, POINTER_ABSENT};

fn seeded(config: FieldConfig) -> ParticleField<PixelCanvas, ManualScheduler> {
    ParticleField::new(config.with_seed(11), Some(PixelCanvas::new()), ManualScheduler::new())
}

fn started(config: FieldConfig, w: f32, h: f32) -> ParticleField<PixelCanvas, ManualScheduler> {
    let mut field = seeded(config);
    assert!(field.start(Some(&StaticContainer::new(Vec2::new(w, h)))));
    field
}

fn unclamped() -> FieldConfig {
    FieldConfig::fluid().with_population_bounds(None, None)
}

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_population_follows_area() {
    // 1920 * 1080 / 24000 = 86.4
    let field = started(FieldConfig::fluid(), 1920.0, 1080.0);
    assert_eq!(field.state().particles.len(), 86);
}

#[test]
fn test_population_clamped_both_ways() {
    let small = started(FieldConfig::fluid(), 320.0, 480.0);
    assert_eq!(small.state().particles.len(), 56);

    let huge = started(FieldConfig::fluid(), 5000.0, 3000.0);
    assert_eq!(huge.state().particles.len(), 180);
}

#[test]
fn test_population_rounds_half_up() {
    // 60 * 1000 / 24000 = 2.5
    let field = started(unclamped(), 60.0, 1000.0);
    assert_eq!(field.state().particles.len(), 3);
}

#[test]
fn test_resize_grow_then_shrink_keeps_survivors() {
    let mut field = started(unclamped(), 800.0, 600.0);
    let original = field.state().particles.clone();
    assert_eq!(original.len(), 20);

    field.resize(&StaticContainer::new(Vec2::new(1600.0, 1200.0)));
    assert_eq!(field.state().particles.len(), 80);
    assert_eq!(&field.state().particles[..20], &original[..]);

    field.resize(&StaticContainer::new(Vec2::new(800.0, 600.0)));
    assert_eq!(field.state().particles, original);
}

#[test]
fn test_resize_applies_capped_pixel_ratio_to_canvas() {
    let mut field = started(FieldConfig::fluid(), 400.0, 300.0);
    field.resize(&StaticContainer::new(Vec2::new(400.0, 300.0)).with_pixel_ratio(3.0));
    let canvas = field.surface().unwrap();
    assert_eq!(canvas.physical_size(), (800, 600));
    assert_eq!(canvas.scale(), 2.0);
}

// ============================================================================
// Physics
// ============================================================================

#[test]
fn test_particles_stay_contained() {
    let mut field = started(FieldConfig::fluid(), 640.0, 360.0);
    field.pointer_move(Vec2::new(320.0, 180.0));
    for _ in 0..600 {
        field.advance_frame();
        let bounds = field.state().bounds();
        assert!(field.state().particles.iter().all(|p| p.is_contained(bounds)));
    }
}

#[test]
fn test_wall_crossing_reflects_exactly() {
    let config = FieldConfig::simple();
    let mut state = FieldState::new(&config);
    state.width = 100.0;
    state.height = 100.0;
    state.particles.push(Particle::new(Vec2::new(97.5, 50.0), Vec2::new(1.5, -0.25), 2.0, 1.0));

    physics::step(&mut state, &config);

    let p = state.particles[0];
    assert_eq!(p.position.x, 98.0);
    assert_eq!(p.velocity, Vec2::new(-1.5, -0.25));
}

#[test]
fn test_repulsion_monotonic_and_bounded() {
    let config = FieldConfig::simple();
    let mut state = FieldState::new(&config);
    state.pointer.position = Vec2::ZERO;

    let push = |d: f32| {
        let p = Particle::new(Vec2::new(d, 0.0), Vec2::ZERO, 2.0, 1.0);
        physics::repulsion(&p, &state.pointer, &config).length()
    };

    let mut last = f32::INFINITY;
    for d in [1.0, 10.0, 40.0, 80.0, 109.0] {
        let m = push(d);
        assert!(m < last, "push at {d} = {m}, previous {last}");
        last = m;
    }
    assert_eq!(push(110.0), 0.0);
    assert_eq!(push(200.0), 0.0);
    assert_eq!(push(0.0), 0.0);
}

#[test]
fn test_absent_pointer_does_not_move_particles() {
    let config = FieldConfig::fluid();
    let mut state = FieldState::new(&config);
    state.width = 500.0;
    state.height = 500.0;
    state.particles.push(Particle::new(Vec2::new(250.0, 250.0), Vec2::ZERO, 2.0, 1.0));

    physics::step(&mut state, &config);

    assert_eq!(state.pointer.position, POINTER_ABSENT);
    assert_eq!(state.particles[0].position, Vec2::new(250.0, 250.0));
}

// ============================================================================
// Links
// ============================================================================

#[test]
fn test_links_only_below_threshold() {
    let config = FieldConfig::fluid();
    let mut state = FieldState::new(&config);
    state.width = 1000.0;
    state.height = 1000.0;
    for x in [100.0, 239.0, 379.0, 380.0] {
        state.particles.push(Particle::new(Vec2::new(x, 500.0), Vec2::ZERO, 2.0, 1.0));
    }

    let found: Vec<(usize, usize)> = links(&state, &config).map(|l| (l.a, l.b)).collect();
    // 100-239 is 139 apart; 239-379 is exactly 140 (not linked); 379-380 is 1.
    assert_eq!(found, vec![(0, 1), (2, 3)]);

    let close = links(&state, &config).find(|l| (l.a, l.b) == (2, 3)).unwrap();
    let far = links(&state, &config).find(|l| (l.a, l.b) == (0, 1)).unwrap();
    assert!(close.alpha > far.alpha);
    assert!(close.alpha <= 0.5);
    assert!(far.alpha < 0.01);
}

#[test]
fn test_pointer_parts_links_in_rendered_frame() {
    let mut field = started(FieldConfig::fluid(), 800.0, 600.0);
    field.advance_frame();
    let calm = field.last_stats();
    assert_eq!(calm.broken_links, 0);

    field.pointer_move(Vec2::new(400.0, 300.0));
    field.advance_frame();
    let parted = field.last_stats();
    assert_eq!(parted.links + parted.broken_links, links(field.state(), field.config()).count());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_missing_container_never_starts() {
    let mut field = seeded(FieldConfig::fluid());
    assert!(!field.start(None));
    assert_eq!(field.advance_frame(), 0);
    assert_eq!(field.phase(), Phase::Uninitialized);
}

#[test]
fn test_visibility_pause_freezes_field() {
    let mut field = started(FieldConfig::fluid(), 800.0, 600.0);
    for _ in 0..5 {
        field.advance_frame();
    }

    field.set_visible(false);
    let frozen = field.state().particles.clone();
    let requests = field.scheduler().requests();

    for _ in 0..10 {
        assert_eq!(field.advance_frame(), 0);
    }
    field.resize(&StaticContainer::new(Vec2::new(800.0, 600.0)));
    assert_eq!(field.scheduler().requests(), requests);
    assert_eq!(field.state().particles, frozen);

    field.set_visible(true);
    assert_eq!(field.state().particles, frozen);
    assert_eq!(field.advance_frame(), 1);
    assert_ne!(field.state().particles, frozen);
}

#[test]
fn test_pointer_leave_is_idempotent() {
    let mut field = started(FieldConfig::fluid(), 800.0, 600.0);
    field.pointer_move(Vec2::new(100.0, 100.0));
    field.advance_frame();

    field.pointer_leave();
    let once = field.state().pointer;
    field.pointer_leave();
    field.pointer_leave();

    assert_eq!(field.state().pointer, once);
    assert_eq!(field.state().pointer.position, POINTER_ABSENT);
}

#[test]
fn test_same_seed_same_field() {
    let run = || {
        let mut field = started(FieldConfig::fluid(), 1024.0, 768.0);
        field.pointer_move(Vec2::new(500.0, 400.0));
        for _ in 0..30 {
            field.advance_frame();
        }
        field.state().particles.clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_spawner_respects_profile_radius() {
    let config = FieldConfig::simple();
    let mut spawner = Spawner::seeded(5);
    for _ in 0..50 {
        assert_eq!(spawner.spawn(Vec2::new(300.0, 300.0), &config).radius, 2.0);
    }
}

#[test]
fn test_rendered_frame_has_visible_pixels() {
    let mut field = started(FieldConfig::fluid(), 200.0, 150.0);
    field.advance_frame();
    let canvas = field.surface().unwrap();
    assert_eq!(canvas.physical_size(), (200, 150));
    assert!(canvas.as_bytes().chunks_exact(4).any(|px| px[3] > 0));
}
