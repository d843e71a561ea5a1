//! The particle field engine.
//!
//! A [`ParticleField`] owns everything for one animated container: its
//! configuration, live [`FieldState`], drawing surface, frame scheduler,
//! pointer tracker and clock. Hosts forward their events to it:
//!
//! | Host event | Call |
//! |---|---|
//! | page ready | [`start`](ParticleField::start) |
//! | container resized, pixel ratio changed | [`resize`](ParticleField::resize) |
//! | page restored from cache | [`refresh_bounds`](ParticleField::refresh_bounds) |
//! | pointer moved | [`pointer_move`](ParticleField::pointer_move) |
//! | pointer left | [`pointer_leave`](ParticleField::pointer_leave) |
//! | visibility changed | [`set_visible`](ParticleField::set_visible) |
//! | scheduled frame fired | [`on_frame`](ParticleField::on_frame) |
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──start──► Sizing ──► Running ◄──set_visible──► Paused
//! ```
//!
//! Resize and pointer events mutate state in place in either `Running` or
//! `Paused`. There is no terminal state.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use pfe::{FieldConfig, ManualScheduler, ParticleField, PixelCanvas, StaticContainer};
//!
//! let container = StaticContainer::new(Vec2::new(800.0, 600.0));
//! let mut field = ParticleField::new(
//!     FieldConfig::fluid().with_seed(1),
//!     Some(PixelCanvas::new()),
//!     ManualScheduler::new(),
//! );
//! assert!(field.start(Some(&container)));
//!
//! for _ in 0..10 {
//!     field.advance_frame();
//! }
//! assert_eq!(field.time().frame(), 10);
//! ```

use glam::Vec2;
use log::{debug, trace};

use crate::config::FieldConfig;
use crate::field::FieldState;
use crate::input::{PointerTracker, Rect};
use crate::physics;
use crate::render::{render, FrameStats};
use crate::scheduler::{FrameLoop, FrameScheduler, FrameTask, ManualScheduler};
use crate::spawn::Spawner;
use crate::surface::DrawSurface;
use crate::time::Time;

/// The host element a field animates within.
pub trait Container {
    /// Current logical (CSS-pixel) size of the layout box.
    fn layout_size(&self) -> Vec2;

    /// Bounding rectangle in the host's pointer coordinate space.
    fn bounding_rect(&self) -> Rect;

    /// Device pixel ratio of the display showing the container.
    fn pixel_ratio(&self) -> f32 {
        1.0
    }
}

/// A container with fixed geometry, for headless runs and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticContainer {
    pub rect: Rect,
    pub pixel_ratio: f32,
}

impl StaticContainer {
    /// Container at the client origin with a pixel ratio of 1.
    pub fn new(size: Vec2) -> Self {
        Self {
            rect: Rect::from_size(size),
            pixel_ratio: 1.0,
        }
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.rect.origin = origin;
        self
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }
}

impl Container for StaticContainer {
    fn layout_size(&self) -> Vec2 {
        self.rect.size
    }

    fn bounding_rect(&self) -> Rect {
        self.rect
    }

    fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}

/// Lifecycle phase of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Sizing,
    Running,
    Paused,
}

/// One animated particle field bound to one container.
pub struct ParticleField<D, S> {
    config: FieldConfig,
    state: FieldState,
    surface: Option<D>,
    frames: FrameLoop<S>,
    pointer: PointerTracker,
    spawner: Spawner,
    time: Time,
    phase: Phase,
    visible: bool,
    pixel_ratio: f32,
    last_stats: FrameStats,
}

impl<D: DrawSurface, S: FrameScheduler> ParticleField<D, S> {
    /// Create an uninitialized field.
    ///
    /// `surface` is `None` when the host could not provide a drawing context;
    /// the field then simulates without rendering.
    pub fn new(config: FieldConfig, surface: Option<D>, scheduler: S) -> Self {
        let state = FieldState::new(&config);
        let spawner = Spawner::from_config(&config);
        Self {
            config,
            state,
            surface,
            frames: FrameLoop::new(scheduler),
            pointer: PointerTracker::new(),
            spawner,
            time: Time::new(),
            phase: Phase::Uninitialized,
            visible: true,
            pixel_ratio: 1.0,
            last_stats: FrameStats::default(),
        }
    }

    /// Replace the frame clock, e.g. with [`Time::fixed`] for reproducible
    /// runs.
    pub fn with_time(mut self, time: Time) -> Self {
        self.time = time;
        self
    }

    /// Bind to a container and start animating.
    ///
    /// Returns `false` without doing anything when the container is missing
    /// or the field has already started. A field hidden before it started
    /// is sized and then waits in `Paused`.
    pub fn start(&mut self, container: Option<&dyn Container>) -> bool {
        let Some(container) = container else {
            debug!("particle field: no container, not starting");
            return false;
        };
        if self.phase != Phase::Uninitialized {
            return false;
        }

        self.phase = Phase::Sizing;
        self.apply_size(container);
        if self.visible {
            self.run();
        } else {
            self.phase = Phase::Paused;
            self.time.pause();
            debug!("particle field started hidden, waiting for visibility");
        }
        debug!(
            "particle field started: {}x{} with {} particles",
            self.state.width,
            self.state.height,
            self.state.particles.len()
        );
        true
    }

    /// Re-measure the container and reconcile the population.
    ///
    /// Ignored before [`start`](Self::start).
    pub fn resize(&mut self, container: &dyn Container) {
        if self.phase == Phase::Uninitialized {
            return;
        }
        self.apply_size(container);
    }

    /// Refresh only the cached bounding rect (page restored from cache,
    /// scroll position changed).
    pub fn refresh_bounds(&mut self, container: &dyn Container) {
        self.pointer.cache_rect(container.bounding_rect());
    }

    /// Record a pointer move in host client coordinates. At most one
    /// pointer-sync frame is outstanding at a time, and none unless running;
    /// a move recorded while paused is applied after resuming.
    pub fn pointer_move(&mut self, client: Vec2) {
        self.pointer.record_move(client);
        if self.phase == Phase::Running {
            self.frames.request_pointer_sync();
        }
    }

    /// The pointer left: disable repulsion and link breaking immediately.
    pub fn pointer_leave(&mut self) {
        self.pointer.clear();
        self.state.pointer.clear();
    }

    /// Pause while hidden, resume with a fresh frame when visible again.
    ///
    /// Before [`start`](Self::start) only the visibility is recorded.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        match (self.phase, visible) {
            (Phase::Running, false) => {
                self.frames.stop();
                self.state.running = false;
                self.time.pause();
                self.phase = Phase::Paused;
                debug!("particle field paused at frame {}", self.time.frame());
            }
            (Phase::Paused, true) => {
                self.time.resume();
                self.run();
                debug!("particle field resumed");
            }
            _ => {}
        }
    }

    /// Entry point for a scheduled frame callback.
    pub fn on_frame(&mut self, task: FrameTask) {
        match task {
            FrameTask::PointerSync => {
                if !self.frames.complete_pointer_sync() {
                    return;
                }
                if let Some(local) = self.pointer.take() {
                    self.state.pointer.position = local;
                }
            }
            FrameTask::Tick => {
                if !self.frames.complete_tick() || self.phase != Phase::Running {
                    return;
                }
                self.step();
                self.render();
                if self.time.tick() {
                    debug!(
                        "particle field: {:.1} fps, {} particles, {} links",
                        self.time.fps(),
                        self.last_stats.particles,
                        self.last_stats.links
                    );
                }
                self.frames.start();
            }
        }
    }

    /// Advance the physics by one frame without rendering or scheduling.
    pub fn step(&mut self) {
        physics::step(&mut self.state, &self.config);
    }

    /// Render the current state. Without a surface nothing is drawn and the
    /// previous stats are reset.
    pub fn render(&mut self) -> FrameStats {
        self.last_stats = match self.surface.as_mut() {
            Some(surface) => render(surface, &self.state, &self.config),
            None => FrameStats::default(),
        };
        trace!("frame stats: {:?}", self.last_stats);
        self.last_stats
    }

    fn run(&mut self) {
        self.phase = Phase::Running;
        self.frames.start();
        if self.pointer.has_pending() {
            self.frames.request_pointer_sync();
        }
        self.state.running = true;
    }

    fn apply_size(&mut self, container: &dyn Container) {
        let size = container.layout_size().max(Vec2::ZERO);
        let ratio = container.pixel_ratio();
        let ratio = if ratio.is_finite() && ratio > 0.0 {
            ratio.min(self.config.max_pixel_ratio)
        } else {
            1.0
        };

        self.state.width = size.x;
        self.state.height = size.y;
        self.pixel_ratio = ratio;

        if let Some(surface) = self.surface.as_mut() {
            surface.resize(size, ratio);
            surface.set_scale(ratio);
        }

        let target = self.config.target_population(self.state.area());
        self.state.reconcile(target, &mut self.spawner, &self.config);
        self.pointer.cache_rect(container.bounding_rect());

        debug!(
            "particle field sized to {}x{} @{}x, {} particles",
            size.x,
            size.y,
            ratio,
            self.state.particles.len()
        );
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a tick frame is scheduled.
    pub fn is_running(&self) -> bool {
        self.frames.is_running()
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Pixel ratio applied at the last resize, after the configured cap.
    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Cached container bounding rect.
    pub fn bounds_rect(&self) -> Rect {
        self.pointer.rect()
    }

    pub fn surface(&self) -> Option<&D> {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &S {
        self.frames.scheduler()
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.frames.scheduler_mut()
    }
}

impl<D: DrawSurface> ParticleField<D, ManualScheduler> {
    /// Run one synthetic frame: dispatch every due task, pointer syncs first.
    /// Returns the number of tasks dispatched.
    pub fn advance_frame(&mut self) -> usize {
        let due = self.scheduler_mut().take_due();
        let count = due.len();
        for task in due {
            self.on_frame(task);
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::POINTER_ABSENT;
    use crate::render::tests::{DrawCall, RecordingSurface};

    type TestField = ParticleField<RecordingSurface, ManualScheduler>;

    fn field(config: FieldConfig) -> TestField {
        ParticleField::new(config.with_seed(7), Some(RecordingSurface::default()), ManualScheduler::new())
    }

    fn container(w: f32, h: f32) -> StaticContainer {
        StaticContainer::new(Vec2::new(w, h))
    }

    #[test]
    fn test_start_without_container_is_noop() {
        let mut field = field(FieldConfig::fluid());
        assert!(!field.start(None));
        assert_eq!(field.phase(), Phase::Uninitialized);
        assert_eq!(field.scheduler().requests(), 0);
        assert!(field.state().particles.is_empty());
    }

    #[test]
    fn test_start_sizes_and_schedules() {
        let mut field = field(FieldConfig::fluid());
        let c = container(1200.0, 800.0).with_pixel_ratio(3.0);
        assert!(field.start(Some(&c)));

        assert_eq!(field.phase(), Phase::Running);
        assert!(field.is_running());
        assert!(field.state().running);
        // 1200 * 800 / 24000 = 40, raised to the fluid minimum.
        assert_eq!(field.state().particles.len(), 56);
        assert_eq!(field.pixel_ratio(), 2.0);
        let surface = field.surface().unwrap();
        assert_eq!(surface.size, Some((Vec2::new(1200.0, 800.0), 2.0)));
        assert_eq!(surface.scale, Some(2.0));
        assert!(field.scheduler().is_pending(FrameTask::Tick));
    }

    #[test]
    fn test_second_start_is_ignored() {
        let mut field = field(FieldConfig::fluid());
        let c = container(800.0, 600.0);
        assert!(field.start(Some(&c)));
        assert!(!field.start(Some(&c)));
        assert_eq!(field.scheduler().requests(), 1);
    }

    #[test]
    fn test_tick_steps_renders_and_reschedules() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        let before = field.state().particles.clone();

        assert_eq!(field.advance_frame(), 1);

        assert_ne!(field.state().particles, before);
        assert_eq!(field.last_stats().particles, before.len());
        assert!(field.scheduler().is_pending(FrameTask::Tick));
        assert_eq!(field.time().frame(), 1);
        let calls = &field.surface().unwrap().calls;
        assert!(matches!(calls[0], DrawCall::Clear(..)));
    }

    #[test]
    fn test_resize_before_start_is_ignored() {
        let mut field = field(FieldConfig::fluid());
        field.resize(&container(800.0, 600.0));
        assert_eq!(field.phase(), Phase::Uninitialized);
        assert!(field.state().particles.is_empty());
    }

    #[test]
    fn test_pointer_moves_coalesce_per_frame() {
        let mut field = field(FieldConfig::fluid());
        let c = container(800.0, 600.0).with_origin(Vec2::new(10.0, 20.0));
        field.start(Some(&c));

        field.pointer_move(Vec2::new(110.0, 120.0));
        field.pointer_move(Vec2::new(210.0, 220.0));
        field.pointer_move(Vec2::new(310.0, 320.0));
        // One tick plus a single pointer sync.
        assert_eq!(field.scheduler().requests(), 2);
        assert!(field.state().pointer.is_absent());

        field.advance_frame();
        assert_eq!(field.state().pointer.position, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_pointer_leave_resets_and_drops_pending() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        field.pointer_move(Vec2::new(100.0, 100.0));
        field.advance_frame();
        assert!(!field.state().pointer.is_absent());

        field.pointer_move(Vec2::new(200.0, 200.0));
        field.pointer_leave();
        field.advance_frame();
        assert_eq!(field.state().pointer.position, POINTER_ABSENT);

        field.pointer_leave();
        assert_eq!(field.state().pointer.position, POINTER_ABSENT);
    }

    #[test]
    fn test_refresh_bounds_changes_translation_only() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        let count = field.state().particles.len();

        let moved = container(800.0, 600.0).with_origin(Vec2::new(0.0, -300.0));
        field.refresh_bounds(&moved);
        field.pointer_move(Vec2::new(50.0, 0.0));
        field.advance_frame();

        assert_eq!(field.state().pointer.position, Vec2::new(50.0, 300.0));
        assert_eq!(field.state().particles.len(), count);
        assert_eq!(field.bounds_rect().origin, Vec2::new(0.0, -300.0));
    }

    #[test]
    fn test_hidden_cancels_and_visible_resumes() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        field.advance_frame();

        field.set_visible(false);
        assert_eq!(field.phase(), Phase::Paused);
        assert!(!field.is_running());
        assert!(!field.state().running);
        assert_eq!(field.scheduler().pending(), 0);

        let requests = field.scheduler().requests();
        let frozen = field.state().particles.clone();
        assert_eq!(field.advance_frame(), 0);
        field.set_visible(false);
        assert_eq!(field.scheduler().requests(), requests);
        assert_eq!(field.state().particles, frozen);

        field.set_visible(true);
        assert_eq!(field.phase(), Phase::Running);
        assert_eq!(field.scheduler().requests(), requests + 1);
        assert_eq!(field.state().particles, frozen);
        field.set_visible(true);
        assert_eq!(field.scheduler().requests(), requests + 1);
    }

    #[test]
    fn test_pointer_move_while_hidden_only_records() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        field.set_visible(false);

        let requests = field.scheduler().requests();
        field.pointer_move(Vec2::new(10.0, 10.0));
        field.pointer_move(Vec2::new(20.0, 30.0));
        assert_eq!(field.scheduler().requests(), requests);
        assert_eq!(field.scheduler().pending(), 0);
        assert!(field.state().pointer.is_absent());

        field.set_visible(true);
        assert!(field.scheduler().is_pending(FrameTask::Tick));
        assert!(field.scheduler().is_pending(FrameTask::PointerSync));
        assert_eq!(field.scheduler().requests(), requests + 2);

        field.advance_frame();
        assert_eq!(field.state().pointer.position, Vec2::new(20.0, 30.0));
    }

    #[test]
    fn test_hiding_cancels_pending_pointer_sync() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        field.pointer_move(Vec2::new(100.0, 100.0));
        assert_eq!(field.scheduler().pending(), 2);

        field.set_visible(false);
        assert_eq!(field.scheduler().pending(), 0);
        assert_eq!(field.scheduler().cancellations(), 2);

        // The sync callback arrives anyway: ignored, position kept for resume.
        field.on_frame(FrameTask::PointerSync);
        assert!(field.state().pointer.is_absent());

        field.set_visible(true);
        field.advance_frame();
        assert_eq!(field.state().pointer.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_start_while_hidden_stays_paused() {
        let mut field = field(FieldConfig::fluid());
        field.set_visible(false);
        assert_eq!(field.phase(), Phase::Uninitialized);

        assert!(field.start(Some(&container(800.0, 600.0))));
        assert_eq!(field.phase(), Phase::Paused);
        assert!(!field.state().running);
        assert_eq!(field.state().particles.len(), 56);
        assert_eq!(field.scheduler().requests(), 0);
        assert_eq!(field.advance_frame(), 0);

        field.set_visible(true);
        assert_eq!(field.phase(), Phase::Running);
        assert!(field.state().running);
        assert_eq!(field.advance_frame(), 1);
        assert_eq!(field.time().frame(), 1);
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(800.0, 600.0)));
        field.set_visible(false);
        let frozen = field.state().particles.clone();

        // A host that already dequeued the callback delivers it anyway.
        field.on_frame(FrameTask::Tick);

        assert_eq!(field.state().particles, frozen);
        assert_eq!(field.scheduler().pending(), 0);
    }

    #[test]
    fn test_resize_while_paused_stays_paused() {
        let mut field = field(FieldConfig::fluid().with_population_bounds(None, None));
        field.start(Some(&container(800.0, 600.0)));
        field.set_visible(false);
        field.resize(&container(1600.0, 600.0));
        assert_eq!(field.phase(), Phase::Paused);
        assert_eq!(field.state().particles.len(), 40);
        assert_eq!(field.scheduler().pending(), 0);
    }

    #[test]
    fn test_missing_surface_keeps_looping() {
        let mut field: ParticleField<RecordingSurface, ManualScheduler> =
            ParticleField::new(FieldConfig::fluid().with_seed(3), None, ManualScheduler::new());
        field.start(Some(&container(800.0, 600.0)));
        let before = field.state().particles.clone();

        field.advance_frame();

        assert_eq!(field.last_stats(), FrameStats::default());
        assert_ne!(field.state().particles, before);
        assert!(field.is_running());
    }

    #[test]
    fn test_degenerate_pixel_ratio_falls_back() {
        let mut field = field(FieldConfig::fluid());
        field.start(Some(&container(100.0, 100.0).with_pixel_ratio(f32::NAN)));
        assert_eq!(field.pixel_ratio(), 1.0);
    }
}
