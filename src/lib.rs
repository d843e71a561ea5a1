//! # PFE - Particle Field Engine
//!
//! Interactive linked-particle backgrounds: a population of drifting points
//! that bounce off the container walls, draw faint links to their neighbours,
//! and part around the pointer.
//!
//! PFE owns the simulation and the render step; the host owns the display.
//! Hosts implement three small traits and forward their events:
//!
//! - [`DrawSurface`] - where a frame is drawn (a 2D canvas, a [`PixelCanvas`])
//! - [`FrameScheduler`] - the host's "call me next frame" primitive
//! - [`Container`] - the size, position and pixel ratio of the animated region
//!
//! Two hosts ship with the crate: a native winit/wgpu window ([`run`]) and,
//! with the `web` feature on `wasm32`, a browser canvas host (`web::WebField`).
//!
//! ## Quick Start
//!
//! ```
//! use pfe::prelude::*;
//!
//! let container = StaticContainer::new(Vec2::new(1280.0, 720.0));
//! let mut field = ParticleField::new(
//!     FieldConfig::fluid().with_seed(42),
//!     Some(PixelCanvas::new()),
//!     ManualScheduler::new(),
//! );
//! field.start(Some(&container));
//!
//! field.pointer_move(Vec2::new(640.0, 360.0));
//! for _ in 0..60 {
//!     field.advance_frame();
//! }
//! assert_eq!(field.state().particles.len(), 56);
//! ```
//!
//! ## Core Concepts
//!
//! ### Population
//!
//! The number of particles follows the container area:
//! `round(area / density)`, clamped to `[min_particles, max_particles]`.
//! Resizing appends or truncates; existing particles are never regenerated.
//!
//! ### Physics
//!
//! Each frame every particle is pushed away from the pointer (linear falloff,
//! scaled by a radius-derived mass factor), moved by its velocity, and
//! reflected off the walls. Particles do not collide with each other.
//!
//! ### Links
//!
//! Any two particles closer than `link_distance` are joined by a line whose
//! opacity fades with distance. A link whose segment passes within
//! `break_radius` of the pointer is not drawn.
//!
//! ### Profiles
//!
//! | Profile | Radius | Mass | Speed |
//! |---|---|---|---|
//! | [`FieldConfig::fluid`] | 1.2..3.4 | inverse radius | faster when smaller |
//! | [`FieldConfig::simple`] | 2 | uniform | uniform |
//!
//! ## Lifecycle
//!
//! `Uninitialized → Sizing → Running ⇄ Paused`. Hidden hosts call
//! `set_visible(false)`: the outstanding frame is cancelled and nothing is
//! requested until the host is visible again.

pub mod config;
pub mod engine;
pub mod error;
pub mod field;
pub mod input;
pub mod links;
pub mod particle;
pub mod physics;
pub mod raster;
pub mod render;
pub mod scheduler;
pub mod spawn;
pub mod surface;
pub mod time;

#[cfg(not(target_arch = "wasm32"))]
pub mod gpu;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use config::{FieldConfig, MassModel};
pub use engine::{Container, ParticleField, Phase, StaticContainer};
pub use error::ConfigError;
#[cfg(not(target_arch = "wasm32"))]
pub use error::{GpuError, RunError};
pub use field::{FieldState, Pointer};
pub use glam::Vec2;
pub use input::{PointerTracker, Rect, POINTER_ABSENT};
pub use links::Link;
pub use particle::Particle;
pub use raster::PixelCanvas;
pub use render::FrameStats;
pub use scheduler::{FrameHandle, FrameLoop, FrameQueue, FrameScheduler, FrameTask, ManualScheduler};
pub use spawn::Spawner;
pub use surface::{Color, DrawSurface};
pub use time::Time;
#[cfg(not(target_arch = "wasm32"))]
pub use window::run;

/// Convenient re-exports for hosts and applications.
///
/// ```
/// use pfe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{FieldConfig, MassModel};
    pub use crate::engine::{Container, ParticleField, Phase, StaticContainer};
    pub use crate::input::Rect;
    pub use crate::raster::PixelCanvas;
    pub use crate::render::FrameStats;
    pub use crate::scheduler::{FrameScheduler, FrameTask, ManualScheduler};
    pub use crate::surface::{Color, DrawSurface};
    pub use crate::time::Time;
    pub use crate::Vec2;
}
