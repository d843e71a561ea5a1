//! The drawing surface the engine renders to.
//!
//! [`DrawSurface`] is the minimal immediate-mode 2D API a host must provide:
//! clear a region, fill a circle, stroke a line, and scale the transform so
//! that every draw call is expressed in logical (CSS-pixel) units.
//!
//! Implementations:
//! - [`PixelCanvas`](crate::raster::PixelCanvas): CPU rasterizer, used by the
//!   native window host and for headless snapshots.
//! - `CanvasSurface` (wasm32, `web` feature): a browser `<canvas>` 2D context.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA colour, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Opaque colour.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same colour with the given alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// 8-bit RGBA, rounding each channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// CSS `rgba(...)` notation.
    pub fn to_css(self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("rgba({},{},{},{:.3})", r, g, b, self.a.clamp(0.0, 1.0))
    }
}

/// Immediate-mode 2D drawing target.
///
/// Coordinates passed to the drawing calls are logical units; the surface is
/// responsible for mapping them to its physical pixels after
/// [`set_scale`](DrawSurface::set_scale).
pub trait DrawSurface {
    /// Resize the backing store for a logical size at the given pixel ratio.
    ///
    /// The physical size is `floor(logical * pixel_ratio)` on each axis.
    fn resize(&mut self, logical: Vec2, pixel_ratio: f32);

    /// Reset the transform to identity, then scale by `pixel_ratio`.
    fn set_scale(&mut self, pixel_ratio: f32);

    /// Clear a logical rectangle to fully transparent.
    fn clear(&mut self, origin: Vec2, size: Vec2);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);

    /// Stroke a straight line.
    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32);
}
