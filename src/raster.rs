//! CPU rasterizer implementing [`DrawSurface`].
//!
//! `PixelCanvas` draws into an [`image::RgbaImage`] with straight alpha and
//! source-over compositing, anti-aliasing edges over one physical pixel. The
//! native window host uploads the image to the GPU every frame; headless runs
//! write it out as PNG.

use std::path::Path;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::surface::{Color, DrawSurface};

/// Software 2D canvas backed by an RGBA image.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    image: RgbaImage,
    /// Logical → physical scale from the last `set_scale`.
    scale: f32,
}

impl Default for PixelCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelCanvas {
    /// An empty canvas. Nothing is drawn until the first `resize`.
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            scale: 1.0,
        }
    }

    /// Physical size in pixels.
    pub fn physical_size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes, row-major, 4 bytes per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.image.width() && y < self.image.height() {
            let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
            Some(Color {
                r: r as f32 / 255.0,
                g: g as f32 / 255.0,
                b: b as f32 / 255.0,
                a: a as f32 / 255.0,
            })
        } else {
            None
        }
    }

    /// Encode the canvas as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        self.image.save_with_format(path, image::ImageFormat::Png)
    }

    /// Physical pixel bounds covering a logical box, clipped to the image.
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let min = (min * self.scale).floor().max(Vec2::ZERO);
        let max = (max * self.scale).ceil().min(Vec2::new(w as f32, h as f32));
        if !(min.x < max.x && min.y < max.y) {
            return None;
        }
        Some((min.x as u32, min.y as u32, max.x as u32, max.y as u32))
    }

    /// Source-over blend with coverage in `0..=1`.
    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32) {
        let sa = color.a * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let px = self.image.get_pixel_mut(x, y);
        let Rgba([dr, dg, db, da]) = *px;
        let da = da as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: f32, d: u8| {
            let d = d as f32 / 255.0;
            ((s * sa + d * da * (1.0 - sa)) / out_a).clamp(0.0, 1.0)
        };
        let q = |v: f32| (v * 255.0).round() as u8;
        *px = Rgba([
            q(mix(color.r, dr)),
            q(mix(color.g, dg)),
            q(mix(color.b, db)),
            q(out_a.clamp(0.0, 1.0)),
        ]);
    }
}

impl DrawSurface for PixelCanvas {
    fn resize(&mut self, logical: Vec2, pixel_ratio: f32) {
        let w = (logical.x.max(0.0) * pixel_ratio).floor() as u32;
        let h = (logical.y.max(0.0) * pixel_ratio).floor() as u32;
        if self.image.dimensions() != (w, h) {
            self.image = RgbaImage::new(w, h);
        }
    }

    fn set_scale(&mut self, pixel_ratio: f32) {
        self.scale = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
    }

    fn clear(&mut self, origin: Vec2, size: Vec2) {
        if let Some((x0, y0, x1, y1)) = self.pixel_bounds(origin, origin + size) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let pad = Vec2::splat(radius + 1.0);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(center - pad, center + pad) else {
            return;
        };
        let c = center * self.scale;
        let r = radius * self.scale;
        for y in y0..y1 {
            for x in x0..x1 {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(c);
                let coverage = r - d + 0.5;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        if width <= 0.0 {
            return;
        }
        let pad = Vec2::splat(width * 0.5 + 1.0);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(from.min(to) - pad, from.max(to) + pad) else {
            return;
        };
        let a = from * self.scale;
        let b = to * self.scale;
        let ab = b - a;
        let len_sq = ab.length_squared();
        // Keep hairlines at least one physical pixel wide.
        let half = (width * self.scale * 0.5).max(0.5);
        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > f32::EPSILON {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let d = p.distance(a + ab * t);
                let coverage = half - d + 0.5;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(w: f32, h: f32, ratio: f32) -> PixelCanvas {
        let mut canvas = PixelCanvas::new();
        canvas.resize(Vec2::new(w, h), ratio);
        canvas.set_scale(ratio);
        canvas
    }

    #[test]
    fn test_resize_uses_pixel_ratio() {
        let canvas = canvas(100.5, 50.0, 2.0);
        assert_eq!(canvas.physical_size(), (201, 100));
        assert_eq!(canvas.scale(), 2.0);
    }

    #[test]
    fn test_fill_circle_covers_centre_only() {
        let mut canvas = canvas(20.0, 20.0, 1.0);
        canvas.fill_circle(Vec2::new(10.0, 10.0), 3.0, Color::WHITE);

        let centre = canvas.pixel(10, 10).unwrap();
        assert_eq!(centre.a, 1.0);
        assert_eq!(canvas.pixel(0, 0).unwrap().a, 0.0);
        assert_eq!(canvas.pixel(19, 10).unwrap().a, 0.0);
    }

    #[test]
    fn test_fill_circle_scaled() {
        let mut canvas = canvas(20.0, 20.0, 2.0);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 2.0, Color::WHITE);
        // Logical (5, 5) lands on physical (10, 10).
        assert_eq!(canvas.pixel(10, 10).unwrap().a, 1.0);
        assert_eq!(canvas.pixel(30, 30).unwrap().a, 0.0);
    }

    #[test]
    fn test_stroke_line_alpha() {
        let mut canvas = canvas(50.0, 10.0, 1.0);
        canvas.stroke_line(
            Vec2::new(0.0, 5.0),
            Vec2::new(50.0, 5.0),
            Color::WHITE.with_alpha(0.5),
            1.0,
        );
        let on_line = canvas.pixel(25, 4).unwrap().a + canvas.pixel(25, 5).unwrap().a;
        assert!(on_line > 0.4);
        assert_eq!(canvas.pixel(25, 0).unwrap().a, 0.0);
    }

    #[test]
    fn test_clear_resets_region() {
        let mut canvas = canvas(10.0, 10.0, 1.0);
        canvas.fill_circle(Vec2::new(5.0, 5.0), 4.0, Color::WHITE);
        canvas.clear(Vec2::ZERO, Vec2::new(10.0, 10.0));
        assert!(canvas.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_outside_is_ignored() {
        let mut canvas = canvas(10.0, 10.0, 1.0);
        canvas.fill_circle(Vec2::new(-50.0, -50.0), 3.0, Color::WHITE);
        canvas.stroke_line(Vec2::new(20.0, 20.0), Vec2::new(30.0, 30.0), Color::WHITE, 1.0);
        assert!(canvas.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_canvas_draws_nothing() {
        let mut canvas = PixelCanvas::new();
        canvas.fill_circle(Vec2::new(1.0, 1.0), 1.0, Color::WHITE);
        assert_eq!(canvas.physical_size(), (0, 0));
    }
}
