//! Browser host.
//!
//! Draws with the page's 2D canvas context and schedules frames with
//! `requestAnimationFrame`. DOM event wiring stays in JavaScript:
//!
//! ```js
//! import init, { WebField } from "./pfe.js";
//!
//! await init();
//! const field = WebField.mount(
//!     "[data-particle-field]",
//!     null,
//!     () => field.frame(),
//!     () => field.pointer_sync(),
//! );
//! if (field) {
//!     new ResizeObserver(() => field.resize()).observe(field.container());
//!     window.addEventListener("resize", () => field.resize());
//!     window.addEventListener("pointermove", (e) => field.pointer_move(e.clientX, e.clientY));
//!     window.addEventListener("pointerleave", () => field.pointer_leave());
//!     document.addEventListener("visibilitychange", () => field.visibility_changed());
//!     window.addEventListener("pageshow", () => field.page_show());
//! }
//! ```

use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::config::FieldConfig;
use crate::engine::{Container, ParticleField};
use crate::input::Rect;
use crate::scheduler::{FrameHandle, FrameScheduler, FrameTask};
use crate::surface::{Color, DrawSurface};

/// Marker attribute of the canvas the field draws into.
const CANVAS_ATTR: &str = "data-particle-field-canvas";

/// Minimum container height when the element has no layout height.
const MIN_FALLBACK_HEIGHT: f64 = 480.0;

/// Share of the viewport height used when the element has no layout height.
const VIEWPORT_HEIGHT_SHARE: f64 = 0.86;

/// `DrawSurface` over a `<canvas>` 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap a canvas. `None` when the browser refuses a 2D context.
    pub fn new(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }
}

impl DrawSurface for CanvasSurface {
    fn resize(&mut self, logical: Vec2, pixel_ratio: f32) {
        self.canvas.set_width((logical.x.max(0.0) * pixel_ratio).floor() as u32);
        self.canvas.set_height((logical.y.max(0.0) * pixel_ratio).floor() as u32);
    }

    fn set_scale(&mut self, pixel_ratio: f32) {
        let s = pixel_ratio as f64;
        if let Err(e) = self.ctx.set_transform(s, 0.0, 0.0, s, 0.0, 0.0) {
            console_warn(&format!("canvas transform rejected: {e:?}"));
        }
    }

    fn clear(&mut self, origin: Vec2, size: Vec2) {
        self.ctx
            .clear_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.begin_path();
        if self
            .ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_ok()
        {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: Color, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
    }
}

/// `requestAnimationFrame` scheduler calling back into JavaScript.
pub struct RafScheduler {
    window: web_sys::Window,
    on_tick: js_sys::Function,
    on_pointer_sync: js_sys::Function,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, task: FrameTask) -> FrameHandle {
        let callback = match task {
            FrameTask::Tick => &self.on_tick,
            FrameTask::PointerSync => &self.on_pointer_sync,
        };
        match self.window.request_animation_frame(callback) {
            Ok(id) => FrameHandle(id as u64),
            Err(e) => {
                console_warn(&format!("requestAnimationFrame failed: {e:?}"));
                // Ids start at 1; 0 is never a live request.
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if handle.0 != 0 {
            if let Err(e) = self.window.cancel_animation_frame(handle.0 as i32) {
                console_warn(&format!("cancelAnimationFrame failed: {e:?}"));
            }
        }
    }
}

/// A DOM element as a field container.
pub struct DomContainer {
    window: web_sys::Window,
    element: HtmlElement,
}

impl Container for DomContainer {
    fn layout_size(&self) -> Vec2 {
        let width = self.element.client_width().max(0) as f64;
        let mut height = self.element.client_height().max(0) as f64;
        if height <= 0.0 {
            let viewport = self
                .window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0);
            height = MIN_FALLBACK_HEIGHT.max(viewport * VIEWPORT_HEIGHT_SHARE);
        }
        Vec2::new(width as f32, height as f32)
    }

    fn bounding_rect(&self) -> Rect {
        let r = self.element.get_bounding_client_rect();
        Rect::new(
            Vec2::new(r.x() as f32, r.y() as f32),
            Vec2::new(r.width() as f32, r.height() as f32),
        )
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio() as f32
    }
}

/// Find the field's canvas inside `container`, creating it as the first
/// child when absent.
/// Warnings go to the browser console; nothing installs a `log` backend here.
fn console_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

fn find_or_create_canvas(document: &Document, container: &HtmlElement) -> Result<HtmlCanvasElement, JsValue> {
    if let Some(existing) = container.query_selector(&format!("canvas[{CANVAS_ATTR}]"))? {
        return existing.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from);
    }

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_attribute(CANVAS_ATTR, "")?;
    canvas.set_attribute("aria-hidden", "true")?;

    let style = canvas.style();
    style.set_property("position", "absolute")?;
    style.set_property("inset", "0")?;
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("pointer-events", "none")?;

    container.insert_before(&canvas, container.first_child().as_ref())?;
    Ok(canvas)
}

/// A particle field mounted on a page element.
#[wasm_bindgen]
pub struct WebField {
    field: ParticleField<CanvasSurface, RafScheduler>,
    container: DomContainer,
}

#[wasm_bindgen]
impl WebField {
    /// Mount a field on the first element matching `selector` and start it.
    ///
    /// Returns `None` when there is no such element. `config_json` overrides
    /// the default profile; `on_tick` and `on_pointer_sync` must call
    /// [`frame`](Self::frame) and [`pointer_sync`](Self::pointer_sync).
    pub fn mount(
        selector: &str,
        config_json: Option<String>,
        on_tick: js_sys::Function,
        on_pointer_sync: js_sys::Function,
    ) -> Result<Option<WebField>, JsValue> {
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => FieldConfig::from_json_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => FieldConfig::default(),
        };

        let Some(window) = web_sys::window() else {
            return Ok(None);
        };
        let Some(document) = window.document() else {
            return Ok(None);
        };
        let Some(element) = document.query_selector(selector)? else {
            return Ok(None);
        };
        let element = element.dyn_into::<HtmlElement>()?;

        let canvas = find_or_create_canvas(&document, &element)?;
        let surface = CanvasSurface::new(canvas);
        if surface.is_none() {
            console_warn(&format!("no 2d context for {selector}, animating without drawing"));
        }

        let scheduler = RafScheduler {
            window: window.clone(),
            on_tick,
            on_pointer_sync,
        };
        let container = DomContainer { window, element };

        let mut field = ParticleField::new(config, surface, scheduler);
        field.set_visible(!document.hidden());
        field.start(Some(&container));

        Ok(Some(WebField { field, container }))
    }

    /// Animation-frame callback for a tick.
    pub fn frame(&mut self) {
        self.field.on_frame(FrameTask::Tick);
    }

    /// Animation-frame callback for a pointer sync.
    pub fn pointer_sync(&mut self) {
        self.field.on_frame(FrameTask::PointerSync);
    }

    pub fn resize(&mut self) {
        self.field.resize(&self.container);
    }

    pub fn pointer_move(&mut self, client_x: f32, client_y: f32) {
        self.field.pointer_move(Vec2::new(client_x, client_y));
    }

    pub fn pointer_leave(&mut self) {
        self.field.pointer_leave();
    }

    /// Re-read `document.hidden` and pause or resume.
    pub fn visibility_changed(&mut self) {
        let hidden = self
            .container
            .window
            .document()
            .map(|d| d.hidden())
            .unwrap_or(false);
        self.field.set_visible(!hidden);
    }

    /// Page restored from the back/forward cache.
    pub fn page_show(&mut self) {
        self.field.refresh_bounds(&self.container);
    }

    pub fn particle_count(&self) -> usize {
        self.field.state().particles.len()
    }

    /// The element the field is mounted on.
    pub fn container(&self) -> HtmlElement {
        self.container.element.clone()
    }
}
