//! Native window host.
//!
//! Runs a field full-window with winit. Frame requests become
//! `request_redraw` calls and are drained on `RedrawRequested`; the CPU
//! canvas is then presented through [`Presenter`]. With
//! `ControlFlow::Wait` the event loop sleeps whenever no frame is
//! outstanding, so an occluded window costs nothing.

use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FieldConfig;
use crate::engine::{Container, ParticleField};
use crate::error::{GpuError, RunError};
use crate::gpu::Presenter;
use crate::input::Rect;
use crate::raster::PixelCanvas;
use crate::scheduler::{FrameHandle, FrameQueue, FrameScheduler, FrameTask};

/// Frame scheduler backed by window redraw requests.
pub struct RedrawScheduler {
    window: Option<Arc<Window>>,
    queue: FrameQueue,
}

impl RedrawScheduler {
    pub fn new(window: Option<Arc<Window>>) -> Self {
        Self {
            window,
            queue: FrameQueue::new(),
        }
    }

    /// Drain the tasks due on this redraw.
    pub fn take_due(&mut self) -> Vec<FrameTask> {
        self.queue.take_due()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self, task: FrameTask) -> FrameHandle {
        // Redraw requests coalesce; one per request is fine.
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        self.queue.push(task)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        // A redraw already requested still arrives; it finds nothing to do.
        self.queue.cancel(handle);
    }
}

/// The window's client area as a field container.
pub struct WindowContainer<'a>(pub &'a Window);

impl Container for WindowContainer<'_> {
    fn layout_size(&self) -> Vec2 {
        let size: LogicalSize<f32> = self.0.inner_size().to_logical(self.0.scale_factor());
        Vec2::new(size.width, size.height)
    }

    fn bounding_rect(&self) -> Rect {
        // Cursor events are already relative to the client area.
        Rect::from_size(self.layout_size())
    }

    fn pixel_ratio(&self) -> f32 {
        self.0.scale_factor() as f32
    }
}

type WindowField = ParticleField<PixelCanvas, RedrawScheduler>;

/// winit application running one full-window field.
pub struct App {
    config: FieldConfig,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    field: Option<WindowField>,
    error: Option<RunError>,
}

impl App {
    pub fn new(config: FieldConfig) -> Self {
        Self {
            config,
            window: None,
            presenter: None,
            field: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title("Particle Field")
            .with_inner_size(LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let presenter = pollster::block_on(Presenter::new(window.clone(), self.config.background))?;

        let mut field = ParticleField::new(
            self.config.clone(),
            Some(PixelCanvas::new()),
            RedrawScheduler::new(Some(window.clone())),
        );
        field.start(Some(&WindowContainer(&window)));

        self.window = Some(window);
        self.presenter = Some(presenter);
        self.field = Some(field);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{error}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self) -> Result<(), GpuError> {
        let (Some(field), Some(presenter)) = (self.field.as_mut(), self.presenter.as_mut()) else {
            return Ok(());
        };

        let due = field.scheduler_mut().take_due();
        let ticked = due.contains(&FrameTask::Tick);
        for task in due {
            field.on_frame(task);
        }

        match field.surface() {
            Some(canvas) if ticked => presenter.present(canvas),
            _ => Ok(()),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(physical_size.width, physical_size.height);
                }
                if let Some(field) = &mut self.field {
                    field.resize(&WindowContainer(&window));
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(field) = &mut self.field {
                    field.resize(&WindowContainer(&window));
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(field) = &mut self.field {
                    let logical = position.to_logical::<f32>(window.scale_factor());
                    field.pointer_move(Vec2::new(logical.x, logical.y));
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(field) = &mut self.field {
                    field.pointer_leave();
                }
            }
            WindowEvent::Occluded(occluded) => {
                if let Some(field) = &mut self.field {
                    field.set_visible(!occluded);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e.into());
                }
            }
            _ => {}
        }
    }
}

/// Open a window and run the field until it is closed.
pub fn run(config: FieldConfig) -> Result<(), RunError> {
    config.validate()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
