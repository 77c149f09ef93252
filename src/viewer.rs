//! Interactive window that runs a [`ParticleEngine`].
//!
//! Controls: drag with the left mouse button to orbit, scroll to zoom,
//! `Space` to pause and `R` to restart the emitter.

use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::engine::ParticleEngine;
use crate::error::ViewerError;
use crate::gpu::ParticleRenderer;
use crate::time::FrameClock;

/// Open a window and run `engine` until it is closed.
pub fn run(engine: ParticleEngine, clock: FrameClock) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(engine, clock);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    engine: ParticleEngine,
    clock: FrameClock,
    window: Option<Arc<Window>>,
    renderer: Option<ParticleRenderer>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl App {
    fn new(engine: ParticleEngine, clock: FrameClock) -> Self {
        Self {
            engine,
            clock,
            window: None,
            renderer: None,
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("{err}");
        self.error = Some(err);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title("Firefly")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let mut renderer = pollster::block_on(ParticleRenderer::new(window.clone()))?;
        self.engine.initialize(&mut renderer)?;

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Rebuild the pool from the current configuration.
    fn restart(&mut self) -> Result<(), ViewerError> {
        let Some(renderer) = &mut self.renderer else {
            return Ok(());
        };
        let config = self.engine.config().clone();
        self.engine.destroy(renderer);
        self.engine.set_values(config)?;
        self.engine.initialize(renderer)?;
        info!("Emitter restarted");
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        self.engine.update(self.clock.tick());
        if let Some(id) = self.engine.mesh_id() {
            if let Err(err) = renderer.upload(id, self.engine.buffers_mut()) {
                warn!("Skipping upload: {err}");
            }
        }

        match renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) => renderer.resize(winit::dpi::PhysicalSize {
                width: renderer.config.width,
                height: renderer.config.height,
            }),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(e) => warn!("Render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.create_window(event_loop) {
                self.fail(event_loop, err);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(renderer) = &mut self.renderer {
                    self.engine.destroy(renderer);
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Space) => {
                        self.clock.toggle_pause();
                        let stats = self.engine.stats();
                        info!(
                            paused = self.clock.is_paused(),
                            alive = stats.alive,
                            pool = stats.pool_size,
                            emitter_age = stats.emitter_age,
                            emitter_alive = stats.emitter_alive,
                            "Toggled pause"
                        );
                    }
                    PhysicalKey::Code(KeyCode::KeyR) => {
                        if let Err(err) = self.restart() {
                            self.fail(event_loop, err);
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        if let Some(renderer) = &mut self.renderer {
                            renderer
                                .camera
                                .orbit((position.x - last_x) as f32, (position.y - last_y) as f32);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(renderer) = &mut self.renderer {
                    renderer.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
