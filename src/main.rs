//! Standalone pipe viewer.

use std::sync::Arc;

use tubo::engine::PipeRenderEngine;
use tubo::options::Options;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

struct PipeApp {
    window: Option<Arc<Window>>,
    engine: Option<PipeRenderEngine>,
    options: Options,
}

impl PipeApp {
    fn new(options: Options) -> Self {
        Self {
            window: None,
            engine: None,
            options,
        }
    }
}

impl ApplicationHandler for PipeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Tubo")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let engine = pollster::block_on(PipeRenderEngine::new(
            window.clone(),
            (size.width.max(1), size.height.max(1)),
            self.options.clone(),
        ));
        match engine {
            Ok(engine) => {
                self.engine = Some(engine);
                self.window = Some(window);
            }
            Err(e) => {
                log::error!("engine initialization failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                engine.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                match engine.render() {
                    Ok(()) => {}
                    Err(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    ) => {
                        if let Some(window) = &self.window {
                            let size = window.inner_size();
                            engine.resize(size.width, size.height);
                        }
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("out of GPU memory, exiting");
                        event_loop.exit();
                    }
                    Err(e) => log::warn!("surface error: {e}"),
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn load_options() -> Options {
    match std::env::var("TUBO_OPTIONS") {
        Ok(path) => match Options::load(std::path::Path::new(&path)) {
            Ok(options) => {
                log::info!("loaded options from {path}");
                options
            }
            Err(e) => {
                log::error!("failed to load options from {path}: {e}");
                Options::default()
            }
        },
        Err(_) => Options::default(),
    }
}

fn main() {
    env_logger::init();

    let options = load_options();
    if let Err(e) = options.validate() {
        log::error!("{e}");
        std::process::exit(1);
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = PipeApp::new(options);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("event loop error: {e}");
        std::process::exit(1);
    }
}
