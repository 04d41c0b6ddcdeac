//! LearnOpenGL harness: window, GL context and the frame loop.
//!
//! winit drives the event loop via `ApplicationHandler` in `Poll` mode. Input
//! events are folded into `InputState` as they arrive; once the queue is
//! drained (`about_to_wait`) one frame runs:
//!
//!   1. `FramePacer::begin_frame()` -- delta of the previous iteration
//!   2. `Scene::update()` -- one-time setup on the first call, then a frame
//!   3. swap buffers, clear per-frame input edges
//!   4. sleep out the rest of the frame budget, refresh the title
//!
//! Context creation and scene setup failures are fatal: they are logged, shown
//! in an OS dialog and the process exits with status 1.

#![cfg_attr(not(windows), allow(dead_code))]

mod keys;
mod title;

#[cfg(windows)]
fn main() {
    use winit::event_loop::{ControlFlow, EventLoop};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("LearnOpenGL harness starting...");

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::default();
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }
    if app.failed() {
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::error!("The OpenGL harness needs WGL and only runs on Windows");
    std::process::exit(1);
}

#[cfg(windows)]
mod app {
    use anyhow::Context;
    use lgl_core::arena::Arena;
    use lgl_core::input::{InputState, Key};
    use lgl_core::time::{FramePacer, TitleTimer};
    use lgl_platform::{
        process_memory, show_fatal_error, ContextRequest, GraphicsContext, PixelFormatRequest,
        PlatformConfig,
    };
    use lgl_render::gl::{check_version, resize_viewport};
    use lgl_render::{FrameInput, GlFunctions, Scene, SceneAssets};
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, WindowEvent};
    use winit::event_loop::ActiveEventLoop;
    use winit::keyboard::PhysicalKey;
    use winit::window::WindowId;

    use crate::keys::{flip_y, map_key, map_mouse_button};
    use crate::title::format_title;

    const STORAGE_BYTES: usize = 8 * 1024 * 1024;
    const SCRATCH_BYTES: usize = 4 * 1024 * 1024;

    /// Everything that exists once the context is up.
    struct Runtime {
        ctx: GraphicsContext,
        gl: GlFunctions,
        scene: Scene,
        input: InputState,
        pacer: FramePacer,
        title_timer: TitleTimer,
        storage: Arena,
        scratch: Arena,
    }

    impl Runtime {
        fn new(event_loop: &ActiveEventLoop, config: &PlatformConfig) -> anyhow::Result<Self> {
            let request = ContextRequest::default();
            let ctx = GraphicsContext::bootstrap(
                event_loop,
                config,
                &PixelFormatRequest::default(),
                &request,
            )
            .context("OpenGL context creation failed")?;

            let gl = GlFunctions::load(|name| ctx.proc_address(name))
                .context("OpenGL function loading failed")?;
            check_version(&gl, request.version).context("unsupported OpenGL driver")?;

            let size = ctx.window().inner_size();
            resize_viewport(&gl, size.width, size.height);

            Ok(Self {
                ctx,
                gl,
                scene: Scene::new(SceneAssets::default()),
                input: InputState::new(size.width, size.height),
                pacer: FramePacer::default(),
                title_timer: TitleTimer::default(),
                storage: Arena::with_capacity(STORAGE_BYTES),
                scratch: Arena::with_capacity(SCRATCH_BYTES),
            })
        }

        fn frame(&mut self, title: &str) -> anyhow::Result<()> {
            let dt = self.pacer.begin_frame();
            let frame_input = FrameInput::from_input(&self.input, dt);
            self.scene
                .update(&self.gl, &frame_input, &mut self.storage, &mut self.scratch)
                .context("scene setup failed")?;
            self.ctx.swap_buffers();
            self.input.end_frame();
            self.pacer.end_frame();

            if self.title_timer.tick(self.pacer.frame_dt() as f32) {
                self.ctx.window().set_title(&format_title(
                    title,
                    self.pacer.frame_ms(),
                    self.pacer.fps(),
                    process_memory(),
                ));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct App {
        config: PlatformConfig,
        runtime: Option<Runtime>,
        failed: bool,
    }

    impl App {
        pub fn failed(&self) -> bool {
            self.failed
        }

        fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
            let message = format!("{err:#}");
            log::error!("{}", message);
            show_fatal_error(&self.config.title, &message);
            self.failed = true;
            self.runtime = None;
            event_loop.exit();
        }
    }

    impl ApplicationHandler for App {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.runtime.is_some() || self.failed {
                return;
            }
            match Runtime::new(event_loop, &self.config) {
                Ok(runtime) => self.runtime = Some(runtime),
                Err(err) => self.fail(event_loop, err),
            }
        }

        fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
            let Some(runtime) = self.runtime.as_mut() else {
                return;
            };
            if let Err(err) = runtime.frame(&self.config.title) {
                self.fail(event_loop, err);
            }
        }

        fn window_event(
            &mut self,
            event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            event: WindowEvent,
        ) {
            let Some(runtime) = self.runtime.as_mut() else {
                return;
            };

            match event {
                WindowEvent::CloseRequested => {
                    log::info!("Close requested, exiting.");
                    event_loop.exit();
                }

                WindowEvent::Resized(size) => {
                    if resize_viewport(&runtime.gl, size.width, size.height) {
                        runtime.input.screen_size = (size.width, size.height);
                        log::info!("Resized to {}x{}", size.width, size.height);
                    }
                }

                WindowEvent::KeyboardInput { event, .. } => {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if let Some(key) = map_key(key_code) {
                            match event.state {
                                ElementState::Pressed => runtime.input.key_down(key),
                                ElementState::Released => runtime.input.key_up(key),
                            }
                            if key == Key::Escape && event.state == ElementState::Pressed {
                                log::info!("Escape pressed, exiting.");
                                event_loop.exit();
                            }
                        }
                    }
                }

                WindowEvent::MouseInput { state, button, .. } => {
                    if let Some(button) = map_mouse_button(button) {
                        match state {
                            ElementState::Pressed => runtime.input.mouse_down(button),
                            ElementState::Released => runtime.input.mouse_up(button),
                        }
                    }
                }

                WindowEvent::CursorMoved { position, .. } => {
                    let (_, height) = runtime.input.screen_size;
                    runtime
                        .input
                        .set_mouse_position(position.x as f32, flip_y(position.y, height));
                }

                _ => {}
            }
        }
    }
}
