use std::num::NonZeroU32;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::pacer::FramePacer;
use crate::renderer::Framebuffer;
use crate::scaler::{ScaleLut, blit_nearest, build_scale_lut};
use crate::settings::ViewerSettings;
use crate::world::World;

mod loader;
mod pacer;
mod renderer;
mod scaler;
mod settings;
mod world;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("softbuffer: {0}")]
    Surface(#[from] softbuffer::SoftBufferError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Running,
    Closed,
}

impl RunState {
    /// Returns true only on the Running -> Closed transition.
    fn close(&mut self) -> bool {
        let was_running = *self == RunState::Running;
        *self = RunState::Closed;
        was_running
    }
}

struct App {
    settings: ViewerSettings,
    world: World,
    state: RunState,

    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,

    // Fixed-size logical framebuffer, scaled to the surface on present
    framebuffer: Framebuffer,
    scale_lut: ScaleLut,

    pacer: FramePacer,
    error: Option<AppError>,
}

impl App {
    fn new(settings: ViewerSettings, world: World) -> Self {
        let framebuffer = Framebuffer::new(settings.width as usize, settings.height as usize);
        let pacer = FramePacer::from_fps(settings.target_fps, Instant::now());
        Self {
            settings,
            world,
            state: RunState::Running,
            window: None,
            surface: None,
            framebuffer,
            scale_lut: ScaleLut::empty(),
            pacer,
            error: None,
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.close() {
            log::info!("Close requested; stopping");
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{err}");
        if self.error.is_none() {
            self.error = Some(err);
        }
        self.state.close();
        event_loop.exit();
    }

    fn open_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let attributes = Window::default_attributes()
            .with_title(self.settings.title.as_str())
            .with_inner_size(LogicalSize::new(
                self.settings.width as f64,
                self.settings.height as f64,
            ))
            .with_resizable(false);

        let window = Rc::new(event_loop.create_window(attributes)?);

        let context = softbuffer::Context::new(window.clone())?;
        let surface = softbuffer::Surface::new(&context, window.clone())?;

        let size = window.inner_size();
        log::info!(
            "Opened {}x{} window ({}x{} physical), frame time {:?}",
            self.settings.width,
            self.settings.height,
            size.width,
            size.height,
            self.pacer.frame_time()
        );

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, id: WindowId) -> Result<(), AppError> {
        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return Ok(()),
        };

        let size = window.inner_size();
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            // Minimized window, skip drawing
            self.pacer.skip(Instant::now());
            return Ok(());
        };
        surface.resize(w, h)?;
        let (dw, dh) = (w.get() as usize, h.get() as usize);

        renderer::draw_world(
            &mut self.framebuffer,
            &self.world,
            self.settings.background,
            self.settings.circle_radius,
        );

        if self.scale_lut.dst_size() != (dw, dh) {
            self.scale_lut = build_scale_lut(
                dw,
                dh,
                self.framebuffer.width(),
                self.framebuffer.height(),
            );
        }

        let mut buf = surface.buffer_mut()?;
        blit_nearest(
            &mut buf,
            dw,
            self.framebuffer.pixels(),
            self.framebuffer.width(),
            &self.scale_lut,
        );

        window.pre_present_notify();
        buf.present()?;

        if let Some(fps) = self.pacer.frame_presented(Instant::now()) {
            log::debug!("FPS: {:.1}", fps);
        }
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.state == RunState::Closed {
            return;
        }
        if let Err(err) = self.open_window(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.close(event_loop),

            WindowEvent::RedrawRequested => {
                if self.state == RunState::Closed {
                    return;
                }
                if let Err(err) = self.redraw(id) {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.state == RunState::Closed {
            return;
        }
        let now = Instant::now();
        if self.pacer.is_due(now) {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.pacer.wake_at(now)));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface must go before the window it draws into
        self.surface = None;
        self.window = None;
    }
}

fn run(settings: ViewerSettings, world: World) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(settings, world);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = ViewerSettings::default();

    let world = match loader::load(&settings.world_path) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("{:?} error: {err}", err.kind());
            eprintln!(
                "Failed to load '{}'. Exiting...",
                settings.world_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    if world.is_empty() {
        log::warn!("{} contains no sectors", settings.world_path.display());
    }
    for (i, sector) in world.sectors().iter().enumerate() {
        if sector.color().is_none() {
            log::debug!(
                "Sector {} has {} color components and will not be drawn",
                i,
                sector.colors().len()
            );
        }
    }
    log::info!("{} circles per frame", world.draw_count());

    match run(settings, world) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_state_closes_once() {
        let mut state = RunState::Running;
        assert!(state.close());
        assert_eq!(state, RunState::Closed);
        assert!(!state.close());
        assert_eq!(state, RunState::Closed);
    }

    #[test]
    fn default_settings_match_window_contract() {
        let settings = ViewerSettings::default();
        assert_eq!((settings.width, settings.height), (800, 800));
        assert_eq!(settings.target_fps, 120);
        assert_eq!(settings.circle_radius, 10);
        assert_eq!(settings.background, world::Rgba::BLACK);
        assert_eq!(settings.world_path, std::path::PathBuf::from("test.json"));
    }
}
