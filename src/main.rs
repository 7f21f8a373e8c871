use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorIcon, Window, WindowId},
};

use tree_backdrop::cli::Cli;
use tree_backdrop::core::{SurfaceRenderer, Viewport, WinitPointerAdapter};
use tree_backdrop::frame::{FixedStepFrames, FrameIterator};
use tree_backdrop::interaction::CursorHint;
use tree_backdrop::render::OffscreenSurface;
use tree_backdrop::theme::{Theme, ThemeAttribute, ThemeSource};
use tree_backdrop::traits::RenderSurface;
use tree_backdrop::{Backdrop, BackdropConfig};

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;
const HEADLESS_WIDTH: u32 = 320;
const HEADLESS_HEIGHT: u32 = 180;

struct App {
    backdrop: Backdrop,
    theme: Rc<ThemeAttribute>,
    window: Option<Arc<Window>>,
    pointer: WinitPointerAdapter,
    frames: FrameIterator,
    cursor: CursorHint,
}

impl App {
    fn new(backdrop: Backdrop, theme: Rc<ThemeAttribute>) -> Self {
        Self {
            backdrop,
            theme,
            window: None,
            pointer: WinitPointerAdapter::new(),
            frames: FrameIterator::new(),
            cursor: CursorHint::Default,
        }
    }

    fn viewport(window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::new(size.width, size.height).with_scale_factor(window.scale_factor())
    }

    fn sync_cursor(&mut self) {
        let cursor = self.backdrop.cursor();
        if cursor == self.cursor {
            return;
        }
        self.cursor = cursor;
        if let Some(window) = &self.window {
            window.set_cursor(match cursor {
                CursorHint::Default => CursorIcon::Default,
                CursorHint::Grab => CursorIcon::Grab,
                CursorHint::Grabbing => CursorIcon::Grabbing,
            });
        }
    }

    fn toggle_theme(&self) {
        let next = Theme::parse(&self.theme.current()).toggled();
        log::info!("switching theme to {next}");
        self.theme.set(next.as_str());
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.backdrop.stop();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Tree Backdrop")
                .with_inner_size(winit::dpi::LogicalSize::new(INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let viewport = Self::viewport(&window);
        let surface_window = Arc::clone(&window);
        let started = self.backdrop.start(
            viewport,
            move |_| {
                let renderer = pollster::block_on(SurfaceRenderer::new(surface_window))?;
                Ok(Box::new(renderer) as Box<dyn RenderSurface>)
            },
            self.theme.clone(),
        );
        if let Err(e) = started {
            log::error!("failed to start backdrop: {e}");
            event_loop.exit();
            return;
        }
        if !self.backdrop.is_started() {
            event_loop.exit();
            return;
        }

        let layout = self.backdrop.layout();
        log::debug!("surface layout {:?}", layout);
        if !layout.captures_pointer {
            if let Err(e) = window.set_cursor_hittest(false) {
                log::debug!("pointer pass-through unsupported: {e}");
            }
        }

        self.frames = FrameIterator::new();
        self.window = Some(window);
        self.sync_cursor();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::KeyT),
                        repeat: false,
                        ..
                    },
                ..
            } => self.toggle_theme(),
            WindowEvent::Resized(size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.backdrop
                    .resize(Viewport::new(size.width, size.height).with_scale_factor(scale_factor));
            }
            WindowEvent::RedrawRequested => {
                if let Some(frame) = self.frames.next() {
                    self.backdrop.frame(&frame);
                }
                if !self.backdrop.is_running() {
                    self.shutdown(event_loop);
                }
            }
            other => {
                if let Some(pointer) = self.pointer.process_event(&other) {
                    self.backdrop.pointer(pointer);
                    self.sync_cursor();
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_headless(mut backdrop: Backdrop, theme: Rc<ThemeAttribute>, frames: u64) -> anyhow::Result<()> {
    let viewport = Viewport::new(HEADLESS_WIDTH, HEADLESS_HEIGHT);
    backdrop
        .start(
            viewport,
            |vp| Ok(Box::new(OffscreenSurface::new(vp.width, vp.height)) as Box<dyn RenderSurface>),
            theme,
        )
        .context("failed to start headless backdrop")?;

    let ticks = backdrop.run(&mut FixedStepFrames::sixty_hz().take_frames(frames));
    let respawned = backdrop.particles().map_or(0, |p| p.total_respawned());
    let report = backdrop.stop().unwrap_or_default();

    println!(
        "Rendered {} frames at {}x{}: {} leaf respawns, released {} geometries and {} materials",
        ticks, viewport.width, viewport.height, respawned, report.geometries, report.materials
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BackdropConfig::load(path).context("failed to load config")?,
        None => BackdropConfig::default(),
    };
    cli.apply(&mut config);

    if cli.print_config {
        println!("{}", config.to_json_pretty());
        return Ok(());
    }

    let theme = Rc::new(ThemeAttribute::new(config.theme.as_str()));
    let backdrop = Backdrop::new(config).context("invalid backdrop config")?;

    if let Some(frames) = cli.headless {
        return run_headless(backdrop, theme, frames);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(backdrop, theme);

    println!("Tree Backdrop - Controls: drag to rotate, T to toggle theme, Escape to quit");
    event_loop.run_app(&mut app)?;

    Ok(())
}
