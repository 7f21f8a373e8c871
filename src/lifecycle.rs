//! Start/stop of the whole backdrop.
//!
//! [`Backdrop`] owns at most one [`SceneState`]. `start` builds it, `stop`
//! tears it down in a fixed order: cancel the loop, unsubscribe from the
//! theme source, release every geometry and material, release the surface.
//! Both calls are idempotent.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{AnimationLoop, FrameContext};
use crate::config::BackdropConfig;
use crate::core::{SurfaceLayout, Viewport};
use crate::error::{Result, SceneError};
use crate::frame::FrameInfo;
use crate::interaction::{CursorHint, InteractionController, PointerEvent};
use crate::particles::ParticleSystem;
use crate::render::Presenter;
use crate::scene::{DisposeReport, SceneGraph};
use crate::theme::{Theme, ThemeBinder, ThemeSource};
use crate::traits::{FrameSource, RenderPass, RenderSurface};
use crate::tree::{TreeBuilder, TreeHandle};

/// Everything that exists only between `start` and `stop`
struct SceneState {
    scene: SceneGraph,
    tree: TreeHandle,
    particles: ParticleSystem,
    interaction: InteractionController,
    theme: ThemeBinder,
    animation: AnimationLoop,
    pass: Box<dyn RenderPass>,
    viewport: Viewport,
}

pub struct Backdrop {
    config: BackdropConfig,
    state: Option<SceneState>,
}

impl Backdrop {
    pub fn new(config: BackdropConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, state: None })
    }

    pub fn config(&self) -> &BackdropConfig {
        &self.config
    }

    /// Build the scene and start animating.
    ///
    /// Calling `start` on a started backdrop does nothing. When
    /// `create_surface` reports [`SceneError::RenderUnavailable`] the
    /// backdrop logs a warning and stays inactive; this is not an error.
    pub fn start<F>(&mut self, viewport: Viewport, create_surface: F, theme: Rc<dyn ThemeSource>) -> Result<()>
    where
        F: FnOnce(Viewport) -> Result<Box<dyn RenderSurface>>,
    {
        if self.state.is_some() {
            log::debug!("backdrop already started");
            return Ok(());
        }

        let surface = match create_surface(viewport) {
            Ok(surface) => surface,
            Err(SceneError::RenderUnavailable(reason)) => {
                log::warn!("backdrop disabled, rendering unavailable: {reason}");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let mut pass: Box<dyn RenderPass> = Box::new(Presenter::new(surface));
        pass.resize(viewport.width, viewport.height);

        match self.build_state(viewport, pass, theme) {
            Ok(state) => {
                log::info!(
                    "backdrop started: {}x{}, {} meshes, theme {}",
                    viewport.width,
                    viewport.height,
                    state.scene.mesh_count(),
                    state.theme.current()
                );
                self.state = Some(state);
                Ok(())
            }
            Err((mut pass, e)) => {
                pass.release();
                Err(e)
            }
        }
    }

    /// On failure the render pass is handed back so the caller can release it
    #[allow(clippy::result_large_err)]
    fn build_state(
        &self,
        viewport: Viewport,
        pass: Box<dyn RenderPass>,
        theme: Rc<dyn ThemeSource>,
    ) -> std::result::Result<SceneState, (Box<dyn RenderPass>, SceneError)> {
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        log::debug!("scene seed {seed}");
        let mut rng = StdRng::seed_from_u64(seed);

        let environment = config.theme.palette().environment();
        let mut scene = SceneGraph::new(config.camera.camera(viewport.aspect()), environment);
        scene.lights = config.lighting.directional.iter().map(|&l| l.into()).collect();

        let built = TreeBuilder::build(&config.tree, &mut scene, &mut rng).and_then(|tree| {
            let particles = ParticleSystem::build(&config.leaves, &mut scene, &mut rng)?;
            let interaction = InteractionController::new(config.interaction)?;
            Ok((tree, particles, interaction))
        });
        let (tree, particles, interaction) = match built {
            Ok(parts) => parts,
            Err(e) => {
                scene.dispose();
                return Err((pass, e));
            }
        };

        let mut binder = ThemeBinder::new(scene.environment());
        binder.bind(theme);

        Ok(SceneState {
            scene,
            tree,
            particles,
            interaction,
            theme: binder,
            animation: AnimationLoop::new(),
            pass,
            viewport,
        })
    }

    /// Run one tick. A failing tick is logged and stops the backdrop.
    /// Returns whether a tick ran.
    pub fn frame(&mut self, frame: &FrameInfo) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let ctx = FrameContext {
            scene: &mut state.scene,
            tree: &state.tree,
            particles: &mut state.particles,
            interaction: &mut state.interaction,
            pass: &mut *state.pass,
        };
        match state.animation.tick(frame, ctx) {
            Ok(ran) => ran,
            Err(e) => {
                log::error!("frame {} failed, stopping backdrop: {e}", frame.number);
                self.stop();
                false
            }
        }
    }

    /// Drive ticks from `frames` until the source ends or the backdrop
    /// stops. Returns the number of ticks run.
    pub fn run(&mut self, frames: &mut dyn FrameSource) -> u64 {
        let mut ticks = 0;
        while self.is_running() {
            let Some(frame) = frames.next() else {
                break;
            };
            if self.frame(&frame) {
                ticks += 1;
            }
        }
        ticks
    }

    /// Track a new viewport size. Zero-area viewports are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            return;
        }
        if let Some(state) = self.state.as_mut() {
            state.scene.camera.set_aspect(viewport.width, viewport.height);
            state.pass.resize(viewport.width, viewport.height);
            state.viewport = viewport;
        }
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        if let Some(state) = self.state.as_mut() {
            state.interaction.handle(event);
        }
    }

    /// Tear everything down. Returns what was released, or `None` when
    /// there was nothing to stop.
    pub fn stop(&mut self) -> Option<DisposeReport> {
        let mut state = self.state.take()?;
        state.animation.stop();
        state.theme.unbind();
        let report = state.scene.dispose();
        state.pass.release();
        log::info!(
            "backdrop stopped after {} ticks: released {} geometries, {} materials",
            state.animation.ticks(),
            report.geometries,
            report.materials
        );
        Some(report)
    }

    pub fn is_started(&self) -> bool {
        self.state.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.animation.is_running())
    }

    pub fn cursor(&self) -> CursorHint {
        self.state
            .as_ref()
            .map_or(CursorHint::Default, |s| s.interaction.cursor())
    }

    pub fn layout(&self) -> SurfaceLayout {
        SurfaceLayout::backdrop(self.config.interaction.enabled)
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.state.as_ref().map(|s| s.viewport)
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.state.as_ref().map(|s| &s.scene)
    }

    pub fn tree(&self) -> Option<&TreeHandle> {
        self.state.as_ref().map(|s| &s.tree)
    }

    pub fn particles(&self) -> Option<&ParticleSystem> {
        self.state.as_ref().map(|s| &s.particles)
    }

    pub fn interaction(&self) -> Option<&InteractionController> {
        self.state.as_ref().map(|s| &s.interaction)
    }

    pub fn theme(&self) -> Option<Theme> {
        self.state.as_ref().map(|s| s.theme.current())
    }

    pub fn ticks(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.animation.ticks())
    }
}

impl Drop for Backdrop {
    fn drop(&mut self) {
        self.stop();
    }
}
