use crate::error::Result;
use crate::frame::FrameInfo;
use crate::interaction::InteractionController;
use crate::particles::ParticleSystem;
use crate::scene::SceneGraph;
use crate::traits::RenderPass;
use crate::tree::TreeHandle;

const FPS_UPDATE_INTERVAL: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Everything one tick reads or writes
pub struct FrameContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub tree: &'a TreeHandle,
    pub particles: &'a mut ParticleSystem,
    pub interaction: &'a mut InteractionController,
    pub pass: &'a mut dyn RenderPass,
}

/// Averages frame rate over one-second windows
#[derive(Debug, Default)]
pub struct FpsMeter {
    frame_count: u32,
    timer: f32,
    fps: f32,
}

impl FpsMeter {
    /// Returns the new figure when a window closes
    pub fn update(&mut self, delta: f32) -> Option<f32> {
        self.frame_count += 1;
        self.timer += delta;

        if self.timer >= FPS_UPDATE_INTERVAL {
            self.fps = self.frame_count as f32 / self.timer;
            self.frame_count = 0;
            self.timer = 0.0;
            return Some(self.fps);
        }
        None
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

/// Per-frame driver.
///
/// A tick runs, in order: crown breathing, cluster sway, crown yaw,
/// particle update, interaction smoothing, then exactly one render pass.
/// Once stopped the loop never ticks again.
#[derive(Debug)]
pub struct AnimationLoop {
    state: LoopState,
    ticks: u64,
    fps: FpsMeter,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Running,
            ticks: 0,
            fps: FpsMeter::default(),
        }
    }

    /// Run one frame. Returns `Ok(false)` without touching anything when
    /// the loop is stopped.
    pub fn tick(&mut self, frame: &FrameInfo, ctx: FrameContext<'_>) -> Result<bool> {
        if self.state == LoopState::Stopped {
            return Ok(false);
        }
        let FrameContext {
            scene,
            tree,
            particles,
            interaction,
            pass,
        } = ctx;
        let elapsed = frame.time;

        tree.breathe(scene, elapsed);
        tree.sway_clusters(scene, elapsed);
        tree.drift_crown(scene, elapsed);
        particles.update(scene, frame.delta, elapsed);
        interaction.smooth();
        interaction.apply(scene, tree.root());
        pass.render(scene)?;

        self.ticks += 1;
        if let Some(fps) = self.fps.update(frame.delta) {
            log::debug!("FPS: {:.1}", fps);
        }
        Ok(true)
    }

    pub fn stop(&mut self) {
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Ticks executed since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }
}

impl Default for AnimationLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::interaction::{InteractionConfig, PointerEvent};
    use crate::math::Color;
    use crate::particles::ParticleConfig;
    use crate::scene::{AmbientLight, Camera, Environment, Fog};
    use crate::tree::{breathing_offset, TreeBuilder, TreeProfile};
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Records what the scene looked like when it was rendered
    #[derive(Default)]
    struct Recorder {
        renders: usize,
        yaw_at_render: Vec<f32>,
        fail: bool,
    }

    struct RecordingPass<'a> {
        recorder: &'a mut Recorder,
        root: crate::scene::NodeId,
    }

    impl RenderPass for RecordingPass<'_> {
        fn render(&mut self, scene: &SceneGraph) -> Result<()> {
            if self.recorder.fail {
                return Err(SceneError::Surface("lost".into()));
            }
            self.recorder.renders += 1;
            self.recorder.yaw_at_render.push(scene.transform(self.root).rotation.y);
            Ok(())
        }

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn release(&mut self) {}
    }

    struct Fixture {
        scene: SceneGraph,
        tree: TreeHandle,
        particles: ParticleSystem,
        interaction: InteractionController,
    }

    fn fixture() -> Fixture {
        let camera = Camera::new(Vec3::new(0.0, 3.0, 8.0), Vec3::new(0.0, 3.0, 0.0), 75.0, 1.0, 0.1, 1000.0);
        let mut scene = SceneGraph::new(
            camera,
            Environment {
                background: Color::WHITE,
                fog: Fog {
                    color: Color::WHITE,
                    near: 20.0,
                    far: 50.0,
                },
                ambient: AmbientLight {
                    color: Color::WHITE,
                    intensity: 0.6,
                },
            },
        );
        let mut rng = StdRng::seed_from_u64(21);
        let tree = TreeBuilder::build(&TreeProfile::default(), &mut scene, &mut rng).unwrap();
        let particles = ParticleSystem::build(&ParticleConfig::default(), &mut scene, &mut rng).unwrap();
        let interaction = InteractionController::new(InteractionConfig::default()).unwrap();
        Fixture {
            scene,
            tree,
            particles,
            interaction,
        }
    }

    fn tick(lp: &mut AnimationLoop, f: &mut Fixture, recorder: &mut Recorder, frame: FrameInfo) -> Result<bool> {
        let mut pass = RecordingPass {
            recorder,
            root: f.tree.root(),
        };
        lp.tick(
            &frame,
            FrameContext {
                scene: &mut f.scene,
                tree: &f.tree,
                particles: &mut f.particles,
                interaction: &mut f.interaction,
                pass: &mut pass,
            },
        )
    }

    #[test]
    fn tick_renders_once_after_smoothing() {
        let mut f = fixture();
        let mut lp = AnimationLoop::new();
        let mut recorder = Recorder::default();
        f.interaction.handle(PointerEvent::Down { x: 0.0 });
        f.interaction.handle(PointerEvent::Move { x: 100.0 });

        assert!(tick(&mut lp, &mut f, &mut recorder, FrameInfo::new(0, 0.0, 0.016)).unwrap());

        assert_eq!(recorder.renders, 1);
        assert!((recorder.yaw_at_render[0] - 0.1).abs() < 1e-6);
        assert_eq!(lp.ticks(), 1);
    }

    #[test]
    fn crown_height_at_time_zero_matches_phase() {
        let mut f = fixture();
        let mut lp = AnimationLoop::new();
        let mut recorder = Recorder::default();
        tick(&mut lp, &mut f, &mut recorder, FrameInfo::new(0, 0.0, 0.0)).unwrap();

        for layer in f.tree.layers() {
            let y = f.scene.transform(layer.node).position.y;
            let expected = layer.original_height + layer.phase.sin() * 0.1;
            assert!((y - expected).abs() < 1e-5);
            assert!((y - layer.original_height - breathing_offset(0.0, layer.phase)).abs() < 1e-6);
        }
    }

    #[test]
    fn stopped_loop_never_ticks() {
        let mut f = fixture();
        let mut lp = AnimationLoop::new();
        let mut recorder = Recorder::default();
        lp.stop();
        lp.stop();

        let before = f.scene.transform(f.particles.leaves()[0].node).position;
        assert!(!tick(&mut lp, &mut f, &mut recorder, FrameInfo::new(0, 1.0, 0.016)).unwrap());
        assert_eq!(recorder.renders, 0);
        assert_eq!(f.scene.transform(f.particles.leaves()[0].node).position, before);
        assert_eq!(lp.state(), LoopState::Stopped);
    }

    #[test]
    fn render_error_propagates() {
        let mut f = fixture();
        let mut lp = AnimationLoop::new();
        let mut recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        assert!(tick(&mut lp, &mut f, &mut recorder, FrameInfo::new(0, 0.0, 0.016)).is_err());
        assert_eq!(lp.ticks(), 0);
    }

    #[test]
    fn fps_meter_reports_per_window() {
        let mut meter = FpsMeter::default();
        let mut reported = None;
        for _ in 0..60 {
            reported = reported.or(meter.update(1.0 / 59.0));
        }
        let fps = reported.unwrap();
        assert!(fps > 55.0 && fps < 62.0);
    }
}
