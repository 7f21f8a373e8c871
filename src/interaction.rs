use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, Result, SceneError};
use crate::scene::{NodeId, SceneGraph};

/// Pointer input normalised from mouse and touch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32 },
    Move { x: f32 },
    Up,
    Cancel,
    Leave,
}

/// Cursor the host should show over the backdrop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Grab,
    Grabbing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// When false, pointer events pass through untouched
    pub enabled: bool,
    /// Radians of yaw per pixel dragged
    pub sensitivity: f32,
    /// Fraction of the remaining gap closed per tick, in `(0, 1]`
    pub smoothing: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: 0.01,
            smoothing: 0.1,
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("interaction.sensitivity", self.sensitivity)?;
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(SceneError::invalid(
                "interaction.smoothing",
                format!("{} is outside (0, 1]", self.smoothing),
            ));
        }
        Ok(())
    }
}

/// Drag-to-rotate state for the tree group.
///
/// Events only touch `dragging`, `previous_x` and `target_rotation`;
/// `current_rotation` moves exclusively in [`smooth`](Self::smooth), once
/// per tick, whether or not a drag is in progress.
#[derive(Debug, Clone)]
pub struct InteractionController {
    config: InteractionConfig,
    dragging: bool,
    previous_x: f32,
    target_rotation: f32,
    current_rotation: f32,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            dragging: false,
            previous_x: 0.0,
            target_rotation: 0.0,
            current_rotation: 0.0,
        })
    }

    pub fn handle(&mut self, event: PointerEvent) {
        if !self.config.enabled {
            return;
        }
        match event {
            PointerEvent::Down { x } => {
                self.dragging = true;
                self.previous_x = x;
            }
            PointerEvent::Move { x } => {
                if self.dragging {
                    self.target_rotation += (x - self.previous_x) * self.config.sensitivity;
                    self.previous_x = x;
                }
            }
            PointerEvent::Up | PointerEvent::Cancel | PointerEvent::Leave => {
                self.dragging = false;
            }
        }
    }

    /// Move the current rotation a fixed fraction toward the target
    pub fn smooth(&mut self) -> f32 {
        self.current_rotation += (self.target_rotation - self.current_rotation) * self.config.smoothing;
        self.current_rotation
    }

    /// Write the current rotation as yaw of `node`
    pub fn apply(&self, scene: &mut SceneGraph, node: NodeId) {
        scene.transform_mut(node).rotation.y = self.current_rotation;
    }

    pub fn cursor(&self) -> CursorHint {
        match (self.config.enabled, self.dragging) {
            (false, _) => CursorHint::Default,
            (true, false) => CursorHint::Grab,
            (true, true) => CursorHint::Grabbing,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn target_rotation(&self) -> f32 {
        self.target_rotation
    }

    pub fn current_rotation(&self) -> f32 {
        self.current_rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> InteractionController {
        InteractionController::new(InteractionConfig::default()).unwrap()
    }

    #[test]
    fn drag_accumulates_target() {
        let mut c = controller();
        c.handle(PointerEvent::Down { x: 100.0 });
        c.handle(PointerEvent::Move { x: 150.0 });
        c.handle(PointerEvent::Move { x: 130.0 });
        assert!((c.target_rotation() - 0.3).abs() < 1e-6);
        assert!(c.is_dragging());
        assert_eq!(c.current_rotation(), 0.0);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let mut c = controller();
        c.handle(PointerEvent::Move { x: 500.0 });
        assert_eq!(c.target_rotation(), 0.0);
    }

    #[test]
    fn release_and_leave_end_drag() {
        for end in [PointerEvent::Up, PointerEvent::Cancel, PointerEvent::Leave] {
            let mut c = controller();
            c.handle(PointerEvent::Down { x: 0.0 });
            c.handle(end);
            assert!(!c.is_dragging());
            c.handle(PointerEvent::Move { x: 40.0 });
            assert_eq!(c.target_rotation(), 0.0);
        }
    }

    #[test]
    fn smoothing_converges_geometrically() {
        let mut c = controller();
        c.handle(PointerEvent::Down { x: 0.0 });
        c.handle(PointerEvent::Move { x: 100.0 });
        c.handle(PointerEvent::Up);

        // gap after n ticks is (1 - 0.1)^n of the initial gap
        for _ in 0..10 {
            c.smooth();
        }
        let expected = 1.0 - 0.9f32.powi(10);
        assert!((c.current_rotation() - expected).abs() < 1e-5);

        for _ in 0..200 {
            c.smooth();
        }
        assert!((c.current_rotation() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn cursor_follows_drag_state() {
        let mut c = controller();
        assert_eq!(c.cursor(), CursorHint::Grab);
        c.handle(PointerEvent::Down { x: 0.0 });
        assert_eq!(c.cursor(), CursorHint::Grabbing);

        let disabled = InteractionController::new(InteractionConfig {
            enabled: false,
            ..InteractionConfig::default()
        })
        .unwrap();
        assert_eq!(disabled.cursor(), CursorHint::Default);
    }

    #[test]
    fn disabled_controller_ignores_events() {
        let mut c = InteractionController::new(InteractionConfig {
            enabled: false,
            ..InteractionConfig::default()
        })
        .unwrap();
        c.handle(PointerEvent::Down { x: 0.0 });
        c.handle(PointerEvent::Move { x: 100.0 });
        assert!(!c.is_dragging());
        assert_eq!(c.target_rotation(), 0.0);
    }

    #[test]
    fn smoothing_outside_unit_interval_is_rejected() {
        for smoothing in [0.0, -0.5, 1.5] {
            let config = InteractionConfig {
                smoothing,
                ..InteractionConfig::default()
            };
            assert!(InteractionController::new(config).is_err());
        }
    }
}
