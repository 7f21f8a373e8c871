use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

use crate::interaction::PointerEvent;

/// Adapter that turns Winit mouse and touch events into [`PointerEvent`]s
///
/// Only the left mouse button drives a drag. For touch, the first contact
/// is tracked until it ends; further fingers are ignored.
#[derive(Debug, Clone, Default)]
pub struct WinitPointerAdapter {
    /// Last known cursor x (relative to window)
    cursor_x: Option<f32>,
    /// Touch id currently driving the drag
    active_touch: Option<u64>,
}

impl WinitPointerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a Winit WindowEvent, returning the pointer event it maps to
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::MouseInput { state, button, .. } => self.mouse_button(*state, *button),
            WindowEvent::CursorMoved { position, .. } => Some(self.cursor_moved(position.x as f32)),
            WindowEvent::CursorLeft { .. } => Some(self.cursor_left()),
            WindowEvent::Touch(touch) => self.touch(touch.id, touch.phase, touch.location.x as f32),
            _ => None,
        }
    }

    /// A press with no known cursor position is dropped
    pub fn mouse_button(&mut self, state: ElementState, button: MouseButton) -> Option<PointerEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed => self.cursor_x.map(|x| PointerEvent::Down { x }),
            ElementState::Released => Some(PointerEvent::Up),
        }
    }

    pub fn cursor_moved(&mut self, x: f32) -> PointerEvent {
        self.cursor_x = Some(x);
        PointerEvent::Move { x }
    }

    pub fn cursor_left(&mut self) -> PointerEvent {
        self.cursor_x = None;
        PointerEvent::Leave
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f32) -> Option<PointerEvent> {
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_some() {
                    return None;
                }
                self.active_touch = Some(id);
                Some(PointerEvent::Down { x })
            }
            _ if self.active_touch != Some(id) => None,
            TouchPhase::Moved => Some(PointerEvent::Move { x }),
            TouchPhase::Ended => {
                self.active_touch = None;
                Some(PointerEvent::Up)
            }
            TouchPhase::Cancelled => {
                self.active_touch = None;
                Some(PointerEvent::Cancel)
            }
        }
    }
}
