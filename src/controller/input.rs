/// Platform-agnostic input aggregation: held movement keys, jump latch and
/// smoothed pointer look.
use glam::Vec2;
use tracing::trace;

use crate::config::{ControllerConfig, KeyBindings};

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// DOM `KeyboardEvent.code` naming, e.g. `KeyW`, `Space`.
    KeyDown(String),
    KeyUp(String),
    PointerMove { dx: f32, dy: f32 },
    PointerLockChanged { locked: bool },
    FocusLost,
    VisibilityChanged { visible: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
}

/// Held direction keys plus the look delta gathered since the last read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub look_delta: Vec2,
}

impl InputIntent {
    fn set(&mut self, key: MoveKey, held: bool) {
        match key {
            MoveKey::Forward => self.forward = held,
            MoveKey::Backward => self.backward = held,
            MoveKey::Left => self.left = held,
            MoveKey::Right => self.right = held,
        }
    }

    /// `x = right - left`, `y = forward - backward`, scaled to unit length
    /// so diagonals are no faster than straight lines.
    pub fn direction(&self) -> Vec2 {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        Vec2::new(axis(self.right, self.left), axis(self.forward, self.backward)).normalize_or_zero()
    }
}

/// Clamp-then-exponential smoothing of pointer deltas. Each raw sample is
/// folded in exactly once and then cleared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSmoothing {
    pub raw: Vec2,
    pub smoothed: Vec2,
    pub max_delta: f32,
    pub alpha: f32,
}

impl PointerSmoothing {
    pub fn new(max_delta: f32, alpha: f32) -> Self {
        Self {
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            max_delta,
            alpha: alpha.clamp(f32::EPSILON, 1.0),
        }
    }

    /// Returns the smoothed delta for this sample.
    pub fn fold(&mut self, dx: f32, dy: f32) -> Vec2 {
        let limit = Vec2::splat(self.max_delta);
        self.raw = Vec2::new(dx, dy).clamp(-limit, limit);
        self.smoothed += (self.raw - self.smoothed) * self.alpha;
        self.raw = Vec2::ZERO;
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.raw = Vec2::ZERO;
        self.smoothed = Vec2::ZERO;
    }
}

/// Unified input state fed by the host between ticks.
#[derive(Debug, Clone)]
pub struct InputAggregator {
    bindings: KeyBindings,
    intent: InputIntent,
    smoothing: PointerSmoothing,
    pointer_captured: bool,
    jump_requested: bool,
    jump_held: bool,
}

impl InputAggregator {
    pub fn new(bindings: KeyBindings, config: &ControllerConfig) -> Self {
        Self {
            bindings,
            intent: InputIntent::default(),
            smoothing: PointerSmoothing::new(config.max_pointer_delta, config.pointer_smoothing),
            pointer_captured: false,
            jump_requested: false,
            jump_held: false,
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(code) => self.on_key_down(code),
            InputEvent::KeyUp(code) => self.on_key_up(code),
            InputEvent::PointerMove { dx, dy } => self.on_pointer_move(*dx, *dy),
            InputEvent::PointerLockChanged { locked } => self.set_pointer_captured(*locked),
            InputEvent::FocusLost => self.clear_keys(),
            InputEvent::VisibilityChanged { visible } => {
                if !visible {
                    self.clear_keys();
                }
            }
        }
    }

    pub fn move_key(&self, code: &str) -> Option<MoveKey> {
        let b = &self.bindings;
        if code == b.forward || code == "ArrowUp" {
            Some(MoveKey::Forward)
        } else if code == b.backward || code == "ArrowDown" {
            Some(MoveKey::Backward)
        } else if code == b.left || code == "ArrowLeft" {
            Some(MoveKey::Left)
        } else if code == b.right || code == "ArrowRight" {
            Some(MoveKey::Right)
        } else {
            None
        }
    }

    pub fn is_jump(&self, code: &str) -> bool {
        code == self.bindings.jump
    }

    /// Unknown codes are ignored.
    pub fn on_key_down(&mut self, code: &str) {
        if let Some(key) = self.move_key(code) {
            self.intent.set(key, true);
        } else if self.is_jump(code) {
            if !self.jump_held {
                self.jump_requested = true;
            }
            self.jump_held = true;
        }
    }

    pub fn on_key_up(&mut self, code: &str) {
        if let Some(key) = self.move_key(code) {
            self.intent.set(key, false);
        } else if self.is_jump(code) {
            self.jump_held = false;
        }
    }

    /// Ignored (not buffered) unless the pointer is captured.
    pub fn on_pointer_move(&mut self, dx: f32, dy: f32) {
        if !self.pointer_captured {
            return;
        }
        let smoothed = self.smoothing.fold(dx, dy);
        self.intent.look_delta += smoothed;
        trace!(dx, dy, sx = smoothed.x, sy = smoothed.y, "pointer sample");
    }

    pub fn set_pointer_captured(&mut self, captured: bool) {
        if self.pointer_captured != captured {
            self.smoothing.reset();
        }
        self.pointer_captured = captured;
    }

    pub fn pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    pub fn clear_keys(&mut self) {
        self.intent = InputIntent {
            look_delta: self.intent.look_delta,
            ..InputIntent::default()
        };
        self.jump_requested = false;
        self.jump_held = false;
    }

    pub fn intent(&self) -> &InputIntent {
        &self.intent
    }

    pub fn normalized_intent(&self) -> Vec2 {
        self.intent.direction()
    }

    pub fn smoothing(&self) -> &PointerSmoothing {
        &self.smoothing
    }

    /// Read and zero the accumulated look delta.
    pub fn consume_look(&mut self) -> Vec2 {
        std::mem::take(&mut self.intent.look_delta)
    }

    /// Read and clear the pending jump request.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::InputEvent;
    use winit::event::{DeviceEvent, ElementState, KeyEvent};
    use winit::keyboard::{KeyCode, PhysicalKey};

    /// DOM `code` name for the keys the walkthrough cares about.
    pub fn code_name(code: KeyCode) -> Option<&'static str> {
        Some(match code {
            KeyCode::KeyW => "KeyW",
            KeyCode::KeyA => "KeyA",
            KeyCode::KeyS => "KeyS",
            KeyCode::KeyD => "KeyD",
            KeyCode::Space => "Space",
            KeyCode::ArrowUp => "ArrowUp",
            KeyCode::ArrowDown => "ArrowDown",
            KeyCode::ArrowLeft => "ArrowLeft",
            KeyCode::ArrowRight => "ArrowRight",
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Escape",
            _ => return None,
        })
    }

    pub fn key_to_input(code: KeyCode, state: ElementState) -> Option<InputEvent> {
        let name = code_name(code)?.to_string();
        Some(match state {
            ElementState::Pressed => InputEvent::KeyDown(name),
            ElementState::Released => InputEvent::KeyUp(name),
        })
    }

    pub fn keyboard_event_to_input(event: &KeyEvent) -> Option<InputEvent> {
        match event.physical_key {
            PhysicalKey::Code(code) => key_to_input(code, event.state),
            PhysicalKey::Unidentified(_) => None,
        }
    }

    pub fn device_event_to_input(event: &DeviceEvent) -> Option<InputEvent> {
        match event {
            DeviceEvent::MouseMotion { delta } => Some(InputEvent::PointerMove {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            }),
            _ => None,
        }
    }
}

pub mod wasm {
    use super::InputEvent;
    use web_sys::{KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let code = e.code();
        if is_down {
            InputEvent::KeyDown(code)
        } else {
            InputEvent::KeyUp(code)
        }
    }

    pub fn mouse_move_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerMove {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }
}
