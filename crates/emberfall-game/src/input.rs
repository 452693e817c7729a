//! Input system with action-based mapping
//!
//! Raw winit keyboard and mouse events are mapped to [`InputAction`]s and turned into
//! discrete [`InputEvent`]s for the event bus.

use std::collections::{HashMap, HashSet};

use emberfall_core::Vec2;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::events::{EventBus, InputEvent};

/// Game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Move forward (W by default)
    MoveForward,
    /// Move backward (S by default)
    MoveBackward,
    /// Move left (A by default)
    MoveLeft,
    /// Move right (D by default)
    MoveRight,
    /// Jump (Space by default)
    Jump,
    /// Cast the magic attack (F or right mouse button by default)
    Attack,
    /// Interact with whatever is in range (E by default)
    Interact,
    /// Pick a target under the cursor (left mouse button by default)
    Select,
}

/// Binding of a physical key to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(u32), // 0 = left, 1 = right, 2 = middle
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

/// Maps physical inputs to game actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<InputBinding, InputAction>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);

        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Space, InputAction::Jump);
        bindings.bind(KeyCode::KeyF, InputAction::Attack);
        bindings.bind(KeyCode::KeyE, InputAction::Interact);

        bindings.bind_mouse(0, InputAction::Select);
        bindings.bind_mouse(1, InputAction::Attack);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.bindings.insert(InputBinding::Key(key), action);
    }

    /// Bind a mouse button to an action
    pub fn bind_mouse(&mut self, button: u32, action: InputAction) {
        self.bindings.insert(InputBinding::Mouse(button), action);
    }

    /// Get the action for a binding, if any
    pub fn get_action(&self, binding: &InputBinding) -> Option<InputAction> {
        self.bindings.get(binding).copied()
    }
}

/// Turns raw device events into discrete input events
#[derive(Debug, Default)]
pub struct InputHandler {
    /// Input bindings
    pub bindings: InputBindings,
    /// Actions currently held down
    held: HashSet<InputAction>,
    /// Last move axis that was reported
    move_axis: Vec2,
    /// Cursor position in window pixels
    cursor: Vec2,
    /// Events produced since the last flush
    pending: Vec<InputEvent>,
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// The normalized move axis built from the held direction actions
    pub fn move_axis(&self) -> Vec2 {
        self.move_axis
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            if let Some(action) = self.bindings.get_action(&InputBinding::Key(key_code)) {
                self.apply(action, state);
            }
        }
    }

    /// Handle a mouse button event
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let button_id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(id) => id as u32,
        };

        if let Some(action) = self.bindings.get_action(&InputBinding::Mouse(button_id)) {
            self.apply(action, state);
        }
    }

    /// Handle cursor movement (window pixels, origin top-left)
    pub fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        self.cursor = Vec2::new(x as f32, y as f32);
    }

    /// Drop held state, e.g. when the window loses focus. Reports a zero move axis if needed.
    pub fn release_all(&mut self) {
        self.held.clear();
        self.refresh_move_axis();
    }

    /// Take the events produced since the last call
    pub fn take_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Publish all pending events to the bus
    pub fn flush(&mut self, bus: &mut EventBus<InputEvent>) {
        for event in self.take_events() {
            bus.publish(event);
        }
    }

    fn apply(&mut self, action: InputAction, state: ElementState) {
        match state {
            ElementState::Pressed => {
                // Key repeat arrives as further presses while held
                if !self.held.insert(action) {
                    return;
                }
                match action {
                    InputAction::Jump => self.pending.push(InputEvent::JumpPressed),
                    InputAction::Attack => self.pending.push(InputEvent::AttackPressed),
                    InputAction::Interact => self.pending.push(InputEvent::InteractPressed),
                    InputAction::Select => self.pending.push(InputEvent::PointerClicked(self.cursor)),
                    _ => self.refresh_move_axis(),
                }
            }
            ElementState::Released => {
                if self.held.remove(&action) {
                    self.refresh_move_axis();
                }
            }
        }
    }

    fn refresh_move_axis(&mut self) {
        let axis = |positive: InputAction, negative: InputAction| {
            let mut value = 0.0;
            if self.is_held(positive) {
                value += 1.0;
            }
            if self.is_held(negative) {
                value -= 1.0;
            }
            value
        };

        let raw = Vec2::new(
            axis(InputAction::MoveRight, InputAction::MoveLeft),
            axis(InputAction::MoveForward, InputAction::MoveBackward),
        );
        let normalized = raw.normalize_or_zero();

        if normalized != self.move_axis {
            self.move_axis = normalized;
            self.pending.push(InputEvent::MoveChanged(normalized));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(handler: &mut InputHandler, code: KeyCode, state: ElementState) {
        handler.handle_keyboard(PhysicalKey::Code(code), state);
    }

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.get_action(&KeyCode::KeyW.into()),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.get_action(&KeyCode::Space.into()),
            Some(InputAction::Jump)
        );
        assert_eq!(
            bindings.get_action(&InputBinding::Mouse(0)),
            Some(InputAction::Select)
        );
    }

    #[test]
    fn test_move_axis_is_performed_and_canceled() {
        let mut handler = InputHandler::new();
        key(&mut handler, KeyCode::KeyD, ElementState::Pressed);
        key(&mut handler, KeyCode::KeyD, ElementState::Released);

        assert_eq!(
            handler.take_events(),
            vec![
                InputEvent::MoveChanged(Vec2::X),
                InputEvent::MoveChanged(Vec2::ZERO),
            ]
        );
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut handler = InputHandler::new();
        key(&mut handler, KeyCode::KeyW, ElementState::Pressed);
        key(&mut handler, KeyCode::KeyA, ElementState::Pressed);

        let axis = handler.move_axis();
        assert!((axis.length() - 1.0).abs() < 1e-5);
        assert!(axis.x < 0.0 && axis.y > 0.0);
        assert_eq!(handler.take_events().len(), 2);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut handler = InputHandler::new();
        key(&mut handler, KeyCode::KeyW, ElementState::Pressed);
        key(&mut handler, KeyCode::KeyS, ElementState::Pressed);
        assert_eq!(handler.move_axis(), Vec2::ZERO);
    }

    #[test]
    fn test_key_repeat_is_not_reemitted() {
        let mut handler = InputHandler::new();
        key(&mut handler, KeyCode::Space, ElementState::Pressed);
        key(&mut handler, KeyCode::Space, ElementState::Pressed);
        key(&mut handler, KeyCode::Space, ElementState::Released);
        key(&mut handler, KeyCode::Space, ElementState::Pressed);

        assert_eq!(
            handler.take_events(),
            vec![InputEvent::JumpPressed, InputEvent::JumpPressed]
        );
    }

    #[test]
    fn test_click_reports_cursor_position() {
        let mut handler = InputHandler::new();
        handler.handle_cursor_moved(640.0, 360.0);
        handler.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        handler.handle_mouse_button(MouseButton::Right, ElementState::Pressed);

        assert_eq!(
            handler.take_events(),
            vec![
                InputEvent::PointerClicked(Vec2::new(640.0, 360.0)),
                InputEvent::AttackPressed,
            ]
        );
    }

    #[test]
    fn test_flush_publishes_to_bus() {
        let mut handler = InputHandler::new();
        let mut bus = EventBus::new();
        let player = emberfall_core::EntityId::new();
        bus.attach(player);

        key(&mut handler, KeyCode::KeyE, ElementState::Pressed);
        handler.flush(&mut bus);

        assert_eq!(bus.drain(player), vec![InputEvent::InteractPressed]);
        assert!(handler.take_events().is_empty());
    }

    #[test]
    fn test_release_all_zeroes_axis() {
        let mut handler = InputHandler::new();
        key(&mut handler, KeyCode::KeyW, ElementState::Pressed);
        handler.take_events();
        handler.release_all();
        assert_eq!(handler.take_events(), vec![InputEvent::MoveChanged(Vec2::ZERO)]);
    }
}
