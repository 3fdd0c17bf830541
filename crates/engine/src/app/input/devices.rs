use std::collections::{HashMap, HashSet};

use tracing::debug;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::app::events::{EngineEvent, GamepadAxis};
use crate::app::rendering::Vec2;

/// Live, pollable device readings. Bindings and the button resolver only
/// ever read through this trait.
pub trait DeviceState {
    fn is_key_down(&self, key: KeyCode) -> bool;
    fn is_pointer_down(&self, button: MouseButton) -> bool;
    fn is_gamepad_button_down(&self, gamepad: u32, hardware_button: u32) -> bool;
    /// Normalised to [-1, 1]; disconnected pads read 0.
    fn gamepad_axis(&self, gamepad: u32, axis: GamepadAxis) -> f32;
    fn gamepad_vendor_id(&self, gamepad: u32) -> Option<u16>;
    fn is_gamepad_connected(&self, gamepad: u32) -> bool;
    /// Last known pointer position in frame pixels, if it has entered the
    /// window.
    fn pointer_position(&self) -> Option<Vec2>;
}

#[derive(Debug, Clone, Default)]
struct GamepadReadings {
    vendor_id: Option<u16>,
    buttons: HashSet<u32>,
    axes: HashMap<GamepadAxis, f32>,
}

/// Device state folded from the platform event stream.
#[derive(Debug, Clone, Default)]
pub struct InputDevices {
    keys: HashSet<KeyCode>,
    pointer_buttons: HashSet<MouseButton>,
    pointer_position: Option<Vec2>,
    gamepads: HashMap<u32, GamepadReadings>,
}

impl InputDevices {
    pub fn apply(&mut self, event: &EngineEvent) {
        match *event {
            EngineEvent::KeyPressed { key, .. } => {
                self.keys.insert(key);
            }
            EngineEvent::KeyReleased { key } => {
                self.keys.remove(&key);
            }
            EngineEvent::PointerMoved { position } => {
                self.pointer_position = Some(position);
            }
            EngineEvent::PointerPressed { button } => {
                self.pointer_buttons.insert(button);
            }
            EngineEvent::PointerReleased { button } => {
                self.pointer_buttons.remove(&button);
            }
            // Releases are never delivered to an unfocused window.
            EngineEvent::FocusLost => {
                self.keys.clear();
                self.pointer_buttons.clear();
            }
            EngineEvent::GamepadConnected { gamepad, vendor_id } => {
                debug!(gamepad, ?vendor_id, "gamepad_state_reset");
                self.gamepads.insert(
                    gamepad,
                    GamepadReadings {
                        vendor_id,
                        ..GamepadReadings::default()
                    },
                );
            }
            EngineEvent::GamepadDisconnected { gamepad } => {
                self.gamepads.remove(&gamepad);
            }
            EngineEvent::GamepadButtonPressed { gamepad, button } => {
                self.gamepads
                    .entry(gamepad)
                    .or_default()
                    .buttons
                    .insert(button);
            }
            EngineEvent::GamepadButtonReleased { gamepad, button } => {
                if let Some(readings) = self.gamepads.get_mut(&gamepad) {
                    readings.buttons.remove(&button);
                }
            }
            EngineEvent::GamepadAxisMoved {
                gamepad,
                axis,
                value,
            } => {
                self.gamepads
                    .entry(gamepad)
                    .or_default()
                    .axes
                    .insert(axis, value.clamp(-1.0, 1.0));
            }
            EngineEvent::Closed
            | EngineEvent::Resized { .. }
            | EngineEvent::FocusGained
            | EngineEvent::PointerWheel { .. } => {}
        }
    }
}

impl DeviceState for InputDevices {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    fn is_pointer_down(&self, button: MouseButton) -> bool {
        self.pointer_buttons.contains(&button)
    }

    fn is_gamepad_button_down(&self, gamepad: u32, hardware_button: u32) -> bool {
        self.gamepads
            .get(&gamepad)
            .is_some_and(|readings| readings.buttons.contains(&hardware_button))
    }

    fn gamepad_axis(&self, gamepad: u32, axis: GamepadAxis) -> f32 {
        self.gamepads
            .get(&gamepad)
            .and_then(|readings| readings.axes.get(&axis).copied())
            .unwrap_or(0.0)
    }

    fn gamepad_vendor_id(&self, gamepad: u32) -> Option<u16> {
        self.gamepads
            .get(&gamepad)
            .and_then(|readings| readings.vendor_id)
    }

    fn is_gamepad_connected(&self, gamepad: u32) -> bool {
        self.gamepads.contains_key(&gamepad)
    }

    fn pointer_position(&self) -> Option<Vec2> {
        self.pointer_position
    }
}
