use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::rendering::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
    DPadX,
    DPadY,
}

/// Platform events in typed form. The platform bridge translates window and
/// gamepad backend events into these; nothing downstream sees raw backend
/// types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    Closed,
    Resized {
        width: u32,
        height: u32,
    },
    FocusLost,
    FocusGained,
    KeyPressed {
        key: KeyCode,
        control: bool,
        shift: bool,
        alt: bool,
    },
    KeyReleased {
        key: KeyCode,
    },
    PointerMoved {
        position: Vec2,
    },
    PointerPressed {
        button: MouseButton,
    },
    PointerReleased {
        button: MouseButton,
    },
    PointerWheel {
        delta: f32,
    },
    GamepadConnected {
        gamepad: u32,
        vendor_id: Option<u16>,
    },
    GamepadDisconnected {
        gamepad: u32,
    },
    GamepadButtonPressed {
        gamepad: u32,
        button: u32,
    },
    GamepadButtonReleased {
        gamepad: u32,
        button: u32,
    },
    GamepadAxisMoved {
        gamepad: u32,
        axis: GamepadAxis,
        value: f32,
    },
}

impl EngineEvent {
    pub fn key_pressed(key: KeyCode) -> Self {
        Self::KeyPressed {
            key,
            control: false,
            shift: false,
            alt: false,
        }
    }
}
