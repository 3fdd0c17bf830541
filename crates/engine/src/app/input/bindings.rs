use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::devices::DeviceState;
use crate::app::events::GamepadAxis;

pub const DEFAULT_AXIS_THRESHOLD: f32 = 0.5;

const MICROSOFT_VENDOR_ID: u16 = 0x045e;

/// Hardware-independent gamepad buttons, named by face position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    West,
    South,
    East,
    North,
    L1,
    R1,
    L2,
    R2,
    Select,
    Start,
    L3,
    R3,
}

impl GamepadButton {
    pub const ALL: [GamepadButton; 12] = [
        GamepadButton::West,
        GamepadButton::South,
        GamepadButton::East,
        GamepadButton::North,
        GamepadButton::L1,
        GamepadButton::R1,
        GamepadButton::L2,
        GamepadButton::R2,
        GamepadButton::Select,
        GamepadButton::Start,
        GamepadButton::L3,
        GamepadButton::R3,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadLayout {
    PlayStation,
    Xbox,
}

impl GamepadLayout {
    /// Unknown or missing vendors fall back to the PlayStation table.
    pub fn for_vendor(vendor_id: Option<u16>) -> Self {
        match vendor_id {
            Some(MICROSOFT_VENDOR_ID) => GamepadLayout::Xbox,
            _ => GamepadLayout::PlayStation,
        }
    }

    /// Hardware button index per logical button; `None` means the layout has
    /// no digital button for it (Xbox triggers are axes).
    fn table(self) -> &'static [Option<u32>; 12] {
        const PLAYSTATION: [Option<u32>; 12] = [
            Some(0),
            Some(1),
            Some(2),
            Some(3),
            Some(4),
            Some(5),
            Some(6),
            Some(7),
            Some(8),
            Some(9),
            Some(10),
            Some(11),
        ];
        const XBOX: [Option<u32>; 12] = [
            Some(2),
            Some(0),
            Some(1),
            Some(3),
            Some(4),
            Some(5),
            None,
            None,
            Some(6),
            Some(7),
            Some(8),
            Some(9),
        ];
        match self {
            GamepadLayout::PlayStation => &PLAYSTATION,
            GamepadLayout::Xbox => &XBOX,
        }
    }

    pub fn to_hardware(self, button: GamepadButton) -> Option<u32> {
        self.table()[button.index()]
    }

    pub fn to_logical(self, hardware_button: u32) -> Option<GamepadButton> {
        self.table()
            .iter()
            .position(|entry| *entry == Some(hardware_button))
            .map(|index| GamepadButton::ALL[index])
    }
}

/// Resolves against whatever device is connected at `gamepad` right now;
/// nothing is cached, so swapping controllers takes effect immediately.
pub fn logical_to_hardware<D>(button: GamepadButton, gamepad: u32, devices: &D) -> Option<u32>
where
    D: DeviceState + ?Sized,
{
    GamepadLayout::for_vendor(devices.gamepad_vendor_id(gamepad)).to_hardware(button)
}

pub fn hardware_to_logical<D>(
    hardware_button: u32,
    gamepad: u32,
    devices: &D,
) -> Option<GamepadButton>
where
    D: DeviceState + ?Sized,
{
    GamepadLayout::for_vendor(devices.gamepad_vendor_id(gamepad)).to_logical(hardware_button)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding {
    Key(KeyCode),
    Pointer(MouseButton),
    Gamepad {
        button: GamepadButton,
        gamepad: u32,
    },
    /// Positive thresholds fire above the threshold, negative ones below.
    Axis {
        axis: GamepadAxis,
        threshold: f32,
        gamepad: u32,
    },
}

impl Binding {
    pub fn gamepad(button: GamepadButton) -> Self {
        Binding::Gamepad { button, gamepad: 0 }
    }

    pub fn axis(axis: GamepadAxis, threshold: f32) -> Self {
        Binding::Axis {
            axis,
            threshold,
            gamepad: 0,
        }
    }

    pub fn is_active<D>(&self, devices: &D) -> bool
    where
        D: DeviceState + ?Sized,
    {
        match *self {
            Binding::Key(key) => devices.is_key_down(key),
            Binding::Pointer(button) => devices.is_pointer_down(button),
            Binding::Gamepad { button, gamepad } => logical_to_hardware(button, gamepad, devices)
                .is_some_and(|hardware| devices.is_gamepad_button_down(gamepad, hardware)),
            Binding::Axis {
                axis,
                threshold,
                gamepad,
            } => {
                let value = devices.gamepad_axis(gamepad, axis);
                if threshold >= 0.0 {
                    value > threshold
                } else {
                    value < threshold
                }
            }
        }
    }
}
