mod action_map;
mod bindings;
mod devices;

pub use action_map::{ActionId, ActionMap};
pub use bindings::{
    hardware_to_logical, logical_to_hardware, Binding, GamepadButton, GamepadLayout,
    DEFAULT_AXIS_THRESHOLD,
};
pub use devices::{DeviceState, InputDevices};
