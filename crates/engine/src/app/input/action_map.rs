use std::collections::HashMap;

use super::bindings::Binding;
use super::devices::DeviceState;

/// Scene-local action identifier. Only meaningful inside the binding set of
/// the scene that registered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

impl From<u32> for ActionId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Multimap from actions to the physical inputs that trigger them.
#[derive(Debug, Clone, Default)]
pub struct ActionMap {
    bindings: HashMap<ActionId, Vec<Binding>>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicates are kept; they cannot change the result of `pressed`.
    pub fn bind(&mut self, action: impl Into<ActionId>, binding: Binding) {
        self.bindings
            .entry(action.into())
            .or_default()
            .push(binding);
    }

    pub fn pressed<D>(&self, action: impl Into<ActionId>, devices: &D) -> bool
    where
        D: DeviceState + ?Sized,
    {
        self.bindings
            .get(&action.into())
            .is_some_and(|bindings| bindings.iter().any(|binding| binding.is_active(devices)))
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use winit::event::MouseButton;
    use winit::keyboard::KeyCode;

    use super::*;
    use crate::app::events::{EngineEvent, GamepadAxis};
    use crate::app::input::bindings::GamepadButton;
    use crate::app::input::devices::InputDevices;

    const JUMP: u32 = 0;
    const FIRE: u32 = 1;

    fn bound_map() -> ActionMap {
        let mut map = ActionMap::new();
        map.bind(JUMP, Binding::Key(KeyCode::Space));
        map.bind(JUMP, Binding::gamepad(GamepadButton::South));
        map.bind(JUMP, Binding::axis(GamepadAxis::LeftY, -0.5));
        map.bind(FIRE, Binding::Pointer(MouseButton::Left));
        map
    }

    fn connected() -> InputDevices {
        let mut devices = InputDevices::default();
        devices.apply(&EngineEvent::GamepadConnected {
            gamepad: 0,
            vendor_id: None,
        });
        devices
    }

    #[test]
    fn pressed_is_or_across_bindings() {
        let map = bound_map();
        let cases: Vec<(Vec<EngineEvent>, bool)> = vec![
            (Vec::new(), false),
            (vec![EngineEvent::key_pressed(KeyCode::Space)], true),
            (
                vec![EngineEvent::GamepadButtonPressed {
                    gamepad: 0,
                    button: 1,
                }],
                true,
            ),
            (
                vec![EngineEvent::GamepadAxisMoved {
                    gamepad: 0,
                    axis: GamepadAxis::LeftY,
                    value: -0.9,
                }],
                true,
            ),
            (
                vec![EngineEvent::GamepadAxisMoved {
                    gamepad: 0,
                    axis: GamepadAxis::LeftY,
                    value: 0.9,
                }],
                false,
            ),
            (
                vec![EngineEvent::PointerPressed {
                    button: MouseButton::Left,
                }],
                false,
            ),
        ];

        for (events, expected) in cases {
            let mut devices = connected();
            for event in &events {
                devices.apply(event);
            }
            assert_eq!(map.pressed(JUMP, &devices), expected, "{events:?}");
        }
    }

    #[test]
    fn actions_do_not_share_bindings() {
        let map = bound_map();
        let mut devices = connected();
        devices.apply(&EngineEvent::PointerPressed {
            button: MouseButton::Left,
        });
        assert!(map.pressed(FIRE, &devices));
        assert!(!map.pressed(JUMP, &devices));
    }

    #[test]
    fn unbound_action_is_never_pressed() {
        let map = bound_map();
        let mut devices = connected();
        devices.apply(&EngineEvent::key_pressed(KeyCode::Space));
        assert!(!map.pressed(99u32, &devices));
    }

    #[test]
    fn duplicate_bindings_are_harmless() {
        let mut map = ActionMap::new();
        map.bind(JUMP, Binding::Key(KeyCode::KeyW));
        map.bind(JUMP, Binding::Key(KeyCode::KeyW));
        let mut devices = InputDevices::default();
        assert!(!map.pressed(JUMP, &devices));
        devices.apply(&EngineEvent::key_pressed(KeyCode::KeyW));
        assert!(map.pressed(JUMP, &devices));
        assert_eq!(map.binding_count(), 2);
    }

    #[test]
    fn clear_releases_every_action() {
        let mut map = bound_map();
        let mut devices = connected();
        devices.apply(&EngineEvent::key_pressed(KeyCode::Space));
        devices.apply(&EngineEvent::PointerPressed {
            button: MouseButton::Left,
        });
        assert!(map.pressed(JUMP, &devices));

        map.clear();

        assert!(!map.pressed(JUMP, &devices));
        assert!(!map.pressed(FIRE, &devices));
        assert_eq!(map.binding_count(), 0);
    }
}
