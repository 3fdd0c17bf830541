use std::sync::Arc;
use std::thread;

use gilrs::{Axis as GilrsAxis, Button as GilrsButton, EventType as GilrsEventType, Gilrs};
use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::config::{ConfigError, EngineConfig};
use super::engine::{Engine, EngineError};
use super::events::{EngineEvent, GamepadAxis};
use super::input::{GamepadButton, GamepadLayout};
use super::rendering::Vec2;
use super::scene::SceneRegistry;

const PIXELS_PER_WHEEL_LINE: f32 = 40.0;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives the engine until it stops running.
pub fn run_app(config: EngineConfig, registry: SceneRegistry) -> Result<(), AppError> {
    let focus_sleep = config.focus_sleep();
    let (min_width, min_height) = config.minimum_window_size();
    let (width, height) = (config.window_width, config.window_height);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(width as f64, height as f64))
            .with_min_inner_size(LogicalSize::new(min_width as f64, min_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    window.set_cursor_visible(false);
    info!(width, height, title = %config.window_title, "window_created");

    let mut pixels = build_pixels(Arc::clone(&window), width, height)?;
    let mut engine = Engine::new(config, registry)?;
    let mut gamepads = GamepadBridge::new();
    gamepads.announce_connected(&mut engine);
    let mut translator = EventTranslator::default();
    let mut failure: Option<EngineError> = None;

    event_loop.set_control_flow(ControlFlow::Poll);
    let run_result = event_loop.run(|event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => {
            if let WindowEvent::Resized(size) = &event {
                if size.width > 0 && size.height > 0 {
                    if let Err(error) = pixels.resize_surface(size.width, size.height) {
                        warn!(error = %error, "surface_resize_failed");
                    }
                }
            }

            if let WindowEvent::RedrawRequested = event {
                gamepads.poll(&mut engine);
                match engine.run_frame(pixels.frame_mut()) {
                    Ok(true) => {
                        if let Err(error) = pixels.render() {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                    }
                    Ok(false) if !engine.is_running() => window_target.exit(),
                    // Unfocused: nothing to simulate, don't spin.
                    Ok(false) => thread::sleep(focus_sleep),
                    Err(engine_error) => {
                        error!(error = %engine_error, "engine_frame_failed");
                        failure = Some(engine_error);
                        window_target.exit();
                    }
                }
                return;
            }

            let to_frame = |x: f32, y: f32| {
                let (px, py) = pixels
                    .window_pos_to_pixel((x, y))
                    .unwrap_or_else(|outside| pixels.clamp_pixel_pos(outside));
                Vec2::new(px as f32, py as f32)
            };
            if let Some(translated) = translator.translate(&event, to_frame) {
                engine.push_event(translated);
            }
        }
        Event::AboutToWait => {
            window.request_redraw();
        }
        Event::LoopExiting => {
            engine.shutdown();
        }
        _ => {}
    });

    if let Some(engine_error) = failure {
        return Err(engine_error.into());
    }
    run_result.map_err(AppError::EventLoopRun)
}

fn build_pixels(window: Arc<Window>, width: u32, height: u32) -> Result<Pixels<'static>, AppError> {
    let size = window.inner_size();
    let surface = SurfaceTexture::new(size.width, size.height, window);
    Pixels::new(width, height, surface).map_err(AppError::CreateRenderer)
}

/// Converts winit window events into engine events. Only modifier state is
/// carried between events.
#[derive(Debug, Default)]
struct EventTranslator {
    modifiers: ModifiersState,
}

impl EventTranslator {
    fn translate(
        &mut self,
        event: &WindowEvent,
        to_frame: impl Fn(f32, f32) -> Vec2,
    ) -> Option<EngineEvent> {
        match event {
            WindowEvent::CloseRequested => Some(EngineEvent::Closed),
            WindowEvent::Resized(size) => Some(EngineEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::Focused(true) => Some(EngineEvent::FocusGained),
            WindowEvent::Focused(false) => Some(EngineEvent::FocusLost),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => match event.physical_key {
                PhysicalKey::Code(code) => self.key(code, event.state, event.repeat),
                PhysicalKey::Unidentified(_) => None,
            },
            WindowEvent::CursorMoved { position, .. } => Some(EngineEvent::PointerMoved {
                position: to_frame(position.x as f32, position.y as f32),
            }),
            WindowEvent::MouseInput { state, button, .. } => Some(match state {
                ElementState::Pressed => EngineEvent::PointerPressed { button: *button },
                ElementState::Released => EngineEvent::PointerReleased { button: *button },
            }),
            WindowEvent::MouseWheel { delta, .. } => Some(EngineEvent::PointerWheel {
                delta: wheel_lines(*delta),
            }),
            _ => None,
        }
    }

    // Held keys auto-repeat on most platforms; shortcuts must fire once.
    fn key(&self, key: KeyCode, state: ElementState, repeat: bool) -> Option<EngineEvent> {
        match state {
            ElementState::Pressed if repeat => None,
            ElementState::Pressed => Some(EngineEvent::KeyPressed {
                key,
                control: self.modifiers.control_key(),
                shift: self.modifiers.shift_key(),
                alt: self.modifiers.alt_key(),
            }),
            ElementState::Released => Some(EngineEvent::KeyReleased { key }),
        }
    }
}

fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_WHEEL_LINE,
    }
}

/// Feeds gilrs events to the engine. Missing gamepad support is not an
/// error; the engine just never sees a pad.
struct GamepadBridge {
    gilrs: Option<Gilrs>,
}

impl GamepadBridge {
    fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(error) => {
                warn!(error = %error, "gamepad_backend_unavailable");
                None
            }
        };
        Self { gilrs }
    }

    fn announce_connected(&self, engine: &mut Engine) {
        let Some(gilrs) = &self.gilrs else {
            return;
        };
        for (id, gamepad) in gilrs.gamepads() {
            engine.push_event(EngineEvent::GamepadConnected {
                gamepad: usize::from(id) as u32,
                vendor_id: gamepad.vendor_id(),
            });
        }
    }

    fn poll(&mut self, engine: &mut Engine) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };
        while let Some(gilrs::Event { id, event, .. }) = gilrs.next_event() {
            let gamepad = usize::from(id) as u32;
            let vendor_id = gilrs.gamepad(id).vendor_id();
            let translated = match event {
                GilrsEventType::Connected => {
                    Some(EngineEvent::GamepadConnected { gamepad, vendor_id })
                }
                GilrsEventType::Disconnected => Some(EngineEvent::GamepadDisconnected { gamepad }),
                GilrsEventType::ButtonPressed(button, _) => {
                    button_event(gamepad, vendor_id, button, true)
                }
                GilrsEventType::ButtonReleased(button, _) => {
                    button_event(gamepad, vendor_id, button, false)
                }
                GilrsEventType::ButtonChanged(button, value, _) => {
                    trigger_axis(button).map(|axis| EngineEvent::GamepadAxisMoved {
                        gamepad,
                        axis,
                        value,
                    })
                }
                GilrsEventType::AxisChanged(axis, value, _) => {
                    stick_axis(axis).map(|(axis, sign)| EngineEvent::GamepadAxisMoved {
                        gamepad,
                        axis,
                        value: value * sign,
                    })
                }
                _ => None,
            };
            if let Some(translated) = translated {
                engine.push_event(translated);
            }
        }
    }
}

fn logical_button(button: GilrsButton) -> Option<GamepadButton> {
    Some(match button {
        GilrsButton::South => GamepadButton::South,
        GilrsButton::East => GamepadButton::East,
        GilrsButton::North => GamepadButton::North,
        GilrsButton::West => GamepadButton::West,
        GilrsButton::LeftTrigger => GamepadButton::L1,
        GilrsButton::RightTrigger => GamepadButton::R1,
        GilrsButton::LeftTrigger2 => GamepadButton::L2,
        GilrsButton::RightTrigger2 => GamepadButton::R2,
        GilrsButton::Select => GamepadButton::Select,
        GilrsButton::Start => GamepadButton::Start,
        GilrsButton::LeftThumb => GamepadButton::L3,
        GilrsButton::RightThumb => GamepadButton::R3,
        _ => return None,
    })
}

/// gilrs reports semantic buttons; the engine expects the raw index the
/// pad's own layout would use, so encode through that layout. D-pad
/// buttons become axis moves.
fn button_event(
    gamepad: u32,
    vendor_id: Option<u16>,
    button: GilrsButton,
    pressed: bool,
) -> Option<EngineEvent> {
    if let Some((axis, direction)) = dpad_direction(button) {
        return Some(EngineEvent::GamepadAxisMoved {
            gamepad,
            axis,
            value: if pressed { direction } else { 0.0 },
        });
    }
    let hardware = GamepadLayout::for_vendor(vendor_id).to_hardware(logical_button(button)?)?;
    Some(if pressed {
        EngineEvent::GamepadButtonPressed {
            gamepad,
            button: hardware,
        }
    } else {
        EngineEvent::GamepadButtonReleased {
            gamepad,
            button: hardware,
        }
    })
}

fn dpad_direction(button: GilrsButton) -> Option<(GamepadAxis, f32)> {
    match button {
        GilrsButton::DPadLeft => Some((GamepadAxis::DPadX, -1.0)),
        GilrsButton::DPadRight => Some((GamepadAxis::DPadX, 1.0)),
        GilrsButton::DPadUp => Some((GamepadAxis::DPadY, -1.0)),
        GilrsButton::DPadDown => Some((GamepadAxis::DPadY, 1.0)),
        _ => None,
    }
}

fn trigger_axis(button: GilrsButton) -> Option<GamepadAxis> {
    match button {
        GilrsButton::LeftTrigger2 => Some(GamepadAxis::LeftTrigger),
        GilrsButton::RightTrigger2 => Some(GamepadAxis::RightTrigger),
        _ => None,
    }
}

/// Engine axes grow rightwards and downwards like screen coordinates;
/// gilrs sticks grow upwards.
fn stick_axis(axis: GilrsAxis) -> Option<(GamepadAxis, f32)> {
    match axis {
        GilrsAxis::LeftStickX => Some((GamepadAxis::LeftX, 1.0)),
        GilrsAxis::LeftStickY => Some((GamepadAxis::LeftY, -1.0)),
        GilrsAxis::RightStickX => Some((GamepadAxis::RightX, 1.0)),
        GilrsAxis::RightStickY => Some((GamepadAxis::RightY, -1.0)),
        GilrsAxis::LeftZ => Some((GamepadAxis::LeftTrigger, 1.0)),
        GilrsAxis::RightZ => Some((GamepadAxis::RightTrigger, 1.0)),
        GilrsAxis::DPadX => Some((GamepadAxis::DPadX, 1.0)),
        GilrsAxis::DPadY => Some((GamepadAxis::DPadY, -1.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::dpi::{PhysicalPosition, PhysicalSize};

    use super::*;
    use crate::app::input::hardware_to_logical;
    use crate::app::input::InputDevices;

    fn identity(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn window_events_translate_to_engine_events() {
        let mut translator = EventTranslator::default();
        assert_eq!(
            translator.translate(&WindowEvent::CloseRequested, identity),
            Some(EngineEvent::Closed)
        );
        assert_eq!(
            translator.translate(&WindowEvent::Focused(false), identity),
            Some(EngineEvent::FocusLost)
        );
        assert_eq!(
            translator.translate(&WindowEvent::Resized(PhysicalSize::new(800, 600)), identity),
            Some(EngineEvent::Resized {
                width: 800,
                height: 600
            })
        );
        assert_eq!(translator.translate(&WindowEvent::Occluded(true), identity), None);
    }

    #[test]
    fn key_repeats_are_dropped() {
        let translator = EventTranslator::default();
        assert_eq!(
            translator.key(KeyCode::KeyR, ElementState::Pressed, true),
            None
        );
        assert_eq!(
            translator.key(KeyCode::KeyR, ElementState::Pressed, false),
            Some(EngineEvent::key_pressed(KeyCode::KeyR))
        );
    }

    #[test]
    fn held_modifiers_are_attached_to_key_presses() {
        let translator = EventTranslator {
            modifiers: ModifiersState::CONTROL | ModifiersState::SHIFT,
        };
        assert_eq!(
            translator.key(KeyCode::KeyS, ElementState::Pressed, false),
            Some(EngineEvent::KeyPressed {
                key: KeyCode::KeyS,
                control: true,
                shift: true,
                alt: false,
            })
        );
    }

    #[test]
    fn wheel_pixels_are_scaled_to_lines() {
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
        assert_eq!(
            wheel_lines(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0))),
            2.0
        );
    }

    #[test]
    fn bridged_buttons_resolve_back_to_the_same_logical_button() {
        for (vendor_id, button, logical) in [
            (Some(0x045e), GilrsButton::South, GamepadButton::South),
            (Some(0x045e), GilrsButton::Start, GamepadButton::Start),
            (Some(0x054c), GilrsButton::West, GamepadButton::West),
            (None, GilrsButton::RightThumb, GamepadButton::R3),
        ] {
            let mut devices = InputDevices::default();
            devices.apply(&EngineEvent::GamepadConnected {
                gamepad: 0,
                vendor_id,
            });
            let Some(EngineEvent::GamepadButtonPressed { button: hardware, .. }) =
                button_event(0, vendor_id, button, true)
            else {
                panic!("expected a button press for {button:?}");
            };
            assert_eq!(hardware_to_logical(hardware, 0, &devices), Some(logical));
        }
    }

    #[test]
    fn xbox_triggers_have_no_button_index() {
        assert_eq!(
            button_event(0, Some(0x045e), GilrsButton::LeftTrigger2, true),
            None
        );
        assert_eq!(
            trigger_axis(GilrsButton::LeftTrigger2),
            Some(GamepadAxis::LeftTrigger)
        );
    }

    #[test]
    fn dpad_buttons_become_axis_moves() {
        assert_eq!(
            button_event(2, None, GilrsButton::DPadUp, true),
            Some(EngineEvent::GamepadAxisMoved {
                gamepad: 2,
                axis: GamepadAxis::DPadY,
                value: -1.0,
            })
        );
        assert_eq!(
            button_event(2, None, GilrsButton::DPadUp, false),
            Some(EngineEvent::GamepadAxisMoved {
                gamepad: 2,
                axis: GamepadAxis::DPadY,
                value: 0.0,
            })
        );
    }

    #[test]
    fn stick_y_is_flipped_to_screen_space() {
        assert_eq!(
            stick_axis(GilrsAxis::LeftStickY),
            Some((GamepadAxis::LeftY, -1.0))
        );
        assert_eq!(stick_axis(GilrsAxis::Unknown), None);
    }
}
