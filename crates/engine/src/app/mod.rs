mod config;
mod cursor;
mod engine;
mod events;
mod input;
mod loop_runner;
mod overlay;
mod rendering;
mod scene;
mod screenshot;
mod time;

pub use config::{ConfigError, EngineConfig, CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
pub use cursor::Cursor;
pub use engine::{Engine, EngineContext, EngineError};
pub use events::{EngineEvent, GamepadAxis};
pub use input::{
    hardware_to_logical, logical_to_hardware, ActionId, ActionMap, Binding, DeviceState,
    GamepadButton, GamepadLayout, InputDevices, DEFAULT_AXIS_THRESHOLD,
};
pub use loop_runner::{run_app, AppError};
pub use overlay::{OverlaySelection, PauseOverlay};
pub use rendering::effects;
pub use rendering::{
    text_width, CircleShape, Color, Drawable, FrameCompositor, Image, PrimitiveType,
    RectangleShape, Surface, Text, Vec2, Vertex, View, Viewport,
};
pub use scene::{Scene, SceneDirector, SceneRegistry};
pub use screenshot::ScreenshotError;
pub use time::TimeSource;
