pub mod app;

pub use app::{
    effects, hardware_to_logical, logical_to_hardware, run_app, text_width, ActionId, ActionMap,
    AppError, Binding, CircleShape, Color, ConfigError, Cursor, DeviceState, Drawable, Engine,
    EngineConfig, EngineContext, EngineError, EngineEvent, FrameCompositor, GamepadAxis,
    GamepadButton, GamepadLayout, Image, InputDevices, OverlaySelection, PauseOverlay,
    PrimitiveType, RectangleShape, Scene, SceneDirector, SceneRegistry, ScreenshotError, Surface,
    Text, TimeSource, Vec2, Vertex, View, Viewport, CONFIG_ENV_VAR, DEFAULT_AXIS_THRESHOLD,
    DEFAULT_CONFIG_PATH,
};
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
