use std::collections::VecDeque;

use thiserror::Error;
use tracing::{info, warn};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use super::config::{ConfigError, EngineConfig};
use super::cursor::Cursor;
use super::events::EngineEvent;
use super::input::{
    hardware_to_logical, ActionId, ActionMap, DeviceState, GamepadButton, GamepadLayout,
    InputDevices,
};
use super::overlay::{OverlaySelection, PauseOverlay};
use super::rendering::{FrameCompositor, Vec2};
use super::scene::{Scene, SceneDirector, SceneRegistry};
use super::screenshot;
use super::time::TimeSource;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scene `{name}` is not registered")]
    UnknownScene { name: String },
    #[error("hub scene `{name}` is not registered")]
    MissingHubScene { name: String },
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Shared handle passed to the active scene on every callback.
pub struct EngineContext {
    pub input: ActionMap,
    pub renderer: FrameCompositor,
    pub cursor: Cursor,
    pub scenes: SceneDirector,
    config: EngineConfig,
    devices: InputDevices,
    time: TimeSource,
    quit_requested: bool,
}

impl EngineContext {
    /// Whether any input bound to `action` is currently held.
    pub fn pressed(&self, action: impl Into<ActionId>) -> bool {
        self.input.pressed(action, &self.devices)
    }

    pub fn devices(&self) -> &InputDevices {
        &self.devices
    }

    pub fn time(&self) -> &TimeSource {
        &self.time
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.renderer.width(), self.renderer.height())
    }

    /// Closes the window at the end of the current step.
    pub fn quit(&mut self) {
        self.quit_requested = true;
    }
}

/// Owns the active scene and sequences poll, simulate and render.
pub struct Engine {
    context: EngineContext,
    registry: SceneRegistry,
    current: Option<String>,
    overlay: PauseOverlay,
    cursor_was_visible: bool,
    running: bool,
    has_focus: bool,
    pending: VecDeque<EngineEvent>,
    screenshot_requested: bool,
}

impl Engine {
    pub fn new(config: EngineConfig, registry: SceneRegistry) -> Result<Self, EngineError> {
        config.validate()?;
        if !registry.contains(&config.hub_scene) {
            return Err(EngineError::MissingHubScene {
                name: config.hub_scene.clone(),
            });
        }

        let (width, height) = (config.window_width, config.window_height);
        let renderer = FrameCompositor::new(
            width,
            height,
            config.background_color,
            &config.effects,
            config.effects_enabled,
            config.bloom_intensity,
        );
        let mut cursor = Cursor::new(
            config.cursor_radius,
            config.cursor_speed,
            config.cursor_color,
        );
        cursor.set_position(Vec2::new(width as f32 / 2.0, height as f32 / 2.0));
        let mut scenes = SceneDirector::new(config.hub_scene.clone(), registry.names());
        scenes.return_to_hub();

        info!(
            width,
            height,
            scenes = registry.len(),
            hub = %config.hub_scene,
            "engine_ready"
        );

        Ok(Self {
            context: EngineContext {
                input: ActionMap::new(),
                renderer,
                cursor,
                scenes,
                devices: InputDevices::default(),
                time: TimeSource::new(config.maximum_delta()),
                config,
                quit_requested: false,
            },
            registry,
            current: None,
            overlay: PauseOverlay::new(width, height),
            cursor_was_visible: true,
            running: true,
            has_focus: true,
            pending: VecDeque::new(),
            screenshot_requested: false,
        })
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn is_paused(&self) -> bool {
        self.overlay.is_visible()
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn frame_size(&self) -> (u32, u32) {
        self.context.window_size()
    }

    pub fn push_event(&mut self, event: EngineEvent) {
        self.pending.push_back(event);
    }

    /// One full frame. Returns `Ok(false)` when nothing was simulated or
    /// drawn because the window is closed or unfocused.
    pub fn run_frame(&mut self, frame: &mut [u8]) -> Result<bool, EngineError> {
        self.process_events()?;
        if !self.running || !self.has_focus {
            return Ok(false);
        }
        self.update();
        self.render(frame);
        Ok(true)
    }

    /// Resolves the pending scene switch, then drains queued events.
    pub fn process_events(&mut self) -> Result<(), EngineError> {
        if let Some(next) = self.context.scenes.fetch_next_scene() {
            self.change_scene(&next)?;
        }

        while let Some(event) = self.pending.pop_front() {
            self.context.devices.apply(&event);
            self.dispatch(&event);

            let point = self.gui_point(&event);
            self.overlay
                .process_event(&event, point, &self.context.devices);

            if !self.overlay.is_visible() {
                self.with_active_scene(|scene, ctx| scene.on_event(&event, ctx));
            }
        }

        if let Some(selection) = self.overlay.fetch_selection() {
            self.select(selection);
        }
        self.honour_quit_request();
        Ok(())
    }

    pub fn update(&mut self) {
        self.context.time.update();
        let dt = self.context.time.delta_time();
        let bounds = self.context.window_size();
        let deadzone = self.context.config.joystick_deadzone;
        self.context
            .cursor
            .update(dt, &self.context.devices, deadzone, bounds);

        if !self.overlay.is_visible() {
            self.with_active_scene(|scene, ctx| scene.update(ctx));
        }
        self.honour_quit_request();
    }

    /// Draws the scene through the effect chain into `frame`, then the
    /// overlay and cursor on top.
    pub fn render(&mut self, frame: &mut [u8]) {
        self.context.renderer.begin_drawing();
        self.with_active_scene(|scene, ctx| scene.render(ctx));

        let (width, height) = self.context.window_size();
        let image = self.context.renderer.finish_drawing();
        let len = frame.len().min(image.pixels().len());
        frame[..len].copy_from_slice(&image.pixels()[..len]);

        self.overlay.render(frame, width, height);
        self.context.cursor.render(frame, width, height);

        if self.screenshot_requested {
            self.screenshot_requested = false;
            let dir = &self.context.config.screenshot_dir;
            match screenshot::save_png(dir, width, height, frame) {
                Ok(path) => info!(path = %path.display(), "screenshot_saved"),
                Err(error) => warn!(error = %error, "screenshot_failed"),
            }
        }
    }

    /// Runs the active scene's cleanup hook once.
    pub fn shutdown(&mut self) {
        self.with_active_scene(|scene, ctx| scene.on_cleanup(ctx));
        if let Some(scene) = self.current.take() {
            info!(scene = %scene, "shutdown");
        }
    }

    fn dispatch(&mut self, event: &EngineEvent) {
        match *event {
            EngineEvent::Closed => self.close(),
            EngineEvent::Resized { width, height } => {
                info!(width, height, "window_resized");
            }
            EngineEvent::FocusLost => {
                self.has_focus = false;
                self.with_active_scene(|scene, _| scene.on_pause(true));
                info!("window_focus_lost");
            }
            EngineEvent::FocusGained => {
                self.has_focus = true;
                let paused = self.overlay.is_visible();
                self.with_active_scene(|scene, _| scene.on_pause(paused));
                info!(paused, "window_focus_gained");
            }
            EngineEvent::GamepadConnected { gamepad, vendor_id } => {
                info!(
                    gamepad,
                    vendor_id = ?vendor_id,
                    layout = ?GamepadLayout::for_vendor(vendor_id),
                    "gamepad_connected"
                );
            }
            EngineEvent::GamepadDisconnected { gamepad } => {
                info!(gamepad, "gamepad_disconnected");
            }
            EngineEvent::KeyPressed {
                key,
                control,
                shift,
                ..
            } => match key {
                KeyCode::KeyR => self.restart_scene(),
                KeyCode::KeyM => self.return_to_hub(),
                KeyCode::Escape => self.toggle_pause(),
                KeyCode::KeyS if control && shift => self.screenshot_requested = true,
                _ => {}
            },
            EngineEvent::GamepadButtonPressed { gamepad, button } => {
                match hardware_to_logical(button, gamepad, &self.context.devices) {
                    Some(GamepadButton::Select) => self.return_to_hub(),
                    Some(GamepadButton::Start) => self.toggle_pause(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn select(&mut self, selection: OverlaySelection) {
        match selection {
            OverlaySelection::Resume => self.toggle_pause(),
            OverlaySelection::Restart => self.restart_scene(),
            OverlaySelection::Menu => self.return_to_hub(),
            OverlaySelection::Quit => self.close(),
        }
    }

    fn change_scene(&mut self, name: &str) -> Result<(), EngineError> {
        if !self.registry.contains(name) {
            return Err(EngineError::UnknownScene {
                name: name.to_string(),
            });
        }
        let restart = self.current.as_deref() == Some(name);

        self.with_active_scene(|scene, ctx| scene.on_cleanup(ctx));
        self.context.input.clear();
        self.context.renderer.reset_view();
        self.current = Some(name.to_string());
        self.with_active_scene(|scene, ctx| scene.start(ctx));

        if restart {
            info!(scene = name, "scene_restarted");
        } else {
            info!(scene = name, "scene_changed");
        }
        Ok(())
    }

    fn restart_scene(&mut self) {
        self.overlay.set_visible(false);
        self.context.scenes.restart_current_scene();
    }

    fn return_to_hub(&mut self) {
        self.overlay.set_visible(false);
        self.context.scenes.return_to_hub();
        self.context.cursor.set_visible(true);
        self.context.cursor.reset_speed();
    }

    // The cursor is always shown while paused; resuming restores whatever
    // visibility it had before.
    fn toggle_pause(&mut self) {
        let overlay_visible = !self.overlay.is_visible();
        self.overlay.set_visible(overlay_visible);

        let cursor_visible = self.context.cursor.is_visible();
        self.context
            .cursor
            .set_visible(overlay_visible || self.cursor_was_visible);
        self.cursor_was_visible = cursor_visible;

        self.with_active_scene(|scene, _| scene.on_pause(overlay_visible));
        if overlay_visible {
            info!("game_paused");
        } else {
            info!("game_resumed");
        }
    }

    fn close(&mut self) {
        if self.running {
            self.running = false;
            info!("window_closed");
        }
    }

    fn honour_quit_request(&mut self) {
        if std::mem::take(&mut self.context.quit_requested) {
            self.close();
        }
    }

    fn gui_point(&self, event: &EngineEvent) -> Vec2 {
        match event {
            EngineEvent::PointerPressed {
                button: MouseButton::Left,
            } => self
                .context
                .devices
                .pointer_position()
                .unwrap_or_else(|| self.context.cursor.position()),
            _ => self.context.cursor.position(),
        }
    }

    fn with_active_scene(&mut self, f: impl FnOnce(&mut dyn Scene, &mut EngineContext)) {
        let Some(name) = self.current.as_deref() else {
            return;
        };
        if let Some(scene) = self.registry.get_mut(name) {
            f(scene, &mut self.context);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::input::Binding;

    type Log = Rc<RefCell<Vec<String>>>;

    const ACTION: u32 = 7;

    struct Probe {
        name: &'static str,
        log: Log,
        hide_cursor: bool,
        request: Option<&'static str>,
    }

    impl Probe {
        fn boxed(name: &'static str, log: &Log) -> Box<Self> {
            Box::new(Self {
                name,
                log: log.clone(),
                hide_cursor: false,
                request: None,
            })
        }

        fn record(&self, entry: impl std::fmt::Display) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, entry));
        }
    }

    impl Scene for Probe {
        fn start(&mut self, ctx: &mut EngineContext) {
            self.record("start");
            ctx.input.bind(ACTION, Binding::Key(KeyCode::Space));
            if self.hide_cursor {
                ctx.cursor.set_visible(false);
            }
        }

        fn update(&mut self, ctx: &mut EngineContext) {
            self.record("update");
            if let Some(next) = self.request.take() {
                ctx.scenes.change_scene(next);
            }
        }

        fn render(&mut self, _ctx: &mut EngineContext) {
            self.record("render");
        }

        fn on_event(&mut self, _event: &EngineEvent, _ctx: &mut EngineContext) {
            self.record("event");
        }

        fn on_pause(&mut self, paused: bool) {
            self.record(format!("pause={paused}"));
        }

        fn on_cleanup(&mut self, _ctx: &mut EngineContext) {
            self.record("cleanup");
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            window_width: 64,
            window_height: 48,
            effects: Vec::new(),
            ..EngineConfig::default()
        }
    }

    fn engine_with(scenes: Vec<Box<Probe>>) -> (Engine, Vec<u8>) {
        let mut registry = SceneRegistry::new();
        for scene in scenes {
            registry.register(scene.name, scene);
        }
        let engine = Engine::new(test_config(), registry).expect("engine");
        (engine, vec![0; 64 * 48 * 4])
    }

    fn press(key: KeyCode) -> EngineEvent {
        EngineEvent::key_pressed(key)
    }

    fn drain(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn missing_hub_scene_is_rejected() {
        let log = Log::default();
        let registry = SceneRegistry::new().with("Pong", Probe::boxed("Pong", &log));
        let error = Engine::new(test_config(), registry).err().expect("must fail");
        assert!(matches!(error, EngineError::MissingHubScene { name } if name == "Menu"));
    }

    #[test]
    fn construction_rejects_invalid_config() {
        let log = Log::default();
        let registry = SceneRegistry::new().with("Menu", Probe::boxed("Menu", &log));
        let config = EngineConfig {
            maximum_delta_time: 0.0,
            ..test_config()
        };
        let error = Engine::new(config, registry).err().expect("must fail");
        assert!(matches!(
            error,
            EngineError::InvalidConfig(ConfigError::Invalid {
                field: "maximum_delta_time",
                ..
            })
        ));
    }

    #[test]
    fn first_frame_starts_hub_then_simulates_and_renders() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);

        assert!(engine.run_frame(&mut frame).expect("frame"));

        assert_eq!(drain(&log), ["Menu:start", "Menu:update", "Menu:render"]);
        assert_eq!(engine.current_scene(), Some("Menu"));
    }

    #[test]
    fn scene_change_cleans_up_and_rebinds() {
        let log = Log::default();
        let mut menu = Probe::boxed("Menu", &log);
        menu.request = Some("Pong");
        let (mut engine, mut frame) = engine_with(vec![menu, Probe::boxed("Pong", &log)]);

        engine.run_frame(&mut frame).expect("frame");
        drain(&log);
        engine.process_events().expect("events");

        assert_eq!(drain(&log), ["Menu:cleanup", "Pong:start"]);
        assert_eq!(engine.current_scene(), Some("Pong"));
        assert_eq!(engine.context().input.binding_count(), 1);
    }

    #[test]
    fn unknown_scene_is_fatal() {
        let log = Log::default();
        let mut menu = Probe::boxed("Menu", &log);
        menu.request = Some("Nowhere");
        let (mut engine, mut frame) = engine_with(vec![menu]);

        engine.run_frame(&mut frame).expect("frame");
        let error = engine.run_frame(&mut frame).expect_err("must fail");

        assert!(matches!(error, EngineError::UnknownScene { name } if name == "Nowhere"));
    }

    #[test]
    fn restart_shortcut_round_trips_the_current_scene() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");

        engine.push_event(press(KeyCode::KeyR));
        engine.process_events().expect("events");
        engine.process_events().expect("events");

        assert!(drain(&log).ends_with(&[
            "Menu:event".to_string(),
            "Menu:cleanup".to_string(),
            "Menu:start".to_string(),
        ]));
    }

    #[test]
    fn pause_suppresses_scene_events_and_simulation() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");
        drain(&log);

        engine.push_event(press(KeyCode::Escape));
        engine.push_event(press(KeyCode::Space));
        engine.run_frame(&mut frame).expect("frame");

        assert!(engine.is_paused());
        assert_eq!(drain(&log), ["Menu:pause=true", "Menu:render"]);

        engine.push_event(press(KeyCode::Escape));
        engine.run_frame(&mut frame).expect("frame");
        assert!(!engine.is_paused());
        assert_eq!(
            drain(&log),
            ["Menu:pause=false", "Menu:event", "Menu:update", "Menu:render"]
        );
    }

    #[test]
    fn pause_toggle_restores_previous_cursor_visibility() {
        let log = Log::default();
        let mut menu = Probe::boxed("Menu", &log);
        menu.hide_cursor = true;
        let (mut engine, mut frame) = engine_with(vec![menu]);
        engine.run_frame(&mut frame).expect("frame");
        assert!(!engine.context().cursor.is_visible());

        engine.push_event(press(KeyCode::Escape));
        engine.process_events().expect("events");
        assert!(engine.context().cursor.is_visible());

        engine.push_event(press(KeyCode::Escape));
        engine.process_events().expect("events");
        assert!(!engine.context().cursor.is_visible());
    }

    #[test]
    fn focus_changes_gate_simulation_without_touching_overlay() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");
        drain(&log);

        engine.push_event(EngineEvent::FocusLost);
        assert!(!engine.run_frame(&mut frame).expect("frame"));
        assert!(!engine.has_focus());
        assert!(!engine.is_paused());

        engine.push_event(EngineEvent::FocusGained);
        assert!(engine.run_frame(&mut frame).expect("frame"));
        assert_eq!(
            drain(&log),
            [
                "Menu:pause=true",
                "Menu:event",
                "Menu:pause=false",
                "Menu:event",
                "Menu:update",
                "Menu:render",
            ]
        );
    }

    #[test]
    fn focus_regained_while_paused_stays_paused() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");

        engine.push_event(press(KeyCode::Escape));
        engine.push_event(EngineEvent::FocusLost);
        engine.push_event(EngineEvent::FocusGained);
        engine.run_frame(&mut frame).expect("frame");

        assert!(engine.is_paused());
        assert!(drain(&log).ends_with(&[
            "Menu:pause=true".to_string(),
            "Menu:pause=true".to_string(),
            "Menu:pause=true".to_string(),
            "Menu:render".to_string(),
        ]));
    }

    #[test]
    fn menu_shortcut_returns_to_hub_with_default_cursor() {
        let log = Log::default();
        let mut menu = Probe::boxed("Menu", &log);
        menu.request = Some("Pong");
        let mut pong = Probe::boxed("Pong", &log);
        pong.hide_cursor = true;
        let (mut engine, mut frame) = engine_with(vec![menu, pong]);
        engine.run_frame(&mut frame).expect("frame");
        engine.run_frame(&mut frame).expect("frame");
        assert_eq!(engine.current_scene(), Some("Pong"));
        engine.context.cursor.set_speed(1.0);

        engine.push_event(press(KeyCode::KeyM));
        engine.process_events().expect("events");
        engine.process_events().expect("events");

        assert_eq!(engine.current_scene(), Some("Menu"));
        assert!(engine.context().cursor.is_visible());
        assert_eq!(engine.context().cursor.speed(), test_config().cursor_speed);
    }

    #[test]
    fn gamepad_start_toggles_pause() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");

        // PlayStation layout: hardware 9 is Start.
        engine.push_event(EngineEvent::GamepadConnected {
            gamepad: 0,
            vendor_id: Some(0x054c),
        });
        engine.push_event(EngineEvent::GamepadButtonPressed {
            gamepad: 0,
            button: 9,
        });
        engine.process_events().expect("events");

        assert!(engine.is_paused());
    }

    #[test]
    fn overlay_quit_selection_closes_the_window() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");

        engine.push_event(press(KeyCode::Escape));
        engine.process_events().expect("events");
        let quit = (0..48)
            .flat_map(|y| (0..64).map(move |x| Vec2::new(x as f32, y as f32)))
            .filter(|point| {
                let mut probe = engine.overlay.clone();
                let devices = InputDevices::default();
                probe.process_event(
                    &EngineEvent::PointerPressed {
                        button: MouseButton::Left,
                    },
                    *point,
                    &devices,
                );
                probe.fetch_selection() == Some(OverlaySelection::Quit)
            })
            .next()
            .expect("quit button is reachable");
        engine.push_event(EngineEvent::PointerMoved { position: quit });
        engine.push_event(EngineEvent::PointerPressed {
            button: MouseButton::Left,
        });

        assert!(!engine.run_frame(&mut frame).expect("frame"));
        assert!(!engine.is_running());
    }

    #[test]
    fn action_queries_read_live_device_state() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");
        assert!(!engine.context().pressed(ACTION));

        engine.push_event(press(KeyCode::Space));
        engine.process_events().expect("events");

        assert!(engine.context().pressed(ACTION));
    }

    #[test]
    fn screenshot_shortcut_writes_png() {
        let dir = tempfile::tempdir().expect("temp dir");
        let log = Log::default();
        let registry = SceneRegistry::new().with("Menu", Probe::boxed("Menu", &log));
        let config = EngineConfig {
            screenshot_dir: dir.path().to_path_buf(),
            ..test_config()
        };
        let mut engine = Engine::new(config, registry).expect("engine");
        let mut frame = vec![0; 64 * 48 * 4];

        engine.push_event(EngineEvent::KeyPressed {
            key: KeyCode::KeyS,
            control: true,
            shift: true,
            alt: false,
        });
        engine.run_frame(&mut frame).expect("frame");

        let saved: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "png"))
            .collect();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn shutdown_cleans_up_once() {
        let log = Log::default();
        let (mut engine, mut frame) = engine_with(vec![Probe::boxed("Menu", &log)]);
        engine.run_frame(&mut frame).expect("frame");
        drain(&log);

        engine.shutdown();
        engine.shutdown();

        assert_eq!(drain(&log), ["Menu:cleanup"]);
    }
}
