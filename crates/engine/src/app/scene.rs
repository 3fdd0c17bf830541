use tracing::{debug, warn};

use super::engine::EngineContext;
use super::events::EngineEvent;

/// A self-contained mini-application hosted by the engine. Exactly one scene
/// is active at a time; the engine owns it from `start` until `on_cleanup`.
pub trait Scene {
    /// Bind actions and reset state. Runs on every (re)activation.
    fn start(&mut self, ctx: &mut EngineContext);
    fn update(&mut self, ctx: &mut EngineContext);
    fn render(&mut self, ctx: &mut EngineContext);
    /// Raw events, withheld while the pause overlay is visible.
    fn on_event(&mut self, _event: &EngineEvent, _ctx: &mut EngineContext) {}
    fn on_pause(&mut self, _paused: bool) {}
    fn on_cleanup(&mut self, _ctx: &mut EngineContext) {}
}

/// Name-keyed scene instances in registration order.
#[derive(Default)]
pub struct SceneRegistry {
    scenes: Vec<(String, Box<dyn Scene>)>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a taken name replaces the previous instance.
    pub fn register(&mut self, name: impl Into<String>, scene: Box<dyn Scene>) -> &mut Self {
        let name = name.into();
        if let Some(slot) = self.scenes.iter_mut().find(|(existing, _)| *existing == name) {
            warn!(scene = %name, "scene_registration_replaced");
            slot.1 = scene;
        } else {
            self.scenes.push((name, scene));
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, scene: Box<dyn Scene>) -> Self {
        self.register(name, scene);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scenes.iter().any(|(existing, _)| existing == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.scenes.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Scene + 'static)> {
        self.scenes
            .iter_mut()
            .find(|(existing, _)| existing == name)
            .map(|(_, scene)| scene.as_mut())
    }
}

/// Bookkeeping for which scene should be running. Requests are deferred and
/// resolved once per frame by the engine.
#[derive(Debug, Clone)]
pub struct SceneDirector {
    current: Option<String>,
    next: Option<String>,
    hub: String,
    names: Vec<String>,
}

impl SceneDirector {
    pub(crate) fn new(hub: impl Into<String>, names: Vec<String>) -> Self {
        Self {
            current: None,
            next: None,
            hub: hub.into(),
            names,
        }
    }

    /// First request in a frame wins; later ones are dropped until the
    /// pending one is fetched. Returns whether the request was recorded.
    pub fn change_scene(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if let Some(pending) = &self.next {
            debug!(requested = %name, pending = %pending, "scene_request_ignored");
            return false;
        }
        self.next = Some(name);
        true
    }

    pub fn restart_current_scene(&mut self) -> bool {
        match self.current.clone() {
            Some(current) => self.change_scene(current),
            None => false,
        }
    }

    pub fn return_to_hub(&mut self) -> bool {
        let hub = self.hub.clone();
        self.change_scene(hub)
    }

    pub fn current_scene(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn pending_scene(&self) -> Option<&str> {
        self.next.as_deref()
    }

    pub fn hub_scene(&self) -> &str {
        &self.hub
    }

    pub fn scene_names(&self) -> &[String] {
        &self.names
    }

    /// Promotes the pending request to current, even when it names the
    /// scene that is already current.
    pub(crate) fn fetch_next_scene(&mut self) -> Option<String> {
        let next = self.next.take()?;
        debug!(
            scene = %next,
            restart = self.current.as_deref() == Some(next.as_str()),
            "scene_transition_resolved"
        );
        self.current = Some(next.clone());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn director() -> SceneDirector {
        SceneDirector::new(
            "Menu",
            vec!["Menu".to_string(), "A".to_string(), "B".to_string()],
        )
    }

    struct Idle;

    impl Scene for Idle {
        fn start(&mut self, _ctx: &mut EngineContext) {}
        fn update(&mut self, _ctx: &mut EngineContext) {}
        fn render(&mut self, _ctx: &mut EngineContext) {}
    }

    #[test]
    fn fetch_consumes_the_pending_request() {
        let mut scenes = director();
        scenes.change_scene("A");
        assert_eq!(scenes.fetch_next_scene().as_deref(), Some("A"));
        assert_eq!(scenes.fetch_next_scene(), None);
        assert_eq!(scenes.current_scene(), Some("A"));
    }

    #[test]
    fn first_request_wins_within_a_frame() {
        let mut scenes = director();
        assert!(scenes.change_scene("A"));
        assert!(!scenes.change_scene("B"));
        assert_eq!(scenes.fetch_next_scene().as_deref(), Some("A"));
    }

    #[test]
    fn restart_round_trips_through_fetch() {
        let mut scenes = director();
        scenes.change_scene("B");
        assert_eq!(scenes.fetch_next_scene().as_deref(), Some("B"));
        assert!(scenes.restart_current_scene());
        assert_eq!(scenes.fetch_next_scene().as_deref(), Some("B"));
    }

    #[test]
    fn restart_without_current_scene_is_ignored() {
        let mut scenes = director();
        assert!(!scenes.restart_current_scene());
        assert_eq!(scenes.pending_scene(), None);
    }

    #[test]
    fn return_to_hub_requests_hub_scene() {
        let mut scenes = director();
        scenes.return_to_hub();
        assert_eq!(scenes.fetch_next_scene().as_deref(), Some("Menu"));
    }

    #[test]
    fn registry_keeps_registration_order_and_replaces_duplicates() {
        let mut registry = SceneRegistry::new()
            .with("Menu", Box::new(Idle))
            .with("Pong", Box::new(Idle));
        registry.register("Menu", Box::new(Idle));

        assert_eq!(registry.names(), vec!["Menu".to_string(), "Pong".to_string()]);
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Pong"));
        assert!(registry.get_mut("Snake").is_none());
    }
}
