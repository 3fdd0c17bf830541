mod breakout;
mod menu;
mod orbit;

use engine::SceneRegistry;

pub(crate) const MENU_SCENE: &str = "Menu";
pub(crate) const BREAKOUT_SCENE: &str = "Breakout";
pub(crate) const ORBIT_SCENE: &str = "Orbit";

/// Every scene the arcade ships, menu first.
pub(crate) fn build_registry() -> SceneRegistry {
    SceneRegistry::new()
        .with(MENU_SCENE, Box::new(menu::MenuScene::new()))
        .with(BREAKOUT_SCENE, Box::new(breakout::BreakoutScene::new()))
        .with(ORBIT_SCENE, Box::new(orbit::OrbitScene::new()))
}
