use engine::{ConfigError, EngineConfig, SceneRegistry};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::scenes;

pub(crate) struct AppWiring {
    pub(crate) config: EngineConfig,
    pub(crate) registry: SceneRegistry,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!("=== Arcade Startup ===");

    let config = EngineConfig::load_from_env()?;
    info!(
        title = %config.window_title,
        width = config.window_width,
        height = config.window_height,
        hub = %config.hub_scene,
        "window_configured"
    );

    Ok(AppWiring {
        config,
        registry: scenes::build_registry(),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
