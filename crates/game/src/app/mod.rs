mod bootstrap;
mod loop_runner;
mod scenes;

use std::process::ExitCode;

use tracing::error;

pub(crate) fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "config_failed");
            ExitCode::FAILURE
        }
    }
}
