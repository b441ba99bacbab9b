use gamewise_agent::io::TerminalIo;
use gamewise_agent::runtime::{RecommendationRuntime, SessionContext};
use gamewise_core::config::{AppConfig, LoadOptions};

use super::{current_thread_runtime, CommandResult};
use crate::logging::init_logging;

pub fn run(options: LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("chat", &error),
    };
    init_logging(&config.logging);

    let context = match SessionContext::from_config(&config) {
        Ok(context) => context,
        Err(error) => return CommandResult::from_error("chat", &error),
    };
    let runtime = match current_thread_runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "integration",
                format!("failed to initialize async runtime: {error}"),
                6,
            )
        }
    };

    let mut io = TerminalIo::stdio();
    match runtime.block_on(RecommendationRuntime::new(&context).run_session(&mut io)) {
        Ok(_) => CommandResult::quiet(),
        Err(error) => {
            tracing::error!(
                event_name = "session.failed",
                error = %format!("{error:#}"),
                "session aborted"
            );
            CommandResult::from_error("chat", &error)
        }
    }
}
