use gamewise_agent::runtime::NO_MODEL_MESSAGE;
use gamewise_core::config::{AppConfig, LoadOptions};
use gamewise_core::solver::resolve_game;
use gamewise_core::{
    ApplicationError, Catalog, DomainError, PredicateSet, ScaspEngine, SolverQuery,
};

use super::{current_thread_runtime, CommandOutcome, CommandResult};
use crate::logging::init_logging;

/// Runs the reasoning engine on the given predicates without any dialogue or LLM calls.
pub fn run(options: LoadOptions, predicates: &[String]) -> CommandResult {
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::config_failure("query", &error),
    };
    init_logging(&config.logging);

    match resolve(&config, predicates) {
        Ok(outcome) => CommandResult::outcome(0, outcome),
        Err(error) => {
            CommandResult::failure(
                "query",
                error.error_class(),
                error.to_string(),
                error.exit_code(),
            )
        }
    }
}

fn resolve(config: &AppConfig, predicates: &[String]) -> Result<CommandOutcome, ApplicationError> {
    let goal = parse_goal(predicates)?;
    let query = SolverQuery::build(&goal);
    let catalog = Catalog::from_config(&config.catalog)?;
    let engine = ScaspEngine::from_config(&config.solver);

    let runtime = current_thread_runtime().map_err(|error| {
        ApplicationError::Integration(format!("failed to initialize async runtime: {error}"))
    })?;
    let resolved = runtime.block_on(resolve_game(&engine, &catalog, &query))?;

    let outcome = match resolved {
        Some(game) => CommandOutcome {
            command: "query".to_string(),
            status: "ok".to_string(),
            message: format!("recommended {}", game.title),
            identifier: Some(game.id.to_string()),
            title: Some(game.title),
            query: Some(query.to_string()),
            ..CommandOutcome::default()
        },
        None => CommandOutcome {
            command: "query".to_string(),
            status: "no_model".to_string(),
            message: NO_MODEL_MESSAGE.to_string(),
            query: Some(query.to_string()),
            ..CommandOutcome::default()
        },
    };
    Ok(outcome)
}

fn parse_goal(predicates: &[String]) -> Result<PredicateSet, DomainError> {
    let mut goal = PredicateSet::new();
    for text in predicates {
        goal.append(PredicateSet::parse_list(text)?);
    }
    goal.require_ground()?;
    Ok(goal)
}
