use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::catalog::{Catalog, Game, GameId};
use crate::config::SolverConfig;
use crate::errors::ApplicationError;
use crate::query::SolverQuery;

/// Argument replaced with the staged program path when building the engine command line.
pub const PROGRAM_PLACEHOLDER: &str = "{program}";

const BINDING_PREFIX: &str = "Game =";

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("could not read rule base `{path}`: {source}")]
    ReadRules { path: PathBuf, source: std::io::Error },
    #[error("could not stage solver program: {0}")]
    Stage(#[source] std::io::Error),
    #[error("could not start reasoning engine `{command}`: {source}")]
    Spawn { command: String, source: std::io::Error },
    #[error("reasoning engine exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
}

#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// First satisfying binding of `Game` for the goal, or `None` when there is no model.
    async fn first_model(&self, query: &SolverQuery) -> Result<Option<GameId>, SolverError>;
}

/// Full program text: base rules followed by exactly one goal line.
pub fn compose_program(base_rules: &str, query: &SolverQuery) -> String {
    let mut program = String::with_capacity(base_rules.len() + query.as_str().len() + 2);
    program.push_str(base_rules);
    if !program.is_empty() && !program.ends_with('\n') {
        program.push('\n');
    }
    program.push_str(query.as_str());
    program.push('\n');
    program
}

/// Scans engine output for the first `Game = <id>` line.
pub fn parse_model(output: &str) -> Option<GameId> {
    output
        .lines()
        .find(|line| line.starts_with(BINDING_PREFIX))
        .and_then(|line| line.split_once('='))
        .map(|(_, identifier)| identifier.trim())
        .filter(|identifier| !identifier.is_empty())
        .map(|identifier| GameId(identifier.to_string()))
}

/// s(CASP) process gateway. The rule file is re-read for every query and the composed
/// program is written to a fresh temporary file that is removed once the run finishes.
#[derive(Clone, Debug)]
pub struct ScaspEngine {
    command: String,
    args: Vec<String>,
    rules_path: PathBuf,
}

impl ScaspEngine {
    pub fn new(command: impl Into<String>, args: Vec<String>, rules_path: PathBuf) -> Self {
        Self { command: command.into(), args, rules_path }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone(), config.rules_path.clone())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn rules_path(&self) -> &Path {
        &self.rules_path
    }

    pub async fn load_rules(&self) -> Result<String, SolverError> {
        tokio::fs::read_to_string(&self.rules_path)
            .await
            .map_err(|source| SolverError::ReadRules { path: self.rules_path.clone(), source })
    }

    /// Runs the engine once and returns its standard output.
    pub async fn run(&self, query: &SolverQuery) -> Result<String, SolverError> {
        let base_rules = self.load_rules().await?;
        let program = compose_program(&base_rules, query);
        let staged = stage_program(&program)?;

        debug!(
            event_name = "solver.program_staged",
            path = %staged.path().display(),
            goal = %query,
            "solver program staged"
        );

        let output = Command::new(&self.command)
            .args(self.command_args(staged.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SolverError::Spawn { command: self.command.clone(), source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(
                event_name = "solver.exit_failure",
                status = %output.status,
                stderr = %stderr,
                "reasoning engine failed"
            );
            return Err(SolverError::Exit { status: output.status.to_string(), stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command_args(&self, program: &Path) -> Vec<String> {
        let program = program.display().to_string();
        if self.args.iter().any(|arg| arg == PROGRAM_PLACEHOLDER) {
            return self
                .args
                .iter()
                .map(|arg| if arg == PROGRAM_PLACEHOLDER { program.clone() } else { arg.clone() })
                .collect();
        }

        std::iter::once(program).chain(self.args.iter().cloned()).collect()
    }
}

#[async_trait]
impl ReasoningEngine for ScaspEngine {
    async fn first_model(&self, query: &SolverQuery) -> Result<Option<GameId>, SolverError> {
        let stdout = self.run(query).await?;
        let model = parse_model(&stdout);

        match &model {
            Some(identifier) => {
                info!(event_name = "solver.model_found", identifier = %identifier, "model found")
            }
            None => info!(event_name = "solver.no_model", goal = %query, "no model found"),
        }

        Ok(model)
    }
}

/// Runs the goal and maps the bound identifier to its catalog entry. `Ok(None)` is the
/// no-model outcome; an identifier missing from the catalog is an error.
pub async fn resolve_game<E>(
    engine: &E,
    catalog: &Catalog,
    query: &SolverQuery,
) -> Result<Option<Game>, ApplicationError>
where
    E: ReasoningEngine + ?Sized,
{
    let Some(identifier) = engine.first_model(query).await? else {
        return Ok(None);
    };
    let game = catalog.lookup(&identifier)?;
    Ok(Some(game.clone()))
}

fn stage_program(program: &str) -> Result<NamedTempFile, SolverError> {
    let mut staged = tempfile::Builder::new()
        .prefix("gamewise-")
        .suffix(".pl")
        .tempfile()
        .map_err(SolverError::Stage)?;
    staged.write_all(program.as_bytes()).map_err(SolverError::Stage)?;
    staged.flush().map_err(SolverError::Stage)?;
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::{compose_program, parse_model};
    use crate::catalog::GameId;
    use crate::domain::predicate::PredicateSet;
    use crate::query::SolverQuery;

    fn goal() -> SolverQuery {
        let predicates =
            PredicateSet::parse_list("genre(Game,moba)").expect("fixture goal should parse");
        SolverQuery::build(&predicates)
    }

    #[test]
    fn program_is_rules_then_single_goal_line() {
        let program = compose_program("game(a).\ngenre(a, moba).", &goal());
        assert_eq!(program, "game(a).\ngenre(a, moba).\n?- genre(Game,moba).\n");

        let program = compose_program("game(a).\n", &goal());
        assert_eq!(program.matches("?-").count(), 1);
        assert!(program.starts_with("game(a).\n?- "));
    }

    #[test]
    fn parses_first_binding_line() {
        let output = "% QUERY:?- genre(Game,moba).\n\nANSWER:\t1 (in 0.3 ms)\n\nJUSTIFICATION_TREE:\n\nGame = leagueoflegends\nGame = sekiro\n";
        assert_eq!(parse_model(output), Some(GameId("leagueoflegends".to_string())));
    }

    #[test]
    fn identifier_is_trimmed() {
        assert_eq!(parse_model("Game =   eldenring  \r"), Some(GameId("eldenring".to_string())));
    }

    #[test]
    fn missing_binding_is_no_model() {
        assert_eq!(parse_model("% QUERY:?- price(Game,cheap).\n\nno models\n"), None);
        assert_eq!(parse_model("  Game = indented\n"), None);
        assert_eq!(parse_model("Game =\n"), None);
        assert_eq!(parse_model(""), None);
    }

    mod resolve {
        use async_trait::async_trait;

        use super::goal;
        use crate::catalog::{Catalog, GameId};
        use crate::errors::{ApplicationError, DomainError};
        use crate::query::SolverQuery;
        use crate::solver::{resolve_game, ReasoningEngine, SolverError};

        struct Fixed(Option<&'static str>);

        #[async_trait]
        impl ReasoningEngine for Fixed {
            async fn first_model(
                &self,
                _query: &SolverQuery,
            ) -> Result<Option<GameId>, SolverError> {
                Ok(self.0.map(|id| GameId(id.to_string())))
            }
        }

        #[tokio::test]
        async fn bound_identifier_resolves_to_title() -> Result<(), ApplicationError> {
            let game = resolve_game(&Fixed(Some("sekiro")), &Catalog::builtin(), &goal()).await?;
            assert_eq!(game.map(|game| game.title), Some("Sekiro: Shadows Die Twice".to_string()));
            Ok(())
        }

        #[tokio::test]
        async fn no_model_skips_the_catalog() -> Result<(), ApplicationError> {
            let game = resolve_game(&Fixed(None), &Catalog::new(Vec::new()), &goal()).await?;
            assert!(game.is_none());
            Ok(())
        }

        #[tokio::test]
        async fn unknown_identifier_is_fatal() {
            let result = resolve_game(&Fixed(Some("pong")), &Catalog::builtin(), &goal()).await;
            assert!(matches!(
                result,
                Err(ApplicationError::Domain(DomainError::UnknownGame { ref identifier }))
                    if identifier == "pong"
            ));
        }
    }

    #[cfg(unix)]
    mod process {
        use std::path::PathBuf;

        use tempfile::TempDir;

        use super::goal;
        use crate::catalog::GameId;
        use crate::solver::{ReasoningEngine, ScaspEngine, SolverError};

        fn fixture(script: &str) -> Result<(TempDir, ScaspEngine), String> {
            let dir = TempDir::new().map_err(|err| err.to_string())?;
            let rules = dir.path().join("games.pl");
            std::fs::write(&rules, "game(leagueoflegends).\ngenre(leagueoflegends, moba).\n")
                .map_err(|err| err.to_string())?;
            let engine = ScaspEngine::new(
                "sh",
                vec![
                    "-c".to_string(),
                    script.to_string(),
                    "sh".to_string(),
                    "{program}".to_string(),
                ],
                rules,
            );
            Ok((dir, engine))
        }

        #[tokio::test]
        async fn engine_sees_rules_and_goal() -> Result<(), String> {
            let (_dir, engine) = fixture(
                "grep -q 'genre(leagueoflegends, moba)' \"$1\" && grep -qF -- '?- genre(Game,moba).' \"$1\" && echo 'Game = leagueoflegends'",
            )?;

            let model = engine.first_model(&goal()).await.map_err(|err| err.to_string())?;
            assert_eq!(model, Some(GameId("leagueoflegends".to_string())));
            Ok(())
        }

        #[tokio::test]
        async fn staged_program_is_removed_after_the_run() -> Result<(), String> {
            let (_dir, engine) = fixture("echo \"$1\"")?;

            let stdout = engine.run(&goal()).await.map_err(|err| err.to_string())?;
            let staged = PathBuf::from(stdout.trim());
            assert!(staged.extension().is_some_and(|ext| ext == "pl"));
            assert!(!staged.exists(), "staged program should be cleaned up");
            Ok(())
        }

        #[tokio::test]
        async fn rules_are_reread_for_every_query() -> Result<(), String> {
            let (dir, engine) = fixture("grep -c '^?-' \"$1\"")?;

            let first = engine.run(&goal()).await.map_err(|err| err.to_string())?;
            std::fs::write(dir.path().join("games.pl"), "game(sekiro).\n")
                .map_err(|err| err.to_string())?;
            let second = engine.run(&goal()).await.map_err(|err| err.to_string())?;

            assert_eq!(first.trim(), "1");
            assert_eq!(second.trim(), "1", "goals from earlier runs must not accumulate");
            Ok(())
        }

        #[tokio::test]
        async fn empty_output_means_no_model() -> Result<(), String> {
            let (_dir, engine) = fixture("echo 'no models'")?;
            let model = engine.first_model(&goal()).await.map_err(|err| err.to_string())?;
            assert_eq!(model, None);
            Ok(())
        }

        #[tokio::test]
        async fn non_zero_exit_is_fatal() -> Result<(), String> {
            let (_dir, engine) = fixture("echo 'syntax error' >&2; exit 3")?;

            match engine.first_model(&goal()).await {
                Err(SolverError::Exit { stderr, .. }) => {
                    assert_eq!(stderr, "syntax error");
                    Ok(())
                }
                other => Err(format!("expected exit failure, got {other:?}")),
            }
        }

        #[tokio::test]
        async fn missing_rule_file_is_reported() -> Result<(), String> {
            let engine = ScaspEngine::new("sh", Vec::new(), PathBuf::from("/nonexistent/games.pl"));
            assert!(matches!(
                engine.first_model(&goal()).await,
                Err(SolverError::ReadRules { .. })
            ));
            Ok(())
        }

        #[tokio::test]
        async fn missing_binary_is_a_spawn_error() -> Result<(), String> {
            let (_dir, engine) = fixture("true")?;
            let engine = ScaspEngine::new(
                "gamewise-no-such-solver",
                Vec::new(),
                engine.rules_path().to_path_buf(),
            );
            assert!(matches!(engine.first_model(&goal()).await, Err(SolverError::Spawn { .. })));
            Ok(())
        }
    }
}
