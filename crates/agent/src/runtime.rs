use anyhow::Result;
use gamewise_core::config::AppConfig;
use gamewise_core::solver::resolve_game;
use gamewise_core::{ApplicationError, Catalog, Game, ReasoningEngine, ScaspEngine, SolverQuery};
use tracing::info;

use crate::conversation::DialogueManager;
use crate::io::DialogueIo;
use crate::llm::{ChatCompletionsClient, LlmClient};
use crate::response::ResponseComposer;

/// Printed when the reasoning engine finds no assignment for the goal.
pub const NO_MODEL_MESSAGE: &str = "No model found";

/// Collaborators shared by every component of a session: built once at process start and
/// borrowed for the session's lifetime.
pub struct SessionContext<L, E> {
    pub llm: L,
    pub catalog: Catalog,
    pub engine: E,
}

impl SessionContext<ChatCompletionsClient, ScaspEngine> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let catalog = Catalog::from_config(&config.catalog).map_err(ApplicationError::from)?;
        let llm = ChatCompletionsClient::from_config(&config.llm)?;
        let engine = ScaspEngine::from_config(&config.solver);

        Ok(Self { llm, catalog, engine })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionReport {
    Recommended { game: Game, message: String, query: SolverQuery },
    NoModelFound { query: SolverQuery },
}

pub struct RecommendationRuntime<'a, L, E> {
    context: &'a SessionContext<L, E>,
}

impl<'a, L, E> RecommendationRuntime<'a, L, E>
where
    L: LlmClient,
    E: ReasoningEngine,
{
    pub fn new(context: &'a SessionContext<L, E>) -> Self {
        Self { context }
    }

    /// Dialogue, goal construction, one engine run, catalog lookup, final sentence.
    pub async fn run_session<I>(&self, io: &mut I) -> Result<SessionReport>
    where
        I: DialogueIo + ?Sized,
    {
        let outcome = DialogueManager::new(&self.context.llm).run(io).await?;
        let query = SolverQuery::build(outcome.session.predicates());
        info!(event_name = "query.built", goal = %query, "solver goal built");

        self.recommend(query, io).await
    }

    pub async fn recommend<I>(&self, query: SolverQuery, io: &mut I) -> Result<SessionReport>
    where
        I: DialogueIo + ?Sized,
    {
        let resolved = resolve_game(&self.context.engine, &self.context.catalog, &query).await?;
        let Some(game) = resolved else {
            io.say(NO_MODEL_MESSAGE)?;
            return Ok(SessionReport::NoModelFound { query });
        };

        let message = ResponseComposer::new(&self.context.llm).compose(&game.title).await?;
        io.say(&message)?;
        info!(
            event_name = "session.recommended",
            identifier = %game.id,
            "recommendation delivered"
        );

        Ok(SessionReport::Recommended { game, message, query })
    }
}
