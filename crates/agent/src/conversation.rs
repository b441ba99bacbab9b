use anyhow::Result;
use gamewise_core::{Category, DialogueState, Predicate, SessionState, SlotFillingFlow};
use tracing::{debug, info};

use crate::extractor::PredicateExtractor;
use crate::io::DialogueIo;
use crate::llm::LlmClient;
use crate::questions::QuestionGenerator;

pub const OPENING_PROMPT: &str = "Hello. How can I assist you today?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogueOutcome {
    pub session: SessionState,
    /// Categories a clarifying question was issued for, in the order asked.
    pub questions_asked: Vec<Category>,
    /// Extraction replies that had at least one token dropped.
    pub rejected_extractions: usize,
}

/// Slot-filling dialogue: one opening utterance, then at most one clarifying round per
/// category that the opening left unsatisfied.
pub struct DialogueManager<'a, L: ?Sized> {
    extractor: PredicateExtractor<'a, L>,
    questions: QuestionGenerator<'a, L>,
}

impl<'a, L> DialogueManager<'a, L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(llm: &'a L) -> Self {
        Self { extractor: PredicateExtractor::new(llm), questions: QuestionGenerator::new(llm) }
    }

    pub async fn run<I>(&self, io: &mut I) -> Result<DialogueOutcome>
    where
        I: DialogueIo + ?Sized,
    {
        let opening = io.ask(OPENING_PROMPT)?;
        let extraction = self.extractor.extract(&opening).await?;
        let mut rejected_extractions = usize::from(extraction.has_rejections());
        let mut session = SessionState::new(extraction.into_predicates());
        info!(
            event_name = "dialogue.opened",
            satisfied = session.satisfied_categories().len(),
            "opening utterance processed"
        );

        let mut flow = SlotFillingFlow::new();
        let mut questions_asked = Vec::new();

        loop {
            let transition = flow.advance(&session);
            let DialogueState::AwaitingAnswer(category) = transition.to else {
                break;
            };

            let placeholder = Predicate::placeholder(category);
            let question = self.questions.question_for(&placeholder).await?;
            info!(
                event_name = "dialogue.question_issued",
                category = %category,
                "asking for missing category"
            );
            let answer = io.ask(&question)?;
            questions_asked.push(category);

            let extraction =
                self.extractor.extract(&clarification_context(&placeholder, &answer)).await?;
            rejected_extractions += usize::from(extraction.has_rejections());
            session.append(extraction.into_predicates());

            if !session.is_satisfied(category) {
                debug!(
                    event_name = "dialogue.category_unresolved",
                    category = %category,
                    "answer did not satisfy the category; moving on without another round"
                );
            }
        }

        info!(
            event_name = "dialogue.completed",
            questions = questions_asked.len(),
            predicates = session.predicates().len(),
            "dialogue completed"
        );
        Ok(DialogueOutcome { session, questions_asked, rejected_extractions })
    }
}

/// Context handed to the extractor for a clarifying answer, e.g. `price(Game,X)? Under $30`.
pub fn clarification_context(placeholder: &Predicate, answer: &str) -> String {
    format!("{placeholder}? {answer}")
}
