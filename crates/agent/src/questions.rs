use anyhow::Result;
use gamewise_core::Predicate;

use crate::llm::LlmClient;
use crate::prompts::QUESTION_INSTRUCTION;

pub struct QuestionGenerator<'a, L: ?Sized> {
    llm: &'a L,
}

impl<'a, L> QuestionGenerator<'a, L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(llm: &'a L) -> Self {
        Self { llm }
    }

    /// Clarifying question for a placeholder such as `price(Game,X)`. The reply is shown to
    /// the user as-is.
    pub async fn question_for(&self, placeholder: &Predicate) -> Result<String> {
        let question = self.llm.complete(QUESTION_INSTRUCTION, &placeholder.to_string()).await?;
        Ok(question.trim().to_string())
    }
}
