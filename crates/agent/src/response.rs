use anyhow::Result;

use crate::llm::LlmClient;
use crate::prompts::RECOMMENDATION_INSTRUCTION;

/// Turns a resolved display title into the final recommendation sentence. Keeping to the
/// given title is only requested of the service, not checked here.
pub struct ResponseComposer<'a, L: ?Sized> {
    llm: &'a L,
}

impl<'a, L> ResponseComposer<'a, L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(llm: &'a L) -> Self {
        Self { llm }
    }

    pub async fn compose(&self, title: &str) -> Result<String> {
        let message = self.llm.complete(RECOMMENDATION_INSTRUCTION, title).await?;
        Ok(message.trim().to_string())
    }
}
