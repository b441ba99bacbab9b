use anyhow::Result;
use gamewise_core::{PredicateParseError, PredicateSet, RejectedToken};
use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::prompts::extraction_instruction;

const OUTPUT_LABEL: &str = "Output:";

/// Outcome of one extraction call. Tokens that do not follow the predicate grammar are kept
/// verbatim for diagnostics while the well-formed ones next to them still count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    Parsed { predicates: PredicateSet, rejected: Vec<RejectedToken> },
    /// The reply could not be split into tokens at all (unbalanced parentheses).
    Rejected { raw: String, error: PredicateParseError },
}

impl Extraction {
    pub fn interpret(raw: &str) -> Self {
        match PredicateSet::parse_lenient(normalize_reply(raw)) {
            Ok((predicates, rejected)) => Self::Parsed { predicates, rejected },
            Err(error) => Self::Rejected { raw: raw.to_string(), error },
        }
    }

    /// True when any part of the reply was dropped.
    pub fn has_rejections(&self) -> bool {
        match self {
            Self::Parsed { rejected, .. } => !rejected.is_empty(),
            Self::Rejected { .. } => true,
        }
    }

    /// Predicates to add to the session. Rejected tokens are logged and contribute nothing.
    pub fn into_predicates(self) -> PredicateSet {
        match self {
            Self::Parsed { predicates, rejected } => {
                for RejectedToken { token, error } in &rejected {
                    warn!(
                        event_name = "extraction.token_rejected",
                        token = %token,
                        error = %error,
                        "discarding token that does not match the predicate grammar"
                    );
                }
                predicates
            }
            Self::Rejected { raw, error } => {
                warn!(
                    event_name = "extraction.rejected",
                    raw = %raw,
                    error = %error,
                    "discarding extraction that cannot be split into predicates"
                );
                PredicateSet::new()
            }
        }
    }
}

/// Strips an echoed `Output:` label and a closing full stop.
fn normalize_reply(raw: &str) -> &str {
    let reply = raw.trim();
    let reply = reply.strip_prefix(OUTPUT_LABEL).unwrap_or(reply);
    reply.trim().trim_end_matches('.').trim_end()
}

pub struct PredicateExtractor<'a, L: ?Sized> {
    llm: &'a L,
    instruction: String,
}

impl<'a, L> PredicateExtractor<'a, L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(llm: &'a L) -> Self {
        Self { llm, instruction: extraction_instruction() }
    }

    pub async fn extract(&self, utterance: &str) -> Result<Extraction> {
        let raw = self.llm.complete(&self.instruction, utterance).await?;
        let extraction = Extraction::interpret(&raw);
        if let Extraction::Parsed { predicates, rejected } = &extraction {
            debug!(
                event_name = "extraction.parsed",
                predicates = %predicates,
                count = predicates.len(),
                rejected = rejected.len(),
                "predicates extracted"
            );
        }
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use gamewise_core::{Category, PredicateParseError, PredicateSet};

    use super::{Extraction, PredicateExtractor};
    use crate::testing::ScriptedLlm;

    #[test]
    fn well_formed_reply_is_parsed() -> Result<(), PredicateParseError> {
        let extraction = Extraction::interpret("genre(Game,soulslike), price(Game,cheap)");
        assert!(!extraction.has_rejections());
        assert_eq!(
            extraction.into_predicates(),
            PredicateSet::parse_list("genre(Game,soulslike), price(Game,cheap)")?
        );
        Ok(())
    }

    #[test]
    fn empty_reply_is_an_empty_set() {
        let extraction = Extraction::interpret("");
        assert!(!extraction.has_rejections());
        assert!(extraction.into_predicates().is_empty());
    }

    #[test]
    fn one_bad_token_keeps_the_rest_of_the_reply() {
        let extraction = Extraction::interpret(
            "genre(Game,shooter), genre(Game,rpg), platform(Game,pc), pov(Game,X)",
        );

        let Extraction::Parsed { rejected, .. } = &extraction else {
            panic!("expected a parsed extraction, got {extraction:?}");
        };
        let tokens = rejected.iter().map(|rejected| rejected.token.as_str()).collect::<Vec<_>>();
        assert_eq!(tokens, vec!["genre(Game,rpg)", "pov(Game,X)"]);
        assert!(matches!(rejected[0].error, PredicateParseError::ValueOutOfDomain { .. }));
        assert!(matches!(rejected[1].error, PredicateParseError::UnboundValue { .. }));

        assert_eq!(
            extraction.into_predicates().to_string(),
            "genre(Game,shooter), platform(Game,pc)"
        );
    }

    #[test]
    fn output_label_and_full_stop_are_tolerated() {
        let extraction = Extraction::interpret("Output: genre(Game,moba), price(Game,cheap).\n");
        assert!(!extraction.has_rejections());
        assert_eq!(extraction.into_predicates().to_string(), "genre(Game,moba), price(Game,cheap)");
    }

    #[test]
    fn chatty_reply_is_dropped_token_by_token() {
        let extraction = Extraction::interpret("Sure! Here you go: genre(Game,shooter)");
        assert!(matches!(
            &extraction,
            Extraction::Parsed { predicates, rejected }
                if predicates.is_empty()
                    && rejected.len() == 1
                    && matches!(rejected[0].error, PredicateParseError::Malformed { .. })
        ));
        assert!(extraction.into_predicates().is_empty());
    }

    #[test]
    fn unbalanced_reply_is_rejected_with_raw_text() {
        let extraction = Extraction::interpret("genre(Game,shooter), platform(Game,pc");
        assert!(matches!(
            &extraction,
            Extraction::Rejected { raw, error: PredicateParseError::Unbalanced { .. } }
                if raw.starts_with("genre(Game,shooter)")
        ));
        assert!(extraction.has_rejections());
        assert!(extraction.into_predicates().is_empty());
    }

    #[tokio::test]
    async fn extractor_sends_utterance_with_grammar_instruction() -> anyhow::Result<()> {
        let llm =
            ScriptedLlm::new(["num_players(Game,singleplayer), num_players(Game,multiplayer)"]);
        let extractor = PredicateExtractor::new(&llm);

        let extraction = extractor.extract("num_players(Game,X)? Both.").await?;
        assert_eq!(extraction.into_predicates().values_for(Category::NumPlayers).len(), 2);

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].instruction.contains("semantic parser"));
        assert_eq!(calls[0].utterance, "num_players(Game,X)? Both.");
        Ok(())
    }
}
