use crate::domain::category::Category;
use crate::domain::session::SessionState;
use crate::flows::states::{DialogueState, TransitionOutcome};

/// Single pass over the category schema.
///
/// Each category is considered exactly once, in schema order: satisfied categories are
/// skipped, the first unsatisfied one becomes `AwaitingAnswer`. Once the schema is exhausted
/// the flow is `Done` and stays there, whether or not every category ended up satisfied.
/// A category whose answer yielded nothing gets no second round.
#[derive(Clone, Debug)]
pub struct SlotFillingFlow {
    state: DialogueState,
    cursor: usize,
}

impl Default for SlotFillingFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotFillingFlow {
    pub fn new() -> Self {
        Self { state: DialogueState::Init, cursor: 0 }
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    /// Moves to the next category that still needs a clarifying round.
    pub fn advance(&mut self, session: &SessionState) -> TransitionOutcome {
        let from = self.state;
        let mut skipped = Vec::new();

        if self.state.is_done() {
            return TransitionOutcome { from, to: from, skipped };
        }

        let mut next = DialogueState::Done;
        while let Some(category) = Category::ALL.get(self.cursor).copied() {
            self.cursor += 1;
            if session.is_satisfied(category) {
                skipped.push(category);
                continue;
            }
            next = DialogueState::AwaitingAnswer(category);
            break;
        }

        self.state = next;
        TransitionOutcome { from, to: next, skipped }
    }
}
