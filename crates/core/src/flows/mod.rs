pub mod engine;
pub mod states;

pub use engine::SlotFillingFlow;
pub use states::{DialogueState, TransitionOutcome};
