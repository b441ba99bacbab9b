pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod query;
pub mod solver;

pub use catalog::{Catalog, CatalogError, Game, GameId};
pub use domain::category::Category;
pub use domain::predicate::{Predicate, PredicateParseError, PredicateSet, RejectedToken, Term};
pub use domain::session::SessionState;
pub use errors::{ApplicationError, DomainError};
pub use flows::{DialogueState, SlotFillingFlow, TransitionOutcome};
pub use query::SolverQuery;
pub use solver::{ReasoningEngine, ScaspEngine, SolverError};
