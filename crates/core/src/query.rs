use std::fmt;

use crate::domain::predicate::{PredicateParseError, PredicateSet};

const GOAL_PREFIX: &str = "?- ";
const GOAL_SUFFIX: &str = ".";

/// Goal line asking the reasoning engine for a `Game` consistent with every predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverQuery(String);

impl SolverQuery {
    /// Renders predicates verbatim, in accumulated order, with no deduplication.
    ///
    /// An empty set renders as `?- .`, which the engine rejects as a malformed goal.
    pub fn build(predicates: &PredicateSet) -> Self {
        Self(format!("{GOAL_PREFIX}{predicates}{GOAL_SUFFIX}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the goal body back into predicates.
    pub fn predicates(&self) -> Result<PredicateSet, PredicateParseError> {
        let body = self
            .0
            .strip_prefix(GOAL_PREFIX)
            .and_then(|rest| rest.strip_suffix(GOAL_SUFFIX))
            .ok_or_else(|| PredicateParseError::Malformed { token: self.0.clone() })?;
        PredicateSet::parse_list(body)
    }
}

impl fmt::Display for SolverQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
