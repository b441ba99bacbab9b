use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::domain::predicate::PredicateParseError;
use crate::solver::SolverError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    PredicateSyntax(#[from] PredicateParseError),
    #[error("reasoning engine returned `{identifier}`, which is not in the catalog")]
    UnknownGame { identifier: String },
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("integration failure: {0}")]
    Integration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI outcome payloads.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::PredicateSyntax(_)) => "predicate_syntax",
            Self::Domain(DomainError::UnknownGame { .. }) => "catalog_lookup",
            Self::Solver(_) => "solver_invocation",
            Self::Catalog(_) | Self::Configuration(_) => "config_validation",
            Self::Integration(_) => "integration",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) | Self::Catalog(_) => 2,
            Self::Solver(_) => 3,
            Self::Domain(DomainError::UnknownGame { .. }) => 4,
            Self::Domain(DomainError::PredicateSyntax(_)) => 5,
            Self::Integration(_) => 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::predicate::PredicateParseError;
    use crate::errors::{ApplicationError, DomainError};
    use crate::solver::SolverError;

    #[test]
    fn unknown_game_is_a_catalog_lookup_failure() {
        let error = ApplicationError::from(DomainError::UnknownGame {
            identifier: "halflife3".to_owned(),
        });

        assert_eq!(error.error_class(), "catalog_lookup");
        assert_eq!(error.exit_code(), 4);
        assert!(error.to_string().contains("halflife3"));
    }

    #[test]
    fn solver_exit_is_a_solver_invocation_failure() {
        let error = ApplicationError::from(SolverError::Exit {
            status: "exit status: 1".to_owned(),
            stderr: "syntax error".to_owned(),
        });

        assert_eq!(error.error_class(), "solver_invocation");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn predicate_syntax_errors_keep_their_message() {
        let error = ApplicationError::from(DomainError::from(PredicateParseError::Empty));

        assert_eq!(error.error_class(), "predicate_syntax");
        assert_eq!(error.to_string(), "empty predicate token");
    }
}
