use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::category::Category;

/// Subject placeholder every predicate is stated about. The reasoning engine binds it to the
/// recommended game.
pub const SUBJECT: &str = "Game";

/// Variable name used in placeholder predicates such as `pov(Game,X)`.
pub const PLACEHOLDER_VARIABLE: &str = "X";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PredicateParseError {
    #[error("empty predicate token")]
    Empty,
    #[error("`{token}` does not match `category(Game,value)`")]
    Malformed { token: String },
    #[error("unknown category `{name}`")]
    UnknownCategory { name: String },
    #[error("predicate `{token}` must be stated about `Game`")]
    UnexpectedSubject { token: String },
    #[error("`{value}` is not a valid {category} value")]
    ValueOutOfDomain { category: Category, value: String },
    #[error("unbalanced parentheses in `{text}`")]
    Unbalanced { text: String },
    #[error("`{token}` leaves the value unbound")]
    UnboundValue { token: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Ground(String),
    Variable(String),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ground(value) | Self::Variable(value) => f.write_str(value),
        }
    }
}

/// A fact `category(Game,value)`, or a placeholder `category(Game,X)` when the value is a
/// variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Predicate {
    category: Category,
    term: Term,
}

impl Predicate {
    /// Ground fact for `value`, which must belong to the category's domain.
    pub fn ground(
        category: Category,
        value: impl Into<String>,
    ) -> Result<Self, PredicateParseError> {
        let value = value.into();
        if !category.accepts(&value) {
            return Err(PredicateParseError::ValueOutOfDomain { category, value });
        }
        Ok(Self { category, term: Term::Ground(value) })
    }

    pub fn placeholder(category: Category) -> Self {
        Self { category, term: Term::Variable(PLACEHOLDER_VARIABLE.to_string()) }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn is_ground(&self) -> bool {
        matches!(self.term, Term::Ground(_))
    }

    pub fn value(&self) -> Option<&str> {
        match &self.term {
            Term::Ground(value) => Some(value),
            Term::Variable(_) => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({SUBJECT},{})", self.category, self.term)
    }
}

impl std::str::FromStr for Predicate {
    type Err = PredicateParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        if token.is_empty() {
            return Err(PredicateParseError::Empty);
        }
        let malformed = || PredicateParseError::Malformed { token: token.to_string() };

        let (name, rest) = token.split_once('(').ok_or_else(malformed)?;
        let arguments = rest.strip_suffix(')').ok_or_else(malformed)?;
        let (subject, value) = arguments.split_once(',').ok_or_else(malformed)?;
        let (name, subject, value) = (name.trim(), subject.trim(), value.trim());

        let is_atom_like = |text: &str| {
            !text.is_empty()
                && text.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-'))
        };
        if !is_atom_like(name) || !is_atom_like(subject) || !is_atom_like(value) {
            return Err(malformed());
        }

        let category = name.parse::<Category>()?;
        if subject != SUBJECT {
            return Err(PredicateParseError::UnexpectedSubject { token: token.to_string() });
        }

        let term = if is_variable(value) {
            Term::Variable(value.to_string())
        } else if category.accepts(value) {
            Term::Ground(value.to_string())
        } else {
            return Err(PredicateParseError::ValueOutOfDomain {
                category,
                value: value.to_string(),
            });
        };

        Ok(Self { category, term })
    }
}

fn is_variable(value: &str) -> bool {
    value.chars().next().map(|first| first.is_ascii_uppercase() || first == '_').unwrap_or(false)
}

/// A list token that did not yield a ground predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RejectedToken {
    pub token: String,
    pub error: PredicateParseError,
}

/// Ordered predicates. Insertion order is kept and duplicates are allowed, so a category may
/// carry several values (a "both" answer yields two `num_players` facts).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PredicateSet(Vec<Predicate>);

impl PredicateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma separated predicate list. Commas inside parentheses belong to the
    /// predicate; blank text is an empty set.
    pub fn parse_list(text: &str) -> Result<Self, PredicateParseError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        split_top_level(text)?
            .into_iter()
            .map(str::parse::<Predicate>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Parses each top-level token on its own. Ground predicates are kept in order; tokens
    /// that fail to parse or leave the value unbound come back with their error. Only
    /// unbalanced parentheses fail the whole text, since tokens cannot be told apart then.
    pub fn parse_lenient(text: &str) -> Result<(Self, Vec<RejectedToken>), PredicateParseError> {
        let mut predicates = Self::new();
        let mut rejected = Vec::new();
        if text.trim().is_empty() {
            return Ok((predicates, rejected));
        }

        for token in split_top_level(text)? {
            match token.parse::<Predicate>() {
                Ok(predicate) if predicate.is_ground() => predicates.push(predicate),
                Ok(predicate) => rejected.push(RejectedToken {
                    token: token.trim().to_string(),
                    error: PredicateParseError::UnboundValue { token: predicate.to_string() },
                }),
                Err(error) => {
                    rejected.push(RejectedToken { token: token.trim().to_string(), error })
                }
            }
        }
        Ok((predicates, rejected))
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.0.push(predicate);
    }

    pub fn append(&mut self, other: PredicateSet) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.0.iter().any(|predicate| predicate.category == category)
    }

    pub fn values_for(&self, category: Category) -> Vec<&str> {
        self.0
            .iter()
            .filter(|predicate| predicate.category == category)
            .filter_map(Predicate::value)
            .collect()
    }

    pub fn as_slice(&self) -> &[Predicate] {
        &self.0
    }

    /// Fails on the first predicate whose value is still a variable.
    pub fn require_ground(&self) -> Result<(), PredicateParseError> {
        match self.0.iter().find(|predicate| !predicate.is_ground()) {
            Some(predicate) => {
                Err(PredicateParseError::UnboundValue { token: predicate.to_string() })
            }
            None => Ok(()),
        }
    }
}

impl fmt::Display for PredicateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.0.iter().map(ToString::to_string).collect::<Vec<_>>();
        f.write_str(&rendered.join(", "))
    }
}

impl FromIterator<Predicate> for PredicateSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PredicateSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn split_top_level(text: &str) -> Result<Vec<&str>, PredicateParseError> {
    let unbalanced = || PredicateParseError::Unbalanced { text: text.to_string() };
    let mut pieces = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            ',' if depth == 0 => {
                pieces.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(unbalanced());
    }
    pieces.push(&text[start..]);

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::{Predicate, PredicateParseError, PredicateSet, RejectedToken, Term};
    use crate::domain::category::Category;

    #[test]
    fn parses_ground_predicate() -> Result<(), PredicateParseError> {
        let predicate = "genre(Game,shooter)".parse::<Predicate>();
        assert_eq!(predicate, Ok(Predicate::ground(Category::Genre, "shooter")?));
        Ok(())
    }

    #[test]
    fn ground_constructor_checks_the_domain() {
        assert_eq!(
            Predicate::ground(Category::Price, "free"),
            Err(PredicateParseError::ValueOutOfDomain {
                category: Category::Price,
                value: "free".to_string()
            })
        );
        assert!(Predicate::ground(Category::Setting, "post-apocalyptic").is_ok());
    }

    #[test]
    fn tolerates_whitespace_but_renders_canonically() {
        let predicate = " num_players( Game , multiplayer ) ".parse::<Predicate>();
        let rendered = predicate.map(|predicate| predicate.to_string());
        assert_eq!(rendered.as_deref(), Ok("num_players(Game,multiplayer)"));
    }

    #[test]
    fn placeholder_renders_with_variable() {
        let placeholder = Predicate::placeholder(Category::Pov);
        assert_eq!(placeholder.to_string(), "pov(Game,X)");
        assert!(!placeholder.is_ground());
        assert_eq!("pov(Game,X)".parse::<Predicate>().map(|p| p.term), Ok(placeholder.term));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let cases = [
            "genre shooter",
            "genre(Game,shooter",
            "genre(Game)",
            "genre(Game,shooter,pc)",
            "Output: genre(Game,shooter)",
            "genre(Game,shooter).",
        ];
        for case in cases {
            assert!(
                matches!(case.parse::<Predicate>(), Err(PredicateParseError::Malformed { .. })),
                "expected malformed: {case}"
            );
        }
    }

    #[test]
    fn rejects_unknown_category_subject_and_value() {
        assert!(matches!(
            "difficulty(Game,hard)".parse::<Predicate>(),
            Err(PredicateParseError::UnknownCategory { .. })
        ));
        assert!(matches!(
            "genre(Movie,shooter)".parse::<Predicate>(),
            Err(PredicateParseError::UnexpectedSubject { .. })
        ));
        assert_eq!(
            "price(Game,free)".parse::<Predicate>(),
            Err(PredicateParseError::ValueOutOfDomain {
                category: Category::Price,
                value: "free".to_string()
            })
        );
    }

    #[test]
    fn parse_list_keeps_order_and_duplicates() -> Result<(), PredicateParseError> {
        let set = PredicateSet::parse_list(
            "num_players(Game,singleplayer), num_players(Game,multiplayer), price(Game,cheap), price(Game,cheap)",
        )?;
        assert_eq!(set.len(), 4);
        assert_eq!(set.values_for(Category::NumPlayers), vec!["singleplayer", "multiplayer"]);
        assert_eq!(set.values_for(Category::Price), vec!["cheap", "cheap"]);
        Ok(())
    }

    #[test]
    fn parse_list_accepts_commas_without_spaces() -> Result<(), PredicateParseError> {
        let set = PredicateSet::parse_list("pov(Game,birdview),platform(Game,pc)")?;
        assert_eq!(set.to_string(), "pov(Game,birdview), platform(Game,pc)");
        Ok(())
    }

    #[test]
    fn blank_text_is_an_empty_set() {
        assert_eq!(PredicateSet::parse_list("  \n"), Ok(PredicateSet::new()));
    }

    #[test]
    fn one_bad_token_rejects_the_list() {
        assert!(PredicateSet::parse_list("genre(Game,shooter), I am not sure").is_err());
        assert!(matches!(
            PredicateSet::parse_list("genre(Game,(shooter)"),
            Err(PredicateParseError::Unbalanced { .. })
        ));
        assert_eq!(
            PredicateSet::parse_list("genre(Game,shooter), "),
            Err(PredicateParseError::Empty)
        );
    }

    #[test]
    fn lenient_parse_keeps_valid_tokens_next_to_bad_ones() -> Result<(), PredicateParseError> {
        let (set, rejected) = PredicateSet::parse_lenient(
            "genre(Game,shooter), genre(Game,rpg), I am not sure, pov(Game,X), platform(Game,pc)",
        )?;

        assert_eq!(set.to_string(), "genre(Game,shooter), platform(Game,pc)");
        let tokens = rejected.iter().map(|rejected| rejected.token.as_str()).collect::<Vec<_>>();
        assert_eq!(tokens, vec!["genre(Game,rpg)", "I am not sure", "pov(Game,X)"]);
        assert!(matches!(
            rejected.last(),
            Some(RejectedToken { error: PredicateParseError::UnboundValue { .. }, .. })
        ));
        Ok(())
    }

    #[test]
    fn lenient_parse_still_fails_on_unbalanced_text() {
        assert!(matches!(
            PredicateSet::parse_lenient("genre(Game,shooter), pov(Game,firstperson"),
            Err(PredicateParseError::Unbalanced { .. })
        ));
        assert_eq!(PredicateSet::parse_lenient(" "), Ok((PredicateSet::new(), Vec::new())));
    }

    #[test]
    fn require_ground_flags_placeholders() -> Result<(), PredicateParseError> {
        let set = PredicateSet::parse_list("genre(Game,mmo), pov(Game,X)")?;
        assert_eq!(
            set.require_ground(),
            Err(PredicateParseError::UnboundValue { token: "pov(Game,X)".to_string() })
        );
        Ok(())
    }

    #[test]
    fn variable_terms_are_recognised() {
        let predicate = "setting(Game,_Any)".parse::<Predicate>();
        assert_eq!(predicate.map(|p| p.term), Ok(Term::Variable("_Any".to_string())));
    }
}
