use crate::domain::category::Category;
use crate::domain::predicate::PredicateSet;

/// Predicates accumulated over one dialogue. A category is satisfied once at least one
/// predicate of that category is present.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    predicates: PredicateSet,
}

impl SessionState {
    pub fn new(initial: PredicateSet) -> Self {
        Self { predicates: initial }
    }

    /// Appends without merging; conflicting values stay for the reasoning engine to judge.
    pub fn append(&mut self, predicates: PredicateSet) {
        self.predicates.append(predicates);
    }

    pub fn is_satisfied(&self, category: Category) -> bool {
        self.predicates.has_category(category)
    }

    pub fn satisfied_categories(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|category| self.is_satisfied(*category)).collect()
    }

    pub fn missing_categories(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|category| !self.is_satisfied(*category)).collect()
    }

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    pub fn into_predicates(self) -> PredicateSet {
        self.predicates
    }
}
