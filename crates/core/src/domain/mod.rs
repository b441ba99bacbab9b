pub mod category;
pub mod predicate;
pub mod session;
