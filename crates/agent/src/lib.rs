//! Agent Runtime - LLM-backed dialogue for game recommendations
//!
//! This crate drives a single recommendation session:
//! - Extracts preference predicates from free text (`extractor`)
//! - Asks one clarifying question per missing category (`conversation`, `questions`)
//! - Hands the accumulated goal to the reasoning engine and names the result
//!   (`runtime`, `response`)
//!
//! # Safety Principle
//!
//! The LLM is strictly a translator. It never picks the game: the recommendation is whatever
//! the reasoning engine proves from the rule base, and the composer only phrases that title.

pub mod conversation;
pub mod extractor;
pub mod io;
pub mod llm;
pub mod prompts;
pub mod questions;
pub mod response;
pub mod runtime;

#[cfg(test)]
mod testing;
