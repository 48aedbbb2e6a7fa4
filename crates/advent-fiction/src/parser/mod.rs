//! Command parsing and object resolution.
//!
//! Input flows through four stages: [`tokenize`] splits the line,
//! [`Vocabulary::recognize`] consumes the longest verb prefix, the clause
//! splitter separates direct and indirect object phrases around a single
//! preposition, and [`ObjectMatcher::find_entity`] resolves each phrase to an
//! entity key. [`Parser::parse`] runs them all and returns a [`ParseTree`].

mod command;
mod lexer;
mod resolver;
mod vocabulary;

pub use command::{ParseFailure, ParseTree, Parser, Target, indefinite_article};
pub use lexer::tokenize;
pub use resolver::{ObjectMatcher, expand_adjectives, match_phrases, suggest_verb};
pub use vocabulary::Vocabulary;
