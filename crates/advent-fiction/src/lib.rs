//! Interactive engine for the advent text adventure.
//!
//! Turns raw player input into world changes. The [`parser`] reads a line
//! into a [`ParseTree`], the [`dispatch`] layer routes it to per-object
//! behaviors or the generic verb table, and a [`Session`] ties those
//! together with dialogue and vending-machine modes. Scenarios are loaded
//! from JSON through [`ScenarioFile`].

/// Session tunables.
pub mod config;
/// Branching conversation graphs.
pub mod dialogue;
/// Command routing, generic verbs and object behaviors.
pub mod dispatch;
/// Error types for the engine.
pub mod error;
/// Response text for rooms, containers and inventories.
pub mod narrator;
/// Tokenizer, vocabulary, object matcher and parse tree builder.
pub mod parser;
/// JSON scenario loading.
pub mod scenario;
/// The turn-based controller.
pub mod session;
/// Menu-driven vending machines.
pub mod vending;

pub use config::SessionConfig;
pub use dialogue::{DialogueChoice, DialogueData, DialogueGraph, DialogueNode};
pub use dispatch::{
    Behavior, Command, HandlerRegistry, ObjectAction, Turn, TurnEffect, VerbTable, dispatch,
};
pub use error::{FictionError, FictionResult};
pub use parser::{ParseFailure, ParseTree, Parser, Target, Vocabulary};
pub use scenario::ScenarioFile;
pub use session::{Mode, Session};
pub use vending::{ItemTemplate, Product, Quips, VendReply, VendingMachine};
