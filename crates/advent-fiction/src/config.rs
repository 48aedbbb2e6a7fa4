//! Session configuration.

use crate::parser::Vocabulary;

/// Tunables for a play session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// RNG seed for reproducible vending quips.
    pub seed: u64,
    /// Urgency added after each completed turn.
    pub urgency_step: u32,
    /// Grammar the parser understands.
    pub vocabulary: Vocabulary,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            urgency_step: 2,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the urgency increment.
    pub fn with_urgency_step(mut self, step: u32) -> Self {
        self.urgency_step = step;
        self
    }

    /// Replace the vocabulary.
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }
}
