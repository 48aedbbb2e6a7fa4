use std::collections::BTreeSet;

/// The fixed grammar the parser understands.
///
/// Multi-word verbs are stored as space-joined strings (`"get up"`). Every
/// single-verb command and movement verb is also a known verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    verbs: BTreeSet<String>,
    single_verbs: BTreeSet<String>,
    movement_verbs: BTreeSet<String>,
    prepositions: BTreeSet<String>,
    articles: BTreeSet<String>,
}

const DEFAULT_VERBS: &[&str] = &[
    "look", "examine", "search", "walk", "go", "move", "get", "take", "pickup", "pick up", "drop",
    "open", "close", "put", "use", "operate", "activate", "sit", "stand", "get up", "get off",
    "inventory", "i", "wipe", "wipe off", "clean", "talk", "speak", "ask", "rub", "touch", "feel",
    "eat", "read", "help", "quit", "save",
];
const DEFAULT_SINGLE_VERBS: &[&str] = &[
    "look", "inventory", "i", "help", "quit", "save", "stand", "get up",
];
const DEFAULT_MOVEMENT_VERBS: &[&str] = &["go", "move", "walk"];
const DEFAULT_PREPOSITIONS: &[&str] = &["in", "on", "at", "from"];
const DEFAULT_ARTICLES: &[&str] = &["a", "an", "the"];

fn word_set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| (*w).to_string()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            verbs: word_set(DEFAULT_VERBS),
            single_verbs: word_set(DEFAULT_SINGLE_VERBS),
            movement_verbs: word_set(DEFAULT_MOVEMENT_VERBS),
            prepositions: word_set(DEFAULT_PREPOSITIONS),
            articles: word_set(DEFAULT_ARTICLES),
        }
    }
}

impl Vocabulary {
    /// A vocabulary with no verbs, the default prepositions and articles.
    pub fn empty() -> Self {
        Self {
            verbs: BTreeSet::new(),
            single_verbs: BTreeSet::new(),
            movement_verbs: BTreeSet::new(),
            prepositions: word_set(DEFAULT_PREPOSITIONS),
            articles: word_set(DEFAULT_ARTICLES),
        }
    }

    /// Add a verb that takes an object.
    pub fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verbs.insert(verb.into().to_lowercase());
        self
    }

    /// Add a verb that is complete on its own.
    pub fn with_single_verb(mut self, verb: impl Into<String>) -> Self {
        let verb = verb.into().to_lowercase();
        self.verbs.insert(verb.clone());
        self.single_verbs.insert(verb);
        self
    }

    /// Add a verb whose object is a direction.
    pub fn with_movement_verb(mut self, verb: impl Into<String>) -> Self {
        let verb = verb.into().to_lowercase();
        self.verbs.insert(verb.clone());
        self.movement_verbs.insert(verb);
        self
    }

    /// Add a preposition.
    pub fn with_preposition(mut self, preposition: impl Into<String>) -> Self {
        self.prepositions.insert(preposition.into().to_lowercase());
        self
    }

    /// Whether `verb` is known.
    pub fn is_verb(&self, verb: &str) -> bool {
        self.verbs.contains(verb)
    }

    /// Whether `verb` needs no object.
    pub fn is_single_verb(&self, verb: &str) -> bool {
        self.single_verbs.contains(verb)
    }

    /// Whether `verb` moves the player.
    pub fn is_movement_verb(&self, verb: &str) -> bool {
        self.movement_verbs.contains(verb)
    }

    /// Whether `word` is a preposition.
    pub fn is_preposition(&self, word: &str) -> bool {
        self.prepositions.contains(word)
    }

    /// Whether `word` is an article.
    pub fn is_article(&self, word: &str) -> bool {
        self.articles.contains(word)
    }

    /// All known verbs in sorted order.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.verbs.iter().map(String::as_str)
    }

    /// Find the longest known verb that prefixes `tokens`.
    ///
    /// Every prefix length is tried and each hit overwrites the last, so
    /// `"get up"` beats `"get"`. Returns the verb and how many tokens it
    /// consumed.
    pub fn recognize(&self, tokens: &[String]) -> Option<(String, usize)> {
        let mut found = None;
        for len in 1..=tokens.len() {
            let candidate = tokens[..len].join(" ");
            if self.verbs.contains(&candidate) {
                found = Some((candidate, len));
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tokenize;

    #[test]
    fn longest_verb_wins() {
        let vocab = Vocabulary::empty().with_verb("get").with_verb("get up");
        let (verb, used) = vocab.recognize(&tokenize("get up")).unwrap();
        assert_eq!(verb, "get up");
        assert_eq!(used, 2);
    }

    #[test]
    fn shorter_verb_when_longer_does_not_apply() {
        let vocab = Vocabulary::default();
        let (verb, used) = vocab.recognize(&tokenize("get note")).unwrap();
        assert_eq!(verb, "get");
        assert_eq!(used, 1);
    }

    #[test]
    fn multi_word_verb_beats_its_first_word() {
        let vocab = Vocabulary::default();
        let (verb, used) = vocab.recognize(&tokenize("wipe off the handprints")).unwrap();
        assert_eq!(verb, "wipe off");
        assert_eq!(used, 2);
    }

    #[test]
    fn unknown_verb_is_none() {
        assert!(Vocabulary::default().recognize(&tokenize("dance wildly")).is_none());
        assert!(Vocabulary::default().recognize(&[]).is_none());
    }

    #[test]
    fn single_and_movement_verbs_are_verbs() {
        let vocab = Vocabulary::empty()
            .with_single_verb("Xyzzy")
            .with_movement_verb("crawl");
        assert!(vocab.is_verb("xyzzy"));
        assert!(vocab.is_single_verb("xyzzy"));
        assert!(vocab.is_movement_verb("crawl"));
        assert!(!vocab.is_single_verb("crawl"));
    }

    proptest::proptest! {
        #[test]
        fn recognized_verb_is_longest_known_prefix(
            words in proptest::collection::vec("(get|up|off|wipe|pick|note)", 0..6)
        ) {
            let vocab = Vocabulary::default();
            let tokens: Vec<String> = words;
            let longest = (1..=tokens.len())
                .rev()
                .find(|&len| vocab.is_verb(&tokens[..len].join(" ")));
            let recognized = vocab.recognize(&tokens).map(|(_, used)| used);
            proptest::prop_assert_eq!(recognized, longest);
        }
    }
}
