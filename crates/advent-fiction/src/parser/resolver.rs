//! Match-phrase generation and entity lookup.

use advent_core::{Entity, EntityKey, ItemProfile, NOWHERE, World};
use indexmap::IndexMap;
use strsim::jaro_winkler;

use super::Vocabulary;

/// Minimum similarity for a verb suggestion (0.0-1.0).
const SUGGEST_THRESHOLD: f64 = 0.8;

/// Every single adjective plus every ordered pair and triple, sorted.
///
/// For three adjectives that is 3 + 6 + 6 = 15 phrases. Adjectives are
/// lowercased and duplicates removed.
pub fn expand_adjectives(adjectives: &[String]) -> Vec<String> {
    let adjs: Vec<String> = adjectives.iter().map(|a| a.to_lowercase()).collect();
    let mut phrases = Vec::new();
    for (i, first) in adjs.iter().enumerate() {
        phrases.push(first.clone());
        for (j, second) in adjs.iter().enumerate() {
            if j == i {
                continue;
            }
            phrases.push(format!("{first} {second}"));
            for (k, third) in adjs.iter().enumerate() {
                if k == i || k == j {
                    continue;
                }
                phrases.push(format!("{first} {second} {third}"));
            }
        }
    }
    phrases.sort();
    phrases.dedup();
    phrases
}

/// All lowercase phrases that should resolve to an item with this profile.
///
/// Each expanded adjective phrase is combined with each synonym, once with a
/// space and once with every space removed (`"night stand"` and
/// `"nightstand"`), followed by the bare synonyms.
pub fn match_phrases(profile: &ItemProfile) -> Vec<String> {
    let synonyms: Vec<String> = profile.synonyms.iter().map(|s| s.to_lowercase()).collect();
    let mut phrases = Vec::new();
    for adj in expand_adjectives(&profile.adjectives) {
        for syn in &synonyms {
            let spaced = format!("{adj} {syn}");
            let joined = spaced.replace(' ', "");
            phrases.push(spaced);
            phrases.push(joined);
        }
    }
    phrases.extend(synonyms);
    phrases
}

/// Precomputed phrase table resolving player phrases to entity keys.
#[derive(Debug, Clone, Default)]
pub struct ObjectMatcher {
    phrases: IndexMap<EntityKey, Vec<String>>,
    index: IndexMap<String, Vec<EntityKey>>,
}

impl ObjectMatcher {
    /// An empty matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for every entity in the world except [`NOWHERE`].
    pub fn from_world(world: &World) -> Self {
        let mut matcher = Self::new();
        for entity in world.entities().filter(|e| e.key.as_str() != NOWHERE) {
            matcher.register(entity);
        }
        matcher
    }

    /// Add an entity's phrases. Story items match on their expanded
    /// vocabulary, everything else on its lowercased name.
    ///
    /// Entities sharing a phrase are all kept as candidates, in
    /// registration order.
    pub fn register(&mut self, entity: &Entity) {
        let phrases = match &entity.profile {
            Some(profile) => match_phrases(profile),
            None => vec![entity.name.to_lowercase()],
        };
        for phrase in &phrases {
            let candidates = self.index.entry(phrase.clone()).or_default();
            if !candidates.contains(&entity.key) {
                candidates.push(entity.key.clone());
            }
        }
        self.phrases.insert(entity.key.clone(), phrases);
    }

    /// The phrases registered for an entity.
    pub fn phrases(&self, key: &str) -> Option<&[String]> {
        self.phrases.get(key).map(Vec::as_slice)
    }

    /// Resolve the longest matching prefix of `words` to an entity.
    ///
    /// Trailing words past the match are ignored. When several entities
    /// share the phrase, the one registered first wins.
    pub fn find_entity(&self, words: &[String]) -> Option<&EntityKey> {
        self.find_entity_ranked(words, |_| 0)
    }

    /// Like [`find_entity`](Self::find_entity), but entities sharing the
    /// matched phrase are ordered by `rank` first, highest wins.
    /// Registration order breaks remaining ties.
    pub fn find_entity_ranked<F>(&self, words: &[String], rank: F) -> Option<&EntityKey>
    where
        F: Fn(&EntityKey) -> u8,
    {
        let mut candidates = None;
        for len in 1..=words.len() {
            if let Some(found) = self.index.get(&words[..len].join(" ")) {
                candidates = Some(found);
            }
        }
        let mut best: Option<(&EntityKey, u8)> = None;
        for key in candidates? {
            let score = rank(key);
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((key, score));
            }
        }
        best.map(|(key, _)| key)
    }
}

/// The known verb closest to `word`, if any is similar enough.
pub fn suggest_verb<'a>(vocabulary: &'a Vocabulary, word: &str) -> Option<&'a str> {
    vocabulary
        .verbs()
        .map(|verb| (verb, jaro_winkler(word, verb)))
        .filter(|(_, score)| *score >= SUGGEST_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(verb, _)| verb)
}
