//! Parse tree construction.

use std::fmt;

use advent_core::{Direction, Entity, EntityKey, World};

use super::{ObjectMatcher, Vocabulary, tokenize};

/// What a command's direct object resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// An entity in the world.
    Entity(EntityKey),
    /// A compass direction (movement verbs only).
    Direction(Direction),
}

/// Why a line of input could not be parsed.
///
/// The `Display` text is the message shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Nothing but whitespace and punctuation.
    Empty,
    /// The first words are not a known verb.
    UnknownVerb {
        /// The raw input line.
        input: String,
    },
    /// More than one preposition.
    MultiplePrepositions,
    /// A movement verb followed by something that is not a direction.
    InvalidDirection {
        /// The attempted direction, uppercased.
        direction: String,
    },
    /// A movement verb with nothing after it.
    MissingDirection {
        /// The movement verb.
        verb: String,
    },
    /// A verb that needs an object got none.
    MissingObject {
        /// The verb.
        verb: String,
    },
    /// An object phrase matched nothing.
    UnknownObject {
        /// The unmatched phrase.
        phrase: String,
    },
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Command is Empty"),
            Self::UnknownVerb { input } => {
                write!(f, "Command: \"{input}\" does not start with a known verb.")
            }
            Self::MultiplePrepositions => write!(
                f,
                "I'm not smart enough to understand more than one preposition per command."
            ),
            Self::InvalidDirection { direction } => {
                write!(f, "{direction} is not a valid direction.")
            }
            Self::MissingDirection { verb } => write!(f, "{verb} where?"),
            Self::MissingObject { verb } => write!(f, "{verb} what?"),
            Self::UnknownObject { phrase } => {
                write!(f, "I don't see {} {phrase} here!", indefinite_article(phrase))
            }
        }
    }
}

/// `"an"` before a vowel, `"a"` otherwise.
pub fn indefinite_article(phrase: &str) -> &'static str {
    match phrase.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

/// The structured reading of one input line.
///
/// Created fresh for every line and discarded once the command has been
/// dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    /// The input exactly as typed.
    pub raw: String,
    /// Lowercase tokens.
    pub tokens: Vec<String>,
    /// The recognized verb, possibly multi-word.
    pub action: Option<String>,
    /// The resolved direct object.
    pub direct: Option<Target>,
    /// The resolved indirect object.
    pub indirect: Option<EntityKey>,
    /// Set when parsing failed.
    pub failure: Option<ParseFailure>,
    /// Diagnostic text describing the outcome.
    pub response: String,
}

impl ParseTree {
    fn new(raw: &str, tokens: Vec<String>) -> Self {
        Self {
            raw: raw.to_string(),
            tokens,
            action: None,
            direct: None,
            indirect: None,
            failure: None,
            response: String::new(),
        }
    }

    fn fail(mut self, failure: ParseFailure) -> Self {
        self.response = failure.to_string();
        self.failure = Some(failure);
        self
    }

    fn succeed(mut self, response: String) -> Self {
        self.response = response;
        self
    }

    /// Whether the line was understood.
    pub fn is_parsed(&self) -> bool {
        self.failure.is_none()
    }

    /// The recognized verb, or `""` if none.
    pub fn verb(&self) -> &str {
        self.action.as_deref().unwrap_or_default()
    }

    /// The direct object if it is an entity.
    pub fn direct_entity(&self) -> Option<&EntityKey> {
        match &self.direct {
            Some(Target::Entity(key)) => Some(key),
            _ => None,
        }
    }

    /// The direct object if it is a direction.
    pub fn direction(&self) -> Option<Direction> {
        match self.direct {
            Some(Target::Direction(dir)) => Some(dir),
            _ => None,
        }
    }
}

/// Grammar-driven command parser.
#[derive(Debug, Clone)]
pub struct Parser {
    vocabulary: Vocabulary,
    matcher: ObjectMatcher,
}

impl Parser {
    /// Build a parser, precomputing match phrases for every entity.
    pub fn new(world: &World, vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            matcher: ObjectMatcher::from_world(world),
        }
    }

    /// Make an entity created after construction matchable.
    pub fn register(&mut self, entity: &Entity) {
        self.matcher.register(entity);
    }

    /// The grammar in use.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The phrase table in use.
    pub fn matcher(&self) -> &ObjectMatcher {
        &self.matcher
    }

    /// Interpret one line of player input.
    ///
    /// Entities sharing a phrase resolve in registration order; see
    /// [`parse_ranked`](Self::parse_ranked) to prefer some over others.
    pub fn parse(&self, input: &str) -> ParseTree {
        self.parse_ranked(input, |_| 0)
    }

    /// Interpret one line of player input, resolving shared phrases to the
    /// entity with the highest `rank`.
    pub fn parse_ranked<F>(&self, input: &str, rank: F) -> ParseTree
    where
        F: Fn(&EntityKey) -> u8,
    {
        let tree = ParseTree::new(input, tokenize(input));
        if tree.tokens.is_empty() {
            return tree.fail(ParseFailure::Empty);
        }

        let Some((verb, consumed)) = self.vocabulary.recognize(&tree.tokens) else {
            return tree.fail(ParseFailure::UnknownVerb {
                input: input.to_string(),
            });
        };
        let mut tree = tree;
        tree.action = Some(verb.clone());

        let remaining: Vec<String> = tree.tokens[consumed..]
            .iter()
            .filter(|t| !self.vocabulary.is_article(t))
            .cloned()
            .collect();

        let Some((direct_words, indirect_words)) = self.split_clauses(&remaining) else {
            return tree.fail(ParseFailure::MultiplePrepositions);
        };
        tree.direct = self
            .matcher
            .find_entity_ranked(direct_words, &rank)
            .cloned()
            .map(Target::Entity);
        tree.indirect = self
            .matcher
            .find_entity_ranked(indirect_words, &rank)
            .cloned();

        if tree.direct.is_none() {
            let words: Vec<&str> = remaining
                .iter()
                .map(String::as_str)
                .filter(|w| !self.vocabulary.is_preposition(w))
                .collect();

            if self.vocabulary.is_movement_verb(&verb) {
                if words.is_empty() {
                    return tree.fail(ParseFailure::MissingDirection { verb });
                }
                let name = words.concat();
                return match Direction::parse(&name) {
                    Some(dir) => {
                        tree.direct = Some(Target::Direction(dir));
                        tree.succeed(format!("Player movement: {verb} {dir}"))
                    }
                    None => tree.fail(ParseFailure::InvalidDirection {
                        direction: name.to_uppercase(),
                    }),
                };
            }

            let looks_at_room = verb == "look" && words.first() == Some(&"room");
            if self.vocabulary.is_single_verb(&verb) && (words.is_empty() || looks_at_room) {
                return tree.succeed(format!("Single verb command: {verb}"));
            }
            if words.is_empty() {
                return tree.fail(ParseFailure::MissingObject { verb });
            }
            return tree.fail(ParseFailure::UnknownObject {
                phrase: words.join(" "),
            });
        }

        if !indirect_words.is_empty() && tree.indirect.is_none() {
            return tree.fail(ParseFailure::UnknownObject {
                phrase: indirect_words.join(" "),
            });
        }

        let response = format!("Command: <{input}> parsed.");
        tree.succeed(response)
    }

    /// Split around at most one preposition. Returns `None` if there are
    /// more. With nothing before the preposition, the words after it become
    /// the direct object (`look at couch`).
    fn split_clauses<'a>(&self, words: &'a [String]) -> Option<(&'a [String], &'a [String])> {
        let mut positions = words
            .iter()
            .enumerate()
            .filter(|(_, w)| self.vocabulary.is_preposition(w))
            .map(|(i, _)| i);
        let first = positions.next();
        if positions.next().is_some() {
            return None;
        }
        let none: &'a [String] = &[];
        Some(match first {
            None => (words, none),
            Some(0) => (&words[1..], none),
            Some(i) => (&words[..i], &words[i + 1..]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advent_core::{ContainerState, EntityKind, ItemProfile, RoomState, WorldMeta};

    fn parser() -> Parser {
        let mut world = World::new(WorldMeta::new("Test"));
        world
            .add_entity(Entity::new(
                "room-201",
                "Room 201",
                "A room.",
                EntityKind::Room(RoomState::default()),
            ))
            .unwrap();
        world
            .add_entity(
                Entity::new("couch", "Couch", "A couch.", EntityKind::Item)
                    .with_profile(ItemProfile::new(["couch", "sofa"]).with_adjectives(["ugly"])),
            )
            .unwrap();
        world
            .add_entity(
                Entity::new("lamp", "Lamp", "A lamp.", EntityKind::Item)
                    .with_profile(ItemProfile::new(["lamp"])),
            )
            .unwrap();
        world
            .add_entity(
                Entity::new(
                    "box",
                    "Box",
                    "A box.",
                    EntityKind::Container(ContainerState::new(3)),
                )
                .with_profile(ItemProfile::new(["box"])),
            )
            .unwrap();
        Parser::new(&world, Vocabulary::default())
    }

    fn entity(key: &str) -> Option<Target> {
        Some(Target::Entity(key.into()))
    }

    #[test]
    fn empty_input_fails() {
        let tree = parser().parse("  ?! ");
        assert_eq!(tree.failure, Some(ParseFailure::Empty));
        assert_eq!(tree.response, "Command is Empty");
    }

    #[test]
    fn unknown_verb_fails() {
        let tree = parser().parse("Dance with the lamp");
        assert!(!tree.is_parsed());
        assert_eq!(
            tree.response,
            "Command: \"Dance with the lamp\" does not start with a known verb."
        );
    }

    #[test]
    fn direct_object_with_articles_and_adjectives() {
        let tree = parser().parse("Look at the Ugly Couch.");
        assert!(tree.is_parsed());
        assert_eq!(tree.verb(), "look");
        assert_eq!(tree.direct, entity("couch"));
        assert_eq!(tree.indirect, None);
    }

    #[test]
    fn direct_and_indirect_objects() {
        let tree = parser().parse("put the lamp in the box");
        assert!(tree.is_parsed());
        assert_eq!(tree.direct, entity("lamp"));
        assert_eq!(tree.indirect.as_ref().map(EntityKey::as_str), Some("box"));
        assert_eq!(tree.response, "Command: <put the lamp in the box> parsed.");
    }

    #[test]
    fn two_prepositions_fail_regardless_of_objects() {
        let tree = parser().parse("put lamp in box on table");
        assert_eq!(tree.failure, Some(ParseFailure::MultiplePrepositions));
        let tree = parser().parse("put lamp in box on couch");
        assert_eq!(tree.failure, Some(ParseFailure::MultiplePrepositions));
    }

    #[test]
    fn movement_parses_direction() {
        let tree = parser().parse("go north");
        assert!(tree.is_parsed());
        assert_eq!(tree.direction(), Some(Direction::North));
        assert_eq!(tree.response, "Player movement: go NORTH");

        let tree = parser().parse("walk north west");
        assert_eq!(tree.direction(), Some(Direction::Northwest));
    }

    #[test]
    fn movement_rejects_bad_direction() {
        let tree = parser().parse("go sideways");
        assert_eq!(tree.response, "SIDEWAYS is not a valid direction.");
        assert!(!tree.is_parsed());
    }

    #[test]
    fn movement_without_direction_asks_where() {
        let tree = parser().parse("go");
        assert_eq!(tree.response, "go where?");
        assert!(!tree.is_parsed());
    }

    #[test]
    fn single_verbs_need_no_object() {
        for input in ["look", "inventory", "i", "get up", "look room", "look at"] {
            let tree = parser().parse(input);
            assert!(tree.is_parsed(), "{input}: {}", tree.response);
            assert_eq!(tree.direct, None);
        }
        assert_eq!(parser().parse("get up").verb(), "get up");
    }

    #[test]
    fn object_verb_without_object_asks_what() {
        let tree = parser().parse("take");
        assert_eq!(tree.failure, Some(ParseFailure::MissingObject { verb: "take".into() }));
        assert_eq!(tree.response, "take what?");
    }

    #[test]
    fn unknown_object_uses_indefinite_article() {
        assert_eq!(parser().parse("take the orange").response, "I don't see an orange here!");
        assert_eq!(parser().parse("take candlestick").response, "I don't see a candlestick here!");
    }

    #[test]
    fn unmatched_indirect_object_fails() {
        let tree = parser().parse("put lamp in the oven");
        assert_eq!(tree.response, "I don't see an oven here!");
    }

    #[test]
    fn rooms_match_by_name() {
        let tree = parser().parse("examine room 201");
        assert_eq!(tree.direct, entity("room-201"));
    }

    #[test]
    fn registered_entities_become_matchable() {
        let mut parser = parser();
        assert!(!parser.parse("take treats").is_parsed());
        parser.register(
            &Entity::new("treats-1", "Dog Treats", "Treats.", EntityKind::Item)
                .with_profile(ItemProfile::new(["treats"])),
        );
        assert_eq!(parser.parse("take treats").direct, entity("treats-1"));
    }

    #[test]
    fn ranking_picks_between_identical_purchases() {
        let mut parser = parser();
        for key in ["treats-1", "treats-2"] {
            parser.register(
                &Entity::new(key, "Dog Treats", "Treats.", EntityKind::Item)
                    .with_profile(ItemProfile::new(["treats"])),
            );
        }
        assert_eq!(parser.parse("eat treats").direct, entity("treats-1"));
        let tree = parser.parse_ranked("put treats in box", |k| u8::from(k.as_str() == "treats-2"));
        assert_eq!(tree.direct, entity("treats-2"));
        assert_eq!(tree.indirect.as_ref().map(EntityKey::as_str), Some("box"));
    }
}
