//! Routing resolved commands to handlers.
//!
//! A command first goes to the per-object handlers registered for its
//! indirect and then its direct object, and falls back to the generic
//! [`VerbTable`]. Handlers never print; they append lines to the [`Turn`]
//! and may request a mode change through a [`TurnEffect`].

mod behavior;
mod verbs;

pub use behavior::Behavior;
pub use verbs::{VerbFn, VerbTable};

use std::fmt;

use advent_core::{Direction, EntityKey, World};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::FictionResult;
use crate::parser::{ParseTree, Target};

/// A parsed command stripped down to what handlers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// The recognized verb.
    pub verb: String,
    /// Direct object.
    pub direct: Option<Target>,
    /// Indirect object.
    pub indirect: Option<EntityKey>,
}

impl Command {
    /// A command with no objects.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            direct: None,
            indirect: None,
        }
    }

    /// Set the direct object to an entity.
    pub fn with_direct(mut self, key: impl Into<EntityKey>) -> Self {
        self.direct = Some(Target::Entity(key.into()));
        self
    }

    /// Set the direct object to a direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direct = Some(Target::Direction(direction));
        self
    }

    /// Set the indirect object.
    pub fn with_indirect(mut self, key: impl Into<EntityKey>) -> Self {
        self.indirect = Some(key.into());
        self
    }

    /// The command carried by a successful parse, or `None` on failure.
    pub fn from_tree(tree: &ParseTree) -> Option<Self> {
        if !tree.is_parsed() {
            return None;
        }
        Some(Self {
            verb: tree.action.clone()?,
            direct: tree.direct.clone(),
            indirect: tree.indirect.clone(),
        })
    }

    /// The direct object if it is an entity.
    pub fn direct_entity(&self) -> Option<&EntityKey> {
        match &self.direct {
            Some(Target::Entity(key)) => Some(key),
            _ => None,
        }
    }
}

/// A request from a handler to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEffect {
    /// Enter dialogue mode with the named dialogue.
    StartConversation {
        /// Dialogue id.
        dialogue: String,
    },
    /// Enter the vending menu of this machine.
    StartVending {
        /// Vending machine entity.
        vendor: EntityKey,
    },
    /// End the session.
    Quit,
}

/// Mutable context for one command.
pub struct Turn<'a> {
    world: &'a mut World,
    player: &'a EntityKey,
    verbs: &'a VerbTable,
    response: Vec<String>,
    effects: Vec<TurnEffect>,
}

impl<'a> Turn<'a> {
    /// Start a turn for `player`.
    pub fn new(world: &'a mut World, player: &'a EntityKey, verbs: &'a VerbTable) -> Self {
        Self {
            world,
            player,
            verbs,
            response: Vec::new(),
            effects: Vec::new(),
        }
    }

    /// The world.
    pub fn world(&self) -> &World {
        self.world
    }

    /// The world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// The acting character.
    pub fn player(&self) -> &EntityKey {
        self.player
    }

    /// Append a response line.
    pub fn say(&mut self, line: impl Into<String>) {
        self.response.push(line.into());
    }

    /// Append several response lines.
    pub fn say_all(&mut self, lines: impl IntoIterator<Item = String>) {
        self.response.extend(lines);
    }

    /// Lines produced so far.
    pub fn response(&self) -> &[String] {
        &self.response
    }

    /// Request a mode change.
    pub fn push_effect(&mut self, effect: TurnEffect) {
        self.effects.push(effect);
    }

    /// Consume the turn, returning its lines and effects.
    pub fn finish(self) -> (Vec<String>, Vec<TurnEffect>) {
        (self.response, self.effects)
    }

    /// The room the player stands in.
    pub fn room(&self) -> FictionResult<EntityKey> {
        Ok(self.world.room_of(self.player.as_str())?.clone())
    }

    /// The player's inventory container.
    pub fn inventory(&self) -> FictionResult<EntityKey> {
        Ok(self.world.inventory_of(self.player.as_str())?.clone())
    }

    /// Whether the player holds `item` directly in the inventory.
    pub fn carrying(&self, item: &str) -> bool {
        self.world
            .inventory_of(self.player.as_str())
            .is_ok_and(|inventory| self.world.contains_item(inventory.as_str(), item))
    }

    /// Whether the player can reach `item`: carried, or present in the room.
    pub fn reachable(&self, item: &str) -> bool {
        self.carrying(item)
            || self
                .world
                .room_of(self.player.as_str())
                .is_ok_and(|room| self.world.is_present(item, room.as_str()))
    }

    /// Run the generic handler for the command's verb.
    ///
    /// Returns `false` with "I don't know how to ..." when the table has no
    /// such verb.
    pub fn run_verb(&mut self, command: &Command) -> FictionResult<bool> {
        let Some(handler) = self.verbs.get(&command.verb) else {
            self.say(format!("I don't know how to '{}' yet.", command.verb));
            return Ok(false);
        };
        handler(self, command)?;
        Ok(true)
    }
}

impl fmt::Debug for Turn<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Turn")
            .field("player", &self.player)
            .field("response", &self.response)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}

/// Custom behavior attached to one entity.
///
/// Returning `Ok(false)` passes the command on to the next stage.
pub trait ObjectAction {
    /// Handle `command` on behalf of `subject`.
    fn act(&self, command: &Command, subject: &EntityKey, turn: &mut Turn<'_>)
    -> FictionResult<bool>;
}

impl<F> ObjectAction for F
where
    F: Fn(&Command, &EntityKey, &mut Turn<'_>) -> FictionResult<bool>,
{
    fn act(
        &self,
        command: &Command,
        subject: &EntityKey,
        turn: &mut Turn<'_>,
    ) -> FictionResult<bool> {
        self(command, subject, turn)
    }
}

/// The `{entity key -> handler}` table.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: IndexMap<EntityKey, Box<dyn ObjectAction>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a handler, replacing any previous one for `key`.
    pub fn insert(&mut self, key: impl Into<EntityKey>, action: impl ObjectAction + 'static) {
        self.handlers.insert(key.into(), Box::new(action));
    }

    /// Attach a closure handler.
    pub fn insert_fn<F>(&mut self, key: impl Into<EntityKey>, action: F)
    where
        F: Fn(&Command, &EntityKey, &mut Turn<'_>) -> FictionResult<bool> + 'static,
    {
        self.insert(key, action);
    }

    /// The handler for `key`.
    pub fn get(&self, key: &str) -> Option<&dyn ObjectAction> {
        self.handlers.get(key).map(Box::as_ref)
    }

    /// Whether `key` has a handler.
    pub fn contains(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("keys", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Route a command and report whether anything handled it.
pub fn dispatch(
    turn: &mut Turn<'_>,
    command: &Command,
    handlers: &HandlerRegistry,
) -> FictionResult<bool> {
    if let Some(Target::Direction(direction)) = &command.direct {
        debug!(verb = %command.verb, %direction, "movement");
        let walk = Command {
            verb: "walk".to_string(),
            ..command.clone()
        };
        return turn.run_verb(&walk);
    }

    if let Some(indirect) = &command.indirect
        && let Some(handler) = handlers.get(indirect.as_str())
    {
        debug!(verb = %command.verb, subject = %indirect, "indirect object handler");
        if handler.act(command, indirect, turn)? {
            return Ok(true);
        }
    }

    if let Some(direct) = command.direct_entity()
        && let Some(handler) = handlers.get(direct.as_str())
    {
        debug!(verb = %command.verb, subject = %direct, "direct object handler");
        if handler.act(command, direct, turn)? {
            return Ok(true);
        }
    }

    debug!(verb = %command.verb, "generic verb");
    turn.run_verb(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use advent_core::loader::WorldFile;

    fn world() -> World {
        WorldFile::from_json(
            r#"{
            "title": "T",
            "entities": [
                { "type": "room", "key": "r1", "name": "Room",
                  "descriptions": { "Main": "Plain." },
                  "exits": { "north": { "key": "door", "name": "Door",
                      "descriptions": { "Main": "is a door." }, "connection": "r2" } } },
                { "type": "room", "key": "r2", "name": "Hall",
                  "descriptions": { "Main": "Long." } },
                { "type": "item", "key": "lamp", "name": "Lamp", "location": "r1",
                  "descriptions": { "Main": "A lamp." }, "flags": ["takeable"],
                  "synonyms": ["lamp"] },
                { "type": "container", "key": "box", "name": "Box", "location": "r1",
                  "descriptions": { "Main": "A box." }, "capacity": 3, "flags": ["open"],
                  "synonyms": ["box"] },
                { "type": "character", "key": "me", "name": "Me", "location": "r1",
                  "descriptions": { "Main": "You." },
                  "inventory": { "key": "me-inv", "capacity": 5 },
                  "player": {} }
            ]
        }"#,
        )
        .unwrap()
        .build()
        .unwrap()
    }

    #[test]
    fn direction_routes_to_walk() {
        let mut world = world();
        let player = EntityKey::from("me");
        let verbs = VerbTable::standard();
        let mut turn = Turn::new(&mut world, &player, &verbs);
        let command = Command::new("go").with_direction(Direction::North);
        assert!(dispatch(&mut turn, &command, &HandlerRegistry::new()).unwrap());
        assert_eq!(world.room_of("me").unwrap().as_str(), "r2");
    }

    #[test]
    fn unknown_verb_is_a_miss() {
        let mut world = world();
        let player = EntityKey::from("me");
        let verbs = VerbTable::standard();
        let mut turn = Turn::new(&mut world, &player, &verbs);
        let command = Command::new("juggle").with_direct("lamp");
        assert!(!dispatch(&mut turn, &command, &HandlerRegistry::new()).unwrap());
        assert_eq!(turn.response(), ["I don't know how to 'juggle' yet."]);
    }

    #[test]
    fn direct_handler_runs_before_generic_verb() {
        let mut world = world();
        let player = EntityKey::from("me");
        let verbs = VerbTable::standard();
        let mut handlers = HandlerRegistry::new();
        handlers.insert_fn("lamp", |command, _subject, turn| {
            if command.verb != "take" {
                return Ok(false);
            }
            turn.say("The lamp is bolted down.");
            Ok(true)
        });

        let mut turn = Turn::new(&mut world, &player, &verbs);
        dispatch(&mut turn, &Command::new("take").with_direct("lamp"), &handlers).unwrap();
        dispatch(&mut turn, &Command::new("look").with_direct("lamp"), &handlers).unwrap();
        assert_eq!(turn.response(), ["The lamp is bolted down.", "A lamp."]);
        assert!(!world.contains_item("me-inv", "lamp"));
    }

    #[test]
    fn indirect_handler_runs_first() {
        let mut world = world();
        let player = EntityKey::from("me");
        let verbs = VerbTable::standard();
        let mut handlers = HandlerRegistry::new();
        handlers.insert_fn("box", |_command, _subject, turn| {
            turn.say("box");
            Ok(true)
        });
        handlers.insert_fn("lamp", |_command, _subject, turn| {
            turn.say("lamp");
            Ok(true)
        });
        assert_eq!(handlers.len(), 2);

        let mut turn = Turn::new(&mut world, &player, &verbs);
        let command = Command::new("put").with_direct("lamp").with_indirect("box");
        dispatch(&mut turn, &command, &handlers).unwrap();
        assert_eq!(turn.response(), ["box"]);
    }

    #[test]
    fn reachability_covers_inventory_and_room() {
        let mut world = world();
        world.place("lamp", "me").unwrap();
        let player = EntityKey::from("me");
        let verbs = VerbTable::standard();
        let turn = Turn::new(&mut world, &player, &verbs);
        assert!(turn.carrying("lamp"));
        assert!(turn.reachable("lamp"));
        assert!(turn.reachable("box"));
        assert!(!turn.reachable("r2"));
    }
}
