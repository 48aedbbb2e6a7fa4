//! The turn-based game controller.
//!
//! A [`Session`] owns the world and everything needed to play it. Each call
//! to [`Session::process`] runs one complete turn: parse, dispatch, apply
//! mode changes, then advance the urgency meter. While a conversation or a
//! vending menu is open, input bypasses the parser and goes to that mode.

use std::collections::BTreeMap;

use advent_core::{EntityKey, Money, NOWHERE, Urgency, World};
use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::dialogue::DialogueGraph;
use crate::dispatch::{
    Behavior, Command, HandlerRegistry, ObjectAction, Turn, TurnEffect, VerbTable, dispatch,
};
use crate::error::{FictionError, FictionResult};
use crate::narrator;
use crate::parser::{ParseFailure, ParseTree, Parser, suggest_verb};
use crate::vending::VendingMachine;

/// What input is currently routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Normal parsed commands.
    Exploring,
    /// A dialogue is open.
    Conversation {
        /// Dialogue id.
        dialogue: String,
    },
    /// A vending menu is open.
    Vending {
        /// Vending machine entity.
        vendor: EntityKey,
    },
}

/// A playable game.
#[derive(Debug)]
pub struct Session {
    world: World,
    player: EntityKey,
    parser: Parser,
    verbs: VerbTable,
    handlers: HandlerRegistry,
    dialogues: BTreeMap<String, DialogueGraph>,
    vendors: IndexMap<EntityKey, VendingMachine>,
    mode: Mode,
    urgency_step: u32,
    rng: StdRng,
    turns: u32,
    finished: bool,
}

impl Session {
    /// Start a session for `player`, who must be a character with player
    /// statistics.
    pub fn new(
        world: World,
        player: impl Into<EntityKey>,
        config: SessionConfig,
    ) -> FictionResult<Self> {
        let player = player.into();
        if world.player_stats(player.as_str()).is_none() {
            return Err(FictionError::PlayerNotFound(player));
        }
        let parser = Parser::new(&world, config.vocabulary);
        Ok(Self {
            world,
            player,
            parser,
            verbs: VerbTable::standard(),
            handlers: HandlerRegistry::new(),
            dialogues: BTreeMap::new(),
            vendors: IndexMap::new(),
            mode: Mode::Exploring,
            urgency_step: config.urgency_step,
            rng: StdRng::seed_from_u64(config.seed),
            turns: 0,
            finished: false,
        })
    }

    /// Attach a custom handler to an entity.
    pub fn with_handler(
        mut self,
        key: impl Into<EntityKey>,
        action: impl ObjectAction + 'static,
    ) -> Self {
        self.handlers.insert(key, action);
        self
    }

    /// Register a dialogue under `id`.
    pub fn with_dialogue(mut self, id: impl Into<String>, graph: DialogueGraph) -> Self {
        self.dialogues.insert(id.into(), graph);
        self
    }

    /// Register a vending machine. The entity gets the vendor behavior
    /// unless it already has a handler.
    pub fn with_vendor(mut self, key: impl Into<EntityKey>, machine: VendingMachine) -> Self {
        let key = key.into();
        if !self.handlers.contains(key.as_str()) {
            self.handlers.insert(key.clone(), Behavior::Vendor);
        }
        self.vendors.insert(key, machine);
        self
    }

    /// Replace the generic verb table.
    pub fn with_verbs(mut self, verbs: VerbTable) -> Self {
        self.verbs = verbs;
        self
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player character's key.
    pub fn player(&self) -> &EntityKey {
        &self.player
    }

    /// The command parser.
    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Where input is currently routed.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Completed turns.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// Whether the player quit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// A registered vending machine.
    pub fn vendor(&self, key: &str) -> Option<&VendingMachine> {
        self.vendors.get(key)
    }

    /// A registered dialogue.
    pub fn dialogue(&self, id: &str) -> Option<&DialogueGraph> {
        self.dialogues.get(id)
    }

    /// The player's money.
    pub fn money(&self) -> Money {
        self.world
            .player_stats(self.player.as_str())
            .map_or(Money::ZERO, |stats| stats.money)
    }

    /// The player's urgency meter.
    pub fn urgency(&self) -> Urgency {
        self.world
            .player_stats(self.player.as_str())
            .map(|stats| stats.urgency)
            .unwrap_or_default()
    }

    /// Give the player money.
    pub fn add_money(&mut self, amount: Money) -> FictionResult<()> {
        let stats = self.world.player_stats_mut(self.player.as_str())?;
        stats.money = stats.money.saturating_add(amount);
        Ok(())
    }

    /// Opening text: the title, the introduction and the first room.
    pub fn intro(&self) -> FictionResult<Vec<String>> {
        let mut lines = vec![self.world.meta.title.clone()];
        if !self.world.meta.description.is_empty() {
            lines.push(self.world.meta.description.clone());
        }
        lines.push(String::new());
        let room = self.world.room_of(self.player.as_str())?;
        lines.extend(narrator::describe_room(&self.world, room.as_str())?);
        Ok(lines)
    }

    /// Parse `input` against the current world.
    ///
    /// When entities share a phrase, one the player can reach wins over one
    /// elsewhere in play, which wins over one removed from play.
    pub fn parse(&self, input: &str) -> ParseTree {
        let world = &self.world;
        let player = self.player.as_str();
        let room = world.room_of(player).ok();
        let inventory = world.inventory_of(player).ok();
        self.parser.parse_ranked(input, |key| {
            let key = key.as_str();
            let carried = inventory.is_some_and(|inv| world.contains_item(inv.as_str(), key));
            let present = room.is_some_and(|room| world.is_present(key, room.as_str()));
            if carried || present {
                2
            } else if world
                .get(key)
                .and_then(|e| e.location.as_ref())
                .is_some_and(|loc| loc.as_str() != NOWHERE)
            {
                1
            } else {
                0
            }
        })
    }

    /// Run one turn and return the response lines.
    ///
    /// Parse failures cost no time; every other input advances the turn
    /// counter and the urgency meter.
    pub fn process(&mut self, input: &str) -> FictionResult<Vec<String>> {
        if self.finished {
            return Ok(vec!["The game is over.".to_string()]);
        }
        let lines = match self.mode.clone() {
            Mode::Exploring => {
                let tree = self.parse(input);
                let Some(command) = Command::from_tree(&tree) else {
                    return Ok(self.parse_failure(tree));
                };
                debug!(input, response = %tree.response, "parsed");
                self.explore(&command)?
            }
            Mode::Conversation { dialogue } => self.converse(&dialogue, input)?,
            Mode::Vending { vendor } => self.vend(&vendor, input)?,
        };
        self.tick()?;
        Ok(lines)
    }

    fn parse_failure(&self, tree: ParseTree) -> Vec<String> {
        debug!(input = %tree.raw, response = %tree.response, "parse failed");
        let suggestion = match (&tree.failure, tree.tokens.first()) {
            (Some(ParseFailure::UnknownVerb { .. }), Some(first)) => {
                suggest_verb(self.parser.vocabulary(), first)
            }
            _ => None,
        };
        let mut lines = vec![tree.response.clone()];
        if let Some(verb) = suggestion {
            lines.push(format!("Did you mean '{verb}'?"));
        }
        lines
    }

    fn explore(&mut self, command: &Command) -> FictionResult<Vec<String>> {
        let mut turn = Turn::new(&mut self.world, &self.player, &self.verbs);
        dispatch(&mut turn, command, &self.handlers)?;
        let (mut lines, effects) = turn.finish();
        for effect in effects {
            self.apply(effect, &mut lines)?;
        }
        Ok(lines)
    }

    fn apply(&mut self, effect: TurnEffect, lines: &mut Vec<String>) -> FictionResult<()> {
        match effect {
            TurnEffect::StartConversation { dialogue } => {
                let graph = self
                    .dialogues
                    .get_mut(&dialogue)
                    .ok_or_else(|| FictionError::DialogueNotFound(dialogue.clone()))?;
                graph.reset();
                lines.extend(narrator::dialogue_prompt(graph));
                if !graph.is_finished() {
                    info!(%dialogue, "conversation started");
                    self.mode = Mode::Conversation { dialogue };
                }
            }
            TurnEffect::StartVending { vendor } => {
                let machine = self
                    .vendors
                    .get_mut(&vendor)
                    .ok_or_else(|| FictionError::VendorNotFound(vendor.clone()))?;
                lines.extend(machine.activate(&mut self.rng));
                info!(%vendor, "vending started");
                self.mode = Mode::Vending { vendor };
            }
            TurnEffect::Quit => {
                info!(turns = self.turns, "player quit");
                self.finished = true;
            }
        }
        Ok(())
    }

    fn converse(&mut self, dialogue: &str, input: &str) -> FictionResult<Vec<String>> {
        let graph = self
            .dialogues
            .get_mut(dialogue)
            .ok_or_else(|| FictionError::DialogueNotFound(dialogue.to_string()))?;
        let answer = input.trim().to_lowercase();
        if matches!(answer.as_str(), "quit" | "exit" | "leave" | "q") {
            info!(%dialogue, "conversation left");
            self.mode = Mode::Exploring;
            return Ok(vec!["You decide to end the conversation.".to_string()]);
        }

        let count = graph.current_node().choices.len();
        let Ok(number) = answer.parse::<usize>() else {
            return Ok(vec![format!(
                "Please enter a number (1-{count}) or 'quit' to end the conversation."
            )]);
        };
        if number == 0 || number > count {
            return Ok(vec![format!(
                "Please enter a number between 1 and {count}, or 'quit' to end the conversation."
            )]);
        }

        graph.make_choice(number - 1)?;
        let lines = narrator::dialogue_prompt(graph);
        if graph.is_finished() {
            info!(%dialogue, "conversation finished");
            self.mode = Mode::Exploring;
        }
        Ok(lines)
    }

    fn vend(&mut self, vendor: &EntityKey, input: &str) -> FictionResult<Vec<String>> {
        let machine = self
            .vendors
            .get_mut(vendor)
            .ok_or_else(|| FictionError::VendorNotFound(vendor.clone()))?;
        let reply = machine.handle_input(input, &mut self.world, self.player.as_str(), &mut self.rng)?;
        if let Some(key) = &reply.purchased {
            self.parser.register(self.world.entity(key.as_str())?);
        }
        if reply.left {
            info!(%vendor, "vending left");
            self.mode = Mode::Exploring;
        }
        Ok(reply.lines)
    }

    fn tick(&mut self) -> FictionResult<()> {
        self.turns += 1;
        let stats = self.world.player_stats_mut(self.player.as_str())?;
        stats.urgency.advance(self.urgency_step);
        Ok(())
    }
}
