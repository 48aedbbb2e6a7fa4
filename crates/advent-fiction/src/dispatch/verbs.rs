//! The generic verb table.
//!
//! Each function implements one rule against whatever object the command
//! names. Domain failures (locked, won't fit, not here) are response lines,
//! never errors; `Err` is reserved for broken world data.

use advent_core::{CloseOutcome, DescriptionTag, EntityKey, Flag, OpenOutcome};
use indexmap::IndexMap;

use super::{Command, Turn, TurnEffect};
use crate::error::FictionResult;
use crate::narrator;
use crate::parser::{Target, indefinite_article};

/// Signature of a generic verb handler.
pub type VerbFn = fn(&mut Turn<'_>, &Command) -> FictionResult<()>;

/// Verb name to handler.
#[derive(Debug, Clone)]
pub struct VerbTable {
    verbs: IndexMap<String, VerbFn>,
}

impl Default for VerbTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl VerbTable {
    /// A table with no verbs.
    pub fn empty() -> Self {
        Self {
            verbs: IndexMap::new(),
        }
    }

    /// The built-in verbs and their synonyms.
    pub fn standard() -> Self {
        let table: [(&[&str], VerbFn); 20] = [
            (&["look"], look),
            (&["examine", "search"], examine),
            (&["walk", "go", "move"], walk),
            (&["take", "get", "pickup", "pick up"], take),
            (&["drop"], drop),
            (&["open"], open),
            (&["close"], close),
            (&["put"], put),
            (&["inventory", "i"], inventory),
            (&["wipe", "wipe off", "clean"], wipe),
            (&["sit"], sit),
            (&["stand", "get up", "get off"], stand),
            (&["talk", "speak", "ask"], talk),
            (&["use", "operate", "activate"], use_item),
            (&["eat"], eat),
            (&["read"], read),
            (&["touch", "feel", "rub"], touch),
            (&["help"], help),
            (&["quit"], quit),
            (&["save"], save),
        ];
        let mut verbs = IndexMap::new();
        for (names, handler) in table {
            for name in names {
                verbs.insert((*name).to_string(), handler);
            }
        }
        Self { verbs }
    }

    /// Add or replace a verb.
    pub fn with_verb(mut self, name: impl Into<String>, handler: VerbFn) -> Self {
        self.verbs.insert(name.into().to_lowercase(), handler);
        self
    }

    /// The handler for `verb`.
    pub fn get(&self, verb: &str) -> Option<VerbFn> {
        self.verbs.get(verb).copied()
    }

    /// Whether `verb` has a handler.
    pub fn contains(&self, verb: &str) -> bool {
        self.verbs.contains_key(verb)
    }

    /// All verb names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.verbs.keys().map(String::as_str)
    }
}

fn name_of(turn: &Turn<'_>, key: &str) -> FictionResult<String> {
    Ok(turn.world().entity(key)?.name.clone())
}

fn not_here(name: &str) -> String {
    let phrase = name.to_lowercase();
    format!("I don't see {} {phrase} here!", indefinite_article(&phrase))
}

/// The direct object, or a "verb what?" line when there is none.
fn object(turn: &mut Turn<'_>, command: &Command) -> Option<EntityKey> {
    let key = command.direct_entity().cloned();
    if key.is_none() {
        turn.say(format!("{} what?", command.verb));
    }
    key
}

/// The direct object if the player can reach it, else a "not here" line.
fn reachable_object(turn: &mut Turn<'_>, command: &Command) -> FictionResult<Option<EntityKey>> {
    let Some(key) = object(turn, command) else {
        return Ok(None);
    };
    if turn.reachable(key.as_str()) {
        return Ok(Some(key));
    }
    let name = name_of(turn, key.as_str())?;
    turn.say(not_here(&name));
    Ok(None)
}

fn look(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    describe(turn, command, false)
}

fn examine(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    describe(turn, command, true)
}

fn describe(turn: &mut Turn<'_>, command: &Command, closely: bool) -> FictionResult<()> {
    let room = turn.room()?;
    let target = match command.direct_entity() {
        None => room.clone(),
        Some(key) => key.clone(),
    };
    if target == room {
        let lines = narrator::describe_room(turn.world(), room.as_str())?;
        turn.say_all(lines);
        return Ok(());
    }
    if target == turn.inventory()? {
        let lines = narrator::inventory_listing(turn.world(), turn.player().as_str())?;
        turn.say_all(lines);
        return Ok(());
    }
    if !turn.reachable(target.as_str()) {
        let name = name_of(turn, target.as_str())?;
        turn.say(not_here(&name));
        return Ok(());
    }

    let entity = turn.world().entity(target.as_str())?;
    let text = if closely {
        entity.descriptions.examine()
    } else {
        entity.describe()
    }
    .to_string();
    let open_container = entity.as_container().is_some() && entity.has_flag(Flag::Open);
    turn.say(text);
    if open_container {
        let lines = narrator::look_inside(turn.world(), target.as_str())?;
        turn.say_all(lines);
    }
    Ok(())
}

fn walk(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let room = turn.room()?;
    let exit = match &command.direct {
        Some(Target::Direction(direction)) => turn
            .world()
            .exit_toward(room.as_str(), *direction)
            .map(|exit| exit.key.clone()),
        Some(Target::Entity(key)) => turn
            .world()
            .get(key.as_str())
            .filter(|e| e.as_exit().is_some() && e.location.as_ref() == Some(&room))
            .map(|exit| exit.key.clone()),
        None => None,
    };
    let Some(exit) = exit else {
        turn.say("There isn't an exit in that direction!");
        return Ok(());
    };

    let entity = turn.world().entity(exit.as_str())?;
    let exit_name = entity.name.clone();
    let locked = entity.has_flag(Flag::Locked);
    let Some(destination) = entity.as_exit().map(|state| state.connection.clone()) else {
        turn.say("There isn't an exit in that direction!");
        return Ok(());
    };

    if locked {
        let inventory = turn.inventory()?;
        match turn.world_mut().open(exit.as_str(), inventory.as_str())? {
            OpenOutcome::Unlocked(key) => {
                let key_name = name_of(turn, key.as_str())?;
                turn.say(format!("The {exit_name} opens with the {key_name}."));
            }
            OpenOutcome::Locked(key) => {
                let key_name = match key {
                    Some(key) => name_of(turn, key.as_str())?,
                    None => "key".to_string(),
                };
                turn.say(format!(
                    "The {exit_name} is locked and you don't have the {key_name}."
                ));
                return Ok(());
            }
            OpenOutcome::Opened | OpenOutcome::NotOpenable => {}
        }
    }

    let player = turn.player().clone();
    turn.world_mut()
        .move_character(player.as_str(), destination.as_str())?;
    let lines = narrator::describe_room(turn.world(), destination.as_str())?;
    turn.say_all(lines);
    Ok(())
}

fn take(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(item) = object(turn, command) else {
        return Ok(());
    };
    let entity = turn.world().entity(item.as_str())?;
    let name = entity.name.clone();
    let takeable = entity.has_flag(Flag::Takeable);
    let worth = entity
        .has_flag(Flag::Currency)
        .then(|| entity.profile.as_ref().and_then(|p| p.worth))
        .flatten();

    if turn.carrying(item.as_str()) {
        turn.say(format!("You've already taken the {name}! Check your INV"));
        return Ok(());
    }
    let room = turn.room()?;
    if !turn.world().is_present(item.as_str(), room.as_str()) {
        turn.say(not_here(&name));
        return Ok(());
    }
    if !takeable {
        turn.say(format!("The {name} won't budge."));
        return Ok(());
    }

    if let Some(worth) = worth {
        let player = turn.player().clone();
        let stats = turn.world_mut().player_stats_mut(player.as_str())?;
        stats.money = stats.money.saturating_add(worth);
        let total = stats.money;
        turn.world_mut().remove_from_play(item.as_str())?;
        turn.say(format!("You pocket the {name}. You now have {total}."));
        return Ok(());
    }

    let inventory = turn.inventory()?;
    if !turn.world().fits(item.as_str(), inventory.as_str()) {
        turn.say(format!(
            "The {name} won't fit in your INV! Try dropping something if you really want it."
        ));
        return Ok(());
    }
    turn.world_mut().place(item.as_str(), inventory.as_str())?;
    turn.world_mut()
        .entity_mut(item.as_str())?
        .set_description_or_main(DescriptionTag::Main);
    turn.say("Taken.");
    Ok(())
}

fn drop(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(item) = object(turn, command) else {
        return Ok(());
    };
    let name = name_of(turn, item.as_str())?;
    if !turn.carrying(item.as_str()) {
        turn.say(format!(
            "You don't have {} {name} to drop.",
            indefinite_article(&name)
        ));
        return Ok(());
    }
    let room = turn.room()?;
    turn.world_mut().place(item.as_str(), room.as_str())?;
    turn.world_mut()
        .entity_mut(item.as_str())?
        .set_description_or_main(DescriptionTag::Dropped);
    turn.say("Dropped it like it's hot.");
    Ok(())
}

fn open(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let entity = turn.world().entity(target.as_str())?;
    let name = entity.name.clone();
    let is_container = entity.as_container().is_some();
    let inventory = turn.inventory()?;

    match turn.world_mut().open(target.as_str(), inventory.as_str())? {
        OpenOutcome::Unlocked(key) => {
            let key_name = name_of(turn, key.as_str())?;
            turn.say(format!("You unlock the {name} with the {key_name}."));
            if is_container {
                let lines = narrator::look_inside(turn.world(), target.as_str())?;
                turn.say_all(lines);
            }
        }
        OpenOutcome::Opened if is_container => {
            let lines = narrator::look_inside(turn.world(), target.as_str())?;
            turn.say_all(lines);
        }
        OpenOutcome::Opened => turn.say(format!("The {name} is open.")),
        OpenOutcome::Locked(_) => {
            turn.say(format!("The {name} is locked and you don't have the key."));
        }
        OpenOutcome::NotOpenable => {
            turn.say(format!("You can't open the {name} try a different command."));
        }
    }
    Ok(())
}

fn close(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    let line = match turn.world_mut().close(target.as_str())? {
        CloseOutcome::Closed => format!("{name} closed."),
        CloseOutcome::AlreadyClosed => format!("No need. The {name} is already closed."),
        CloseOutcome::NotClosable => format!("You can't close the {name} try a different command."),
    };
    turn.say(line);
    Ok(())
}

fn put(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(item) = object(turn, command) else {
        return Ok(());
    };
    let item_entity = turn.world().entity(item.as_str())?;
    let name = item_entity.name.clone();
    let takeable = item_entity.has_flag(Flag::Takeable);

    let Some(container) = command.indirect.clone() else {
        turn.say(format!("Where do you want to put the {name}?"));
        return Ok(());
    };
    if container == turn.inventory()? {
        return take(turn, &Command::new("take").with_direct(item));
    }

    let container_entity = turn.world().entity(container.as_str())?;
    let container_name = container_entity.name.clone();
    if container_entity.as_container().is_none() {
        turn.say(format!(
            "You can't. The {container_name} doesn't have anywhere to put it in (it's not a container)."
        ));
        return Ok(());
    }
    if item == container {
        turn.say(format!("You can't put the {name} inside itself."));
        return Ok(());
    }
    if !container_entity.has_flag(Flag::Open) {
        turn.say(format!("Why don't you try opening the {container_name} first!"));
        return Ok(());
    }
    if !takeable {
        turn.say(format!(
            "You can't take the {name} in the first place. So....no."
        ));
        return Ok(());
    }
    if !turn.reachable(item.as_str()) {
        turn.say(format!(
            "You can't put the {name} anywhere because it's not here."
        ));
        return Ok(());
    }
    if !turn.reachable(container.as_str()) {
        turn.say(not_here(&container_name));
        return Ok(());
    }
    if !turn.world().fits(item.as_str(), container.as_str()) {
        turn.say(format!("The {name} won't fit in the {container_name}!"));
        return Ok(());
    }
    turn.world_mut().place(item.as_str(), container.as_str())?;
    turn.say(format!("You put the {name} in the {container_name}."));
    Ok(())
}

fn inventory(turn: &mut Turn<'_>, _command: &Command) -> FictionResult<()> {
    let lines = narrator::inventory_listing(turn.world(), turn.player().as_str())?;
    turn.say_all(lines);
    Ok(())
}

fn wipe(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    turn.say(format!(
        "You really put a spit shine on the {name}...but it looks much the same."
    ));
    Ok(())
}

fn sit(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    turn.say(format!("You can't sit on the {name}."));
    Ok(())
}

fn stand(turn: &mut Turn<'_>, _command: &Command) -> FictionResult<()> {
    let room = turn.room()?;
    let seats: Vec<EntityKey> = turn
        .world()
        .entity(room.as_str())?
        .as_room()
        .map(|state| {
            state
                .items
                .iter()
                .filter(|key| {
                    turn.world().get(key.as_str()).is_some_and(|e| {
                        *e.descriptions.current_tag() == DescriptionTag::Sitting
                    })
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if seats.is_empty() {
        turn.say("You're already standing.");
        return Ok(());
    }
    for seat in &seats {
        turn.world_mut()
            .entity_mut(seat.as_str())?
            .set_description_or_main(DescriptionTag::Main);
    }
    turn.say("You get up.");
    Ok(())
}

fn talk(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    turn.say(format!("The {name} has nothing to say."));
    Ok(())
}

fn use_item(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    turn.say(format!("You can't figure out how to use the {name}."));
    Ok(())
}

fn eat(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let entity = turn.world().entity(target.as_str())?;
    let name = entity.name.clone();
    if !entity.has_flag(Flag::Edible) {
        turn.say(format!("You can't eat the {name}!"));
        return Ok(());
    }
    turn.world_mut().remove_from_play(target.as_str())?;
    turn.say(format!("You eat the {name}. Not bad."));
    Ok(())
}

fn read(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let entity = turn.world().entity(target.as_str())?;
    let line = if entity.has_flag(Flag::Readable) {
        entity.descriptions.examine().to_string()
    } else {
        format!("There's nothing to read on the {}.", entity.name)
    };
    turn.say(line);
    Ok(())
}

fn touch(turn: &mut Turn<'_>, command: &Command) -> FictionResult<()> {
    let Some(target) = reachable_object(turn, command)? else {
        return Ok(());
    };
    let name = name_of(turn, target.as_str())?;
    turn.say(format!("The {name} feels about how you'd expect."));
    Ok(())
}

fn help(turn: &mut Turn<'_>, _command: &Command) -> FictionResult<()> {
    turn.say_all(
        [
            "Try commands like:",
            "  look, examine <thing>, search <thing>",
            "  take <thing>, drop <thing>, inventory",
            "  open <thing>, close <thing>, put <thing> in <container>",
            "  go <direction>, sit on <thing>, get up",
            "  talk <someone>, use <thing>, quit",
        ]
        .map(String::from),
    );
    Ok(())
}

fn quit(turn: &mut Turn<'_>, _command: &Command) -> FictionResult<()> {
    turn.say("Thanks for playing! Goodbye!");
    turn.push_effect(TurnEffect::Quit);
    Ok(())
}

fn save(turn: &mut Turn<'_>, _command: &Command) -> FictionResult<()> {
    turn.say("Saving isn't supported in this version.");
    Ok(())
}
