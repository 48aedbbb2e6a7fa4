//! Text rendering for rooms, containers, inventories and dialogue.
//!
//! Every function returns response lines; nothing here prints.

use advent_core::{Direction, Entity, Flag, World};

use crate::dialogue::DialogueGraph;
use crate::error::FictionResult;

/// Full description of a room: its text, the takeable items lying in it and
/// its exits, followed by an exit list.
pub fn describe_room(world: &World, room: &str) -> FictionResult<Vec<String>> {
    let entity = world.entity(room)?;
    let Some(state) = entity.as_room() else {
        return Ok(vec![entity.describe().to_string()]);
    };

    let mut main = format!("You are in the {}: {}", entity.name, entity.describe());
    for item in state.items.iter().filter_map(|key| world.get(key.as_str())) {
        if item.has_flag(Flag::Takeable) && !item.has_flag(Flag::Invisible) {
            main.push(' ');
            main.push_str(item.describe());
        }
    }
    for (direction, exit) in exits(world, entity) {
        main.push_str(&format!(" To the {direction} {}", exit.describe()));
    }

    let mut lines = vec![main];
    let exit_lines: Vec<String> = exits(world, entity)
        .map(|(direction, exit)| {
            format!("To the {direction} is the {} : {}", exit.name, exit.describe())
        })
        .collect();
    if !exit_lines.is_empty() {
        lines.push("---Exits---".to_string());
        lines.extend(exit_lines);
    }
    Ok(lines)
}

fn exits<'a>(
    world: &'a World,
    room: &'a Entity,
) -> impl Iterator<Item = (Direction, &'a Entity)> + 'a {
    room.as_room()
        .into_iter()
        .flat_map(|state| state.exits.iter())
        .filter_map(|(direction, key)| world.get(key.as_str()).map(|exit| (*direction, exit)))
}

/// What is inside a container.
pub fn look_inside(world: &World, container: &str) -> FictionResult<Vec<String>> {
    let entity = world.entity(container)?;
    let mut lines = vec![format!(
        "You look inside the {} and see...",
        entity.descriptive_name()
    )];
    let items: Vec<&Entity> = entity
        .as_container()
        .map(|state| {
            state
                .items
                .iter()
                .filter_map(|key| world.get(key.as_str()))
                .filter(|item| !item.has_flag(Flag::Invisible))
                .collect()
        })
        .unwrap_or_default();
    if items.is_empty() {
        lines.push("Nothing. It's empty.".to_string());
    } else {
        for item in items {
            lines.push(format!("{}: {}", item.descriptive_name(), item.describe()));
        }
    }
    Ok(lines)
}

/// The player's inventory and money.
pub fn inventory_listing(world: &World, player: &str) -> FictionResult<Vec<String>> {
    let inventory = world.inventory_of(player)?;
    let items: Vec<&Entity> = world
        .entity(inventory.as_str())?
        .as_container()
        .map(|state| {
            state
                .items
                .iter()
                .filter_map(|key| world.get(key.as_str()))
                .collect()
        })
        .unwrap_or_default();

    let mut lines = if items.is_empty() {
        vec!["You aren't carrying anything.".to_string()]
    } else {
        let mut lines = vec!["You are carrying:".to_string()];
        lines.extend(items.iter().map(|item| format!("  {}", item.descriptive_name())));
        lines
    };
    if let Some(stats) = world.player_stats(player) {
        lines.push(format!("Money: {}", stats.money));
    }
    Ok(lines)
}

/// The current node's text, its numbered choices and the input prompt.
pub fn dialogue_prompt(graph: &DialogueGraph) -> Vec<String> {
    let node = graph.current_node();
    let mut lines = vec![node.text.clone()];
    if graph.is_finished() {
        return lines;
    }
    lines.push(String::new());
    for (i, choice) in node.choices.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, choice.text));
    }
    lines.push(String::new());
    lines.push(format!(
        "Choose an option (1-{}) or 'quit' to end conversation.",
        node.choices.len()
    ));
    lines
}
