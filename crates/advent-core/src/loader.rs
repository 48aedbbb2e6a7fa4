//! JSON world definitions.
//!
//! A [`WorldFile`] lists entities in declaration order. Building happens in
//! two phases: every entity is registered first, then placements and exits
//! are resolved, so a definition may refer to entities declared later.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::entity::{
    CharacterState, ContainerState, DescriptionTag, Entity, EntityKey, EntityKind, ExitState, Flag,
    ItemProfile, PlayerStats, RoomState, Urgency,
};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::world::{World, WorldMeta};

/// Fields every entity definition shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonDef {
    /// Unique key.
    pub key: EntityKey,
    /// Display name.
    pub name: String,
    /// Description texts by tag. Must include `Main`.
    pub descriptions: BTreeMap<DescriptionTag, String>,
    /// Key of the holding room, container or character.
    #[serde(default)]
    pub location: Option<EntityKey>,
    /// Initial flags.
    #[serde(default)]
    pub flags: Vec<Flag>,
}

/// Parser vocabulary and size of a story item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDef {
    /// Alternate nouns.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Descriptive modifiers.
    #[serde(default)]
    pub adjectives: Vec<String>,
    /// Slots occupied.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Value in cents for currency items.
    #[serde(default)]
    pub worth: Option<Money>,
}

fn default_size() -> u32 {
    1
}

impl ProfileDef {
    fn into_profile(self) -> ItemProfile {
        ItemProfile {
            synonyms: self.synonyms,
            adjectives: self.adjectives,
            size: self.size,
            worth: self.worth,
        }
    }
}

/// An exit declared inside its room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDef {
    /// Shared fields. `location` is ignored; the declaring room owns the exit.
    #[serde(flatten)]
    pub common: CommonDef,
    /// Room the exit leads to.
    pub connection: EntityKey,
    /// Item that unlocks it.
    #[serde(default)]
    pub key_object: Option<EntityKey>,
}

/// A room and its exits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDef {
    /// Shared fields.
    #[serde(flatten)]
    pub common: CommonDef,
    /// Exits keyed by direction name.
    #[serde(default)]
    pub exits: BTreeMap<String, ExitDef>,
}

/// A plain story item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    /// Shared fields.
    #[serde(flatten)]
    pub common: CommonDef,
    /// Vocabulary and size.
    #[serde(flatten)]
    pub profile: ProfileDef,
}

/// A container item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerDef {
    /// Shared fields.
    #[serde(flatten)]
    pub common: CommonDef,
    /// Vocabulary and size.
    #[serde(flatten)]
    pub profile: ProfileDef,
    /// Total slots.
    pub capacity: u32,
    /// Item that unlocks it.
    #[serde(default)]
    pub key_object: Option<EntityKey>,
}

/// A character's inventory container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryDef {
    /// Key of the inventory container.
    pub key: EntityKey,
    /// Display name.
    #[serde(default = "default_inventory_name")]
    pub name: String,
    /// Total slots.
    pub capacity: u32,
    /// Nouns that refer to the inventory.
    #[serde(default = "default_inventory_synonyms")]
    pub synonyms: Vec<String>,
}

fn default_inventory_name() -> String {
    "Inventory".to_string()
}

fn default_inventory_synonyms() -> Vec<String> {
    vec!["inventory".to_string(), "inv".to_string()]
}

/// Starting statistics for the player character.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerDef {
    /// Starting money in cents.
    #[serde(default)]
    pub money: Money,
    /// Starting urgency level.
    #[serde(default)]
    pub urgency: u32,
}

/// The player or an NPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterDef {
    /// Shared fields.
    #[serde(flatten)]
    pub common: CommonDef,
    /// Optional vocabulary so the character can be addressed by nouns.
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Health.
    #[serde(default = "default_hit_points")]
    pub hit_points: i32,
    /// Inventory container.
    pub inventory: InventoryDef,
    /// Present only for the player character.
    #[serde(default)]
    pub player: Option<PlayerDef>,
}

fn default_hit_points() -> i32 {
    10
}

/// One entity definition, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntityDef {
    /// A room.
    Room(RoomDef),
    /// A story item.
    Item(ItemDef),
    /// A container.
    Container(ContainerDef),
    /// A character.
    Character(CharacterDef),
}

/// A complete world on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldFile {
    /// World title.
    pub title: String,
    /// Introduction text.
    #[serde(default)]
    pub description: String,
    /// Entities in declaration order.
    pub entities: Vec<EntityDef>,
}

impl WorldFile {
    /// Decode a world definition.
    pub fn from_json(source: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Build the world, validating every key, placement and exit.
    pub fn build(self) -> CoreResult<World> {
        let mut world = World::new(WorldMeta {
            title: self.title,
            description: self.description,
        });
        let mut placements: Vec<(EntityKey, EntityKey)> = Vec::new();
        let mut exits: Vec<(EntityKey, Direction, EntityKey)> = Vec::new();

        for def in self.entities {
            match def {
                EntityDef::Room(room) => {
                    let room_key = room.common.key.clone();
                    let (entity, _) =
                        build_entity(room.common, EntityKind::Room(RoomState::default()), None)?;
                    world.add_entity(entity)?;
                    for (name, exit) in room.exits {
                        let direction =
                            Direction::parse(&name).ok_or(CoreError::InvalidDirection(name))?;
                        let exit_key = exit.common.key.clone();
                        let kind = EntityKind::Exit(ExitState {
                            connection: exit.connection,
                            key_object: exit.key_object,
                        });
                        let (entity, _) = build_entity(exit.common, kind, None)?;
                        world.add_entity(entity)?;
                        exits.push((room_key.clone(), direction, exit_key));
                    }
                }
                EntityDef::Item(item) => {
                    let profile = item.profile.into_profile();
                    let (entity, location) = build_entity(item.common, EntityKind::Item, Some(profile))?;
                    push_placement(&mut placements, &entity, location);
                    world.add_entity(entity)?;
                }
                EntityDef::Container(container) => {
                    let mut state = ContainerState::new(container.capacity);
                    state.key_object = container.key_object;
                    let profile = container.profile.into_profile();
                    let (entity, location) = build_entity(
                        container.common,
                        EntityKind::Container(state),
                        Some(profile),
                    )?;
                    push_placement(&mut placements, &entity, location);
                    world.add_entity(entity)?;
                }
                EntityDef::Character(character) => {
                    let inventory = character.inventory;
                    world.add_entity(
                        Entity::new(
                            inventory.key.clone(),
                            inventory.name,
                            "Everything you are carrying.",
                            EntityKind::Container(ContainerState::new(inventory.capacity)),
                        )
                        .with_profile(ItemProfile::new(inventory.synonyms))
                        .with_flag(Flag::Open),
                    )?;

                    let player = character.player.map(|p| PlayerStats {
                        money: p.money,
                        urgency: Urgency::new(p.urgency),
                    });
                    let is_player = player.is_some();
                    let kind = EntityKind::Character(CharacterState {
                        hit_points: character.hit_points,
                        inventory: inventory.key,
                        player,
                    });
                    let profile = (!character.synonyms.is_empty())
                        .then(|| ItemProfile::new(character.synonyms));
                    let (mut entity, location) = build_entity(character.common, kind, profile)?;
                    if is_player {
                        entity.set_flag(Flag::Player);
                    }
                    push_placement(&mut placements, &entity, location);
                    world.add_entity(entity)?;
                }
            }
        }

        for (item, holder) in placements {
            world.place(item.as_str(), holder.as_str())?;
        }
        for (room, direction, exit) in exits {
            let target = world
                .entity(exit.as_str())?
                .as_exit()
                .map(|state| state.connection.clone())
                .ok_or_else(|| CoreError::EntityNotFound(exit.clone()))?;
            if world.entity(target.as_str())?.as_room().is_none() {
                return Err(CoreError::NotARoom(target));
            }
            world.link_exit(room.as_str(), direction, exit.as_str())?;
        }
        Ok(world)
    }
}

/// Turn shared fields into an entity, splitting off its location for the
/// placement phase.
fn build_entity(
    common: CommonDef,
    kind: EntityKind,
    profile: Option<ItemProfile>,
) -> CoreResult<(Entity, Option<EntityKey>)> {
    let mut entity = Entity::with_descriptions(common.key, common.name, common.descriptions, kind)?;
    entity.flags.extend(common.flags);
    entity.profile = profile;
    Ok((entity, common.location))
}

fn push_placement(
    placements: &mut Vec<(EntityKey, EntityKey)>,
    entity: &Entity,
    location: Option<EntityKey>,
) {
    if let Some(location) = location {
        placements.push((entity.key.clone(), location));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_WORLD: &str = r#"{
        "title": "Test Hotel",
        "entities": [
            {
                "type": "room", "key": "room-201", "name": "Room 201",
                "descriptions": { "Main": "A dingy hotel room." },
                "exits": {
                    "north": {
                        "key": "hall-door", "name": "Door",
                        "descriptions": { "Main": "A flimsy door." },
                        "connection": "hallway"
                    }
                }
            },
            {
                "type": "room", "key": "hallway", "name": "Hallway",
                "descriptions": { "Main": "A long hallway." }
            },
            {
                "type": "container", "key": "drawer", "name": "Drawer",
                "descriptions": { "Main": "A nightstand drawer." },
                "location": "room-201", "capacity": 2, "key_object": "brass-key",
                "synonyms": ["drawer"]
            },
            {
                "type": "item", "key": "note", "name": "Note",
                "descriptions": { "Main": "A crumpled note.", "Dropped": "A note lies here." },
                "location": "drawer", "flags": ["takeable", "readable"],
                "synonyms": ["note", "paper"], "adjectives": ["crumpled"]
            },
            {
                "type": "character", "key": "player", "name": "Guy",
                "descriptions": { "Main": "That's you." },
                "location": "room-201",
                "inventory": { "key": "player-inventory", "capacity": 10 },
                "player": { "money": 0, "urgency": 45 }
            }
        ]
    }"#;

    #[test]
    fn builds_small_world() {
        let world = WorldFile::from_json(SMALL_WORLD).unwrap().build().unwrap();
        assert_eq!(world.meta.title, "Test Hotel");
        assert!(world.contains_item("drawer", "note"));
        assert!(world.get("drawer").unwrap().has_flag(Flag::Locked));
        let exit = world.exit_toward("room-201", Direction::North).unwrap();
        assert_eq!(exit.key.as_str(), "hall-door");
        assert_eq!(world.player_stats("player").unwrap().urgency.level(), 45);
        assert!(world.get("player").unwrap().has_flag(Flag::Player));
        let note = world.get("note").unwrap();
        assert!(note.has_flag(Flag::Takeable));
        assert_eq!(note.descriptive_name(), "crumpled Note");
    }

    #[test]
    fn rejects_unknown_direction() {
        let json = SMALL_WORLD.replace("\"north\"", "\"upward\"");
        let err = WorldFile::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, CoreError::InvalidDirection(d) if d == "upward"));
    }

    #[test]
    fn rejects_missing_main_description() {
        let json = SMALL_WORLD.replace(
            r#"{ "Main": "A long hallway." }"#,
            r#"{ "Examine": "A long hallway." }"#,
        );
        let err = WorldFile::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, CoreError::MissingMainDescription(k) if k.as_str() == "hallway"));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let json = SMALL_WORLD.replace("\"key\": \"hallway\"", "\"key\": \"room-201\"");
        let err = WorldFile::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey(_)));
    }

    #[test]
    fn rejects_exit_to_missing_room() {
        let json = SMALL_WORLD.replace("\"connection\": \"hallway\"", "\"connection\": \"attic\"");
        let err = WorldFile::from_json(&json).unwrap().build().unwrap_err();
        assert!(matches!(err, CoreError::EntityNotFound(k) if k.as_str() == "attic"));
    }
}
