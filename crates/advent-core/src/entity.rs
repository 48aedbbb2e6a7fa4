use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Globally unique key naming an entity, e.g. `"brass-key"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Create a key from any string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntityKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Capability and state tags attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// The entity is the player character.
    Player,
    /// Can be picked up.
    Takeable,
    /// Holds other items.
    Container,
    /// Never listed or reachable by the player.
    Invisible,
    /// Things can be placed on top of it.
    Surface,
    /// Fixed scenery.
    SetPiece,
    /// Requires a key before it can be opened.
    Locked,
    /// Can be eaten.
    Edible,
    /// A door.
    Door,
    /// Currently open.
    Open,
    /// Can be worn.
    Wearable,
    /// Currently worn.
    Worn,
    /// Has something written on it.
    Readable,
    /// Emits light when lit.
    LightSource,
    /// Currently lit.
    Lit,
    /// Loose money; taking it adds to the player's balance.
    Currency,
}

/// Which of an entity's descriptions is showing.
///
/// Tags serialize as their capitalized names (`"Main"`, `"Sitting"`); any
/// other string becomes [`DescriptionTag::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DescriptionTag {
    /// The default description. Every entity has one.
    Main,
    /// Shown by `examine` and `search`.
    Examine,
    /// Shown after the player drops the item.
    Dropped,
    /// Shown while the player sits on the entity.
    Sitting,
    /// A content-defined state.
    Custom(String),
}

impl From<&str> for DescriptionTag {
    fn from(tag: &str) -> Self {
        match tag {
            "Main" => Self::Main,
            "Examine" => Self::Examine,
            "Dropped" => Self::Dropped,
            "Sitting" => Self::Sitting,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for DescriptionTag {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<DescriptionTag> for String {
    fn from(tag: DescriptionTag) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for DescriptionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("Main"),
            Self::Examine => f.write_str("Examine"),
            Self::Dropped => f.write_str("Dropped"),
            Self::Sitting => f.write_str("Sitting"),
            Self::Custom(tag) => f.write_str(tag),
        }
    }
}

/// The set of descriptions an entity declares, plus the active one.
///
/// A `Main` text is always present; construction fails without one, and
/// switching to a tag that was never declared is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptions {
    texts: BTreeMap<DescriptionTag, String>,
    current: DescriptionTag,
    examine: DescriptionTag,
}

impl Descriptions {
    /// Descriptions with only a `Main` text.
    pub fn new(main: impl Into<String>) -> Self {
        let mut texts = BTreeMap::new();
        texts.insert(DescriptionTag::Main, main.into());
        Self {
            texts,
            current: DescriptionTag::Main,
            examine: DescriptionTag::Main,
        }
    }

    /// Build from a full tag map. Returns `None` if `Main` is missing.
    pub fn from_texts(texts: BTreeMap<DescriptionTag, String>) -> Option<Self> {
        if !texts.contains_key(&DescriptionTag::Main) {
            return None;
        }
        let examine = if texts.contains_key(&DescriptionTag::Examine) {
            DescriptionTag::Examine
        } else {
            DescriptionTag::Main
        };
        Some(Self {
            texts,
            current: DescriptionTag::Main,
            examine,
        })
    }

    /// Declare another description.
    pub fn insert(&mut self, tag: DescriptionTag, text: impl Into<String>) {
        if tag == DescriptionTag::Examine {
            self.examine = DescriptionTag::Examine;
        }
        self.texts.insert(tag, text.into());
    }

    /// Whether `tag` was declared.
    pub fn has(&self, tag: &DescriptionTag) -> bool {
        self.texts.contains_key(tag)
    }

    /// The text for `tag`, if declared.
    pub fn text(&self, tag: &DescriptionTag) -> Option<&str> {
        self.texts.get(tag).map(String::as_str)
    }

    /// The active tag.
    pub fn current_tag(&self) -> &DescriptionTag {
        &self.current
    }

    /// The tag `examine` reads from.
    pub fn examine_tag(&self) -> &DescriptionTag {
        &self.examine
    }

    /// The active description text.
    pub fn current(&self) -> &str {
        self.text(&self.current)
            .or_else(|| self.text(&DescriptionTag::Main))
            .unwrap_or_default()
    }

    /// The examine description text.
    pub fn examine(&self) -> &str {
        self.text(&self.examine)
            .or_else(|| self.text(&DescriptionTag::Main))
            .unwrap_or_default()
    }

    /// Switch the active tag. Returns `false` and leaves the state alone if
    /// the tag was never declared.
    pub fn set_current(&mut self, tag: DescriptionTag) -> bool {
        if self.texts.contains_key(&tag) {
            self.current = tag;
            true
        } else {
            false
        }
    }

    /// Iterate all declared tags and texts in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&DescriptionTag, &str)> {
        self.texts.iter().map(|(tag, text)| (tag, text.as_str()))
    }
}

/// Nouns and modifiers the parser matches against, plus physical size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemProfile {
    /// Alternate nouns, e.g. `["ear plugs", "plugs"]`.
    pub synonyms: Vec<String>,
    /// Descriptive modifiers, at most three are expanded.
    pub adjectives: Vec<String>,
    /// Capacity slots this item occupies.
    pub size: u32,
    /// Value added to the player's money when a currency item is taken.
    pub worth: Option<Money>,
}

impl ItemProfile {
    /// A profile with the given synonyms and a size of one slot.
    pub fn new<S: Into<String>>(synonyms: impl IntoIterator<Item = S>) -> Self {
        Self {
            synonyms: synonyms.into_iter().map(Into::into).collect(),
            adjectives: Vec::new(),
            size: 1,
            worth: None,
        }
    }

    /// Set the adjectives.
    pub fn with_adjectives<S: Into<String>>(
        mut self,
        adjectives: impl IntoIterator<Item = S>,
    ) -> Self {
        self.adjectives = adjectives.into_iter().map(Into::into).collect();
        self
    }

    /// Set the size in capacity slots.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set the currency worth.
    pub fn with_worth(mut self, worth: Money) -> Self {
        self.worth = Some(worth);
        self
    }
}

/// Contents and lock state of a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerState {
    /// Total capacity in slots.
    pub capacity: u32,
    /// Contained entities, in insertion order.
    pub items: Vec<EntityKey>,
    /// Item that unlocks this container.
    pub key_object: Option<EntityKey>,
}

impl ContainerState {
    /// An empty container with the given capacity.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            items: Vec::new(),
            key_object: None,
        }
    }

    /// Require `key` to unlock.
    pub fn with_key(mut self, key: impl Into<EntityKey>) -> Self {
        self.key_object = Some(key.into());
        self
    }
}

/// Exits and contents of a room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomState {
    /// Exit entity keyed by the direction it leaves in.
    pub exits: BTreeMap<Direction, EntityKey>,
    /// Entities physically present, in arrival order.
    pub items: Vec<EntityKey>,
    /// How many times the player has entered.
    pub times_visited: u32,
}

/// A one-way connection between rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitState {
    /// The room this exit leads to.
    pub connection: EntityKey,
    /// Item that unlocks this exit.
    pub key_object: Option<EntityKey>,
}

/// Pressure meter that climbs each turn, clamped to `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Urgency(u8);

impl Urgency {
    /// Upper bound of the meter.
    pub const MAX: u8 = 100;

    /// Create a meter reading, clamping to the maximum.
    pub fn new(level: u32) -> Self {
        Self(u8::try_from(level).map_or(Self::MAX, |l| l.min(Self::MAX)))
    }

    /// Current reading.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Raise the meter by `step`, stopping at the maximum.
    pub fn advance(&mut self, step: u32) {
        *self = Self::new(u32::from(self.0).saturating_add(step));
    }
}

/// Player-only statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Cash on hand.
    pub money: Money,
    /// Turn pressure meter.
    pub urgency: Urgency,
}

/// State shared by the player and NPCs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterState {
    /// Health.
    pub hit_points: i32,
    /// Key of the container entity acting as this character's inventory.
    pub inventory: EntityKey,
    /// Set for the player character only.
    pub player: Option<PlayerStats>,
}

/// What an entity is, with the data that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// A plain story item.
    Item,
    /// An item that holds other items.
    Container(ContainerState),
    /// A location.
    Room(RoomState),
    /// A connection out of a room.
    Exit(ExitState),
    /// The player or an NPC.
    Character(CharacterState),
}

impl EntityKind {
    /// Short lowercase label, e.g. `"container"`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Container(_) => "container",
            Self::Room(_) => "room",
            Self::Exit(_) => "exit",
            Self::Character(_) => "character",
        }
    }
}

/// Anything in the world that has a unique key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    /// Unique key.
    pub key: EntityKey,
    /// Display name, not necessarily unique.
    pub name: String,
    /// Declared descriptions and the active one.
    pub descriptions: Descriptions,
    /// Key of the room or container holding this entity.
    pub location: Option<EntityKey>,
    /// Capability and state tags.
    pub flags: BTreeSet<Flag>,
    /// Parser vocabulary; present on story items and containers.
    pub profile: Option<ItemProfile>,
    /// Kind-specific data.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an entity with a `Main` description.
    ///
    /// Containers get the [`Flag::Container`] flag and keyed containers or
    /// exits start out [`Flag::Locked`].
    pub fn new(
        key: impl Into<EntityKey>,
        name: impl Into<String>,
        main: impl Into<String>,
        kind: EntityKind,
    ) -> Self {
        let mut flags = BTreeSet::new();
        match &kind {
            EntityKind::Container(state) => {
                flags.insert(Flag::Container);
                if state.key_object.is_some() {
                    flags.insert(Flag::Locked);
                }
            }
            EntityKind::Exit(state) if state.key_object.is_some() => {
                flags.insert(Flag::Locked);
            }
            _ => {}
        }
        Self {
            key: key.into(),
            name: name.into(),
            descriptions: Descriptions::new(main),
            location: None,
            flags,
            profile: None,
            kind,
        }
    }

    /// Create an entity from a full description map.
    pub fn with_descriptions(
        key: impl Into<EntityKey>,
        name: impl Into<String>,
        texts: BTreeMap<DescriptionTag, String>,
        kind: EntityKind,
    ) -> CoreResult<Self> {
        let key = key.into();
        let descriptions = Descriptions::from_texts(texts)
            .ok_or_else(|| CoreError::MissingMainDescription(key.clone()))?;
        let mut entity = Self::new(key, name, String::new(), kind);
        entity.descriptions = descriptions;
        Ok(entity)
    }

    /// Add a flag.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.insert(flag);
        self
    }

    /// Add several flags.
    pub fn with_flags(mut self, flags: impl IntoIterator<Item = Flag>) -> Self {
        self.flags.extend(flags);
        self
    }

    /// Set the initial location.
    pub fn with_location(mut self, location: impl Into<EntityKey>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Attach parser vocabulary.
    pub fn with_profile(mut self, profile: ItemProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Declare an extra description.
    pub fn with_description(mut self, tag: DescriptionTag, text: impl Into<String>) -> Self {
        self.descriptions.insert(tag, text);
        self
    }

    /// Whether the flag is set.
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    /// Set a flag.
    pub fn set_flag(&mut self, flag: Flag) {
        self.flags.insert(flag);
    }

    /// Clear a flag.
    pub fn clear_flag(&mut self, flag: Flag) {
        self.flags.remove(&flag);
    }

    /// The active description text.
    pub fn describe(&self) -> &str {
        self.descriptions.current()
    }

    /// Switch to a declared description.
    pub fn set_description(&mut self, tag: DescriptionTag) -> CoreResult<()> {
        let label = tag.to_string();
        if self.descriptions.set_current(tag) {
            Ok(())
        } else {
            Err(CoreError::UnknownDescription {
                key: self.key.clone(),
                tag: label,
            })
        }
    }

    /// Switch to `tag` if declared, otherwise back to `Main`.
    pub fn set_description_or_main(&mut self, tag: DescriptionTag) {
        if !self.descriptions.set_current(tag) {
            self.descriptions.set_current(DescriptionTag::Main);
        }
    }

    /// Adjectives followed by the name, e.g. `"crusty yellow Ear Plugs"`.
    pub fn descriptive_name(&self) -> String {
        match &self.profile {
            Some(profile) if !profile.adjectives.is_empty() => {
                format!("{} {}", profile.adjectives.join(" "), self.name)
            }
            _ => self.name.clone(),
        }
    }

    /// Capacity slots this entity occupies.
    pub fn size(&self) -> u32 {
        self.profile.as_ref().map_or(0, |p| p.size)
    }

    /// Whether this is a story item (has parser vocabulary).
    pub fn is_story_item(&self) -> bool {
        self.profile.is_some()
    }

    /// Container data, if this is a container.
    pub fn as_container(&self) -> Option<&ContainerState> {
        match &self.kind {
            EntityKind::Container(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable container data.
    pub fn as_container_mut(&mut self) -> Option<&mut ContainerState> {
        match &mut self.kind {
            EntityKind::Container(state) => Some(state),
            _ => None,
        }
    }

    /// Room data, if this is a room.
    pub fn as_room(&self) -> Option<&RoomState> {
        match &self.kind {
            EntityKind::Room(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable room data.
    pub fn as_room_mut(&mut self) -> Option<&mut RoomState> {
        match &mut self.kind {
            EntityKind::Room(state) => Some(state),
            _ => None,
        }
    }

    /// Exit data, if this is an exit.
    pub fn as_exit(&self) -> Option<&ExitState> {
        match &self.kind {
            EntityKind::Exit(state) => Some(state),
            _ => None,
        }
    }

    /// Character data, if this is a character.
    pub fn as_character(&self) -> Option<&CharacterState> {
        match &self.kind {
            EntityKind::Character(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable character data.
    pub fn as_character_mut(&mut self) -> Option<&mut CharacterState> {
        match &mut self.kind {
            EntityKind::Character(state) => Some(state),
            _ => None,
        }
    }
}
