//! Complete playable scenarios loaded from JSON.

use std::collections::BTreeMap;
use std::path::Path;

use advent_core::loader::WorldFile;
use advent_core::{CoreError, DescriptionTag, EntityKey, World};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::dialogue::{DialogueData, DialogueGraph};
use crate::dispatch::Behavior;
use crate::error::{FictionError, FictionResult};
use crate::session::Session;
use crate::vending::VendingMachine;

/// A world plus everything that makes it interactive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    /// Title and entities.
    #[serde(flatten)]
    pub world: WorldFile,
    /// Key of the player character.
    pub player: EntityKey,
    /// Per-object behaviors.
    #[serde(default)]
    pub behaviors: BTreeMap<EntityKey, Behavior>,
    /// Dialogues by id.
    #[serde(default)]
    pub dialogues: BTreeMap<String, DialogueData>,
    /// Vending machines by entity key.
    #[serde(default)]
    pub vendors: BTreeMap<EntityKey, VendingMachine>,
}

impl ScenarioFile {
    /// Decode a scenario.
    pub fn from_json(source: &str) -> FictionResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Read and decode a scenario file.
    pub fn from_path(path: impl AsRef<Path>) -> FictionResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Build and validate everything, then start a session.
    ///
    /// Fails on any world error, a behavior naming a missing entity or
    /// dialogue, a seat without a `Sitting` description, an invalid dialogue
    /// or a product template that cannot be built.
    pub fn into_session(self, config: SessionConfig) -> FictionResult<Session> {
        let world = self.world.build()?;

        let mut dialogues = BTreeMap::new();
        for (id, data) in self.dialogues {
            let graph = data.into_graph(&id)?;
            dialogues.insert(id, graph);
        }

        for (key, behavior) in &self.behaviors {
            check_behavior(&world, key, behavior, &dialogues)?;
        }
        for (key, machine) in &self.vendors {
            if !world.contains_key(key.as_str()) {
                return Err(FictionError::VendorNotFound(key.clone()));
            }
            machine.validate()?;
        }

        let mut session = Session::new(world, self.player, config)?;
        for (id, graph) in dialogues {
            session = session.with_dialogue(id, graph);
        }
        for (key, behavior) in self.behaviors {
            session = session.with_handler(key, behavior);
        }
        for (key, machine) in self.vendors {
            session = session.with_vendor(key, machine);
        }
        Ok(session)
    }
}

fn check_behavior(
    world: &World,
    key: &EntityKey,
    behavior: &Behavior,
    dialogues: &BTreeMap<String, DialogueGraph>,
) -> FictionResult<()> {
    let entity = world
        .get(key.as_str())
        .ok_or_else(|| FictionError::EntityNotFound(key.clone()))?;
    if let Some(target) = behavior.redirect_target()
        && !world.contains_key(target.as_str())
    {
        return Err(FictionError::EntityNotFound(target.clone()));
    }
    if let Some(dialogue) = behavior.dialogue()
        && !dialogues.contains_key(dialogue)
    {
        return Err(FictionError::DialogueNotFound(dialogue.to_string()));
    }
    if matches!(behavior, Behavior::Seat) && !entity.descriptions.has(&DescriptionTag::Sitting) {
        return Err(CoreError::UnknownDescription {
            key: key.clone(),
            tag: DescriptionTag::Sitting.to_string(),
        }
        .into());
    }
    Ok(())
}
