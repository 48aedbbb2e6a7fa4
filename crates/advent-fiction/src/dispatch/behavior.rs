use advent_core::{DescriptionTag, EntityKey};
use serde::{Deserialize, Serialize};

use super::{Command, ObjectAction, Turn, TurnEffect};
use crate::error::FictionResult;
use crate::parser::Target;

/// Per-object behavior declared in scenario data.
///
/// Every variant ignores commands while its subject is out of reach, so the
/// generic verb can report that it is not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// Re-run the generic verb on another entity.
    Redirect {
        /// Verbs that are redirected.
        verbs: Vec<String>,
        /// Entity that receives them instead.
        target: EntityKey,
    },
    /// Reply with fixed lines.
    Scripted {
        /// Verbs that trigger the reply.
        verbs: Vec<String>,
        /// Lines to print.
        response: Vec<String>,
    },
    /// Something to sit on. Needs a `Sitting` description.
    Seat,
    /// Start a dialogue.
    Conversation {
        /// Dialogue id.
        dialogue: String,
        /// Verbs that start it.
        #[serde(default = "conversation_verbs")]
        verbs: Vec<String>,
    },
    /// A vending machine.
    Vendor,
}

fn conversation_verbs() -> Vec<String> {
    ["talk", "speak", "ask", "rub", "touch"]
        .map(String::from)
        .to_vec()
}

fn listed(verbs: &[String], verb: &str) -> bool {
    verbs.iter().any(|v| v == verb)
}

impl Behavior {
    /// The dialogue this behavior starts, if any.
    pub fn dialogue(&self) -> Option<&str> {
        match self {
            Self::Conversation { dialogue, .. } => Some(dialogue),
            _ => None,
        }
    }

    /// The entity this behavior redirects to, if any.
    pub fn redirect_target(&self) -> Option<&EntityKey> {
        match self {
            Self::Redirect { target, .. } => Some(target),
            _ => None,
        }
    }

    fn redirect(command: &Command, subject: &EntityKey, target: &EntityKey) -> Command {
        let mut redirected = command.clone();
        if command.indirect.as_ref() == Some(subject) {
            redirected.indirect = Some(target.clone());
        } else {
            redirected.direct = Some(Target::Entity(target.clone()));
        }
        redirected
    }

    fn seat(command: &Command, subject: &EntityKey, turn: &mut Turn<'_>) -> FictionResult<bool> {
        let entity = turn.world().entity(subject.as_str())?;
        let name = entity.name.clone();
        let sitting = *entity.descriptions.current_tag() == DescriptionTag::Sitting;
        match command.verb.as_str() {
            "sit" if sitting => turn.say(format!("You're already sitting on the {name}.")),
            "sit" => {
                turn.world_mut()
                    .entity_mut(subject.as_str())?
                    .set_description(DescriptionTag::Sitting)?;
                turn.say(format!("You sit down on the {name}."));
            }
            "stand" | "get off" | "get up" if sitting => {
                turn.world_mut()
                    .entity_mut(subject.as_str())?
                    .set_description(DescriptionTag::Main)?;
                turn.say(format!("You get up off the {name}."));
            }
            "stand" | "get off" | "get up" => {
                turn.say(format!("You aren't sitting on the {name}."));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn vendor(command: &Command, subject: &EntityKey, turn: &mut Turn<'_>) -> FictionResult<bool> {
        let entity = turn.world().entity(subject.as_str())?;
        let name = entity.name.clone();
        match command.verb.as_str() {
            "use" | "operate" | "activate" => turn.push_effect(TurnEffect::StartVending {
                vendor: subject.clone(),
            }),
            "look" | "examine" | "search" => {
                let text = entity.descriptions.examine().to_string();
                turn.say(text);
                turn.say(format!("Type 'use {}' to start shopping!", name.to_lowercase()));
            }
            _ => turn.say(format!("The {name} sits silently. Maybe try using it?")),
        }
        Ok(true)
    }
}

impl ObjectAction for Behavior {
    fn act(
        &self,
        command: &Command,
        subject: &EntityKey,
        turn: &mut Turn<'_>,
    ) -> FictionResult<bool> {
        if !turn.reachable(subject.as_str()) {
            return Ok(false);
        }
        match self {
            Self::Redirect { verbs, target } => {
                if !listed(verbs, &command.verb) {
                    return Ok(false);
                }
                turn.run_verb(&Self::redirect(command, subject, target))
            }
            Self::Scripted { verbs, response } => {
                if !listed(verbs, &command.verb) {
                    return Ok(false);
                }
                turn.say_all(response.iter().cloned());
                Ok(true)
            }
            Self::Seat => Self::seat(command, subject, turn),
            Self::Conversation { dialogue, verbs } => {
                if !listed(verbs, &command.verb) {
                    return Ok(false);
                }
                turn.push_effect(TurnEffect::StartConversation {
                    dialogue: dialogue.clone(),
                });
                Ok(true)
            }
            Self::Vendor => Self::vendor(command, subject, turn),
        }
    }
}
