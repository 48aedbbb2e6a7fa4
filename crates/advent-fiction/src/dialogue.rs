//! Branching conversations.
//!
//! A [`DialogueGraph`] is validated completely when it is built: node ids are
//! unique, the root exists, and every choice leads somewhere real. Traversal
//! keeps a single active-node pointer and nothing else.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{FictionError, FictionResult};

/// One option the player can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueChoice {
    /// Text shown to the player.
    pub text: String,
    /// Id of the node this choice leads to.
    pub leads_to: String,
}

impl DialogueChoice {
    /// Create a choice.
    pub fn new(text: impl Into<String>, leads_to: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            leads_to: leads_to.into(),
        }
    }
}

/// A line of dialogue and the choices that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Unique id within the graph.
    pub id: String,
    /// What the other party says.
    pub text: String,
    /// Choices in display order. Empty means the conversation ends here.
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
}

impl DialogueNode {
    /// Create a node with no choices.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            choices: Vec::new(),
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, text: impl Into<String>, leads_to: impl Into<String>) -> Self {
        self.choices.push(DialogueChoice::new(text, leads_to));
        self
    }
}

/// A validated conversation graph with an active-node pointer.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    name: String,
    title: Option<String>,
    nodes: Vec<DialogueNode>,
    index: HashMap<String, usize>,
    root: usize,
    active: usize,
    terminals: BTreeSet<usize>,
}

impl DialogueGraph {
    /// Build and validate a graph.
    ///
    /// `name` labels errors. Fails on an empty or duplicate node id, a
    /// missing root, or a choice leading to an unknown node.
    pub fn new(name: &str, root: &str, nodes: Vec<DialogueNode>) -> FictionResult<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(FictionError::EmptyNodeId(name.to_string()));
            }
            if index.insert(node.id.clone(), i).is_some() {
                return Err(FictionError::DuplicateNode {
                    dialogue: name.to_string(),
                    node: node.id.clone(),
                });
            }
        }

        for node in &nodes {
            if let Some(choice) = node.choices.iter().find(|c| !index.contains_key(&c.leads_to)) {
                return Err(FictionError::DanglingChoice {
                    dialogue: name.to_string(),
                    node: node.id.clone(),
                    choice: choice.text.clone(),
                    target: choice.leads_to.clone(),
                });
            }
        }

        let root = *index.get(root).ok_or_else(|| FictionError::MissingRoot {
            dialogue: name.to_string(),
            root: root.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            title: None,
            nodes,
            index,
            root,
            active: root,
            terminals: BTreeSet::new(),
        })
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mark a node as ending the conversation even though it has choices.
    pub fn with_terminal(mut self, id: &str) -> FictionResult<Self> {
        let Some(&i) = self.index.get(id) else {
            return Err(FictionError::UnknownNode {
                dialogue: self.name.clone(),
                node: id.to_string(),
            });
        };
        self.terminals.insert(i);
        Ok(self)
    }

    /// The title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The node at the active pointer.
    pub fn current_node(&self) -> &DialogueNode {
        &self.nodes[self.active]
    }

    /// Follow choice `index` of the current node.
    ///
    /// Callers are expected to range-check first; an out-of-range index is
    /// reported as [`FictionError::InvalidChoice`] and leaves the pointer
    /// where it was.
    pub fn make_choice(&mut self, index: usize) -> FictionResult<&DialogueNode> {
        let choice = self
            .current_node()
            .choices
            .get(index)
            .ok_or(FictionError::InvalidChoice(index))?;
        // Targets were validated at construction.
        let next = self
            .index
            .get(&choice.leads_to)
            .copied()
            .ok_or(FictionError::InvalidChoice(index))?;
        self.active = next;
        Ok(self.current_node())
    }

    /// Whether the current node ends the conversation.
    pub fn is_finished(&self) -> bool {
        self.is_terminal(&self.current_node().id)
    }

    /// Whether the node has no choices or was marked terminal.
    pub fn is_terminal(&self, id: &str) -> bool {
        self.index
            .get(id)
            .is_some_and(|&i| self.nodes[i].choices.is_empty() || self.terminals.contains(&i))
    }

    /// Move the pointer back to the root.
    pub fn reset(&mut self) {
        self.active = self.root;
    }

    /// All nodes in declaration order.
    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }
}

/// A dialogue as stored in scenario JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueData {
    /// Optional title.
    #[serde(default)]
    pub title: Option<String>,
    /// Id of the first node.
    pub root: String,
    /// Nodes that end the conversation despite having choices.
    #[serde(default)]
    pub terminal: Vec<String>,
    /// All nodes.
    pub nodes: Vec<DialogueNode>,
}

impl DialogueData {
    /// Validate into a graph. `name` labels errors.
    pub fn into_graph(self, name: &str) -> FictionResult<DialogueGraph> {
        let mut graph = DialogueGraph::new(name, &self.root, self.nodes)?;
        if let Some(title) = self.title {
            graph = graph.with_title(title);
        }
        for id in &self.terminal {
            graph = graph.with_terminal(id)?;
        }
        Ok(graph)
    }
}
