use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
}

/// Directed edge: `target` is listed by Spotify as related to `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
}

/// Artists as nodes, "related to" as directed links.
///
/// Serializes as `{"nodes": [...], "links": [...]}` in insertion order. Node
/// insertion is idempotent per artist id and link insertion is idempotent
/// per `(source, target)` pair; `a -> b` and `b -> a` are distinct links.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtistGraph {
    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    #[serde(skip)]
    node_ids: HashSet<String>,
    #[serde(skip)]
    link_keys: HashSet<(String, String)>,
}

impl ArtistGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node unless one with the same id exists. Returns whether it was added.
    pub fn add_node(&mut self, id: &str, name: &str) -> bool {
        if !self.node_ids.insert(id.to_string()) {
            return false;
        }
        self.nodes.push(GraphNode {
            id: id.to_string(),
            name: name.to_string(),
        });
        true
    }

    /// Adds a link unless the exact pair exists. Returns whether it was added.
    pub fn add_link(&mut self, source: &str, target: &str) -> bool {
        if !self
            .link_keys
            .insert((source.to_string(), target.to_string()))
        {
            return false;
        }
        self.links.push(GraphLink {
            source: source.to_string(),
            target: target.to_string(),
        });
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_ids.contains(id)
    }

    pub fn contains_link(&self, source: &str, target: &str) -> bool {
        self.link_keys
            .contains(&(source.to_string(), target.to_string()))
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }
}
