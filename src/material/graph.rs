//! Material node graphs.
//!
//! Only the parts the sync engine touches are modeled: named nodes, their
//! type, and the image bound to texture nodes.

use serde::{Deserialize, Serialize};

/// Node type of image texture nodes.
pub const IMAGE_NODE_KIND: &str = "TEX_IMAGE";

/// Texture sampling mode of an image node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    #[default]
    Linear,
    Closest,
    Cubic,
    Smart,
}

/// Node in a material graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialNode {
    /// Node name, unique within its graph.
    pub name: String,
    /// Node type (e.g. "TEX_IMAGE", "BSDF_PRINCIPLED").
    pub kind: String,
    /// Image bound to a texture node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

impl MaterialNode {
    /// Create a node of any kind.
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            image: None,
            interpolation: Interpolation::default(),
        }
    }

    /// Create an image texture node, optionally bound to an image.
    pub fn image_texture(name: &str, image: Option<&str>) -> Self {
        Self {
            image: image.map(str::to_string),
            ..Self::new(name, IMAGE_NODE_KIND)
        }
    }

    /// Check whether this is an image texture node.
    pub fn is_image(&self) -> bool {
        self.kind == IMAGE_NODE_KIND
    }
}

/// Named nodes of one material, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeGraph {
    nodes: Vec<MaterialNode>,
}

impl NodeGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any node with the same name.
    pub fn add_node(&mut self, node: MaterialNode) {
        match self.node_mut(&node.name) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    /// Builder form of [`NodeGraph::add_node`].
    pub fn with_node(mut self, node: MaterialNode) -> Self {
        self.add_node(node);
        self
    }

    /// Get a node by name.
    pub fn node(&self, name: &str) -> Option<&MaterialNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Get mutable node by name.
    pub fn node_mut(&mut self, name: &str) -> Option<&mut MaterialNode> {
        self.nodes.iter_mut().find(|n| n.name == name)
    }

    /// Check whether a node exists.
    pub fn contains(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &MaterialNode> {
        self.nodes.iter()
    }

    /// Get all node names.
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Image bound to a named node.
    pub fn image(&self, name: &str) -> Option<&str> {
        self.node(name)?.image.as_deref()
    }

    /// Bind an image to a named node. Returns false if the node is missing.
    pub fn set_image(&mut self, name: &str, image: &str) -> bool {
        match self.node_mut(name) {
            Some(node) => {
                node.image = Some(image.to_string());
                true
            }
            None => false,
        }
    }

    /// Set the sampling mode of a named node. Returns false if the node is missing.
    pub fn set_interpolation(&mut self, name: &str, interpolation: Interpolation) -> bool {
        match self.node_mut(name) {
            Some(node) => {
                node.interpolation = interpolation;
                true
            }
            None => false,
        }
    }

    /// Rename a node. Fails if `from` is missing or `to` is taken by another node.
    pub fn rename_node(&mut self, from: &str, to: &str) -> bool {
        if from != to && self.contains(to) {
            return false;
        }
        match self.node_mut(from) {
            Some(node) => {
                node.name = to.to_string();
                true
            }
            None => false,
        }
    }
}
