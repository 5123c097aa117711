//! In-memory host backed by a TOML scene document
//!
//! A scene lists nodes and animation channels:
//!
//! ```toml
//! frame = 1
//! selection = ["Top/Curve_2"]
//!
//! [[node]]
//! id = "Top/Offset"
//! type = "OffsetModule"
//! parent = "Top"
//! attrs = { "offset.x" = -10.0, "offset.y" = 0.0, orientation = 0.0 }
//!
//! [[node]]
//! id = "Top/Curve_1"
//! type = "CurveModule"
//! parent = "Top"
//! source = "Top/Offset"
//! flags = { closepath = "N", localreferential = "N" }
//!
//! [[channel]]
//! name = "offset.x"
//! node = "Top/Curve_1"
//! attr = "offset.x"
//! keys = [{ frame = 1, value = -4.0 }]
//! ```
//!
//! A node's `source` is the node plugged into its first input port. An
//! attribute linked to a channel takes the channel's value (holding the last
//! key at or before the frame); otherwise it takes the static value under
//! `attrs`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::HostError;
use crate::host::{AttributeReader, AttributeWriter, GraphLookup, SelectionSource, TransactionScope};
use crate::rig::types::{Attr, ChannelId, Flag, Frame, NodeId, NodeKind};

/// Errors that can occur when loading or saving a scene document
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Failed to read scene file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse scene TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize scene: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("node '{0}' is defined more than once")]
    DuplicateNode(NodeId),
    #[error("{context} refers to unknown node '{node}'")]
    UnknownNode { context: String, node: NodeId },
}

/// A node entry of a scene document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    /// Host module type, e.g. `CurveModule`
    #[serde(rename = "type")]
    pub module_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<NodeId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub resting: BTreeMap<String, f64>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>, module_type: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            module_type: module_type.into(),
            parent: None,
            source: None,
            attrs: BTreeMap::new(),
            flags: BTreeMap::new(),
            resting: BTreeMap::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(NodeId::new(parent));
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(NodeId::new(source));
        self
    }

    pub fn with_attr(mut self, attr: Attr, value: f64) -> Self {
        self.attrs.insert(attr.name().to_string(), value);
        self
    }

    pub fn with_flag(mut self, flag: Flag, value: &str) -> Self {
        self.flags.insert(flag.name().to_string(), value.to_string());
        self
    }
}

/// A single key of a channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub frame: Frame,
    pub value: f64,
}

/// An animation channel linked to one node attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: ChannelId,
    pub node: NodeId,
    pub attr: String,
    #[serde(default)]
    pub keys: Vec<Key>,
}

impl Channel {
    /// Value held at `frame`: the last key at or before it, else the first key
    pub fn value_at(&self, frame: Frame) -> Option<f64> {
        self.keys
            .iter()
            .rev()
            .find(|k| k.frame <= frame)
            .or_else(|| self.keys.first())
            .map(|k| k.value)
    }

    fn set_key(&mut self, frame: Frame, value: f64) {
        match self.keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(pos) => self.keys[pos].value = value,
            Err(pos) => self.keys.insert(pos, Key { frame, value }),
        }
    }
}

fn default_aspect_ratio() -> f64 {
    1.0
}

fn default_frame() -> Frame {
    1
}

/// TOML structure of a scene document
#[derive(Debug, Serialize, Deserialize)]
struct SceneDocument {
    #[serde(default = "default_aspect_ratio")]
    aspect_ratio: f64,
    #[serde(default = "default_frame")]
    frame: Frame,
    #[serde(default)]
    selection: Vec<NodeId>,
    #[serde(default, rename = "node")]
    nodes: Vec<SceneNode>,
    #[serde(default, rename = "channel")]
    channels: Vec<Channel>,
}

/// Host implementation over an in-memory scene
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: Vec<SceneNode>,
    index: HashMap<NodeId, usize>,
    channels: Vec<Channel>,
    selection: Vec<NodeId>,
    aspect_ratio: f64,
    frame: Frame,
    open_transactions: Vec<String>,
    transactions: Vec<String>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            channels: Vec::new(),
            selection: Vec::new(),
            aspect_ratio: default_aspect_ratio(),
            frame: default_frame(),
            open_transactions: Vec::new(),
            transactions: Vec::new(),
        }
    }
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a scene from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SceneError> {
        let doc: SceneDocument = toml::from_str(content)?;
        let mut scene = Self {
            aspect_ratio: doc.aspect_ratio,
            frame: doc.frame,
            ..Self::default()
        };
        for node in doc.nodes {
            scene.add_node(node)?;
        }
        for mut channel in doc.channels {
            if !scene.index.contains_key(&channel.node) {
                return Err(SceneError::UnknownNode {
                    context: format!("channel '{}'", channel.name),
                    node: channel.node,
                });
            }
            channel.keys.sort_by_key(|k| k.frame);
            scene.channels.push(channel);
        }
        scene.set_selection(doc.selection)?;

        debug!(
            "loaded scene with {} nodes and {} channels",
            scene.nodes.len(),
            scene.channels.len()
        );
        Ok(scene)
    }

    /// Serialize the scene, including every key written so far
    pub fn to_toml_string(&self) -> Result<String, SceneError> {
        let doc = SceneDocument {
            aspect_ratio: self.aspect_ratio,
            frame: self.frame,
            selection: self.selection.clone(),
            nodes: self.nodes.clone(),
            channels: self.channels.clone(),
        };
        Ok(toml::to_string(&doc)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn add_node(&mut self, node: SceneNode) -> Result<(), SceneError> {
        if self.index.contains_key(&node.id) {
            return Err(SceneError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Replace the selection; every selected node must exist
    pub fn set_selection(&mut self, selection: Vec<NodeId>) -> Result<(), SceneError> {
        if let Some(missing) = selection.iter().find(|id| !self.index.contains_key(*id)) {
            return Err(SceneError::UnknownNode {
                context: "selection".to_string(),
                node: missing.clone(),
            });
        }
        self.selection = selection;
        Ok(())
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Playhead frame stored in the document
    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn node(&self, id: &NodeId) -> Option<&SceneNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel linked to a node attribute
    pub fn linked_channel(&self, id: &NodeId, attr: Attr) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| &c.node == id && c.attr == attr.name())
    }

    /// Resting parameter value by its host name
    pub fn resting_value(&self, id: &NodeId, name: &str) -> Option<f64> {
        self.node(id).and_then(|n| n.resting.get(name).copied())
    }

    /// Labels of completed transactions, oldest first
    pub fn transactions(&self) -> &[String] {
        &self.transactions
    }

    fn node_or_err(&self, id: &NodeId) -> Result<&SceneNode, HostError> {
        self.node(id).ok_or_else(|| HostError::MissingNode(id.clone()))
    }

    fn channel_mut(&mut self, channel: &ChannelId) -> Result<&mut Channel, HostError> {
        self.channels
            .iter_mut()
            .find(|c| &c.name == channel)
            .ok_or_else(|| HostError::MissingChannel(channel.clone()))
    }

    /// `base`, or `base_1`, `base_2`, ... when the name is taken
    fn unique_channel_name(&self, base: &str) -> ChannelId {
        let taken = |name: &str| self.channels.iter().any(|c| c.name.0 == name);
        let mut name = base.to_string();
        let mut suffix = 0;
        while taken(&name) {
            suffix += 1;
            name = format!("{}_{}", base, suffix);
        }
        ChannelId(name)
    }
}

impl GraphLookup for MemoryScene {
    fn node_kind(&self, id: &NodeId) -> Option<NodeKind> {
        self.node(id)
            .and_then(|n| NodeKind::from_module_type(&n.module_type))
    }

    fn parent_of(&self, id: &NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent.clone())
    }

    fn source_node(&self, id: &NodeId, port: usize) -> Option<NodeId> {
        if port != 0 {
            return None;
        }
        self.node(id).and_then(|n| n.source.clone())
    }

    fn destination_node(&self, id: &NodeId, port: usize, link: usize) -> Option<NodeId> {
        if port != 0 {
            return None;
        }
        self.nodes
            .iter()
            .filter(|n| n.source.as_ref() == Some(id))
            .nth(link)
            .map(|n| n.id.clone())
    }

    fn sub_node_count(&self, parent: &NodeId) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.parent.as_ref() == Some(parent))
            .count()
    }
}

impl AttributeReader for MemoryScene {
    fn read_scalar(&self, id: &NodeId, attr: Attr, frame: Frame) -> Result<f64, HostError> {
        let node = self.node_or_err(id)?;
        if let Some(value) = self.linked_channel(id, attr).and_then(|c| c.value_at(frame)) {
            return Ok(value);
        }
        node.attrs
            .get(attr.name())
            .copied()
            .ok_or_else(|| HostError::missing_attribute(id, attr.name()))
    }

    fn read_flag(&self, id: &NodeId, flag: Flag) -> Result<String, HostError> {
        self.node_or_err(id)?
            .flags
            .get(flag.name())
            .cloned()
            .ok_or_else(|| HostError::missing_attribute(id, flag.name()))
    }

    fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

impl AttributeWriter for MemoryScene {
    fn ensure_channel(&mut self, id: &NodeId, attr: Attr) -> Result<ChannelId, HostError> {
        if let Some(channel) = self.linked_channel(id, attr) {
            return Ok(channel.name.clone());
        }
        let node = self.node_or_err(id)?;
        if !node.attrs.contains_key(attr.name()) {
            return Err(HostError::ChannelUnavailable {
                node: id.clone(),
                attr: attr.name().to_string(),
            });
        }

        let name = self.unique_channel_name(attr.name());
        debug!("linking new channel '{}' to {}.{}", name, id, attr);
        self.channels.push(Channel {
            name: name.clone(),
            node: id.clone(),
            attr: attr.name().to_string(),
            keys: Vec::new(),
        });
        Ok(name)
    }

    fn write_keyframe(
        &mut self,
        channel: &ChannelId,
        frame: Frame,
        value: f64,
    ) -> Result<(), HostError> {
        self.channel_mut(channel)?.set_key(frame, value);
        Ok(())
    }

    fn clear_all_keyframes(&mut self, channel: &ChannelId) -> Result<(), HostError> {
        self.channel_mut(channel)?.keys.clear();
        Ok(())
    }

    fn copy_to_resting(&mut self, id: &NodeId, attr: Attr, frame: Frame) -> Result<(), HostError> {
        let value = self.read_scalar(id, attr, frame)?;
        let kind = self
            .node_kind(id)
            .ok_or_else(|| HostError::missing_attribute(id, attr.name()))?;
        let name = attr
            .resting_name(kind)
            .ok_or_else(|| HostError::missing_attribute(id, format!("resting {}", attr)))?;

        let index = self.index[id];
        self.nodes[index].resting.insert(name.to_string(), value);
        Ok(())
    }
}

impl TransactionScope for MemoryScene {
    fn begin(&mut self, label: &str) {
        self.open_transactions.push(label.to_string());
    }

    fn end(&mut self) {
        if let Some(label) = self.open_transactions.pop() {
            self.transactions.push(label);
        }
    }
}

impl SelectionSource for MemoryScene {
    fn current_selection(&self) -> Vec<NodeId> {
        self.selection.clone()
    }
}
