//! Core node types
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Parent and owner document are plain indices, never owning
//! 3. Use SmallVec for child lists (most nodes have few children)

use crate::attributes::AttributeStore;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
pub type NodeId = u32;

/// Child id list; owning edge of the tree
pub type ChildIds = SmallVec<[NodeId; 4]>;

/// Node type, numbered like the DOM constants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Comment = 8,
    Document = 9,
}

impl NodeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NodeType::Element),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeType::Element => "Element",
            NodeType::Comment => "Comment",
            NodeType::Document => "Document",
        }
    }
}

/// Element payload: local name plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub local_name: String,
    pub attributes: AttributeStore,
}

impl ElementData {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            attributes: AttributeStore::new(),
        }
    }
}

/// Node-specific data
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Comment(String),
}

/// A node stored in the arena
///
/// `parent` is only set while attached. `owner_document` is `None` for
/// documents and stays set on detached nodes until they are adopted
/// elsewhere.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) node_id: NodeId,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) children_ids: ChildIds,
    pub(crate) owner_document: Option<NodeId>,
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn new(node_id: NodeId, owner_document: Option<NodeId>, data: NodeData) -> Self {
        Self {
            node_id,
            parent_id: None,
            children_ids: SmallVec::new(),
            owner_document,
            data,
        }
    }

    pub fn id(&self) -> NodeId {
        self.node_id
    }

    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Comment(_) => NodeType::Comment,
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn parent_node(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn child_nodes(&self) -> &[NodeId] {
        &self.children_ids
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.children_ids.is_empty()
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.children_ids.first().copied()
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.children_ids.last().copied()
    }

    /// `None` on the document itself
    pub fn owner_document(&self) -> Option<NodeId> {
        match self.data {
            NodeData::Document => None,
            _ => self.owner_document,
        }
    }

    /// Self for documents, otherwise the owner document
    pub fn node_document(&self) -> Option<NodeId> {
        match self.data {
            NodeData::Document => Some(self.node_id),
            _ => self.owner_document,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_document(&self) -> bool {
        matches!(self.data, NodeData::Document)
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Tag name for element nodes
    pub fn local_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.local_name.as_str())
    }

    /// Text of comment nodes
    pub fn comment_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Comment(data) => Some(data),
            _ => None,
        }
    }

    /// Attribute lookup; `None` for non-elements
    pub fn attr(&self, name: &str) -> Option<&crate::attributes::AttributeValue> {
        self.as_element().and_then(|e| e.attributes.get(name))
    }

    /// Resolved attribute string, empty when unset or not an element
    pub fn attr_string(&self, name: &str) -> String {
        self.as_element()
            .map(|e| e.attributes.resolved(name))
            .unwrap_or_default()
    }
}
