//! Tree serializer - textual XML-like dump of a subtree
//!
//! This module handles:
//! - Indented output with attributes in lexicographic order
//! - Optional XML declaration for document nodes
//! - Selector paths that identify an element uniquely

use crate::arena::NodeArena;
use crate::error::{DomError, Result};
use crate::types::{NodeData, NodeId};
use crate::utils::escape_attribute;
use serde::{Deserialize, Serialize};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Pending work for the iterative walk
enum Step {
    Open(NodeId, usize),
    Close(NodeId, usize),
}

/// Serializer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Added once per nesting level
    pub indent: String,
    /// Emit the XML declaration line for document nodes
    pub xml_declaration: bool,
    pub escape_attributes: bool,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            xml_declaration: true,
            escape_attributes: true,
        }
    }
}

impl SerializerConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.indent.chars().all(char::is_whitespace) {
            return Err(DomError::InvalidConfig(format!(
                "indent must be whitespace, got {:?}",
                self.indent
            )));
        }
        Ok(())
    }
}

/// Tree serializer
pub struct DomSerializer {
    config: SerializerConfig,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serialize `node_id` and its subtree
    pub fn serialize(&self, arena: &NodeArena, node_id: NodeId) -> Result<String> {
        let mut output = String::with_capacity(1024);
        let mut stack = vec![Step::Open(node_id, 0)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Open(id, depth) => self.open_node(arena, id, depth, &mut output, &mut stack)?,
                Step::Close(id, depth) => {
                    output.push_str(&self.config.indent.repeat(depth));
                    output.push_str("</");
                    output.push_str(arena.local_name(id)?);
                    output.push_str(">\n");
                }
            }
        }

        Ok(output)
    }

    /// Emit the opening part of a node and schedule its children
    fn open_node(
        &self,
        arena: &NodeArena,
        node_id: NodeId,
        depth: usize,
        output: &mut String,
        stack: &mut Vec<Step>,
    ) -> Result<()> {
        let node = arena.get(node_id)?;
        let indent = self.config.indent.repeat(depth);

        match &node.data {
            NodeData::Document => {
                if self.config.xml_declaration {
                    output.push_str(&indent);
                    output.push_str(XML_DECLARATION);
                    output.push('\n');
                }
                // Children of a document stay at the document's depth
                stack.extend(node.child_nodes().iter().rev().map(|&id| Step::Open(id, depth)));
            }
            NodeData::Element(element) => {
                // Format: <tag a="1" b="x">
                output.push_str(&indent);
                output.push('<');
                output.push_str(&element.local_name);

                for name in element.attributes.names() {
                    let value = element.attributes.resolved(name);
                    output.push(' ');
                    output.push_str(name);
                    output.push_str("=\"");
                    if self.config.escape_attributes {
                        output.push_str(&escape_attribute(&value));
                    } else {
                        output.push_str(&value);
                    }
                    output.push('"');
                }
                output.push_str(">\n");

                stack.push(Step::Close(node_id, depth));
                stack.extend(
                    node.child_nodes()
                        .iter()
                        .rev()
                        .map(|&id| Step::Open(id, depth + 1)),
                );
            }
            NodeData::Comment(data) => {
                output.push_str(&indent);
                output.push_str("<!--");
                output.push_str(data);
                output.push_str("-->\n");
            }
        }

        Ok(())
    }

    /// Selector that picks exactly `node_id` when queried from its document
    /// (or from its detached root), e.g. `root:root > a:nth-child(3)`.
    ///
    /// Assumes local names are plain identifiers.
    pub fn selector_path(&self, arena: &NodeArena, node_id: NodeId) -> Result<String> {
        if !arena.get(node_id)?.is_element() {
            return Err(DomError::TypeViolation(format!(
                "selector_path needs an element, node {} is a {}",
                node_id,
                arena.node_type(node_id)?.name()
            )));
        }

        let mut path_parts = Vec::new();
        let mut current_id = node_id;
        loop {
            let name = arena.local_name(current_id)?.to_ascii_lowercase();
            match arena.parent_element(current_id)? {
                Some(parent_id) => {
                    // 1-indexed like :nth-child
                    let position = arena
                        .sibling_elements(current_id)?
                        .iter()
                        .position(|&id| id == current_id)
                        .map(|p| p + 1)
                        .unwrap_or(1);
                    path_parts.push(format!("{}:nth-child({})", name, position));
                    current_id = parent_id;
                }
                None => {
                    path_parts.push(format!("{}:root", name));
                    break;
                }
            }
        }

        path_parts.reverse();
        Ok(path_parts.join(" > "))
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}
