//! Arena-based node storage
//!
//! Every node of every document lives in one `Vec`, addressed by a 4-byte
//! `NodeId`. The owning edge is parent → children (the child id list); the
//! parent and owner-document links are plain ids and carry no ownership, so
//! there are no reference cycles to break.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<Option<Node>>
//!        [Doc0][Elem1][Elem2][None][Comment4]...
//!                             ↑ released slot, id never reused
//! ```

use crate::attributes::{AttributeStore, AttributeValue};
use crate::error::{DomError, Result};
use crate::types::{ElementData, Node, NodeData, NodeId, NodeType};

/// Arena holding documents, elements and comments
#[derive(Debug, Clone)]
pub struct NodeArena {
    /// Slots indexed by `NodeId`; `None` once released
    nodes: Vec<Option<Node>>,

    /// Number of live slots
    live: usize,
}

impl NodeArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    fn alloc(&mut self, owner_document: Option<NodeId>, data: NodeData) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        self.nodes.push(Some(Node::new(node_id, owner_document, data)));
        self.live += 1;
        node_id
    }

    /// Create a new, empty document
    pub fn create_document(&mut self) -> NodeId {
        let id = self.alloc(None, NodeData::Document);
        tracing::trace!("created document {}", id);
        id
    }

    /// Create a detached element owned by `document`
    pub fn create_element(&mut self, document: NodeId, local_name: &str) -> Result<NodeId> {
        self.expect_document(document)?;
        Ok(self.alloc(
            Some(document),
            NodeData::Element(ElementData::new(local_name)),
        ))
    }

    /// Create a detached comment owned by `document`
    pub fn create_comment(&mut self, document: NodeId, data: &str) -> Result<NodeId> {
        self.expect_document(document)?;
        Ok(self.alloc(Some(document), NodeData::Comment(data.to_string())))
    }

    pub(crate) fn insert_raw(&mut self, owner_document: Option<NodeId>, data: NodeData) -> NodeId {
        self.alloc(owner_document, data)
    }

    fn expect_document(&self, document: NodeId) -> Result<()> {
        if self.get(document)?.is_document() {
            Ok(())
        } else {
            Err(DomError::TypeViolation(format!(
                "node {} is not a document",
                document
            )))
        }
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&Node> {
        self.nodes
            .get(node_id as usize)
            .and_then(Option::as_ref)
            .ok_or(DomError::UnknownNode(node_id))
    }

    /// Get node by ID (mutable)
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(node_id as usize)
            .and_then(Option::as_mut)
            .ok_or(DomError::UnknownNode(node_id))
    }

    /// Whether `node_id` refers to a live node
    pub fn is_live(&self, node_id: NodeId) -> bool {
        self.get(node_id).is_ok()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterator over all live node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .flatten()
            .map(|node| node.node_id)
    }

    pub fn node_type(&self, node_id: NodeId) -> Result<NodeType> {
        Ok(self.get(node_id)?.node_type())
    }

    pub fn owner_document(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.owner_document())
    }

    pub fn node_document(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.node_document())
    }

    /// Topmost ancestor (the node itself when detached)
    pub fn get_root_node(&self, node_id: NodeId) -> Result<NodeId> {
        let mut current = self.get(node_id)?;
        while let Some(parent_id) = current.parent_id {
            current = self.get(parent_id)?;
        }
        Ok(current.node_id)
    }

    /// True iff the root of the ancestor chain is a document
    pub fn is_connected(&self, node_id: NodeId) -> Result<bool> {
        let root = self.get_root_node(node_id)?;
        Ok(self.get(root)?.is_document())
    }

    pub fn parent_node(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.parent_id)
    }

    /// Parent if it is an element, `None` under a document or when detached
    pub fn parent_element(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        match self.get(node_id)?.parent_id {
            Some(parent_id) if self.get(parent_id)?.is_element() => Ok(Some(parent_id)),
            _ => Ok(None),
        }
    }

    pub fn child_nodes(&self, node_id: NodeId) -> Result<&[NodeId]> {
        Ok(self.get(node_id)?.child_nodes())
    }

    pub fn has_child_nodes(&self, node_id: NodeId) -> Result<bool> {
        Ok(self.get(node_id)?.has_child_nodes())
    }

    pub fn first_child(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.first_child())
    }

    pub fn last_child(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.get(node_id)?.last_child())
    }

    /// Position of `node_id` within its parent's child list
    fn sibling_position(&self, node_id: NodeId) -> Result<Option<(&[NodeId], usize)>> {
        let parent_id = match self.get(node_id)?.parent_id {
            Some(parent_id) => parent_id,
            None => return Ok(None),
        };
        let siblings = self.get(parent_id)?.child_nodes();
        Ok(siblings
            .iter()
            .position(|&id| id == node_id)
            .map(|index| (siblings, index)))
    }

    pub fn previous_sibling(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self
            .sibling_position(node_id)?
            .and_then(|(siblings, index)| index.checked_sub(1).map(|i| siblings[i])))
    }

    pub fn next_sibling(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        Ok(self
            .sibling_position(node_id)?
            .and_then(|(siblings, index)| siblings.get(index + 1).copied()))
    }

    /// Element-typed children in document order
    pub fn children(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        let mut elements = Vec::with_capacity(node.children_ids.len());
        for &child_id in &node.children_ids {
            if self.get(child_id)?.is_element() {
                elements.push(child_id);
            }
        }
        Ok(elements)
    }

    pub fn first_child_element(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        for &child_id in self.get(node_id)?.child_nodes() {
            if self.get(child_id)?.is_element() {
                return Ok(Some(child_id));
            }
        }
        Ok(None)
    }

    pub fn last_child_element(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        for &child_id in self.get(node_id)?.child_nodes().iter().rev() {
            if self.get(child_id)?.is_element() {
                return Ok(Some(child_id));
            }
        }
        Ok(None)
    }

    pub fn child_element_count(&self, node_id: NodeId) -> Result<usize> {
        Ok(self.children(node_id)?.len())
    }

    pub fn previous_element_sibling(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        let mut sibling = self.previous_sibling(node_id)?;
        while let Some(id) = sibling {
            if self.get(id)?.is_element() {
                return Ok(Some(id));
            }
            sibling = self.previous_sibling(id)?;
        }
        Ok(None)
    }

    pub fn next_element_sibling(&self, node_id: NodeId) -> Result<Option<NodeId>> {
        let mut sibling = self.next_sibling(node_id)?;
        while let Some(id) = sibling {
            if self.get(id)?.is_element() {
                return Ok(Some(id));
            }
            sibling = self.next_sibling(id)?;
        }
        Ok(None)
    }

    /// The single element child of a document
    pub fn document_element(&self, document: NodeId) -> Result<Option<NodeId>> {
        self.expect_document(document)?;
        self.first_child_element(document)
    }

    /// Element children of the node's parent, when the parent is an element
    /// or the node's own document. Empty for detached nodes.
    pub(crate) fn sibling_elements(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let node = self.get(node_id)?;
        match node.parent_id {
            Some(parent_id) => {
                let parent = self.get(parent_id)?;
                if parent.is_element() || Some(parent_id) == node.owner_document() {
                    self.children(parent_id)
                } else {
                    Ok(Vec::new())
                }
            }
            None => Ok(Vec::new()),
        }
    }

    /// True iff `node_id` is a strict ancestor of `other`
    pub fn contains(&self, node_id: NodeId, other: NodeId) -> Result<bool> {
        self.get(node_id)?;
        let mut current = self.get(other)?.parent_id;
        while let Some(ancestor) = current {
            if ancestor == node_id {
                return Ok(true);
            }
            current = self.get(ancestor)?.parent_id;
        }
        Ok(false)
    }

    /// Identity comparison
    pub fn is_same_node(&self, node_id: NodeId, other: NodeId) -> bool {
        node_id == other
    }

    /// Structural equality: same kind, same name/attributes or comment data,
    /// pairwise equal children
    pub fn is_equal_node(&self, node_id: NodeId, other: NodeId) -> Result<bool> {
        let mut pairs = vec![(node_id, other)];
        while let Some((l, r)) = pairs.pop() {
            let left = self.get(l)?;
            if l == r {
                continue;
            }
            let right = self.get(r)?;
            if left.data != right.data || left.children_ids.len() != right.children_ids.len() {
                return Ok(false);
            }
            pairs.extend(left.children_ids.iter().copied().zip(right.children_ids.iter().copied()));
        }
        Ok(true)
    }

    /// Traverse tree depth-first, pre-order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&Node) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// All descendants in pre-order, excluding `node_id` itself
    pub fn descendants(&self, node_id: NodeId) -> Result<Vec<NodeId>> {
        let mut ids = Vec::new();
        self.traverse_df(node_id, |node| {
            if node.node_id != node_id {
                ids.push(node.node_id);
            }
            Ok(())
        })?;
        Ok(ids)
    }

    fn element(&self, node_id: NodeId) -> Result<&ElementData> {
        self.get(node_id)?.as_element().ok_or_else(|| {
            DomError::TypeViolation(format!("node {} is not an element", node_id))
        })
    }

    fn element_mut(&mut self, node_id: NodeId) -> Result<&mut ElementData> {
        self.get_mut(node_id)?.as_element_mut().ok_or_else(|| {
            DomError::TypeViolation(format!("node {} is not an element", node_id))
        })
    }

    pub fn local_name(&self, node_id: NodeId) -> Result<&str> {
        Ok(&self.element(node_id)?.local_name)
    }

    pub fn attributes(&self, node_id: NodeId) -> Result<&AttributeStore> {
        Ok(&self.element(node_id)?.attributes)
    }

    pub fn set_attribute(
        &mut self,
        node_id: NodeId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<()> {
        self.element_mut(node_id)?.attributes.set(name, value);
        Ok(())
    }

    pub fn get_attribute(&self, node_id: NodeId, name: &str) -> Result<Option<&AttributeValue>> {
        Ok(self.element(node_id)?.attributes.get(name))
    }

    pub fn has_attribute(&self, node_id: NodeId, name: &str) -> Result<bool> {
        Ok(self.element(node_id)?.attributes.has(name))
    }

    pub fn remove_attribute(&mut self, node_id: NodeId, name: &str) -> Result<Option<AttributeValue>> {
        Ok(self.element_mut(node_id)?.attributes.remove(name))
    }

    /// Attribute names, sorted
    pub fn get_attribute_names(&self, node_id: NodeId) -> Result<Vec<&str>> {
        Ok(self.element(node_id)?.attributes.names())
    }

    pub fn comment_data(&self, node_id: NodeId) -> Result<&str> {
        self.get(node_id)?.comment_data().ok_or_else(|| {
            DomError::TypeViolation(format!("node {} is not a comment", node_id))
        })
    }

    pub fn set_comment_data(&mut self, node_id: NodeId, data: &str) -> Result<()> {
        match &mut self.get_mut(node_id)?.data {
            NodeData::Comment(text) => {
                *text = data.to_string();
                Ok(())
            }
            _ => Err(DomError::TypeViolation(format!(
                "node {} is not a comment",
                node_id
            ))),
        }
    }

    /// Rewrite the owner document of a whole subtree
    pub(crate) fn set_owner_document_recursive(
        &mut self,
        node_id: NodeId,
        document: NodeId,
    ) -> Result<()> {
        let mut stack = vec![node_id];
        while let Some(id) = stack.pop() {
            let node = self.get_mut(id)?;
            node.owner_document = Some(document);
            stack.extend(node.children_ids.iter().copied());
        }
        Ok(())
    }

    /// Move a subtree into `document` without touching its parent link
    pub fn adopt_node(&mut self, document: NodeId, node_id: NodeId) -> Result<NodeId> {
        self.expect_document(document)?;
        if self.get(node_id)?.is_document() {
            return Err(DomError::TypeViolation(
                "a document cannot be adopted".to_string(),
            ));
        }
        self.set_owner_document_recursive(node_id, document)?;
        Ok(node_id)
    }

    /// Destroy a detached subtree. Returns the number of freed nodes.
    ///
    /// Released ids are never handed out again. A document can only be
    /// released once no node outside its subtree is owned by it.
    pub fn release(&mut self, node_id: NodeId) -> Result<usize> {
        let node = self.get(node_id)?;
        if node.parent_id.is_some() {
            return Err(DomError::HierarchyViolation(
                "only detached nodes can be released".to_string(),
            ));
        }
        let is_document = node.is_document();
        let mut subtree = self.descendants(node_id)?;
        subtree.push(node_id);

        if is_document {
            let still_owned = self.nodes.iter().flatten().any(|n| {
                n.owner_document == Some(node_id) && !subtree.contains(&n.node_id)
            });
            if still_owned {
                return Err(DomError::HierarchyViolation(
                    "document still owns detached nodes".to_string(),
                ));
            }
        }

        for id in &subtree {
            if let Some(slot) = self.nodes.get_mut(*id as usize) {
                *slot = None;
            }
        }
        self.live -= subtree.len();
        tracing::debug!("released {} nodes rooted at {}", subtree.len(), node_id);
        Ok(subtree.len())
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
