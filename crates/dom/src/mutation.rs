//! Hierarchy mutation: insert, replace, remove, bulk forms and cloning.
//!
//! Every operation validates completely before touching the arena, so a
//! rejected call leaves all trees exactly as they were.

use crate::arena::NodeArena;
use crate::error::{DomError, Result};
use crate::types::{ChildIds, NodeId};

impl NodeArena {
    /// Checks shared by insert and replace: parent kind, node kind, cycles
    fn validate_parent_and_node(&self, parent: NodeId, node: NodeId) -> Result<()> {
        if self.get(parent)?.is_comment() {
            return Err(DomError::HierarchyViolation(
                "parent must be Document or Element node".to_string(),
            ));
        }
        if self.get(node)?.is_document() {
            return Err(DomError::TypeViolation(
                "node must be Element or Comment node".to_string(),
            ));
        }
        if node == parent || self.contains(node, parent)? {
            return Err(DomError::HierarchyViolation(
                "node must not be an inclusive ancestor of parent".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_insertion(&self, parent: NodeId, node: NodeId, child: Option<NodeId>) -> Result<()> {
        self.validate_parent_and_node(parent, node)?;
        if let Some(child) = child {
            if self.get(child)?.parent_id != Some(parent) {
                return Err(DomError::NotFound(format!(
                    "node {} is not a child of {}",
                    child, parent
                )));
            }
        }
        if self.get(parent)?.is_document()
            && self.get(node)?.is_element()
            && self.child_element_count(parent)? != 0
        {
            return Err(DomError::HierarchyViolation(
                "document already has an element child".to_string(),
            ));
        }
        Ok(())
    }

    /// Validation for bulk forms. With `replacing`, current children are
    /// about to be dropped and do not count against the single-element rule.
    fn validate_bulk(&self, parent: NodeId, nodes: &[NodeId], replacing: bool) -> Result<()> {
        for &node in nodes {
            if replacing {
                self.validate_parent_and_node(parent, node)?;
            } else {
                self.validate_insertion(parent, node, None)?;
            }
        }
        if self.get(parent)?.is_document() {
            let mut elements = 0;
            for &node in nodes {
                if self.get(node)?.is_element() {
                    elements += 1;
                }
            }
            if elements > 1 {
                return Err(DomError::HierarchyViolation(
                    "document can only have one element child".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Unlink `node` from its current parent, if any
    fn detach(&mut self, node: NodeId) -> Result<()> {
        if let Some(parent) = self.get(node)?.parent_id {
            self.get_mut(parent)?.children_ids.retain(|id| *id != node);
            self.get_mut(node)?.parent_id = None;
        }
        Ok(())
    }

    fn adopt_into_parent_document(&mut self, parent: NodeId, node: NodeId) -> Result<()> {
        let document = self.get(parent)?.node_document().ok_or_else(|| {
            DomError::HierarchyViolation(format!("node {} has no document", parent))
        })?;
        self.set_owner_document_recursive(node, document)
    }

    /// Insert `node` into `parent` before `child`, or at the end when `child`
    /// is `None`. A node that is already attached somewhere is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<NodeId> {
        self.validate_insertion(parent, node, child).map_err(|e| {
            tracing::debug!("insert_before({}, {}) rejected: {}", parent, node, e);
            e
        })?;

        let reference = if child == Some(node) {
            self.next_sibling(node)?
        } else {
            child
        };

        self.detach(node)?;
        self.adopt_into_parent_document(parent, node)?;

        let siblings = &mut self.get_mut(parent)?.children_ids;
        let index = reference
            .and_then(|r| siblings.iter().position(|id| *id == r))
            .unwrap_or(siblings.len());
        siblings.insert(index, node);
        self.get_mut(node)?.parent_id = Some(parent);

        tracing::trace!("inserted {} into {} at {}", node, parent, index);
        Ok(node)
    }

    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<NodeId> {
        self.insert_before(parent, node, None)
    }

    /// Put `node` where `child` is; `child` ends up detached
    pub fn replace_child(&mut self, parent: NodeId, node: NodeId, child: NodeId) -> Result<NodeId> {
        self.validate_replacement(parent, node, child).map_err(|e| {
            tracing::debug!("replace_child({}, {}, {}) rejected: {}", parent, node, child, e);
            e
        })?;

        if node == child {
            return Ok(node);
        }

        self.detach(node)?;
        self.adopt_into_parent_document(parent, node)?;

        let siblings = &mut self.get_mut(parent)?.children_ids;
        match siblings.iter().position(|id| *id == child) {
            Some(index) => siblings[index] = node,
            None => {
                return Err(DomError::NotFound(format!(
                    "node {} is not a child of {}",
                    child, parent
                )))
            }
        }
        self.get_mut(node)?.parent_id = Some(parent);
        self.get_mut(child)?.parent_id = None;
        Ok(node)
    }

    fn validate_replacement(&self, parent: NodeId, node: NodeId, child: NodeId) -> Result<()> {
        self.validate_parent_and_node(parent, node)?;
        if self.get(child)?.parent_id != Some(parent) {
            return Err(DomError::NotFound(format!(
                "node {} is not a child of {}",
                child, parent
            )));
        }
        if self.get(parent)?.is_document() && self.get(node)?.is_element() {
            if let Some(existing) = self.first_child_element(parent)? {
                if existing != child {
                    return Err(DomError::HierarchyViolation(
                        "document already has an element child".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Detach `child` from `parent` and return it
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.get(parent)?;
        if self.get(child)?.parent_id != Some(parent) {
            let e = DomError::NotFound(format!("node {} is not a child of {}", child, parent));
            tracing::debug!("remove_child rejected: {}", e);
            return Err(e);
        }
        self.detach(child)?;
        Ok(child)
    }

    /// Insert `nodes`, in order, before the current first child
    pub fn prepend(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.validate_bulk(parent, nodes, false)?;
        let first = self.first_child(parent)?;
        for &node in nodes {
            match first {
                Some(first) if self.get(first)?.parent_id == Some(parent) => {
                    self.insert_before(parent, node, Some(first))?;
                }
                _ => {
                    self.append_child(parent, node)?;
                }
            }
        }
        Ok(())
    }

    /// Append `nodes` in order
    pub fn append(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.validate_bulk(parent, nodes, false)?;
        for &node in nodes {
            self.append_child(parent, node)?;
        }
        Ok(())
    }

    /// Drop all current children, then append `nodes`
    pub fn replace_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> Result<()> {
        self.validate_bulk(parent, nodes, true)?;
        let old: ChildIds = std::mem::take(&mut self.get_mut(parent)?.children_ids);
        for id in old {
            self.get_mut(id)?.parent_id = None;
        }
        for &node in nodes {
            self.append_child(parent, node)?;
        }
        Ok(())
    }

    /// Copy a node (and with `deep`, its subtree). The copy is detached.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId> {
        let root_clone = self.clone_single(node)?;
        if !deep {
            return Ok(root_clone);
        }

        // (source child, parent clone); children pushed in reverse so each
        // parent receives its copies in document order
        let mut stack: Vec<(NodeId, NodeId)> = self
            .get(node)?
            .children_ids
            .iter()
            .rev()
            .map(|&child| (child, root_clone))
            .collect();
        while let Some((source, parent_clone)) = stack.pop() {
            let copy = self.clone_single(source)?;
            self.append_child(parent_clone, copy)?;
            stack.extend(
                self.get(source)?
                    .children_ids
                    .iter()
                    .rev()
                    .map(|&child| (child, copy)),
            );
        }
        Ok(root_clone)
    }

    fn clone_single(&mut self, node: NodeId) -> Result<NodeId> {
        let source = self.get(node)?;
        let data = source.data.clone();
        let owner = source.owner_document;
        Ok(self.insert_raw(owner, data))
    }
}
