//! Tree queries: class-name lookup and selector matching
//!
//! Selector queries visit the starting node itself and then its descendants
//! in document order. Each call builds a fresh `MatchContext`, so the match
//! cache never outlives a query.

use crate::arena::NodeArena;
use crate::error::Result;
use crate::selector::{MatchContext, SelectorList};
use crate::types::NodeId;
use crate::utils::class_tokens;

impl NodeArena {
    /// Descendant elements (excluding `node_id`) carrying every class in
    /// `class_names`. Class comparison is ASCII case-insensitive.
    pub fn get_elements_by_class_name(
        &self,
        node_id: NodeId,
        class_names: &str,
    ) -> Result<Vec<NodeId>> {
        let wanted = class_tokens(class_names);
        if wanted.is_empty() {
            self.get(node_id)?;
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for id in self.descendants(node_id)? {
            let Some(element) = self.get(id)?.as_element() else {
                continue;
            };
            let classes = class_tokens(&element.attributes.resolved("class"));
            if wanted.iter().all(|name| classes.contains(name)) {
                found.push(id);
            }
        }
        tracing::trace!(
            "get_elements_by_class_name({:?}) under {}: {} hits",
            class_names,
            node_id,
            found.len()
        );
        Ok(found)
    }

    /// First match in document order, starting with `root` itself
    pub fn query_selector(&self, root: NodeId, selectors: &str) -> Result<Option<NodeId>> {
        self.query_selector_with(root, &SelectorList::parse(selectors))
    }

    /// Every match in document order, starting with `root` itself
    pub fn query_selector_all(&self, root: NodeId, selectors: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_with(root, &SelectorList::parse(selectors))
    }

    /// `query_selector` with an already parsed list
    pub fn query_selector_with(
        &self,
        root: NodeId,
        selectors: &SelectorList,
    ) -> Result<Option<NodeId>> {
        let mut context = MatchContext::new(self, selectors);
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            if context.matches(node_id)? {
                tracing::trace!("query_selector from {}: found {}", root, node_id);
                return Ok(Some(node_id));
            }
            stack.extend(self.get(node_id)?.child_nodes().iter().rev().copied());
        }
        Ok(None)
    }

    /// `query_selector_all` with an already parsed list
    pub fn query_selector_all_with(
        &self,
        root: NodeId,
        selectors: &SelectorList,
    ) -> Result<Vec<NodeId>> {
        let mut context = MatchContext::new(self, selectors);
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node_id) = stack.pop() {
            if context.matches(node_id)? {
                found.push(node_id);
            }
            stack.extend(self.get(node_id)?.child_nodes().iter().rev().copied());
        }
        tracing::trace!(
            "query_selector_all from {}: {} hits, {} cached results",
            root,
            found.len(),
            context.cached()
        );
        Ok(found)
    }

    /// Test a single node against a parsed selector list
    pub fn matches(&self, node_id: NodeId, selectors: &SelectorList) -> Result<bool> {
        MatchContext::new(self, selectors).matches(node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `<root><a class="foo"/><b/><a id="last"/></root>`
    fn sample() -> (NodeArena, NodeId, NodeId, [NodeId; 3]) {
        let mut arena = NodeArena::new();
        let doc = arena.create_document();
        let root = arena.create_element(doc, "root").unwrap();
        arena.append_child(doc, root).unwrap();
        let a1 = arena.create_element(doc, "a").unwrap();
        arena.set_attribute(a1, "class", "foo").unwrap();
        let b = arena.create_element(doc, "b").unwrap();
        let a2 = arena.create_element(doc, "a").unwrap();
        arena.set_attribute(a2, "id", "last").unwrap();
        arena.append(root, &[a1, b, a2]).unwrap();
        (arena, doc, root, [a1, b, a2])
    }

    #[test]
    fn test_query_selector_all_document_order() {
        let (arena, doc, root, [a1, b, a2]) = sample();
        assert_eq!(arena.query_selector_all(root, "a").unwrap(), vec![a1, a2]);
        assert_eq!(arena.query_selector_all(doc, "a, b").unwrap(), vec![a1, b, a2]);
        assert_eq!(arena.query_selector(root, "a:last-child").unwrap(), Some(a2));
        assert_eq!(arena.query_selector(root, "#LAST").unwrap(), Some(a2));
        assert_eq!(arena.query_selector(root, "b ~ .foo").unwrap(), None);
    }

    #[test]
    fn test_query_includes_root() {
        let (arena, doc, root, _) = sample();
        assert_eq!(arena.query_selector(root, "root").unwrap(), Some(root));
        assert_eq!(arena.query_selector(doc, "*").unwrap(), Some(root));
        assert_eq!(arena.query_selector_all(root, "*").unwrap().len(), 4);
    }

    #[test]
    fn test_unmatchable_selectors() {
        let (arena, _doc, root, _) = sample();
        assert!(arena.query_selector_all(root, "[=x]").unwrap().is_empty());
        assert!(arena.query_selector_all(root, "").unwrap().is_empty());
        assert_eq!(arena.query_selector(root, "a:hover").unwrap(), None);
    }

    #[test]
    fn test_elements_by_class_name() {
        let (mut arena, doc, root, [a1, b, _]) = sample();
        arena.set_attribute(b, "class", "Foo bar").unwrap();

        assert_eq!(arena.get_elements_by_class_name(root, "foo").unwrap(), vec![a1, b]);
        assert_eq!(arena.get_elements_by_class_name(doc, "BAR foo").unwrap(), vec![b]);
        assert!(arena.get_elements_by_class_name(root, "   ").unwrap().is_empty());
        // self is never included
        assert!(arena.get_elements_by_class_name(a1, "foo").unwrap().is_empty());
    }

    #[test]
    fn test_matches_with_parsed_list() {
        let (arena, _doc, root, [a1, b, a2]) = sample();
        let list = SelectorList::parse("root > a");
        assert!(arena.matches(a1, &list).unwrap());
        assert!(!arena.matches(b, &list).unwrap());
        assert_eq!(arena.query_selector_all_with(root, &list).unwrap(), vec![a1, a2]);
    }
}
