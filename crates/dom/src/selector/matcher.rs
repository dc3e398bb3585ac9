//! Selector evaluation
//!
//! A `MatchContext` lives for a single query. It memoizes every
//! `(element, selector node)` result so the combinator walks do not
//! re-evaluate shared ancestors for each candidate.

use super::{AttributeOperator, NthPattern, Selector, SelectorId, SelectorList};
use crate::arena::NodeArena;
use crate::error::Result;
use crate::types::{ElementData, NodeId};
use crate::utils::{attribute_ignore_case, class_tokens};
use ahash::AHashMap;

pub struct MatchContext<'a> {
    arena: &'a NodeArena,
    selectors: &'a SelectorList,
    memo: AHashMap<(NodeId, SelectorId), bool>,
}

impl<'a> MatchContext<'a> {
    pub fn new(arena: &'a NodeArena, selectors: &'a SelectorList) -> Self {
        Self {
            arena,
            selectors,
            memo: AHashMap::new(),
        }
    }

    /// Does `node_id` match the whole selector list? Non-elements never do.
    pub fn matches(&mut self, node_id: NodeId) -> Result<bool> {
        self.match_selector(self.selectors.root(), node_id)
    }

    /// Number of cached results
    pub fn cached(&self) -> usize {
        self.memo.len()
    }

    fn match_selector(&mut self, selector: SelectorId, node_id: NodeId) -> Result<bool> {
        if let Some(&hit) = self.memo.get(&(node_id, selector)) {
            return Ok(hit);
        }
        let result = self.evaluate(selector, node_id)?;
        self.memo.insert((node_id, selector), result);
        Ok(result)
    }

    fn evaluate(&mut self, selector: SelectorId, node_id: NodeId) -> Result<bool> {
        let arena = self.arena;
        let selectors = self.selectors;

        let Some(element) = arena.get(node_id)?.as_element() else {
            return Ok(false);
        };
        let Some(selector) = selectors.get(selector) else {
            return Ok(false);
        };

        let matched = match selector {
            Selector::Tag(name) => {
                name == "*" || (!name.is_empty() && element.local_name.eq_ignore_ascii_case(name))
            }
            Selector::Id(id) => element.attributes.resolved("id").eq_ignore_ascii_case(id),
            Selector::Class(class) => class_tokens(&element.attributes.resolved("class"))
                .iter()
                .any(|token| token == class),
            Selector::HasAttribute(name) => attribute_ignore_case(&element.attributes, name).is_some(),
            Selector::Attribute {
                name,
                operator,
                value,
            } => match_attribute(element, name, *operator, value),
            Selector::Root => match arena.get(node_id)?.parent_id {
                None => true,
                Some(parent_id) => arena.get(parent_id)?.is_document(),
            },
            Selector::Empty => arena.child_element_count(node_id)? == 0,
            Selector::OnlyChild => {
                arena.previous_element_sibling(node_id)?.is_none()
                    && arena.next_element_sibling(node_id)?.is_none()
            }
            Selector::OnlyOfType => {
                let same_type = self.siblings_of_type(node_id, element)?;
                same_type.len() == 1
            }
            Selector::NthChild(pattern) => {
                let siblings = arena.sibling_elements(node_id)?;
                nth_match(pattern, &siblings, node_id)
            }
            Selector::NthOfType(pattern) => {
                let same_type = self.siblings_of_type(node_id, element)?;
                nth_match(pattern, &same_type, node_id)
            }
            Selector::And(parts) => {
                if parts.is_empty() {
                    return Ok(false);
                }
                for &part in parts {
                    if !self.match_selector(part, node_id)? {
                        return Ok(false);
                    }
                }
                true
            }
            Selector::Or(parts) => {
                for &part in parts {
                    if self.match_selector(part, node_id)? {
                        return Ok(true);
                    }
                }
                false
            }
            Selector::AncestorAndLocal { ancestor, local } => {
                if !self.match_selector(*local, node_id)? {
                    return Ok(false);
                }
                let mut current = arena.parent_element(node_id)?;
                while let Some(candidate) = current {
                    if self.match_selector(*ancestor, candidate)? {
                        return Ok(true);
                    }
                    current = arena.parent_element(candidate)?;
                }
                false
            }
            Selector::ParentAndLocal { parent, local } => match arena.parent_element(node_id)? {
                Some(parent_id) => {
                    self.match_selector(*parent, parent_id)?
                        && self.match_selector(*local, node_id)?
                }
                None => false,
            },
            Selector::PreviousSiblingAndLocal { sibling, local } => {
                if !self.match_selector(*local, node_id)? {
                    return Ok(false);
                }
                let mut current = arena.previous_element_sibling(node_id)?;
                while let Some(candidate) = current {
                    if self.match_selector(*sibling, candidate)? {
                        return Ok(true);
                    }
                    current = arena.previous_element_sibling(candidate)?;
                }
                false
            }
            Selector::False => false,
        };
        Ok(matched)
    }

    /// Element siblings (including `node_id`) sharing its local name
    fn siblings_of_type(&self, node_id: NodeId, element: &ElementData) -> Result<Vec<NodeId>> {
        let mut same_type = Vec::new();
        for sibling in self.arena.sibling_elements(node_id)? {
            if self
                .arena
                .local_name(sibling)?
                .eq_ignore_ascii_case(&element.local_name)
            {
                same_type.push(sibling);
            }
        }
        Ok(same_type)
    }
}

/// 1-based position of `node_id` in `siblings`, checked against `pattern`
fn nth_match(pattern: &NthPattern, siblings: &[NodeId], node_id: NodeId) -> bool {
    let Some(position) = siblings.iter().position(|&id| id == node_id) else {
        return false;
    };
    let index = if pattern.reverse {
        (siblings.len() - position) as i64
    } else {
        position as i64 + 1
    };
    pattern.matches_index(index)
}

fn match_attribute(element: &ElementData, name: &str, operator: AttributeOperator, value: &str) -> bool {
    let Some(actual) = attribute_ignore_case(&element.attributes, name) else {
        return false;
    };
    let actual = actual.to_string();
    match operator {
        AttributeOperator::Equals => actual == value,
        AttributeOperator::StartsWith => !value.is_empty() && actual.starts_with(value),
        AttributeOperator::EndsWith => !value.is_empty() && actual.ends_with(value),
        AttributeOperator::Contains => !value.is_empty() && actual.contains(value),
        AttributeOperator::ContainsWord => actual.split_ascii_whitespace().any(|word| word == value),
        AttributeOperator::ContainsPrefix => actual.split_ascii_whitespace().any(|word| {
            word == value
                || word
                    .strip_prefix(value)
                    .is_some_and(|rest| rest.starts_with('-'))
        }),
    }
}
