//! CSS-style selectors
//!
//! A parsed selector is a small arena of predicate nodes addressed by
//! `SelectorId`. The id doubles as the identity used by the match cache, so
//! a sub-selector shared by many candidates is evaluated once per element.
//!
//! ```text
//! "root > a:first-child, #last"
//!
//!                 Or
//!               /    \
//!     ParentAndLocal  Id("last")
//!       /        \
//!  Tag(root)     And
//!               /    \
//!          Tag(a)   NthChild(1)
//! ```

pub mod matcher;
pub mod parser;

pub use matcher::MatchContext;

/// Index of a predicate node inside its `SelectorList`
pub type SelectorId = u32;

/// Attribute comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeOperator {
    /// `[attr=value]`
    Equals,
    /// `[attr^=value]`
    StartsWith,
    /// `[attr$=value]`
    EndsWith,
    /// `[attr*=value]`
    Contains,
    /// `[attr~=value]` - whitespace-separated word
    ContainsWord,
    /// `[attr|=value]` - word equal to value or starting with `value-`
    ContainsPrefix,
}

/// `an+b` position pattern of the `nth-*` pseudo-classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NthPattern {
    pub factor: i64,
    pub offset: i64,
    /// Count from the last sibling instead of the first
    pub reverse: bool,
}

impl NthPattern {
    pub fn new(factor: i64, offset: i64, reverse: bool) -> Self {
        Self {
            factor,
            offset,
            reverse,
        }
    }

    /// Whether the 1-based `index` is selected.
    ///
    /// Positive factors select `index % factor == offset`, negative factors
    /// the first `offset` positions, and a zero factor exactly `offset`.
    pub fn matches_index(&self, index: i64) -> bool {
        match self.factor {
            0 => index == self.offset,
            f if f > 0 => index % f == self.offset,
            _ => index <= self.offset,
        }
    }

    /// True when every position is selected (`n`, `n+0`)
    pub fn matches_all(&self) -> bool {
        self.factor == 1 && self.offset == 0
    }
}

/// A predicate node
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Local name, or `*`
    Tag(String),
    Id(String),
    Class(String),
    HasAttribute(String),
    Attribute {
        name: String,
        operator: AttributeOperator,
        value: String,
    },
    Root,
    Empty,
    OnlyChild,
    OnlyOfType,
    NthChild(NthPattern),
    NthOfType(NthPattern),
    /// All parts match (empty never matches)
    And(Vec<SelectorId>),
    /// Any part matches (empty never matches)
    Or(Vec<SelectorId>),
    AncestorAndLocal {
        ancestor: SelectorId,
        local: SelectorId,
    },
    ParentAndLocal {
        parent: SelectorId,
        local: SelectorId,
    },
    PreviousSiblingAndLocal {
        sibling: SelectorId,
        local: SelectorId,
    },
    /// Stand-in for unsupported or malformed syntax
    False,
}

/// A parsed selector string
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    nodes: Vec<Selector>,
    root: SelectorId,
}

impl SelectorList {
    /// Parse a selector string. Never fails: anything unsupported turns into
    /// a predicate that matches nothing.
    pub fn parse(selectors: &str) -> Self {
        parser::parse(selectors)
    }

    pub(crate) fn from_parts(nodes: Vec<Selector>, root: SelectorId) -> Self {
        Self { nodes, root }
    }

    /// The top-level `Or` node
    pub fn root(&self) -> SelectorId {
        self.root
    }

    pub fn get(&self, id: SelectorId) -> Option<&Selector> {
        self.nodes.get(id as usize)
    }

    /// Number of predicate nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the comma-separated groups
    pub fn groups(&self) -> &[SelectorId] {
        match self.get(self.root) {
            Some(Selector::Or(groups)) => groups,
            _ => &[],
        }
    }
}
