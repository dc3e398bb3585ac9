//! Graphics Tree Library
//!
//! DOM-style document tree backing a graphics/plotting engine: documents,
//! elements with typed attributes, comments, a CSS-like selector engine and
//! an XML-ish serializer.
//!
//! ## Core Design
//!
//! ```text
//! NodeArena (Vec<Option<Node>>) ← NodeId (u32) → children: SmallVec<[NodeId; 4]>
//!      ↓                                          parent / owner document: NodeId
//! SelectorList::parse → MatchContext (memo per query) → Vec<NodeId>
//!      ↓
//! DomSerializer → String
//! ```
//!
//! Every node lives in one arena slot. Children are owned through the
//! child id list; parent and owner-document links are plain ids, so there
//! are no reference cycles to break. Released slots are never reused and
//! stale ids surface as `DomError::UnknownNode`.

pub mod arena;
pub mod attributes;
pub mod error;
pub mod mutation;
pub mod query;
pub mod selector;
pub mod serializer;
pub mod types;
pub mod utils;

pub use arena::NodeArena;
pub use attributes::{AttributeStore, AttributeType, AttributeValue};
pub use error::{DomError, Result};
pub use selector::{Selector, SelectorList};
pub use serializer::{DomSerializer, SerializerConfig};
pub use types::*;
