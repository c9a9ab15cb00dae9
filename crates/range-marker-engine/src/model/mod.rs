//! Content tree model shared by every annotation stage.
//!
//! The tree is an arena of [`NodeData`](node::NodeData) slots addressed by
//! [`NodeId`]. Parent links and sibling indices live beside the child lists and
//! are recomputed on every splice, so no walk ever sees a stale index.

pub mod node;
pub mod options;
pub mod outline;
pub mod path;
pub mod tree;

pub use node::{BoundaryMark, ClassList, Element, NodeId, NodeKind, char_len, char_slice};
pub use options::{AnnotationOptions, AtomicSet};
pub use outline::outline;
pub use path::{NodePath, NodePathError};
pub use tree::{Ancestors, Tree};
