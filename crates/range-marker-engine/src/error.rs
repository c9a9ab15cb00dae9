use crate::markup::{MarkupError, SerializeError};
use crate::model::{NodeId, NodePath};

/// A host selection that cannot be mapped onto the tree. Callers recover from
/// it by leaving the document untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("selection is collapsed")]
    Collapsed,
    #[error("endpoint {path} is outside the fragment")]
    OutsideRoot { path: NodePath },
    #[error("offset {offset} is past the end of {path} (length {len})")]
    OffsetOutOfBounds {
        path: NodePath,
        offset: usize,
        len: usize,
    },
    #[error("selection ends before it starts")]
    Reversed,
    #[error("no content {side} the boundary in {path}")]
    NoNeighbour { path: NodePath, side: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("invalid range: {0}")]
    InvalidRange(#[from] RangeError),
    /// The tree holds a node the engine has no rule for. Indicates a malformed
    /// tree rather than bad input.
    #[error("unexpected {kind} node {node} in the annotation corridor")]
    UnexpectedNodeKind { node: NodeId, kind: &'static str },
    #[error("failed to parse markup: {0}")]
    Parse(#[from] MarkupError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}
