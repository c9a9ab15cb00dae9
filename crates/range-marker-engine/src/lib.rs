//! Range annotation engine.
//!
//! Resolves a selection onto a markup fragment's content tree and toggles
//! status labels (underline, comment markers) on exactly the selected run,
//! splitting and merging wrapper elements so that overlapping labels and
//! repeated removal stay well formed.

pub mod annotate;
pub mod annotator;
pub mod error;
pub mod labels;
pub mod markup;
pub mod model;

// Re-export key types for easier usage
pub use annotate::{Corridor, HostPoint, HostRange};
pub use annotator::{Annotator, Outcome};
pub use error::{AnnotateError, RangeError};
pub use labels::{
    Action, Choice, Direction, LabelCandidate, LabelChooser, LabelSpec, LabelVocabulary,
    StatusClass,
};
pub use markup::{MarkupError, SerializeError, parse_fragment, render, write_markup};
pub use model::{AnnotationOptions, AtomicSet, NodeId, NodePath, Tree};
