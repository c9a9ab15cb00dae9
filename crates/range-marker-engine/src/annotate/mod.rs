//! The annotation pipeline, one stage per module:
//!
//! 1. [`locate`] resolves a [`HostRange`] and marks the corridor boundaries
//! 2. [`has_status`] answers whether a label already covers the corridor
//! 3. [`apply_status`] / [`remove_status`] add or strip a label across it
//! 4. [`normalize`] merges fragments, clears marks and escapes text
//!
//! [`corridor`] and [`fragment`] hold the walk and the splitting primitives the
//! mutating stages share.

pub mod apply;
pub mod corridor;
pub mod fragment;
pub mod locate;
pub mod normalize;
pub mod query;
pub mod remove;

pub use apply::apply_status;
pub use corridor::{CorridorLeaf, LeafRole, Selection};
pub use locate::{Corridor, HostPoint, HostRange, locate};
pub use normalize::normalize;
pub use query::{corridor_labels, covered_text, has_status};
pub use remove::{remove_status, strip_everywhere};
