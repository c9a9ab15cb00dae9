use std::collections::BTreeMap;
use std::fmt;

/// Handle to a node stored in a [`Tree`](super::Tree) arena.
///
/// Handles are only meaningful for the tree that issued them and stay valid for
/// that tree's lifetime, even after the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transient corridor marker placed by the locator and cleared by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMark {
    #[default]
    None,
    Start,
    End,
    Both,
}

impl BoundaryMark {
    /// Combine two marks landing on the same node.
    pub fn merge(self, other: BoundaryMark) -> BoundaryMark {
        use BoundaryMark::*;
        match (self, other) {
            (None, m) | (m, None) => m,
            (Start, Start) => Start,
            (End, End) => End,
            _ => Both,
        }
    }

    pub fn opens_corridor(self) -> bool {
        matches!(self, BoundaryMark::Start | BoundaryMark::Both)
    }

    pub fn closes_corridor(self) -> bool {
        matches!(self, BoundaryMark::End | BoundaryMark::Both)
    }
}

/// Ordered, duplicate-free list of class names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a whitespace separated `class` attribute value, dropping repeats.
    pub fn parse(value: &str) -> Self {
        let mut list = Self::new();
        for class in value.split_whitespace() {
            list.push(class);
        }
        list
    }

    pub fn contains(&self, class: &str) -> bool {
        self.0.iter().any(|c| c == class)
    }

    /// Append `class` unless already present. Returns whether it was added.
    pub fn push(&mut self, class: &str) -> bool {
        if self.contains(class) {
            return false;
        }
        self.0.push(class.to_string());
        true
    }

    /// Remove `class` if present. Returns whether it was removed.
    pub fn remove(&mut self, class: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != class);
        self.0.len() != before
    }

    /// Set equality, ignoring order.
    pub fn same_set(&self, other: &ClassList) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|c| other.contains(c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

impl<S: AsRef<str>> FromIterator<S> for ClassList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for class in iter {
            list.push(class.as_ref());
        }
        list
    }
}

/// Element payload: tag, classes and the remaining attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: ClassList,
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            classes: ClassList::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_classes(mut self, classes: ClassList) -> Self {
        self.classes = classes;
        self
    }

    /// Same tag, same class set and same other attributes.
    pub fn same_shape(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.classes.same_set(&other.classes)
            && self.attributes == other.attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Synthetic root holding the top-level nodes of a parsed fragment.
    Fragment,
    /// Text leaf. `escaped` flips once the normalizer has escaped `content`.
    Text { content: String, escaped: bool },
    Element(Element),
    Comment(String),
}

impl NodeKind {
    pub fn text(content: impl Into<String>) -> Self {
        NodeKind::Text {
            content: content.into(),
            escaped: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Fragment => "fragment",
            NodeKind::Text { .. } => "text",
            NodeKind::Element(_) => "element",
            NodeKind::Comment(_) => "comment",
        }
    }
}

/// Arena slot: payload plus the structural bookkeeping the engine keeps in sync.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) sibling_index: usize,
    pub(crate) mark: BoundaryMark,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            sibling_index: 0,
            mark: BoundaryMark::None,
        }
    }
}

/// Character-based slice of `s`. Out-of-range bounds are clamped.
pub fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |chars: usize| {
        s.char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end.max(start));
    &s[start_byte..end_byte]
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}
