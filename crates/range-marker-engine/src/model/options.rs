use std::collections::BTreeSet;

use super::node::Element;

/// Tags and classes whose elements are indivisible leaves for every walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomicSet {
    tags: BTreeSet<String>,
    classes: BTreeSet<String>,
}

impl AtomicSet {
    pub fn new<T, C>(tags: T, classes: C) -> Self
    where
        T: IntoIterator,
        T::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|t| t.into().to_ascii_lowercase())
                .collect(),
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.tags.contains(&element.tag) || element.classes.iter().any(|c| self.classes.contains(c))
    }
}

/// Structural configuration shared by every stage of an annotation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOptions {
    pub atomic: AtomicSet,
    /// Tag used for wrapper elements that carry status labels.
    pub wrapper_tag: String,
}

impl AnnotationOptions {
    pub const DEFAULT_WRAPPER_TAG: &'static str = "span";

    pub fn new(atomic: AtomicSet, wrapper_tag: impl Into<String>) -> Self {
        Self {
            atomic,
            wrapper_tag: wrapper_tag.into().to_ascii_lowercase(),
        }
    }
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self::new(
            AtomicSet::new(["img"], ["ql-formula"]),
            Self::DEFAULT_WRAPPER_TAG,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassList;

    #[test]
    fn atomic_by_tag_or_class() {
        let set = AtomicSet::new(["IMG"], ["ql-formula"]);
        assert!(set.matches(&Element::new("img")));
        assert!(set.matches(&Element::new("span").with_classes(ClassList::parse("x ql-formula"))));
        assert!(!set.matches(&Element::new("span")));
    }
}
