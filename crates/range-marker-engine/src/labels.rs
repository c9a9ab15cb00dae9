//! Status labels and the choice step between locating and mutating.

use std::fmt;

use serde::Serialize;
use uuid::Uuid;

/// Class name identifying a status annotation, e.g. `rtm-underline`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StatusClass(String);

impl StatusClass {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatusClass {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for StatusClass {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for StatusClass {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A label the user can pick, with its display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSpec {
    pub class: StatusClass,
    pub title: String,
}

impl LabelSpec {
    pub fn new(class: impl Into<StatusClass>, title: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            title: title.into(),
        }
    }
}

/// Known labels plus the prefix every engine-generated class starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    prefix: String,
    labels: Vec<LabelSpec>,
}

impl LabelVocabulary {
    pub const DEFAULT_PREFIX: &'static str = "rtm-";

    /// Empty vocabulary with the given class prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            labels: Vec::new(),
        }
    }

    /// Add a label; a class already present keeps its first title.
    pub fn with_label(mut self, label: LabelSpec) -> Self {
        if self.get(label.class.as_str()).is_none() {
            self.labels.push(label);
        }
        self
    }

    pub fn labels(&self) -> &[LabelSpec] {
        &self.labels
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, class: &str) -> Option<&LabelSpec> {
        self.labels.iter().find(|l| l.class.as_str() == class)
    }

    /// The underline label for this prefix.
    pub fn underline(&self) -> StatusClass {
        StatusClass::new(format!("{}underline", self.prefix))
    }

    /// A fresh comment label, `<prefix>mark-<uuid>`.
    pub fn new_comment_label(&self) -> StatusClass {
        StatusClass::new(format!("{}mark-{}", self.prefix, Uuid::new_v4()))
    }

    pub fn is_comment_label(&self, class: &str) -> bool {
        class
            .strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.starts_with("mark-"))
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        let vocabulary = Self::new(Self::DEFAULT_PREFIX);
        let underline = vocabulary.underline();
        vocabulary.with_label(LabelSpec::new(underline, "Underline"))
    }
}

/// One row of the list offered to the label-choice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCandidate {
    pub label: StatusClass,
    pub title: String,
    pub already_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Apply,
    Remove,
}

/// What to do with a label over the located corridor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub label: StatusClass,
    pub direction: Direction,
}

impl Action {
    pub fn apply(label: impl Into<StatusClass>) -> Self {
        Self {
            label: label.into(),
            direction: Direction::Apply,
        }
    }

    pub fn remove(label: impl Into<StatusClass>) -> Self {
        Self {
            label: label.into(),
            direction: Direction::Remove,
        }
    }

    /// Remove a candidate that is already applied, apply it otherwise.
    pub fn toggle(candidate: &LabelCandidate) -> Self {
        if candidate.already_applied {
            Self::remove(candidate.label.clone())
        } else {
            Self::apply(candidate.label.clone())
        }
    }
}

/// Outcome of the label-choice step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Chosen(Action),
    /// Dismissed; the document stays as it was.
    Cancelled,
}

/// The label-choice collaborator: shown the candidates, picks one or cancels.
pub trait LabelChooser {
    fn choose(&mut self, candidates: &[LabelCandidate]) -> Choice;
}

impl<F> LabelChooser for F
where
    F: FnMut(&[LabelCandidate]) -> Choice,
{
    fn choose(&mut self, candidates: &[LabelCandidate]) -> Choice {
        self(candidates)
    }
}
