//! Caller-owned entry point tying the pipeline stages into one annotation cycle.

use crate::annotate::{
    Corridor, HostRange, apply_status, corridor_labels, covered_text, has_status, locate,
    normalize, remove_status, strip_everywhere,
};
use crate::error::{AnnotateError, RangeError};
use crate::labels::{
    Action, Choice, Direction, LabelCandidate, LabelChooser, LabelVocabulary, StatusClass,
};
use crate::markup::{parse_fragment, render};
use crate::model::{AnnotationOptions, Tree};

/// Result of one annotation cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Rendered markup to write back over the original fragment.
    Updated(String),
    /// Nothing to write: invalid selection, cancelled choice or no leaf changed.
    Unchanged,
}

impl Outcome {
    pub fn markup(&self) -> Option<&str> {
        match self {
            Outcome::Updated(markup) => Some(markup),
            Outcome::Unchanged => None,
        }
    }
}

/// Runs annotation cycles with a fixed configuration.
///
/// Each cycle parses its own tree and drops it after rendering; the annotator
/// holds nothing but read-only configuration, so one instance can serve any
/// number of documents.
#[derive(Debug, Clone, Default)]
pub struct Annotator {
    options: AnnotationOptions,
    labels: LabelVocabulary,
}

impl Annotator {
    pub fn new(options: AnnotationOptions, labels: LabelVocabulary) -> Self {
        Self { options, labels }
    }

    pub fn options(&self) -> &AnnotationOptions {
        &self.options
    }

    pub fn labels(&self) -> &LabelVocabulary {
        &self.labels
    }

    pub fn parse(&self, markup: &str) -> Result<Tree, AnnotateError> {
        Ok(parse_fragment(markup)?)
    }

    pub fn locate(&self, tree: &mut Tree, range: &HostRange) -> Result<Corridor, RangeError> {
        locate(tree, range, &self.options)
    }

    pub fn has_status(
        &self,
        tree: &Tree,
        corridor: &Corridor,
        label: &StatusClass,
    ) -> Result<bool, AnnotateError> {
        has_status(tree, corridor, label.as_str(), &self.options)
    }

    /// Vocabulary labels, then comment labels already present on the corridor,
    /// each with whether it already covers the corridor.
    pub fn candidates(
        &self,
        tree: &Tree,
        corridor: &Corridor,
    ) -> Result<Vec<LabelCandidate>, AnnotateError> {
        let mut candidates = Vec::new();
        for spec in self.labels.labels() {
            candidates.push(LabelCandidate {
                label: spec.class.clone(),
                title: spec.title.clone(),
                already_applied: self.has_status(tree, corridor, &spec.class)?,
            });
        }
        for class in corridor_labels(tree, corridor, &self.options)?.iter() {
            if self.labels.get(class).is_some() || !self.labels.is_comment_label(class) {
                continue;
            }
            let label = StatusClass::new(class);
            candidates.push(LabelCandidate {
                title: format!("Comment: {}", covered_text(tree, class, &self.options)),
                already_applied: self.has_status(tree, corridor, &label)?,
                label,
            });
        }
        Ok(candidates)
    }

    /// Apply or remove a label over a located corridor, then normalize.
    /// Returns the number of leaves that changed.
    pub fn perform(
        &self,
        tree: &mut Tree,
        corridor: &Corridor,
        action: &Action,
    ) -> Result<usize, AnnotateError> {
        let label = action.label.as_str();
        let changed = match action.direction {
            Direction::Apply => apply_status(tree, corridor, label, &self.options)?,
            Direction::Remove => remove_status(tree, corridor, label, &self.options)?,
        };
        normalize(tree, &self.options);
        Ok(changed)
    }

    /// Drop boundary marks after a cancelled choice.
    pub fn cancel(&self, tree: &mut Tree) {
        tree.clear_marks();
    }

    /// One full cycle: parse, locate, act, normalize, render.
    ///
    /// An invalid selection is not an error: it leaves the document untouched
    /// and yields [`Outcome::Unchanged`].
    pub fn run(
        &self,
        markup: &str,
        range: &HostRange,
        action: &Action,
    ) -> Result<Outcome, AnnotateError> {
        let mut tree = self.parse(markup)?;
        let Some(corridor) = self.locate_or_abort(&mut tree, range) else {
            return Ok(Outcome::Unchanged);
        };
        self.finish(&mut tree, &corridor, action)
    }

    /// Like [`Annotator::run`], with the label picked by `chooser` from the
    /// current candidates.
    pub fn run_with_chooser<C: LabelChooser + ?Sized>(
        &self,
        markup: &str,
        range: &HostRange,
        chooser: &mut C,
    ) -> Result<Outcome, AnnotateError> {
        let mut tree = self.parse(markup)?;
        let Some(corridor) = self.locate_or_abort(&mut tree, range) else {
            return Ok(Outcome::Unchanged);
        };
        let candidates = self.candidates(&tree, &corridor)?;
        match chooser.choose(&candidates) {
            Choice::Chosen(action) => self.finish(&mut tree, &corridor, &action),
            Choice::Cancelled => {
                log::debug!("label choice cancelled");
                self.cancel(&mut tree);
                Ok(Outcome::Unchanged)
            }
        }
    }

    /// Remove `label` from the whole fragment.
    pub fn strip(&self, markup: &str, label: &StatusClass) -> Result<Outcome, AnnotateError> {
        let mut tree = self.parse(markup)?;
        if strip_everywhere(&mut tree, label.as_str(), &self.options) == 0 {
            return Ok(Outcome::Unchanged);
        }
        normalize(&mut tree, &self.options);
        Ok(Outcome::Updated(render(&tree)))
    }

    /// Text currently carrying `label`, e.g. the title of a comment.
    pub fn covered_text(&self, tree: &Tree, label: &StatusClass) -> String {
        covered_text(tree, label.as_str(), &self.options)
    }

    fn locate_or_abort(&self, tree: &mut Tree, range: &HostRange) -> Option<Corridor> {
        match self.locate(tree, range) {
            Ok(corridor) => Some(corridor),
            Err(err) => {
                log::debug!("selection ignored: {err}");
                None
            }
        }
    }

    fn finish(
        &self,
        tree: &mut Tree,
        corridor: &Corridor,
        action: &Action,
    ) -> Result<Outcome, AnnotateError> {
        if self.perform(tree, corridor, action)? == 0 {
            return Ok(Outcome::Unchanged);
        }
        Ok(Outcome::Updated(render(tree)))
    }
}
