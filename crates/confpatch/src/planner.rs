//! Patch planner - computes the minimal edits that activate a rule set

use crate::directive::{DirectiveRule, Placement};
use crate::document::ConfigDocument;
use std::fmt;

/// A single line-level action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Insert lines before the first line
    InsertAtStart(Vec<String>),
    /// Insert lines after the last line
    InsertAtEnd(Vec<String>),
    /// Replace a disabled line with its enabled form
    Uncomment {
        /// Line index at the time the edit is applied
        index: usize,
        /// Line as found
        before: String,
        /// Line with the marker removed
        after: String,
    },
}

impl Edit {
    fn apply_to(&self, doc: &mut ConfigDocument) {
        match self {
            Self::InsertAtStart(lines) => doc.prepend(lines),
            Self::InsertAtEnd(lines) => doc.append(lines),
            Self::Uncomment { index, after, .. } => doc.replace(*index, after.clone()),
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertAtStart(lines) => write!(f, "insert at start: {}", lines.join(" / ")),
            Self::InsertAtEnd(lines) => write!(f, "insert at end: {}", lines.join(" / ")),
            Self::Uncomment { index, after, .. } => {
                write!(f, "uncomment line {}: {}", index + 1, after)
            }
        }
    }
}

/// An edit together with the rule that asked for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEdit {
    /// Name of the rule
    pub rule: String,
    /// The edit to make
    pub edit: Edit,
}

/// Ordered edits needed to bring a document to the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchPlan {
    /// Edits in application order
    pub edits: Vec<PlannedEdit>,
    /// Rules that needed no edit
    pub satisfied: Vec<String>,
}

impl PatchPlan {
    /// True when the document already satisfies every rule
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of edits
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Replay the edits, in order, onto `doc`.
    pub fn apply_to(&self, doc: &mut ConfigDocument) {
        for planned in &self.edits {
            planned.edit.apply_to(doc);
        }
    }
}

/// Plan the edits that make every rule in `rules` active in `doc`.
///
/// Rules are evaluated in declaration order against a working copy that
/// already reflects the edits of earlier rules.
pub fn plan(doc: &ConfigDocument, rules: &[DirectiveRule]) -> PatchPlan {
    let mut working = doc.clone();
    let mut plan = PatchPlan::default();

    for rule in rules {
        match plan_rule(&working, rule) {
            Some(edit) => {
                log::debug!("{}: {}", rule.name, edit);
                edit.apply_to(&mut working);
                plan.edits.push(PlannedEdit {
                    rule: rule.name.clone(),
                    edit,
                });
            }
            None => {
                log::debug!("{}: already active", rule.name);
                plan.satisfied.push(rule.name.clone());
            }
        }
    }

    plan
}

/// Single scan over the lines: present wins, else the first disabled line,
/// else an insertion.
fn plan_rule(doc: &ConfigDocument, rule: &DirectiveRule) -> Option<Edit> {
    let mut first_commented = None;

    for (index, line) in doc.lines().iter().enumerate() {
        if rule.is_present(line) {
            return None;
        }
        if first_commented.is_none() && rule.is_commented(line) {
            first_commented = Some(index);
        }
    }

    if let Some(index) = first_commented {
        let before = doc.lines()[index].clone();
        let after = rule.uncomment(&before);
        return Some(Edit::Uncomment {
            index,
            before,
            after,
        });
    }

    let lines = rule.activation.clone();
    Some(match rule.placement {
        Placement::Start => Edit::InsertAtStart(lines),
        Placement::End => Edit::InsertAtEnd(lines),
    })
}
