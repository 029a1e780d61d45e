//! Directive matcher - decides whether a line carries a directive
//!
//! Matching is substring based, not syntax aware. A directive mentioned in an
//! unrelated string still counts as present, and only a marker in the very
//! first column marks a line as disabled. Idempotence of the rule sets built
//! on top of this depends on these exact semantics.

use serde::{Deserialize, Serialize};

/// Comment marker used by httpd configuration files
pub const DEFAULT_MARKER: char = '#';

/// How a line is tested against a directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Line contains the text anywhere
    Contains(String),
    /// Line starts with the text
    Prefix(String),
}

impl Matcher {
    /// The text this matcher looks for
    pub fn target(&self) -> &str {
        match self {
            Self::Contains(t) | Self::Prefix(t) => t,
        }
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Self::Contains(t) => text.contains(t.as_str()),
            Self::Prefix(t) => text.starts_with(t.as_str()),
        }
    }

    /// True if `line` carries the directive and is not disabled.
    pub fn is_present(&self, line: &str, marker: char) -> bool {
        !line.starts_with(marker) && self.matches(line)
    }

    /// True if `line` carries the directive but starts with the marker.
    pub fn is_commented(&self, line: &str, marker: char) -> bool {
        match self {
            Self::Contains(_) => line.starts_with(marker) && self.matches(line),
            Self::Prefix(_) => line
                .strip_prefix(marker)
                .is_some_and(|rest| self.matches(rest)),
        }
    }
}

/// Strip exactly one leading marker from `line`.
///
/// Lines without a leading marker are returned unchanged.
pub fn uncomment(line: &str, marker: char) -> String {
    line.strip_prefix(marker).unwrap_or(line).to_string()
}

/// Where an activation is inserted when the directive is missing entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Before the first line (load order matters, e.g. `LoadModule`)
    Start,
    /// After the last line
    #[default]
    End,
}

/// One directive that must be active in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveRule {
    /// Short name used in logs and plans
    pub name: String,
    /// Predicate recognising the directive
    pub matcher: Matcher,
    /// Literal lines inserted when the directive is absent
    pub activation: Vec<String>,
    /// Insertion point for the activation
    #[serde(default)]
    pub placement: Placement,
    /// Leading character marking a disabled line
    #[serde(default = "default_marker")]
    pub marker: char,
}

fn default_marker() -> char {
    DEFAULT_MARKER
}

impl DirectiveRule {
    /// Rule whose activation is the single line `line`, matched by substring.
    pub fn line(name: impl Into<String>, line: impl Into<String>) -> Self {
        let line = line.into();
        Self {
            name: name.into(),
            matcher: Matcher::Contains(line.clone()),
            activation: vec![line],
            placement: Placement::End,
            marker: DEFAULT_MARKER,
        }
    }

    /// Rule matched by `target` that inserts `activation` when missing.
    pub fn new<I, S>(name: impl Into<String>, matcher: Matcher, activation: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            matcher,
            activation: activation.into_iter().map(Into::into).collect(),
            placement: Placement::End,
            marker: DEFAULT_MARKER,
        }
    }

    /// Set the insertion point
    pub fn placed(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the comment marker
    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Check a single line for an active directive
    pub fn is_present(&self, line: &str) -> bool {
        self.matcher.is_present(line, self.marker)
    }

    /// Check a single line for a disabled directive
    pub fn is_commented(&self, line: &str) -> bool {
        self.matcher.is_commented(line, self.marker)
    }

    /// Enable a disabled line
    pub fn uncomment(&self, line: &str) -> String {
        uncomment(line, self.marker)
    }
}
