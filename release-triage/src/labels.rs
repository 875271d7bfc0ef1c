//! Recognized issue labels.
//!
//! The tracker only knows label names. Everything inside the engine works with
//! [`Label`] values; [`LabelNames`] maps them to and from the names used by a
//! particular ecosystem's tracker.

use serde::Deserialize;
use std::collections::BTreeSet;

/// A label that drives triage behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// A human has configured the readme and asks for another attempt.
    Configured,
    /// The release pipeline has been triggered and the result awaits a check.
    AutoAskCheck,
    /// The generated version was 0.0.0; the base branch needs review.
    BaseBranchAttention,
    /// The issue has been warned about inactivity.
    SevenDayAttention,
    /// The package is a multi-API package.
    MultiApi,
    /// The release is on schedule.
    OnTime,
    /// The release is on hold.
    HoldOn,
    /// The issue was closed because the release was published.
    AutoClosed,
}

impl Label {
    /// Every recognized label.
    pub const ALL: [Label; 8] = [
        Label::Configured,
        Label::AutoAskCheck,
        Label::BaseBranchAttention,
        Label::SevenDayAttention,
        Label::MultiApi,
        Label::OnTime,
        Label::HoldOn,
        Label::AutoClosed,
    ];
}

/// Tracker names for each recognized label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LabelNames {
    pub configured: String,
    pub auto_ask_check: String,
    pub base_branch_attention: String,
    pub seven_day_attention: String,
    pub multi_api: String,
    pub on_time: String,
    pub hold_on: String,
    pub auto_closed: String,
}

impl Default for LabelNames {
    fn default() -> Self {
        Self {
            configured: "Configured".to_string(),
            auto_ask_check: "auto-ask-check".to_string(),
            base_branch_attention: "base-branch-attention".to_string(),
            seven_day_attention: "7days attention".to_string(),
            multi_api: "MultiAPI".to_string(),
            on_time: "on time".to_string(),
            hold_on: "HoldOn".to_string(),
            auto_closed: "auto-closed".to_string(),
        }
    }
}

impl LabelNames {
    /// Returns the tracker name for `label`.
    #[must_use]
    pub fn name(&self, label: Label) -> &str {
        match label {
            Label::Configured => &self.configured,
            Label::AutoAskCheck => &self.auto_ask_check,
            Label::BaseBranchAttention => &self.base_branch_attention,
            Label::SevenDayAttention => &self.seven_day_attention,
            Label::MultiApi => &self.multi_api,
            Label::OnTime => &self.on_time,
            Label::HoldOn => &self.hold_on,
            Label::AutoClosed => &self.auto_closed,
        }
    }

    /// Resolves a tracker name to a recognized label. Matching is exact.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Label> {
        Label::ALL.into_iter().find(|label| self.name(*label) == name)
    }

    /// Builds a [`LabelSet`] from raw tracker names, ignoring unknown names.
    #[must_use]
    pub fn label_set<S: AsRef<str>>(&self, names: &[S]) -> LabelSet {
        names
            .iter()
            .filter_map(|name| self.resolve(name.as_ref()))
            .collect()
    }
}

/// The recognized labels present on an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet(BTreeSet<Label>);

impl LabelSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, label: Label) -> bool {
        self.0.contains(&label)
    }

    /// Returns true if the label was not already present.
    pub fn insert(&mut self, label: Label) -> bool {
        self.0.insert(label)
    }

    /// Returns true if the label was present.
    pub fn remove(&mut self, label: Label) -> bool {
        self.0.remove(&label)
    }

    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Label> for LabelSet {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
