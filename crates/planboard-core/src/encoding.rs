//! UI-level enumerations and their task-system encodings.
//!
//! The remote task system stores progress as a percentage, priority as an
//! integer (lower is more urgent) and labels as boolean `categoryN` flags.
//! The tables here are an interoperability contract: the integers and keys
//! must match exactly what other clients of the same plans write.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalize a user-supplied label for comparison: lowercase, no separators.
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Progress
// ─────────────────────────────────────────────────────────────────────────────

/// Task progress as selected in a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Progress {
    /// Not started (0%).
    NotStarted,
    /// In progress (50%).
    InProgress,
    /// Completed (100%).
    Completed,
}

impl Progress {
    /// All selectable values, in display order.
    pub const ALL: [Self; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    /// The `percentComplete` value written to the task system.
    pub fn percent_complete(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress => 50,
            Self::Completed => 100,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Parse a label strictly. Accepts `"In Progress"`, `"in-progress"`,
    /// `"InProgress"` and similar spellings.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = normalize(label);
        Self::ALL
            .into_iter()
            .find(|p| normalize(p.label()) == wanted)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Priority
// ─────────────────────────────────────────────────────────────────────────────

/// Task priority as selected in a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    /// Urgent (1).
    Urgent,
    /// Important (3).
    Important,
    /// Medium (5).
    Medium,
    /// Low (9).
    Low,
}

impl Priority {
    /// All selectable values, in display order.
    pub const ALL: [Self; 4] = [Self::Urgent, Self::Important, Self::Medium, Self::Low];

    /// The integer `priority` written to the task system.
    pub fn wire_value(self) -> i32 {
        match self {
            Self::Urgent => 1,
            Self::Important => 3,
            Self::Medium => 5,
            Self::Low => 9,
        }
    }

    /// Map a stored integer back to a selectable priority.
    ///
    /// Only the four values this client writes round-trip; other integers
    /// (written by other clients) return `None`.
    pub fn from_wire(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.wire_value() == value)
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Important => "Important",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Parse a label strictly.
    pub fn parse(label: &str) -> Option<Self> {
        let wanted = normalize(label);
        Self::ALL
            .into_iter()
            .find(|p| normalize(p.label()) == wanted)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display label for a stored priority integer (`"Not set"` when unknown).
pub fn priority_display(value: i32) -> &'static str {
    Priority::from_wire(value).map_or("Not set", Priority::label)
}

// ─────────────────────────────────────────────────────────────────────────────
// Labels
// ─────────────────────────────────────────────────────────────────────────────

/// Color label that maps onto one of the task system's category slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// `category1`
    Blue,
    /// `category2`
    Green,
    /// `category3`
    Yellow,
    /// `category4`
    Red,
    /// `category5`
    Purple,
    /// `category6`
    Orange,
}

impl Label {
    /// The fixed label set, in category order.
    pub const ALL: [Self; 6] = [
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Red,
        Self::Purple,
        Self::Orange,
    ];

    /// The category key this label is stored under.
    pub fn category_key(self) -> &'static str {
        match self {
            Self::Blue => "category1",
            Self::Green => "category2",
            Self::Yellow => "category3",
            Self::Red => "category4",
            Self::Purple => "category5",
            Self::Orange => "category6",
        }
    }

    /// Label name as shown to users.
    pub fn name(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Green => "Green",
            Self::Yellow => "Yellow",
            Self::Red => "Red",
            Self::Purple => "Purple",
            Self::Orange => "Orange",
        }
    }

    /// Look up a label by name (case-insensitive). Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build the `appliedCategories` payload for a set of selected label names.
///
/// Every category in the fixed label set is present with an explicit boolean,
/// in category order. Unknown names are ignored.
pub fn category_flags<S: AsRef<str>>(selected: &[S]) -> IndexMap<&'static str, bool> {
    let chosen: Vec<Label> = selected
        .iter()
        .filter_map(|name| Label::from_name(name.as_ref()))
        .collect();

    Label::ALL
        .into_iter()
        .map(|label| (label.category_key(), chosen.contains(&label)))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
