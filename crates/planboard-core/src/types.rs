//! Domain types read from the task system, and the derived dashboard row.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::encoding::priority_display;
use crate::ids::{BucketId, PlanId, TaskId, UserId};

/// Key of a category slot on a task (`"category1"` .. `"category25"`).
pub type CategoryKey = String;

/// Placeholder title for tasks stored without one.
pub const UNTITLED_TASK: &str = "Untitled Task";

/// Bucket name shown when a task's bucket cannot be resolved.
pub const UNCATEGORIZED_BUCKET: &str = "Uncategorized";

/// Plan title shown when the plan has none or cannot be fetched.
pub const UNNAMED_PLAN: &str = "Unnamed Plan";

/// A task list visible to the signed-in account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    /// Plan identifier. Identity of a plan.
    pub id: PlanId,
    /// Plan title.
    pub title: String,
    /// Reference to the group (or user) that owns the plan, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_container_ref: Option<String>,
}

/// Plan metadata used by the dashboard: title and category labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    /// Plan title, or [`UNNAMED_PLAN`].
    pub title: String,
    /// Lowercased category key to label, in payload order.
    pub category_labels: IndexMap<CategoryKey, String>,
}

impl PlanDetails {
    /// Placeholder used when the plan cannot be fetched.
    pub fn placeholder() -> Self {
        Self {
            title: UNNAMED_PLAN.to_string(),
            category_labels: IndexMap::new(),
        }
    }

    /// Label for a category key (case-insensitive), falling back to the raw key.
    pub fn category_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.category_labels
            .get(&key.to_lowercase())
            .map_or(key, String::as_str)
    }
}

/// A named column within one plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Bucket identifier.
    pub id: BucketId,
    /// Bucket name.
    pub name: String,
}

/// A directory entry used to resolve assignee IDs to names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryUser {
    /// User identifier.
    pub id: UserId,
    /// Display name (already falling back to the principal name upstream).
    pub display_name: String,
}

/// A task as stored in the task system.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,
    /// Title (may be empty).
    pub title: String,
    /// Assigned users, in payload order.
    pub assignments: Vec<UserId>,
    /// Start timestamp.
    pub start_date_time: Option<DateTime<Utc>>,
    /// Due timestamp.
    pub due_date_time: Option<DateTime<Utc>>,
    /// Bucket the task lives in.
    pub bucket_id: Option<BucketId>,
    /// Completion percentage, 0..=100.
    pub percent_complete: u8,
    /// Stored priority integer (0 when unset).
    pub priority: i32,
    /// Applied category flags, in payload order.
    pub applied_categories: IndexMap<CategoryKey, bool>,
}

impl Task {
    /// Whether the task counts as done for the completion rate.
    pub fn is_complete(&self) -> bool {
        self.percent_complete == 100
    }
}

/// A task enriched with resolved names for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTask {
    /// Task identifier.
    pub id: TaskId,
    /// Title, or [`UNTITLED_TASK`].
    pub title: String,
    /// Assignee display names (raw IDs when unresolvable).
    pub assigned_to: Vec<String>,
    /// Start timestamp.
    pub start_date_time: Option<DateTime<Utc>>,
    /// Due timestamp.
    pub due_date_time: Option<DateTime<Utc>>,
    /// Bucket name, or [`UNCATEGORIZED_BUCKET`].
    pub bucket_name: String,
    /// Completion percentage.
    pub percent_complete: u8,
    /// Stored priority integer.
    pub priority: i32,
    /// Labels of the applied categories.
    pub category_labels: Vec<String>,
}

impl ViewTask {
    /// Comma-joined assignees, or `"Unassigned"`.
    pub fn assignees_display(&self) -> String {
        if self.assigned_to.is_empty() {
            "Unassigned".to_string()
        } else {
            self.assigned_to.join(", ")
        }
    }

    /// Comma-joined labels, or `"None"`.
    pub fn labels_display(&self) -> String {
        if self.category_labels.is_empty() {
            "None".to_string()
        } else {
            self.category_labels.join(", ")
        }
    }

    /// Priority label (`"Not set"` for integers outside the known table).
    pub fn priority_display(&self) -> &'static str {
        priority_display(self.priority)
    }
}

/// Percentage of tasks at 100% completion.
///
/// Defined as `0.0` for an empty task set; always within `[0, 100]`.
#[allow(clippy::cast_precision_loss)]
pub fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.is_complete()).count();
    (completed as f64 / tasks.len() as f64) * 100.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
