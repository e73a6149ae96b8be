//! Graph JSON shapes and their conversion into domain types.
//!
//! Read DTOs are lenient: every field except `id` may be missing or null.
//! Map-valued fields (`assignments`, `appliedCategories`,
//! `categoryDescriptions`) keep payload order.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use planboard_core::{
    Bucket, BucketId, DirectoryUser, GroupId, Plan, PlanDetails, PlanId, Task, TaskId,
    UNNAMED_PLAN, UserId,
};

/// `@odata.type` of a group entry in a membership listing.
pub const GROUP_ODATA_TYPE: &str = "#microsoft.graph.group";

/// `@odata.type` of a task assignment.
pub const ASSIGNMENT_ODATA_TYPE: &str = "#microsoft.graph.plannerAssignment";

/// Order hint sent with every new assignment. Graph treats `" !"` as
/// "place at the start".
pub const ORDER_HINT_SENTINEL: &str = " !";

// ─────────────────────────────────────────────────────────────────────────────
// Read shapes
// ─────────────────────────────────────────────────────────────────────────────

/// `plannerPlan`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    /// Plan ID.
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// Owning group ID (legacy field).
    #[serde(default)]
    pub owner: Option<String>,
    /// Owning container.
    #[serde(default)]
    pub container: Option<ContainerDto>,
    /// Expanded `details`, present when requested with `$expand=details`.
    #[serde(default)]
    pub details: Option<PlanDetailsDto>,
}

/// `plannerPlanContainer`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDto {
    /// ID of the owning group or roster.
    #[serde(default)]
    pub container_id: Option<String>,
}

/// `plannerPlanDetails`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetailsDto {
    /// `category1..category25` to description. Values are usually strings;
    /// objects with a `name` and nulls are tolerated.
    #[serde(default)]
    pub category_descriptions: IndexMap<String, Value>,
}

impl From<PlanDto> for Plan {
    fn from(dto: PlanDto) -> Self {
        let owner_container_ref = dto
            .container
            .and_then(|c| c.container_id)
            .or(dto.owner)
            .filter(|s| !s.is_empty());
        Self {
            id: PlanId::from(dto.id),
            title: dto.title.unwrap_or_default(),
            owner_container_ref,
        }
    }
}

impl PlanDto {
    /// Title and category labels for the dashboard.
    pub fn into_details(self) -> PlanDetails {
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNNAMED_PLAN.to_string());
        let category_labels = self
            .details
            .unwrap_or_default()
            .category_descriptions
            .into_iter()
            .map(|(key, value)| {
                let label = category_label(&key, &value);
                (key.to_lowercase(), label)
            })
            .collect();
        PlanDetails {
            title,
            category_labels,
        }
    }
}

/// Label for one `categoryDescriptions` entry, falling back to the key.
fn category_label(key: &str, value: &Value) -> String {
    let named = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("name").and_then(Value::as_str),
        _ => None,
    };
    named
        .filter(|s| !s.is_empty())
        .unwrap_or(key)
        .to_string()
}

/// `directoryObject` from `/me/memberOf`.
#[derive(Clone, Debug, Deserialize)]
pub struct MembershipDto {
    /// Object ID.
    pub id: String,
    /// Concrete type, e.g. `#microsoft.graph.group`.
    #[serde(rename = "@odata.type", default)]
    pub odata_type: Option<String>,
}

impl MembershipDto {
    /// The group ID, if this membership is a group.
    pub fn group_id(&self) -> Option<GroupId> {
        (self.odata_type.as_deref() == Some(GROUP_ODATA_TYPE)).then(|| GroupId::from(self.id.as_str()))
    }
}

/// `plannerBucket`.
#[derive(Debug, Deserialize)]
pub struct BucketDto {
    /// Bucket ID.
    pub id: String,
    /// Name.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<BucketDto> for Bucket {
    fn from(dto: BucketDto) -> Self {
        Self {
            id: BucketId::from(dto.id),
            name: dto.name.unwrap_or_default(),
        }
    }
}

/// `plannerTask`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    /// Task ID.
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: Option<String>,
    /// User ID to `plannerAssignment`.
    #[serde(default)]
    pub assignments: Option<IndexMap<String, Value>>,
    /// Start.
    #[serde(default)]
    pub start_date_time: Option<DateTime<Utc>>,
    /// Due.
    #[serde(default)]
    pub due_date_time: Option<DateTime<Utc>>,
    /// Bucket ID.
    #[serde(default)]
    pub bucket_id: Option<String>,
    /// 0..=100.
    #[serde(default)]
    pub percent_complete: Option<i64>,
    /// 0..=10.
    #[serde(default)]
    pub priority: Option<i32>,
    /// Category key to applied flag.
    #[serde(default)]
    pub applied_categories: Option<IndexMap<String, Value>>,
}

impl From<TaskDto> for Task {
    fn from(dto: TaskDto) -> Self {
        let percent_complete = dto.percent_complete.unwrap_or(0).clamp(0, 100);
        Self {
            id: TaskId::from(dto.id),
            title: dto.title.unwrap_or_default(),
            assignments: dto
                .assignments
                .unwrap_or_default()
                .into_keys()
                .map(UserId::from)
                .collect(),
            start_date_time: dto.start_date_time,
            due_date_time: dto.due_date_time,
            bucket_id: dto.bucket_id.filter(|b| !b.is_empty()).map(BucketId::from),
            percent_complete: u8::try_from(percent_complete).unwrap_or(0),
            priority: dto.priority.unwrap_or(0),
            applied_categories: dto
                .applied_categories
                .unwrap_or_default()
                .into_iter()
                .map(|(key, flag)| (key, flag.as_bool().unwrap_or(false)))
                .collect(),
        }
    }
}

/// `user` with `$select=id,displayName,userPrincipalName`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    /// User ID.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Sign-in name.
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl From<UserDto> for DirectoryUser {
    fn from(dto: UserDto) -> Self {
        let display_name = dto
            .display_name
            .filter(|n| !n.is_empty())
            .or(dto.user_principal_name.filter(|n| !n.is_empty()))
            .unwrap_or_else(|| dto.id.clone());
        Self {
            id: UserId::from(dto.id),
            display_name,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Write shapes
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a new task's `assignments` map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Always [`ASSIGNMENT_ODATA_TYPE`].
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    /// Always [`ORDER_HINT_SENTINEL`].
    pub order_hint: &'static str,
}

impl Default for Assignment {
    fn default() -> Self {
        Self {
            odata_type: ASSIGNMENT_ODATA_TYPE,
            order_hint: ORDER_HINT_SENTINEL,
        }
    }
}

/// Recurrence block attached to a new task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Recurrence {
    /// Repeat pattern.
    pub pattern: RecurrencePattern,
    /// Repeat range.
    pub range: RecurrenceRange,
}

/// `{"type": "weekly", "interval": 1}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecurrencePattern {
    /// Pattern kind.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Repeat every `interval` units.
    pub interval: u32,
}

/// `{"endDateTime": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRange {
    /// Last occurrence.
    pub end_date_time: DateTime<Utc>,
}

impl Recurrence {
    /// Weekly, every week, ending at `end`.
    pub fn weekly_until(end: DateTime<Utc>) -> Self {
        Self {
            pattern: RecurrencePattern {
                kind: "weekly",
                interval: 1,
            },
            range: RecurrenceRange { end_date_time: end },
        }
    }
}

/// Body of `POST /planner/tasks`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskPayload {
    /// Target plan.
    pub plan_id: PlanId,
    /// Target bucket.
    pub bucket_id: BucketId,
    /// Title.
    pub title: String,
    /// Assigned user ID to assignment marker.
    pub assignments: IndexMap<UserId, Assignment>,
    /// Start.
    pub start_date_time: DateTime<Utc>,
    /// Due.
    pub due_date_time: DateTime<Utc>,
    /// 0, 50 or 100.
    pub percent_complete: u8,
    /// 1, 3, 5 or 9.
    pub priority: i32,
    /// Every known category key with an explicit flag.
    pub applied_categories: IndexMap<&'static str, bool>,
    /// Recurrence block.
    pub recurrence: Recurrence,
}

/// The created task as echoed by Graph.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTaskDto {
    /// New task ID.
    pub id: String,
    /// Title as stored.
    #[serde(default)]
    pub title: Option<String>,
    /// Plan ID as stored.
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Bucket ID as stored.
    #[serde(default)]
    pub bucket_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn task_dto_defaults() {
        let dto: TaskDto = serde_json::from_value(json!({"id": "t1"})).unwrap();
        let task = Task::from(dto);
        assert_eq!(task.id.as_str(), "t1");
        assert!(task.title.is_empty());
        assert!(task.assignments.is_empty());
        assert!(task.bucket_id.is_none());
        assert_eq!(task.percent_complete, 0);
        assert_eq!(task.priority, 0);
    }

    #[test]
    fn task_dto_full() {
        let dto: TaskDto = serde_json::from_value(json!({
            "id": "t1",
            "title": "Ship",
            "assignments": {
                "u2": {"@odata.type": "#microsoft.graph.plannerAssignment", "orderHint": "x"},
                "u1": {"@odata.type": "#microsoft.graph.plannerAssignment", "orderHint": "y"}
            },
            "startDateTime": "2024-03-01T09:00:00Z",
            "dueDateTime": null,
            "bucketId": "b1",
            "percentComplete": 50,
            "priority": 3,
            "appliedCategories": {"category4": true, "category1": true, "category2": false}
        }))
        .unwrap();
        let task = Task::from(dto);
        let assignees: Vec<&str> = task.assignments.iter().map(UserId::as_str).collect();
        assert_eq!(assignees, vec!["u2", "u1"]);
        assert_eq!(
            task.start_date_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
        );
        assert!(task.due_date_time.is_none());
        assert_eq!(task.bucket_id.as_deref(), Some("b1"));
        let keys: Vec<&str> = task.applied_categories.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["category4", "category1", "category2"]);
        assert!(!task.applied_categories["category2"]);
    }

    #[test]
    fn task_percent_is_clamped() {
        let dto: TaskDto = serde_json::from_value(json!({"id": "t", "percentComplete": 250})).unwrap();
        assert_eq!(Task::from(dto).percent_complete, 100);
    }

    #[test]
    fn membership_group_filter() {
        let group: MembershipDto =
            serde_json::from_value(json!({"id": "g1", "@odata.type": "#microsoft.graph.group"}))
                .unwrap();
        let role: MembershipDto = serde_json::from_value(
            json!({"id": "r1", "@odata.type": "#microsoft.graph.directoryRole"}),
        )
        .unwrap();
        assert_eq!(group.group_id(), Some(GroupId::from("g1")));
        assert_eq!(role.group_id(), None);
    }

    #[test]
    fn user_display_name_fallbacks() {
        let named: UserDto =
            serde_json::from_value(json!({"id": "u1", "displayName": "Ada"})).unwrap();
        let upn: UserDto = serde_json::from_value(
            json!({"id": "u2", "displayName": "", "userPrincipalName": "grace@contoso.com"}),
        )
        .unwrap();
        let bare: UserDto = serde_json::from_value(json!({"id": "u3"})).unwrap();
        assert_eq!(DirectoryUser::from(named).display_name, "Ada");
        assert_eq!(DirectoryUser::from(upn).display_name, "grace@contoso.com");
        assert_eq!(DirectoryUser::from(bare).display_name, "u3");
    }

    #[test]
    fn plan_owner_reference() {
        let dto: PlanDto = serde_json::from_value(json!({
            "id": "p1", "title": "Launch", "owner": "g-legacy", "container": {"containerId": "g1"}
        }))
        .unwrap();
        let plan = Plan::from(dto);
        assert_eq!(plan.owner_container_ref.as_deref(), Some("g1"));
        assert_eq!(plan.title, "Launch");
    }

    #[test]
    fn plan_details_category_shapes() {
        let dto: PlanDto = serde_json::from_value(json!({
            "id": "p1",
            "details": {"categoryDescriptions": {
                "category1": "Marketing",
                "Category2": {"name": "Design"},
                "category3": null,
                "category4": ""
            }}
        }))
        .unwrap();
        let details = dto.into_details();
        assert_eq!(details.title, UNNAMED_PLAN);
        assert_eq!(details.category_label("category1"), "Marketing");
        assert_eq!(details.category_label("category2"), "Design");
        assert_eq!(details.category_label("category3"), "category3");
        assert_eq!(details.category_label("category4"), "category4");
        assert_eq!(details.category_label("category9"), "category9");
    }

    #[test]
    fn create_payload_shape() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut assignments = IndexMap::new();
        let _ = assignments.insert(UserId::from("u1"), Assignment::default());
        let payload = CreateTaskPayload {
            plan_id: PlanId::from("p1"),
            bucket_id: BucketId::from("b1"),
            title: "Ship".into(),
            assignments,
            start_date_time: start,
            due_date_time: start,
            percent_complete: 50,
            priority: 3,
            applied_categories: IndexMap::from([("category1", true)]),
            recurrence: Recurrence::weekly_until(start + chrono::Duration::days(7)),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["planId"], "p1");
        assert_eq!(
            value["assignments"]["u1"],
            json!({"@odata.type": "#microsoft.graph.plannerAssignment", "orderHint": " !"})
        );
        assert_eq!(value["recurrence"]["pattern"], json!({"type": "weekly", "interval": 1}));
        assert_eq!(
            value["recurrence"]["range"]["endDateTime"],
            "2024-03-08T00:00:00Z"
        );
        assert_eq!(value["appliedCategories"]["category1"], true);
    }
}
