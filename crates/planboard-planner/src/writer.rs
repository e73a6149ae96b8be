//! Task creation: form validation and translation into the create payload.
//!
//! Validation runs before any token is requested or any request is sent.
//! The first violated rule wins, checked in form order: title, bucket,
//! start date, due date, assignees, progress, priority, labels.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use planboard_auth::{AcquisitionPolicy, Account, CredentialProvider};
use planboard_core::{
    Bucket, BucketId, DirectoryUser, Label, PlanId, Priority, Progress, TaskId, UNNAMED_PLAN,
    UserId, category_flags,
};
use planboard_graph::{Assignment, CreateTaskPayload, PlannerApi, Recurrence};

use crate::errors::{PlannerError, Result};

/// Days between a task's start and the end of its weekly recurrence.
const RECURRENCE_SPAN_DAYS: i64 = 7;

/// Raw form input, as a user typed or picked it.
#[derive(Clone, Debug, Default)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Start timestamp.
    pub start: Option<DateTime<Utc>>,
    /// Due timestamp.
    pub due: Option<DateTime<Utc>>,
    /// Selected assignees.
    pub assignees: Vec<UserId>,
    /// Progress label (`"Not Started"`, `"In Progress"`, `"Completed"`).
    pub progress: Option<String>,
    /// Priority label (`"Urgent"`, `"Important"`, `"Medium"`, `"Low"`).
    pub priority: Option<String>,
    /// Selected label names.
    pub labels: Vec<String>,
}

/// A draft that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidDraft {
    /// Trimmed title.
    pub title: String,
    /// Start timestamp.
    pub start: DateTime<Utc>,
    /// Due timestamp.
    pub due: DateTime<Utc>,
    /// Assignees, deduplicated in selection order.
    pub assignees: Vec<UserId>,
    /// Parsed progress.
    pub progress: Progress,
    /// Parsed priority.
    pub priority: Priority,
    /// Recognized labels.
    pub labels: Vec<Label>,
}

fn invalid(field: &'static str, message: &'static str) -> PlannerError {
    PlannerError::ValidationFailed { field, message }
}

fn check_title(draft: &TaskDraft) -> Result<&str> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(invalid("title", "Task title is required."));
    }
    Ok(title)
}

/// Check a draft against the form rules.
pub fn validate(bucket_id: Option<&BucketId>, draft: &TaskDraft) -> Result<ValidDraft> {
    let _ = check_title(draft)?;
    if bucket_id.is_none_or(BucketId::is_blank) {
        return Err(invalid(
            "bucket",
            "Please select a bucket before creating a task.",
        ));
    }
    validate_fields(draft)
}

/// Check every form rule except the bucket selection.
pub fn validate_fields(draft: &TaskDraft) -> Result<ValidDraft> {
    let title = check_title(draft)?;
    let Some(start) = draft.start else {
        return Err(invalid("startDate", "Start Date is required."));
    };
    let Some(due) = draft.due else {
        return Err(invalid("dueDate", "Due Date is required."));
    };

    let mut assignees: Vec<UserId> = Vec::with_capacity(draft.assignees.len());
    for id in draft.assignees.iter().filter(|id| !id.is_blank()) {
        if !assignees.contains(id) {
            assignees.push(id.clone());
        }
    }
    if assignees.is_empty() {
        return Err(invalid("assignees", "Please assign at least one user."));
    }

    let progress = draft
        .progress
        .as_deref()
        .and_then(Progress::parse)
        .ok_or_else(|| invalid("progress", "Please select a progress status."))?;
    let priority = draft
        .priority
        .as_deref()
        .and_then(Priority::parse)
        .ok_or_else(|| invalid("priority", "Please select a priority."))?;

    let labels: Vec<Label> = draft
        .labels
        .iter()
        .filter_map(|name| Label::from_name(name))
        .collect();
    if labels.is_empty() {
        return Err(invalid("labels", "Please select at least one label."));
    }

    Ok(ValidDraft {
        title: title.to_string(),
        start,
        due,
        assignees,
        progress,
        priority,
        labels,
    })
}

/// Translate a validated draft into the create request body.
pub fn build_payload(plan_id: &PlanId, bucket_id: &BucketId, draft: &ValidDraft) -> CreateTaskPayload {
    let assignments: IndexMap<UserId, Assignment> = draft
        .assignees
        .iter()
        .map(|id| (id.clone(), Assignment::default()))
        .collect();
    let labels: Vec<&str> = draft.labels.iter().map(|l| l.name()).collect();

    CreateTaskPayload {
        plan_id: plan_id.clone(),
        bucket_id: bucket_id.clone(),
        title: draft.title.clone(),
        assignments,
        start_date_time: draft.start,
        due_date_time: draft.due,
        percent_complete: draft.progress.percent_complete(),
        priority: draft.priority.wire_value(),
        applied_categories: category_flags(&labels),
        recurrence: Recurrence::weekly_until(draft.start + Duration::days(RECURRENCE_SPAN_DAYS)),
    }
}

/// A task the server accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedTask {
    /// Server-assigned ID.
    pub id: TaskId,
    /// Title as stored.
    pub title: String,
    /// Plan the task was created in.
    pub plan_id: PlanId,
    /// Bucket the task was created in.
    pub bucket_id: BucketId,
}

/// Choices offered by the create-task form.
#[derive(Clone, Debug)]
pub struct TaskFormOptions {
    /// Plan title, or the placeholder.
    pub plan_name: String,
    /// Assignable users.
    pub users: Vec<DirectoryUser>,
    /// Buckets of the plan.
    pub buckets: Vec<Bucket>,
    /// Bucket preselected in the form (the first one listed).
    pub default_bucket: Option<BucketId>,
}

/// Validates and submits new tasks.
///
/// Tokens are acquired silently only: a writer never starts an interactive
/// sign-in.
pub struct TaskWriter {
    api: Arc<dyn PlannerApi>,
    credentials: CredentialProvider,
}

impl TaskWriter {
    /// Create a writer.
    pub fn new(api: Arc<dyn PlannerApi>, credentials: CredentialProvider) -> Self {
        Self {
            api,
            credentials: credentials.with_policy(AcquisitionPolicy::SilentOnly),
        }
    }

    /// Load the users, buckets, and plan title the form offers.
    ///
    /// Each list falls back to empty on failure; only token acquisition fails
    /// the call.
    #[tracing::instrument(skip_all, fields(plan = %plan_id))]
    pub async fn form_options(&self, account: &Account, plan_id: &PlanId) -> Result<TaskFormOptions> {
        let token = self.credentials.acquire_default_token(account).await?;
        let token = token.secret();

        let (users, buckets, details) = tokio::join!(
            self.api.list_users(token),
            self.api.list_buckets(token, plan_id),
            self.api.get_plan(token, plan_id),
        );

        let users = users.unwrap_or_else(|e| {
            warn!(source = "users", error = %e, "user fetch failed");
            Vec::new()
        });
        let buckets = buckets.unwrap_or_else(|e| {
            warn!(source = "buckets", error = %e, "buckets fetch failed");
            Vec::new()
        });
        let plan_name = details.map_or_else(
            |e| {
                warn!(source = "plan", error = %e, "plan details fetch failed");
                UNNAMED_PLAN.to_string()
            },
            |d| d.title,
        );

        Ok(TaskFormOptions {
            plan_name,
            default_bucket: buckets.first().map(|b| b.id.clone()),
            users,
            buckets,
        })
    }

    /// Validate `draft` and create it in `plan_id` / `bucket_id`.
    #[tracing::instrument(skip_all, fields(plan = %plan_id))]
    pub async fn create_task(
        &self,
        account: &Account,
        plan_id: &PlanId,
        bucket_id: Option<&BucketId>,
        draft: &TaskDraft,
    ) -> Result<CreatedTask> {
        let valid = validate(bucket_id, draft)?;
        let bucket_id = bucket_id.cloned().unwrap_or_default();
        let payload = build_payload(plan_id, &bucket_id, &valid);

        let token = self.credentials.acquire_default_token(account).await?;
        let created = self
            .api
            .create_task(token.secret(), &payload)
            .await
            .map_err(PlannerError::TaskCreationFailed)?;

        info!(task = %created.id, bucket = %bucket_id, "task created");
        Ok(CreatedTask {
            id: TaskId::from(created.id),
            title: created.title.unwrap_or(payload.title),
            plan_id: plan_id.clone(),
            bucket_id,
        })
    }
}

impl TaskWriter {
    /// Validate `draft` and create it in the first bucket of `plan_id`.
    ///
    /// The bucket is looked up only after every other rule passes. A failed
    /// bucket listing is a [`PlannerError::RemotePageFetchFailed`]; a plan
    /// without buckets fails validation on `bucket`.
    #[tracing::instrument(skip_all, fields(plan = %plan_id))]
    pub async fn create_task_in_default_bucket(
        &self,
        account: &Account,
        plan_id: &PlanId,
        draft: &TaskDraft,
    ) -> Result<CreatedTask> {
        let _ = validate_fields(draft)?;

        let token = self.credentials.acquire_default_token(account).await?;
        let buckets = self.api.list_buckets(token.secret(), plan_id).await?;
        let bucket = buckets.into_iter().next().map(|b| b.id);
        debug!(bucket = ?bucket, "resolved default bucket");

        self.create_task(account, plan_id, bucket.as_ref(), draft).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
