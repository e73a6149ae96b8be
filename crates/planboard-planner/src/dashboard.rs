//! Dashboard aggregation: one plan's tasks joined with buckets, plan
//! metadata, and the user directory.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use planboard_auth::{Account, CredentialProvider};
use planboard_core::{
    Bucket, DirectoryUser, PlanDetails, PlanId, Task, UNCATEGORIZED_BUCKET, UNTITLED_TASK,
    ViewTask, completion_rate,
};
use planboard_graph::PlannerApi;

use crate::errors::{PlannerError, Result};

/// A sub-fetch that failed and was replaced by its default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataSource {
    /// User directory; assignees show raw IDs.
    Users,
    /// Task list; the dashboard is empty.
    Tasks,
    /// Bucket list; every task shows as uncategorized.
    Buckets,
    /// Plan metadata; placeholder title, raw category keys.
    Plan,
}

impl DataSource {
    /// Short lowercase name for logs and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Tasks => "tasks",
            Self::Buckets => "buckets",
            Self::Plan => "plan",
        }
    }
}

/// The denormalized view of one plan.
#[derive(Clone, Debug)]
pub struct Dashboard {
    /// Plan shown.
    pub plan_id: PlanId,
    /// Plan title, or the placeholder.
    pub plan_name: String,
    /// Percentage of tasks at 100%, within `[0, 100]`.
    pub completion_rate: f64,
    /// Enriched tasks in listing order.
    pub tasks: Vec<ViewTask>,
    /// Sub-fetches that fell back to defaults.
    pub degraded: Vec<DataSource>,
}

impl Dashboard {
    /// Whether any sub-fetch fell back to its default.
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Loads dashboards.
pub struct TaskAggregator {
    api: Arc<dyn PlannerApi>,
    credentials: CredentialProvider,
}

impl TaskAggregator {
    /// Create an aggregator.
    pub fn new(api: Arc<dyn PlannerApi>, credentials: CredentialProvider) -> Self {
        Self { api, credentials }
    }

    /// Load the dashboard for `plan_id`.
    ///
    /// Only token acquisition fails the load. The user directory is fetched
    /// first; tasks, buckets, and plan metadata are then fetched
    /// concurrently, each replaced by its default on failure.
    #[tracing::instrument(skip_all, fields(plan = %plan_id))]
    pub async fn load_dashboard(&self, account: &Account, plan_id: &PlanId) -> Result<Dashboard> {
        if plan_id.is_blank() {
            return Err(PlannerError::ValidationFailed {
                field: "plan",
                message: "Please select a plan first.",
            });
        }

        let token = self.credentials.acquire_default_token(account).await?;
        let token = token.secret();
        let mut degraded = Vec::new();

        let users = match self.api.list_users(token).await {
            Ok(users) => users,
            Err(e) => {
                warn!(source = "users", error = %e, "user fetch failed, using assignment ids");
                degraded.push(DataSource::Users);
                Vec::new()
            }
        };

        let (tasks, buckets, details) = tokio::join!(
            self.api.list_tasks(token, plan_id),
            self.api.list_buckets(token, plan_id),
            self.api.get_plan(token, plan_id),
        );

        let tasks = tasks.unwrap_or_else(|e| {
            warn!(source = "tasks", error = %e, "tasks fetch failed");
            degraded.push(DataSource::Tasks);
            Vec::new()
        });
        let buckets = buckets.unwrap_or_else(|e| {
            warn!(source = "buckets", error = %e, "buckets fetch failed");
            degraded.push(DataSource::Buckets);
            Vec::new()
        });
        let details = details.unwrap_or_else(|e| {
            warn!(source = "plan", error = %e, "plan details fetch failed");
            degraded.push(DataSource::Plan);
            PlanDetails::placeholder()
        });

        let completion_rate = completion_rate(&tasks);
        let tasks = build_view_tasks(&tasks, &users, &buckets, &details);
        debug!(
            tasks = tasks.len(),
            completion_rate,
            degraded = degraded.len(),
            "dashboard assembled"
        );

        Ok(Dashboard {
            plan_id: plan_id.clone(),
            plan_name: details.title,
            completion_rate,
            tasks,
            degraded,
        })
    }
}

/// Join tasks with the directory, bucket names, and category labels.
pub fn build_view_tasks(
    tasks: &[Task],
    users: &[DirectoryUser],
    buckets: &[Bucket],
    details: &PlanDetails,
) -> Vec<ViewTask> {
    let directory: HashMap<&str, &str> = users
        .iter()
        .map(|u| (u.id.as_str(), u.display_name.as_str()))
        .collect();
    let bucket_names: HashMap<&str, &str> = buckets
        .iter()
        .filter(|b| !b.name.is_empty())
        .map(|b| (b.id.as_str(), b.name.as_str()))
        .collect();

    tasks
        .iter()
        .map(|task| ViewTask {
            id: task.id.clone(),
            title: if task.title.is_empty() {
                UNTITLED_TASK.to_string()
            } else {
                task.title.clone()
            },
            assigned_to: task
                .assignments
                .iter()
                .map(|id| directory.get(id.as_str()).copied().unwrap_or(id.as_str()).to_string())
                .collect(),
            start_date_time: task.start_date_time,
            due_date_time: task.due_date_time,
            bucket_name: task
                .bucket_id
                .as_ref()
                .and_then(|id| bucket_names.get(id.as_str()).copied())
                .unwrap_or(UNCATEGORIZED_BUCKET)
                .to_string(),
            percent_complete: task.percent_complete,
            priority: task.priority,
            category_labels: task
                .applied_categories
                .iter()
                .filter(|(_, applied)| **applied)
                .map(|(key, _)| details.category_label(key).to_string())
                .collect(),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use indexmap::IndexMap;
    use tracing::Level;

    use planboard_core::logging::capture_logs;
    use planboard_core::{BucketId, TaskId, UNNAMED_PLAN, UserId};

    use super::*;
    use crate::testing::{FakeApi, account, credentials};

    fn task(id: &str, percent: u8, bucket: Option<&str>) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("Task {id}"),
            bucket_id: bucket.map(BucketId::from),
            percent_complete: percent,
            ..Task::default()
        }
    }

    fn details() -> PlanDetails {
        PlanDetails {
            title: "Launch".into(),
            category_labels: IndexMap::from([
                ("category1".to_string(), "Marketing".to_string()),
                ("category4".to_string(), "Urgent fix".to_string()),
            ]),
        }
    }

    fn healthy_api() -> FakeApi {
        FakeApi {
            users: vec![DirectoryUser {
                id: UserId::from("u1"),
                display_name: "Ada".into(),
            }],
            tasks: vec![
                task("t1", 100, Some("b1")),
                task("t2", 0, Some("b1")),
                task("t3", 50, Some("b2")),
                task("t4", 25, None),
            ],
            buckets: vec![
                Bucket {
                    id: BucketId::from("b1"),
                    name: "To do".into(),
                },
                Bucket {
                    id: BucketId::from("b2"),
                    name: "Doing".into(),
                },
            ],
            details: Some(details()),
            ..FakeApi::default()
        }
    }

    fn aggregator(api: FakeApi) -> TaskAggregator {
        TaskAggregator::new(Arc::new(api), credentials(false).0)
    }

    #[tokio::test]
    async fn four_tasks_one_complete_is_25_percent() {
        let dashboard = aggregator(healthy_api())
            .load_dashboard(&account(), &PlanId::from("p1"))
            .await
            .unwrap();
        assert!((dashboard.completion_rate - 25.0).abs() < f64::EPSILON);
        assert_eq!(dashboard.plan_name, "Launch");
        assert_eq!(dashboard.tasks.len(), 4);
        assert!(!dashboard.is_degraded());

        let names: Vec<&str> = dashboard.tasks.iter().map(|t| t.bucket_name.as_str()).collect();
        assert_eq!(names, vec!["To do", "To do", "Doing", UNCATEGORIZED_BUCKET]);
    }

    #[tokio::test]
    async fn bucket_failure_degrades_to_uncategorized() {
        let (logs, _guard) = capture_logs();
        let api = FakeApi {
            fail_buckets: true,
            ..healthy_api()
        };
        let dashboard = aggregator(api)
            .load_dashboard(&account(), &PlanId::from("p1"))
            .await
            .unwrap();

        assert_eq!(dashboard.tasks.len(), 4);
        assert!(
            dashboard
                .tasks
                .iter()
                .all(|t| t.bucket_name == UNCATEGORIZED_BUCKET)
        );
        assert_eq!(dashboard.degraded, vec![DataSource::Buckets]);
        assert_eq!(dashboard.plan_name, "Launch");
        assert!(logs.has_event(Level::WARN, "buckets fetch failed"));
    }

    #[tokio::test]
    async fn every_sub_fetch_failing_still_loads() {
        let api = FakeApi {
            fail_users: true,
            fail_tasks: true,
            fail_buckets: true,
            details: None,
            ..healthy_api()
        };
        let dashboard = aggregator(api)
            .load_dashboard(&account(), &PlanId::from("p1"))
            .await
            .unwrap();
        assert!(dashboard.tasks.is_empty());
        assert!(dashboard.completion_rate.abs() < f64::EPSILON);
        assert_eq!(dashboard.plan_name, UNNAMED_PLAN);
        assert_eq!(
            dashboard.degraded,
            vec![
                DataSource::Users,
                DataSource::Tasks,
                DataSource::Buckets,
                DataSource::Plan
            ]
        );
    }

    #[tokio::test]
    async fn token_failure_is_fatal() {
        let api = Arc::new(healthy_api());
        let aggregator = TaskAggregator::new(
            Arc::clone(&api) as Arc<dyn PlannerApi>,
            credentials(true).0,
        );
        let err = aggregator
            .load_dashboard(&account(), &PlanId::from("p1"))
            .await
            .unwrap_err();
        assert_matches!(err, PlannerError::TokenAcquisitionFailed(_));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn blank_plan_is_rejected_without_calls() {
        let api = Arc::new(healthy_api());
        let aggregator = TaskAggregator::new(
            Arc::clone(&api) as Arc<dyn PlannerApi>,
            credentials(false).0,
        );
        let err = aggregator
            .load_dashboard(&account(), &PlanId::from(" "))
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("plan"));
        assert_eq!(api.calls(), 0);
    }

    #[test]
    fn view_task_resolution() {
        let mut t = task("t1", 0, Some("b-gone"));
        t.title = String::new();
        t.assignments = vec![UserId::from("u1"), UserId::from("u-unknown")];
        t.applied_categories = IndexMap::from([
            ("Category4".to_string(), true),
            ("category2".to_string(), false),
            ("category1".to_string(), true),
            ("category9".to_string(), true),
        ]);
        let users = vec![DirectoryUser {
            id: UserId::from("u1"),
            display_name: "Ada".into(),
        }];

        let views = build_view_tasks(&[t], &users, &[], &details());
        let view = &views[0];
        assert_eq!(view.title, UNTITLED_TASK);
        assert_eq!(view.assigned_to, vec!["Ada", "u-unknown"]);
        assert_eq!(view.bucket_name, UNCATEGORIZED_BUCKET);
        assert_eq!(
            view.category_labels,
            vec!["Urgent fix", "Marketing", "category9"]
        );
    }

    #[test]
    fn empty_bucket_name_falls_back() {
        let buckets = vec![Bucket {
            id: BucketId::from("b1"),
            name: String::new(),
        }];
        let views = build_view_tasks(
            &[task("t1", 0, Some("b1"))],
            &[],
            &buckets,
            &PlanDetails::placeholder(),
        );
        assert_eq!(views[0].bucket_name, UNCATEGORIZED_BUCKET);
    }
}
