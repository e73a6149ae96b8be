//! Logical task-system operations.

use async_trait::async_trait;
use tracing::debug;

use planboard_core::{Bucket, DirectoryUser, GroupId, Plan, PlanDetails, PlanId, Task};
use planboard_settings::GraphSettings;

use crate::client::GraphClient;
use crate::errors::Result;
use crate::wire::{
    BucketDto, CreateTaskPayload, CreatedTaskDto, MembershipDto, PlanDto, TaskDto, UserDto,
};

/// Remote operations consumed by the orchestration layer.
///
/// Listings are drained across every page before returning. `token` is a
/// bearer credential obtained by the caller.
#[async_trait]
pub trait PlannerApi: Send + Sync {
    /// Plans the signed-in user owns or is a member of directly.
    async fn list_my_plans(&self, token: &str) -> Result<Vec<Plan>>;

    /// Plans owned by a group.
    async fn list_group_plans(&self, token: &str, group: &GroupId) -> Result<Vec<Plan>>;

    /// Every directory object the signed-in user is a member of.
    async fn list_my_memberships(&self, token: &str) -> Result<Vec<MembershipDto>>;

    /// Buckets of a plan.
    async fn list_buckets(&self, token: &str, plan: &PlanId) -> Result<Vec<Bucket>>;

    /// Title and category labels of a plan.
    async fn get_plan(&self, token: &str, plan: &PlanId) -> Result<PlanDetails>;

    /// Tasks of a plan.
    async fn list_tasks(&self, token: &str, plan: &PlanId) -> Result<Vec<Task>>;

    /// Create a task.
    async fn create_task(&self, token: &str, payload: &CreateTaskPayload) -> Result<CreatedTaskDto>;

    /// The user directory.
    async fn list_users(&self, token: &str) -> Result<Vec<DirectoryUser>>;
}

/// [`PlannerApi`] over Microsoft Graph v1.0.
#[derive(Clone, Debug)]
pub struct GraphPlannerApi {
    client: GraphClient,
    user_page_size: u32,
}

impl GraphPlannerApi {
    /// Wrap a client.
    pub fn new(client: GraphClient, user_page_size: u32) -> Self {
        Self {
            client,
            user_page_size,
        }
    }

    /// Build the client and API from the `graph` settings section.
    pub fn from_settings(settings: &GraphSettings) -> Result<Self> {
        Ok(Self::new(
            GraphClient::from_settings(settings)?,
            settings.user_page_size,
        ))
    }
}

#[async_trait]
impl PlannerApi for GraphPlannerApi {
    async fn list_my_plans(&self, token: &str) -> Result<Vec<Plan>> {
        let plans: Vec<PlanDto> = self.client.get_all(token, "/me/planner/plans").await?;
        Ok(plans.into_iter().map(Plan::from).collect())
    }

    async fn list_group_plans(&self, token: &str, group: &GroupId) -> Result<Vec<Plan>> {
        let path = format!("/groups/{group}/planner/plans");
        let plans: Vec<PlanDto> = self.client.get_all(token, &path).await?;
        Ok(plans.into_iter().map(Plan::from).collect())
    }

    async fn list_my_memberships(&self, token: &str) -> Result<Vec<MembershipDto>> {
        self.client.get_all(token, "/me/memberOf").await
    }

    async fn list_buckets(&self, token: &str, plan: &PlanId) -> Result<Vec<Bucket>> {
        let path = format!("/planner/plans/{plan}/buckets");
        let buckets: Vec<BucketDto> = self.client.get_all(token, &path).await?;
        Ok(buckets.into_iter().map(Bucket::from).collect())
    }

    async fn get_plan(&self, token: &str, plan: &PlanId) -> Result<PlanDetails> {
        let path = format!("/planner/plans/{plan}?$expand=details");
        let dto: PlanDto = self.client.get_json(token, &path).await?;
        Ok(dto.into_details())
    }

    async fn list_tasks(&self, token: &str, plan: &PlanId) -> Result<Vec<Task>> {
        let path = format!("/planner/plans/{plan}/tasks");
        let tasks: Vec<TaskDto> = self.client.get_all(token, &path).await?;
        Ok(tasks.into_iter().map(Task::from).collect())
    }

    async fn create_task(&self, token: &str, payload: &CreateTaskPayload) -> Result<CreatedTaskDto> {
        debug!(plan = %payload.plan_id, bucket = %payload.bucket_id, "creating task");
        self.client.post_json(token, "/planner/tasks", payload).await
    }

    async fn list_users(&self, token: &str) -> Result<Vec<DirectoryUser>> {
        let path = format!(
            "/users?$select=id,displayName,userPrincipalName&$top={}",
            self.user_page_size
        );
        let users: Vec<UserDto> = self.client.get_all(token, &path).await?;
        Ok(users.into_iter().map(DirectoryUser::from).collect())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
