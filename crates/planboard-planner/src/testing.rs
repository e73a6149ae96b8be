//! Hand-written fakes for the identity and task-system boundaries.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

use planboard_auth::{AccessToken, Account, AuthError, CredentialProvider, IdentityBoundary, ScopeSet};
use planboard_core::{Bucket, DirectoryUser, GroupId, Plan, PlanDetails, PlanId, Task};
use planboard_graph::wire::{CreatedTaskDto, MembershipDto};
use planboard_graph::{CreateTaskPayload, GraphError, PlannerApi};

pub(crate) fn account() -> Account {
    Account {
        home_account_id: "oid.tid".into(),
        username: "ada@contoso.com".into(),
        display_name: Some("Ada".into()),
        tenant_id: Some("tid".into()),
    }
}

/// Identity provider that hands out tokens, or fails both paths.
pub(crate) struct FakeIdentity {
    pub fail: bool,
    pub token_calls: AtomicUsize,
}

#[async_trait]
impl IdentityBoundary for FakeIdentity {
    fn active_account(&self) -> Option<Account> {
        Some(account())
    }

    async fn acquire_token_silent(
        &self,
        scopes: &ScopeSet,
        _account: &Account,
    ) -> Result<AccessToken, AuthError> {
        let _ = self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AuthError::InteractionRequired("expired".into()))
        } else {
            Ok(AccessToken::new("tok", scopes.clone(), Utc::now() + Duration::hours(1)))
        }
    }

    async fn acquire_token_interactive(
        &self,
        _scopes: &ScopeSet,
        _account: &Account,
    ) -> Result<AccessToken, AuthError> {
        Err(AuthError::AuthorizationDeclined)
    }

    async fn sign_in(&self, _scopes: &ScopeSet) -> Result<Account, AuthError> {
        Ok(account())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

pub(crate) fn credentials(fail: bool) -> (CredentialProvider, Arc<FakeIdentity>) {
    let idp = Arc::new(FakeIdentity {
        fail,
        token_calls: AtomicUsize::new(0),
    });
    let provider = CredentialProvider::new(
        Arc::clone(&idp) as Arc<dyn IdentityBoundary>,
        ScopeSet::new(["Tasks.ReadWrite"]),
    );
    (provider, idp)
}

fn boom() -> GraphError {
    GraphError::Api {
        status: 500,
        code: "InternalServerError".into(),
        message: "scripted failure".into(),
    }
}

fn scripted<T: Clone>(fail: bool, value: &T) -> Result<T, GraphError> {
    if fail { Err(boom()) } else { Ok(value.clone()) }
}

/// Scripted task-system API. Every call bumps `calls`.
#[derive(Default)]
pub(crate) struct FakeApi {
    pub my_plans: Vec<Plan>,
    pub fail_my_plans: bool,
    pub memberships: Vec<MembershipDto>,
    pub fail_memberships: bool,
    pub group_plans: HashMap<String, Vec<Plan>>,
    pub failing_groups: HashSet<String>,
    pub users: Vec<DirectoryUser>,
    pub fail_users: bool,
    pub tasks: Vec<Task>,
    pub fail_tasks: bool,
    pub buckets: Vec<Bucket>,
    pub fail_buckets: bool,
    pub details: Option<PlanDetails>,
    pub fail_create: bool,
    pub calls: AtomicUsize,
    pub created: Mutex<Vec<CreateTaskPayload>>,
}

impl FakeApi {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) fn plan(id: &str) -> Plan {
    Plan {
        id: PlanId::from(id),
        title: format!("Plan {id}"),
        owner_container_ref: None,
    }
}

pub(crate) fn group(id: &str) -> MembershipDto {
    MembershipDto {
        id: id.to_string(),
        odata_type: Some("#microsoft.graph.group".to_string()),
    }
}

#[async_trait]
impl PlannerApi for FakeApi {
    async fn list_my_plans(&self, _token: &str) -> planboard_graph::Result<Vec<Plan>> {
        self.bump();
        scripted(self.fail_my_plans, &self.my_plans)
    }

    async fn list_group_plans(
        &self,
        _token: &str,
        group: &GroupId,
    ) -> planboard_graph::Result<Vec<Plan>> {
        self.bump();
        let fail = self.failing_groups.contains(group.as_str());
        let plans = self.group_plans.get(group.as_str()).cloned().unwrap_or_default();
        scripted(fail, &plans)
    }

    async fn list_my_memberships(&self, _token: &str) -> planboard_graph::Result<Vec<MembershipDto>> {
        self.bump();
        scripted(self.fail_memberships, &self.memberships)
    }

    async fn list_buckets(&self, _token: &str, _plan: &PlanId) -> planboard_graph::Result<Vec<Bucket>> {
        self.bump();
        scripted(self.fail_buckets, &self.buckets)
    }

    async fn get_plan(&self, _token: &str, _plan: &PlanId) -> planboard_graph::Result<PlanDetails> {
        self.bump();
        self.details.clone().ok_or_else(boom)
    }

    async fn list_tasks(&self, _token: &str, _plan: &PlanId) -> planboard_graph::Result<Vec<Task>> {
        self.bump();
        scripted(self.fail_tasks, &self.tasks)
    }

    async fn create_task(
        &self,
        _token: &str,
        payload: &CreateTaskPayload,
    ) -> planboard_graph::Result<CreatedTaskDto> {
        self.bump();
        if self.fail_create {
            return Err(boom());
        }
        self.created.lock().push(payload.clone());
        Ok(CreatedTaskDto {
            id: "t-new".into(),
            title: Some(payload.title.clone()),
            plan_id: Some(payload.plan_id.to_string()),
            bucket_id: Some(payload.bucket_id.to_string()),
        })
    }

    async fn list_users(&self, _token: &str) -> planboard_graph::Result<Vec<DirectoryUser>> {
        self.bump();
        scripted(self.fail_users, &self.users)
    }
}
