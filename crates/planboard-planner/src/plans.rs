//! Plan listing with cross-source deduplication and a process-lifetime cache.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use planboard_auth::{Account, CredentialProvider};
use planboard_core::{GroupId, Plan};
use planboard_graph::PlannerApi;
use planboard_graph::wire::MembershipDto;

use crate::errors::Result;

/// Process-lifetime store for the plan list.
///
/// Written at most once: the first non-empty store wins, later stores are
/// ignored. There is no invalidation.
#[derive(Debug, Default)]
pub struct PlanCache {
    plans: RwLock<Option<Vec<Plan>>>,
}

impl PlanCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached plans, if populated.
    pub fn get(&self) -> Option<Vec<Plan>> {
        self.plans.read().clone()
    }

    /// Populate the cache. Returns `false` if it was already populated or
    /// `plans` is empty.
    pub fn store(&self, plans: Vec<Plan>) -> bool {
        if plans.is_empty() {
            return false;
        }
        let mut slot = self.plans.write();
        if slot.is_some() {
            return false;
        }
        *slot = Some(plans);
        true
    }

    /// Whether the cache holds plans.
    pub fn is_populated(&self) -> bool {
        self.plans.read().is_some()
    }
}

/// How a [`PlanListing`] was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingStatus {
    /// Fetched now; both top-level sources answered.
    Fresh,
    /// Served from the cache without remote calls.
    Cached,
    /// One of the two top-level sources failed; the list is partial.
    Degraded,
    /// Both top-level sources failed; the list is empty.
    Unavailable,
}

/// Plans visible to the account.
#[derive(Clone, Debug)]
pub struct PlanListing {
    /// Deduplicated plans, direct plans first.
    pub plans: Vec<Plan>,
    /// Provenance.
    pub status: ListingStatus,
}

/// Deduplicate by ID, keeping first-seen order.
pub fn dedup_by_id(plans: impl IntoIterator<Item = Plan>) -> Vec<Plan> {
    let mut seen = HashSet::new();
    plans
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect()
}

/// Lists plans from the account's own plans and its groups' plans.
pub struct PlanRepository {
    api: Arc<dyn PlannerApi>,
    credentials: CredentialProvider,
    cache: Arc<PlanCache>,
}

impl PlanRepository {
    /// Create a repository over an injected cache.
    pub fn new(
        api: Arc<dyn PlannerApi>,
        credentials: CredentialProvider,
        cache: Arc<PlanCache>,
    ) -> Self {
        Self {
            api,
            credentials,
            cache,
        }
    }

    /// List plans for `account`.
    ///
    /// Remote failures never fail the call: they are reflected in
    /// [`PlanListing::status`]. Token acquisition failures do propagate.
    #[tracing::instrument(skip_all, fields(account = %account.username))]
    pub async fn list_plans(&self, account: &Account) -> Result<PlanListing> {
        if let Some(plans) = self.cache.get() {
            debug!(count = plans.len(), "serving plans from cache");
            return Ok(PlanListing {
                plans,
                status: ListingStatus::Cached,
            });
        }

        let token = self.credentials.acquire_default_token(account).await?;
        let token = token.secret();

        let (direct, memberships) = tokio::join!(
            self.api.list_my_plans(token),
            self.api.list_my_memberships(token),
        );

        let direct_ok = direct.is_ok();
        let memberships_ok = memberships.is_ok();

        let direct = direct.unwrap_or_else(|e| {
            warn!(error = %e, "direct plan listing failed");
            Vec::new()
        });
        let groups: Vec<GroupId> = match memberships {
            Ok(entries) => entries.iter().filter_map(MembershipDto::group_id).collect(),
            Err(e) => {
                warn!(error = %e, "membership listing failed");
                Vec::new()
            }
        };

        let group_plans = join_all(groups.iter().map(|group| async move {
            match self.api.list_group_plans(token, group).await {
                Ok(plans) => plans,
                Err(e) => {
                    warn!(group = %group, error = %e, "group plan listing failed, skipping group");
                    Vec::new()
                }
            }
        }))
        .await;

        let plans = dedup_by_id(direct.into_iter().chain(group_plans.into_iter().flatten()));
        let status = match (direct_ok, memberships_ok) {
            (true, true) => ListingStatus::Fresh,
            (false, false) => ListingStatus::Unavailable,
            _ => ListingStatus::Degraded,
        };

        if status == ListingStatus::Fresh && self.cache.store(plans.clone()) {
            info!(count = plans.len(), groups = groups.len(), "plan cache populated");
        }

        Ok(PlanListing { plans, status })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
