//! # planboard-planner
//!
//! Orchestration of remote calls into the views the screens show:
//!
//! - [`PlanRepository`]: plans visible to the account, deduplicated across
//!   direct and group sources, cached in an injected [`PlanCache`]
//! - [`TaskAggregator`]: one plan's tasks joined with buckets, plan
//!   metadata, and the user directory; every sub-fetch degrades on its own
//! - [`TaskWriter`]: validation and field translation for new tasks
//! - [`resolve_route`]: which screen an account may see
//!
//! All three take a [`CredentialProvider`](planboard_auth::CredentialProvider)
//! and an `Arc<dyn PlannerApi>`, so tests can substitute either side.

#![deny(unsafe_code)]

pub mod dashboard;
pub mod errors;
pub mod plans;
pub mod routing;
pub mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use dashboard::{Dashboard, DataSource, TaskAggregator, build_view_tasks};
pub use errors::{PlannerError, Result};
pub use plans::{ListingStatus, PlanCache, PlanListing, PlanRepository, dedup_by_id};
pub use routing::{Route, Screen, resolve_path, resolve_route};
pub use writer::{
    CreatedTask, TaskDraft, TaskFormOptions, TaskWriter, ValidDraft, build_payload, validate,
    validate_fields,
};
