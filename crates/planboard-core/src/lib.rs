//! # planboard-core
//!
//! Shared vocabulary for the planboard crates:
//!
//! - **Branded IDs**: `PlanId`, `BucketId`, `TaskId`, `UserId`, `GroupId`
//!   as newtypes so a bucket ID cannot be passed where a plan ID is expected
//! - **Domain types**: [`Plan`], [`Bucket`], [`DirectoryUser`], [`Task`] as
//!   read from the task system, and the derived [`ViewTask`]
//! - **Field encodings**: [`Progress`], [`Priority`], [`Label`] and the exact
//!   integer / category-key values the task system expects
//! - **Logging**: `tracing` subscriber bootstrap and test capture utilities

#![deny(unsafe_code)]

pub mod encoding;
pub mod ids;
pub mod logging;
pub mod types;

pub use encoding::{Label, Priority, Progress, category_flags, priority_display};
pub use ids::{BucketId, GroupId, PlanId, TaskId, UserId};
pub use types::{
    Bucket, CategoryKey, DirectoryUser, Plan, PlanDetails, Task, UNCATEGORIZED_BUCKET, UNNAMED_PLAN,
    UNTITLED_TASK, ViewTask, completion_rate,
};
