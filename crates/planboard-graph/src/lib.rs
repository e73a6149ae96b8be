//! # planboard-graph
//!
//! The task-system boundary: Microsoft Graph's Planner, group-membership, and
//! user-directory endpoints.
//!
//! - [`GraphClient`]: bearer-authenticated JSON over `reqwest`, with a
//!   per-request timeout and Graph error-envelope decoding
//! - [`drain_pages`]: follows `@odata.nextLink` until the listing ends
//! - [`PlannerApi`]: the logical operations the orchestration layer consumes,
//!   implemented over Graph by [`GraphPlannerApi`]
//! - [`wire`]: Graph JSON shapes and their conversion into `planboard-core`
//!   domain types

#![deny(unsafe_code)]

pub mod api;
pub mod client;
pub mod errors;
pub mod paging;
pub mod wire;

pub use api::{GraphPlannerApi, PlannerApi};
pub use client::GraphClient;
pub use errors::{GraphError, Result};
pub use paging::{Page, drain_pages};
pub use wire::{Assignment, CreateTaskPayload, ORDER_HINT_SENTINEL, Recurrence};
