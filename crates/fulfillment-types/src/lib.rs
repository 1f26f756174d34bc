//! Common types module for the fulfillment workflow system.
//!
//! This module defines the core data types and structures shared by every
//! component of the order-fulfillment engine. Keeping them in one crate
//! ensures the workflow, access-control and storage layers all agree on
//! entity shapes and status vocabularies.

/// API types for HTTP endpoints and error envelopes.
pub mod api;
/// Design job types and the design pipeline status vocabulary.
pub mod design;
/// Invoice types generated by the billing side effect.
pub mod invoice;
/// Manufacturing record and production-update types.
pub mod manufacturing;
/// Order, line-item and order status types.
pub mod order;
/// Roles, resources, actions and user accounts.
pub mod role;
/// Workflow-level types: entity kinds, errors, outcomes, audit entries.
pub mod workflow;

// Re-export all types for convenient access
pub use api::*;
pub use design::*;
pub use invoice::*;
pub use manufacturing::*;
pub use order::*;
pub use role::*;
pub use workflow::*;
