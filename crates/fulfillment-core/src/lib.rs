//! Core workflow engine for the fulfillment system.
//!
//! This crate owns the status-transition tables for orders, manufacturing
//! records and design jobs, and the orchestrator that drives transitions
//! through them: permission checks, precondition checks, the status commit,
//! best-effort side effects and audit recording, in that order.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{WorkflowOrchestrator, WorkflowSettings};
