//! Access control for the fulfillment workflow system.
//!
//! This crate is the single place where role-based decisions are made:
//! the permission gate resolves (role, resource, action) triples and
//! instance-level ownership scoping, and the financial redactor strips
//! monetary fields from payloads handed to restricted roles. Handlers
//! never re-derive scoping logic themselves.

pub mod gate;
pub mod redactor;

pub use gate::{AccessError, PermissionGate};
pub use redactor::FinancialRedactor;
