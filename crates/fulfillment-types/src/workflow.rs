//! Workflow-level types: entity kinds, the error taxonomy, transition
//! outcomes and audit-log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when a closed string vocabulary is given a name outside
/// of it. Unknown names are always rejected, never treated as a default.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownValue {
	/// Which vocabulary was being parsed.
	pub kind: &'static str,
	/// The offending input.
	pub value: String,
}

impl UnknownValue {
	pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
		Self {
			kind,
			value: value.into(),
		}
	}
}

/// Kinds of entity the workflow layer acts on.
///
/// Order, manufacturing and design jobs each have their own status
/// vocabulary and their own transition table; they are deliberately not
/// unified into one generic graph. `User` exists for audit entries and
/// lookups only, it has no lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
	Order,
	Manufacturing,
	DesignJob,
	User,
}

impl EntityType {
	pub fn as_str(&self) -> &'static str {
		match self {
			EntityType::Order => "order",
			EntityType::Manufacturing => "manufacturing",
			EntityType::DesignJob => "design_job",
			EntityType::User => "user",
		}
	}
}

impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for EntityType {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"order" => Ok(Self::Order),
			"manufacturing" => Ok(Self::Manufacturing),
			"design_job" => Ok(Self::DesignJob),
			"user" => Ok(Self::User),
			other => Err(UnknownValue::new("entity type", other)),
		}
	}
}

/// Errors surfaced by the workflow orchestrator.
///
/// `Forbidden` and `NotFound` are distinct on purpose: an existing entity
/// the caller may not touch is never reported as missing.
#[derive(Debug, Error)]
pub enum WorkflowError {
	/// The entity id does not exist.
	#[error("{entity} not found: {id}")]
	NotFound { entity: EntityType, id: Uuid },
	/// The permission gate denied access to an existing entity.
	#[error("forbidden: {0}")]
	Forbidden(String),
	/// The requested status is not reachable from the current status.
	#[error("invalid {entity} transition from {from} to {to}")]
	InvalidTransition {
		entity: EntityType,
		from: String,
		to: String,
	},
	/// The transition is graph-legal but a business precondition is unmet.
	#[error("precondition failed: {0}")]
	PreconditionFailed(String),
	/// A structural invariant would be violated.
	#[error("conflict: {0}")]
	Conflict(String),
	/// The entity store failed.
	#[error("store error: {0}")]
	Store(String),
}

/// Result of a successful transition.
///
/// Side effects run best-effort after the status commit; each failure is
/// surfaced here as a warning rather than rolling the commit back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome<T> {
	/// The entity after the transition.
	pub entity: T,
	/// Human-readable descriptions of side effects that failed.
	pub warnings: Vec<String>,
}

impl<T> TransitionOutcome<T> {
	pub fn clean(entity: T) -> Self {
		Self {
			entity,
			warnings: Vec::new(),
		}
	}
}

/// One append-only audit-log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
	/// User the mutation is attributed to.
	pub actor_id: Uuid,
	/// Kind of entity that changed.
	pub entity_type: EntityType,
	/// Id of the entity that changed.
	pub entity_id: Uuid,
	/// What happened, e.g. "updated" or "deleted".
	pub action: String,
	/// Snapshot of the entity before the mutation.
	pub before: serde_json::Value,
	/// Snapshot of the entity after the mutation.
	pub after: serde_json::Value,
	/// Timestamp when the entry was recorded.
	pub recorded_at: DateTime<Utc>,
}
