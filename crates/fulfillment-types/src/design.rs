//! Design job types and the design pipeline status vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::UnknownValue;

/// Status of a design job.
///
/// The main pipeline runs pending through completed; `OnHold` and
/// `Cancelled` are exception states reachable from several stages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DesignStatus {
	Pending,
	Assigned,
	InProgress,
	Review,
	NeedsRevision,
	Approved,
	Completed,
	OnHold,
	Cancelled,
}

impl DesignStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			DesignStatus::Pending => "pending",
			DesignStatus::Assigned => "assigned",
			DesignStatus::InProgress => "in_progress",
			DesignStatus::Review => "review",
			DesignStatus::NeedsRevision => "needs_revision",
			DesignStatus::Approved => "approved",
			DesignStatus::Completed => "completed",
			DesignStatus::OnHold => "on_hold",
			DesignStatus::Cancelled => "cancelled",
		}
	}

	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Pending,
			Self::Assigned,
			Self::InProgress,
			Self::Review,
			Self::NeedsRevision,
			Self::Approved,
			Self::Completed,
			Self::OnHold,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for DesignStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for DesignStatus {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownValue::new("design status", s))
	}
}

/// A design task attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DesignJob {
	/// Unique identifier for this job.
	pub id: Uuid,
	/// Order this design work is for.
	pub order_id: Uuid,
	/// Designer currently assigned, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub assignee_id: Option<Uuid>,
	/// Current pipeline status.
	pub status: DesignStatus,
	/// Short description of the requested artwork.
	pub brief: String,
	/// Timestamp when this job was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this job was last updated.
	pub updated_at: DateTime<Utc>,
}
