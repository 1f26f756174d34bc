//! Manufacturing record and production-update types.
//!
//! A manufacturing record is created automatically the first time an order
//! reaches a production-bound status. Its own status tracks the six-stage
//! production pipeline, and every change is mirrored by an append-only
//! `ManufacturingUpdate` entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::UnknownValue;

/// Status of a manufacturing record in the production pipeline.
///
/// `Shipped` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ManufacturingStatus {
	/// Record created, awaiting acceptance by the manufacturer.
	New,
	/// Manufacturer accepted the job.
	Accepted,
	/// Production underway.
	InProduction,
	/// Quality control.
	Qc,
	/// Passed QC, packed and ready.
	ReadyToShip,
	/// Handed to the carrier.
	Shipped,
}

impl ManufacturingStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			ManufacturingStatus::New => "new",
			ManufacturingStatus::Accepted => "accepted",
			ManufacturingStatus::InProduction => "in_production",
			ManufacturingStatus::Qc => "qc",
			ManufacturingStatus::ReadyToShip => "ready_to_ship",
			ManufacturingStatus::Shipped => "shipped",
		}
	}

	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::New,
			Self::Accepted,
			Self::InProduction,
			Self::Qc,
			Self::ReadyToShip,
			Self::Shipped,
		]
		.into_iter()
	}
}

impl fmt::Display for ManufacturingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ManufacturingStatus {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownValue::new("manufacturing status", s))
	}
}

/// Production tracking record, at most one per order.
///
/// The order owns the relationship; deleting an order does not cascade to
/// its manufacturing record, removal is an explicit operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingRecord {
	/// Unique identifier for this record.
	pub id: Uuid,
	/// Order this record tracks production for.
	pub order_id: Uuid,
	/// Manufacturer assigned to the job, if any yet.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub manufacturer_id: Option<Uuid>,
	/// Current production status (kept in sync with the update log).
	pub status: ManufacturingStatus,
	/// Timestamp when this record was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this record was last updated.
	pub updated_at: DateTime<Utc>,
}

/// Append-only history entry attached to a manufacturing record.
///
/// An update whose status differs from the parent record's must be written
/// together with a matching update of the parent, so the log and the
/// record's headline status never diverge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturingUpdate {
	/// Unique identifier for this update.
	pub id: Uuid,
	/// Manufacturing record this update belongs to.
	pub record_id: Uuid,
	/// Status snapshot at the time of the update.
	pub status: ManufacturingStatus,
	/// Free-text notes from the acting user.
	pub notes: String,
	/// User who recorded the update.
	pub user_id: Uuid,
	/// Manufacturer the update was recorded on behalf of, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub manufacturer_id: Option<Uuid>,
	/// Timestamp when this update was recorded.
	pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_round_trips_through_strings() {
		for status in ManufacturingStatus::all() {
			assert_eq!(
				status.as_str().parse::<ManufacturingStatus>().unwrap(),
				status
			);
		}
	}

	#[test]
	fn unknown_status_is_rejected() {
		assert!("boxed".parse::<ManufacturingStatus>().is_err());
	}
}
