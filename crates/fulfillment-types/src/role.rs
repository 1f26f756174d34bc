//! Role and permission vocabulary for the fulfillment system.
//!
//! Roles are a closed enumeration; every inbound request resolves to exactly
//! one role before it reaches the workflow layer. Resources and actions form
//! the axes of the permission matrix evaluated by the access crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::UnknownValue;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Full access, including user administration.
	Admin,
	/// Owns leads, quotes and orders; scoped to its own salesperson id.
	Sales,
	/// Operations staff; reads and writes everything except user accounts.
	Ops,
	/// Works design jobs; reads the orders they belong to.
	Designer,
	/// External production partner; sees only associated manufacturing
	/// records and financially redacted order data.
	Manufacturer,
	/// Reads everything, writes invoices.
	Finance,
}

impl Role {
	/// Returns the wire-format name of the role.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Admin => "admin",
			Role::Sales => "sales",
			Role::Ops => "ops",
			Role::Designer => "designer",
			Role::Manufacturer => "manufacturer",
			Role::Finance => "finance",
		}
	}

	/// Returns an iterator over all Role variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Admin,
			Self::Sales,
			Self::Ops,
			Self::Designer,
			Self::Manufacturer,
			Self::Finance,
		]
		.into_iter()
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Self::Admin),
			"sales" => Ok(Self::Sales),
			"ops" => Ok(Self::Ops),
			"designer" => Ok(Self::Designer),
			"manufacturer" => Ok(Self::Manufacturer),
			"finance" => Ok(Self::Finance),
			other => Err(UnknownValue::new("role", other)),
		}
	}
}

/// Resource classes the permission matrix is keyed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
	Orders,
	LineItems,
	Manufacturing,
	DesignJobs,
	Invoices,
	Users,
	Activity,
}

impl Resource {
	pub fn as_str(&self) -> &'static str {
		match self {
			Resource::Orders => "orders",
			Resource::LineItems => "line_items",
			Resource::Manufacturing => "manufacturing",
			Resource::DesignJobs => "design_jobs",
			Resource::Invoices => "invoices",
			Resource::Users => "users",
			Resource::Activity => "activity",
		}
	}
}

/// Actions a role may perform on a resource.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Read,
	Write,
	Delete,
}

/// A resolved user identity acting on the system.
///
/// The account carries everything the permission gate needs: the role and
/// the id used for ownership scoping. Authentication happens upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserAccount {
	/// Unique identifier for this user.
	pub id: Uuid,
	/// Display name for audit entries.
	pub display_name: String,
	/// Role assigned to this account.
	pub role: Role,
}

impl UserAccount {
	pub fn new(id: Uuid, display_name: impl Into<String>, role: Role) -> Self {
		Self {
			id,
			display_name: display_name.into(),
			role,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn role_round_trips_through_strings() {
		for role in Role::all() {
			assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
		}
	}

	#[test]
	fn unknown_role_is_rejected() {
		assert!("superuser".parse::<Role>().is_err());
	}
}
