//! Role/resource/action permission gate with instance-level scoping.
//!
//! The matrix below is the full authorization surface. Resource-level
//! checks are pure lookups against a static table; instance-level checks
//! add ownership scoping for the sales role and association scoping for
//! the manufacturer role.

use fulfillment_storage::{AssociationLookup, StoreError};
use fulfillment_types::{Action, ManufacturingRecord, Order, Resource, Role, UserAccount};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors produced by the permission gate.
#[derive(Debug, Error)]
pub enum AccessError {
	/// The actor may not perform this action. The entity exists; this is
	/// never conflated with a missing entity.
	#[error("forbidden: {0}")]
	Forbidden(String),
	/// The action would violate a structural invariant.
	#[error("conflict: {0}")]
	Conflict(String),
	/// The association lookup failed.
	#[error("association lookup failed: {0}")]
	Lookup(String),
}

impl From<StoreError> for AccessError {
	fn from(err: StoreError) -> Self {
		AccessError::Lookup(err.to_string())
	}
}

impl From<AccessError> for fulfillment_types::WorkflowError {
	fn from(err: AccessError) -> Self {
		use fulfillment_types::WorkflowError;
		match err {
			AccessError::Forbidden(msg) => WorkflowError::Forbidden(msg),
			AccessError::Conflict(msg) => WorkflowError::Conflict(msg),
			AccessError::Lookup(msg) => WorkflowError::Store(msg),
		}
	}
}

/// Static permission matrix: which actions each role may take per resource.
///
/// Instance-level scoping (ownership, manufacturer association) is layered
/// on top of this table, never instead of it.
static MATRIX: Lazy<HashMap<(Role, Resource), HashSet<Action>>> = Lazy::new(|| {
	use Action::{Delete, Read, Write};

	let mut m: HashMap<(Role, Resource), HashSet<Action>> = HashMap::new();
	let mut grant = |role: Role, resource: Resource, actions: &[Action]| {
		m.insert((role, resource), actions.iter().copied().collect());
	};

	// Admin: everything.
	for resource in [
		Resource::Orders,
		Resource::LineItems,
		Resource::Manufacturing,
		Resource::DesignJobs,
		Resource::Invoices,
		Resource::Users,
		Resource::Activity,
	] {
		grant(Role::Admin, resource, &[Read, Write, Delete]);
	}

	// Ops: full access to workflow entities, read-only on users.
	for resource in [
		Resource::Orders,
		Resource::LineItems,
		Resource::Manufacturing,
		Resource::DesignJobs,
		Resource::Invoices,
	] {
		grant(Role::Ops, resource, &[Read, Write, Delete]);
	}
	grant(Role::Ops, Resource::Users, &[Read]);
	grant(Role::Ops, Resource::Activity, &[Read]);

	// Sales: works its own book; instance checks scope it further.
	grant(Role::Sales, Resource::Orders, &[Read, Write]);
	grant(Role::Sales, Resource::LineItems, &[Read, Write]);
	grant(Role::Sales, Resource::DesignJobs, &[Read]);
	grant(Role::Sales, Resource::Invoices, &[Read]);
	grant(Role::Sales, Resource::Activity, &[Read]);

	// Designer: owns design jobs, may look at the orders behind them.
	grant(Role::Designer, Resource::DesignJobs, &[Read, Write]);
	grant(Role::Designer, Resource::Orders, &[Read]);
	grant(Role::Designer, Resource::Activity, &[Read]);

	// Manufacturer: production records only, plus redacted order reads.
	grant(Role::Manufacturer, Resource::Manufacturing, &[Read, Write]);
	grant(Role::Manufacturer, Resource::Orders, &[Read]);

	// Finance: reads everything, writes invoices.
	for resource in [
		Resource::Orders,
		Resource::LineItems,
		Resource::Manufacturing,
		Resource::DesignJobs,
		Resource::Activity,
	] {
		grant(Role::Finance, resource, &[Read]);
	}
	grant(Role::Finance, Resource::Invoices, &[Read, Write]);

	m
});

/// Resolves whether a role/resource/action triple is allowed.
///
/// Absent entries deny; a role never gains access by omission.
pub fn allows(role: Role, resource: Resource, action: Action) -> bool {
	MATRIX
		.get(&(role, resource))
		.is_some_and(|actions| actions.contains(&action))
}

/// Permission gate combining the static matrix with instance scoping.
pub struct PermissionGate {
	associations: Arc<dyn AssociationLookup>,
}

impl PermissionGate {
	pub fn new(associations: Arc<dyn AssociationLookup>) -> Self {
		Self { associations }
	}

	/// Resource-level check; the first gate every request passes.
	pub fn require(
		&self,
		role: Role,
		resource: Resource,
		action: Action,
	) -> Result<(), AccessError> {
		if allows(role, resource, action) {
			Ok(())
		} else {
			Err(AccessError::Forbidden(format!(
				"role {} may not {:?} {}",
				role,
				action,
				resource.as_str()
			)))
		}
	}

	/// Instance-level check for a specific order.
	///
	/// Admin and ops bypass ownership scoping. Sales may only touch orders
	/// whose salesperson is the requester.
	pub fn check_order_access(
		&self,
		actor: &UserAccount,
		order: &Order,
		action: Action,
	) -> Result<(), AccessError> {
		self.require(actor.role, Resource::Orders, action)?;
		match actor.role {
			Role::Admin | Role::Ops => Ok(()),
			Role::Sales => {
				if order.salesperson_id == actor.id {
					Ok(())
				} else {
					Err(AccessError::Forbidden(
						"order belongs to another salesperson".to_string(),
					))
				}
			}
			_ => Ok(()),
		}
	}

	/// Instance-level check for a manufacturing record.
	///
	/// Manufacturer-role users are limited to records whose manufacturer is
	/// in their association set; an empty set denies everything.
	pub async fn check_manufacturing_access(
		&self,
		actor: &UserAccount,
		record: &ManufacturingRecord,
		action: Action,
	) -> Result<(), AccessError> {
		self.require(actor.role, Resource::Manufacturing, action)?;
		if actor.role != Role::Manufacturer {
			return Ok(());
		}

		let associated = self.associations.manufacturer_ids_for(actor.id).await?;
		let permitted = record
			.manufacturer_id
			.map(|id| associated.contains(&id))
			.unwrap_or(false);
		if permitted {
			Ok(())
		} else {
			Err(AccessError::Forbidden(
				"record belongs to an unassociated manufacturer".to_string(),
			))
		}
	}

	/// Guards user deletion and demotion.
	///
	/// At least one admin must exist at all times, and admins may not
	/// remove their own account.
	pub fn guard_user_removal(
		&self,
		actor: &UserAccount,
		target: &UserAccount,
		admin_count: usize,
	) -> Result<(), AccessError> {
		self.require(actor.role, Resource::Users, Action::Delete)?;
		if target.role == Role::Admin && admin_count <= 1 {
			return Err(AccessError::Conflict(
				"cannot remove the last remaining admin".to_string(),
			));
		}
		if target.role == Role::Admin && actor.id == target.id {
			return Err(AccessError::Conflict(
				"admins cannot remove their own account".to_string(),
			));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use chrono::Utc;
	use fulfillment_types::{ManufacturingStatus, OrderPriority, OrderStatus};
	use uuid::Uuid;

	struct FixedAssociations(HashSet<Uuid>);

	#[async_trait]
	impl AssociationLookup for FixedAssociations {
		async fn manufacturer_ids_for(&self, _user_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
			Ok(self.0.clone())
		}
	}

	fn gate_with(ids: HashSet<Uuid>) -> PermissionGate {
		PermissionGate::new(Arc::new(FixedAssociations(ids)))
	}

	fn order_owned_by(salesperson_id: Uuid) -> Order {
		let now = Utc::now();
		Order {
			id: Uuid::new_v4(),
			org_id: Uuid::new_v4(),
			salesperson_id,
			status: OrderStatus::Draft,
			priority: OrderPriority::Normal,
			rush: false,
			created_at: now,
			updated_at: now,
		}
	}

	fn record_for(manufacturer_id: Option<Uuid>) -> ManufacturingRecord {
		let now = Utc::now();
		ManufacturingRecord {
			id: Uuid::new_v4(),
			order_id: Uuid::new_v4(),
			manufacturer_id,
			status: ManufacturingStatus::New,
			created_at: now,
			updated_at: now,
		}
	}

	#[test]
	fn matrix_denies_by_omission() {
		assert!(allows(Role::Admin, Resource::Users, Action::Delete));
		assert!(!allows(Role::Sales, Resource::Users, Action::Read));
		assert!(!allows(Role::Manufacturer, Resource::Invoices, Action::Read));
		assert!(!allows(Role::Designer, Resource::Orders, Action::Write));
	}

	#[test]
	fn sales_cannot_touch_another_reps_order() {
		let gate = gate_with(HashSet::new());
		let rep = UserAccount::new(Uuid::new_v4(), "rep", Role::Sales);
		let foreign = order_owned_by(Uuid::new_v4());

		let err = gate
			.check_order_access(&rep, &foreign, Action::Read)
			.unwrap_err();
		assert!(matches!(err, AccessError::Forbidden(_)));

		let own = order_owned_by(rep.id);
		gate.check_order_access(&rep, &own, Action::Write).unwrap();
	}

	#[test]
	fn admin_and_ops_bypass_ownership() {
		let gate = gate_with(HashSet::new());
		let foreign = order_owned_by(Uuid::new_v4());
		for role in [Role::Admin, Role::Ops] {
			let actor = UserAccount::new(Uuid::new_v4(), "staff", role);
			gate.check_order_access(&actor, &foreign, Action::Read)
				.unwrap();
		}
	}

	#[tokio::test]
	async fn manufacturer_needs_a_matching_association() {
		let manufacturer_id = Uuid::new_v4();
		let actor = UserAccount::new(Uuid::new_v4(), "mfg", Role::Manufacturer);

		// Associated: allowed.
		let gate = gate_with(HashSet::from([manufacturer_id]));
		gate.check_manufacturing_access(&actor, &record_for(Some(manufacturer_id)), Action::Read)
			.await
			.unwrap();

		// Different manufacturer on the record: denied.
		let err = gate
			.check_manufacturing_access(&actor, &record_for(Some(Uuid::new_v4())), Action::Read)
			.await
			.unwrap_err();
		assert!(matches!(err, AccessError::Forbidden(_)));

		// Empty association set: denied.
		let gate = gate_with(HashSet::new());
		let err = gate
			.check_manufacturing_access(&actor, &record_for(Some(manufacturer_id)), Action::Read)
			.await
			.unwrap_err();
		assert!(matches!(err, AccessError::Forbidden(_)));

		// Record with no manufacturer assigned yet: denied.
		let gate = gate_with(HashSet::from([manufacturer_id]));
		let err = gate
			.check_manufacturing_access(&actor, &record_for(None), Action::Read)
			.await
			.unwrap_err();
		assert!(matches!(err, AccessError::Forbidden(_)));
	}

	#[test]
	fn last_admin_cannot_be_removed() {
		let gate = gate_with(HashSet::new());
		let admin = UserAccount::new(Uuid::new_v4(), "root", Role::Admin);
		let other_admin = UserAccount::new(Uuid::new_v4(), "backup", Role::Admin);

		let err = gate.guard_user_removal(&admin, &other_admin, 1).unwrap_err();
		assert!(matches!(err, AccessError::Conflict(_)));

		// Two admins: removing the other one is fine.
		gate.guard_user_removal(&admin, &other_admin, 2).unwrap();

		// Self-removal is a conflict even with admins to spare.
		let err = gate.guard_user_removal(&admin, &admin, 3).unwrap_err();
		assert!(matches!(err, AccessError::Conflict(_)));

		// Non-admin targets are unaffected by the safeguard.
		let rep = UserAccount::new(Uuid::new_v4(), "rep", Role::Sales);
		gate.guard_user_removal(&admin, &rep, 1).unwrap();
	}
}
