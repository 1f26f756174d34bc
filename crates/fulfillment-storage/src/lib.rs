//! Storage module for the fulfillment workflow system.
//!
//! This module defines the narrow interfaces the workflow core uses to
//! reach persistence: an entity store for CRUD on workflow entities, a
//! user directory, an append-only activity recorder, and the
//! manufacturer-association lookup used for permission scoping. Concrete
//! backends implement these traits; the in-memory implementation doubles
//! as the development backend and the test fixture.

use async_trait::async_trait;
use fulfillment_types::{
	ActivityEntry, DesignJob, DesignStatus, Invoice, ManufacturingRecord, ManufacturingStatus,
	ManufacturingUpdate, Order, OrderLineItem, OrderStatus, Role, UserAccount,
};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// Error that occurs when a requested entity is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a write would violate a uniqueness rule.
	#[error("Conflict: {0}")]
	Conflict(String),
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
}

/// Trait defining CRUD persistence for workflow entities.
///
/// The workflow orchestrator is the only writer of status fields; handlers
/// and jobs go through it rather than calling these methods directly.
#[async_trait]
pub trait EntityStore: Send + Sync {
	/// Retrieves an order by id.
	async fn get_order(&self, id: Uuid) -> Result<Order, StoreError>;

	/// Creates a new order.
	async fn create_order(&self, order: Order) -> Result<Order, StoreError>;

	/// Sets an order's status, returning the updated order.
	async fn update_order_status(
		&self,
		id: Uuid,
		status: OrderStatus,
	) -> Result<Order, StoreError>;

	/// Lists the line items belonging to an order.
	async fn get_order_line_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>, StoreError>;

	/// Creates a line item.
	async fn create_line_item(&self, item: OrderLineItem) -> Result<OrderLineItem, StoreError>;

	/// Retrieves a manufacturing record by id.
	async fn get_manufacturing(&self, id: Uuid) -> Result<ManufacturingRecord, StoreError>;

	/// Retrieves the manufacturing record for an order, if one exists.
	async fn get_manufacturing_by_order(
		&self,
		order_id: Uuid,
	) -> Result<Option<ManufacturingRecord>, StoreError>;

	/// Creates a manufacturing record. At most one may exist per order.
	async fn create_manufacturing(
		&self,
		record: ManufacturingRecord,
	) -> Result<ManufacturingRecord, StoreError>;

	/// Sets a manufacturing record's status, returning the updated record.
	async fn update_manufacturing_status(
		&self,
		id: Uuid,
		status: ManufacturingStatus,
	) -> Result<ManufacturingRecord, StoreError>;

	/// Appends a manufacturing update entry.
	async fn create_manufacturing_update(
		&self,
		update: ManufacturingUpdate,
	) -> Result<ManufacturingUpdate, StoreError>;

	/// Lists the update history for a manufacturing record, oldest first.
	async fn get_manufacturing_updates(
		&self,
		record_id: Uuid,
	) -> Result<Vec<ManufacturingUpdate>, StoreError>;

	/// Retrieves a design job by id.
	async fn get_design_job(&self, id: Uuid) -> Result<DesignJob, StoreError>;

	/// Creates a design job.
	async fn create_design_job(&self, job: DesignJob) -> Result<DesignJob, StoreError>;

	/// Sets a design job's status, returning the updated job.
	async fn update_design_job_status(
		&self,
		id: Uuid,
		status: DesignStatus,
	) -> Result<DesignJob, StoreError>;

	/// Lists the invoices generated for an order.
	async fn get_invoices_by_order(&self, order_id: Uuid) -> Result<Vec<Invoice>, StoreError>;

	/// Creates an invoice.
	async fn create_invoice(&self, invoice: Invoice) -> Result<Invoice, StoreError>;
}

/// Trait defining lookups and mutations on user accounts.
///
/// Split out from [`EntityStore`] because only the permission layer and
/// the user-removal operation need it.
#[async_trait]
pub trait UserDirectory: Send + Sync {
	/// Retrieves a user by id.
	async fn get_user(&self, id: Uuid) -> Result<UserAccount, StoreError>;

	/// Counts the accounts holding the given role.
	async fn count_with_role(&self, role: Role) -> Result<usize, StoreError>;

	/// Deletes a user account.
	async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Trait defining the append-only audit log.
///
/// Recording is fire-and-forget from the orchestrator's perspective, but
/// implementations must not silently drop persistent failures; the caller
/// logs every error it gets back.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
	/// Appends one audit entry.
	async fn record(&self, entry: ActivityEntry) -> Result<(), StoreError>;
}

/// Trait resolving which manufacturers a user is associated with.
///
/// Used only by the permission gate for the manufacturer role. An empty
/// set means the user can see no manufacturing records at all.
#[async_trait]
pub trait AssociationLookup: Send + Sync {
	/// Returns the manufacturer ids the user may act for.
	async fn manufacturer_ids_for(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError>;
}
