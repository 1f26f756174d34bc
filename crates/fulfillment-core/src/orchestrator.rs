//! Workflow orchestrator: the single authority for executing a status
//! change safely.
//!
//! Every transition follows the same sequence: load the entity, pass the
//! permission gate, short-circuit same-status resubmits, validate the edge
//! against the transition table, evaluate business preconditions, persist
//! the new status, run post-transition side effects, and append an audit
//! entry.
//!
//! Side effects (manufacturing-record and invoice auto-creation) run
//! best-effort after the status commit. A failed side effect never rolls
//! the commit back; it is converted into a warning on the outcome and
//! logged. The steps are not wrapped in one transaction, and the store is
//! relied upon for last-writer-wins semantics between concurrent calls.

use chrono::{Duration, Utc};
use fulfillment_access::PermissionGate;
use fulfillment_storage::{ActivityRecorder, EntityStore, StoreError, UserDirectory};
use fulfillment_types::{
	order_subtotal, ActivityEntry, Action, DesignJob, DesignStatus, EntityType, Invoice,
	InvoiceStatus, ManufacturingRecord, ManufacturingStatus, ManufacturingUpdate, Order,
	OrderLineItem, OrderStatus, Resource, Role, TransitionOutcome, UserAccount, WorkflowError,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::state;

/// Tunables for the billing side effect.
#[derive(Debug, Clone)]
pub struct WorkflowSettings {
	/// Tax rate applied to generated invoices (fraction, not percent).
	pub tax_rate: Decimal,
	/// Days between an invoice's issue date and its due date.
	pub invoice_due_days: i64,
}

impl Default for WorkflowSettings {
	fn default() -> Self {
		Self {
			tax_rate: Decimal::ZERO,
			invoice_due_days: 30,
		}
	}
}

/// Orchestrates status changes across orders, manufacturing records and
/// design jobs.
///
/// Request-scoped and stateless between invocations; the only shared data
/// are the static transition tables.
pub struct WorkflowOrchestrator {
	store: Arc<dyn EntityStore>,
	users: Arc<dyn UserDirectory>,
	recorder: Arc<dyn ActivityRecorder>,
	gate: PermissionGate,
	settings: WorkflowSettings,
}

impl WorkflowOrchestrator {
	pub fn new(
		store: Arc<dyn EntityStore>,
		users: Arc<dyn UserDirectory>,
		recorder: Arc<dyn ActivityRecorder>,
		gate: PermissionGate,
		settings: WorkflowSettings,
	) -> Self {
		Self {
			store,
			users,
			recorder,
			gate,
			settings,
		}
	}

	/// Applies a requested status change to an order.
	#[instrument(skip(self, actor), fields(order_id = %id, actor_id = %actor.id, to = %requested))]
	pub async fn transition_order(
		&self,
		id: Uuid,
		requested: OrderStatus,
		actor: &UserAccount,
	) -> Result<TransitionOutcome<Order>, WorkflowError> {
		let order = self
			.store
			.get_order(id)
			.await
			.map_err(missing(EntityType::Order, id))?;
		self.gate.check_order_access(actor, &order, Action::Write)?;

		// Idempotent resubmission of the current status is not an error.
		if order.status == requested {
			return Ok(TransitionOutcome::clean(order));
		}

		if !state::order::is_valid_transition(order.status, requested) {
			return Err(WorkflowError::InvalidTransition {
				entity: EntityType::Order,
				from: order.status.to_string(),
				to: requested.to_string(),
			});
		}

		let line_items = self
			.store
			.get_order_line_items(id)
			.await
			.map_err(store_error)?;
		check_order_preconditions(requested, &line_items)?;

		let before = snapshot(&order);
		let updated = self
			.store
			.update_order_status(id, requested)
			.await
			.map_err(store_error)?;

		let mut warnings = Vec::new();
		self.run_order_side_effects(&updated, &line_items, &mut warnings)
			.await;

		self.record_activity(actor, EntityType::Order, id, "updated", before, snapshot(&updated))
			.await;

		Ok(TransitionOutcome {
			entity: updated,
			warnings,
		})
	}

	/// Applies a requested status change to a manufacturing record.
	///
	/// The status change is mirrored into the append-only update log so
	/// the record's headline status and its history never diverge.
	#[instrument(skip(self, actor), fields(record_id = %id, actor_id = %actor.id, to = %requested))]
	pub async fn transition_manufacturing(
		&self,
		id: Uuid,
		requested: ManufacturingStatus,
		actor: &UserAccount,
	) -> Result<TransitionOutcome<ManufacturingRecord>, WorkflowError> {
		let record = self
			.store
			.get_manufacturing(id)
			.await
			.map_err(missing(EntityType::Manufacturing, id))?;
		self.gate
			.check_manufacturing_access(actor, &record, Action::Write)
			.await?;

		if record.status == requested {
			return Ok(TransitionOutcome::clean(record));
		}

		if !state::manufacturing::is_valid_transition(record.status, requested) {
			return Err(WorkflowError::InvalidTransition {
				entity: EntityType::Manufacturing,
				from: record.status.to_string(),
				to: requested.to_string(),
			});
		}

		let before = snapshot(&record);
		let updated = self
			.store
			.update_manufacturing_status(id, requested)
			.await
			.map_err(store_error)?;

		let mut warnings = Vec::new();
		let entry = ManufacturingUpdate {
			id: Uuid::new_v4(),
			record_id: id,
			status: requested,
			notes: String::new(),
			user_id: actor.id,
			manufacturer_id: record.manufacturer_id,
			created_at: Utc::now(),
		};
		if let Err(err) = self.store.create_manufacturing_update(entry).await {
			let reason = format!("failed to append manufacturing update: {}", err);
			tracing::warn!(record_id = %id, %reason, "side effect failed");
			warnings.push(reason);
		}

		self.record_activity(
			actor,
			EntityType::Manufacturing,
			id,
			"updated",
			before,
			snapshot(&updated),
		)
		.await;

		Ok(TransitionOutcome {
			entity: updated,
			warnings,
		})
	}

	/// Applies a requested status change to a design job.
	#[instrument(skip(self, actor), fields(job_id = %id, actor_id = %actor.id, to = %requested))]
	pub async fn transition_design_job(
		&self,
		id: Uuid,
		requested: DesignStatus,
		actor: &UserAccount,
	) -> Result<TransitionOutcome<DesignJob>, WorkflowError> {
		let job = self
			.store
			.get_design_job(id)
			.await
			.map_err(missing(EntityType::DesignJob, id))?;
		self.gate
			.require(actor.role, Resource::DesignJobs, Action::Write)?;

		if job.status == requested {
			return Ok(TransitionOutcome::clean(job));
		}

		if !state::design::is_valid_transition(job.status, requested) {
			return Err(WorkflowError::InvalidTransition {
				entity: EntityType::DesignJob,
				from: job.status.to_string(),
				to: requested.to_string(),
			});
		}

		let before = snapshot(&job);
		let updated = self
			.store
			.update_design_job_status(id, requested)
			.await
			.map_err(store_error)?;

		self.record_activity(
			actor,
			EntityType::DesignJob,
			id,
			"updated",
			before,
			snapshot(&updated),
		)
		.await;

		Ok(TransitionOutcome::clean(updated))
	}

	/// Records a production update against a manufacturing record.
	///
	/// An update whose status differs from the record's current status also
	/// updates the parent record, in the same call, after the transition
	/// table has validated the move. The log and the headline status never
	/// disagree.
	#[instrument(skip(self, actor, notes), fields(record_id = %record_id, actor_id = %actor.id))]
	pub async fn record_manufacturing_update(
		&self,
		record_id: Uuid,
		status: ManufacturingStatus,
		notes: String,
		actor: &UserAccount,
		manufacturer_id: Option<Uuid>,
	) -> Result<ManufacturingUpdate, WorkflowError> {
		let record = self
			.store
			.get_manufacturing(record_id)
			.await
			.map_err(missing(EntityType::Manufacturing, record_id))?;
		self.gate
			.check_manufacturing_access(actor, &record, Action::Write)
			.await?;

		let changes_status = status != record.status;
		if changes_status && !state::manufacturing::is_valid_transition(record.status, status) {
			return Err(WorkflowError::InvalidTransition {
				entity: EntityType::Manufacturing,
				from: record.status.to_string(),
				to: status.to_string(),
			});
		}

		let update = ManufacturingUpdate {
			id: Uuid::new_v4(),
			record_id,
			status,
			notes,
			user_id: actor.id,
			manufacturer_id,
			created_at: Utc::now(),
		};
		let created = self
			.store
			.create_manufacturing_update(update)
			.await
			.map_err(store_error)?;

		if changes_status {
			let before = snapshot(&record);
			let updated = self
				.store
				.update_manufacturing_status(record_id, status)
				.await
				.map_err(store_error)?;
			self.record_activity(
				actor,
				EntityType::Manufacturing,
				record_id,
				"updated",
				before,
				snapshot(&updated),
			)
			.await;
		}

		Ok(created)
	}

	/// Deletes a user account, enforcing the at-least-one-admin invariant.
	#[instrument(skip(self, actor), fields(target_id = %target_id, actor_id = %actor.id))]
	pub async fn remove_user(
		&self,
		actor: &UserAccount,
		target_id: Uuid,
	) -> Result<(), WorkflowError> {
		let target = self
			.users
			.get_user(target_id)
			.await
			.map_err(missing(EntityType::User, target_id))?;
		let admin_count = self
			.users
			.count_with_role(Role::Admin)
			.await
			.map_err(store_error)?;
		self.gate.guard_user_removal(actor, &target, admin_count)?;

		self.users.delete_user(target_id).await.map_err(store_error)?;
		self.record_activity(
			actor,
			EntityType::User,
			target_id,
			"deleted",
			snapshot(&target),
			Value::Null,
		)
		.await;
		Ok(())
	}

	/// Gated read of an order and its line items.
	///
	/// A denied read on an existing order is Forbidden, never NotFound.
	pub async fn load_order(
		&self,
		actor: &UserAccount,
		id: Uuid,
	) -> Result<(Order, Vec<OrderLineItem>), WorkflowError> {
		let order = self
			.store
			.get_order(id)
			.await
			.map_err(missing(EntityType::Order, id))?;
		self.gate.check_order_access(actor, &order, Action::Read)?;
		let items = self
			.store
			.get_order_line_items(id)
			.await
			.map_err(store_error)?;
		Ok((order, items))
	}

	/// Gated read of a manufacturing record and its update history.
	pub async fn load_manufacturing(
		&self,
		actor: &UserAccount,
		id: Uuid,
	) -> Result<(ManufacturingRecord, Vec<ManufacturingUpdate>), WorkflowError> {
		let record = self
			.store
			.get_manufacturing(id)
			.await
			.map_err(missing(EntityType::Manufacturing, id))?;
		self.gate
			.check_manufacturing_access(actor, &record, Action::Read)
			.await?;
		let updates = self
			.store
			.get_manufacturing_updates(id)
			.await
			.map_err(store_error)?;
		Ok((record, updates))
	}

	async fn run_order_side_effects(
		&self,
		order: &Order,
		line_items: &[OrderLineItem],
		warnings: &mut Vec<String>,
	) {
		if is_production_bound(order.status) {
			if let Err(reason) = self.ensure_manufacturing_record(order).await {
				tracing::warn!(order_id = %order.id, %reason, "side effect failed");
				warnings.push(reason);
			}
		}
		if order.status == OrderStatus::AwaitingPayment {
			if let Err(reason) = self.ensure_invoice(order, line_items).await {
				tracing::warn!(order_id = %order.id, %reason, "side effect failed");
				warnings.push(reason);
			}
		}
	}

	/// Creates the manufacturing record for an order if none exists yet.
	async fn ensure_manufacturing_record(&self, order: &Order) -> Result<(), String> {
		let existing = self
			.store
			.get_manufacturing_by_order(order.id)
			.await
			.map_err(|err| format!("manufacturing record lookup failed: {}", err))?;
		if existing.is_some() {
			return Ok(());
		}

		let now = Utc::now();
		let record = ManufacturingRecord {
			id: Uuid::new_v4(),
			order_id: order.id,
			manufacturer_id: None,
			status: ManufacturingStatus::New,
			created_at: now,
			updated_at: now,
		};
		self.store
			.create_manufacturing(record)
			.await
			.map(|_| ())
			.map_err(|err| format!("failed to create manufacturing record: {}", err))
	}

	/// Generates the invoice for an order if none exists yet.
	///
	/// Amounts are computed from the line items as they stand right now
	/// and frozen; later line-item edits do not recompute them.
	async fn ensure_invoice(
		&self,
		order: &Order,
		line_items: &[OrderLineItem],
	) -> Result<(), String> {
		let existing = self
			.store
			.get_invoices_by_order(order.id)
			.await
			.map_err(|err| format!("invoice lookup failed: {}", err))?;
		if !existing.is_empty() {
			// Already billed; skip silently.
			return Ok(());
		}

		let subtotal = order_subtotal(line_items);
		let tax = subtotal * self.settings.tax_rate;
		let issue_date = Utc::now();
		let invoice = Invoice {
			id: Uuid::new_v4(),
			order_id: order.id,
			subtotal,
			tax,
			total_amount: subtotal + tax,
			status: InvoiceStatus::Sent,
			issue_date,
			due_date: issue_date + Duration::days(self.settings.invoice_due_days),
		};
		self.store
			.create_invoice(invoice)
			.await
			.map(|_| ())
			.map_err(|err| format!("failed to generate invoice: {}", err))
	}

	/// Appends an audit entry. Failures are logged, never propagated.
	async fn record_activity(
		&self,
		actor: &UserAccount,
		entity_type: EntityType,
		entity_id: Uuid,
		action: &str,
		before: Value,
		after: Value,
	) {
		let entry = ActivityEntry {
			actor_id: actor.id,
			entity_type,
			entity_id,
			action: action.to_string(),
			before,
			after,
			recorded_at: Utc::now(),
		};
		if let Err(err) = self.recorder.record(entry).await {
			tracing::warn!(%entity_id, entity = %entity_type, "audit log append failed: {}", err);
		}
	}
}

/// Whether an order status hands the order to manufacturing.
fn is_production_bound(status: OrderStatus) -> bool {
	matches!(
		status,
		OrderStatus::ReadyForManufacturing | OrderStatus::InProduction
	)
}

/// Evaluates the business preconditions for an order transition.
fn check_order_preconditions(
	requested: OrderStatus,
	line_items: &[OrderLineItem],
) -> Result<(), WorkflowError> {
	if is_production_bound(requested) && line_items.is_empty() {
		return Err(WorkflowError::PreconditionFailed(
			"order has no line items".to_string(),
		));
	}
	if requested == OrderStatus::AwaitingPayment {
		if line_items.is_empty() {
			return Err(WorkflowError::PreconditionFailed(
				"order has no line items to bill".to_string(),
			));
		}
		if let Some(item) = line_items.iter().find(|item| item.total_quantity() == 0) {
			return Err(WorkflowError::PreconditionFailed(format!(
				"line item {} has no quantities",
				item.id
			)));
		}
	}
	Ok(())
}

fn store_error(err: StoreError) -> WorkflowError {
	WorkflowError::Store(err.to_string())
}

/// Maps a store NotFound onto the workflow NotFound for this entity;
/// every other store failure stays a store error.
fn missing(entity: EntityType, id: Uuid) -> impl FnOnce(StoreError) -> WorkflowError {
	move |err| match err {
		StoreError::NotFound => WorkflowError::NotFound { entity, id },
		other => WorkflowError::Store(other.to_string()),
	}
}

fn snapshot<T: serde::Serialize>(entity: &T) -> Value {
	serde_json::to_value(entity).unwrap_or(Value::Null)
}
