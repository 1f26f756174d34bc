//! In-memory storage backend for the fulfillment service.
//!
//! This implementation keeps all entities in HashMaps behind read-write
//! locks. It is the development backend and the standard test fixture;
//! nothing survives a restart. Uniqueness rules (one manufacturing record
//! per order) are enforced the same way a database backend would, so the
//! workflow layer can be exercised against it faithfully.

use crate::{ActivityRecorder, AssociationLookup, EntityStore, StoreError, UserDirectory};
use async_trait::async_trait;
use chrono::Utc;
use fulfillment_types::{
	ActivityEntry, DesignJob, DesignStatus, Invoice, ManufacturingRecord, ManufacturingStatus,
	ManufacturingUpdate, Order, OrderLineItem, OrderStatus, Role, UserAccount,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
	orders: HashMap<Uuid, Order>,
	line_items: HashMap<Uuid, Vec<OrderLineItem>>,
	manufacturing: HashMap<Uuid, ManufacturingRecord>,
	manufacturing_by_order: HashMap<Uuid, Uuid>,
	manufacturing_updates: HashMap<Uuid, Vec<ManufacturingUpdate>>,
	design_jobs: HashMap<Uuid, DesignJob>,
	invoices: HashMap<Uuid, Vec<Invoice>>,
	users: HashMap<Uuid, UserAccount>,
	associations: HashMap<Uuid, HashSet<Uuid>>,
	activity: Vec<ActivityEntry>,
}

/// In-memory store implementing every collaborator trait.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
	/// Fault injection for tests: when set, invoice creation fails with a
	/// backend error so the degraded-success path can be exercised.
	fail_invoice_creation: AtomicBool,
}

impl MemoryStore {
	/// Creates an empty MemoryStore.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds a user account.
	pub async fn add_user(&self, user: UserAccount) {
		let mut tables = self.tables.write().await;
		tables.users.insert(user.id, user);
	}

	/// Seeds the manufacturer associations for a user.
	pub async fn set_associations(&self, user_id: Uuid, manufacturer_ids: HashSet<Uuid>) {
		let mut tables = self.tables.write().await;
		tables.associations.insert(user_id, manufacturer_ids);
	}

	/// Returns a copy of the recorded activity log, oldest first.
	pub async fn activity_log(&self) -> Vec<ActivityEntry> {
		self.tables.read().await.activity.clone()
	}

	/// Makes the next and all following invoice creations fail.
	pub fn inject_invoice_failure(&self, fail: bool) {
		self.fail_invoice_creation.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl EntityStore for MemoryStore {
	async fn get_order(&self, id: Uuid) -> Result<Order, StoreError> {
		let tables = self.tables.read().await;
		tables.orders.get(&id).cloned().ok_or(StoreError::NotFound)
	}

	async fn create_order(&self, order: Order) -> Result<Order, StoreError> {
		let mut tables = self.tables.write().await;
		if tables.orders.contains_key(&order.id) {
			return Err(StoreError::Conflict(format!(
				"order {} already exists",
				order.id
			)));
		}
		tables.orders.insert(order.id, order.clone());
		Ok(order)
	}

	async fn update_order_status(
		&self,
		id: Uuid,
		status: OrderStatus,
	) -> Result<Order, StoreError> {
		let mut tables = self.tables.write().await;
		let order = tables.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
		order.status = status;
		order.updated_at = Utc::now();
		Ok(order.clone())
	}

	async fn get_order_line_items(&self, order_id: Uuid) -> Result<Vec<OrderLineItem>, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables.line_items.get(&order_id).cloned().unwrap_or_default())
	}

	async fn create_line_item(&self, item: OrderLineItem) -> Result<OrderLineItem, StoreError> {
		let mut tables = self.tables.write().await;
		if !tables.orders.contains_key(&item.order_id) {
			return Err(StoreError::NotFound);
		}
		tables
			.line_items
			.entry(item.order_id)
			.or_default()
			.push(item.clone());
		Ok(item)
	}

	async fn get_manufacturing(&self, id: Uuid) -> Result<ManufacturingRecord, StoreError> {
		let tables = self.tables.read().await;
		tables
			.manufacturing
			.get(&id)
			.cloned()
			.ok_or(StoreError::NotFound)
	}

	async fn get_manufacturing_by_order(
		&self,
		order_id: Uuid,
	) -> Result<Option<ManufacturingRecord>, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables
			.manufacturing_by_order
			.get(&order_id)
			.and_then(|record_id| tables.manufacturing.get(record_id))
			.cloned())
	}

	async fn create_manufacturing(
		&self,
		record: ManufacturingRecord,
	) -> Result<ManufacturingRecord, StoreError> {
		let mut tables = self.tables.write().await;
		if tables.manufacturing_by_order.contains_key(&record.order_id) {
			return Err(StoreError::Conflict(format!(
				"order {} already has a manufacturing record",
				record.order_id
			)));
		}
		tables.manufacturing_by_order.insert(record.order_id, record.id);
		tables.manufacturing.insert(record.id, record.clone());
		Ok(record)
	}

	async fn update_manufacturing_status(
		&self,
		id: Uuid,
		status: ManufacturingStatus,
	) -> Result<ManufacturingRecord, StoreError> {
		let mut tables = self.tables.write().await;
		let record = tables
			.manufacturing
			.get_mut(&id)
			.ok_or(StoreError::NotFound)?;
		record.status = status;
		record.updated_at = Utc::now();
		Ok(record.clone())
	}

	async fn create_manufacturing_update(
		&self,
		update: ManufacturingUpdate,
	) -> Result<ManufacturingUpdate, StoreError> {
		let mut tables = self.tables.write().await;
		if !tables.manufacturing.contains_key(&update.record_id) {
			return Err(StoreError::NotFound);
		}
		tables
			.manufacturing_updates
			.entry(update.record_id)
			.or_default()
			.push(update.clone());
		Ok(update)
	}

	async fn get_manufacturing_updates(
		&self,
		record_id: Uuid,
	) -> Result<Vec<ManufacturingUpdate>, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables
			.manufacturing_updates
			.get(&record_id)
			.cloned()
			.unwrap_or_default())
	}

	async fn get_design_job(&self, id: Uuid) -> Result<DesignJob, StoreError> {
		let tables = self.tables.read().await;
		tables
			.design_jobs
			.get(&id)
			.cloned()
			.ok_or(StoreError::NotFound)
	}

	async fn create_design_job(&self, job: DesignJob) -> Result<DesignJob, StoreError> {
		let mut tables = self.tables.write().await;
		tables.design_jobs.insert(job.id, job.clone());
		Ok(job)
	}

	async fn update_design_job_status(
		&self,
		id: Uuid,
		status: DesignStatus,
	) -> Result<DesignJob, StoreError> {
		let mut tables = self.tables.write().await;
		let job = tables.design_jobs.get_mut(&id).ok_or(StoreError::NotFound)?;
		job.status = status;
		job.updated_at = Utc::now();
		Ok(job.clone())
	}

	async fn get_invoices_by_order(&self, order_id: Uuid) -> Result<Vec<Invoice>, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables.invoices.get(&order_id).cloned().unwrap_or_default())
	}

	async fn create_invoice(&self, invoice: Invoice) -> Result<Invoice, StoreError> {
		if self.fail_invoice_creation.load(Ordering::SeqCst) {
			return Err(StoreError::Backend("invoice backend unavailable".into()));
		}
		let mut tables = self.tables.write().await;
		tables
			.invoices
			.entry(invoice.order_id)
			.or_default()
			.push(invoice.clone());
		Ok(invoice)
	}
}

#[async_trait]
impl UserDirectory for MemoryStore {
	async fn get_user(&self, id: Uuid) -> Result<UserAccount, StoreError> {
		let tables = self.tables.read().await;
		tables.users.get(&id).cloned().ok_or(StoreError::NotFound)
	}

	async fn count_with_role(&self, role: Role) -> Result<usize, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables.users.values().filter(|u| u.role == role).count())
	}

	async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
		let mut tables = self.tables.write().await;
		tables.users.remove(&id).ok_or(StoreError::NotFound)?;
		Ok(())
	}
}

#[async_trait]
impl ActivityRecorder for MemoryStore {
	async fn record(&self, entry: ActivityEntry) -> Result<(), StoreError> {
		let mut tables = self.tables.write().await;
		tables.activity.push(entry);
		Ok(())
	}
}

#[async_trait]
impl AssociationLookup for MemoryStore {
	async fn manufacturer_ids_for(&self, user_id: Uuid) -> Result<HashSet<Uuid>, StoreError> {
		let tables = self.tables.read().await;
		Ok(tables.associations.get(&user_id).cloned().unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fulfillment_types::OrderPriority;
	use rust_decimal::Decimal;

	fn order(status: OrderStatus) -> Order {
		let now = Utc::now();
		Order {
			id: Uuid::new_v4(),
			org_id: Uuid::new_v4(),
			salesperson_id: Uuid::new_v4(),
			status,
			priority: OrderPriority::Normal,
			rush: false,
			created_at: now,
			updated_at: now,
		}
	}

	#[tokio::test]
	async fn order_crud_round_trip() {
		let store = MemoryStore::new();
		let created = store.create_order(order(OrderStatus::Draft)).await.unwrap();

		let fetched = store.get_order(created.id).await.unwrap();
		assert_eq!(fetched.status, OrderStatus::Draft);

		let updated = store
			.update_order_status(created.id, OrderStatus::Quote)
			.await
			.unwrap();
		assert_eq!(updated.status, OrderStatus::Quote);

		let missing = store.get_order(Uuid::new_v4()).await;
		assert!(matches!(missing, Err(StoreError::NotFound)));
	}

	#[tokio::test]
	async fn duplicate_manufacturing_record_is_a_conflict() {
		let store = MemoryStore::new();
		let parent = store.create_order(order(OrderStatus::Draft)).await.unwrap();
		let now = Utc::now();
		let record = ManufacturingRecord {
			id: Uuid::new_v4(),
			order_id: parent.id,
			manufacturer_id: None,
			status: ManufacturingStatus::New,
			created_at: now,
			updated_at: now,
		};
		store.create_manufacturing(record.clone()).await.unwrap();

		let second = ManufacturingRecord {
			id: Uuid::new_v4(),
			..record
		};
		let result = store.create_manufacturing(second).await;
		assert!(matches!(result, Err(StoreError::Conflict(_))));

		let by_order = store
			.get_manufacturing_by_order(parent.id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(by_order.status, ManufacturingStatus::New);
	}

	#[tokio::test]
	async fn line_items_require_an_existing_order() {
		let store = MemoryStore::new();
		let item = OrderLineItem {
			id: Uuid::new_v4(),
			order_id: Uuid::new_v4(),
			description: "orphan".into(),
			unit_price: Decimal::ONE,
			sizes: Default::default(),
		};
		assert!(matches!(
			store.create_line_item(item).await,
			Err(StoreError::NotFound)
		));
	}

	#[tokio::test]
	async fn invoice_fault_injection() {
		let store = MemoryStore::new();
		let parent = store.create_order(order(OrderStatus::Draft)).await.unwrap();
		let now = Utc::now();
		let invoice = Invoice {
			id: Uuid::new_v4(),
			order_id: parent.id,
			subtotal: Decimal::ONE,
			tax: Decimal::ZERO,
			total_amount: Decimal::ONE,
			status: fulfillment_types::InvoiceStatus::Sent,
			issue_date: now,
			due_date: now,
		};

		store.inject_invoice_failure(true);
		assert!(store.create_invoice(invoice.clone()).await.is_err());

		store.inject_invoice_failure(false);
		store.create_invoice(invoice).await.unwrap();
		assert_eq!(store.get_invoices_by_order(parent.id).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn user_directory_counts_roles() {
		let store = MemoryStore::new();
		let admin = UserAccount::new(Uuid::new_v4(), "root", Role::Admin);
		store.add_user(admin.clone()).await;
		store
			.add_user(UserAccount::new(Uuid::new_v4(), "rep", Role::Sales))
			.await;

		assert_eq!(store.count_with_role(Role::Admin).await.unwrap(), 1);
		store.delete_user(admin.id).await.unwrap();
		assert_eq!(store.count_with_role(Role::Admin).await.unwrap(), 0);
	}
}
