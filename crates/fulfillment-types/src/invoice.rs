//! Invoice types generated by the billing side effect.
//!
//! Invoices are never user-authored. The workflow orchestrator generates
//! one the first time an order reaches the billing milestone, and the
//! amounts are frozen at generation time: later line-item edits do not
//! recompute them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of an invoice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
	Draft,
	Sent,
	Paid,
	Void,
}

impl InvoiceStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			InvoiceStatus::Draft => "draft",
			InvoiceStatus::Sent => "sent",
			InvoiceStatus::Paid => "paid",
			InvoiceStatus::Void => "void",
		}
	}
}

impl fmt::Display for InvoiceStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A generated invoice for an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
	/// Unique identifier for this invoice.
	pub id: Uuid,
	/// Order this invoice bills.
	pub order_id: Uuid,
	/// Sum of line totals at generation time.
	pub subtotal: Decimal,
	/// Tax amount applied at generation time.
	pub tax: Decimal,
	/// Subtotal plus tax.
	pub total_amount: Decimal,
	/// Current status; auto-generated invoices start at `Sent`.
	pub status: InvoiceStatus,
	/// Date the invoice was issued.
	pub issue_date: DateTime<Utc>,
	/// Date payment is due.
	pub due_date: DateTime<Utc>,
}
