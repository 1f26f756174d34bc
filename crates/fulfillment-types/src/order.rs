//! Order and line-item types for the fulfillment system.
//!
//! An order moves through a 22-state lifecycle from draft and quoting all
//! the way to delivery. The status vocabulary here is authoritative; the
//! legal edges between statuses live in the workflow crate's transition
//! tables.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::UnknownValue;

/// Status of an order in the fulfillment lifecycle.
///
/// `Completed` and `Cancelled` are terminal. `OnHold` is an exception lane
/// reachable from nearly every non-terminal state, not a pipeline stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	Draft,
	Quote,
	QuoteAccepted,
	PendingApproval,
	Approved,
	AwaitingSizing,
	AwaitingDesign,
	InDesign,
	DesignReview,
	AwaitingCustomerApproval,
	CustomerApproved,
	AwaitingPayment,
	DepositReceived,
	ReadyForManufacturing,
	InProduction,
	ProductionComplete,
	Shipped,
	PartiallyShipped,
	Delivered,
	Completed,
	OnHold,
	Cancelled,
}

impl OrderStatus {
	/// Returns the wire-format name of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::Draft => "draft",
			OrderStatus::Quote => "quote",
			OrderStatus::QuoteAccepted => "quote_accepted",
			OrderStatus::PendingApproval => "pending_approval",
			OrderStatus::Approved => "approved",
			OrderStatus::AwaitingSizing => "awaiting_sizing",
			OrderStatus::AwaitingDesign => "awaiting_design",
			OrderStatus::InDesign => "in_design",
			OrderStatus::DesignReview => "design_review",
			OrderStatus::AwaitingCustomerApproval => "awaiting_customer_approval",
			OrderStatus::CustomerApproved => "customer_approved",
			OrderStatus::AwaitingPayment => "awaiting_payment",
			OrderStatus::DepositReceived => "deposit_received",
			OrderStatus::ReadyForManufacturing => "ready_for_manufacturing",
			OrderStatus::InProduction => "in_production",
			OrderStatus::ProductionComplete => "production_complete",
			OrderStatus::Shipped => "shipped",
			OrderStatus::PartiallyShipped => "partially_shipped",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Completed => "completed",
			OrderStatus::OnHold => "on_hold",
			OrderStatus::Cancelled => "cancelled",
		}
	}

	/// Returns an iterator over all OrderStatus variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Draft,
			Self::Quote,
			Self::QuoteAccepted,
			Self::PendingApproval,
			Self::Approved,
			Self::AwaitingSizing,
			Self::AwaitingDesign,
			Self::InDesign,
			Self::DesignReview,
			Self::AwaitingCustomerApproval,
			Self::CustomerApproved,
			Self::AwaitingPayment,
			Self::DepositReceived,
			Self::ReadyForManufacturing,
			Self::InProduction,
			Self::ProductionComplete,
			Self::Shipped,
			Self::PartiallyShipped,
			Self::Delivered,
			Self::Completed,
			Self::OnHold,
			Self::Cancelled,
		]
		.into_iter()
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = UnknownValue;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::all()
			.find(|status| status.as_str() == s)
			.ok_or_else(|| UnknownValue::new("order status", s))
	}
}

/// Priority of an order relative to the rest of the book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
	Low,
	Normal,
	High,
}

impl Default for OrderPriority {
	fn default() -> Self {
		OrderPriority::Normal
	}
}

/// An order moving through the fulfillment lifecycle.
///
/// Monetary totals are derived from line items at the moment they are
/// needed, not stored on the order itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Unique identifier for this order.
	pub id: Uuid,
	/// Organization (tenant) this order belongs to.
	pub org_id: Uuid,
	/// Salesperson who owns this order; ownership scoping keys on this.
	pub salesperson_id: Uuid,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Priority relative to other orders.
	#[serde(default)]
	pub priority: OrderPriority,
	/// Whether the customer paid for expedited handling.
	#[serde(default)]
	pub rush: bool,
	/// Timestamp when this order was created.
	pub created_at: DateTime<Utc>,
	/// Timestamp when this order was last updated.
	pub updated_at: DateTime<Utc>,
}

/// A single line of an order: one product at one unit price, quantified
/// per named size.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
	/// Unique identifier for this line item.
	pub id: Uuid,
	/// Order this line belongs to.
	pub order_id: Uuid,
	/// Human-readable description of the product.
	pub description: String,
	/// Price per unit.
	pub unit_price: Decimal,
	/// Quantity ordered per named size (e.g. "S", "M", "L").
	pub sizes: BTreeMap<String, u32>,
}

impl OrderLineItem {
	/// Total quantity across all sizes.
	pub fn total_quantity(&self) -> u32 {
		self.sizes.values().sum()
	}

	/// Line total: unit price times total quantity.
	pub fn line_total(&self) -> Decimal {
		self.unit_price * Decimal::from(self.total_quantity())
	}
}

/// Sums line totals into an order subtotal.
pub fn order_subtotal(line_items: &[OrderLineItem]) -> Decimal {
	line_items
		.iter()
		.map(OrderLineItem::line_total)
		.sum::<Decimal>()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn line(unit_price: &str, sizes: &[(&str, u32)]) -> OrderLineItem {
		OrderLineItem {
			id: Uuid::new_v4(),
			order_id: Uuid::new_v4(),
			description: "test tee".to_string(),
			unit_price: unit_price.parse().unwrap(),
			sizes: sizes
				.iter()
				.map(|(name, qty)| (name.to_string(), *qty))
				.collect(),
		}
	}

	#[test]
	fn status_round_trips_through_strings() {
		for status in OrderStatus::all() {
			assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
		}
	}

	#[test]
	fn unknown_status_is_rejected() {
		assert!("invoicedd".parse::<OrderStatus>().is_err());
		assert!("".parse::<OrderStatus>().is_err());
	}

	#[test]
	fn status_count_matches_lifecycle() {
		assert_eq!(OrderStatus::all().count(), 22);
	}

	#[test]
	fn line_total_multiplies_price_by_summed_sizes() {
		let item = line("15.00", &[("S", 5), ("M", 10), ("L", 5)]);
		assert_eq!(item.total_quantity(), 20);
		assert_eq!(item.line_total(), "300.00".parse::<Decimal>().unwrap());
	}

	#[test]
	fn subtotal_sums_all_lines() {
		let items = vec![line("10.00", &[("M", 2)]), line("2.50", &[("L", 4)])];
		assert_eq!(order_subtotal(&items), "30.00".parse::<Decimal>().unwrap());
	}
}
