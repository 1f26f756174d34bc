//! Structural redaction of monetary fields for restricted roles.
//!
//! Manufacturer-role users receive order payloads with every monetary
//! field removed. The pass is structural: it walks the whole JSON value,
//! drops the financial keys wherever they appear (including inside
//! `lineItems` arrays and nested `variant` objects) and leaves everything
//! else untouched, so consumers see the same shape minus the money.

use fulfillment_types::Role;
use serde_json::Value;

/// Monetary field names stripped for restricted roles, in the camelCase
/// wire form payloads are serialized with.
const FINANCIAL_FIELDS: [&str; 11] = [
	"unitPrice",
	"lineTotal",
	"subtotal",
	"tax",
	"discount",
	"msrp",
	"cost",
	"commission",
	"revenue",
	"amountPaid",
	"invoiceUrl",
];

/// Redacts monetary fields from payloads for restricted roles.
pub struct FinancialRedactor;

impl FinancialRedactor {
	/// Returns true when the role must not see monetary fields.
	pub fn is_restricted(role: Role) -> bool {
		role == Role::Manufacturer
	}

	/// Redacts the value in place for the given role.
	///
	/// Identity for every role except manufacturer. Idempotent: redacting
	/// twice yields the same value as redacting once.
	pub fn redact_for_role(role: Role, value: &mut Value) {
		if Self::is_restricted(role) {
			strip_financials(value);
		}
	}

	/// Convenience wrapper returning a redacted copy.
	pub fn redacted(role: Role, value: &Value) -> Value {
		let mut copy = value.clone();
		Self::redact_for_role(role, &mut copy);
		copy
	}
}

fn strip_financials(value: &mut Value) {
	match value {
		Value::Object(map) => {
			map.retain(|key, _| !FINANCIAL_FIELDS.contains(&key.as_str()));
			for nested in map.values_mut() {
				strip_financials(nested);
			}
		}
		Value::Array(items) => {
			for item in items.iter_mut() {
				strip_financials(item);
			}
		}
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample_order_payload() -> Value {
		json!({
			"id": "ord-1",
			"status": "in_production",
			"rush": true,
			"subtotal": "300.00",
			"tax": "0.00",
			"lineItems": [
				{
					"description": "tour tee",
					"unitPrice": "15.00",
					"lineTotal": "300.00",
					"sizes": {"S": 5, "M": 10, "L": 5},
					"variant": {
						"color": "black",
						"msrp": "25.00",
						"cost": "7.10"
					}
				}
			],
			"invoiceUrl": "https://billing.example/inv/1"
		})
	}

	#[test]
	fn manufacturer_payloads_lose_all_monetary_fields() {
		let redacted = FinancialRedactor::redacted(Role::Manufacturer, &sample_order_payload());

		assert!(redacted.get("subtotal").is_none());
		assert!(redacted.get("tax").is_none());
		assert!(redacted.get("invoiceUrl").is_none());

		let item = &redacted["lineItems"][0];
		assert!(item.get("unitPrice").is_none());
		assert!(item.get("lineTotal").is_none());
		assert!(item["variant"].get("msrp").is_none());
		assert!(item["variant"].get("cost").is_none());

		// Non-financial structure is untouched.
		assert_eq!(redacted["status"], "in_production");
		assert_eq!(item["sizes"]["M"], 10);
		assert_eq!(item["variant"]["color"], "black");
	}

	#[test]
	fn redaction_is_idempotent() {
		let once = FinancialRedactor::redacted(Role::Manufacturer, &sample_order_payload());
		let twice = FinancialRedactor::redacted(Role::Manufacturer, &once);
		assert_eq!(once, twice);
	}

	#[test]
	fn non_restricted_roles_see_everything() {
		let payload = sample_order_payload();
		for role in [
			Role::Admin,
			Role::Sales,
			Role::Ops,
			Role::Designer,
			Role::Finance,
		] {
			assert_eq!(FinancialRedactor::redacted(role, &payload), payload);
		}
	}
}
