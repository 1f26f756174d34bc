//! Static status-transition tables, one per entity type.
//!
//! Each table is an immutable adjacency map built once at startup. The
//! tables are deliberately independent: order, manufacturing and design
//! pipelines have different arities and different exception-lane
//! semantics, and unifying them into one generic graph would blur that.
//!
//! A `from` state missing from a table means "no transitions", never
//! "anything goes".

pub mod design;
pub mod manufacturing;
pub mod order;

use fulfillment_types::EntityType;

/// Checks a proposed transition against the table for the entity type.
///
/// Statuses arrive in wire form; names outside the entity's vocabulary
/// fail to parse upstream and never reach the tables.
pub fn is_valid_transition(entity: EntityType, from: &str, to: &str) -> bool {
	match entity {
		EntityType::Order => match (from.parse(), to.parse()) {
			(Ok(from), Ok(to)) => order::is_valid_transition(from, to),
			_ => false,
		},
		EntityType::Manufacturing => match (from.parse(), to.parse()) {
			(Ok(from), Ok(to)) => manufacturing::is_valid_transition(from, to),
			_ => false,
		},
		EntityType::DesignJob => match (from.parse(), to.parse()) {
			(Ok(from), Ok(to)) => design::is_valid_transition(from, to),
			_ => false,
		},
		// Users have no lifecycle.
		EntityType::User => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn unknown_status_names_are_rejected_not_defaulted() {
		assert!(!is_valid_transition(EntityType::Order, "draft", "invoiced"));
		assert!(!is_valid_transition(EntityType::Order, "limbo", "draft"));
		assert!(!is_valid_transition(EntityType::Manufacturing, "new", "boxed"));
		assert!(!is_valid_transition(EntityType::DesignJob, "", "pending"));
	}

	#[test]
	fn wire_form_lookups_agree_with_typed_tables() {
		assert!(is_valid_transition(EntityType::Order, "draft", "quote"));
		assert!(is_valid_transition(
			EntityType::Manufacturing,
			"new",
			"accepted"
		));
		assert!(is_valid_transition(
			EntityType::DesignJob,
			"pending",
			"assigned"
		));
	}
}
