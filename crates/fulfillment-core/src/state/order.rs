//! Order lifecycle transition table.
//!
//! The 22-state order graph. `completed` and `cancelled` are terminal with
//! no outgoing edges. `on_hold` is the exception lane: reachable from
//! nearly every non-terminal state and able to resume into most of them.

use fulfillment_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use OrderStatus::*;

/// Static transition table - each state maps to allowed next states.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(Draft, HashSet::from([Quote, PendingApproval, Cancelled]));
	m.insert(Quote, HashSet::from([QuoteAccepted, Draft, Cancelled]));
	m.insert(
		QuoteAccepted,
		HashSet::from([PendingApproval, Approved, Cancelled]),
	);
	m.insert(
		PendingApproval,
		HashSet::from([Approved, Draft, Cancelled]),
	);
	m.insert(
		Approved,
		HashSet::from([
			AwaitingSizing,
			AwaitingDesign,
			AwaitingPayment,
			OnHold,
			Cancelled,
		]),
	);
	m.insert(
		AwaitingSizing,
		HashSet::from([AwaitingDesign, AwaitingPayment, OnHold, Cancelled]),
	);
	m.insert(
		AwaitingDesign,
		HashSet::from([InDesign, OnHold, Cancelled]),
	);
	m.insert(
		InDesign,
		HashSet::from([DesignReview, AwaitingDesign, OnHold, Cancelled]),
	);
	m.insert(
		DesignReview,
		HashSet::from([AwaitingCustomerApproval, InDesign, OnHold, Cancelled]),
	);
	m.insert(
		AwaitingCustomerApproval,
		HashSet::from([CustomerApproved, DesignReview, OnHold, Cancelled]),
	);
	m.insert(
		CustomerApproved,
		HashSet::from([AwaitingPayment, OnHold, Cancelled]),
	);
	m.insert(
		AwaitingPayment,
		HashSet::from([DepositReceived, OnHold, Cancelled]),
	);
	m.insert(
		DepositReceived,
		HashSet::from([ReadyForManufacturing, OnHold]),
	);
	m.insert(ReadyForManufacturing, HashSet::from([InProduction, OnHold]));
	m.insert(InProduction, HashSet::from([ProductionComplete, OnHold]));
	m.insert(
		ProductionComplete,
		HashSet::from([Shipped, PartiallyShipped, OnHold]),
	);
	m.insert(Shipped, HashSet::from([Delivered, PartiallyShipped]));
	m.insert(PartiallyShipped, HashSet::from([Shipped, Delivered]));
	m.insert(Delivered, HashSet::from([Completed]));
	m.insert(Completed, HashSet::new()); // terminal
	m.insert(
		OnHold,
		HashSet::from([
			Draft,
			Quote,
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
			Cancelled,
		]),
	);
	m.insert(Cancelled, HashSet::new()); // terminal
	m
});

/// Checks if an order state transition is valid.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

/// Returns the states reachable from `from` in one step.
pub fn successors(from: OrderStatus) -> HashSet<OrderStatus> {
	TRANSITIONS.get(&from).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_status_has_a_table_entry() {
		for status in OrderStatus::all() {
			assert!(
				TRANSITIONS.contains_key(&status),
				"missing table entry for {}",
				status
			);
		}
	}

	#[test]
	fn terminal_states_have_no_outgoing_edges() {
		assert!(successors(Completed).is_empty());
		assert!(successors(Cancelled).is_empty());
		for to in OrderStatus::all() {
			assert!(!is_valid_transition(Completed, to));
			assert!(!is_valid_transition(Cancelled, to));
		}
	}

	#[test]
	fn self_loops_are_never_graph_edges() {
		for status in OrderStatus::all() {
			assert!(
				!is_valid_transition(status, status),
				"self-loop on {}",
				status
			);
		}
	}

	#[test]
	fn happy_path_to_completion_is_connected() {
		let path = [
			Draft,
			Quote,
			QuoteAccepted,
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
			Delivered,
			Completed,
		];
		for pair in path.windows(2) {
			assert!(
				is_valid_transition(pair[0], pair[1]),
				"broken edge {} -> {}",
				pair[0],
				pair[1]
			);
		}
	}

	#[test]
	fn on_hold_resumes_into_most_pipeline_states_but_not_terminals() {
		assert!(is_valid_transition(OnHold, InProduction));
		assert!(is_valid_transition(OnHold, Cancelled));
		assert!(!is_valid_transition(OnHold, Completed));
		assert!(!is_valid_transition(OnHold, Shipped));
		assert!(!is_valid_transition(OnHold, Delivered));
	}

	#[test]
	fn shortcuts_that_skip_payment_are_rejected() {
		assert!(!is_valid_transition(Draft, InProduction));
		assert!(!is_valid_transition(AwaitingPayment, ReadyForManufacturing));
		assert!(!is_valid_transition(CustomerApproved, DepositReceived));
	}

	#[test]
	fn edge_count_matches_the_authoritative_graph() {
		let total: usize = TRANSITIONS.values().map(HashSet::len).sum();
		assert_eq!(total, 71);
	}
}
