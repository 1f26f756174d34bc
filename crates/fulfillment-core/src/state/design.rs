//! Design job transition table.
//!
//! Pipeline: pending → assigned → in_progress → review →
//! {needs_revision, approved} → completed. `on_hold` and `cancelled` are
//! exception states reachable from the working stages; `completed` and
//! `cancelled` are terminal.

use fulfillment_types::DesignStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use DesignStatus::*;

/// Static transition table - each state maps to allowed next states.
static TRANSITIONS: Lazy<HashMap<DesignStatus, HashSet<DesignStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(Pending, HashSet::from([Assigned, OnHold, Cancelled]));
	m.insert(Assigned, HashSet::from([InProgress, Pending, OnHold, Cancelled]));
	m.insert(InProgress, HashSet::from([Review, OnHold, Cancelled]));
	m.insert(
		Review,
		HashSet::from([NeedsRevision, Approved, OnHold, Cancelled]),
	);
	m.insert(
		NeedsRevision,
		HashSet::from([InProgress, OnHold, Cancelled]),
	);
	m.insert(Approved, HashSet::from([Completed]));
	m.insert(
		OnHold,
		HashSet::from([Pending, Assigned, InProgress, Review, NeedsRevision, Cancelled]),
	);
	m.insert(Completed, HashSet::new()); // terminal
	m.insert(Cancelled, HashSet::new()); // terminal
	m
});

/// Checks if a design job state transition is valid.
pub fn is_valid_transition(from: DesignStatus, to: DesignStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_status_has_a_table_entry() {
		for status in DesignStatus::all() {
			assert!(TRANSITIONS.contains_key(&status));
		}
	}

	#[test]
	fn happy_path_is_connected() {
		let path = [Pending, Assigned, InProgress, Review, Approved, Completed];
		for pair in path.windows(2) {
			assert!(is_valid_transition(pair[0], pair[1]));
		}
	}

	#[test]
	fn revision_loops_back_through_in_progress() {
		assert!(is_valid_transition(Review, NeedsRevision));
		assert!(is_valid_transition(NeedsRevision, InProgress));
		assert!(!is_valid_transition(NeedsRevision, Approved));
	}

	#[test]
	fn terminal_states_have_no_outgoing_edges() {
		for to in DesignStatus::all() {
			assert!(!is_valid_transition(Completed, to));
			assert!(!is_valid_transition(Cancelled, to));
		}
	}

	#[test]
	fn hold_lane_resumes_working_stages_only() {
		assert!(is_valid_transition(OnHold, InProgress));
		assert!(!is_valid_transition(OnHold, Approved));
		assert!(!is_valid_transition(OnHold, Completed));
	}
}
