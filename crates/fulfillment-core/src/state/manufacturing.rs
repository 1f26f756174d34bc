//! Manufacturing pipeline transition table.
//!
//! A short linear pipeline: new → accepted → in_production → qc →
//! ready_to_ship → shipped. QC may bounce a batch back to production;
//! `shipped` is terminal.

use fulfillment_types::ManufacturingStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

use ManufacturingStatus::*;

/// Static transition table - each state maps to allowed next states.
static TRANSITIONS: Lazy<HashMap<ManufacturingStatus, HashSet<ManufacturingStatus>>> =
	Lazy::new(|| {
		let mut m = HashMap::new();
		m.insert(New, HashSet::from([Accepted]));
		m.insert(Accepted, HashSet::from([InProduction]));
		m.insert(InProduction, HashSet::from([Qc]));
		m.insert(Qc, HashSet::from([ReadyToShip, InProduction]));
		m.insert(ReadyToShip, HashSet::from([Shipped]));
		m.insert(Shipped, HashSet::new()); // terminal
		m
	});

/// Checks if a manufacturing state transition is valid.
pub fn is_valid_transition(from: ManufacturingStatus, to: ManufacturingStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}
