//! Per-owner usage caches aligned to the inputs view.
//!
//! # Role
//!
//! Each owning consumer gets its own array of computed `{used, visible}`
//! states, index-aligned 1:1 with the inputs view of the generation it was
//! computed against. Computation is delegated to an external
//! [`UsageEvaluator`].
//!
//! # Invariants
//!
//! - A cached array is meaningful only while its recorded generation equals the
//!   view's; stale caches are recomputed, never read through.
//! - At most one evaluation runs per (owner, generation); the refresh is
//!   double-checked under the write lock.
//! - The evaluator never reports more states than the view has entries; fewer
//!   is the expected momentarily-behind case surfaced as an out-of-range miss.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::item::Item;
use crate::keyed::KeyedList;
use crate::view::ViewSet;

/// Opaque handle naming a usage-cache consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(pub u64);

/// Computed usage state for one inputs-view entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UsageState {
	/// Whether the input participates in the current evaluation.
	pub used: bool,
	/// Whether the input should be shown.
	pub visible: bool,
}

/// Outcome of a usage lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLookup {
	/// The identifier resolved and its state is known.
	Known(bool),
	/// The identifier is not an input of the current views. Distinct from a
	/// resolved-but-`false` state.
	NotFound,
	/// The usage cache is momentarily behind the views; the state is not yet
	/// known and must not be coerced to a boolean.
	Undetermined,
}

/// External evaluation step.
///
/// Given the current inputs view, returns one state per entry in view order.
/// Deciding *why* an input is used or visible is this trait's business, not
/// the cache's.
pub trait UsageEvaluator {
	/// Computes the usage states for every entry of `inputs`.
	fn evaluate(&self, inputs: &KeyedList<Arc<Item>>) -> Vec<UsageState>;
}

#[derive(Debug)]
struct OwnerUsage {
	generation: u64,
	states: Vec<UsageState>,
}

/// Map from owner handle to its usage cache.
#[derive(Default)]
pub(crate) struct UsageCaches {
	per_owner: RwLock<FxHashMap<OwnerId, OwnerUsage>>,
}

impl UsageCaches {
	/// Returns the state at `index` for `owner`, refreshing the owner's cache
	/// first when its generation does not match `set`'s.
	///
	/// `None` means the cache is behind the view at `index`.
	pub(crate) fn state_at(
		&self,
		owner: OwnerId,
		set: &ViewSet,
		evaluator: &dyn UsageEvaluator,
		index: usize,
	) -> Option<UsageState> {
		{
			let map = self.per_owner.read();
			if let Some(usage) = map.get(&owner) {
				if usage.generation == set.generation() {
					return usage.states.get(index).copied();
				}
			}
		}

		let mut map = self.per_owner.write();
		let fresh = match map.get(&owner) {
			Some(usage) if usage.generation == set.generation() => None,
			_ => Some(evaluator.evaluate(set.inputs())),
		};
		if let Some(states) = fresh {
			debug_assert!(
				states.len() <= set.inputs().len(),
				"evaluator reported more states than the inputs view has entries"
			);
			map.insert(
				owner,
				OwnerUsage {
					generation: set.generation(),
					states,
				},
			);
		}
		map.get(&owner)
			.and_then(|usage| usage.states.get(index))
			.copied()
	}

	/// Drops the cache belonging to `owner`.
	pub(crate) fn forget(&self, owner: OwnerId) {
		self.per_owner.write().remove(&owner);
	}

	/// Drops every owner's cache.
	pub(crate) fn clear(&self) {
		self.per_owner.write().clear();
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use super::*;
	use crate::item::DirectionFlags;

	struct FixedEvaluator {
		states: Vec<UsageState>,
		calls: AtomicUsize,
	}

	impl FixedEvaluator {
		fn new(states: Vec<UsageState>) -> Self {
			Self {
				states,
				calls: AtomicUsize::new(0),
			}
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::Relaxed)
		}
	}

	impl UsageEvaluator for FixedEvaluator {
		fn evaluate(&self, _inputs: &KeyedList<Arc<Item>>) -> Vec<UsageState> {
			self.calls.fetch_add(1, Ordering::Relaxed);
			self.states.clone()
		}
	}

	fn two_input_set(generation: u64) -> ViewSet {
		let roots = vec![
			Arc::new(Item::socket("A", DirectionFlags::INPUT)),
			Arc::new(Item::socket("B", DirectionFlags::INPUT)),
		];
		ViewSet::build(&roots, generation).unwrap()
	}

	fn state(used: bool, visible: bool) -> UsageState {
		UsageState { used, visible }
	}

	/// Repeated lookups within one generation evaluate exactly once per owner.
	#[test]
	fn evaluates_once_per_owner_and_generation() {
		let caches = UsageCaches::default();
		let set = two_input_set(1);
		let evaluator = FixedEvaluator::new(vec![state(true, true), state(false, false)]);
		let owner = OwnerId(7);

		assert_eq!(
			caches.state_at(owner, &set, &evaluator, 0),
			Some(state(true, true))
		);
		assert_eq!(
			caches.state_at(owner, &set, &evaluator, 1),
			Some(state(false, false))
		);
		assert_eq!(evaluator.calls(), 1);

		// A different owner gets its own cache and its own evaluation.
		assert_eq!(
			caches.state_at(OwnerId(8), &set, &evaluator, 0),
			Some(state(true, true))
		);
		assert_eq!(evaluator.calls(), 2);
	}

	/// A generation change makes the owner's cache stale and forces a refresh.
	#[test]
	fn stale_generation_triggers_refresh() {
		let caches = UsageCaches::default();
		let evaluator = FixedEvaluator::new(vec![state(true, true), state(false, true)]);
		let owner = OwnerId(1);

		let old = two_input_set(1);
		caches.state_at(owner, &old, &evaluator, 0);
		assert_eq!(evaluator.calls(), 1);

		let new = two_input_set(2);
		assert_eq!(
			caches.state_at(owner, &new, &evaluator, 1),
			Some(state(false, true))
		);
		assert_eq!(evaluator.calls(), 2);
	}

	/// An index past the cached array reports "not yet known" instead of a
	/// coerced boolean.
	#[test]
	fn out_of_range_index_is_undetermined() {
		let caches = UsageCaches::default();
		let set = two_input_set(1);
		// Evaluator lags behind: one state for a two-entry view.
		let evaluator = FixedEvaluator::new(vec![state(true, true)]);
		let owner = OwnerId(1);

		assert_eq!(
			caches.state_at(owner, &set, &evaluator, 0),
			Some(state(true, true))
		);
		assert_eq!(caches.state_at(owner, &set, &evaluator, 1), None);
	}

	#[test]
	fn forget_drops_only_that_owner() {
		let caches = UsageCaches::default();
		let set = two_input_set(1);
		let evaluator = FixedEvaluator::new(vec![state(true, true), state(false, false)]);

		caches.state_at(OwnerId(1), &set, &evaluator, 0);
		caches.state_at(OwnerId(2), &set, &evaluator, 0);
		assert_eq!(evaluator.calls(), 2);

		caches.forget(OwnerId(1));
		// Owner 2 is still cached; owner 1 re-evaluates.
		caches.state_at(OwnerId(2), &set, &evaluator, 0);
		assert_eq!(evaluator.calls(), 2);
		caches.state_at(OwnerId(1), &set, &evaluator, 0);
		assert_eq!(evaluator.calls(), 3);
	}
}
