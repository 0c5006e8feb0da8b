//! Lazy rebuild controller for the filtered views.
//!
//! # Role
//!
//! [`ViewCache`] owns the validity gate and the published [`ViewSet`]. Readers
//! call [`ViewCache::ensure`]; the mutation layer calls
//! [`ViewCache::invalidate`] after every structural edit.
//!
//! # Invariants
//!
//! - At most one rebuild executes per invalidation cycle. The gate guard is
//!   held for the whole rebuild, so concurrent callers block on the lock and
//!   only ever observe the completed result, never a half-built set.
//! - A failed rebuild publishes an empty set and leaves the gate `Invalid`; it
//!   never publishes a partially filled one.
//! - An `ensure` that returns reflects a tree state at least as fresh as the
//!   most recent `invalidate` that completed before it began.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::RebuildError;
use crate::item::Item;
use crate::view::ViewSet;

/// Validity of the published views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
	/// Stale; the next `ensure` rebuilds.
	Invalid,
	/// A rebuild is in flight. Written while the guard is held, so a caller
	/// can only observe this state after a rebuild unwound; it then retries.
	Rebuilding,
	/// The published set matches the current generation.
	Valid,
}

/// Controller owning the validity gate and the published snapshot.
pub(crate) struct ViewCache {
	gate: Mutex<Gate>,
	published: ArcSwap<ViewSet>,
	generation: AtomicU64,
	rebuilds: AtomicU64,
}

impl ViewCache {
	pub(crate) fn new() -> Self {
		Self {
			gate: Mutex::new(Gate::Invalid),
			published: ArcSwap::from_pointee(ViewSet::empty(0)),
			generation: AtomicU64::new(0),
			rebuilds: AtomicU64::new(0),
		}
	}

	/// Returns the current published snapshot, rebuilding both views from
	/// `roots` first when stale.
	pub(crate) fn ensure(&self, roots: &[Arc<Item>]) -> Result<Arc<ViewSet>, RebuildError> {
		let mut gate = self.gate.lock();
		match *gate {
			Gate::Valid => return Ok(self.published.load_full()),
			Gate::Invalid | Gate::Rebuilding => {}
		}
		*gate = Gate::Rebuilding;

		let generation = self.generation.load(Ordering::Acquire);
		match ViewSet::build(roots, generation) {
			Ok(set) => {
				let set = Arc::new(set);
				self.published.store(set.clone());
				self.rebuilds.fetch_add(1, Ordering::Relaxed);
				*gate = Gate::Valid;
				debug!(
					generation,
					inputs = set.inputs().len(),
					outputs = set.outputs().len(),
					"rebuilt interface views"
				);
				Ok(set)
			}
			Err(err) => {
				self.published.store(Arc::new(ViewSet::empty(generation)));
				*gate = Gate::Invalid;
				warn!(generation, error = %err, "interface view rebuild failed");
				Err(err)
			}
		}
	}

	/// Marks the published views stale and clears them; the rebuild is
	/// deferred to the next [`Self::ensure`].
	pub(crate) fn invalidate(&self) {
		let mut gate = self.gate.lock();
		let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
		self.published.store(Arc::new(ViewSet::empty(generation)));
		*gate = Gate::Invalid;
		trace!(generation, "interface views invalidated");
	}

	/// Current tree generation; bumped by every invalidation.
	pub(crate) fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	/// Number of completed rebuilds since creation.
	pub(crate) fn rebuild_count(&self) -> u64 {
		self.rebuilds.load(Ordering::Relaxed)
	}
}
