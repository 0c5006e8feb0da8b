//! The interface tree facade.
//!
//! # Role
//!
//! [`TreeInterface`] owns the item tree, the rebuild controller, and the
//! per-owner usage caches, and exposes the whole external contract: structural
//! edits on `&mut self`, lookups on `&self`.
//!
//! # Concurrency
//!
//! Structural edits are single-writer by construction (`&mut self`). Lookups
//! may run from many threads; a rebuild in flight blocks them on the
//! controller's gate and all of them observe the identical completed views.

use std::sync::Arc;

use crate::cache::ViewCache;
use crate::error::RebuildError;
use crate::item::{Direction, DirectionFlags, Item};
use crate::usage::{OwnerId, UsageCaches, UsageEvaluator, UsageLookup, UsageState};
use crate::view::ViewSet;

/// Snapshot-pinning handle to an item resolved from a view.
///
/// Holds its source view set alive, so the index stays meaningful for this
/// snapshot even after later tree edits invalidate the live views.
pub struct ItemRef {
	set: Arc<ViewSet>,
	direction: Direction,
	index: usize,
}

impl ItemRef {
	/// Position of the item within its view at the pinned generation.
	pub fn index(&self) -> usize {
		self.index
	}

	/// The view this handle was resolved from.
	pub fn direction(&self) -> Direction {
		self.direction
	}
}

impl Clone for ItemRef {
	fn clone(&self) -> Self {
		Self {
			set: self.set.clone(),
			direction: self.direction,
			index: self.index,
		}
	}
}

impl std::ops::Deref for ItemRef {
	type Target = Item;

	fn deref(&self) -> &Item {
		self.set.view(self.direction).as_slice()[self.index].as_ref()
	}
}

impl std::fmt::Debug for ItemRef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ItemRef")
			.field("direction", &self.direction)
			.field("index", &self.index)
			.field("identifier", &(**self).identifier())
			.finish()
	}
}

/// Mutable interface tree plus its derived caches.
pub struct TreeInterface {
	roots: Vec<Arc<Item>>,
	cache: ViewCache,
	usage: UsageCaches,
}

impl Default for TreeInterface {
	fn default() -> Self {
		Self::new()
	}
}

impl TreeInterface {
	/// Creates an empty tree; the views start invalid and populate on first
	/// access.
	pub fn new() -> Self {
		Self {
			roots: Vec::new(),
			cache: ViewCache::new(),
			usage: UsageCaches::default(),
		}
	}

	// ---- structural edits (single writer) ----

	/// Appends a socket at the end of the root sequence.
	pub fn add_socket(&mut self, identifier: impl Into<Arc<str>>, flags: DirectionFlags) {
		self.roots.push(Arc::new(Item::socket(identifier, flags)));
		self.invalidate();
	}

	/// Inserts a socket at `index` within the root sequence; indices past the
	/// end append.
	pub fn insert_socket(
		&mut self,
		index: usize,
		identifier: impl Into<Arc<str>>,
		flags: DirectionFlags,
	) {
		let index = index.min(self.roots.len());
		self.roots
			.insert(index, Arc::new(Item::socket(identifier, flags)));
		self.invalidate();
	}

	/// Appends an empty panel at the end of the root sequence.
	pub fn add_panel(&mut self, identifier: impl Into<Arc<str>>) {
		self.roots.push(Arc::new(Item::panel(identifier)));
		self.invalidate();
	}

	/// Appends a socket to the panel named `panel`, searching nested panels
	/// depth-first. Returns false when no such panel exists.
	pub fn add_socket_to_panel(
		&mut self,
		panel: &str,
		identifier: impl Into<Arc<str>>,
		flags: DirectionFlags,
	) -> bool {
		let child = Arc::new(Item::socket(identifier, flags));
		let added = panel_push(&mut self.roots, panel, &child);
		if added {
			self.invalidate();
		}
		added
	}

	/// Removes the first item named `identifier` anywhere in the tree.
	/// Returns false when no such item exists.
	pub fn remove(&mut self, identifier: &str) -> bool {
		let removed = remove_in(&mut self.roots, identifier);
		if removed {
			self.invalidate();
		}
		removed
	}

	/// Moves the root item named `identifier` to `index`; indices past the end
	/// move it last. Returns false when no such root item exists.
	pub fn move_item(&mut self, identifier: &str, index: usize) -> bool {
		let Some(from) = self
			.roots
			.iter()
			.position(|item| item.identifier().as_ref() == identifier)
		else {
			return false;
		};
		let item = self.roots.remove(from);
		let to = index.min(self.roots.len());
		self.roots.insert(to, item);
		self.invalidate();
		true
	}

	/// Replaces the direction flags of the first socket named `identifier`,
	/// searching nested panels depth-first. Returns false when no such socket
	/// exists.
	pub fn set_flags(&mut self, identifier: &str, flags: DirectionFlags) -> bool {
		let changed = set_flags_in(&mut self.roots, identifier, flags);
		if changed {
			self.invalidate();
		}
		changed
	}

	/// Marks every derived cache stale. Called by every structural edit;
	/// exposed for mutation layers that edit through other means.
	pub fn invalidate(&mut self) {
		self.cache.invalidate();
		self.usage.clear();
	}

	/// Drops the usage cache belonging to `owner`.
	pub fn forget_owner(&mut self, owner: OwnerId) {
		self.usage.forget(owner);
	}

	// ---- lookups (concurrent readers) ----

	fn ensure(&self) -> Result<Arc<ViewSet>, RebuildError> {
		self.cache.ensure(&self.roots)
	}

	/// Resolves `identifier` in the view for `direction`.
	pub fn query(
		&self,
		identifier: &str,
		direction: Direction,
	) -> Result<Option<ItemRef>, RebuildError> {
		let set = self.ensure()?;
		let index = set.view(direction).index_of(identifier);
		Ok(index.map(|index| ItemRef {
			set,
			direction,
			index,
		}))
	}

	/// Returns the position of `identifier` within the view for `direction`.
	pub fn index_of(
		&self,
		identifier: &str,
		direction: Direction,
	) -> Result<Option<usize>, RebuildError> {
		let set = self.ensure()?;
		Ok(set.view(direction).index_of(identifier))
	}

	/// Returns whether the input named `identifier` is visible for `owner`.
	pub fn is_visible(
		&self,
		owner: OwnerId,
		evaluator: &dyn UsageEvaluator,
		identifier: &str,
	) -> Result<UsageLookup, RebuildError> {
		self.usage_lookup(owner, evaluator, identifier, |state| state.visible)
	}

	/// Returns whether the input named `identifier` is used for `owner`.
	pub fn is_used(
		&self,
		owner: OwnerId,
		evaluator: &dyn UsageEvaluator,
		identifier: &str,
	) -> Result<UsageLookup, RebuildError> {
		self.usage_lookup(owner, evaluator, identifier, |state| state.used)
	}

	fn usage_lookup(
		&self,
		owner: OwnerId,
		evaluator: &dyn UsageEvaluator,
		identifier: &str,
		select: impl Fn(UsageState) -> bool,
	) -> Result<UsageLookup, RebuildError> {
		let set = self.ensure()?;
		let Some(index) = set.inputs().index_of(identifier) else {
			return Ok(UsageLookup::NotFound);
		};
		match self.usage.state_at(owner, &set, evaluator, index) {
			Some(state) => Ok(UsageLookup::Known(select(state))),
			None => Ok(UsageLookup::Undetermined),
		}
	}

	/// Returns pinned handles to every item of the view for `direction`, in
	/// tree order.
	pub fn sockets(&self, direction: Direction) -> Result<Vec<ItemRef>, RebuildError> {
		let set = self.ensure()?;
		Ok((0..set.view(direction).len())
			.map(|index| ItemRef {
				set: set.clone(),
				direction,
				index,
			})
			.collect())
	}

	/// Returns the number of items in the view for `direction`.
	pub fn view_len(&self, direction: Direction) -> Result<usize, RebuildError> {
		let set = self.ensure()?;
		Ok(set.view(direction).len())
	}

	/// Root items, in declaration order. Nested panel children are not
	/// flattened here.
	pub fn items(&self) -> &[Arc<Item>] {
		&self.roots
	}

	// ---- diagnostics ----

	/// Number of completed view rebuilds since creation.
	pub fn rebuild_count(&self) -> u64 {
		self.cache.rebuild_count()
	}

	/// Current tree generation; bumped by every invalidation.
	pub fn generation(&self) -> u64 {
		self.cache.generation()
	}
}

fn panel_push(items: &mut Vec<Arc<Item>>, panel_id: &str, child: &Arc<Item>) -> bool {
	for item in items.iter_mut() {
		if !matches!(item.as_ref(), Item::Panel(_)) {
			continue;
		}
		let is_target = item.identifier().as_ref() == panel_id;
		if let Item::Panel(panel) = Arc::make_mut(item) {
			if is_target {
				panel.items.push(child.clone());
				return true;
			}
			if panel_push(&mut panel.items, panel_id, child) {
				return true;
			}
		}
	}
	false
}

fn remove_in(items: &mut Vec<Arc<Item>>, identifier: &str) -> bool {
	if let Some(position) = items
		.iter()
		.position(|item| item.identifier().as_ref() == identifier)
	{
		items.remove(position);
		return true;
	}
	for item in items.iter_mut() {
		if !matches!(item.as_ref(), Item::Panel(_)) {
			continue;
		}
		if let Item::Panel(panel) = Arc::make_mut(item) {
			if remove_in(&mut panel.items, identifier) {
				return true;
			}
		}
	}
	false
}

fn set_flags_in(items: &mut Vec<Arc<Item>>, identifier: &str, flags: DirectionFlags) -> bool {
	for item in items.iter_mut() {
		let is_target = item.is_socket() && item.identifier().as_ref() == identifier;
		if is_target {
			if let Item::Socket(socket) = Arc::make_mut(item) {
				socket.flags = flags;
			}
			return true;
		}
		if !matches!(item.as_ref(), Item::Panel(_)) {
			continue;
		}
		if let Item::Panel(panel) = Arc::make_mut(item) {
			if set_flags_in(&mut panel.items, identifier, flags) {
				return true;
			}
		}
	}
	false
}
