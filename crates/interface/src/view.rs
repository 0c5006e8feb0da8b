//! Direction-filtered views over the interface tree.
//!
//! # Role
//!
//! A [`ViewSet`] holds the two [`KeyedList`] views for one tree generation. It
//! is built by a single depth-first traversal and is immutable once built; the
//! controller publishes it wholesale.
//!
//! # Invariants
//!
//! - A valid view equals exactly the ordered traversal subsequence matching its
//!   direction bit; a bidirectional socket appears in both views independently.
//! - Build is all-or-nothing: a failed build is dropped in its entirety, so no
//!   reader ever observes a view reflecting part of a traversal.

use std::sync::Arc;

use crate::error::RebuildError;
use crate::item::{Direction, Item};
use crate::keyed::KeyedList;

/// The two direction-filtered views built from one tree generation.
#[derive(Debug)]
pub(crate) struct ViewSet {
	inputs: KeyedList<Arc<Item>>,
	outputs: KeyedList<Arc<Item>>,
	generation: u64,
}

impl ViewSet {
	/// An empty set for `generation`; the initial and post-invalidation state.
	pub(crate) fn empty(generation: u64) -> Self {
		Self {
			inputs: KeyedList::new(),
			outputs: KeyedList::new(),
			generation,
		}
	}

	/// Builds both views from a full depth-first traversal of `roots`.
	pub(crate) fn build(roots: &[Arc<Item>], generation: u64) -> Result<Self, RebuildError> {
		let mut set = Self::empty(generation);
		for item in roots {
			set.collect(item)?;
		}
		Ok(set)
	}

	fn collect(&mut self, item: &Arc<Item>) -> Result<(), RebuildError> {
		if item.identifier().is_empty() {
			return Err(RebuildError::StructuralIntegrity {
				detail: "item with an empty identifier".to_string(),
			});
		}
		let flags = item.direction();
		if item.is_socket() && flags.is_empty() {
			return Err(RebuildError::StructuralIntegrity {
				detail: format!("socket {:?} carries no direction", item.identifier()),
			});
		}
		if flags.contains(Direction::Input.as_flags()) {
			self.inputs
				.add_new(item.clone())
				.map_err(|err| RebuildError::DuplicateKey {
					identifier: err.0,
					direction: Direction::Input,
				})?;
		}
		if flags.contains(Direction::Output.as_flags()) {
			self.outputs
				.add_new(item.clone())
				.map_err(|err| RebuildError::DuplicateKey {
					identifier: err.0,
					direction: Direction::Output,
				})?;
		}
		if let Item::Panel(panel) = item.as_ref() {
			for child in &panel.items {
				self.collect(child)?;
			}
		}
		Ok(())
	}

	/// Returns the view selected by `direction`.
	pub(crate) fn view(&self, direction: Direction) -> &KeyedList<Arc<Item>> {
		match direction {
			Direction::Input => &self.inputs,
			Direction::Output => &self.outputs,
		}
	}

	/// Returns the inputs view.
	pub(crate) fn inputs(&self) -> &KeyedList<Arc<Item>> {
		&self.inputs
	}

	/// Returns the outputs view.
	pub(crate) fn outputs(&self) -> &KeyedList<Arc<Item>> {
		&self.outputs
	}

	/// Returns the tree generation this set was built from.
	pub(crate) fn generation(&self) -> u64 {
		self.generation
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::item::DirectionFlags;

	fn socket(identifier: &str, flags: DirectionFlags) -> Arc<Item> {
		Arc::new(Item::socket(identifier, flags))
	}

	fn view_keys(set: &ViewSet, direction: Direction) -> Vec<&str> {
		set.view(direction)
			.iter()
			.map(|item| item.identifier().as_ref())
			.collect()
	}

	/// One traversal classifies each socket into zero, one, or both views.
	#[test]
	fn classification_by_direction_bits() {
		let roots = vec![
			socket("A", DirectionFlags::INPUT),
			socket("B", DirectionFlags::INPUT | DirectionFlags::OUTPUT),
			socket("C", DirectionFlags::OUTPUT),
		];
		let set = ViewSet::build(&roots, 1).unwrap();

		assert_eq!(view_keys(&set, Direction::Input), vec!["A", "B"]);
		assert_eq!(view_keys(&set, Direction::Output), vec!["B", "C"]);
		assert_eq!(set.view(Direction::Input).index_of("A"), Some(0));
		assert_eq!(set.view(Direction::Input).index_of("B"), Some(1));
		assert_eq!(set.view(Direction::Input).index_of("C"), None);
		assert_eq!(set.view(Direction::Output).index_of("B"), Some(0));
		assert_eq!(set.view(Direction::Output).index_of("C"), Some(1));
	}

	/// Panels never enter a view; their children are linearized in declaration
	/// order.
	#[test]
	fn panels_are_flattened_depth_first() {
		let mut panel = Item::panel("group");
		if let Item::Panel(p) = &mut panel {
			p.items.push(socket("nested_in", DirectionFlags::INPUT));
			p.items.push(socket("nested_out", DirectionFlags::OUTPUT));
		}
		let roots = vec![
			socket("first", DirectionFlags::INPUT),
			Arc::new(panel),
			socket("last", DirectionFlags::INPUT),
		];
		let set = ViewSet::build(&roots, 1).unwrap();

		assert_eq!(
			view_keys(&set, Direction::Input),
			vec!["first", "nested_in", "last"]
		);
		assert_eq!(view_keys(&set, Direction::Output), vec!["nested_out"]);
		assert_eq!(set.view(Direction::Input).index_of("group"), None);
	}

	/// The same identifier on an input and an output is not a collision; the
	/// two views use independent key spaces.
	#[test]
	fn duplicate_identifiers_across_views_are_allowed() {
		let roots = vec![
			socket("value", DirectionFlags::INPUT),
			socket("value", DirectionFlags::OUTPUT),
		];
		let set = ViewSet::build(&roots, 1).unwrap();
		assert_eq!(set.view(Direction::Input).index_of("value"), Some(0));
		assert_eq!(set.view(Direction::Output).index_of("value"), Some(0));
	}

	/// A duplicate within one view aborts the build.
	#[test]
	fn duplicate_within_a_view_fails_the_build() {
		let roots = vec![
			socket("x", DirectionFlags::INPUT),
			socket("x", DirectionFlags::INPUT),
		];
		let err = ViewSet::build(&roots, 1).unwrap_err();
		assert_eq!(
			err,
			RebuildError::DuplicateKey {
				identifier: Arc::from("x"),
				direction: Direction::Input,
			}
		);
	}

	/// A socket with no direction bit is a shape the tree should have excluded.
	#[test]
	fn directionless_socket_is_a_structural_violation() {
		let roots = vec![socket("bad", DirectionFlags::empty())];
		let err = ViewSet::build(&roots, 1).unwrap_err();
		assert!(matches!(err, RebuildError::StructuralIntegrity { .. }));
	}

	#[test]
	fn empty_identifier_is_a_structural_violation() {
		let roots = vec![socket("", DirectionFlags::INPUT)];
		let err = ViewSet::build(&roots, 1).unwrap_err();
		assert!(matches!(err, RebuildError::StructuralIntegrity { .. }));
	}
}
