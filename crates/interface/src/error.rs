//! Rebuild error types.
//!
//! Lookup misses are not errors here; they surface as `None` or
//! [`crate::usage::UsageLookup::NotFound`] values.

use std::sync::Arc;

use crate::item::Direction;

/// Fatal errors raised while rebuilding the filtered views.
///
/// Both variants abort the rebuild, leave the published views cleared and the
/// controller `Invalid`, and surface to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RebuildError {
	/// Two items in the same view share an identifier; indicates corrupted
	/// upstream tree data.
	#[error("duplicate identifier {identifier:?} in the {direction} view")]
	DuplicateKey {
		/// The colliding identifier.
		identifier: Arc<str>,
		/// The view in which the collision occurred.
		direction: Direction,
	},
	/// Traversal encountered a shape the tree's own invariants should have
	/// excluded.
	#[error("structural integrity violation: {detail}")]
	StructuralIntegrity {
		/// Human-readable description of the violating shape.
		detail: String,
	},
}
