//! Lazily-rebuilt, identifier-indexed views over a mutable interface tree.
//!
//! # Mental Model
//!
//! 1. **Edit:** [`TreeInterface`] mutators change the item tree and invalidate
//!    every derived cache.
//! 2. **Ensure:** the next read walks the tree once, classifies each socket
//!    into the inputs and/or outputs view, and publishes the result wholesale.
//! 3. **Lookup:** readers resolve `identifier → index → item / state` against
//!    the published snapshot in O(1).
//! 4. **Usage:** each owning consumer keeps its own `{used, visible}` array,
//!    index-aligned with the inputs view and recomputed per generation by an
//!    external [`UsageEvaluator`].
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`TreeInterface`] | Owns the tree and every derived cache; the external contract. |
//! | [`KeyedList`] | Insertion-ordered array with an O(1) key index. |
//! | [`ItemRef`] | Snapshot-pinning handle to a resolved item. |
//! | [`UsageEvaluator`] | External step computing per-input usage states. |
//!
//! # Concurrency
//!
//! - Structural edits take `&mut self`: single writer, enforced statically.
//! - Lookups take `&self` and may run from many threads; at most one rebuild
//!   executes per invalidation cycle and blocked readers observe the identical
//!   completed views.
//!
//! # Errors
//!
//! Rebuild failures ([`RebuildError`]) surface to the caller and leave the
//! views cleared and invalid. Lookup misses are values (`None`,
//! [`UsageLookup::NotFound`]), never errors.

mod cache;
mod error;
mod interface;
mod item;
mod keyed;
mod usage;
mod view;

pub use error::RebuildError;
pub use interface::{ItemRef, TreeInterface};
pub use item::{Direction, DirectionFlags, Item, PanelItem, SocketItem};
pub use keyed::{DuplicateKeyError, Keyed, KeyedList};
pub use usage::{OwnerId, UsageEvaluator, UsageLookup, UsageState};
