//! Ordered container with an O(1) key index.
//!
//! # Role
//!
//! [`KeyedList`] pairs an insertion-ordered array with a key → position hash
//! index. It is the storage behind each filtered view.
//!
//! # Invariants
//!
//! - The array and the index always describe the same contents; a failed
//!   [`KeyedList::add_new`] leaves both untouched.
//! - Append-only between [`KeyedList::clear`] calls: rebuilds replace contents
//!   wholesale, never patch them.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// Key extraction seam for [`KeyedList`] entries.
pub trait Keyed {
	/// Returns the stable key naming this entry.
	fn key(&self) -> &Arc<str>;
}

/// Insertion collision on an already-present key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate key {0:?}")]
pub struct DuplicateKeyError(pub Arc<str>);

/// Insertion-ordered array paired with a key → position hash index.
#[derive(Debug, Clone)]
pub struct KeyedList<T: Keyed> {
	items: Vec<T>,
	by_key: FxHashMap<Arc<str>, u32>,
}

impl<T: Keyed> Default for KeyedList<T> {
	fn default() -> Self {
		Self {
			items: Vec::new(),
			by_key: FxHashMap::default(),
		}
	}
}

impl<T: Keyed> KeyedList<T> {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `item` at the next position.
	///
	/// Fails without modifying the collection when the key is already present.
	pub fn add_new(&mut self, item: T) -> Result<(), DuplicateKeyError> {
		let key = item.key();
		if self.by_key.contains_key(key.as_ref()) {
			return Err(DuplicateKeyError(key.clone()));
		}
		self.by_key.insert(key.clone(), self.items.len() as u32);
		self.items.push(item);
		Ok(())
	}

	/// Returns true if an entry with `key` is present.
	pub fn contains(&self, key: &str) -> bool {
		self.by_key.contains_key(key)
	}

	/// Returns the 0-based insertion position of `key`.
	pub fn index_of(&self, key: &str) -> Option<usize> {
		self.by_key.get(key).map(|&position| position as usize)
	}

	/// Returns the entry named `key`.
	pub fn value_of(&self, key: &str) -> Option<&T> {
		self.index_of(key).map(|position| &self.items[position])
	}

	/// Returns the entry at `index`.
	pub fn get(&self, index: usize) -> Option<&T> {
		self.items.get(index)
	}

	/// Empties the array and the index together.
	pub fn clear(&mut self) {
		self.items.clear();
		self.by_key.clear();
	}

	/// Iterates entries in insertion order.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.items.iter()
	}

	/// Returns the entries as a slice, in insertion order.
	pub fn as_slice(&self) -> &[T] {
		&self.items
	}

	/// Returns the number of entries.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if the list holds no entries.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl<'a, T: Keyed> IntoIterator for &'a KeyedList<T> {
	type Item = &'a T;
	type IntoIter = std::slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
