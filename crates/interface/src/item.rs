//! Interface items: sockets, panels, and their direction flags.
//!
//! # Role
//!
//! Items are a closed tagged-variant type. Filtered views select by the
//! capability query [`Item::direction`], never by probing concrete variants at
//! filter sites.

use std::sync::Arc;

use crate::keyed::Keyed;

bitflags::bitflags! {
	/// Direction capabilities of a socket.
	///
	/// The bits are independent: a socket may be input-capable, output-capable,
	/// or both.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct DirectionFlags: u8 {
		/// The socket accepts incoming connections.
		const INPUT = 1 << 0;
		/// The socket provides outgoing connections.
		const OUTPUT = 1 << 1;
	}
}

/// Selects one of the two filtered views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	/// The inputs view.
	Input,
	/// The outputs view.
	Output,
}

impl Direction {
	/// Returns the flag bit selecting this direction.
	pub const fn as_flags(self) -> DirectionFlags {
		match self {
			Self::Input => DirectionFlags::INPUT,
			Self::Output => DirectionFlags::OUTPUT,
		}
	}
}

impl std::fmt::Display for Direction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Input => f.write_str("input"),
			Self::Output => f.write_str("output"),
		}
	}
}

/// A named attachment point carrying direction capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketItem {
	/// Stable key naming this socket, unique within each view it enters.
	pub identifier: Arc<str>,
	/// Direction capabilities; empty flags are a structural violation caught at
	/// rebuild time.
	pub flags: DirectionFlags,
}

/// A named grouping that nests further items.
///
/// Panels carry no direction and never enter a view; their children are
/// linearized into the flattened traversal in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelItem {
	/// Stable key naming this panel.
	pub identifier: Arc<str>,
	/// Nested items, in declaration order.
	pub items: Vec<Arc<Item>>,
}

/// A typed item in the interface tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
	/// An attachment point.
	Socket(SocketItem),
	/// A nesting group.
	Panel(PanelItem),
}

impl Item {
	/// Creates a socket item.
	pub fn socket(identifier: impl Into<Arc<str>>, flags: DirectionFlags) -> Self {
		Self::Socket(SocketItem {
			identifier: identifier.into(),
			flags,
		})
	}

	/// Creates an empty panel item.
	pub fn panel(identifier: impl Into<Arc<str>>) -> Self {
		Self::Panel(PanelItem {
			identifier: identifier.into(),
			items: Vec::new(),
		})
	}

	/// Returns the stable identifier naming this item.
	pub fn identifier(&self) -> &Arc<str> {
		match self {
			Self::Socket(socket) => &socket.identifier,
			Self::Panel(panel) => &panel.identifier,
		}
	}

	/// Returns the direction capabilities of this item; panels carry none.
	pub fn direction(&self) -> DirectionFlags {
		match self {
			Self::Socket(socket) => socket.flags,
			Self::Panel(_) => DirectionFlags::empty(),
		}
	}

	/// Returns true if this item is a socket.
	pub fn is_socket(&self) -> bool {
		matches!(self, Self::Socket(_))
	}
}

impl Keyed for Arc<Item> {
	fn key(&self) -> &Arc<str> {
		self.identifier()
	}
}
