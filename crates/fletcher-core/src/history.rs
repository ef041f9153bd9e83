//! Navigation history port.
//!
//! The router never talks to a browser directly. It reads and pushes locations
//! through a [`NavigationPort`] and is told about back/forward navigation
//! through the handler registered with [`NavigationPort::on_pop`].
//! [`MemoryHistory`] is an in-process implementation used on native targets
//! and in tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::RouterResult;

/// Handler invoked after the location changed through back/forward navigation.
pub type PopHandler = Box<dyn Fn()>;

/// Access to the navigation history the router drives.
pub trait NavigationPort {
	/// Returns the current location as path plus query string.
	fn current_path(&self) -> String;

	/// Pushes `path` as a new history entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`](crate::RouterError::NavigationFailed)
	/// if the history refused the update.
	fn push(&self, path: &str) -> RouterResult<()>;

	/// Registers a handler for back/forward navigation.
	fn on_pop(&self, handler: PopHandler);
}

/// An event whose default action can be suppressed, such as a link click.
pub trait PreventDefault {
	/// Suppresses the event's default action.
	fn prevent_default(&self);
}

/// Event with no default action to suppress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefault;

impl PreventDefault for NoDefault {
	fn prevent_default(&self) {}
}

struct MemoryState {
	entries: Vec<String>,
	index: usize,
}

/// In-memory navigation history.
///
/// Clones share the same history, so a test can keep one handle while the
/// router owns another.
#[derive(Clone)]
pub struct MemoryHistory {
	state: Rc<RefCell<MemoryState>>,
	handlers: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl MemoryHistory {
	/// Creates a history whose only entry is `initial`.
	pub fn new(initial: impl Into<String>) -> Self {
		Self {
			state: Rc::new(RefCell::new(MemoryState {
				entries: vec![initial.into()],
				index: 0,
			})),
			handlers: Rc::new(RefCell::new(Vec::new())),
		}
	}

	/// Returns every entry, oldest first.
	pub fn entries(&self) -> Vec<String> {
		self.state.borrow().entries.clone()
	}

	/// Returns the number of registered back/forward handlers.
	pub fn pop_listener_count(&self) -> usize {
		self.handlers.borrow().len()
	}

	/// Moves one entry back. Returns `false` at the oldest entry.
	pub fn back(&self) -> bool {
		self.go(-1)
	}

	/// Moves one entry forward. Returns `false` at the newest entry.
	pub fn forward(&self) -> bool {
		self.go(1)
	}

	fn go(&self, delta: isize) -> bool {
		{
			let mut state = self.state.borrow_mut();
			let Some(index) = state.index.checked_add_signed(delta) else {
				return false;
			};
			if index >= state.entries.len() {
				return false;
			}
			state.index = index;
		}

		let handlers: Vec<Rc<dyn Fn()>> = self.handlers.borrow().iter().cloned().collect();
		for handler in handlers {
			handler();
		}
		true
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl NavigationPort for MemoryHistory {
	fn current_path(&self) -> String {
		let state = self.state.borrow();
		state.entries[state.index].clone()
	}

	fn push(&self, path: &str) -> RouterResult<()> {
		let mut state = self.state.borrow_mut();
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(path.to_string());
		state.index = next;
		Ok(())
	}

	fn on_pop(&self, handler: PopHandler) {
		self.handlers.borrow_mut().push(Rc::from(handler));
	}
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("MemoryHistory")
			.field("entries", &state.entries)
			.field("index", &state.index)
			.finish()
	}
}
