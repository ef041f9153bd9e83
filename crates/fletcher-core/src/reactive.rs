//! A minimal observable value.
//!
//! `Signal<T>` holds a value shared via `Rc<RefCell<T>>` and calls its
//! subscribers after every change. The router uses it to publish the active
//! route so a renderer can re-read [`Router::pulled_model`](crate::Router::pulled_model).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by [`Signal::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
	value: RefCell<T>,
	subscribers: RefCell<Vec<(SubscriptionId, Subscriber<T>)>>,
	next_id: Cell<u64>,
}

/// A value that notifies subscribers when it changes.
///
/// Clones share the same value and subscriber list.
pub struct Signal<T: 'static> {
	inner: Rc<Inner<T>>,
}

impl<T: 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: Clone + 'static> Signal<T> {
	/// Creates a signal holding `value`.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(Inner {
				value: RefCell::new(value),
				subscribers: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
			}),
		}
	}

	/// Returns a copy of the current value.
	pub fn get(&self) -> T {
		self.inner.value.borrow().clone()
	}

	/// Reads the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.value.borrow())
	}

	/// Replaces the value and notifies subscribers.
	pub fn set(&self, value: T) {
		*self.inner.value.borrow_mut() = value;
		self.notify();
	}

	/// Modifies the value in place and notifies subscribers once.
	pub fn update(&self, f: impl FnOnce(&mut T)) {
		f(&mut self.inner.value.borrow_mut());
		self.notify();
	}

	/// Registers `f` to be called with the new value after every change.
	pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.inner.next_id.get());
		self.inner.next_id.set(id.0 + 1);
		self.inner.subscribers.borrow_mut().push((id, Rc::new(f)));
		id
	}

	/// Removes a subscriber. Returns whether it was registered.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut subscribers = self.inner.subscribers.borrow_mut();
		let before = subscribers.len();
		subscribers.retain(|(sub_id, _)| *sub_id != id);
		subscribers.len() != before
	}

	// Subscribers may read or write the signal, so no borrow is held while
	// they run.
	fn notify(&self) {
		let snapshot = self.get();
		let subscribers: Vec<Subscriber<T>> = self
			.inner
			.subscribers
			.borrow()
			.iter()
			.map(|(_, f)| Rc::clone(f))
			.collect();
		for subscriber in subscribers {
			subscriber(&snapshot);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("value", &self.inner.value.borrow())
			.field("subscribers", &self.inner.subscribers.borrow().len())
			.finish()
	}
}
