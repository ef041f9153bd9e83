//! Memoized, deduplicated model loading.
//!
//! Every route has one [`ModelSlot`]. A deferred route moves from `Pending` to
//! `Loading` in the same synchronous turn in which the load is requested, so two
//! near-simultaneous requests always share one loader invocation. A failed load
//! returns the slot to `Pending`, which makes the next request retry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};
use tracing::debug;

use crate::error::{RouterError, RouterResult};
use crate::quiver::{Arrow, ModelSource, Quiver};

/// A load in flight, awaitable by any number of callers.
pub type SharedLoad<M> = Shared<LocalBoxFuture<'static, RouterResult<Rc<M>>>>;

/// Load state of one route.
pub enum ModelSlot<M> {
	/// No model yet, and no load running.
	Pending,
	/// A load is running.
	Loading(SharedLoad<M>),
	/// The model is available.
	Ready(Rc<M>),
}

impl<M> fmt::Debug for ModelSlot<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Pending => f.write_str("Pending"),
			Self::Loading(_) => f.write_str("Loading"),
			Self::Ready(_) => f.write_str("Ready"),
		}
	}
}

/// Outcome of [`LoadCache::ensure`].
pub enum LoadHandle<M> {
	/// The model was already available.
	Ready(Rc<M>),
	/// The model is being loaded.
	Pending(SharedLoad<M>),
}

impl<M> LoadHandle<M> {
	/// Waits for the model.
	///
	/// # Errors
	///
	/// Returns [`RouterError::LoadFailed`] if the shared load failed.
	pub async fn wait(self) -> RouterResult<Rc<M>> {
		match self {
			Self::Ready(model) => Ok(model),
			Self::Pending(load) => load.await,
		}
	}
}

/// Per-route load state, shared between the router and its in-flight loads.
pub struct LoadCache<M> {
	slots: Rc<RefCell<HashMap<String, ModelSlot<M>>>>,
}

impl<M: 'static> LoadCache<M> {
	/// Creates the cache for `quiver`: resolved routes start `Ready`, deferred
	/// routes start `Pending`.
	pub fn new(quiver: &Quiver<M>) -> Self {
		let slots = quiver
			.iter()
			.map(|arrow| {
				let slot = match arrow.source() {
					ModelSource::Resolved(model) => ModelSlot::Ready(Rc::clone(model)),
					ModelSource::Deferred(_) => ModelSlot::Pending,
				};
				(arrow.id().to_string(), slot)
			})
			.collect();

		Self {
			slots: Rc::new(RefCell::new(slots)),
		}
	}

	/// Returns the model for `arrow`, joining or starting its load as needed.
	///
	/// The loader is invoked when the returned load is first polled; the slot is
	/// marked `Loading` before this method returns.
	pub fn ensure(&self, arrow: &Arrow<M>) -> LoadHandle<M> {
		let mut slots = self.slots.borrow_mut();

		match slots.get(arrow.id()) {
			Some(ModelSlot::Ready(model)) => return LoadHandle::Ready(Rc::clone(model)),
			Some(ModelSlot::Loading(load)) => return LoadHandle::Pending(load.clone()),
			Some(ModelSlot::Pending) | None => {}
		}

		match arrow.source() {
			ModelSource::Resolved(model) => {
				slots.insert(arrow.id().to_string(), ModelSlot::Ready(Rc::clone(model)));
				LoadHandle::Ready(Rc::clone(model))
			}
			ModelSource::Deferred(loader) => {
				let loader = Rc::clone(loader);
				let id = arrow.id().to_string();
				let weak: Weak<RefCell<HashMap<String, ModelSlot<M>>>> = Rc::downgrade(&self.slots);

				let load = async move {
					debug!(route = %id, "loading route model");
					let result = loader().await;
					let slots = weak.upgrade();

					match result {
						Ok(model) => {
							let model = Rc::new(model);
							if let Some(slots) = slots {
								slots
									.borrow_mut()
									.insert(id.clone(), ModelSlot::Ready(Rc::clone(&model)));
							}
							debug!(route = %id, "route model loaded");
							Ok(model)
						}
						Err(source) => {
							if let Some(slots) = slots {
								slots.borrow_mut().insert(id.clone(), ModelSlot::Pending);
							}
							debug!(route = %id, error = %source, "route model load failed");
							Err(RouterError::load_failed(&id, source))
						}
					}
				}
				.boxed_local()
				.shared();

				slots.insert(arrow.id().to_string(), ModelSlot::Loading(load.clone()));
				LoadHandle::Pending(load)
			}
		}
	}

	/// Returns the model for `id` if it is loaded.
	pub fn model(&self, id: &str) -> Option<Rc<M>> {
		match self.slots.borrow().get(id) {
			Some(ModelSlot::Ready(model)) => Some(Rc::clone(model)),
			_ => None,
		}
	}

	/// Returns whether the model for `id` is loaded.
	pub fn is_loaded(&self, id: &str) -> bool {
		matches!(self.slots.borrow().get(id), Some(ModelSlot::Ready(_)))
	}

	/// Returns whether a load for `id` is in flight.
	pub fn is_loading(&self, id: &str) -> bool {
		matches!(self.slots.borrow().get(id), Some(ModelSlot::Loading(_)))
	}

	/// Drops the loaded model for `id` so the next request reloads it.
	///
	/// Resolved routes get their model back on the next request. Returns whether
	/// a model was dropped; a load in flight is left alone.
	pub fn evict(&self, id: &str) -> bool {
		let mut slots = self.slots.borrow_mut();
		match slots.get_mut(id) {
			Some(slot) if matches!(slot, ModelSlot::Ready(_)) => {
				*slot = ModelSlot::Pending;
				true
			}
			_ => false,
		}
	}
}

impl<M> fmt::Debug for LoadCache<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.slots.borrow().iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::BoxError;
	use crate::quiver::{QuiverBuilder, RouteConfig};
	use futures::channel::oneshot;
	use futures::executor::block_on;
	use rstest::rstest;
	use std::cell::Cell;

	fn counting_quiver(calls: Rc<Cell<usize>>) -> Quiver<String> {
		QuiverBuilder::new()
			.arrow("home", RouteConfig::model("/", "home".to_string()))
			.arrow(
				"slow",
				RouteConfig::loader("/slow", move || {
					calls.set(calls.get() + 1);
					async { Ok::<_, BoxError>("slow".to_string()) }
				}),
			)
			.build()
			.unwrap()
	}

	#[rstest]
	fn test_resolved_routes_start_ready() {
		let quiver = counting_quiver(Rc::new(Cell::new(0)));
		let cache = LoadCache::new(&quiver);

		assert!(cache.is_loaded("home"));
		assert!(!cache.is_loaded("slow"));
		assert!(!cache.is_loading("slow"));
	}

	#[rstest]
	fn test_ensure_marks_loading_before_polling() {
		let calls = Rc::new(Cell::new(0));
		let quiver = counting_quiver(Rc::clone(&calls));
		let cache = LoadCache::new(&quiver);
		let slow = quiver.get("slow").unwrap();

		let first = cache.ensure(slow);
		let second = cache.ensure(slow);
		assert!(cache.is_loading("slow"));

		let (a, b) = block_on(futures::future::join(first.wait(), second.wait()));
		assert!(Rc::ptr_eq(&a.unwrap(), &b.unwrap()));
		assert_eq!(calls.get(), 1);
		assert!(cache.is_loaded("slow"));
	}

	#[rstest]
	fn test_failed_load_returns_to_pending() {
		let attempts = Rc::new(Cell::new(0));
		let counter = Rc::clone(&attempts);
		let quiver = QuiverBuilder::new()
			.arrow(
				"flaky",
				RouteConfig::loader("/flaky", move || {
					counter.set(counter.get() + 1);
					let attempt = counter.get();
					async move {
						if attempt == 1 {
							Err::<String, BoxError>("offline".into())
						} else {
							Ok("flaky".to_string())
						}
					}
				}),
			)
			.build()
			.unwrap();
		let cache = LoadCache::new(&quiver);
		let flaky = quiver.get("flaky").unwrap();

		let err = block_on(cache.ensure(flaky).wait()).unwrap_err();
		assert!(matches!(err, RouterError::LoadFailed { ref id, .. } if id == "flaky"));
		assert!(!cache.is_loading("flaky"));
		assert!(!cache.is_loaded("flaky"));

		let model = block_on(cache.ensure(flaky).wait()).unwrap();
		assert_eq!(model.as_str(), "flaky");
		assert_eq!(attempts.get(), 2);
	}

	#[rstest]
	fn test_load_stays_in_flight_until_completed() {
		let (sender, receiver) = oneshot::channel::<String>();
		let receiver = RefCell::new(Some(receiver));
		let quiver = QuiverBuilder::new()
			.arrow(
				"held",
				RouteConfig::loader("/held", move || {
					let receiver = receiver.borrow_mut().take();
					async move {
						match receiver {
							Some(receiver) => receiver.await.map_err(|e| Box::new(e) as BoxError),
							None => Err("loader called twice".into()),
						}
					}
				}),
			)
			.build()
			.unwrap();
		let cache = LoadCache::new(&quiver);
		let held = quiver.get("held").unwrap();

		let mut pool = futures::executor::LocalPool::new();
		let spawner = pool.spawner();
		let load = cache.ensure(held);
		futures::task::LocalSpawnExt::spawn_local(&spawner, async move {
			let _ = load.wait().await;
		})
		.unwrap();

		pool.run_until_stalled();
		assert!(cache.is_loading("held"));

		sender.send("held".to_string()).unwrap();
		pool.run_until_stalled();
		assert!(cache.is_loaded("held"));
	}

	#[rstest]
	fn test_evict_forces_reload() {
		let calls = Rc::new(Cell::new(0));
		let quiver = counting_quiver(Rc::clone(&calls));
		let cache = LoadCache::new(&quiver);
		let slow = quiver.get("slow").unwrap();

		block_on(cache.ensure(slow).wait()).unwrap();
		assert!(cache.evict("slow"));
		assert!(!cache.is_loaded("slow"));
		assert!(!cache.evict("slow"));

		block_on(cache.ensure(slow).wait()).unwrap();
		assert_eq!(calls.get(), 2);

		assert!(cache.evict("home"));
		assert!(matches!(cache.ensure(quiver.get("home").unwrap()), LoadHandle::Ready(_)));
	}
}
