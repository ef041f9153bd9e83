//! Router engine.
//!
//! [`Router`] owns the quiver, the load cache and the navigation state. All
//! state lives behind `Rc`, so the router is cheap to clone and every clone
//! drives the same navigation.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::task::{LocalSpawn, LocalSpawnExt};
use tracing::{debug, error, warn};

use crate::cache::{LoadCache, LoadHandle};
use crate::error::{RouterError, RouterResult};
use crate::history::NavigationPort;
use crate::link::Link;
use crate::model::PulledModel;
use crate::params::{ExtraParams, parse_query};
use crate::pattern::{NOT_FOUND_PATTERN, PatternMatch};
use crate::quiver::{Activation, Arrow, NOT_FOUND_ID, Quiver, is_navigable_id};
use crate::reactive::{Signal, SubscriptionId};
use crate::settings::RouterSettings;

/// The active and previously active route identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveRoute {
	/// Currently active route, or [`NOT_FOUND_ID`].
	pub active: String,
	/// Route that was active before the last transition.
	pub previous: String,
}

pub(crate) struct RouterInner<M: 'static> {
	quiver: Quiver<M>,
	base_path: String,
	cache: LoadCache<M>,
	state: Signal<ActiveRoute>,
	generation: Cell<u64>,
	links: RefCell<HashMap<String, Link<M>>>,
	port: Rc<dyn NavigationPort>,
	spawner: Rc<dyn LocalSpawn>,
}

/// Builder for a [`Router`].
pub struct RouterBuilder<M: 'static> {
	quiver: Quiver<M>,
	settings: RouterSettings,
}

impl<M: 'static> RouterBuilder<M> {
	/// Replaces all settings.
	pub fn settings(mut self, settings: RouterSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Sets the prefix of every route path.
	pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
		self.settings.base_path = base_path.into();
		self
	}

	/// Activates `id` first instead of resolving the current location.
	pub fn first_arrow(mut self, id: impl Into<String>) -> Self {
		self.settings.first_arrow = Some(id.into());
		self
	}

	/// Builds the router on top of `port`, running background work on `spawner`.
	///
	/// The initial route is the configured first arrow, or the route matching
	/// the port's current location. Loading of a deferred not-found route and
	/// of the initial route starts right away.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Settings`] if the settings do not validate.
	pub fn build<P, S>(self, port: P, spawner: S) -> RouterResult<Router<M>>
	where
		P: NavigationPort + 'static,
		S: LocalSpawn + 'static,
	{
		self.settings.validate()?;

		let port: Rc<dyn NavigationPort> = Rc::new(port);
		let cache = LoadCache::new(&self.quiver);
		let inner = Rc::new(RouterInner {
			quiver: self.quiver,
			base_path: self.settings.normalized_base_path(),
			cache,
			state: Signal::new(ActiveRoute {
				active: NOT_FOUND_ID.to_string(),
				previous: NOT_FOUND_ID.to_string(),
			}),
			generation: Cell::new(0),
			links: RefCell::new(HashMap::new()),
			port: Rc::clone(&port),
			spawner: Rc::new(spawner),
		});
		let router = Router { inner };

		let first = match self.settings.first_arrow {
			Some(id) if router.inner.quiver.contains(&id) => id,
			Some(id) => {
				warn!(route = %id, "unknown first arrow, starting on the not-found page");
				NOT_FOUND_ID.to_string()
			}
			None => router.find_by_url(&port.current_path()).0,
		};
		debug!(route = %first, base_path = %router.inner.base_path, "router initialized");
		router.inner.state.set(ActiveRoute {
			active: first.clone(),
			previous: first.clone(),
		});

		let weak = Rc::downgrade(&router.inner);
		port.on_pop(Box::new(move || handle_pop(&weak)));

		if let Some(not_found) = router.inner.quiver.not_found() {
			router.spawn_load(not_found);
		}
		if let Some(arrow) = router.inner.quiver.get(&first) {
			router.spawn_load(arrow);
		}

		Ok(router)
	}
}

fn handle_pop<M: 'static>(weak: &Weak<RouterInner<M>>) {
	let Some(inner) = weak.upgrade() else {
		return;
	};
	let spawner = Rc::clone(&inner.spawner);
	let router = Router { inner };
	let spawned = spawner.spawn_local(async move {
		if let Err(err) = router.sync_with_location().await {
			error!(error = %err, "failed to activate route after history navigation");
		}
	});
	if let Err(err) = spawned {
		error!(error = %err, "failed to spawn history navigation");
	}
}

/// Client-side router over a quiver of routes with models of type `M`.
///
/// # Examples
///
/// ```
/// use fletcher_core::{MemoryHistory, QuiverBuilder, RouteConfig, Router};
/// use futures::executor::LocalPool;
///
/// let quiver = QuiverBuilder::new()
///     .arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
///     .arrow("pageA", RouteConfig::model("/page-a", "<p>a</p>".to_string()))
///     .build()
///     .unwrap();
///
/// let mut pool = LocalPool::new();
/// let history = MemoryHistory::new("/");
/// let router = Router::builder(quiver)
///     .build(history.clone(), pool.spawner())
///     .unwrap();
///
/// pool.run_until(router.pull("pageA", None)).unwrap();
/// assert_eq!(router.active_id(), "pageA");
/// assert_eq!(history.entries(), vec!["/", "/page-a"]);
/// ```
pub struct Router<M: 'static> {
	inner: Rc<RouterInner<M>>,
}

impl<M: 'static> Clone for Router<M> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<M: 'static> Router<M> {
	/// Starts building a router over `quiver`.
	pub fn builder(quiver: Quiver<M>) -> RouterBuilder<M> {
		RouterBuilder {
			quiver,
			settings: RouterSettings::default(),
		}
	}

	pub(crate) fn from_inner(inner: Rc<RouterInner<M>>) -> Self {
		Self { inner }
	}

	pub(crate) fn downgrade(&self) -> Weak<RouterInner<M>> {
		Rc::downgrade(&self.inner)
	}

	/// Navigates to `id`.
	///
	/// Pushes the route's path, waits for its model, runs its activation
	/// callback and only then makes it the active route. An unknown `id`
	/// switches to the not-found page without touching the history.
	///
	/// A navigation started while this one is still loading supersedes it:
	/// the superseded navigation returns `Ok(())` without running the
	/// callback or changing the active route.
	///
	/// # Errors
	///
	/// - [`RouterError::MultiValuePathParam`] if a path parameter has a list value.
	/// - [`RouterError::NavigationFailed`] if the history refused the push.
	/// - [`RouterError::LoadFailed`] if the model could not be loaded.
	/// - [`RouterError::ActivationFailed`] if the activation callback failed.
	///
	/// The active route is unchanged in every error case.
	pub async fn pull(&self, id: &str, params: Option<ExtraParams>) -> RouterResult<()> {
		let params = params.unwrap_or_default();
		let Some(arrow) = self.inner.quiver.get(id) else {
			warn!(route = %id, "unknown route, showing the not-found page");
			self.next_generation();
			self.commit(NOT_FOUND_ID);
			return Ok(());
		};

		let path = self.fill(arrow, &params)?;
		self.inner.port.push(&path)?;
		debug!(route = %id, path = %path, "pushed route");

		let generation = self.next_generation();
		self.activate(arrow, params, generation).await
	}

	/// Returns the full path of `id` filled with `params`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotFound`] for an unknown `id`, or
	/// [`RouterError::MultiValuePathParam`] if a path parameter has a list value.
	pub fn path_for(&self, id: &str, params: Option<&ExtraParams>) -> RouterResult<String> {
		let arrow = self.arrow(id)?;
		match params {
			Some(params) => self.fill(arrow, params),
			None => self.fill(arrow, &ExtraParams::default()),
		}
	}

	/// Resolves a URL to a route identifier and its parameters.
	///
	/// The fragment is ignored and the query string is parsed into the query
	/// parameters. Among the routes whose pattern matches, the most specific
	/// one wins and ties go to table order. Returns [`NOT_FOUND_ID`] with empty
	/// parameters when nothing matches.
	pub fn find_by_url(&self, url: &str) -> (String, ExtraParams) {
		let url = url.split_once('#').map_or(url, |(before, _)| before);
		let (path, query) = url.split_once('?').unwrap_or((url, ""));

		let Some(path) = self.strip_base(path) else {
			return (NOT_FOUND_ID.to_string(), ExtraParams::default());
		};

		let mut best: Option<(&Arrow<M>, PatternMatch)> = None;
		for arrow in self.inner.quiver.iter() {
			if !is_navigable_id(arrow.id()) {
				continue;
			}
			let Some(candidate) = arrow.pattern().matches(path) else {
				continue;
			};
			let better = match &best {
				Some((_, current)) => candidate.specificity > current.specificity,
				None => true,
			};
			if better {
				best = Some((arrow, candidate));
			}
		}

		match best {
			Some((arrow, matched)) => (
				arrow.id().to_string(),
				ExtraParams {
					path: matched.params,
					query: parse_query(query),
				},
			),
			None => (NOT_FOUND_ID.to_string(), ExtraParams::default()),
		}
	}

	/// Returns the model of `id`, loading it if needed.
	///
	/// Concurrent calls for the same route share one loader invocation.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotFound`] for an unknown `id`, or
	/// [`RouterError::LoadFailed`] if the loader failed.
	pub async fn ensure_loaded(&self, id: &str) -> RouterResult<Rc<M>> {
		let arrow = self.arrow(id)?;
		self.inner.cache.ensure(arrow).wait().await
	}

	/// Loads the model of the active route.
	///
	/// # Errors
	///
	/// Returns [`RouterError::LoadFailed`] if the loader failed.
	pub async fn load_active(&self) -> RouterResult<PulledModel<M>> {
		let active = self.active_id();
		match self.inner.quiver.get(&active) {
			Some(arrow) => Ok(PulledModel::Route(
				self.inner.cache.ensure(arrow).wait().await?,
			)),
			None => Ok(PulledModel::NotFound),
		}
	}

	/// Returns the link to `id`, creating it on first request.
	///
	/// Requesting a link starts loading the route's model in the background.
	/// The label defaults to the identifier with `_` and `-` replaced by spaces;
	/// `label` only applies when the link is created.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NotFound`] for an unknown `id`.
	pub fn get_link(&self, id: &str, label: Option<&str>) -> RouterResult<Link<M>> {
		let arrow = self.arrow(id)?;
		if !self.inner.cache.is_loaded(id) && !self.inner.cache.is_loading(id) {
			self.spawn_load(arrow);
		}

		if let Some(link) = self.inner.links.borrow().get(id) {
			return Ok(link.clone());
		}

		let href = self.fill(arrow, &ExtraParams::default())?;
		let label = label.map_or_else(|| id.replace(['_', '-'], " "), str::to_string);
		let link = Link::new(self.downgrade(), id.to_string(), href, label);
		self.inner
			.links
			.borrow_mut()
			.insert(id.to_string(), link.clone());
		Ok(link)
	}

	/// Returns links to every navigable route, in table order.
	///
	/// # Errors
	///
	/// See [`get_link`](Self::get_link).
	pub fn links(&self) -> RouterResult<Vec<Link<M>>> {
		self.list_ids()
			.iter()
			.map(|id| self.get_link(id, None))
			.collect()
	}

	/// Returns links to the given routes, in the given order.
	///
	/// # Errors
	///
	/// See [`get_link`](Self::get_link).
	pub fn links_for(&self, ids: &[&str]) -> RouterResult<Vec<Link<M>>> {
		ids.iter().map(|id| self.get_link(id, None)).collect()
	}

	/// Returns the active route identifier.
	pub fn active_id(&self) -> String {
		self.inner.state.with(|state| state.active.clone())
	}

	/// Returns the route identifier active before the last transition.
	pub fn previous_id(&self) -> String {
		self.inner.state.with(|state| state.previous.clone())
	}

	/// Returns the active and previous route identifiers.
	pub fn active_route(&self) -> ActiveRoute {
		self.inner.state.get()
	}

	/// Returns whether the model of `id` is loaded.
	pub fn is_loaded(&self, id: &str) -> bool {
		self.inner.cache.is_loaded(id)
	}

	/// Returns whether a load for `id` is in flight.
	pub fn is_loading(&self, id: &str) -> bool {
		self.inner.cache.is_loading(id)
	}

	/// Returns whether a link to `id` has been created.
	pub fn is_link_live(&self, id: &str) -> bool {
		self.inner.links.borrow().contains_key(id)
	}

	/// Returns the identifiers a URL can resolve to, in table order.
	pub fn list_ids(&self) -> Vec<String> {
		self.inner
			.quiver
			.navigable_ids()
			.into_iter()
			.map(str::to_string)
			.collect()
	}

	/// Returns the model to render.
	///
	/// While the active route's model is still loading, the previous route's
	/// model stays visible. The built-in not-found page stands in for a
	/// not-found route whose model is not loaded. Returns `None` only if
	/// neither route has a model yet.
	pub fn pulled_model(&self) -> Option<PulledModel<M>> {
		let ActiveRoute { active, previous } = self.inner.state.get();
		let no_not_found_model = self.inner.cache.model(NOT_FOUND_ID).is_none();

		if let Some(model) = self.inner.cache.model(&active) {
			return Some(PulledModel::Route(model));
		}
		if active == NOT_FOUND_ID && no_not_found_model {
			return Some(PulledModel::NotFound);
		}
		if previous == NOT_FOUND_ID && no_not_found_model {
			return Some(PulledModel::NotFound);
		}
		self.inner.cache.model(&previous).map(PulledModel::Route)
	}

	/// Returns the base path followed by the active route's unfilled pattern.
	pub fn current_path(&self) -> String {
		let active = self.active_id();
		let pattern = self
			.inner
			.quiver
			.get(&active)
			.map_or(NOT_FOUND_PATTERN, |arrow| arrow.pattern().pattern());
		format!("{}{}", self.inner.base_path, pattern)
	}

	/// Returns the normalized base path.
	pub fn base_path(&self) -> &str {
		&self.inner.base_path
	}

	/// Drops the loaded model of `id` so the next navigation reloads it.
	///
	/// Returns whether a model was dropped.
	pub fn evict_model(&self, id: &str) -> bool {
		let evicted = self.inner.cache.evict(id);
		if evicted {
			debug!(route = %id, "route model evicted");
		}
		evicted
	}

	/// Calls `f` after every change of the active route.
	pub fn subscribe(&self, f: impl Fn(&ActiveRoute) + 'static) -> SubscriptionId {
		self.inner.state.subscribe(f)
	}

	/// Removes a subscriber registered with [`subscribe`](Self::subscribe).
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		self.inner.state.unsubscribe(id)
	}

	/// Activates the route matching the port's current location without
	/// pushing a history entry.
	///
	/// Runs on every back/forward navigation.
	///
	/// # Errors
	///
	/// Returns [`RouterError::LoadFailed`] or [`RouterError::ActivationFailed`];
	/// the active route is unchanged in both cases.
	pub async fn sync_with_location(&self) -> RouterResult<()> {
		let (id, params) = self.find_by_url(&self.inner.port.current_path());
		let generation = self.next_generation();
		match self.inner.quiver.get(&id) {
			Some(arrow) => self.activate(arrow, params, generation).await,
			None => {
				debug!(url = %self.inner.port.current_path(), "no route matches location");
				self.commit(&id);
				Ok(())
			}
		}
	}

	async fn activate(
		&self,
		arrow: &Arrow<M>,
		params: ExtraParams,
		generation: u64,
	) -> RouterResult<()> {
		let model = self.inner.cache.ensure(arrow).wait().await?;
		if self.is_superseded(generation) {
			debug!(route = %arrow.id(), "navigation superseded while loading");
			return Ok(());
		}

		if let Some(callback) = arrow.on_activated() {
			let activation = Activation {
				id: arrow.id().to_string(),
				model,
				params,
			};
			callback(activation)
				.await
				.map_err(|source| RouterError::activation_failed(arrow.id(), source))?;
			if self.is_superseded(generation) {
				debug!(route = %arrow.id(), "navigation superseded during activation");
				return Ok(());
			}
		}

		self.commit(arrow.id());
		Ok(())
	}

	fn next_generation(&self) -> u64 {
		let generation = self.inner.generation.get().wrapping_add(1);
		self.inner.generation.set(generation);
		generation
	}

	fn is_superseded(&self, generation: u64) -> bool {
		self.inner.generation.get() != generation
	}

	fn commit(&self, id: &str) {
		self.inner.state.update(|state| {
			state.previous = std::mem::replace(&mut state.active, id.to_string());
		});
		debug!(route = %id, "route activated");
	}

	fn arrow(&self, id: &str) -> RouterResult<&Arrow<M>> {
		self.inner
			.quiver
			.get(id)
			.ok_or_else(|| RouterError::NotFound(id.to_string()))
	}

	fn fill(&self, arrow: &Arrow<M>, params: &ExtraParams) -> RouterResult<String> {
		let path = arrow.pattern().fill(params)?;
		Ok(format!("{}{}", self.inner.base_path, path))
	}

	fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
		let base = self.inner.base_path.as_str();
		if base.is_empty() {
			return Some(path);
		}
		match path.strip_prefix(base)? {
			"" => Some("/"),
			rest if rest.starts_with('/') => Some(rest),
			_ => None,
		}
	}

	fn spawn_load(&self, arrow: &Arrow<M>) {
		let LoadHandle::Pending(load) = self.inner.cache.ensure(arrow) else {
			return;
		};
		let id = arrow.id().to_string();
		let spawned = self.inner.spawner.spawn_local(async move {
			if let Err(err) = load.await {
				error!(route = %id, error = %err, "background model load failed");
			}
		});
		if let Err(err) = spawned {
			error!(route = %arrow.id(), error = %err, "failed to spawn model load");
		}
	}
}

impl<M: 'static> fmt::Debug for Router<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.get();
		f.debug_struct("Router")
			.field("base_path", &self.inner.base_path)
			.field("active", &state.active)
			.field("previous", &state.previous)
			.field("quiver", &self.inner.quiver)
			.field("cache", &self.inner.cache)
			.finish()
	}
}
