//! The route table.
//!
//! A [`Quiver`] maps route identifiers to [`Arrow`]s. It is built once through
//! [`QuiverBuilder`] and never changes afterwards; the load state of deferred
//! models lives in the router's [`LoadCache`](crate::cache::LoadCache), not here.

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use indexmap::IndexMap;

use crate::error::{BoxError, RouterError, RouterResult};
use crate::params::ExtraParams;
use crate::pattern::{NOT_FOUND_PATTERN, PathPattern};

/// Reserved identifier of the not-found route.
pub const NOT_FOUND_ID: &str = "%404%";

/// Future produced by a model loader.
pub type ModelFuture<M> = LocalBoxFuture<'static, Result<M, BoxError>>;

/// Zero-argument producer of a route model.
pub type Loader<M> = Rc<dyn Fn() -> ModelFuture<M>>;

/// Callback run every time a route becomes active.
pub type OnActivated<M> = Rc<dyn Fn(Activation<M>) -> LocalBoxFuture<'static, Result<(), BoxError>>>;

/// Argument passed to an activation callback.
#[derive(Debug)]
pub struct Activation<M> {
	/// Identifier of the route being activated.
	pub id: String,
	/// The route's resolved model.
	pub model: Rc<M>,
	/// Parameters the navigation was issued with.
	pub params: ExtraParams,
}

/// Where a route's model comes from.
pub enum ModelSource<M> {
	/// The model is available up front.
	Resolved(Rc<M>),
	/// The model is produced on demand, at most once per successful load.
	Deferred(Loader<M>),
}

impl<M> Clone for ModelSource<M> {
	fn clone(&self) -> Self {
		match self {
			Self::Resolved(model) => Self::Resolved(Rc::clone(model)),
			Self::Deferred(loader) => Self::Deferred(Rc::clone(loader)),
		}
	}
}

impl<M> fmt::Debug for ModelSource<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Resolved(_) => f.write_str("Resolved"),
			Self::Deferred(_) => f.write_str("Deferred"),
		}
	}
}

/// Ergonomic description of one route, turned into an [`Arrow`] at build time.
pub struct RouteConfig<M> {
	path: String,
	source: ModelSource<M>,
	on_activated: Option<OnActivated<M>>,
}

impl<M: 'static> RouteConfig<M> {
	/// A route whose model is available immediately.
	pub fn model(path: impl Into<String>, model: M) -> Self {
		Self::shared(path, Rc::new(model))
	}

	/// A route whose model is already shared elsewhere.
	pub fn shared(path: impl Into<String>, model: Rc<M>) -> Self {
		Self {
			path: path.into(),
			source: ModelSource::Resolved(model),
			on_activated: None,
		}
	}

	/// A route whose model is produced by `loader` on first use.
	///
	/// # Examples
	///
	/// ```
	/// use fletcher_core::RouteConfig;
	///
	/// let config = RouteConfig::loader("/slow", || async {
	///     Ok::<_, std::io::Error>("<p>slow</p>".to_string())
	/// });
	/// # let _ = config;
	/// ```
	pub fn loader<F, Fut, E>(path: impl Into<String>, loader: F) -> Self
	where
		F: Fn() -> Fut + 'static,
		Fut: Future<Output = Result<M, E>> + 'static,
		E: Into<BoxError>,
	{
		let loader: Loader<M> = Rc::new(move || {
			loader()
				.map(|result| result.map_err(Into::<BoxError>::into))
				.boxed_local()
		});
		Self {
			path: path.into(),
			source: ModelSource::Deferred(loader),
			on_activated: None,
		}
	}

	/// Sets the callback run every time this route becomes active.
	pub fn on_activated<F, Fut, E>(mut self, callback: F) -> Self
	where
		F: Fn(Activation<M>) -> Fut + 'static,
		Fut: Future<Output = Result<(), E>> + 'static,
		E: Into<BoxError>,
	{
		let callback: OnActivated<M> = Rc::new(move |activation: Activation<M>| {
			callback(activation)
				.map(|result| result.map_err(Into::<BoxError>::into))
				.boxed_local()
		});
		self.on_activated = Some(callback);
		self
	}
}

/// One named entry of the quiver.
pub struct Arrow<M> {
	id: String,
	pattern: PathPattern,
	source: ModelSource<M>,
	on_activated: Option<OnActivated<M>>,
}

impl<M> Arrow<M> {
	/// Returns the route identifier.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Returns the parsed path pattern.
	pub fn pattern(&self) -> &PathPattern {
		&self.pattern
	}

	/// Returns where the model comes from.
	pub fn source(&self) -> &ModelSource<M> {
		&self.source
	}

	/// Returns the activation callback, if any.
	pub fn on_activated(&self) -> Option<&OnActivated<M>> {
		self.on_activated.as_ref()
	}
}

impl<M> fmt::Debug for Arrow<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Arrow")
			.field("id", &self.id)
			.field("pattern", &self.pattern.pattern())
			.field("source", &self.source)
			.field("on_activated", &self.on_activated.is_some())
			.finish()
	}
}

/// Builder for a [`Quiver`].
///
/// # Examples
///
/// ```
/// use fletcher_core::{QuiverBuilder, RouteConfig};
///
/// let quiver = QuiverBuilder::new()
///     .arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
///     .arrow("hello", RouteConfig::model("/hello/[name]", "<p>hi</p>".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(quiver.navigable_ids(), vec!["home", "hello"]);
/// ```
pub struct QuiverBuilder<M> {
	entries: Vec<(String, RouteConfig<M>)>,
}

impl<M: 'static> Default for QuiverBuilder<M> {
	fn default() -> Self {
		Self::new()
	}
}

impl<M: 'static> QuiverBuilder<M> {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
		}
	}

	/// Adds a route. Table order is kept and breaks ranking ties in URL lookup.
	pub fn arrow(mut self, id: impl Into<String>, config: RouteConfig<M>) -> Self {
		self.entries.push((id.into(), config));
		self
	}

	/// Adds the not-found route. An empty path selects [`NOT_FOUND_PATTERN`].
	pub fn not_found(self, config: RouteConfig<M>) -> Self {
		self.arrow(NOT_FOUND_ID, config)
	}

	/// Validates the configuration and freezes it into a [`Quiver`].
	///
	/// # Errors
	///
	/// Fails on an empty or reserved identifier, a duplicate identifier, or an
	/// unparsable pattern.
	pub fn build(self) -> RouterResult<Quiver<M>> {
		let mut arrows = IndexMap::with_capacity(self.entries.len());

		for (id, config) in self.entries {
			if id.is_empty() || (is_reserved(&id) && id != NOT_FOUND_ID) {
				return Err(RouterError::InvalidRouteId(id));
			}
			if arrows.contains_key(&id) {
				return Err(RouterError::DuplicateRoute(id));
			}

			let path = if id == NOT_FOUND_ID && config.path.is_empty() {
				NOT_FOUND_PATTERN
			} else {
				config.path.as_str()
			};
			let pattern = PathPattern::new(path)?;

			arrows.insert(
				id.clone(),
				Arrow {
					id,
					pattern,
					source: config.source,
					on_activated: config.on_activated,
				},
			);
		}

		Ok(Quiver { arrows })
	}
}

/// The frozen route table.
pub struct Quiver<M> {
	arrows: IndexMap<String, Arrow<M>>,
}

impl<M> Quiver<M> {
	/// Returns the route registered under `id`.
	pub fn get(&self, id: &str) -> Option<&Arrow<M>> {
		self.arrows.get(id)
	}

	/// Returns whether `id` is a key of the table.
	pub fn contains(&self, id: &str) -> bool {
		self.arrows.contains_key(id)
	}

	/// Iterates over every route in table order.
	pub fn iter(&self) -> impl Iterator<Item = &Arrow<M>> {
		self.arrows.values()
	}

	/// Returns the configured not-found route.
	pub fn not_found(&self) -> Option<&Arrow<M>> {
		self.arrows.get(NOT_FOUND_ID)
	}

	/// Returns the identifiers a URL can resolve to, in table order.
	pub fn navigable_ids(&self) -> Vec<&str> {
		self.arrows
			.keys()
			.map(String::as_str)
			.filter(|id| is_navigable_id(id))
			.collect()
	}

	/// Returns the number of routes, the not-found route included.
	pub fn len(&self) -> usize {
		self.arrows.len()
	}

	/// Returns whether the table is empty.
	pub fn is_empty(&self) -> bool {
		self.arrows.is_empty()
	}
}

impl<M> fmt::Debug for Quiver<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.arrows.values()).finish()
	}
}

/// Returns whether `id` has the reserved `%name%` form.
pub fn is_reserved(id: &str) -> bool {
	id.len() >= 2 && id.starts_with('%') && id.ends_with('%')
}

/// Returns whether `id` can be the result of a URL lookup.
pub(crate) fn is_navigable_id(id: &str) -> bool {
	!is_reserved(id) && !id.contains('[')
}
