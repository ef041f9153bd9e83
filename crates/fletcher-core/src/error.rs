//! Error types for client-side routing.

use std::sync::Arc;

use thiserror::Error;

/// Error produced by user-supplied model loaders and activation callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Cloneable form of [`BoxError`].
///
/// A failed load is observed by every caller that joined the same in-flight
/// load, so the underlying error has to be shared rather than moved.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// Error type for router operations.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum RouterError {
	/// A route pattern could not be parsed.
	#[error("invalid route pattern '{pattern}': {reason}")]
	InvalidPattern {
		/// The offending pattern.
		pattern: String,
		/// Why the pattern was rejected.
		reason: String,
	},

	/// A route identifier is empty or uses a reserved form.
	#[error("invalid route id: '{0}'")]
	InvalidRouteId(String),

	/// The same identifier was configured twice.
	#[error("route already registered: {0}")]
	DuplicateRoute(String),

	/// The identifier is not a key of the quiver.
	#[error("route not found: {0}")]
	NotFound(String),

	/// A list value was supplied for a path parameter.
	#[error("path parameter '{0}' cannot take multiple values")]
	MultiValuePathParam(String),

	/// The route's model loader failed.
	#[error("failed to load model for route '{id}': {source}")]
	LoadFailed {
		/// Route whose loader failed.
		id: String,
		/// Error returned by the loader.
		source: SharedError,
	},

	/// The route's activation callback failed.
	#[error("activation callback for route '{id}' failed: {source}")]
	ActivationFailed {
		/// Route whose callback failed.
		id: String,
		/// Error returned by the callback.
		source: SharedError,
	},

	/// The navigation port refused the history update.
	#[error("navigation failed: {0}")]
	NavigationFailed(String),

	/// A link outlived the router it was created by.
	#[error("router has been dropped")]
	RouterDropped,

	/// Router settings are malformed.
	#[error("invalid router settings: {0}")]
	Settings(String),
}

impl RouterError {
	pub(crate) fn load_failed(id: &str, source: BoxError) -> Self {
		Self::LoadFailed {
			id: id.to_string(),
			source: Arc::from(source),
		}
	}

	pub(crate) fn activation_failed(id: &str, source: BoxError) -> Self {
		Self::ActivationFailed {
			id: id.to_string(),
			source: Arc::from(source),
		}
	}

	pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
		Self::InvalidPattern {
			pattern: pattern.to_string(),
			reason: reason.into(),
		}
	}
}
