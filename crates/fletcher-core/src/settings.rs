//! Router settings.

use serde::Deserialize;

use crate::error::{RouterError, RouterResult};
use crate::params::{decode_component, encode_component};

/// Settings applied when a router is built.
///
/// # Examples
///
/// ```
/// use fletcher_core::RouterSettings;
///
/// let settings = RouterSettings::from_toml_str(
///     r#"
///     base_path = "/app/"
///     first_arrow = "home"
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(settings.normalized_base_path(), "/app");
/// assert_eq!(settings.first_arrow.as_deref(), Some("home"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterSettings {
	/// Prefix of every route path, such as `/app`. Empty for none.
	pub base_path: String,
	/// Route to activate first instead of resolving the current location.
	pub first_arrow: Option<String>,
}

impl RouterSettings {
	/// Creates default settings: no base path, initial route from the location.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the base path.
	pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
		self.base_path = base_path.into();
		self
	}

	/// Sets the first route to activate.
	pub fn with_first_arrow(mut self, id: impl Into<String>) -> Self {
		self.first_arrow = Some(id.into());
		self
	}

	/// Parses and validates settings from TOML.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Settings`] if the input is not valid TOML, has
	/// unknown keys, or fails [`validate`](Self::validate).
	pub fn from_toml_str(content: &str) -> RouterResult<Self> {
		let settings: Self =
			toml::from_str(content).map_err(|e| RouterError::Settings(e.to_string()))?;
		settings.validate()?;
		Ok(settings)
	}

	/// Checks that the base path is empty or starts with `/`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Settings`] describing the problem.
	pub fn validate(&self) -> RouterResult<()> {
		if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
			return Err(RouterError::Settings(format!(
				"base_path '{}' must be empty or start with '/'",
				self.base_path
			)));
		}
		if let Some(first) = &self.first_arrow
			&& first.is_empty()
		{
			return Err(RouterError::Settings("first_arrow must not be empty".to_string()));
		}
		Ok(())
	}

	/// Returns the base path without a trailing `/`, each segment
	/// percent-encoded.
	pub fn normalized_base_path(&self) -> String {
		let trimmed = self.base_path.trim_end_matches('/');
		if trimmed.is_empty() {
			return String::new();
		}
		trimmed
			.split('/')
			.map(|segment| encode_component(&decode_component(segment)))
			.collect::<Vec<_>>()
			.join("/")
	}
}
