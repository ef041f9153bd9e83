//! Route parameters and their URL encoding.
//!
//! Path and query parameters are kept in insertion order so that generated
//! query strings follow the order the caller supplied them in.

use std::borrow::Cow;

use indexmap::IndexMap;

/// A parameter value: one string, or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
	/// A single value.
	Single(String),
	/// Several values, in order.
	Multi(Vec<String>),
}

impl ParamValue {
	/// Returns the value if it is a single string.
	pub fn as_single(&self) -> Option<&str> {
		match self {
			Self::Single(value) => Some(value),
			Self::Multi(_) => None,
		}
	}

	/// Returns every value in order.
	pub fn values(&self) -> Vec<&str> {
		match self {
			Self::Single(value) => vec![value.as_str()],
			Self::Multi(values) => values.iter().map(String::as_str).collect(),
		}
	}

	/// Appends a value, promoting a single value into a two-element list.
	pub(crate) fn push(&mut self, value: String) {
		match self {
			Self::Single(first) => {
				let first = std::mem::take(first);
				*self = Self::Multi(vec![first, value]);
			}
			Self::Multi(values) => values.push(value),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::Multi(values)
	}
}

impl From<Vec<&str>> for ParamValue {
	fn from(values: Vec<&str>) -> Self {
		Self::Multi(values.into_iter().map(str::to_string).collect())
	}
}

/// Named parameters in insertion order.
pub type Params = IndexMap<String, ParamValue>;

/// Parameters supplied alongside a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraParams {
	/// Values substituted into the route's path placeholders.
	pub path: Params,
	/// Values appended as the query string.
	pub query: Params,
}

impl ExtraParams {
	/// Creates an empty parameter set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a path parameter.
	pub fn with_path(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.path.insert(name.into(), value.into());
		self
	}

	/// Adds a query parameter.
	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.query.insert(name.into(), value.into());
		self
	}

	/// Returns whether no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.path.is_empty() && self.query.is_empty()
	}
}

/// Records `value` under `name`, collecting repeated names into a list.
pub(crate) fn insert_accumulating(params: &mut Params, name: &str, value: String) {
	match params.get_mut(name) {
		Some(existing) => existing.push(value),
		None => {
			params.insert(name.to_string(), ParamValue::Single(value));
		}
	}
}

/// Percent-encodes one path segment or query component.
pub fn encode_component(input: &str) -> String {
	urlencoding::encode(input).into_owned()
}

/// Percent-decodes one path segment or query component.
///
/// Input that does not decode to valid UTF-8 is returned unchanged.
pub fn decode_component(input: &str) -> String {
	urlencoding::decode(input)
		.map(Cow::into_owned)
		.unwrap_or_else(|_| input.to_string())
}

/// Builds a `?`-prefixed query string, or an empty string for no parameters.
///
/// List values produce one `name=value` pair per element.
pub fn encode_query(query: &Params) -> String {
	let mut pairs = Vec::new();
	for (name, value) in query {
		let name = encode_component(name);
		for value in value.values() {
			pairs.push(format!("{}={}", name, encode_component(value)));
		}
	}

	if pairs.is_empty() {
		String::new()
	} else {
		format!("?{}", pairs.join("&"))
	}
}

/// Parses a query string (with or without the leading `?`).
///
/// Repeated names are collected into a list in order of appearance.
pub fn parse_query(query: &str) -> Params {
	let query = query.strip_prefix('?').unwrap_or(query);
	let mut params = Params::new();

	for pair in query.split('&').filter(|pair| !pair.is_empty()) {
		let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
		insert_accumulating(&mut params, &decode_component(name), decode_component(value));
	}

	params
}
