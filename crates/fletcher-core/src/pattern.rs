//! Path pattern parsing, filling and matching.
//!
//! A pattern is a `/`-separated list of segments. Each segment is one of:
//!
//! - a literal, stored percent-encoded and compared verbatim,
//! - a template containing one or more `[name]` placeholders,
//! - a glob (`*` or `**`), used by the not-found catch-all.
//!
//! # Matching
//!
//! Literal-only patterns must match the whole URL path. Parametrized patterns
//! compare segment by segment and stop as soon as either side runs out, so
//! `/hello/[name]` also accepts `/hello` and `/hello/John/extra`. Every match
//! carries a [`Specificity`] which the router uses to pick between overlapping
//! patterns.

use crate::error::{RouterError, RouterResult};
use crate::params::{
	ExtraParams, Params, decode_component, encode_component, encode_query, insert_accumulating,
};

/// Pattern used by the not-found route when none is configured.
pub const NOT_FOUND_PATTERN: &str = "/**/*";

/// Maximum allowed length for a pattern string in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a pattern.
const MAX_PATH_SEGMENTS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
	Text(String),
	Param(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Glob(String),
	Template { raw: String, parts: Vec<TemplatePart> },
}

/// Ranking of a successful match; greater is more specific.
///
/// A match covering every segment of both pattern and URL beats a truncated
/// one. Otherwise, at the first position where two matches differ, a literal
/// segment beats a parameter segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity {
	full_length: bool,
	literal_mask: Vec<bool>,
}

/// Result of matching a URL path against a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
	/// Decoded path parameters, repeated names collected into lists.
	pub params: Params,
	/// How specific this match is.
	pub specificity: Specificity,
}

/// A parsed, normalized route pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
	pattern: String,
	segments: Vec<Segment>,
	param_names: Vec<String>,
}

impl PathPattern {
	/// Parses a pattern such as `/users/[id]/posts/[post]`.
	///
	/// Literal segments are percent-encoded; segments holding placeholders are
	/// kept as written and encoded per navigation.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidPattern`] if the pattern does not start
	/// with `/`, is too long, has too many segments, or contains an unbalanced
	/// or empty placeholder.
	pub fn new(pattern: &str) -> RouterResult<Self> {
		if !pattern.starts_with('/') {
			return Err(RouterError::invalid_pattern(pattern, "must start with '/'"));
		}
		if pattern.len() > MAX_PATTERN_LENGTH {
			return Err(RouterError::invalid_pattern(
				pattern,
				format!(
					"length {} exceeds maximum of {} bytes",
					pattern.len(),
					MAX_PATTERN_LENGTH
				),
			));
		}
		let segment_count = pattern.split('/').count();
		if segment_count > MAX_PATH_SEGMENTS {
			return Err(RouterError::invalid_pattern(
				pattern,
				format!(
					"{} segments exceed maximum of {}",
					segment_count, MAX_PATH_SEGMENTS
				),
			));
		}

		let mut segments = Vec::with_capacity(segment_count);
		let mut param_names: Vec<String> = Vec::new();

		for piece in pattern.split('/') {
			let segment = if piece.contains('[') || piece.contains(']') {
				let parts = parse_template(pattern, piece)?;
				for part in &parts {
					if let TemplatePart::Param(name) = part
						&& !param_names.contains(name)
					{
						param_names.push(name.clone());
					}
				}
				Segment::Template {
					raw: piece.to_string(),
					parts,
				}
			} else if piece == "*" || piece == "**" {
				Segment::Glob(piece.to_string())
			} else {
				Segment::Literal(encode_component(&decode_component(piece)))
			};
			segments.push(segment);
		}

		let pattern = segments
			.iter()
			.map(|segment| match segment {
				Segment::Literal(text) | Segment::Glob(text) => text.as_str(),
				Segment::Template { raw, .. } => raw.as_str(),
			})
			.collect::<Vec<_>>()
			.join("/");

		Ok(Self {
			pattern,
			segments,
			param_names,
		})
	}

	/// Returns the normalized pattern string.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the placeholder names in order of first appearance.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns whether the pattern has no placeholders.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Builds a concrete path from this pattern.
	///
	/// Each segment holding a supplied placeholder is filled and then
	/// percent-encoded as a whole; other segments are passed through as they
	/// are. Placeholders without a value are left in place. The query
	/// parameters are appended in the order they were supplied.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MultiValuePathParam`] if a placeholder used by
	/// this pattern is given a list value.
	pub fn fill(&self, params: &ExtraParams) -> RouterResult<String> {
		let mut pieces = Vec::with_capacity(self.segments.len());

		for segment in &self.segments {
			match segment {
				Segment::Literal(text) | Segment::Glob(text) => pieces.push(text.clone()),
				Segment::Template { raw, parts } => {
					let mut filled = String::with_capacity(raw.len());
					let mut substituted = false;
					for part in parts {
						match part {
							TemplatePart::Text(text) => filled.push_str(text),
							TemplatePart::Param(name) => match params.path.get(name) {
								Some(value) => {
									let value = value.as_single().ok_or_else(|| {
										RouterError::MultiValuePathParam(name.clone())
									})?;
									filled.push_str(value);
									substituted = true;
								}
								None => {
									filled.push('[');
									filled.push_str(name);
									filled.push(']');
								}
							},
						}
					}
					pieces.push(if substituted {
						encode_component(&filled)
					} else {
						raw.clone()
					});
				}
			}
		}

		let mut path = pieces.join("/");
		path.push_str(&encode_query(&params.query));
		Ok(path)
	}

	/// Matches a concrete URL path (without query string) against this pattern.
	pub fn matches(&self, path: &str) -> Option<PatternMatch> {
		let url: Vec<&str> = path.split('/').collect();
		let full_length = url.len() == self.segments.len();

		if self.is_exact() && !full_length {
			return None;
		}

		let mut params = Params::new();
		let mut literal_mask = Vec::with_capacity(self.segments.len());

		for (segment, url_piece) in self.segments.iter().zip(url.iter()) {
			match segment {
				Segment::Literal(literal) => {
					if !literal_matches(literal, url_piece) {
						return None;
					}
					literal_mask.push(true);
				}
				Segment::Glob(_) => literal_mask.push(false),
				Segment::Template { parts, .. } => {
					capture_template(parts, &decode_component(url_piece), &mut params)?;
					literal_mask.push(false);
				}
			}
		}

		Some(PatternMatch {
			params,
			specificity: Specificity {
				full_length,
				literal_mask,
			},
		})
	}

	/// Checks whether `path` matches this pattern.
	pub fn is_match(&self, path: &str) -> bool {
		self.matches(path).is_some()
	}
}

impl PartialEq for PathPattern {
	fn eq(&self, other: &Self) -> bool {
		self.pattern == other.pattern
	}
}

impl Eq for PathPattern {}

impl std::fmt::Display for PathPattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.pattern)
	}
}

fn parse_template(pattern: &str, piece: &str) -> RouterResult<Vec<TemplatePart>> {
	let mut parts = Vec::new();
	let mut text = String::new();
	let mut chars = piece.chars();

	while let Some(c) = chars.next() {
		match c {
			'[' => {
				let mut name = String::new();
				let mut closed = false;
				for next in chars.by_ref() {
					match next {
						']' => {
							closed = true;
							break;
						}
						'[' => {
							return Err(RouterError::invalid_pattern(
								pattern,
								"nested '[' in placeholder",
							));
						}
						_ => name.push(next),
					}
				}
				if !closed {
					return Err(RouterError::invalid_pattern(pattern, "unclosed '['"));
				}
				if name.is_empty() {
					return Err(RouterError::invalid_pattern(pattern, "empty placeholder"));
				}
				if !text.is_empty() {
					parts.push(TemplatePart::Text(std::mem::take(&mut text)));
				}
				parts.push(TemplatePart::Param(name));
			}
			']' => return Err(RouterError::invalid_pattern(pattern, "unmatched ']'")),
			_ => text.push(c),
		}
	}

	if !text.is_empty() {
		parts.push(TemplatePart::Text(text));
	}
	Ok(parts)
}

fn literal_matches(literal: &str, url_piece: &str) -> bool {
	literal == url_piece || literal == encode_component(&decode_component(url_piece))
}

/// Captures the placeholders of one template segment from a decoded URL segment.
///
/// Text between placeholders must appear literally; a placeholder directly
/// followed by text captures up to the next occurrence of that text, and a
/// trailing placeholder captures the rest.
fn capture_template(parts: &[TemplatePart], decoded: &str, params: &mut Params) -> Option<()> {
	let mut rest = decoded;
	let mut iter = parts.iter().peekable();

	while let Some(part) = iter.next() {
		match part {
			TemplatePart::Text(text) => {
				rest = rest.strip_prefix(text.as_str())?;
			}
			TemplatePart::Param(name) => {
				let value = match iter.peek() {
					Some(TemplatePart::Text(next_text)) => {
						let end = rest.find(next_text.as_str())?;
						let (value, tail) = rest.split_at(end);
						rest = tail;
						value
					}
					_ => std::mem::take(&mut rest),
				};
				insert_accumulating(params, name, value.to_string());
			}
		}
	}

	rest.is_empty().then_some(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::params::ParamValue;
	use rstest::rstest;

	fn single(value: &str) -> ParamValue {
		ParamValue::from(value)
	}

	#[rstest]
	fn test_exact_pattern() {
		let pattern = PathPattern::new("/page-a").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/page-a"));
		assert!(!pattern.is_match("/page-a/more"));
		assert!(!pattern.is_match("/page-b"));
	}

	#[rstest]
	fn test_root_pattern() {
		let pattern = PathPattern::new("/").unwrap();
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/page-a"));
	}

	#[rstest]
	fn test_literal_segments_are_normalized() {
		let pattern = PathPattern::new("/hello world/[name]").unwrap();
		assert_eq!(pattern.pattern(), "/hello%20world/[name]");

		let encoded = PathPattern::new("/hello%20world").unwrap();
		assert_eq!(encoded.pattern(), "/hello%20world");
	}

	#[rstest]
	fn test_single_param() {
		let pattern = PathPattern::new("/hello/[name]").unwrap();
		let matched = pattern.matches("/hello/Molly%20Schwartz").unwrap();

		assert_eq!(matched.params.get("name"), Some(&single("Molly Schwartz")));
		assert_eq!(pattern.param_names(), &["name"]);
	}

	#[rstest]
	fn test_repeated_param_collects_values() {
		let pattern = PathPattern::new("/files/[part]/[part]/[part]").unwrap();
		let matched = pattern.matches("/files/a/b/c").unwrap();

		assert_eq!(
			matched.params.get("part"),
			Some(&ParamValue::from(vec!["a", "b", "c"]))
		);
		assert_eq!(pattern.param_names(), &["part"]);
	}

	#[rstest]
	fn test_two_params_in_one_segment() {
		let pattern = PathPattern::new("/range/[from]-[to]").unwrap();
		let matched = pattern.matches("/range/3-9").unwrap();

		assert_eq!(matched.params.get("from"), Some(&single("3")));
		assert_eq!(matched.params.get("to"), Some(&single("9")));
		assert!(!pattern.is_match("/range/39"));
	}

	#[rstest]
	fn test_permissive_match_on_length_mismatch() {
		let pattern = PathPattern::new("/hello/[name]").unwrap();

		let shorter = pattern.matches("/hello").unwrap();
		assert!(shorter.params.is_empty());
		assert!(!shorter.specificity.full_length);

		let longer = pattern.matches("/hello/John/extra").unwrap();
		assert_eq!(longer.params.get("name"), Some(&single("John")));
		assert!(!longer.specificity.full_length);

		assert!(!pattern.is_match("/goodbye/John"));
	}

	#[rstest]
	fn test_literal_beats_param_at_same_position() {
		let literal = PathPattern::new("/users/me").unwrap();
		let param = PathPattern::new("/users/[id]").unwrap();

		let literal_match = literal.matches("/users/me").unwrap();
		let param_match = param.matches("/users/me").unwrap();
		assert!(literal_match.specificity > param_match.specificity);
	}

	#[rstest]
	fn test_full_length_beats_truncated() {
		let short = PathPattern::new("/docs/[page]").unwrap();
		let long = PathPattern::new("/docs/[section]/[page]").unwrap();

		let short_match = short.matches("/docs/intro/setup").unwrap();
		let long_match = long.matches("/docs/intro/setup").unwrap();
		assert!(long_match.specificity > short_match.specificity);
	}

	#[rstest]
	fn test_fill_path_param() {
		let pattern = PathPattern::new("/hello/[name]").unwrap();

		let john = ExtraParams::new().with_path("name", "John");
		assert_eq!(pattern.fill(&john).unwrap(), "/hello/John");

		let molly = ExtraParams::new().with_path("name", "Molly Schwartz");
		assert_eq!(pattern.fill(&molly).unwrap(), "/hello/Molly%20Schwartz");
	}

	#[rstest]
	fn test_fill_repeated_placeholder_in_segment() {
		let pattern = PathPattern::new("/echo/[word]-[word]").unwrap();
		let params = ExtraParams::new().with_path("word", "hey");

		assert_eq!(pattern.fill(&params).unwrap(), "/echo/hey-hey");
	}

	#[rstest]
	fn test_fill_with_query() {
		let pattern = PathPattern::new("/page-a").unwrap();
		let params = ExtraParams::new()
			.with_query("from", "Carrot Top")
			.with_query("message", "hi");

		assert_eq!(
			pattern.fill(&params).unwrap(),
			"/page-a?from=Carrot%20Top&message=hi"
		);
	}

	#[rstest]
	fn test_fill_missing_param_keeps_placeholder() {
		let pattern = PathPattern::new("/hello/[name]").unwrap();
		assert_eq!(pattern.fill(&ExtraParams::new()).unwrap(), "/hello/[name]");
	}

	#[rstest]
	fn test_fill_rejects_list_path_param() {
		let pattern = PathPattern::new("/hello/[name]").unwrap();
		let params = ExtraParams::new().with_path("name", vec!["a", "b"]);

		assert!(matches!(
			pattern.fill(&params),
			Err(RouterError::MultiValuePathParam(name)) if name == "name"
		));
	}

	#[rstest]
	fn test_fill_ignores_unused_list_param() {
		let pattern = PathPattern::new("/page-a").unwrap();
		let params = ExtraParams::new().with_path("other", vec!["a", "b"]);

		assert_eq!(pattern.fill(&params).unwrap(), "/page-a");
	}

	#[rstest]
	fn test_glob_segments_are_not_encoded() {
		let pattern = PathPattern::new(NOT_FOUND_PATTERN).unwrap();
		assert_eq!(pattern.pattern(), "/**/*");
	}

	#[rstest]
	#[case("hello", "must start with '/'")]
	#[case("/hello/[name", "unclosed '['")]
	#[case("/hello/name]", "unmatched ']'")]
	#[case("/hello/[]", "empty placeholder")]
	#[case("/hello/[a[b]]", "nested '['")]
	fn test_invalid_patterns(#[case] pattern: &str, #[case] reason: &str) {
		let err = PathPattern::new(pattern).unwrap_err();
		assert!(err.to_string().contains(reason), "{err}");
	}

	#[rstest]
	fn test_pattern_rejects_excessive_segments() {
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let pattern = format!("/{}", segments.join("/"));

		let result = PathPattern::new(&pattern);
		assert!(result.unwrap_err().to_string().contains("exceed maximum"));
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = PathPattern::new("/users/[id]").unwrap();
		let p2 = PathPattern::new("/users/[id]").unwrap();
		let p3 = PathPattern::new("/users/[user_id]").unwrap();

		assert_eq!(format!("{}", p1), "/users/[id]");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
