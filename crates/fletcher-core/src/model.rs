//! Route models and the value handed to the renderer.

use std::rc::Rc;

/// Markup rendered when no route applies.
pub const NOT_FOUND_TEMPLATE: &str = "<div class=\"fletcher-unknown-page\"><h1>404 Error: Page not found</h1><h2>Something is missing...</h2></div>";

/// A route's content model.
///
/// The router never inspects models beyond this trait; everything else is
/// left to the application's renderer.
pub trait RouteModel {
	/// Returns the markup template for this route.
	fn template(&self) -> &str;
}

impl RouteModel for String {
	fn template(&self) -> &str {
		self
	}
}

impl RouteModel for &'static str {
	fn template(&self) -> &str {
		self
	}
}

/// The model the renderer should show.
#[derive(Debug)]
pub enum PulledModel<M> {
	/// A loaded route model.
	Route(Rc<M>),
	/// No loaded model is available; render the built-in not-found page.
	NotFound,
}

impl<M> Clone for PulledModel<M> {
	fn clone(&self) -> Self {
		match self {
			Self::Route(model) => Self::Route(Rc::clone(model)),
			Self::NotFound => Self::NotFound,
		}
	}
}

impl<M> PulledModel<M> {
	/// Returns the route model, if any.
	pub fn route(&self) -> Option<&Rc<M>> {
		match self {
			Self::Route(model) => Some(model),
			Self::NotFound => None,
		}
	}

	/// Returns whether this is the built-in not-found page.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound)
	}
}

impl<M: RouteModel> PulledModel<M> {
	/// Returns the template to render.
	pub fn template(&self) -> &str {
		match self {
			Self::Route(model) => model.template(),
			Self::NotFound => NOT_FOUND_TEMPLATE,
		}
	}
}
