//! Navigation links.
//!
//! A [`Link`] is created by [`Router::get_link`] and cached by the router, so
//! every request for the same route returns the same link. Renderers that
//! diff by identity can rely on [`Link::ptr_eq`].

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{RouterError, RouterResult};
use crate::history::PreventDefault;
use crate::router::{Router, RouterInner};

type FollowedHook<M> = Rc<dyn Fn(&Link<M>)>;

struct LinkInner<M: 'static> {
	router: Weak<RouterInner<M>>,
	target: String,
	href: String,
	label: String,
	element: RefCell<Option<Box<dyn Any>>>,
	on_followed: RefCell<Option<FollowedHook<M>>>,
}

/// A reusable handle to one route.
pub struct Link<M: 'static> {
	inner: Rc<LinkInner<M>>,
}

impl<M: 'static> Clone for Link<M> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<M: 'static> Link<M> {
	pub(crate) fn new(
		router: Weak<RouterInner<M>>,
		target: String,
		href: String,
		label: String,
	) -> Self {
		Self {
			inner: Rc::new(LinkInner {
				router,
				target,
				href,
				label,
				element: RefCell::new(None),
				on_followed: RefCell::new(None),
			}),
		}
	}

	/// Returns the target route identifier.
	pub fn target(&self) -> &str {
		&self.inner.target
	}

	/// Returns the ready-to-render `href`.
	pub fn href(&self) -> &str {
		&self.inner.href
	}

	/// Returns the link text.
	pub fn label(&self) -> &str {
		&self.inner.label
	}

	/// Returns the router that created this link, if it is still alive.
	pub fn router(&self) -> Option<Router<M>> {
		self.inner.router.upgrade().map(Router::from_inner)
	}

	/// Returns whether both handles refer to the same link.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}

	/// Stores the element the renderer mounted for this link.
	///
	/// The router never reads this slot.
	pub fn set_element<E: Any>(&self, element: E) {
		*self.inner.element.borrow_mut() = Some(Box::new(element));
	}

	/// Calls `f` with the mounted element, if one of type `E` is set.
	pub fn with_element<E: Any, R>(&self, f: impl FnOnce(Option<&E>) -> R) -> R {
		let element = self.inner.element.borrow();
		f(element.as_ref().and_then(|e| e.downcast_ref::<E>()))
	}

	/// Returns whether an element is set.
	pub fn has_element(&self) -> bool {
		self.inner.element.borrow().is_some()
	}

	/// Clears the mounted element.
	pub fn clear_element(&self) {
		self.inner.element.borrow_mut().take();
	}

	/// Sets a hook run after a click-triggered navigation completed.
	pub fn set_on_followed(&self, hook: impl Fn(&Link<M>) + 'static) {
		*self.inner.on_followed.borrow_mut() = Some(Rc::new(hook));
	}

	/// Handles a click: suppresses the default action, then navigates to the
	/// target and runs the `on_followed` hook.
	///
	/// # Errors
	///
	/// Returns [`RouterError::RouterDropped`] if the router no longer exists, or
	/// any error of [`Router::pull`]. The hook does not run on error.
	pub async fn click<E: PreventDefault + ?Sized>(&self, event: &E) -> RouterResult<()> {
		event.prevent_default();
		let router = self.router().ok_or(RouterError::RouterDropped)?;
		router.pull(self.target(), None).await?;

		let hook = self.inner.on_followed.borrow().clone();
		if let Some(hook) = hook {
			hook(self);
		}
		Ok(())
	}
}

impl<M: 'static> fmt::Debug for Link<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Link")
			.field("target", &self.inner.target)
			.field("href", &self.inner.href)
			.field("label", &self.inner.label)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::NoDefault;
	use rstest::rstest;

	#[rstest]
	fn test_element_slot() {
		let link: Link<String> = Link::new(
			Weak::new(),
			"pageA".to_string(),
			"/page-a".to_string(),
			"pageA".to_string(),
		);

		assert!(!link.has_element());
		link.set_element(42_u32);
		assert_eq!(link.with_element(|e: Option<&u32>| e.copied()), Some(42));
		assert_eq!(link.with_element(|e: Option<&String>| e.cloned()), None);

		link.clear_element();
		assert!(!link.has_element());
	}

	#[rstest]
	fn test_click_without_router() {
		let link: Link<String> = Link::new(
			Weak::new(),
			"pageA".to_string(),
			"/page-a".to_string(),
			"pageA".to_string(),
		);

		let result = futures::executor::block_on(link.click(&NoDefault));
		assert!(matches!(result, Err(RouterError::RouterDropped)));
	}
}
