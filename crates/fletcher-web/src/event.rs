//! DOM event glue for links.

use fletcher_core::{Link, NoDefault, PreventDefault, RouterResult};
use tracing::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

use crate::history::js_error;

/// A DOM event seen through [`PreventDefault`].
#[derive(Debug, Clone, Copy)]
pub struct DomEvent<'a>(pub &'a Event);

impl PreventDefault for DomEvent<'_> {
	fn prevent_default(&self) {
		self.0.prevent_default();
	}
}

/// Wires `link` to a mounted anchor element.
///
/// Sets the element's `href` and text, stores the element in the link's
/// element slot, and registers a click listener that navigates through the
/// router instead of reloading the page.
///
/// # Errors
///
/// Returns [`RouterError::NavigationFailed`](fletcher_core::RouterError::NavigationFailed)
/// if the element rejects the attribute or the listener.
pub fn bind_link<M: 'static>(link: &Link<M>, element: &Element) -> RouterResult<()> {
	element.set_attribute("href", link.href()).map_err(js_error)?;
	element.set_text_content(Some(link.label()));

	let target = link.clone();
	let click_handler = Closure::wrap(Box::new(move |event: Event| {
		// The browser only honours preventDefault during dispatch.
		DomEvent(&event).prevent_default();
		let link = target.clone();
		wasm_bindgen_futures::spawn_local(async move {
			if let Err(err) = link.click(&NoDefault).await {
				error!(route = %link.target(), error = %err, "link navigation failed");
			}
		});
	}) as Box<dyn FnMut(_)>);

	element
		.add_event_listener_with_callback("click", click_handler.as_ref().unchecked_ref())
		.map_err(js_error)?;
	click_handler.forget();

	link.set_element(element.clone());
	Ok(())
}
