//! History API navigation port.

use fletcher_core::{NavigationPort, PopHandler, RouterError, RouterResult};
use tracing::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

/// [`NavigationPort`] backed by `window.history` and `window.location`.
#[derive(Debug, Clone)]
pub struct BrowserHistory {
	window: Window,
}

impl BrowserHistory {
	/// Binds to the global `window`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::NavigationFailed`] outside a browser context.
	pub fn new() -> RouterResult<Self> {
		let window = web_sys::window()
			.ok_or_else(|| RouterError::NavigationFailed("no global window".to_string()))?;
		Ok(Self { window })
	}
}

impl NavigationPort for BrowserHistory {
	fn current_path(&self) -> String {
		let location = self.window.location();
		let path = location.pathname().unwrap_or_else(|_| "/".to_string());
		let search = location.search().unwrap_or_default();
		format!("{}{}", path, search)
	}

	fn push(&self, path: &str) -> RouterResult<()> {
		self.window
			.history()
			.and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(path)))
			.map_err(js_error)
	}

	// The listener lives as long as the page.
	fn on_pop(&self, handler: PopHandler) {
		let popstate_handler =
			Closure::wrap(Box::new(move |_event: Event| handler()) as Box<dyn FnMut(_)>);

		if let Err(err) = self
			.window
			.add_event_listener_with_callback("popstate", popstate_handler.as_ref().unchecked_ref())
		{
			error!(error = ?err, "failed to register popstate listener");
			return;
		}
		popstate_handler.forget();
	}
}

pub(crate) fn js_error(value: JsValue) -> RouterError {
	RouterError::NavigationFailed(
		value
			.as_string()
			.unwrap_or_else(|| format!("{:?}", value)),
	)
}
