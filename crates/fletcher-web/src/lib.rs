//! Browser adapters for the fletcher router.
//!
//! This crate connects [`fletcher_core::Router`] to the browser:
//!
//! - [`BrowserHistory`] implements [`NavigationPort`](fletcher_core::NavigationPort)
//!   on top of the History API and the `popstate` event
//! - [`WasmSpawner`] runs background loads with `wasm_bindgen_futures::spawn_local`
//! - [`bind_link`] wires a [`Link`](fletcher_core::Link) to a mounted anchor
//!
//! # WASM Only
//!
//! Everything here is compiled for `wasm32` targets only. On other targets the
//! crate is empty; use [`MemoryHistory`](fletcher_core::MemoryHistory) there.
//!
//! ## Example
//!
//! ```ignore
//! use fletcher_core::{QuiverBuilder, RouteConfig, RouterSettings};
//! use fletcher_web::browser_router;
//!
//! let quiver = QuiverBuilder::new()
//!     .arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
//!     .build()?;
//! let router = browser_router(quiver, RouterSettings::default())?;
//! ```

#[cfg(target_arch = "wasm32")]
mod event;
#[cfg(target_arch = "wasm32")]
mod history;
#[cfg(target_arch = "wasm32")]
mod spawn;

#[cfg(target_arch = "wasm32")]
pub use event::{DomEvent, bind_link};
#[cfg(target_arch = "wasm32")]
pub use history::BrowserHistory;
#[cfg(target_arch = "wasm32")]
pub use spawn::WasmSpawner;

#[cfg(target_arch = "wasm32")]
use fletcher_core::{Quiver, Router, RouterResult, RouterSettings};

/// Builds a router driven by the browser's history.
///
/// # Errors
///
/// Returns [`RouterError::NavigationFailed`](fletcher_core::RouterError::NavigationFailed)
/// if there is no global `window`, or [`RouterError::Settings`](fletcher_core::RouterError::Settings)
/// if `settings` do not validate.
#[cfg(target_arch = "wasm32")]
pub fn browser_router<M: 'static>(
	quiver: Quiver<M>,
	settings: RouterSettings,
) -> RouterResult<Router<M>> {
	Router::builder(quiver)
		.settings(settings)
		.build(BrowserHistory::new()?, WasmSpawner)
}

/// Forwards Rust panics to the browser console.
#[cfg(all(target_arch = "wasm32", feature = "console_error_panic_hook"))]
pub fn install_panic_hook() {
	console_error_panic_hook::set_once();
}
