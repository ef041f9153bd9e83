//! # Fletcher
//!
//! A client-side router for single-page applications.
//!
//! Routes live in a frozen table (the quiver) keyed by identifier. Each route
//! has a path pattern such as `/hello/[name]` and either a ready model or an
//! async loader. The router resolves identifiers to URLs and back, loads each
//! model once no matter how many navigations ask for it, and keeps the browser
//! history in step with the active route.
//!
//! ## Feature Flags
//!
//! - `web` - Browser adapters (History API, `popstate`, `spawn_local`); `wasm32` only
//! - `console_error_panic_hook` - Readable panics in the browser console
//!
//! ## Quick Example
//!
//! ```
//! use fletcher::prelude::*;
//! use futures::executor::LocalPool;
//!
//! let quiver = QuiverBuilder::new()
//!     .arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
//!     .arrow("pageA", RouteConfig::model("/page-a", "<p>page A</p>".to_string()))
//!     .build()
//!     .unwrap();
//!
//! let mut pool = LocalPool::new();
//! let history = MemoryHistory::new("/");
//! let router = Router::builder(quiver)
//!     .build(history.clone(), pool.spawner())
//!     .unwrap();
//!
//! let params = ExtraParams::new()
//!     .with_query("from", "Carrot Top")
//!     .with_query("message", "hi");
//! pool.run_until(router.pull("pageA", Some(params))).unwrap();
//!
//! assert_eq!(router.active_id(), "pageA");
//! assert_eq!(
//!     history.entries(),
//!     vec!["/", "/page-a?from=Carrot%20Top&message=hi"]
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use fletcher_core::*;

#[cfg(feature = "web")]
#[cfg_attr(docsrs, doc(cfg(feature = "web")))]
pub use fletcher_web as web;

/// Commonly used types.
pub mod prelude {
	pub use fletcher_core::{
		ExtraParams, Link, MemoryHistory, NOT_FOUND_ID, NavigationPort, ParamValue, PulledModel,
		QuiverBuilder, RouteConfig, RouteModel, Router, RouterError, RouterResult, RouterSettings,
	};

	#[cfg(all(feature = "web", target_arch = "wasm32"))]
	pub use fletcher_web::{BrowserHistory, WasmSpawner, bind_link, browser_router};
}
