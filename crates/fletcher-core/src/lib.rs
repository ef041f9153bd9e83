//! Client-side routing core for single-page applications.
//!
//! A [`Quiver`] is a frozen table of named routes ("arrows"). Each route has a
//! path pattern and either a ready model or a loader producing one. A
//! [`Router`] built over the quiver resolves identifiers to URLs and back,
//! loads models on first use with at most one load in flight per route, and
//! tracks the active route while driving a [`NavigationPort`].
//!
//! ## Modules
//!
//! - [`pattern`]: path patterns, filling and matching
//! - [`params`]: parameter values and URL encoding
//! - [`quiver`]: the route table and its builder
//! - [`cache`]: deduplicated model loading
//! - [`history`]: the navigation port and an in-memory history
//! - [`link`]: identity-stable navigation links
//!
//! ## Example
//!
//! ```
//! use fletcher_core::{ExtraParams, MemoryHistory, QuiverBuilder, RouteConfig, Router};
//! use futures::executor::LocalPool;
//!
//! let quiver = QuiverBuilder::new()
//!     .arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
//!     .arrow("hello", RouteConfig::model("/hello/[name]", "<p>hello</p>".to_string()))
//!     .build()
//!     .unwrap();
//!
//! let mut pool = LocalPool::new();
//! let router = Router::builder(quiver)
//!     .build(MemoryHistory::new("/"), pool.spawner())
//!     .unwrap();
//!
//! let params = ExtraParams::new().with_path("name", "Molly Schwartz");
//! assert_eq!(
//!     router.path_for("hello", Some(&params)).unwrap(),
//!     "/hello/Molly%20Schwartz"
//! );
//!
//! pool.run_until(router.pull("hello", Some(params))).unwrap();
//! assert_eq!(router.active_id(), "hello");
//! ```

pub mod cache;
pub mod error;
pub mod history;
pub mod link;
pub mod model;
pub mod params;
pub mod pattern;
pub mod quiver;
pub mod reactive;
mod router;
pub mod settings;

pub use cache::{LoadHandle, ModelSlot, SharedLoad};
pub use error::{BoxError, RouterError, RouterResult, SharedError};
pub use history::{MemoryHistory, NavigationPort, NoDefault, PopHandler, PreventDefault};
pub use link::Link;
pub use model::{NOT_FOUND_TEMPLATE, PulledModel, RouteModel};
pub use params::{ExtraParams, ParamValue, Params};
pub use pattern::{NOT_FOUND_PATTERN, PathPattern, PatternMatch, Specificity};
pub use quiver::{
	Activation, Arrow, Loader, ModelFuture, ModelSource, NOT_FOUND_ID, OnActivated, Quiver,
	QuiverBuilder, RouteConfig,
};
pub use reactive::{Signal, SubscriptionId};
pub use router::{ActiveRoute, Router, RouterBuilder};
pub use settings::RouterSettings;
