//! Browser tests for the History API adapter
//!
//! Run with `wasm-pack test --headless --chrome crates/fletcher-web`.

#![cfg(target_arch = "wasm32")]

use fletcher_core::{NavigationPort, QuiverBuilder, RouteConfig, RouterSettings};
use fletcher_web::{BrowserHistory, bind_link, browser_router};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn quiver() -> fletcher_core::Quiver<String> {
	QuiverBuilder::new()
		.arrow("home", RouteConfig::model("/", "<p>home</p>".to_string()))
		.arrow("pageA", RouteConfig::model("/page-a", "<p>page A</p>".to_string()))
		.build()
		.unwrap()
}

#[wasm_bindgen_test]
fn test_push_updates_location() {
	let history = BrowserHistory::new().unwrap();

	history.push("/fletcher-push?from=test").unwrap();

	assert_eq!(history.current_path(), "/fletcher-push?from=test");
}

#[wasm_bindgen_test]
async fn test_pull_pushes_browser_location() {
	let router = browser_router(quiver(), RouterSettings::default()).unwrap();

	router.pull("pageA", None).await.unwrap();

	let pathname = web_sys::window().unwrap().location().pathname().unwrap();
	assert_eq!(pathname, "/page-a");
	assert_eq!(router.active_id(), "pageA");
}

#[wasm_bindgen_test]
fn test_bind_link_sets_href_and_element() {
	let router = browser_router(quiver(), RouterSettings::default()).unwrap();
	let link = router.get_link("pageA", Some("Page A")).unwrap();
	let document = web_sys::window().unwrap().document().unwrap();
	let anchor = document.create_element("a").unwrap();

	bind_link(&link, &anchor).unwrap();

	assert_eq!(anchor.get_attribute("href").as_deref(), Some("/page-a"));
	assert_eq!(anchor.text_content().as_deref(), Some("Page A"));
	assert!(link.has_element());
}
