//! Property tests for path generation and URL resolution
//!
//! `find_by_url(path_for(id, params))` must give back `id` and `params` for
//! any parameter values free of `/` and brackets.

use fletcher_core::{
	ExtraParams, MemoryHistory, ParamValue, QuiverBuilder, RouteConfig, Router,
};
use futures::executor::LocalPool;
use proptest::prelude::*;

fn router(base_path: &str) -> (LocalPool, Router<String>) {
	let pool = LocalPool::new();
	let quiver = QuiverBuilder::new()
		.arrow("home", RouteConfig::model("/", "home".to_string()))
		.arrow("pageA", RouteConfig::model("/page-a", "a".to_string()))
		.arrow("hello", RouteConfig::model("/hello/[name]", "hello".to_string()))
		.arrow(
			"post",
			RouteConfig::model("/users/[id]/posts/[post]", "post".to_string()),
		)
		.build()
		.unwrap();
	let router = Router::builder(quiver)
		.base_path(base_path)
		.build(MemoryHistory::new("/"), pool.spawner())
		.unwrap();
	(pool, router)
}

fn segment_value() -> impl Strategy<Value = String> {
	"[^/\\[\\]]{1,12}"
}

fn query_value() -> impl Strategy<Value = ParamValue> {
	prop_oneof![
		"\\PC{0,10}".prop_map(ParamValue::from),
		prop::collection::vec("\\PC{0,6}", 2..4).prop_map(ParamValue::from),
	]
}

fn query() -> impl Strategy<Value = Vec<(String, ParamValue)>> {
	prop::collection::btree_map("[a-z]{1,8}", query_value(), 0..4)
		.prop_map(|map| map.into_iter().collect())
}

fn with_query(mut params: ExtraParams, query: Vec<(String, ParamValue)>) -> ExtraParams {
	for (name, value) in query {
		params = params.with_query(name, value);
	}
	params
}

proptest! {
	/// Test: single path parameter survives the round trip
	///
	/// Category: Property
	#[test]
	fn prop_single_param_roundtrip(name in segment_value(), query in query()) {
		let (_pool, router) = router("");
		let params = with_query(ExtraParams::new().with_path("name", name), query);

		let path = router.path_for("hello", Some(&params)).unwrap();
		let (id, found) = router.find_by_url(&path);

		prop_assert_eq!(id, "hello");
		prop_assert_eq!(found, params);
	}

	/// Test: several path parameters survive the round trip under a base path
	///
	/// Category: Property
	#[test]
	fn prop_nested_params_roundtrip(
		user in segment_value(),
		post in segment_value(),
		query in query(),
	) {
		let (_pool, router) = router("/app");
		let params = with_query(
			ExtraParams::new().with_path("id", user).with_path("post", post),
			query,
		);

		let path = router.path_for("post", Some(&params)).unwrap();
		prop_assert!(path.starts_with("/app/users/"));

		let (id, found) = router.find_by_url(&path);
		prop_assert_eq!(id, "post");
		prop_assert_eq!(found, params);
	}

	/// Test: literal routes resolve with only their query parameters
	///
	/// Category: Property
	#[test]
	fn prop_literal_route_roundtrip(query in query()) {
		let (_pool, router) = router("");
		let params = with_query(ExtraParams::new(), query);

		let path = router.path_for("pageA", Some(&params)).unwrap();
		let (id, found) = router.find_by_url(&path);

		prop_assert_eq!(id, "pageA");
		prop_assert_eq!(found, params);
	}
}
