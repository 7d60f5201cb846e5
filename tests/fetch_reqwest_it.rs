#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use fetchkit::{
	_preludet::*,
	cache::TokenCache,
	error::{ConfigError, TransportError},
	fetch::{FetchRequest, Fetcher},
	http::ReqwestTransport,
	query::Query,
};

fn fetcher(server: &MockServer) -> Fetcher<ReqwestTransport> {
	build_reqwest_test_fetcher(&server.url("/api"))
}

#[tokio::test]
async fn get_returns_body_and_etag() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/trials/42").header("authorization", "Bearer jwt-token");
			then.status(200)
				.header("content-type", "application/json")
				.header("etag", "\"v7\"")
				.body("{\"trial_name\":\"alpha\"}");
		})
		.await;
	let response = fetcher(&server)
		.dispatch(FetchRequest::get("trials").item_id(42).token("jwt-token"))
		.await
		.expect("Authorized GET should succeed.");

	mock.assert_async().await;

	assert_eq!(response.status, 200);
	assert_eq!(response.etag(), Some("\"v7\""));
	assert_eq!(
		response.json::<serde_json::Value>().expect("Body should be JSON."),
		json!({ "trial_name": "alpha" })
	);
}

#[tokio::test]
async fn patch_is_sent_as_post_with_override_and_if_match() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/trials/42")
				.header("x-http-method-override", "PATCH")
				.header("if-match", "\"v7\"")
				.json_body(json!({ "status": "done" }));
			then.status(200).body("{}");
		})
		.await;

	fetcher(&server)
		.dispatch(
			FetchRequest::patch("trials")
				.item_id("42")
				.etag("\"v7\"")
				.json(json!({ "status": "done" })),
		)
		.await
		.expect("Overridden PATCH should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn not_found_is_classified_with_body() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/trials/missing");
			then.status(404)
				.header("content-type", "application/json")
				.body("{\"_status\":\"ERR\",\"_error\":{\"code\":404}}");
		})
		.await;

	let err = fetcher(&server)
		.dispatch(FetchRequest::get("trials").item_id("missing"))
		.await
		.expect_err("404 should be reported as a failure.");

	assert_eq!(err.to_string(), "404: Not Found");

	let Error::RequestFailed(failure) = err else {
		panic!("Unexpected error variant.");
	};

	assert_eq!(failure.body, Some(json!({ "_status": "ERR", "_error": { "code": 404 } })));
}

#[tokio::test]
async fn post_expects_created_by_default() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/trials");
			then.status(200).body("not json");
		})
		.await;

	let err = fetcher(&server)
		.dispatch(FetchRequest::post("trials").json(json!({ "trial_name": "beta" })))
		.await
		.expect_err("200 should not satisfy a POST expecting 201.");

	assert_eq!(err.status(), Some(200));
	assert!(matches!(err, Error::RequestFailed(ref failure) if failure.body.is_none()));
}

#[tokio::test]
async fn find_sends_rendered_query() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/samples")
				.query_param("where", "{\"x\": 1}")
				.query_param("projection", "{\"y\": 1}");
			then.status(200).body("{\"_items\":[]}");
		})
		.await;
	let query = Query::new("samples").condition(json!({ "x": 1 })).projection(json!({ "y": 1 }));

	fetcher(&server).find(&query, None).await.expect("Find should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn cached_token_is_forwarded() {
	let server = MockServer::start_async().await;
	let cache = TokenCache::new();
	let token = jwt_expiring_at(OffsetDateTime::now_utc() + Duration::hours(1));
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/api/trials/1")
				.header("authorization", format!("Bearer {token}"));
			then.status(200);
		})
		.await;

	cache.store(token.as_str());
	fetcher(&server)
		.dispatch(FetchRequest::delete("trials").item_id(1).maybe_token(cache.get()))
		.await
		.expect("Delete with cached token should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn slow_backend_times_out_as_a_transport_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/trials");
			then.status(200).delay(std::time::Duration::from_millis(800)).body("{}");
		})
		.await;

	let fetcher = Fetcher::<ReqwestTransport>::with_transport(
		server.url("/api"),
		test_reqwest_transport_with_timeout(std::time::Duration::from_millis(100)),
	);
	let err = fetcher
		.dispatch(FetchRequest::get("trials"))
		.await
		.expect_err("A response slower than the client timeout should fail.");

	assert!(matches!(err, Error::Transport(TransportError::Timeout { .. })), "{err:?}");
	assert_eq!(err.status(), None);
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
	let fetcher = Fetcher::new("http://127.0.0.1:9");
	let err = fetcher
		.dispatch(FetchRequest::get("trials"))
		.await
		.expect_err("Closed port should fail at the transport layer.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}

#[tokio::test]
async fn relative_base_url_is_rejected_before_sending() {
	let err = Fetcher::new("not-a-url")
		.dispatch(FetchRequest::get("trials"))
		.await
		.expect_err("Relative base URL should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidUrl { .. })));
}
