//! Request dispatcher that injects credentials and classifies responses.
//!
//! [`Fetcher::dispatch`] is deliberately thin: it composes the URL, layers the bearer token,
//! `If-Match`, and method override headers on top of the caller's, sends exactly one request,
//! and compares the status with the one the caller expects. Matching responses are returned
//! untouched; anything else becomes a [`RequestFailedError`]. There is no retry.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	error::{ConfigError, RequestFailedError},
	http::{HttpTransport, METHOD_OVERRIDE_HEADER, TransportRequest},
	obs::{self, DispatchOutcome, DispatchSpan},
	query::Query,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Fetcher specialized for the crate's default reqwest transport.
pub type ReqwestFetcher = Fetcher<ReqwestTransport>;

/// Dispatches backend requests rooted at a single base URL.
#[derive(Clone)]
pub struct Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// Base URL every endpoint is appended to.
	pub base_url: String,
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
}
impl<T> Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a fetcher that reuses the caller-provided transport.
	pub fn with_transport(base_url: impl Into<String>, transport: impl Into<Arc<T>>) -> Self {
		Self { base_url: base_url.into(), transport: transport.into() }
	}

	/// Sends `request` once and returns the response if its status is the expected one.
	///
	/// # Errors
	///
	/// - [`Error::Config`] when the composed URL is not absolute.
	/// - [`Error::Transport`] when the transport fails before a status is received.
	/// - [`Error::RequestFailed`] when the status differs from
	///   [`FetchRequest::expected_status`].
	pub async fn dispatch(&self, request: FetchRequest) -> Result<FetchResponse> {
		let method = request.method;
		let span = DispatchSpan::new(method, "dispatch");

		obs::record_dispatch_outcome(method, DispatchOutcome::Attempt);

		let result: Result<FetchResponse> = span
			.instrument(async move {
				let expected = request.expected_status;
				let transport_request = self.prepare(request)?;
				let response = self.transport.send(transport_request).await?;

				if response.status == expected {
					return Ok(FetchResponse::from(response));
				}

				let body = serde_json::from_slice::<Value>(&response.body).ok();

				obs::unexpected_status(response.status, expected, body.as_ref());

				Err(RequestFailedError {
					status: response.status,
					reason: response.reason.unwrap_or_default(),
					body,
				}
				.into())
			})
			.await;

		match &result {
			Ok(_) => obs::record_dispatch_outcome(method, DispatchOutcome::Success),
			Err(_) => obs::record_dispatch_outcome(method, DispatchOutcome::Failure),
		}

		result
	}

	/// Runs a read query, expecting 200.
	pub async fn find(&self, query: &Query, token: Option<BearerToken>) -> Result<FetchResponse> {
		let path = query.build()?;

		self.dispatch(FetchRequest::get(path).maybe_token(token)).await
	}

	/// Composes `base_url[/endpoint][/item_id]`.
	pub fn url_for(&self, endpoint: &str, item_id: Option<&str>) -> Result<Url, ConfigError> {
		let mut url = self.base_url.clone();

		if !endpoint.is_empty() {
			url.push('/');
			url.push_str(endpoint);
		}
		if let Some(id) = item_id.filter(|id| !id.is_empty()) {
			url.push('/');
			url.push_str(id);
		}

		Url::parse(&url).map_err(|source| ConfigError::InvalidUrl { url, source })
	}

	fn prepare(&self, request: FetchRequest) -> Result<TransportRequest> {
		let FetchRequest { method, endpoint, item_id, token, etag, mut headers, query, body, .. } =
			request;
		let url = self.url_for(&endpoint, item_id.as_deref())?;

		if let Some(token) = token.filter(|token| !token.is_empty()) {
			set_header(&mut headers, "Authorization", token.authorization());
		}
		if let Some(etag) = etag {
			set_header(&mut headers, "If-Match", etag);
		}
		if method.needs_override() {
			set_header(&mut headers, METHOD_OVERRIDE_HEADER, method.as_str().into());
		}

		Ok(TransportRequest { method: method.physical(), url, headers, query, body })
	}
}
#[cfg(feature = "reqwest")]
impl Fetcher<ReqwestTransport> {
	/// Creates a fetcher backed by a default reqwest client.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self::with_transport(base_url, ReqwestTransport::default())
	}
}
impl<T> Debug for Fetcher<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Fetcher").field("base_url", &self.base_url).finish()
	}
}

// Injected headers replace caller headers regardless of name casing.
fn set_header(headers: &mut BTreeMap<String, String>, name: &str, value: String) {
	headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
	headers.insert(name.into(), value);
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		error::TransportError,
		http::{Method, RequestBody, TransportFuture, TransportResponse},
	};

	type Responder = Box<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>;

	struct ScriptedTransport {
		seen: Mutex<Vec<TransportRequest>>,
		respond: Responder,
	}
	impl ScriptedTransport {
		fn replying(response: TransportResponse) -> Arc<Self> {
			Arc::new(Self {
				seen: Mutex::new(Vec::new()),
				respond: Box::new(move || Ok(response.clone())),
			})
		}

		fn failing() -> Arc<Self> {
			Arc::new(Self {
				seen: Mutex::new(Vec::new()),
				respond: Box::new(|| {
					Err(TransportError::network(std::io::Error::other("connection refused")))
				}),
			})
		}

		fn last(&self) -> TransportRequest {
			self.seen.lock().last().cloned().expect("Transport should have seen a request.")
		}
	}
	impl HttpTransport for ScriptedTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			self.seen.lock().push(request);

			let result = (self.respond)();

			Box::pin(async move { result })
		}
	}

	fn fetcher(transport: &Arc<ScriptedTransport>) -> Fetcher<ScriptedTransport> {
		Fetcher::with_transport("http://backend.test/api", transport.clone())
	}

	#[tokio::test]
	async fn matching_status_returns_response_untouched() {
		let reply = TransportResponse::new(200, r#"{"_items":[]}"#)
			.with_reason("OK")
			.with_header("ETag", "\"abc\"");
		let transport = ScriptedTransport::replying(reply.clone());
		let response = fetcher(&transport)
			.dispatch(FetchRequest::get("items?"))
			.await
			.expect("Expected status should succeed.");

		assert_eq!(response, FetchResponse::from(reply));
		assert_eq!(transport.last().method, Method::Get);
		assert_eq!(transport.last().url.as_str(), "http://backend.test/api/items?");
	}

	#[tokio::test]
	async fn unexpected_status_becomes_request_failed() {
		let transport = ScriptedTransport::replying(
			TransportResponse::new(404, r#"{"_error":{"code":404}}"#).with_reason("Not Found"),
		);
		let err = fetcher(&transport)
			.dispatch(FetchRequest::get("items").item_id("missing"))
			.await
			.expect_err("404 should not satisfy a 200 expectation.");

		assert!(err.to_string().contains("404"));
		assert_eq!(err.status(), Some(404));

		let Error::RequestFailed(failure) = err else {
			panic!("Unexpected error variant.");
		};

		assert_eq!(failure.reason, "Not Found");
		assert_eq!(failure.body, Some(serde_json::json!({ "_error": { "code": 404 } })));
	}

	#[tokio::test]
	async fn success_status_other_than_expected_still_fails() {
		let transport = ScriptedTransport::replying(TransportResponse::new(200, "not json"));
		let err = fetcher(&transport)
			.dispatch(FetchRequest::post("items").json(serde_json::json!({ "a": 1 })))
			.await
			.expect_err("200 should not satisfy a 201 expectation.");

		assert_eq!(err.to_string(), "200: ");

		let Error::RequestFailed(failure) = err else {
			panic!("Unexpected error variant.");
		};

		assert_eq!(failure.body, None);
	}

	#[tokio::test]
	async fn patch_and_put_travel_as_post_with_override() {
		let transport = ScriptedTransport::replying(TransportResponse::new(200, "{}"));
		let fetcher = fetcher(&transport);

		fetcher
			.dispatch(FetchRequest::patch("trials").item_id(7).etag("v1"))
			.await
			.expect("Patch should succeed.");

		let sent = transport.last();

		assert_eq!(sent.method, Method::Post);
		assert_eq!(sent.header("x-http-method-override"), Some("PATCH"));
		assert_eq!(sent.header("If-Match"), Some("v1"));
		assert_eq!(sent.url.as_str(), "http://backend.test/api/trials/7");

		fetcher
			.dispatch(FetchRequest::put("trials").item_id(7).expect_status(200))
			.await
			.expect("Put should succeed.");

		assert_eq!(transport.last().method, Method::Post);
		assert_eq!(transport.last().header(METHOD_OVERRIDE_HEADER), Some("PUT"));
	}

	#[tokio::test]
	async fn injected_headers_layer_over_caller_headers() {
		let transport = ScriptedTransport::replying(TransportResponse::new(200, "{}"));

		fetcher(&transport)
			.dispatch(
				FetchRequest::delete("items")
					.item_id("9")
					.header("authorization", "Basic ignored")
					.header("X-Trace", "t-1")
					.token("jwt-value")
					.body("raw"),
			)
			.await
			.expect("Delete should succeed.");

		let sent = transport.last();

		assert_eq!(sent.method, Method::Delete);
		assert_eq!(sent.header("authorization"), Some("Bearer jwt-value"));
		assert_eq!(
			sent.headers.keys().filter(|key| key.eq_ignore_ascii_case("authorization")).count(),
			1
		);
		assert_eq!(sent.header("X-Trace"), Some("t-1"));
		assert_eq!(sent.header(METHOD_OVERRIDE_HEADER), None);
		assert_eq!(sent.header("If-Match"), None);
		assert_eq!(sent.body, Some(RequestBody::Bytes(b"raw".to_vec())));
	}

	#[tokio::test]
	async fn transport_errors_propagate() {
		let transport = ScriptedTransport::failing();
		let err = fetcher(&transport)
			.dispatch(FetchRequest::get("items"))
			.await
			.expect_err("Transport failure should propagate.");

		assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
		assert_eq!(err.status(), None);
	}

	#[tokio::test]
	async fn relative_base_url_is_a_config_error() {
		let transport = ScriptedTransport::replying(TransportResponse::new(200, "{}"));
		let err = Fetcher::<ScriptedTransport>::with_transport("backend/api", transport.clone())
			.dispatch(FetchRequest::get("items"))
			.await
			.expect_err("Relative base URL should be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::InvalidUrl { .. })));
		assert!(transport.seen.lock().is_empty());
	}

	#[tokio::test]
	async fn find_builds_query_and_attaches_token() {
		let transport = ScriptedTransport::replying(TransportResponse::new(200, "{}"));
		let query = Query::new("items").condition(serde_json::json!({ "x": 1 }));

		fetcher(&transport)
			.find(&query, Some(BearerToken::new("jwt")))
			.await
			.expect("Find should succeed.");

		let sent = transport.last();

		assert_eq!(sent.url.path(), "/api/items");
		assert_eq!(sent.url.query(), Some("where={%22x%22:%201}"));
		assert_eq!(sent.header("Authorization"), Some("Bearer jwt"));

		let err = fetcher(&transport)
			.find(&Query::new("items").record_id(1).condition(serde_json::json!({ "x": 1 })), None)
			.await
			.expect_err("Record id with condition should be rejected.");

		assert!(matches!(err, Error::Query(_)));
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_fetcher_sends_put_as_post() {
		// crates.io
		use httpmock::prelude::*;
		// self
		use crate::_preludet::build_reqwest_test_fetcher;

		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(POST).path("/api/trials").header("x-http-method-override", "PUT");
				then.status(201).body("{\"_id\":\"t1\"}");
			})
			.await;
		let response = build_reqwest_test_fetcher(&server.url("/api"))
			.dispatch(FetchRequest::put("trials").json(serde_json::json!({ "name": "alpha" })))
			.await
			.expect("Overridden PUT should succeed.");

		mock.assert_async().await;

		assert_eq!(response.status, 201);
		assert_eq!(response.text(), "{\"_id\":\"t1\"}");
	}
}
