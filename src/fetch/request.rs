//! Request description consumed by [`Fetcher::dispatch`](crate::fetch::Fetcher::dispatch).

// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	http::{Method, RequestBody},
};

/// Logical request: verb, path pieces, success status, credentials, and passthrough payload.
///
/// Verb constructors set the status the backend answers with on success (`GET`/`PATCH`/`DELETE`
/// 200, `POST`/`PUT` 201); override it with [`expect_status`](Self::expect_status).
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
	/// Logical verb.
	pub method: Method,
	/// Endpoint appended to the base URL, skipped when empty.
	pub endpoint: String,
	/// Document identifier appended after the endpoint, skipped when empty.
	pub item_id: Option<String>,
	/// Status that counts as success.
	pub expected_status: u16,
	/// Bearer token injected as `Authorization`.
	pub token: Option<BearerToken>,
	/// Version asserted through `If-Match`.
	pub etag: Option<String>,
	/// Caller headers; injected headers win on conflicts.
	pub headers: BTreeMap<String, String>,
	/// Query string pairs.
	pub query: Vec<(String, String)>,
	/// Optional body.
	pub body: Option<RequestBody>,
}
impl FetchRequest {
	/// Creates a request with an explicit verb and success status.
	pub fn new(method: Method, endpoint: impl Into<String>, expected_status: u16) -> Self {
		Self {
			method,
			endpoint: endpoint.into(),
			item_id: None,
			expected_status,
			token: None,
			etag: None,
			headers: BTreeMap::new(),
			query: Vec::new(),
			body: None,
		}
	}

	/// `GET`, expecting 200.
	pub fn get(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Get, endpoint, 200)
	}

	/// `POST`, expecting 201.
	pub fn post(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Post, endpoint, 201)
	}

	/// `PUT` (sent as POST with an override header), expecting 201.
	pub fn put(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Put, endpoint, 201)
	}

	/// `PATCH` (sent as POST with an override header), expecting 200.
	pub fn patch(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Patch, endpoint, 200)
	}

	/// `DELETE`, expecting 200.
	pub fn delete(endpoint: impl Into<String>) -> Self {
		Self::new(Method::Delete, endpoint, 200)
	}

	/// Overrides the status that counts as success.
	pub fn expect_status(mut self, status: u16) -> Self {
		self.expected_status = status;

		self
	}

	/// Targets a single document; structured identifiers are stringified.
	pub fn item_id(mut self, id: impl Display) -> Self {
		self.item_id = Some(id.to_string());

		self
	}

	/// Attaches a bearer token.
	pub fn token(mut self, token: impl Into<BearerToken>) -> Self {
		self.token = Some(token.into());

		self
	}

	/// Attaches a bearer token when one is available, e.g. straight from
	/// [`TokenCache::get`](crate::cache::TokenCache::get).
	pub fn maybe_token(mut self, token: Option<BearerToken>) -> Self {
		self.token = token;

		self
	}

	/// Asserts the document version through `If-Match`.
	pub fn etag(mut self, etag: impl Into<String>) -> Self {
		self.etag = Some(etag.into());

		self
	}

	/// Adds a caller header.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Appends a query string pair.
	pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));

		self
	}

	/// Sends `body` as JSON.
	pub fn json(mut self, body: Value) -> Self {
		self.body = Some(RequestBody::Json(body));

		self
	}

	/// Sends raw bytes.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(RequestBody::Bytes(body.into()));

		self
	}
}
