//! Transport primitives for backend requests.
//!
//! The dispatcher's only dependency on an HTTP stack is [`HttpTransport`]: it receives a fully
//! assembled [`TransportRequest`] (physical method, absolute URL, headers, query pairs, body)
//! and resolves to a [`TransportResponse`] carrying the status, reason phrase, headers, and raw
//! body. Implementations must not interpret the status; classification happens in
//! [`Fetcher::dispatch`](crate::fetch::Fetcher::dispatch).

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`HttpTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Header name carrying the logical verb when PUT/PATCH travel as POST.
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// HTTP verbs understood by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`, issued as POST with a method override header.
	Put,
	/// `PATCH`, issued as POST with a method override header.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the upper-case verb.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}

	/// Returns `true` for verbs the backend only accepts through the override header.
	pub const fn needs_override(self) -> bool {
		matches!(self, Method::Put | Method::Patch)
	}

	/// Verb actually put on the wire.
	pub const fn physical(self) -> Self {
		if self.needs_override() { Method::Post } else { self }
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Request body forms accepted by transports.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// JSON document; transports set `Content-Type: application/json`.
	Json(Value),
	/// Raw bytes sent as-is; callers set their own content type header.
	Bytes(Vec<u8>),
}

/// Fully assembled request handed to an [`HttpTransport`].
#[derive(Clone, Debug, PartialEq)]
pub struct TransportRequest {
	/// Physical verb; never PUT or PATCH when produced by the dispatcher.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Header name/value pairs.
	pub headers: BTreeMap<String, String>,
	/// Query string pairs appended to `url`.
	pub query: Vec<(String, String)>,
	/// Optional body.
	pub body: Option<RequestBody>,
}
impl TransportRequest {
	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}
}

/// Raw response returned by an [`HttpTransport`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase, when known.
	pub reason: Option<String>,
	/// Response headers.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl TransportResponse {
	/// Creates a response with the given status and body and no headers.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, reason: None, headers: BTreeMap::new(), body: body.into() }
	}

	/// Sets the reason phrase.
	pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
		self.reason = Some(reason.into());

		self
	}

	/// Adds a response header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}
}

/// Abstraction over HTTP clients capable of executing backend requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can be shared by many
/// fetchers behind an `Arc`, and the returned future must be `Send` so dispatches can hop
/// executors.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Issues the request and resolves once the full body has been read.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn execute(
		client: ReqwestClient,
		request: TransportRequest,
	) -> Result<TransportResponse, TransportError> {
		let method = match request.method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Put => reqwest::Method::PUT,
			Method::Patch => reqwest::Method::PATCH,
			Method::Delete => reqwest::Method::DELETE,
		};
		let mut builder = client.request(method, request.url);

		if !request.query.is_empty() {
			builder = builder.query(&request.query);
		}
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}

		builder = match request.body {
			Some(RequestBody::Json(value)) => builder.json(&value),
			Some(RequestBody::Bytes(bytes)) => builder.body(bytes),
			None => builder,
		};

		let response = builder.send().await?;
		let status = response.status();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value.to_str().ok().map(|value| (name.as_str().to_owned(), value.to_owned()))
			})
			.collect();
		let body = response.bytes().await?.to_vec();

		Ok(TransportResponse {
			status: status.as_u16(),
			reason: status.canonical_reason().map(ToOwned::to_owned),
			headers,
			body,
		})
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(Self::execute(client, request))
	}
}

pub(crate) fn find_header<'a>(
	headers: &'a BTreeMap<String, String>,
	name: &str,
) -> Option<&'a str> {
	headers
		.iter()
		.find(|(key, _)| key.eq_ignore_ascii_case(name))
		.map(|(_, value)| value.as_str())
}
