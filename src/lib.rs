//! Thin HTTP dispatch for document backends: bearer and etag injection with uniform error
//! classification. Ships with a JWT-aware single-slot token cache and Stackdriver-style log
//! formatting that can raise alert emails.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
// Unit tests also see the self dev-dependency that enables `test` for the integration suites.
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod auth;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod http;
pub mod log;
pub mod obs;
pub mod query;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests.
	//!
	//! Compiled for unit tests and whenever the `test` feature is on. The crate's own
	//! integration suites get the feature through a self dev-dependency, so a plain
	//! `cargo test` covers them too.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	#[cfg(feature = "reqwest")]
	use crate::{
		fetch::Fetcher,
		http::ReqwestTransport,
		log::notify::{self, SendGridNotifier},
	};

	/// Builds an unsigned JWT-shaped token whose payload is the provided claim set.
	pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.signature")
	}

	/// Builds an unsigned JWT-shaped token that expires at the provided instant.
	pub fn jwt_expiring_at(instant: OffsetDateTime) -> String {
		unsigned_jwt(&serde_json::json!({ "sub": "svc-test", "exp": instant.unix_timestamp() }))
	}

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Same as [`test_reqwest_transport`], but every request gives up after `timeout`.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport_with_timeout(timeout: std::time::Duration) -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.timeout(timeout)
			.build()
			.expect("Failed to build insecure Reqwest client with timeout for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Constructs a [`Fetcher`] rooted at `base_url` backed by the reqwest test transport.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_fetcher(base_url: &str) -> Fetcher<ReqwestTransport> {
		Fetcher::with_transport(base_url, test_reqwest_transport())
	}

	/// Builds a SendGrid notifier aimed at `endpoint` whose blocking client accepts
	/// `httpmock`'s self-signed certificates. Safe to call from inside an async runtime.
	#[cfg(feature = "reqwest")]
	pub fn test_sendgrid_notifier(endpoint: &str) -> SendGridNotifier {
		let client = notify::off_runtime(|| {
			reqwest::blocking::Client::builder()
				.danger_accept_invalid_certs(true)
				.danger_accept_invalid_hostnames(true)
				.build()
				.expect("Failed to build insecure blocking Reqwest client for tests.")
		});

		SendGridNotifier::with_client(client).with_endpoint(endpoint)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
