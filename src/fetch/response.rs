//! Successful dispatch results.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::DecodeError,
	http::{TransportResponse, find_header},
};

/// Response whose status matched the caller's expectation, returned untouched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
	/// HTTP status code.
	pub status: u16,
	/// Reason phrase, when known.
	pub reason: Option<String>,
	/// Response headers.
	pub headers: BTreeMap<String, String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl FetchResponse {
	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		find_header(&self.headers, name)
	}

	/// `ETag` header, usable as the next request's `If-Match`.
	pub fn etag(&self) -> Option<&str> {
		self.header("etag")
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON into `T`, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError { status: self.status, source }.into())
	}
}
impl From<TransportResponse> for FetchResponse {
	fn from(response: TransportResponse) -> Self {
		let TransportResponse { status, reason, headers, body } = response;

		Self { status, reason, headers, body }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Trial {
		trial_name: String,
		#[allow(dead_code)]
		samples: Vec<String>,
	}

	#[test]
	fn json_decodes_typed_body() {
		let response: FetchResponse = TransportResponse::new(
			200,
			r#"{"trial_name":"alpha","samples":["s1"]}"#,
		)
		.with_header("ETag", "\"v2\"")
		.into();
		let trial = response.json::<Trial>().expect("Typed body should decode.");

		assert_eq!(trial.trial_name, "alpha");
		assert_eq!(response.etag(), Some("\"v2\""));
	}

	#[test]
	fn json_reports_failing_path() {
		let response: FetchResponse =
			TransportResponse::new(200, r#"{"trial_name":"alpha","samples":[1]}"#).into();
		let err = response.json::<Trial>().expect_err("Numeric sample ids should be rejected.");

		match err {
			Error::Decode(DecodeError { status, source }) => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "samples[0]");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
