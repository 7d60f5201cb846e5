//! Unverified JWT claim decoding.
//!
//! Signature checks belong to the backend. The cache only needs the `exp` claim to decide
//! whether a stored token is still worth sending, so the payload segment is decoded as-is.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Reasons a token could not be decoded into [`TokenClaims`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum MalformedTokenError {
	/// The token is not a `header.payload.signature` triple.
	#[error("Token must have three dot-separated segments, found {found}.")]
	SegmentCount {
		/// Number of segments observed.
		found: usize,
	},
	/// The payload segment is not base64url.
	#[error("Token payload is not valid base64url.")]
	Base64(#[from] base64::DecodeError),
	/// The payload decoded but is not a JSON claim set.
	#[error("Token payload is not a JSON claim set: {message}.")]
	Payload {
		/// Parser message.
		message: String,
	},
	/// The claim set has no numeric `exp` claim.
	#[error("Token payload is missing a numeric exp claim.")]
	MissingExpiry,
	/// The `exp` claim cannot be represented as an instant.
	#[error("Token exp claim {exp} is outside the supported range.")]
	ExpiryOutOfRange {
		/// Raw claim value.
		exp: String,
	},
}

/// Claims extracted from a token payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenClaims {
	/// Instant declared by the `exp` claim.
	pub expires_at: OffsetDateTime,
	/// `sub` claim, when present and a string.
	pub subject: Option<String>,
}
impl TokenClaims {
	/// Returns `true` once `instant` has reached the expiry; validity requires `exp > instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Time left before expiry at `instant`; negative once expired.
	pub fn remaining_at(&self, instant: OffsetDateTime) -> Duration {
		self.expires_at - instant
	}
}

#[derive(Deserialize)]
struct RawClaims {
	exp: Option<serde_json::Number>,
	sub: Option<Value>,
}

/// Decodes the payload of a JWT without verifying its signature.
pub fn decode_unverified(token: &str) -> Result<TokenClaims, MalformedTokenError> {
	let segments = token.split('.').collect::<Vec<_>>();
	let [_, payload, _] = segments.as_slice() else {
		return Err(MalformedTokenError::SegmentCount { found: segments.len() });
	};
	let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
	let raw = serde_json::from_slice::<RawClaims>(&bytes)
		.map_err(|e| MalformedTokenError::Payload { message: e.to_string() })?;
	let exp = raw.exp.ok_or(MalformedTokenError::MissingExpiry)?;

	Ok(TokenClaims {
		expires_at: expiry_instant(&exp)?,
		subject: raw.sub.and_then(|sub| sub.as_str().map(ToOwned::to_owned)),
	})
}

fn expiry_instant(exp: &serde_json::Number) -> Result<OffsetDateTime, MalformedTokenError> {
	let out_of_range = || MalformedTokenError::ExpiryOutOfRange { exp: exp.to_string() };

	if let Some(secs) = exp.as_i64() {
		return OffsetDateTime::from_unix_timestamp(secs).map_err(|_| out_of_range());
	}

	exp.as_f64()
		.filter(|secs| secs.is_finite())
		.and_then(|secs| OffsetDateTime::from_unix_timestamp_nanos((secs * 1e9) as i128).ok())
		.ok_or_else(out_of_range)
}
