//! Single-slot bearer token cache gated by the token's own `exp` claim.
//!
//! [`TokenCache::get`] is a read with a side effect: an expired token is cleared from the slot
//! by the read that notices it. Two callers racing in the same window may therefore observe
//! different states (one gets the token, a later one gets `None`), but never a torn value.
//! A token that cannot be decoded stays stored and reads as `None`; the decode failure is
//! reported through the crate's diagnostics instead of being returned.

pub mod slot;

pub use slot::*;

// self
use crate::{_prelude::*, auth::BearerToken, obs};

/// Result of inspecting the cached token without mutating the slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Nothing is stored.
	Empty,
	/// A token is stored and valid until `expires_at`.
	Active {
		/// Expiry declared by the token.
		expires_at: OffsetDateTime,
	},
	/// A token is stored but its `exp` has passed or its slot TTL elapsed.
	Expired,
	/// A token is stored but cannot be decoded.
	Malformed,
}

/// Process-lifetime cache holding at most one access token.
#[derive(Debug, Default)]
pub struct TokenCache {
	slot: TtlSlot<BearerToken>,
}
impl TokenCache {
	/// Creates an empty cache governed by the token's `exp` claim alone.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates an empty cache that additionally forgets tokens once they were stored `ttl` ago.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { slot: TtlSlot::with_ttl(ttl) }
	}

	/// Overwrites the cached token. An empty string stores nothing.
	pub fn store(&self, token: impl Into<BearerToken>) {
		self.store_at(token, OffsetDateTime::now_utc());
	}

	/// Same as [`store`](Self::store), stamping the entry with `instant` for TTL accounting.
	pub fn store_at(&self, token: impl Into<BearerToken>, instant: OffsetDateTime) {
		let token = token.into();

		if token.is_empty() {
			self.slot.clear();
		} else {
			self.slot.put_at(token, instant);
		}
	}

	/// Returns the cached token if it is still valid, clearing it if it has expired.
	pub fn get(&self) -> Option<BearerToken> {
		self.get_at(OffsetDateTime::now_utc())
	}

	/// Same as [`get`](Self::get), evaluated at `instant`.
	pub fn get_at(&self, instant: OffsetDateTime) -> Option<BearerToken> {
		self.slot.read_at(instant, |token| match token.claims() {
			Ok(claims) if claims.is_expired_at(instant) => {
				obs::token_expired(claims.expires_at);

				Freshness::Stale
			},
			Ok(_) => Freshness::Fresh,
			Err(e) => {
				obs::malformed_token(&e);

				Freshness::Unreadable
			},
		})
	}

	/// Describes the cached token at `instant` without evicting anything.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		self.slot.inspect_at(instant, |entry| match entry {
			None => TokenStatus::Empty,
			Some((_, true)) => TokenStatus::Expired,
			Some((token, false)) => match token.claims() {
				Ok(claims) if claims.is_expired_at(instant) => TokenStatus::Expired,
				Ok(claims) => TokenStatus::Active { expires_at: claims.expires_at },
				Err(_) => TokenStatus::Malformed,
			},
		})
	}

	/// Describes the cached token against the current clock without evicting anything.
	pub fn status(&self) -> TokenStatus {
		self.status_at(OffsetDateTime::now_utc())
	}
}
