// std
use std::thread;
// crates.io
use serde_json::json;
use time::macros;
// self
use fetchkit::{
	_preludet::*,
	cache::{TokenCache, TokenStatus},
};

#[test]
fn concurrent_writers_never_tear_the_slot() {
	let cache = Arc::new(TokenCache::new());
	let exp = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();
	let tokens = (0..8)
		.map(|i| unsigned_jwt(&json!({ "sub": format!("svc-{i}"), "exp": exp })))
		.collect::<Vec<_>>();
	let handles = tokens
		.iter()
		.cloned()
		.map(|token| {
			let cache = cache.clone();

			thread::spawn(move || {
				for _ in 0..100 {
					cache.store(token.as_str());

					let seen = cache.get().expect("A fresh token should always be readable.");

					assert!(seen.claims().is_ok(), "Readers must observe a whole token.");
				}
			})
		})
		.collect::<Vec<_>>();

	for handle in handles {
		handle.join().expect("Worker thread should not panic.");
	}

	let last = cache.get().expect("Cache should hold one of the written tokens.");

	assert!(tokens.iter().any(|token| token == last.expose()));
}

#[test]
fn expired_token_is_evicted_by_the_first_reader() {
	let exp = macros::datetime!(2030-06-01 12:00 UTC);
	let cache = TokenCache::new();

	cache.store_at(jwt_expiring_at(exp), exp - Duration::minutes(5));

	assert!(matches!(cache.status_at(exp), TokenStatus::Expired));
	assert!(cache.get_at(exp + Duration::seconds(1)).is_none());
	assert_eq!(cache.status_at(exp - Duration::minutes(1)), TokenStatus::Empty);
}

#[test]
fn opaque_tokens_read_as_absent() {
	let cache = TokenCache::new();

	cache.store("not.a-jwt");

	assert!(cache.get().is_none());
	assert_eq!(cache.status(), TokenStatus::Malformed);
}
