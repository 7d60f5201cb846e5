//! Capacity-one store with an optional time-to-live ceiling.

// self
use crate::_prelude::*;

/// What the owner of a [`TtlSlot`] decided about the stored value during a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
	/// The value is usable and is returned to the reader.
	Fresh,
	/// The value is stale and is evicted.
	Stale,
	/// The value cannot be judged; it stays stored but is hidden from the reader.
	Unreadable,
}

#[derive(Clone, Debug)]
struct Entry<T> {
	value: T,
	stored_at: OffsetDateTime,
}

/// Thread-safe single-entry store that evicts lazily on read.
///
/// Writes replace the entry wholesale, so readers observe either the previous or the new value
/// and never a mix. Reads run the caller's freshness check inside the same critical section
/// that may clear the entry.
#[derive(Debug)]
pub struct TtlSlot<T> {
	entry: Mutex<Option<Entry<T>>>,
	ttl: Option<Duration>,
}
impl<T> TtlSlot<T>
where
	T: Clone,
{
	/// Creates an empty slot whose entries never age out on their own.
	pub fn new() -> Self {
		Self { entry: Mutex::new(None), ttl: None }
	}

	/// Creates an empty slot whose entries are evicted once they are `ttl` old.
	pub fn with_ttl(ttl: Duration) -> Self {
		Self { entry: Mutex::new(None), ttl: Some(ttl) }
	}

	/// Replaces the entry, stamping it with `instant`.
	pub fn put_at(&self, value: T, instant: OffsetDateTime) {
		*self.entry.lock() = Some(Entry { value, stored_at: instant });
	}

	/// Empties the slot.
	pub fn clear(&self) {
		self.entry.lock().take();
	}

	/// Returns `true` if a value is currently stored, without judging it.
	pub fn is_occupied(&self) -> bool {
		self.entry.lock().is_some()
	}

	/// Inspects the entry at `instant` without evicting it.
	///
	/// `inspect` receives the stored value and whether it has outlived the TTL.
	pub fn inspect_at<F, R>(&self, instant: OffsetDateTime, inspect: F) -> R
	where
		F: FnOnce(Option<(&T, bool)>) -> R,
	{
		let guard = self.entry.lock();

		inspect(guard.as_ref().map(|entry| (&entry.value, self.is_aged(entry, instant))))
	}

	/// Reads the entry at `instant`, letting `judge` decide whether it is returned, evicted, or
	/// hidden.
	///
	/// Entries older than the TTL are evicted before `judge` runs.
	pub fn read_at<F>(&self, instant: OffsetDateTime, judge: F) -> Option<T>
	where
		F: FnOnce(&T) -> Freshness,
	{
		let mut guard = self.entry.lock();
		let entry = guard.as_ref()?;

		if self.is_aged(entry, instant) {
			guard.take();

			return None;
		}

		match judge(&entry.value) {
			Freshness::Fresh => Some(entry.value.clone()),
			Freshness::Stale => {
				guard.take();

				None
			},
			Freshness::Unreadable => None,
		}
	}

	fn is_aged(&self, entry: &Entry<T>, instant: OffsetDateTime) -> bool {
		self.ttl.is_some_and(|ttl| instant - entry.stored_at >= ttl)
	}
}
impl<T> Default for TtlSlot<T>
where
	T: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn judge_controls_eviction() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let slot = TtlSlot::new();

		slot.put_at("value", now);

		assert_eq!(slot.read_at(now, |_| Freshness::Unreadable), None);
		assert!(slot.is_occupied());
		assert_eq!(slot.read_at(now, |_| Freshness::Fresh), Some("value"));
		assert_eq!(slot.read_at(now, |_| Freshness::Stale), None);
		assert!(!slot.is_occupied());
		assert_eq!(slot.read_at(now, |_| Freshness::Fresh), None);
	}

	#[test]
	fn ttl_ceiling_evicts_before_judging() {
		let stored = macros::datetime!(2025-01-01 00:00 UTC);
		let slot = TtlSlot::with_ttl(Duration::minutes(5));

		slot.put_at(7_u8, stored);

		assert_eq!(slot.read_at(stored + Duration::minutes(4), |_| Freshness::Fresh), Some(7));
		assert_eq!(
			slot.read_at(stored + Duration::minutes(5), |_| panic!("Aged entries are not judged.")),
			None
		);
		assert!(!slot.is_occupied());
	}

	#[test]
	fn inspect_reports_age_without_evicting() {
		let stored = macros::datetime!(2025-01-01 00:00 UTC);
		let slot = TtlSlot::with_ttl(Duration::seconds(30));

		assert!(slot.inspect_at(stored, |entry| entry.is_none()));

		slot.put_at("value", stored);

		assert_eq!(
			slot.inspect_at(stored + Duration::minutes(1), |entry| entry.map(|(_, aged)| aged)),
			Some(true)
		);
		assert!(slot.is_occupied());
	}

	#[test]
	fn writes_replace_the_single_entry() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let slot = TtlSlot::default();

		slot.put_at(String::from("first"), now);
		slot.put_at(String::from("second"), now);

		assert_eq!(slot.read_at(now, |_| Freshness::Fresh).as_deref(), Some("second"));

		slot.clear();

		assert!(!slot.is_occupied());
	}
}
