//! Optional observability helpers for dispatch and cache diagnostics.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `fetchkit.dispatch` with the `method` and
//!   `stage` fields, plus diagnostics for malformed cached tokens, lazy token eviction, and
//!   unexpected response statuses.
//! - Enable `metrics` to increment the `fetchkit_dispatch_total` counter for every
//!   attempt/success/failure, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
	/// Entry to the dispatcher.
	Attempt,
	/// Response matched the expected status.
	Success,
	/// Error propagated back to the caller.
	Failure,
}
impl DispatchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			DispatchOutcome::Attempt => "attempt",
			DispatchOutcome::Success => "success",
			DispatchOutcome::Failure => "failure",
		}
	}
}
impl Display for DispatchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
