// self
use crate::{_prelude::*, auth::MalformedTokenError, http::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedDispatch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedDispatch<F> = F;

/// A span builder used by the dispatcher.
#[derive(Clone, Debug)]
pub struct DispatchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl DispatchSpan {
	/// Creates a new span tagged with the logical method + stage.
	pub fn new(method: Method, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("fetchkit.dispatch", method = method.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedDispatch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Reports a cached token that could not be decoded. Never fails.
pub fn malformed_token(error: &MalformedTokenError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%error, "Cached token is not a valid JWT; treating it as absent.");
	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Reports that a cached token was evicted because its `exp` passed.
pub fn token_expired(expires_at: OffsetDateTime) {
	#[cfg(feature = "tracing")]
	tracing::debug!(%expires_at, "Cached token has expired; clearing the slot.");
	#[cfg(not(feature = "tracing"))]
	let _ = expires_at;
}

/// Reports a response whose status differs from the one the caller expected.
pub fn unexpected_status(status: u16, expected: u16, body: Option<&Value>) {
	#[cfg(feature = "tracing")]
	{
		match body {
			Some(body) =>
				tracing::warn!(status, expected, %body, "Backend returned an unexpected status."),
			None => tracing::warn!(status, expected, "Backend returned an unexpected status."),
		}
	}
	#[cfg(not(feature = "tracing"))]
	let _ = (status, expected, body);
}
