//! Boundary for shipping raw log messages to a message queue.
//!
//! The broker client itself lives outside this crate. [`RecordPublisher`] is the capability a
//! broker adapter provides; [`MemoryPublisher`] keeps messages in process and [`QueueLayer`]
//! feeds every `tracing` event's message into any publisher.

// self
use crate::_prelude::*;

/// Queue name used when none is given.
pub const DEFAULT_QUEUE: &str = "logstash";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures reported by a [`RecordPublisher`].
#[derive(Debug, ThisError)]
pub enum PublishError {
	/// The publisher was closed.
	#[error("Queue `{queue}` is closed.")]
	Closed {
		/// Queue name.
		queue: String,
	},
	/// The broker rejected or dropped the message.
	#[error("Broker failed to accept the message.")]
	Broker {
		/// Broker-specific failure.
		#[source]
		source: BoxError,
	},
}
impl PublishError {
	/// Wraps a broker-specific failure.
	pub fn broker(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Broker { source: Box::new(src) }
	}
}

/// Capability to put opaque payloads on a named queue.
pub trait RecordPublisher
where
	Self: 'static + Send + Sync,
{
	/// Name of the target queue.
	fn queue(&self) -> &str;

	/// Puts one payload on the queue.
	fn publish(&self, payload: Vec<u8>) -> Result<(), PublishError>;

	/// Releases the underlying connection. Closing twice is a no-op.
	fn close(&self);
}

#[derive(Debug, Default)]
struct MemoryQueue {
	messages: Vec<Vec<u8>>,
	closed: bool,
}

/// In-process publisher that buffers payloads until drained.
#[derive(Debug)]
pub struct MemoryPublisher {
	queue: String,
	state: Mutex<MemoryQueue>,
}
impl MemoryPublisher {
	/// Creates a publisher for [`DEFAULT_QUEUE`].
	pub fn new() -> Self {
		Self::with_queue(DEFAULT_QUEUE)
	}

	/// Creates a publisher for `queue`.
	pub fn with_queue(queue: impl Into<String>) -> Self {
		Self { queue: queue.into(), state: Default::default() }
	}

	/// Removes and returns every buffered payload in publish order.
	pub fn drain(&self) -> Vec<Vec<u8>> {
		std::mem::take(&mut self.state.lock().messages)
	}

	/// Number of buffered payloads.
	pub fn len(&self) -> usize {
		self.state.lock().messages.len()
	}

	/// Returns `true` when nothing is buffered.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns `true` once [`close`](RecordPublisher::close) was called.
	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}
}
impl Default for MemoryPublisher {
	fn default() -> Self {
		Self::new()
	}
}
impl RecordPublisher for MemoryPublisher {
	fn queue(&self) -> &str {
		&self.queue
	}

	fn publish(&self, payload: Vec<u8>) -> Result<(), PublishError> {
		let mut state = self.state.lock();

		if state.closed {
			return Err(PublishError::Closed { queue: self.queue.clone() });
		}

		state.messages.push(payload);

		Ok(())
	}

	fn close(&self) {
		self.state.lock().closed = true;
	}
}

#[cfg(feature = "tracing")]
pub use self::layer::QueueLayer;
#[cfg(feature = "tracing")]
mod layer {
	// crates.io
	use tracing::{Event, Subscriber};
	use tracing_subscriber::{Layer, layer::Context};
	// self
	use super::RecordPublisher;
	use crate::{_prelude::*, log::layer::RecordVisitor};

	/// Layer publishing each event's message text to a [`RecordPublisher`].
	///
	/// Events without a message are skipped. Publish failures are dropped so logging callers
	/// never observe them.
	pub struct QueueLayer<P>
	where
		P: ?Sized + RecordPublisher,
	{
		publisher: Arc<P>,
	}
	impl<P> QueueLayer<P>
	where
		P: ?Sized + RecordPublisher,
	{
		/// Creates a layer feeding `publisher`.
		pub fn new(publisher: impl Into<Arc<P>>) -> Self {
			Self { publisher: publisher.into() }
		}

		/// Closes the underlying publisher.
		pub fn close(&self) {
			self.publisher.close();
		}
	}
	impl<S, P> Layer<S> for QueueLayer<P>
	where
		S: Subscriber,
		P: ?Sized + RecordPublisher,
	{
		fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
			let mut visitor = RecordVisitor::default();

			event.record(&mut visitor);

			if let Some(message) = visitor.message {
				let _ = self.publisher.publish(message.into_bytes());
			}
		}
	}
	impl<P> Debug for QueueLayer<P>
	where
		P: ?Sized + RecordPublisher,
	{
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("QueueLayer").field("queue", &self.publisher.queue()).finish()
		}
	}
}
