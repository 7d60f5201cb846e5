//! `tracing-subscriber` integration for [`LogFormatter`].

// std
use std::io::{self, Write};
// crates.io
use tracing::{
	Event, Level, Subscriber,
	field::{Field, Visit},
};
use tracing_subscriber::{
	Layer,
	filter::LevelFilter,
	fmt::MakeWriter,
	layer::{Context, SubscriberExt},
	util::SubscriberInitExt,
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	log::{LogFormatter, LogRecord},
};

/// Maps a `tracing` level to the sink's severity names.
pub fn severity(level: &Level) -> &'static str {
	match *level {
		Level::ERROR => "ERROR",
		Level::WARN => "WARNING",
		Level::INFO => "INFO",
		_ => "DEBUG",
	}
}

/// Registers a [`StackdriverLayer`] writing to stdout as the global subscriber.
///
/// Events below `INFO` are dropped.
pub fn install(formatter: LogFormatter) -> Result<(), ConfigError> {
	tracing_subscriber::registry()
		.with(LevelFilter::INFO)
		.with(StackdriverLayer::new(formatter))
		.try_init()
		.map_err(ConfigError::logger_install)
}

/// Layer that writes every event as one Stackdriver JSON line.
///
/// The event's `message` and `category` fields are lifted into the record; other fields are
/// kept as extra keys.
pub struct StackdriverLayer<W = fn() -> io::Stdout> {
	formatter: LogFormatter,
	make_writer: W,
}
impl StackdriverLayer {
	/// Creates a layer writing to stdout.
	pub fn new(formatter: LogFormatter) -> Self {
		Self { formatter, make_writer: io::stdout }
	}
}
impl<W> StackdriverLayer<W> {
	/// Redirects output to another writer factory.
	pub fn with_writer<W2>(self, make_writer: W2) -> StackdriverLayer<W2>
	where
		W2: 'static + for<'a> MakeWriter<'a>,
	{
		StackdriverLayer { formatter: self.formatter, make_writer }
	}

	/// Formatter applied to each event.
	pub fn formatter(&self) -> &LogFormatter {
		&self.formatter
	}
}
impl<S, W> Layer<S> for StackdriverLayer<W>
where
	S: Subscriber,
	W: 'static + for<'a> MakeWriter<'a>,
{
	fn on_event(&self, event: &Event<'_>, _: Context<'_, S>) {
		let mut visitor = RecordVisitor::default();

		event.record(&mut visitor);

		let record = visitor.into_record(severity(event.metadata().level()));
		let line = self.formatter.format(record).to_string();
		let mut writer = self.make_writer.make_writer_for(event.metadata());

		// A failed write has nowhere to be reported.
		let _ = writeln!(writer, "{line}");
	}
}
impl<W> Debug for StackdriverLayer<W> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StackdriverLayer").field("formatter", &self.formatter).finish()
	}
}

/// Collects event fields into a [`LogRecord`].
#[derive(Debug, Default)]
pub(crate) struct RecordVisitor {
	pub(crate) message: Option<String>,
	category: Option<String>,
	fields: Map<String, Value>,
}
impl RecordVisitor {
	pub(crate) fn into_record(self, level: &str) -> LogRecord {
		LogRecord {
			level: level.into(),
			message: self.message.unwrap_or_default(),
			category: self.category,
			fields: self.fields,
		}
	}

	fn insert(&mut self, field: &Field, value: Value) {
		match field.name() {
			"message" => self.message = Some(text(value)),
			"category" => self.category = Some(text(value)),
			name if name.starts_with("log.") => (),
			name => {
				self.fields.insert(name.into(), value);
			},
		}
	}
}
impl Visit for RecordVisitor {
	fn record_f64(&mut self, field: &Field, value: f64) {
		self.insert(field, Value::from(value));
	}

	fn record_i64(&mut self, field: &Field, value: i64) {
		self.insert(field, Value::from(value));
	}

	fn record_u64(&mut self, field: &Field, value: u64) {
		self.insert(field, Value::from(value));
	}

	fn record_bool(&mut self, field: &Field, value: bool) {
		self.insert(field, Value::from(value));
	}

	fn record_str(&mut self, field: &Field, value: &str) {
		self.insert(field, Value::from(value));
	}

	fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
		self.insert(field, Value::String(format!("{value:?}")));
	}
}

fn text(value: Value) -> String {
	match value {
		Value::String(text) => text,
		other => other.to_string(),
	}
}
