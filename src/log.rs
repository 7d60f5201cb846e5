//! Stackdriver-shaped structured log records with optional alert emails.
//!
//! [`LogFormatter`] turns a [`LogRecord`] into the JSON object the log sink expects: the level
//! is renamed to `severity`, `category` is always present, and records whose category contains
//! [`EMAIL_MARKER`] are additionally forwarded through a [`Notifier`] when the formatter holds
//! a complete [`EmailConfig`]. Formatting never fails; notification outcomes are not reported
//! back to the logging caller.

pub mod notify;
pub mod queue;

#[cfg(feature = "tracing")] mod layer;

#[cfg(feature = "tracing")] pub use layer::*;
pub use notify::*;
pub use queue::*;

// self
use crate::_prelude::*;

/// Category assigned to records that carry none.
pub const DEFAULT_CATEGORY: &str = "INFO";
/// Substring of a category that requests an alert email.
pub const EMAIL_MARKER: &str = "EMAIL";
/// Subject line of alert emails.
pub const NOTIFICATION_SUBJECT: &str = "STACKDRIVER_NOTIFICATION";

const RESERVED_KEYS: [&str; 4] = ["level", "message", "category", "severity"];

/// Log event as produced by the application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogRecord {
	/// Level name as reported by the logging facility, e.g. `WARNING`.
	pub level: String,
	/// Human-readable message.
	pub message: String,
	/// Routing category; [`DEFAULT_CATEGORY`] when absent or empty.
	pub category: Option<String>,
	/// Extra structured fields emitted ahead of the standard keys.
	pub fields: Map<String, Value>,
}
impl LogRecord {
	/// Creates an uncategorized record.
	pub fn new(level: impl Into<String>, message: impl Into<String>) -> Self {
		Self { level: level.into(), message: message.into(), ..Default::default() }
	}

	/// Sets the routing category.
	pub fn with_category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());

		self
	}

	/// Adds a structured field.
	pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.fields.insert(name.into(), value.into());

		self
	}
}

/// Sink-ready JSON object; serializes as the bare map.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StructuredRecord(Map<String, Value>);
impl StructuredRecord {
	/// Looks up a key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// `severity` value.
	pub fn severity(&self) -> Option<&str> {
		self.get("severity").and_then(Value::as_str)
	}

	/// `category` value.
	pub fn category(&self) -> Option<&str> {
		self.get("category").and_then(Value::as_str)
	}

	/// `message` value.
	pub fn message(&self) -> Option<&str> {
		self.get("message").and_then(Value::as_str)
	}

	/// Borrows the underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Consumes the record, returning the underlying map.
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}
}
impl Display for StructuredRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let line = serde_json::to_string(&self.0).map_err(|_| std::fmt::Error)?;

		f.write_str(&line)
	}
}

/// Reasons an [`EmailConfig`] cannot be used; any of them disables the email path.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum EmailConfigError {
	/// No API key was configured.
	#[error("Email API key is missing.")]
	MissingApiKey,
	/// No sender address was configured.
	#[error("Email sender address is missing.")]
	MissingSender,
	/// No recipient address was configured.
	#[error("Email recipient list is empty.")]
	NoRecipients,
}

/// Credentials and addresses used for alert emails.
#[derive(Clone, PartialEq, Eq)]
pub struct EmailConfig {
	/// Email API key.
	pub api_key: String,
	/// Sender address.
	pub from: String,
	/// Recipients; the first is the primary "to", the rest are blind copies.
	pub recipients: Vec<String>,
}
impl EmailConfig {
	/// Creates a configuration; it is checked when used, not here.
	pub fn new(
		api_key: impl Into<String>,
		from: impl Into<String>,
		recipients: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		Self {
			api_key: api_key.into(),
			from: from.into(),
			recipients: recipients.into_iter().map(Into::into).collect(),
		}
	}

	/// Checks that every piece needed to send an email is present.
	pub fn validate(&self) -> Result<(), EmailConfigError> {
		if self.api_key.is_empty() {
			return Err(EmailConfigError::MissingApiKey);
		}
		if self.from.is_empty() {
			return Err(EmailConfigError::MissingSender);
		}
		if self.recipients.is_empty() {
			return Err(EmailConfigError::NoRecipients);
		}

		Ok(())
	}

	/// Builds the alert notification carrying `body`.
	pub fn notification(&self, body: impl Into<String>) -> Result<Notification, EmailConfigError> {
		self.validate()?;

		let (to, bcc) = self.recipients.split_first().ok_or(EmailConfigError::NoRecipients)?;

		Ok(Notification {
			subject: NOTIFICATION_SUBJECT.into(),
			body: body.into(),
			to: to.clone(),
			bcc: bcc.to_vec(),
			from: self.from.clone(),
			api_key: self.api_key.clone(),
		})
	}
}
impl Debug for EmailConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("EmailConfig")
			.field("api_key_set", &!self.api_key.is_empty())
			.field("from", &self.from)
			.field("recipients", &self.recipients)
			.finish()
	}
}

/// Formats log records for the sink and fires alert emails.
///
/// Email configuration belongs to one formatter instance; two formatters never share it.
#[derive(Clone)]
pub struct LogFormatter {
	email: Option<EmailConfig>,
	notifier: Arc<dyn Notifier>,
}
impl LogFormatter {
	/// Creates a formatter without email configuration using the default notifier.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a formatter that delivers alerts through `notifier`.
	pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
		Self { email: None, notifier }
	}

	/// Builder form of [`configure`](Self::configure).
	pub fn with_email(mut self, config: EmailConfig) -> Self {
		self.configure(config);

		self
	}

	/// Installs the email configuration, replacing any previous one.
	pub fn configure(&mut self, config: EmailConfig) {
		self.email = Some(config);
	}

	/// Current email configuration.
	pub fn email_config(&self) -> Option<&EmailConfig> {
		self.email.as_ref()
	}

	/// Produces the sink record and sends an alert email when the category asks for one.
	///
	/// Keys appear as the record's extra fields followed by `message`, `category`, and
	/// `severity`. The level key itself is never emitted.
	pub fn format(&self, record: LogRecord) -> StructuredRecord {
		let LogRecord { level, message, category, fields } = record;
		let category = category
			.filter(|category| !category.is_empty())
			.unwrap_or_else(|| DEFAULT_CATEGORY.into());

		if category.contains(EMAIL_MARKER) {
			self.alert(&message);
		}

		let mut map = fields
			.into_iter()
			.filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
			.collect::<Map<_, _>>();

		map.insert("message".into(), Value::String(message));
		map.insert("category".into(), Value::String(category));
		map.insert("severity".into(), Value::String(level));

		StructuredRecord(map)
	}

	fn alert(&self, message: &str) {
		let Some(config) = &self.email else {
			return;
		};

		// An incomplete configuration disables the email path.
		if let Ok(notification) = config.notification(message) {
			self.notifier.send(&notification);
		}
	}
}
impl Default for LogFormatter {
	fn default() -> Self {
		#[cfg(feature = "reqwest")]
		{
			Self::with_notifier(Arc::new(SendGridNotifier::default()))
		}
		#[cfg(not(feature = "reqwest"))]
		{
			Self::with_notifier(Arc::new(DisabledNotifier))
		}
	}
}
impl Debug for LogFormatter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LogFormatter").field("email", &self.email).finish_non_exhaustive()
	}
}
