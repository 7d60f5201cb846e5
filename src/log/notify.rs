//! Alert email delivery.

// self
use crate::_prelude::*;

/// Default SendGrid API origin.
pub const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com";

/// One alert email.
#[derive(Clone, PartialEq, Eq)]
pub struct Notification {
	/// Subject line.
	pub subject: String,
	/// Plain-text body.
	pub body: String,
	/// Primary recipient.
	pub to: String,
	/// Blind-copy recipients.
	pub bcc: Vec<String>,
	/// Sender address.
	pub from: String,
	/// API key authorizing the send.
	pub api_key: String,
}
impl Debug for Notification {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Notification")
			.field("subject", &self.subject)
			.field("body", &self.body)
			.field("to", &self.to)
			.field("bcc", &self.bcc)
			.field("from", &self.from)
			.field("api_key", &"<redacted>")
			.finish()
	}
}

/// Capability to deliver a [`Notification`].
///
/// Implementations report success as a plain `bool` and must not panic; the log formatter
/// discards the result so logging never fails because an email did not go out.
pub trait Notifier
where
	Self: 'static + Send + Sync,
{
	/// Sends the notification, returning `true` once the provider accepted it.
	fn send(&self, notification: &Notification) -> bool;
}

/// Notifier that never delivers anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledNotifier;
impl Notifier for DisabledNotifier {
	fn send(&self, _: &Notification) -> bool {
		false
	}
}

/// Notifier backed by the SendGrid v3 `mail/send` API.
///
/// The blocking client is built once and reused. Client construction and each send run on a
/// scoped worker thread, so the notifier is safe to create and call from inside an async
/// runtime. The provider answers 202 on acceptance; anything else counts as a failure.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct SendGridNotifier {
	client: reqwest::blocking::Client,
	endpoint: String,
	sandbox: bool,
}
#[cfg(feature = "reqwest")]
impl SendGridNotifier {
	/// Creates a notifier targeting [`SENDGRID_ENDPOINT`] with a default blocking client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps an existing blocking client.
	///
	/// `reqwest` panics when a blocking client is built or used on an async runtime thread;
	/// construct it elsewhere.
	pub fn with_client(client: reqwest::blocking::Client) -> Self {
		Self { client, endpoint: SENDGRID_ENDPOINT.into(), sandbox: false }
	}

	/// Builds a client whose sends give up after `timeout`.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		let client =
			off_runtime(move || reqwest::blocking::Client::builder().timeout(timeout).build())?;

		Ok(Self::with_client(client))
	}

	/// Points the notifier at another API origin.
	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();

		self
	}

	/// Asks the provider to validate mails without delivering them.
	pub fn with_sandbox_mode(mut self, enabled: bool) -> Self {
		self.sandbox = enabled;

		self
	}

	/// Request body understood by `mail/send`.
	pub fn payload(&self, notification: &Notification) -> Value {
		let mut personalization = serde_json::json!({ "to": [{ "email": notification.to }] });

		if !notification.bcc.is_empty() {
			personalization["bcc"] = notification
				.bcc
				.iter()
				.map(|email| serde_json::json!({ "email": email }))
				.collect();
		}

		let mut payload = serde_json::json!({
			"personalizations": [personalization],
			"from": { "email": notification.from },
			"subject": notification.subject,
			"content": [{ "type": "text/plain", "value": notification.body }],
		});

		if self.sandbox {
			payload["mail_settings"] = serde_json::json!({ "sandbox_mode": { "enable": true } });
		}

		payload
	}

	fn post(&self, notification: &Notification) -> Result<u16, ReqwestError> {
		let response = self
			.client
			.post(format!("{}/v3/mail/send", self.endpoint.trim_end_matches('/')))
			.bearer_auth(&notification.api_key)
			.json(&self.payload(notification))
			.send()?;

		Ok(response.status().as_u16())
	}
}
#[cfg(feature = "reqwest")]
impl Default for SendGridNotifier {
	fn default() -> Self {
		Self::with_client(off_runtime(reqwest::blocking::Client::new))
	}
}
#[cfg(feature = "reqwest")]
impl Notifier for SendGridNotifier {
	fn send(&self, notification: &Notification) -> bool {
		let outcome =
			std::thread::scope(|scope| scope.spawn(|| self.post(notification)).join());

		matches!(outcome, Ok(Ok(202)))
	}
}

/// Runs `f` on a scoped thread that never carries an async runtime context.
///
/// A panic inside `f` is resumed on the caller.
#[cfg(feature = "reqwest")]
pub(crate) fn off_runtime<F, R>(f: F) -> R
where
	F: Send + FnOnce() -> R,
	R: Send,
{
	std::thread::scope(|scope| scope.spawn(f).join())
		.unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}
