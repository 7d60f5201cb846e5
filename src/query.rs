//! Query construction for Eve-style document endpoints.
//!
//! Collection queries always carry a `?`, even without parameters, because the backend's parser
//! expects it. `where` and `projection` are opaque JSON documents rendered verbatim; see
//! [`render`] for the exact text format.

mod json;

pub use json::render;

// self
use crate::_prelude::*;

/// Errors emitted when building a query.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum QueryError {
	/// A record identifier and a condition were both supplied.
	#[error("Document queries do not support conditions.")]
	ConditionWithRecordId,
	/// A parameter could not be rendered as JSON.
	#[error("Query parameter `{parameter}` could not be rendered as JSON: {message}.")]
	Render {
		/// Parameter name (`where` or `projection`).
		parameter: &'static str,
		/// Renderer message.
		message: String,
	},
}

/// Builds `endpoint/record_id` or `endpoint?where=..&projection=..`.
///
/// Any non-null condition conflicts with a record identifier. Past that check, parameters follow
/// the backend client's truthiness when rendering: `null`, `false`, `0`, and empty strings,
/// arrays, or objects are left out of the path.
pub fn build_query(
	endpoint: &str,
	projection: Option<&Value>,
	condition: Option<&Value>,
	record_id: Option<&str>,
) -> Result<String, QueryError> {
	if record_id.is_some() && condition.is_some_and(|value| !value.is_null()) {
		return Err(QueryError::ConditionWithRecordId);
	}

	let projection = projection.filter(|value| json::is_truthy(value));
	let condition = condition.filter(|value| json::is_truthy(value));
	let mut query = endpoint.to_owned();

	if let Some(id) = record_id.filter(|id| !id.is_empty()) {
		query.push('/');
		query.push_str(id);

		return Ok(query);
	}

	query.push('?');

	if let Some(condition) = condition {
		query.push_str("where=");
		query.push_str(&render_parameter("where", condition)?);
	}
	if condition.is_some() && projection.is_some() {
		query.push('&');
	}
	if let Some(projection) = projection {
		query.push_str("projection=");
		query.push_str(&render_parameter("projection", projection)?);
	}

	Ok(query)
}

fn render_parameter(parameter: &'static str, value: &Value) -> Result<String, QueryError> {
	render(value).map_err(|e| QueryError::Render { parameter, message: e.to_string() })
}

/// Fluent form of [`build_query`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
	/// Resource endpoint, relative to the fetcher's base URL.
	pub endpoint: String,
	/// Projection document.
	pub projection: Option<Value>,
	/// Filter document.
	pub condition: Option<Value>,
	/// Identifier of a single document.
	pub record_id: Option<String>,
}
impl Query {
	/// Starts a query against `endpoint`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into(), ..Default::default() }
	}

	/// Restricts the returned fields.
	pub fn projection(mut self, projection: Value) -> Self {
		self.projection = Some(projection);

		self
	}

	/// Filters the collection.
	pub fn condition(mut self, condition: Value) -> Self {
		self.condition = Some(condition);

		self
	}

	/// Targets a single document; structured identifiers are stringified.
	pub fn record_id(mut self, id: impl Display) -> Self {
		self.record_id = Some(id.to_string());

		self
	}

	/// Renders the query path.
	pub fn build(&self) -> Result<String, QueryError> {
		build_query(
			&self.endpoint,
			self.projection.as_ref(),
			self.condition.as_ref(),
			self.record_id.as_deref(),
		)
	}
}
