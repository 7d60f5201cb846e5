//! JSON text rendering matching the backend's reference client.
//!
//! Separators are `", "` and `": "`, object keys keep insertion order, and every non-ASCII
//! character is escaped as lowercase `\uXXXX` (surrogate pairs above the BMP).

// std
use std::io::{self, Write};
// crates.io
use serde_json::ser::{Formatter as JsonFormatter, Serializer};
// self
use crate::_prelude::*;

/// Renders `value` as backend-compatible JSON text.
pub fn render(value: &Value) -> Result<String, serde_json::Error> {
	let mut buf = Vec::new();
	let mut serializer = Serializer::with_formatter(&mut buf, SpacedAsciiFormatter);

	value.serialize(&mut serializer)?;

	// The formatter only emits ASCII, so this conversion cannot lose data.
	Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub(crate) fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(flag) => *flag,
		Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
		Value::String(text) => !text.is_empty(),
		Value::Array(items) => !items.is_empty(),
		Value::Object(fields) => !fields.is_empty(),
	}
}

struct SpacedAsciiFormatter;
impl JsonFormatter for SpacedAsciiFormatter {
	fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + Write,
	{
		if first { Ok(()) } else { writer.write_all(b", ") }
	}

	fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
	where
		W: ?Sized + Write,
	{
		if first { Ok(()) } else { writer.write_all(b", ") }
	}

	fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
	where
		W: ?Sized + Write,
	{
		writer.write_all(b": ")
	}

	fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
	where
		W: ?Sized + Write,
	{
		let mut start = 0;

		for (idx, ch) in fragment.char_indices() {
			if ch.is_ascii() {
				continue;
			}

			writer.write_all(&fragment.as_bytes()[start..idx])?;

			let mut units = [0_u16; 2];

			for unit in ch.encode_utf16(&mut units) {
				write!(writer, "\\u{unit:04x}")?;
			}

			start = idx + ch.len_utf8();
		}

		writer.write_all(&fragment.as_bytes()[start..])
	}
}
