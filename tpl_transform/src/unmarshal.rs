use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::FromOptions;
use crate::OptionSchema;
use crate::OptionsBag;
use crate::TransformError;
use crate::TransformResult;
use crate::Value;
use crate::decode;
use crate::decode::Format;
use crate::decode::csv::CsvSettings;

/// The shape CSV records are decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetType {
	/// Not set; behaves like [`TargetType::Slice`].
	#[default]
	Unspecified,
	/// A sequence of rows, each a sequence of string cells. The header row is
	/// the first element.
	Slice,
	/// A sequence of mappings keyed by the header row.
	Map,
}

impl FromStr for TargetType {
	type Err = TransformError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"" => Ok(Self::Unspecified),
			"slice" => Ok(Self::Slice),
			"map" => Ok(Self::Map),
			other => {
				Err(TransformError::invalid_option(
					"targetType",
					format!("invalid targetType: expected either slice or map, received {other}"),
				))
			}
		}
	}
}

/// Options accepted by [`unmarshal`].
///
/// | key | default |
/// | --- | --- |
/// | `format` | detected |
/// | `delimiter` | `,` |
/// | `comment` | none |
/// | `lazyQuotes` | `false` |
/// | `targetType` | unspecified |
#[derive(Debug, Clone, PartialEq)]
pub struct UnmarshalOptions {
	pub format: Option<Format>,
	pub delimiter: char,
	pub comment: Option<char>,
	pub lazy_quotes: bool,
	pub target_type: TargetType,
}

impl Default for UnmarshalOptions {
	fn default() -> Self {
		let csv = CsvSettings::default();

		Self {
			format: None,
			delimiter: csv.delimiter,
			comment: csv.comment,
			lazy_quotes: csv.lazy_quotes,
			target_type: TargetType::Unspecified,
		}
	}
}

impl OptionSchema for UnmarshalOptions {
	const KEYS: &'static [&'static str] =
		&["format", "delimiter", "comment", "lazyQuotes", "targetType"];
}

impl FromOptions for UnmarshalOptions {
	fn from_bag(bag: &OptionsBag) -> TransformResult<Self> {
		let defaults = Self::default();
		let format = bag
			.get_string("format")?
			.filter(|format| !format.trim().is_empty())
			.map(|format| format.parse::<Format>())
			.transpose()?;
		let target_type = bag
			.get_string("targetType")?
			.map(|target| target.parse::<TargetType>())
			.transpose()?
			.unwrap_or_default();

		let options = Self {
			format,
			delimiter: bag.get_char("delimiter")?.unwrap_or(defaults.delimiter),
			comment: bag.get_char("comment")?.or(defaults.comment),
			lazy_quotes: bag.get_bool("lazyQuotes")?.unwrap_or(defaults.lazy_quotes),
			target_type,
		};
		decode::csv::validate_settings(&CsvSettings::from(&options))?;

		Ok(options)
	}
}

/// Already-read content handed over by the resource system, together with
/// what is known about its type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
	pub name: String,
	pub media_type: Option<String>,
	pub content: String,
}

impl Resource {
	pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			media_type: None,
			content: content.into(),
		}
	}

	/// Build a resource from raw bytes. Invalid UTF-8 is rejected.
	pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> TransformResult<Self> {
		let name = name.into();
		let content =
			String::from_utf8(bytes).map_err(|e| TransformError::decode(&name, e))?;

		Ok(Self::new(name, content))
	}

	#[must_use]
	pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
		self.media_type = Some(media_type.into());
		self
	}

	/// The format signalled by the media type, falling back to the file
	/// extension of the name.
	pub fn format(&self) -> Option<Format> {
		self.media_type
			.as_deref()
			.and_then(Format::from_media_type)
			.or_else(|| {
				Path::new(&self.name)
					.extension()
					.and_then(|e| e.to_str())
					.and_then(Format::from_extension)
			})
	}
}

impl fmt::Display for Resource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.name)
	}
}

/// The data handed to [`unmarshal`].
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
	/// Plain text with no type information.
	Text(&'a str),
	/// A resource with a name and optional media type.
	Resource(&'a Resource),
}

impl Input<'_> {
	fn content(&self) -> &str {
		match self {
			Self::Text(text) => text,
			Self::Resource(resource) => &resource.content,
		}
	}
}

impl<'a> From<&'a str> for Input<'a> {
	fn from(text: &'a str) -> Self {
		Self::Text(text)
	}
}

impl<'a> From<&'a String> for Input<'a> {
	fn from(text: &'a String) -> Self {
		Self::Text(text)
	}
}

impl<'a> From<&'a Resource> for Input<'a> {
	fn from(resource: &'a Resource) -> Self {
		Self::Resource(resource)
	}
}

/// Pick the decoder for `input`: the explicit option wins, then the
/// resource's media type or extension, then content sniffing of the
/// remaining structured formats.
pub fn select_format(options: &UnmarshalOptions, input: Input<'_>) -> TransformResult<Format> {
	if let Some(format) = options.format {
		tracing::debug!(%format, "format set explicitly");
		return Ok(format);
	}

	if let Input::Resource(resource) = input {
		if let Some(format) = resource.format() {
			tracing::debug!(%format, resource = %resource, "format from resource type");
			return Ok(format);
		}
	}

	let format = Format::from_content(input.content()).ok_or(TransformError::UndeterminedFormat)?;
	tracing::debug!(%format, "format detected from content");

	Ok(format)
}

/// Decode `input` into a [`Value`].
///
/// Options are validated before anything else, so an invalid option fails
/// even for empty input. Empty input decodes to [`Value::Null`].
pub fn unmarshal<'a>(options: &OptionsBag, input: impl Into<Input<'a>>) -> TransformResult<Value> {
	let options = UnmarshalOptions::decode(options)?;
	let input = input.into();

	if input.content().is_empty() {
		return Ok(Value::Null);
	}

	let format = select_format(&options, input)?;
	decode::decode(format, input.content(), &options)
}
