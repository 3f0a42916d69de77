//! Format decoders and format selection.

use std::fmt;
use std::str::FromStr;

use crate::TransformError;
use crate::TransformResult;
use crate::Value;
use crate::unmarshal::UnmarshalOptions;

pub mod csv;
mod structured;

pub use structured::decode_json;
pub use structured::decode_toml;
pub use structured::decode_yaml;

/// A serialized format with a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
	Csv,
	Json,
	Toml,
	Yaml,
}

impl Format {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Csv => "csv",
			Self::Json => "json",
			Self::Toml => "toml",
			Self::Yaml => "yaml",
		}
	}

	/// Resolve a file extension (without the leading dot).
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"csv" => Some(Self::Csv),
			"json" => Some(Self::Json),
			"toml" => Some(Self::Toml),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Resolve a media type such as `text/csv` or `application/json;
	/// charset=utf-8`.
	pub fn from_media_type(media_type: &str) -> Option<Self> {
		let essence = media_type
			.split(';')
			.next()
			.unwrap_or_default()
			.trim()
			.to_ascii_lowercase();

		match essence.as_str() {
			"text/csv" | "text/comma-separated-values" => Some(Self::Csv),
			"application/json" | "text/json" => Some(Self::Json),
			"application/toml" | "text/toml" => Some(Self::Toml),
			"application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => {
				Some(Self::Yaml)
			}
			other => {
				other
					.strip_suffix("+json")
					.map(|_| Self::Json)
					.or_else(|| other.strip_suffix("+yaml").map(|_| Self::Yaml))
			}
		}
	}

	/// Guess the format of plain text. Only JSON, YAML and TOML are
	/// considered; a CSV header row is indistinguishable from prose.
	///
	/// Text opening with `[` is JSON unless its first line is a TOML table
	/// header such as `[params]` or `[[posts]]`.
	pub fn from_content(content: &str) -> Option<Self> {
		let trimmed = content.trim_start();
		if trimmed.starts_with('{') || (trimmed.starts_with('[') && !is_toml_table_header(trimmed)) {
			return Some(Self::Json);
		}

		match (content.find(':'), content.find('=')) {
			(Some(yaml), Some(toml)) if toml < yaml => Some(Self::Toml),
			(Some(_), _) => Some(Self::Yaml),
			(None, Some(_)) => Some(Self::Toml),
			(None, None) => None,
		}
	}
}

/// Whether the first line of `text` is a TOML `[table]` or `[[array]]`
/// header. A line that is itself a JSON array, such as `[1]` or `[true]`,
/// is not.
fn is_toml_table_header(text: &str) -> bool {
	let line = text.lines().next().unwrap_or_default();
	let line = line.split_once('#').map_or(line, |(before, _)| before).trim_end();

	if serde_json::from_str::<serde_json::Value>(line).is_ok() {
		return false;
	}

	let inner = line
		.strip_prefix("[[")
		.and_then(|rest| rest.strip_suffix("]]"))
		.or_else(|| line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')))
		.map(str::trim);

	inner.is_some_and(|key| {
		!key.is_empty()
			&& key.split('.').all(|part| {
				let part = part.trim();
				!part.is_empty()
					&& part
						.chars()
						.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
			})
	})
}

impl fmt::Display for Format {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Format {
	type Err = TransformError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		Self::from_extension(value.trim().trim_start_matches('.'))
			.ok_or_else(|| TransformError::UnsupportedFormat(value.to_string()))
	}
}

/// Decode `content` as `format`.
pub fn decode(format: Format, content: &str, options: &UnmarshalOptions) -> TransformResult<Value> {
	match format {
		Format::Csv => csv::decode(content, options),
		Format::Json => decode_json(content),
		Format::Toml => decode_toml(content),
		Format::Yaml => decode_yaml(content),
	}
}
