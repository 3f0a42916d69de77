//! A CSV reader following the quoting rules of Go's `encoding/csv`.
//!
//! In strict mode a quote inside an unquoted field, or a quote inside a
//! quoted field that is neither doubled nor followed by a delimiter or line
//! end, is an error. With lazy quotes both are kept as literal characters and
//! an unterminated quoted field runs to the end of the input.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::TransformError;
use crate::TransformResult;
use crate::Value;
use crate::unmarshal::TargetType;
use crate::unmarshal::UnmarshalOptions;

const BARE_QUOTE: &str = "bare \" in non-quoted-field";
const EXTRANEOUS_QUOTE: &str = "extraneous or missing \" in quoted-field";
const FIELD_COUNT: &str = "wrong number of fields";

/// Reader settings, usually taken from [`UnmarshalOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSettings {
	pub delimiter: char,
	pub comment: Option<char>,
	pub lazy_quotes: bool,
}

impl Default for CsvSettings {
	fn default() -> Self {
		Self {
			delimiter: ',',
			comment: None,
			lazy_quotes: false,
		}
	}
}

impl From<&UnmarshalOptions> for CsvSettings {
	fn from(options: &UnmarshalOptions) -> Self {
		Self {
			delimiter: options.delimiter,
			comment: options.comment,
			lazy_quotes: options.lazy_quotes,
		}
	}
}

/// Check that the delimiter and comment characters can be used together.
pub(crate) fn validate_settings(settings: &CsvSettings) -> TransformResult<()> {
	fn is_valid(ch: char) -> bool {
		!matches!(ch, '\0' | '"' | '\r' | '\n' | '\u{FFFD}')
	}

	if !is_valid(settings.delimiter) {
		return Err(TransformError::invalid_option(
			"delimiter",
			format!("invalid delimiter: {:?} cannot separate fields", settings.delimiter),
		));
	}

	if let Some(comment) = settings.comment {
		if !is_valid(comment) || comment == settings.delimiter {
			return Err(TransformError::invalid_option(
				"comment",
				format!("invalid comment: {comment:?} cannot mark comment lines"),
			));
		}
	}

	Ok(())
}

/// Reads records one at a time.
pub struct CsvReader<'a> {
	lines: std::str::SplitInclusive<'a, char>,
	settings: CsvSettings,
	line_number: usize,
	fields_per_record: Option<usize>,
}

impl<'a> CsvReader<'a> {
	pub fn new(content: &'a str, settings: CsvSettings) -> Self {
		Self {
			lines: content.split_inclusive('\n'),
			settings,
			line_number: 0,
			fields_per_record: None,
		}
	}

	/// The next physical line as characters, with `\r\n` normalized to `\n`.
	fn next_line(&mut self) -> Option<Vec<char>> {
		let line = self.lines.next()?;
		self.line_number += 1;

		let mut chars: Vec<char> = match line.strip_suffix("\r\n") {
			Some(stripped) => stripped.chars().collect(),
			None => return Some(line.chars().collect()),
		};
		chars.push('\n');
		Some(chars)
	}

	fn error(&self, column: usize, reason: &str) -> TransformError {
		TransformError::CsvParse {
			line: self.line_number,
			column,
			reason: reason.to_string(),
		}
	}

	/// Read the next record, skipping blank and comment lines. Returns
	/// `Ok(None)` at the end of the input.
	pub fn read_record(&mut self) -> TransformResult<Option<Vec<String>>> {
		let delimiter = self.settings.delimiter;
		let lazy = self.settings.lazy_quotes;

		let mut chars = loop {
			let Some(line) = self.next_line() else {
				return Ok(None);
			};
			if self.settings.comment.is_some_and(|c| line.first() == Some(&c)) {
				continue;
			}
			if line.is_empty() || line == ['\n'] {
				continue;
			}
			break line;
		};
		let record_line = self.line_number;
		let mut pos = 0;
		let mut fields = Vec::new();

		'fields: loop {
			if chars.get(pos) != Some(&'"') {
				let end = chars[pos..]
					.iter()
					.position(|&c| c == delimiter)
					.map(|i| pos + i);
				let mut stop = end.unwrap_or(chars.len());
				if end.is_none() && stop > pos && chars[stop - 1] == '\n' {
					stop -= 1;
				}

				if !lazy {
					if let Some(quote) = chars[pos..stop].iter().position(|&c| c == '"') {
						return Err(self.error(pos + quote + 1, BARE_QUOTE));
					}
				}

				fields.push(chars[pos..stop].iter().collect::<String>());
				match end {
					Some(i) => {
						pos = i + 1;
						continue 'fields;
					}
					None => break 'fields,
				}
			}

			// Quoted field, possibly spanning several lines.
			let mut field = String::new();
			pos += 1;
			loop {
				match chars[pos..].iter().position(|&c| c == '"') {
					Some(i) => {
						field.extend(&chars[pos..pos + i]);
						pos += i + 1;
						match chars.get(pos) {
							Some('"') => {
								field.push('"');
								pos += 1;
							}
							Some(&c) if c == delimiter => {
								pos += 1;
								fields.push(field);
								continue 'fields;
							}
							None | Some('\n') => {
								fields.push(field);
								break 'fields;
							}
							Some(_) if lazy => field.push('"'),
							Some(_) => return Err(self.error(pos, EXTRANEOUS_QUOTE)),
						}
					}
					None if pos < chars.len() => {
						field.extend(&chars[pos..]);
						chars = self.next_line().unwrap_or_default();
						pos = 0;
					}
					None => {
						if !lazy {
							return Err(self.error(pos + 1, EXTRANEOUS_QUOTE));
						}
						fields.push(field);
						break 'fields;
					}
				}
			}
		}

		match self.fields_per_record {
			None => self.fields_per_record = Some(fields.len()),
			Some(expected) if expected != fields.len() => {
				return Err(TransformError::CsvParse {
					line: record_line,
					column: 1,
					reason: FIELD_COUNT.to_string(),
				});
			}
			Some(_) => {}
		}

		Ok(Some(fields))
	}
}

impl Iterator for CsvReader<'_> {
	type Item = TransformResult<Vec<String>>;

	fn next(&mut self) -> Option<Self::Item> {
		self.read_record().transpose()
	}
}

/// Read every record of `content`.
pub fn read_all(content: &str, settings: CsvSettings) -> TransformResult<Vec<Vec<String>>> {
	validate_settings(&settings)?;
	CsvReader::new(content, settings).collect()
}

/// Decode CSV into a sequence of rows, or a sequence of header-keyed
/// mappings when the target type is [`TargetType::Map`].
pub fn decode(content: &str, options: &UnmarshalOptions) -> TransformResult<Value> {
	let records = read_all(content, CsvSettings::from(options))?;
	tracing::trace!(records = records.len(), target = ?options.target_type, "decoded csv");

	match options.target_type {
		TargetType::Unspecified | TargetType::Slice => {
			Ok(Value::Sequence(
				records
					.into_iter()
					.map(|record| Value::Sequence(record.into_iter().map(Value::String).collect()))
					.collect(),
			))
		}
		TargetType::Map => records_to_maps(records),
	}
}

/// The header is checked for duplicates before the row count, so a
/// duplicated header is reported even when no data rows follow it.
fn records_to_maps(records: Vec<Vec<String>>) -> TransformResult<Value> {
	let mut records = records.into_iter();
	let header = records.next().unwrap_or_default();

	let mut seen = BTreeSet::new();
	for field in &header {
		if !seen.insert(field.as_str()) {
			return Err(TransformError::DuplicateHeader {
				field: field.clone(),
			});
		}
	}

	if header.is_empty() || records.as_slice().is_empty() {
		return Err(TransformError::EmptyOrHeaderOnly);
	}

	Ok(Value::Sequence(
		records
			.map(|record| {
				let row: BTreeMap<String, Value> = header
					.iter()
					.cloned()
					.zip(record.into_iter().map(Value::String))
					.collect();
				Value::Mapping(row)
			})
			.collect(),
	))
}
