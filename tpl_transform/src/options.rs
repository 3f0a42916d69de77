//! Loosely-typed option bags and their decoding into typed option structs.
//!
//! Templates pass options as a dictionary whose values come straight from
//! the template language, so a flag may arrive as `true`, `"true"` or `1`.
//! [`OptionsBag`] looks keys up case-insensitively and converts values
//! weakly, and [`FromOptions`] implementations describe the recognized keys
//! and their defaults.

use std::collections::BTreeMap;

use crate::TransformError;
use crate::TransformResult;
use crate::Value;

/// The keys an options struct recognizes.
pub trait OptionSchema {
	/// Recognized keys, in their canonical spelling.
	const KEYS: &'static [&'static str];

	/// Closed schemas reject keys outside [`OptionSchema::KEYS`].
	fn closed() -> bool {
		false
	}
}

/// Build a typed options struct from a bag, applying defaults for every
/// omitted key.
pub trait FromOptions: OptionSchema + Sized {
	fn from_bag(bag: &OptionsBag) -> TransformResult<Self>;

	/// Validate the bag against the schema, then decode it.
	fn decode(bag: &OptionsBag) -> TransformResult<Self> {
		bag.check_schema::<Self>()?;
		Self::from_bag(bag)
	}
}

/// A loosely-typed key/value bag. An absent bag is the same as an empty one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsBag {
	entries: BTreeMap<String, Value>,
}

impl OptionsBag {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a bag from a generic value. `Null` is treated as empty, any
	/// other non-mapping value is rejected.
	pub fn from_value(value: &Value) -> TransformResult<Self> {
		match value {
			Value::Null => Ok(Self::new()),
			Value::Mapping(map) => {
				Ok(Self {
					entries: map.clone(),
				})
			}
			other => {
				Err(TransformError::invalid_option(
					"options",
					format!("invalid options: expected a map, received {other}"),
				))
			}
		}
	}

	/// Builder-style insert, mostly used by callers assembling options in
	/// code.
	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.entries.insert(key.into(), value.into());
		self
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Look up a key ignoring ASCII case.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.entries
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(key))
			.map(|(_, v)| v)
			.filter(|v| !v.is_null())
	}

	fn check_schema<S: OptionSchema>(&self) -> TransformResult<()> {
		if !S::closed() {
			return Ok(());
		}

		for key in self.entries.keys() {
			if !S::KEYS.iter().any(|known| known.eq_ignore_ascii_case(key)) {
				return Err(TransformError::invalid_option(
					key.clone(),
					format!(
						"unknown option `{key}`: expected one of {}",
						S::KEYS.join(", ")
					),
				));
			}
		}

		Ok(())
	}

	pub fn get_string(&self, key: &str) -> TransformResult<Option<String>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		match value {
			Value::String(s) => Ok(Some(s.clone())),
			Value::Bool(_) | Value::Number(_) => Ok(Some(value.to_text())),
			other => Err(invalid_type(key, "a string", other)),
		}
	}

	/// Decode a boolean, accepting the spellings `1`, `t`, `true`, `0`, `f`
	/// and `false` in any case, and numbers (non-zero is true).
	pub fn get_bool(&self, key: &str) -> TransformResult<Option<bool>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		match value {
			Value::Bool(b) => Ok(Some(*b)),
			Value::Number(n) => Ok(Some(n.as_f64() != 0.0)),
			Value::String(s) => {
				match s.to_ascii_lowercase().as_str() {
					"1" | "t" | "true" => Ok(Some(true)),
					"0" | "f" | "false" | "" => Ok(Some(false)),
					_ => Err(invalid_type(key, "a boolean", value)),
				}
			}
			other => Err(invalid_type(key, "a boolean", other)),
		}
	}

	/// Decode a single character. Integers are read as code points.
	pub fn get_char(&self, key: &str) -> TransformResult<Option<char>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		match value {
			Value::String(s) => {
				let mut chars = s.chars();
				match (chars.next(), chars.next()) {
					(Some(ch), None) => Ok(Some(ch)),
					_ => Err(invalid_type(key, "a single character", value)),
				}
			}
			Value::Number(n) => {
				n.as_i64()
					.and_then(|code| u32::try_from(code).ok())
					.and_then(char::from_u32)
					.map(Some)
					.ok_or_else(|| invalid_type(key, "a single character", value))
			}
			other => Err(invalid_type(key, "a single character", other)),
		}
	}

	pub fn get_usize(&self, key: &str) -> TransformResult<Option<usize>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		let parsed = match value {
			Value::Number(n) => n.as_i64().and_then(|i| usize::try_from(i).ok()),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		};

		parsed
			.map(Some)
			.ok_or_else(|| invalid_type(key, "a non-negative integer", value))
	}

	pub fn get_f64(&self, key: &str) -> TransformResult<Option<f64>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		let parsed = match value {
			Value::Number(n) => Some(n.as_f64()),
			Value::String(s) => s.trim().parse().ok(),
			_ => None,
		};

		parsed
			.map(Some)
			.ok_or_else(|| invalid_type(key, "a number", value))
	}

	/// Decode a map whose values are all scalars, converting them to strings.
	pub fn get_string_map(&self, key: &str) -> TransformResult<Option<BTreeMap<String, String>>> {
		let Some(value) = self.get(key) else {
			return Ok(None);
		};

		let Value::Mapping(map) = value else {
			return Err(invalid_type(key, "a map of strings", value));
		};

		map.iter()
			.map(|(k, v)| {
				match v {
					Value::String(_) | Value::Number(_) | Value::Bool(_) => {
						Ok((k.clone(), v.to_text()))
					}
					other => Err(invalid_type(key, "a map of strings", other)),
				}
			})
			.collect::<TransformResult<BTreeMap<_, _>>>()
			.map(Some)
	}
}

impl From<BTreeMap<String, Value>> for OptionsBag {
	fn from(entries: BTreeMap<String, Value>) -> Self {
		Self { entries }
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OptionsBag {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self {
			entries: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

fn invalid_type(key: &str, expected: &str, received: &Value) -> TransformError {
	TransformError::invalid_option(
		key,
		format!("invalid {key}: expected {expected}, received {received}"),
	)
}
