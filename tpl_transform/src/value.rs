use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::Serializer;

use crate::TransformError;
use crate::TransformResult;

/// The uniform value produced by every decoder.
///
/// Mapping keys are always strings and are kept sorted, which makes the
/// serialized form canonical: the same document decoded from JSON, YAML or
/// TOML serializes to the same JSON text.
#[derive(Debug, Clone, PartialEq, Default)]
#[non_exhaustive]
pub enum Value {
	#[default]
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	Sequence(Vec<Value>),
	Mapping(BTreeMap<String, Value>),
}

/// A number which keeps the precision of the source format.
#[derive(Debug, Clone, Copy)]
pub enum Number {
	Int(i64),
	UInt(u64),
	Float(f64),
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::UInt(a), Self::UInt(b)) => a == b,
			(Self::Int(a), Self::UInt(b)) | (Self::UInt(b), Self::Int(a)) => {
				u64::try_from(*a).is_ok_and(|a| a == *b)
			}
			_ => float_cmp::approx_eq!(f64, self.as_f64(), other.as_f64()),
		}
	}
}

impl Number {
	pub fn as_f64(&self) -> f64 {
		match self {
			Self::Int(i) => *i as f64,
			Self::UInt(u) => *u as f64,
			Self::Float(f) => *f,
		}
	}

	/// Returns the value as an `i64` when it is integral and in range.
	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int(i) => Some(*i),
			Self::UInt(u) => i64::try_from(*u).ok(),
			Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
			Self::Float(_) => None,
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(i) => write!(f, "{i}"),
			Self::UInt(u) => write!(f, "{u}"),
			Self::Float(v) => write!(f, "{v}"),
		}
	}
}

impl Serialize for Number {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Int(i) => serializer.serialize_i64(*i),
			Self::UInt(u) => serializer.serialize_u64(*u),
			Self::Float(f) => serializer.serialize_f64(*f),
		}
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Self::Null => serializer.serialize_unit(),
			Self::Bool(b) => serializer.serialize_bool(*b),
			Self::Number(n) => n.serialize(serializer),
			Self::String(s) => serializer.serialize_str(s),
			Self::Sequence(items) => serializer.collect_seq(items),
			Self::Mapping(map) => serializer.collect_map(map),
		}
	}
}

impl Value {
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_sequence(&self) -> Option<&[Value]> {
		match self {
			Self::Sequence(items) => Some(items),
			_ => None,
		}
	}

	pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
		match self {
			Self::Mapping(map) => Some(map),
			_ => None,
		}
	}

	/// Look up `key` when this value is a mapping.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.as_mapping().and_then(|map| map.get(key))
	}

	/// Serialize to compact JSON with sorted keys.
	pub fn to_canonical_json(&self) -> TransformResult<String> {
		serde_json::to_string(self).map_err(|e| TransformError::decode("json", e))
	}

	/// Render a scalar the way a template prints it. Sequences and mappings
	/// render as canonical JSON.
	pub fn to_text(&self) -> String {
		match self {
			Self::Null => String::new(),
			Self::Bool(b) => b.to_string(),
			Self::Number(n) => n.to_string(),
			Self::String(s) => s.clone(),
			Self::Sequence(_) | Self::Mapping(_) => self.to_canonical_json().unwrap_or_default(),
		}
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_text())
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Number(Number::Int(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Number(Number::Float(value))
	}
}

impl From<Vec<Value>> for Value {
	fn from(value: Vec<Value>) -> Self {
		Self::Sequence(value)
	}
}

impl From<BTreeMap<String, Value>> for Value {
	fn from(value: BTreeMap<String, Value>) -> Self {
		Self::Mapping(value)
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self::Mapping(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

/// Convert a `serde_json::Value`.
impl From<serde_json::Value> for Value {
	fn from(json: serde_json::Value) -> Self {
		match json {
			serde_json::Value::Null => Self::Null,
			serde_json::Value::Bool(b) => Self::Bool(b),
			serde_json::Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					Self::Number(Number::Int(i))
				} else if let Some(u) = n.as_u64() {
					Self::Number(Number::UInt(u))
				} else if let Some(f) = n.as_f64() {
					Self::Number(Number::Float(f))
				} else {
					Self::String(n.to_string())
				}
			}
			serde_json::Value::String(s) => Self::String(s),
			serde_json::Value::Array(items) => {
				Self::Sequence(items.into_iter().map(Self::from).collect())
			}
			serde_json::Value::Object(map) => {
				Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
			}
		}
	}
}

/// Convert a `toml::Value`. Datetimes become their RFC 3339 string.
impl From<toml::Value> for Value {
	fn from(value: toml::Value) -> Self {
		match value {
			toml::Value::String(s) => Self::String(s),
			toml::Value::Integer(i) => Self::Number(Number::Int(i)),
			toml::Value::Float(f) => Self::Number(Number::Float(f)),
			toml::Value::Boolean(b) => Self::Bool(b),
			toml::Value::Datetime(dt) => Self::String(dt.to_string()),
			toml::Value::Array(items) => {
				Self::Sequence(items.into_iter().map(Self::from).collect())
			}
			toml::Value::Table(table) => Self::from(table),
		}
	}
}

impl From<toml::Table> for Value {
	fn from(table: toml::Table) -> Self {
		Self::Mapping(
			table
				.into_iter()
				.map(|(k, v)| (k, Self::from(v)))
				.collect(),
		)
	}
}

/// Convert a `serde_yaml_ng::Value`. Non-string mapping keys are rendered to
/// their text form and tags are dropped.
impl From<serde_yaml_ng::Value> for Value {
	fn from(yaml: serde_yaml_ng::Value) -> Self {
		use serde_yaml_ng::Value as YamlValue;

		match yaml {
			YamlValue::Null => Self::Null,
			YamlValue::Bool(b) => Self::Bool(b),
			YamlValue::Number(n) => {
				if let Some(i) = n.as_i64() {
					Self::Number(Number::Int(i))
				} else if let Some(u) = n.as_u64() {
					Self::Number(Number::UInt(u))
				} else if let Some(f) = n.as_f64() {
					Self::Number(Number::Float(f))
				} else {
					Self::String(n.to_string())
				}
			}
			YamlValue::String(s) => Self::String(s),
			YamlValue::Sequence(items) => {
				Self::Sequence(items.into_iter().map(Self::from).collect())
			}
			YamlValue::Mapping(mapping) => {
				Self::Mapping(
					mapping
						.into_iter()
						.map(|(k, v)| {
							let key = match k {
								YamlValue::String(s) => s,
								other => Self::from(other).to_text(),
							};
							(key, Self::from(v))
						})
						.collect(),
				)
			}
			YamlValue::Tagged(tagged) => Self::from(tagged.value),
		}
	}
}
