use crate::TransformError;
use crate::TransformResult;
use crate::Value;

pub fn decode_json(content: &str) -> TransformResult<Value> {
	let json: serde_json::Value =
		serde_json::from_str(content).map_err(|e| TransformError::decode("json", e))?;

	Ok(Value::from(json))
}

/// Decode a TOML document. The root is always a table.
pub fn decode_toml(content: &str) -> TransformResult<Value> {
	let table: toml::Table =
		toml::from_str(content).map_err(|e| TransformError::decode("toml", e))?;

	Ok(Value::from(table))
}

/// Decode a single YAML document. Indentation of the root mapping is
/// preserved as structure, so `"\n  a:\n    b: 1\n"` yields `{"a":{"b":1}}`.
pub fn decode_yaml(content: &str) -> TransformResult<Value> {
	let yaml: serde_yaml_ng::Value =
		serde_yaml_ng::from_str(content).map_err(|e| TransformError::decode("yaml", e))?;

	Ok(Value::from(yaml))
}
