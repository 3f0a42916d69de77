//! The `transform` functions as [`minijinja`] filters and functions.
//!
//! [`register`] installs:
//!
//! - `unmarshal(input, options=none)`: a filter and a function. `input` is a
//!   string or a resource created with [`resource_value`].
//! - `to_math(source, options=none)`: returns the rendered [`Markup`] as an
//!   object. It prints unescaped, and reading `.Err` off it fails the render
//!   with a message pointing at `try`.
//! - `portable_text(value)`: a filter and a function.
//! - `jsonify(value)`: canonical JSON with sorted keys.
//! - `try(callable, *args)`: calls `callable` and returns a map with `Err`
//!   (the error message or none) and `Value` (the result or none).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use minijinja::Environment;
use minijinja::Error;
use minijinja::ErrorKind;
use minijinja::State;
use minijinja::value::Object;
use minijinja::value::ObjectRepr;
use minijinja::value::Rest;

use crate::Markup;
use crate::MathRenderer;
use crate::OptionsBag;
use crate::Resource;
use crate::TransformError;
use crate::Value;
use crate::portable_text;
use crate::unmarshal::unmarshal;

impl Object for Resource {
	fn get_value(self: &Arc<Self>, key: &minijinja::Value) -> Option<minijinja::Value> {
		let value = match key.as_str()? {
			"name" | "Name" => self.name.clone(),
			"mediaType" | "MediaType" => self.media_type.clone()?,
			"content" | "Content" => self.content.clone(),
			_ => return None,
		};

		Some(minijinja::Value::from(value))
	}
}

impl Object for Markup {
	fn repr(self: &Arc<Self>) -> ObjectRepr {
		ObjectRepr::Plain
	}

	fn get_value(self: &Arc<Self>, key: &minijinja::Value) -> Option<minijinja::Value> {
		match self.field(key.as_str()?) {
			Ok(_) => None,
			Err(error) => Some(minijinja::Value::from(template_error("to_math", error))),
		}
	}

	fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Wrap a resource for use as a template value.
pub fn resource_value(resource: Resource) -> minijinja::Value {
	minijinja::Value::from_object(resource)
}

/// Install the transform functions into `env`.
pub fn register(env: &mut Environment<'_>, math: Arc<MathRenderer>) {
	env.add_filter("unmarshal", unmarshal_template_value);
	env.add_function("unmarshal", unmarshal_template_value);
	env.add_filter("portable_text", portable_text_template_value);
	env.add_function("portable_text", portable_text_template_value);
	env.add_filter("jsonify", jsonify);
	env.add_function("try", try_call);
	env.add_function(
		"to_math",
		move |source: String, options: Option<minijinja::Value>| -> Result<minijinja::Value, Error> {
			let options = options_bag(options)?;
			let markup = math
				.to_math(&source, &options)
				.map_err(|e| template_error("to_math", e))?;

			Ok(minijinja::Value::from_object(markup))
		},
	);
	env.set_formatter(|out, state, value| {
		if let Some(markup) = value.downcast_object_ref::<Markup>() {
			return out.write_str(markup.as_str()).map_err(Error::from);
		}

		minijinja::escape_formatter(out, state, value)
	});
}

fn unmarshal_template_value(
	input: minijinja::Value,
	options: Option<minijinja::Value>,
) -> Result<minijinja::Value, Error> {
	let options = options_bag(options)?;

	let result = if let Some(resource) = input.downcast_object_ref::<Resource>() {
		unmarshal(&options, resource)
	} else if let Some(text) = input.as_str() {
		unmarshal(&options, text)
	} else if let Some(bytes) = input.as_bytes() {
		let text = std::str::from_utf8(bytes).map_err(|e| {
			Error::new(
				ErrorKind::InvalidOperation,
				format!("error calling unmarshal: {e}"),
			)
		})?;
		unmarshal(&options, text)
	} else {
		return Err(Error::new(
			ErrorKind::InvalidOperation,
			format!("error calling unmarshal: type {} not supported", input.kind()),
		));
	};

	result
		.map(|value| minijinja::Value::from_serialize(&value))
		.map_err(|e| template_error("unmarshal", e))
}

fn portable_text_template_value(value: minijinja::Value) -> Result<String, Error> {
	let value = to_value(&value)?;
	portable_text::to_markdown(&value).map_err(|e| template_error("portable_text", e))
}

fn jsonify(value: minijinja::Value) -> Result<minijinja::Value, Error> {
	let json = to_value(&value)?
		.to_canonical_json()
		.map_err(|e| template_error("jsonify", e))?;

	Ok(minijinja::Value::from_safe_string(json))
}

fn try_call(
	state: &State<'_, '_>,
	callable: minijinja::Value,
	args: Rest<minijinja::Value>,
) -> Result<minijinja::Value, Error> {
	let (value, err) = match callable.call(state, &args) {
		Ok(value) => (value, minijinja::Value::from(())),
		Err(error) => {
			tracing::debug!(%error, "captured error in try");
			(minijinja::Value::from(()), minijinja::Value::from(error.to_string()))
		}
	};

	let mut attempt = BTreeMap::new();
	attempt.insert("Err", err);
	attempt.insert("Value", value);

	Ok(minijinja::Value::from(attempt))
}

fn to_value(value: &minijinja::Value) -> Result<Value, Error> {
	serde_json::to_value(value).map(Value::from).map_err(|e| {
		Error::new(
			ErrorKind::InvalidOperation,
			format!("cannot convert template value: {e}"),
		)
	})
}

fn options_bag(options: Option<minijinja::Value>) -> Result<OptionsBag, Error> {
	let Some(options) = options else {
		return Ok(OptionsBag::new());
	};

	OptionsBag::from_value(&to_value(&options)?).map_err(|e| template_error("options", e))
}

fn template_error(function: &str, error: TransformError) -> Error {
	Error::new(
		ErrorKind::InvalidOperation,
		format!("error calling {function}: {error}"),
	)
	.with_source(error)
}
