//! Math markup to MathML.
//!
//! [`MathRenderer`] decodes the options bag into [`MathOptions`], hands the
//! expression to a [`MathEngine`], and applies the strictness policy to the
//! diagnostics the engine reports.

use std::collections::BTreeMap;

use derive_more::Deref;
use derive_more::Display;
use serde::Serialize;

use crate::Attempt;
use crate::CallSite;
use crate::FromOptions;
use crate::OptionSchema;
use crate::OptionsBag;
use crate::SourcePosition;
use crate::TransformError;
use crate::TransformResult;
use crate::Value;
use crate::strict;
use crate::strict::StrictMode;
use crate::strict::StrictPolicy;

pub mod engine;
pub mod katex;

pub use self::engine::EngineError;
pub use self::engine::EngineOutput;
pub use self::engine::EngineSettings;
pub use self::engine::MathEngine;
pub use self::katex::KatexEngine;

/// The template-facing name of the function, used in error messages.
pub const FUNCTION_NAME: &str = "transform.ToMath";

/// The output format of the engine. Only MathML is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathOutput {
	#[default]
	MathMl,
}

/// Options accepted by [`MathRenderer::to_math`].
#[derive(Debug, Clone, PartialEq)]
pub struct MathOptions {
	pub display_mode: bool,
	pub throw_on_error: bool,
	pub error_color: String,
	/// Macro definitions keyed by name with a leading backslash.
	pub macros: BTreeMap<String, String>,
	pub strict: StrictPolicy,
	pub output: MathOutput,
	pub leqno: bool,
	pub fleqn: bool,
	pub max_expand: usize,
	pub min_rule_thickness: f64,
}

impl Default for MathOptions {
	fn default() -> Self {
		Self {
			display_mode: false,
			throw_on_error: true,
			error_color: "#cc0000".to_string(),
			macros: BTreeMap::new(),
			strict: StrictPolicy::default(),
			output: MathOutput::MathMl,
			leqno: false,
			fleqn: false,
			max_expand: 1000,
			min_rule_thickness: 0.04,
		}
	}
}

impl OptionSchema for MathOptions {
	const KEYS: &'static [&'static str] = &[
		"displayMode",
		"throwOnError",
		"errorColor",
		"macros",
		"strict",
		"output",
		"leqno",
		"fleqn",
		"maxExpand",
		"minRuleThickness",
	];
}

impl FromOptions for MathOptions {
	fn from_bag(bag: &OptionsBag) -> TransformResult<Self> {
		let defaults = Self::default();

		let strict = match bag.get("strict") {
			None => defaults.strict,
			Some(Value::Bool(true)) => StrictMode::Error.into(),
			Some(Value::Bool(false)) => StrictMode::Ignore.into(),
			Some(Value::Mapping(_)) => {
				StrictPolicy::from_codes(bag.get_string_map("strict")?.unwrap_or_default())?
			}
			Some(_) => {
				bag.get_string("strict")?
					.unwrap_or_default()
					.parse::<StrictMode>()?
					.into()
			}
		};

		let output = match bag.get_string("output")?.as_deref() {
			None | Some("" | "mathml") => MathOutput::MathMl,
			Some(other) => {
				return Err(TransformError::invalid_option(
					"output",
					format!("invalid output: expected mathml, received {other}"),
				));
			}
		};

		let min_rule_thickness = bag
			.get_f64("minRuleThickness")?
			.unwrap_or(defaults.min_rule_thickness);
		if min_rule_thickness < 0.0 || !min_rule_thickness.is_finite() {
			return Err(TransformError::invalid_option(
				"minRuleThickness",
				format!(
					"invalid minRuleThickness: expected a non-negative number, received \
					 {min_rule_thickness}"
				),
			));
		}

		let macros = bag
			.get_string_map("macros")?
			.unwrap_or_default()
			.into_iter()
			.map(|(name, body)| Ok((macro_name(&name)?, body)))
			.collect::<TransformResult<_>>()?;

		Ok(Self {
			display_mode: bag.get_bool("displayMode")?.unwrap_or(defaults.display_mode),
			throw_on_error: bag
				.get_bool("throwOnError")?
				.unwrap_or(defaults.throw_on_error),
			error_color: bag
				.get_string("errorColor")?
				.unwrap_or(defaults.error_color),
			macros,
			strict,
			output,
			leqno: bag.get_bool("leqno")?.unwrap_or(defaults.leqno),
			fleqn: bag.get_bool("fleqn")?.unwrap_or(defaults.fleqn),
			max_expand: bag.get_usize("maxExpand")?.unwrap_or(defaults.max_expand),
			min_rule_thickness,
		})
	}
}

/// Rendered markup, safe to embed in HTML as-is.
///
/// Derefs to `str`, so it can be used anywhere a string is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref, Display, Serialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
	pub fn new(markup: impl Into<String>) -> Self {
		Self(markup.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	/// Resolve a field access on the rendered value.
	///
	/// Rendered markup has no fields. `Err` is singled out because it was
	/// readable on the older return type: reading it now fails with a
	/// message pointing at `try`.
	pub fn field(&self, name: &str) -> TransformResult<Value> {
		if name == "Err" {
			return Err(TransformError::CallingConventionChanged {
				function: FUNCTION_NAME.to_string(),
			});
		}

		Ok(Value::Null)
	}
}

impl From<Markup> for String {
	fn from(markup: Markup) -> Self {
		markup.0
	}
}

impl AsRef<str> for Markup {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Renders math expressions through a [`MathEngine`].
pub struct MathRenderer {
	engine: Box<dyn MathEngine>,
}

impl Default for MathRenderer {
	fn default() -> Self {
		Self::new(KatexEngine::new())
	}
}

impl std::fmt::Debug for MathRenderer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MathRenderer").finish_non_exhaustive()
	}
}

impl MathRenderer {
	pub fn new(engine: impl MathEngine + 'static) -> Self {
		Self {
			engine: Box::new(engine),
		}
	}

	/// Render `source` to markup.
	///
	/// Options are validated before the engine runs. An engine error fails
	/// the call when `throwOnError` is set; otherwise the engine renders the
	/// error inline. A diagnostic that `strict` turns into a failure is an
	/// engine error like any other, so it is rendered inline too.
	pub fn to_math(&self, source: &str, options: &OptionsBag) -> TransformResult<Markup> {
		let options = MathOptions::decode(options)?;
		let settings = EngineSettings {
			display_mode: options.display_mode,
			throw_on_error: options.throw_on_error,
			error_color: options.error_color,
			macros: options.macros,
			strict: options.strict,
			max_expand: options.max_expand,
			min_rule_thickness: options.min_rule_thickness,
			leqno: options.leqno,
			fleqn: options.fleqn,
		};

		let output = self.engine.render(source, &settings).map_err(|error| {
			match error.diagnostic {
				Some(diagnostic) => TransformError::from(diagnostic),
				None => {
					TransformError::RenderFailure {
						position: error
							.offset
							.map(|offset| SourcePosition::from_offset(source, offset)),
						message: error.message,
					}
				}
			}
		})?;

		strict::apply(&output.diagnostics, &settings.strict)?;
		tracing::trace!(len = output.markup.len(), "rendered math");

		Ok(Markup(output.markup))
	}

	/// Like [`MathRenderer::to_math`], with errors prefixed by the template
	/// location of the call.
	pub fn to_math_at(
		&self,
		source: &str,
		options: &OptionsBag,
		call_site: &CallSite,
	) -> TransformResult<Markup> {
		self.to_math(source, options)
			.map_err(|error| error.at(call_site.clone()))
	}

	/// Render and capture the outcome instead of failing.
	pub fn try_to_math(&self, source: &str, options: &OptionsBag) -> Attempt<Markup> {
		Attempt::from(self.to_math(source, options))
	}
}

/// Add the leading backslash to a macro name when it is missing, and check
/// that what follows is a control word or a single control symbol.
fn macro_name(name: &str) -> TransformResult<String> {
	let bare = name.strip_prefix('\\').unwrap_or(name);
	let control_word =
		!bare.is_empty() && bare.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '@');
	let control_symbol = bare.chars().count() == 1;

	if control_word || control_symbol {
		Ok(format!("\\{bare}"))
	} else {
		Err(TransformError::invalid_option(
			"macros",
			format!("invalid macros: `{name}` is not a control sequence name"),
		))
	}
}
