use std::collections::BTreeMap;

use crate::strict::Diagnostic;
use crate::strict::StrictPolicy;

/// Settings in the form the engine consumes them.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
	pub display_mode: bool,
	pub throw_on_error: bool,
	pub error_color: String,
	/// Macro definitions keyed by name with a leading backslash.
	pub macros: BTreeMap<String, String>,
	pub strict: StrictPolicy,
	pub max_expand: usize,
	pub min_rule_thickness: f64,
	pub leqno: bool,
	pub fleqn: bool,
}

/// A successful layout, plus any advisory diagnostics the engine raised.
///
/// The caller resolves these against the strict policy, so an engine may
/// report diagnostics it did not resolve itself.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
	pub markup: String,
	pub diagnostics: Vec<Diagnostic>,
}

/// An unrecoverable layout error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
	/// Full human readable text, including any source excerpt.
	pub message: String,
	/// 0-indexed character offset of the offending token.
	pub offset: Option<usize>,
	/// Set when the strict policy turned a diagnostic into this error.
	pub diagnostic: Option<Diagnostic>,
}

/// The seam to the equation layout engine.
///
/// Implementations must be safe to call from many threads at once.
pub trait MathEngine: Send + Sync {
	fn render(&self, expression: &str, settings: &EngineSettings)
	-> Result<EngineOutput, EngineError>;
}
