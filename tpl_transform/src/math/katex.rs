//! [`MathEngine`] over `katex-rs`, a Rust port of KaTeX.
//!
//! Output is always MathML wrapped in KaTeX's `<span class="katex">`. Strict
//! checks go through a strict callback, so the configured [`StrictPolicy`]
//! decides each diagnostic as KaTeX raises it: failures become KaTeX parse
//! errors and are thrown or rendered inline like any other error, everything
//! else is collected and returned to the caller.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use katex::KatexContext;
use katex::OutputFormat;
use katex::ParseError;
use katex::StrictFunction;
use katex::StrictReturn;
use katex::StrictSetting;
use katex::macro_expander::MacroMap;
use katex::macros::MacroDefinition;
use katex::types::ErrorLocationProvider;
use katex::types::ParseErrorKind;
use katex::types::Settings;

use crate::math::engine::EngineError;
use crate::math::engine::EngineOutput;
use crate::math::engine::EngineSettings;
use crate::math::engine::MathEngine;
use crate::strict;
use crate::strict::Diagnostic;
use crate::strict::Disposition;
use crate::strict::StrictPolicy;

/// The default engine. Holds one KaTeX function and symbol registry.
pub struct KatexEngine {
	context: KatexContext,
}

impl KatexEngine {
	pub fn new() -> Self {
		Self {
			context: KatexContext::default(),
		}
	}
}

impl Default for KatexEngine {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for KatexEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("KatexEngine").finish_non_exhaustive()
	}
}

impl MathEngine for KatexEngine {
	fn render(
		&self,
		expression: &str,
		settings: &EngineSettings,
	) -> Result<EngineOutput, EngineError> {
		let raised = Arc::new(Mutex::new(Vec::new()));
		let katex_settings = Settings::builder()
			.display_mode(settings.display_mode)
			.output(OutputFormat::Mathml)
			.leqno(settings.leqno)
			.fleqn(settings.fleqn)
			.throw_on_error(settings.throw_on_error)
			.error_color(settings.error_color.clone())
			.macros(macro_map(settings))
			.min_rule_thickness(settings.min_rule_thickness)
			.strict(strict_callback(
				settings.strict.clone(),
				Arc::clone(&raised),
			))
			.max_expand(settings.max_expand)
			.build();

		let markup = katex::render_to_string(&self.context, expression, &katex_settings)
			.map_err(|error| engine_error(expression, &error))?;

		let diagnostics = raised
			.lock()
			.map(|mut raised| std::mem::take(&mut *raised))
			.unwrap_or_default();

		Ok(EngineOutput {
			markup,
			diagnostics,
		})
	}
}

fn macro_map(settings: &EngineSettings) -> MacroMap {
	let mut macros = MacroMap::default();

	for (name, body) in &settings.macros {
		macros.insert(name.clone(), MacroDefinition::String(body.clone()));
	}

	macros
}

/// Resolve each strict check against `policy` as KaTeX reports it.
///
/// Failing diagnostics are handed back as KaTeX's `error` mode. The rest are
/// pushed to `raised` and ignored by KaTeX, so it never prints them itself.
fn strict_callback(policy: StrictPolicy, raised: Arc<Mutex<Vec<Diagnostic>>>) -> StrictSetting {
	let callback: Arc<StrictFunction> = Arc::new(
		move |code: &str, message: &str, _location: Option<&dyn ErrorLocationProvider>| {
			let diagnostic = Diagnostic::new(code, message);

			let mode = match strict::resolve(&diagnostic, &policy) {
				Disposition::Fail => katex::StrictMode::Error,
				Disposition::Warn | Disposition::Ignore => {
					if let Ok(mut raised) = raised.lock() {
						raised.push(diagnostic);
					}

					katex::StrictMode::Ignore
				}
			};

			Some(StrictReturn::Mode(mode))
		},
	);

	StrictSetting::Function(callback)
}

fn engine_error(expression: &str, error: &ParseError) -> EngineError {
	let diagnostic = match error.kind.as_ref() {
		ParseErrorKind::StrictModeError { message, code } => {
			Some(Diagnostic::new(code.as_str(), message.as_str()))
		}
		_ => None,
	};

	EngineError {
		message: error.to_string(),
		offset: error.position().map(|byte| char_offset(expression, byte)),
		diagnostic,
	}
}

/// KaTeX reports byte positions.
fn char_offset(input: &str, byte: usize) -> usize {
	input
		.get(..byte)
		.map_or(byte, |prefix| prefix.chars().count())
}
