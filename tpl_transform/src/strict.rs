//! The strictness policy shared by the decoders and the math adapter.
//!
//! A [`Diagnostic`] is a recoverable condition identified by a short code.
//! [`resolve`] maps it and the configured [`StrictPolicy`] to a
//! [`Disposition`], and [`apply`] acts on that disposition.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::TransformError;
use crate::TransformResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrictMode {
	/// Promote diagnostics to failures.
	#[default]
	Error,
	/// Log diagnostics and continue.
	Warn,
	/// Drop diagnostics silently.
	Ignore,
}

impl StrictMode {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Error => "error",
			Self::Warn => "warn",
			Self::Ignore => "ignore",
		}
	}
}

impl fmt::Display for StrictMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for StrictMode {
	type Err = TransformError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"default" | "error" | "true" => Ok(Self::Error),
			"warn" => Ok(Self::Warn),
			"ignore" | "false" => Ok(Self::Ignore),
			other => {
				Err(TransformError::invalid_option(
					"strict",
					format!("invalid strict mode: expected one of error, ignore, or warn; received {other}"),
				))
			}
		}
	}
}

/// The configured strict mode, optionally refined per diagnostic code.
///
/// Decoded from a `strict` option that is either a mode, or a map of
/// diagnostic codes to modes where the `default` key sets the fallback:
/// `{"default": "error", "commentAtEnd": "ignore"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StrictPolicy {
	pub mode: StrictMode,
	/// Modes keyed by diagnostic code.
	pub codes: BTreeMap<String, StrictMode>,
}

impl StrictPolicy {
	/// Build a policy from a map of codes to modes.
	pub fn from_codes<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> TransformResult<Self>
	where
		K: Into<String>,
		V: AsRef<str>,
	{
		let mut policy = Self::default();

		for (code, mode) in entries {
			let code = code.into();
			let mode = mode.as_ref().parse::<StrictMode>()?;

			if code == "default" {
				policy.mode = mode;
			} else {
				policy.codes.insert(code, mode);
			}
		}

		Ok(policy)
	}

	/// The mode that applies to diagnostics with `code`.
	pub fn mode_for(&self, code: &str) -> StrictMode {
		self.codes.get(code).copied().unwrap_or(self.mode)
	}
}

impl From<StrictMode> for StrictPolicy {
	fn from(mode: StrictMode) -> Self {
		Self {
			mode,
			codes: BTreeMap::new(),
		}
	}
}

/// What to do with a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
	Ignore,
	Warn,
	Fail,
}

/// A condition that is not necessarily fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
	/// Rule identifier, e.g. `commentAtEnd`.
	pub code: String,
	pub message: String,
}

impl Diagnostic {
	pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			code: code.into(),
			message: message.into(),
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} [{}]", self.message, self.code)
	}
}

impl From<Diagnostic> for TransformError {
	fn from(diagnostic: Diagnostic) -> Self {
		Self::Diagnostic {
			code: diagnostic.code,
			message: diagnostic.message,
		}
	}
}

/// Decide what happens to `diagnostic` under `policy`.
pub fn resolve(diagnostic: &Diagnostic, policy: &StrictPolicy) -> Disposition {
	match policy.mode_for(&diagnostic.code) {
		StrictMode::Error => Disposition::Fail,
		StrictMode::Warn => Disposition::Warn,
		StrictMode::Ignore => Disposition::Ignore,
	}
}

/// Resolve every diagnostic in order. The first one resolving to
/// [`Disposition::Fail`] aborts; warnings are logged.
pub fn apply(diagnostics: &[Diagnostic], policy: &StrictPolicy) -> TransformResult<()> {
	for diagnostic in diagnostics {
		match resolve(diagnostic, policy) {
			Disposition::Ignore => {}
			Disposition::Warn => warn(diagnostic),
			Disposition::Fail => return Err(diagnostic.clone().into()),
		}
	}

	Ok(())
}

pub(crate) fn warn(diagnostic: &Diagnostic) {
	tracing::warn!(
		code = %diagnostic.code,
		"LaTeX-incompatible input and strict mode is set to 'warn': {diagnostic}"
	);
}
