use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Message returned when a caller reads `.Err` off a rendered value instead
/// of wrapping the call in `try`.
pub const TRY_MIGRATION_HINT: &str = "wrap the call in `try` and read `.Err` and `.Value` from the \
                                      returned wrapper";

/// The broad class of a [`TransformError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
	/// A bad or unrecognized option value.
	InvalidOption,
	/// No decoder could be selected for the input.
	UnsupportedFormat,
	/// The input could not be decoded into a usable value.
	MalformedInput,
	/// The math engine reported an unrecoverable error.
	RenderFailure,
	/// A recoverable condition promoted to a failure by the strictness policy.
	Diagnostic,
}

/// A position inside the math source, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
	/// 0-indexed character offset into the input.
	pub offset: usize,
	/// 1-indexed line number.
	pub line: usize,
	/// 1-indexed column number.
	pub column: usize,
}

impl SourcePosition {
	/// Compute line and column for the character `offset` in `input`.
	pub fn from_offset(input: &str, offset: usize) -> Self {
		let mut line = 1;
		let mut column = 1;

		for ch in input.chars().take(offset) {
			if ch == '\n' {
				line += 1;
				column = 1;
			} else {
				column += 1;
			}
		}

		Self {
			offset,
			line,
			column,
		}
	}
}

/// The location of the template call that invoked a transform function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
	pub filename: String,
	pub line: usize,
	pub column: usize,
}

impl CallSite {
	pub fn new(filename: impl Into<String>, line: usize, column: usize) -> Self {
		Self {
			filename: filename.into(),
			line,
			column,
		}
	}
}

impl fmt::Display for CallSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.filename, self.line, self.column)
	}
}

#[derive(Debug, Clone, Diagnostic, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransformError {
	#[error("{message}")]
	#[diagnostic(code(tpl_transform::invalid_option))]
	InvalidOption { key: String, message: String },

	#[error("unsupported format: `{0}`")]
	#[diagnostic(
		code(tpl_transform::unsupported_format),
		help("supported formats: csv, json, toml, yaml, yml")
	)]
	UnsupportedFormat(String),

	#[error("unable to determine the format of the input")]
	#[diagnostic(
		code(tpl_transform::undetermined_format),
		help("set the `format` option, csv input is never detected from content")
	)]
	UndeterminedFormat,

	#[error("expected at least a header row and one data row")]
	#[diagnostic(
		code(tpl_transform::empty_or_header_only),
		help("`targetType` map needs a header row followed by data rows")
	)]
	EmptyOrHeaderOnly,

	#[error("header row contains duplicate field names: `{field}`")]
	#[diagnostic(code(tpl_transform::duplicate_header))]
	DuplicateHeader { field: String },

	#[error("parse error on line {line}, column {column}: {reason}")]
	#[diagnostic(
		code(tpl_transform::csv_parse),
		help("set `lazyQuotes` to tolerate stray quotes")
	)]
	CsvParse {
		line: usize,
		column: usize,
		reason: String,
	},

	#[error("failed to decode {format}: {reason}")]
	#[diagnostic(code(tpl_transform::decode))]
	Decode { format: String, reason: String },

	#[error("invalid portable text: {0}")]
	#[diagnostic(code(tpl_transform::portable_text))]
	PortableText(String),

	#[error("{message}")]
	#[diagnostic(code(tpl_transform::render_failure))]
	RenderFailure {
		message: String,
		position: Option<SourcePosition>,
	},

	#[error("LaTeX-incompatible input and strict mode is set to 'error': {message} [{code}]")]
	#[diagnostic(
		code(tpl_transform::strict),
		help("set `strict` to `warn` or `ignore` to accept this input")
	)]
	Diagnostic { code: String, message: String },

	#[error(
		"the return type of {function} was changed and the error handling replaced with a new try \
		 keyword: {hint}",
		hint = TRY_MIGRATION_HINT
	)]
	#[diagnostic(code(tpl_transform::calling_convention))]
	CallingConventionChanged { function: String },

	#[error("{call_site}: {source}")]
	#[diagnostic(code(tpl_transform::located))]
	Located {
		call_site: CallSite,
		source: Box<TransformError>,
	},
}

impl TransformError {
	pub(crate) fn invalid_option(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidOption {
			key: key.into(),
			message: message.into(),
		}
	}

	pub(crate) fn decode(format: impl fmt::Display, reason: impl fmt::Display) -> Self {
		Self::Decode {
			format: format.to_string(),
			reason: reason.to_string(),
		}
	}

	/// Attach the template location of the failing call.
	#[must_use]
	pub fn at(self, call_site: CallSite) -> Self {
		Self::Located {
			call_site,
			source: Box::new(self),
		}
	}

	/// The class of this error, looking through [`TransformError::Located`].
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::InvalidOption { .. } | Self::CallingConventionChanged { .. } => {
				ErrorKind::InvalidOption
			}
			Self::UnsupportedFormat(_) | Self::UndeterminedFormat => ErrorKind::UnsupportedFormat,
			Self::EmptyOrHeaderOnly
			| Self::DuplicateHeader { .. }
			| Self::CsvParse { .. }
			| Self::Decode { .. }
			| Self::PortableText(_) => ErrorKind::MalformedInput,
			Self::RenderFailure { .. } => ErrorKind::RenderFailure,
			Self::Diagnostic { .. } => ErrorKind::Diagnostic,
			Self::Located { source, .. } => source.kind(),
		}
	}

	/// The engine-reported position inside the math source, if any.
	pub fn source_position(&self) -> Option<SourcePosition> {
		match self {
			Self::RenderFailure { position, .. } => *position,
			Self::Located { source, .. } => source.source_position(),
			_ => None,
		}
	}
}

pub type TransformResult<T> = Result<T, TransformError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
