use crate::TransformError;
use crate::TransformResult;

/// The outcome of a call wrapped in `try`: either a value or the error it
/// failed with, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt<T>(TransformResult<T>);

impl<T> Attempt<T> {
	/// The error, if the call failed.
	pub fn err(&self) -> Option<&TransformError> {
		self.0.as_ref().err()
	}

	/// The value, if the call succeeded.
	pub fn value(&self) -> Option<&T> {
		self.0.as_ref().ok()
	}

	pub fn is_ok(&self) -> bool {
		self.0.is_ok()
	}

	pub fn into_result(self) -> TransformResult<T> {
		self.0
	}
}

impl<T> From<TransformResult<T>> for Attempt<T> {
	fn from(result: TransformResult<T>) -> Self {
		Self(result)
	}
}
