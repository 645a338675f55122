//! Strongly typed charge identifiers that are safe to embed in request paths.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const REQUEST_CODE_MAX_LEN: usize = 64;
const RESERVED: [char; 4] = ['/', '?', '#', '%'];

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("Request code cannot be empty.")]
	Empty,
	/// The identifier contains whitespace characters.
	#[error("Request code contains whitespace.")]
	ContainsWhitespace,
	/// The identifier contains a character with meaning inside a URL path.
	#[error("Request code contains the reserved character `{character}`.")]
	ContainsReserved {
		/// Offending character.
		character: char,
	},
	/// The identifier exceeded the allowed character count.
	#[error("Request code exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Provider-assigned charge identifier (`codigoSolicitacao`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestCode(String);
impl RequestCode {
	/// Creates a new identifier after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}

	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Deref for RequestCode {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for RequestCode {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for RequestCode {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<RequestCode> for String {
	fn from(value: RequestCode) -> Self {
		value.0
	}
}
impl TryFrom<String> for RequestCode {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for RequestCode {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for RequestCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "RequestCode({})", self.0)
	}
}
impl Display for RequestCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace);
	}
	if let Some(character) = view.chars().find(|c| RESERVED.contains(c)) {
		return Err(IdentifierError::ContainsReserved { character });
	}
	if view.chars().count() > REQUEST_CODE_MAX_LEN {
		return Err(IdentifierError::TooLong { max: REQUEST_CODE_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_codes_reject_path_breaking_input() {
		assert_eq!(RequestCode::new(""), Err(IdentifierError::Empty));
		assert_eq!(RequestCode::new(" abc"), Err(IdentifierError::ContainsWhitespace));
		assert_eq!(
			RequestCode::new("abc/../pdf"),
			Err(IdentifierError::ContainsReserved { character: '/' })
		);
		assert_eq!(
			RequestCode::new("a".repeat(REQUEST_CODE_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { max: REQUEST_CODE_MAX_LEN })
		);

		let code = RequestCode::new("5b7a7f0c-0f6e-4b4e-9a4c-8f1c6f0e7d21")
			.expect("UUID-shaped request codes should be accepted.");

		assert_eq!(code.as_str(), "5b7a7f0c-0f6e-4b4e-9a4c-8f1c6f0e7d21");
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let code: RequestCode =
			serde_json::from_str("\"abc-123\"").expect("Request code should deserialize.");

		assert_eq!(code.as_ref(), "abc-123");
		assert_eq!(serde_json::to_string(&code).expect("Request code should serialize."), "\"abc-123\"");
		assert!(serde_json::from_str::<RequestCode>("\"has space\"").is_err());
		assert!(serde_json::from_str::<RequestCode>("\"\"").is_err());
	}
}
