//! Permission scope sets and the well-known charge scopes.

// std
use std::{
	cmp::Ordering,
	collections::BTreeSet,
	hash::{Hash, Hasher},
	sync::OnceLock,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Scope required to read charges and their PDFs.
pub const CHARGE_READ: &str = "boleto-cobranca.read";
/// Scope required to issue and cancel charges and to manage webhooks.
pub const CHARGE_WRITE: &str = "boleto-cobranca.write";

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain embedded whitespace characters.
	#[error("Scope contains whitespace: {scope}.")]
	ContainsWhitespace {
		/// The offending scope string.
		scope: String,
	},
}

/// Normalized set of permission scopes.
///
/// Scopes are deduplicated and sorted so equality, subset checks, and hashing stay
/// independent of insertion order. The [`fingerprint`](Self::fingerprint) is a base64
/// (no padding) SHA-256 digest of the normalized string, cached on first use and used
/// to key per-scope-set exchange guards.
#[derive(Default)]
pub struct ScopeSet {
	scopes: Arc<[String]>,
	fingerprint_cache: OnceLock<String>,
}
impl ScopeSet {
	/// Creates a normalized scope set from any iterator.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scopes: normalize(scopes)?, fingerprint_cache: OnceLock::new() })
	}

	/// Scope set holding only [`CHARGE_READ`].
	pub fn charge_read() -> Self {
		Self::from_static(&[CHARGE_READ])
	}

	/// Scope set holding only [`CHARGE_WRITE`].
	pub fn charge_write() -> Self {
		Self::from_static(&[CHARGE_WRITE])
	}

	/// Default scope set requested when a caller asks for no specific scope.
	pub fn charge_default() -> Self {
		Self::from_static(&[CHARGE_READ, CHARGE_WRITE])
	}

	fn from_static(scopes: &[&'static str]) -> Self {
		let mut owned = scopes.iter().map(|s| (*s).to_owned()).collect::<Vec<_>>();

		owned.sort();
		owned.dedup();

		Self { scopes: Arc::from(owned), fingerprint_cache: OnceLock::new() }
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.scopes.len()
	}

	/// Returns true if no scopes are defined.
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty()
	}

	/// Returns true if the normalized set contains the provided scope.
	pub fn contains(&self, scope: &str) -> bool {
		self.scopes.binary_search_by(|candidate| candidate.as_str().cmp(scope)).is_ok()
	}

	/// Returns true when every scope in `self` is also present in `other`.
	///
	/// The empty set is a subset of every set.
	pub fn is_subset_of(&self, other: &ScopeSet) -> bool {
		self.len() <= other.len() && self.iter().all(|scope| other.contains(scope))
	}

	/// Iterator over normalized scopes.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.scopes.iter().map(|s| s.as_str())
	}

	/// Returns the space-delimited representation sent in the `scope` form field.
	pub fn normalized(&self) -> String {
		self.scopes.join(" ")
	}

	/// Stable fingerprint derived from the normalized scope list.
	pub fn fingerprint(&self) -> String {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(&self.scopes)).clone()
	}
}
impl Clone for ScopeSet {
	fn clone(&self) -> Self {
		Self { scopes: self.scopes.clone(), fingerprint_cache: OnceLock::new() }
	}
}
impl PartialEq for ScopeSet {
	fn eq(&self, other: &Self) -> bool {
		self.scopes == other.scopes
	}
}
impl Eq for ScopeSet {}
impl PartialOrd for ScopeSet {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for ScopeSet {
	fn cmp(&self, other: &Self) -> Ordering {
		self.scopes.cmp(&other.scopes)
	}
}
impl Hash for ScopeSet {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.scopes.hash(state);
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeSet").field(&self.scopes).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.normalized())
	}
}
impl FromStr for ScopeSet {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Ok(Self::default());
		}
		if s.chars().all(char::is_whitespace) {
			return Err(ScopeValidationError::Empty);
		}

		Self::new(s.split_whitespace())
	}
}

fn normalize<I, S>(scopes: I) -> Result<Arc<[String]>, ScopeValidationError>
where
	I: IntoIterator<Item = S>,
	S: Into<String>,
{
	let mut set = BTreeSet::new();

	for scope in scopes {
		let owned: String = scope.into();

		if owned.is_empty() {
			return Err(ScopeValidationError::Empty);
		}
		if owned.chars().any(char::is_whitespace) {
			return Err(ScopeValidationError::ContainsWhitespace { scope: owned });
		}

		set.insert(owned);
	}

	Ok(Arc::from(set.into_iter().collect::<Vec<_>>()))
}

fn compute_fingerprint(scopes: &[String]) -> String {
	let mut hasher = Sha256::new();

	hasher.update(scopes.join(" ").as_bytes());

	STANDARD_NO_PAD.encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn scopes_normalize_independent_of_order() {
		let lhs = ScopeSet::new([CHARGE_WRITE, CHARGE_READ, CHARGE_READ])
			.expect("Left-hand scope set should be valid.");
		let rhs = ScopeSet::charge_default();

		assert_eq!(lhs, rhs);
		assert_eq!(lhs.normalized(), "boleto-cobranca.read boleto-cobranca.write");
		assert_eq!(lhs.fingerprint(), rhs.fingerprint());
	}

	#[test]
	fn subset_checks_follow_membership() {
		let read = ScopeSet::charge_read();
		let write = ScopeSet::charge_write();
		let both = ScopeSet::charge_default();
		let empty = ScopeSet::default();

		assert!(read.is_subset_of(&both));
		assert!(write.is_subset_of(&both));
		assert!(both.is_subset_of(&both));
		assert!(empty.is_subset_of(&read));
		assert!(!both.is_subset_of(&read));
		assert!(!read.is_subset_of(&write));
	}

	#[test]
	fn invalid_scopes_error() {
		assert_eq!(ScopeSet::new([""]), Err(ScopeValidationError::Empty));
		assert!(matches!(
			ScopeSet::new(["contains space"]),
			Err(ScopeValidationError::ContainsWhitespace { .. })
		));
		assert!(ScopeSet::from_str("").expect("Empty string is the empty set.").is_empty());
		assert!(ScopeSet::from_str("   ").is_err());
	}

	#[test]
	fn parses_space_delimited_grants() {
		let granted = ScopeSet::from_str("boleto-cobranca.write  boleto-cobranca.read")
			.expect("Granted scope string should parse.");

		assert!(granted.contains(CHARGE_READ));
		assert_eq!(granted.iter().collect::<Vec<_>>(), vec![CHARGE_READ, CHARGE_WRITE]);
	}
}
