//! Immutable bearer token records and their builder.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, token::secret::TokenSecret},
};

/// Errors produced by [`TokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum TokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when no expiry (absolute or relative) was configured.
	#[error("Expiry must be supplied via expires_at or expires_in.")]
	MissingExpiry,
}

/// One cached credential. Never mutated after creation; a refresh yields a new value.
#[derive(Clone)]
pub struct Token {
	/// Bearer secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Scopes granted to this token.
	pub scope: ScopeSet,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Instant after which the token must not be reused.
	pub expires_at: OffsetDateTime,
}
impl Token {
	/// Returns a builder for the provided granted scope set.
	pub fn builder(scope: ScopeSet) -> TokenBuilder {
		TokenBuilder::new(scope)
	}

	/// Returns `true` if the token has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` when the token covers `requested` and stays valid past `instant + leeway`.
	///
	/// A leeway at least as long as the token's lifetime is capped at half of that lifetime.
	pub fn is_usable_for(
		&self,
		requested: &ScopeSet,
		instant: OffsetDateTime,
		leeway: Duration,
	) -> bool {
		requested.is_subset_of(&self.scope)
			&& !self.is_expired_at(instant + self.effective_leeway(leeway))
	}

	/// Granted lifetime, from issuance to expiry.
	pub fn lifetime(&self) -> Duration {
		self.expires_at - self.issued_at
	}

	/// Returns `true` when `leeway` would hide this token for its whole lifetime.
	pub fn leeway_exceeds_lifetime(&self, leeway: Duration) -> bool {
		leeway >= self.lifetime()
	}

	fn effective_leeway(&self, leeway: Duration) -> Duration {
		if self.leeway_exceeds_lifetime(leeway) { self.lifetime() / 2 } else { leeway }
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Token`].
#[derive(Clone, Debug)]
pub struct TokenBuilder {
	scope: ScopeSet,
	access_token: Option<TokenSecret>,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl TokenBuilder {
	fn new(scope: ScopeSet) -> Self {
		Self { scope, access_token: None, issued_at: None, expires_at: None, expires_in: None }
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a relative expiry duration from the issued instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Consumes the builder and produces a [`Token`].
	pub fn build(self) -> Result<Token, TokenBuilderError> {
		let access_token = self.access_token.ok_or(TokenBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => instant,
			(None, Some(delta)) => issued_at + delta,
			(None, None) => return Err(TokenBuilderError::MissingExpiry),
		};

		Ok(Token { access_token, scope: self.scope, issued_at, expires_at })
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn token(scope: ScopeSet) -> Token {
		Token::builder(scope)
			.access_token("access")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC))
			.expires_in(Duration::hours(1))
			.build()
			.expect("Token fixture should build.")
	}

	#[test]
	fn lifetime_follows_relative_expiry() {
		let token = token(ScopeSet::charge_read());

		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:00 UTC));
		assert_eq!(token.lifetime(), Duration::hours(1));
		assert!(token.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!token.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
	}

	#[test]
	fn usability_requires_scope_cover_and_freshness() {
		let token = token(ScopeSet::charge_default());
		let before_expiry = macros::datetime!(2025-01-01 00:59 UTC);

		assert!(token.is_usable_for(&ScopeSet::charge_read(), before_expiry, Duration::ZERO));
		assert!(token.is_usable_for(&ScopeSet::charge_default(), before_expiry, Duration::ZERO));
		assert!(!token.is_usable_for(
			&ScopeSet::charge_read(),
			before_expiry,
			Duration::minutes(2)
		));
		assert!(!token.is_usable_for(
			&ScopeSet::charge_read(),
			macros::datetime!(2025-01-01 01:00 UTC),
			Duration::ZERO
		));

		let narrow = self::token(ScopeSet::charge_read());

		assert!(!narrow.is_usable_for(&ScopeSet::charge_write(), before_expiry, Duration::ZERO));
	}

	#[test]
	fn builder_requires_secret_and_expiry() {
		assert_eq!(
			Token::builder(ScopeSet::charge_read()).expires_in(Duration::hours(1)).build().err(),
			Some(TokenBuilderError::MissingAccessToken)
		);
		assert_eq!(
			Token::builder(ScopeSet::charge_read()).access_token("x").build().err(),
			Some(TokenBuilderError::MissingExpiry)
		);
	}

	#[test]
	fn oversized_leeway_is_capped_at_half_the_lifetime() {
		let token = token(ScopeSet::charge_read());
		let scope = ScopeSet::charge_read();

		assert!(token.leeway_exceeds_lifetime(Duration::hours(2)));
		assert!(!token.leeway_exceeds_lifetime(Duration::minutes(59)));
		assert!(token.is_usable_for(
			&scope,
			macros::datetime!(2025-01-01 00:00 UTC),
			Duration::hours(2)
		));
		assert!(token.is_usable_for(
			&scope,
			macros::datetime!(2025-01-01 00:29 UTC),
			Duration::hours(2)
		));
		assert!(!token.is_usable_for(
			&scope,
			macros::datetime!(2025-01-01 00:30 UTC),
			Duration::hours(2)
		));
	}
}
