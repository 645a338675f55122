//! Client-credentials pair used for the token exchange.

// crates.io
use oauth2::{ClientId, ClientSecret};
// self
use crate::_prelude::*;

/// OAuth 2.0 confidential client credentials issued by the bank.
///
/// The secret is held in [`ClientSecret`], whose `Debug` output never reveals the value.
#[derive(Clone)]
pub struct Credentials {
	/// OAuth 2.0 client identifier.
	pub client_id: ClientId,
	/// OAuth 2.0 client secret.
	pub client_secret: ClientSecret,
}
impl Credentials {
	/// Wraps a client id/secret pair.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
		Self {
			client_id: ClientId::new(client_id.into()),
			client_secret: ClientSecret::new(client_secret.into()),
		}
	}

	/// Appends the credential fields to a form-encoded token request body.
	pub(crate) fn append_to_form(&self, form: &mut url::form_urlencoded::Serializer<'_, String>) {
		form.append_pair("client_id", self.client_id.as_str());
		form.append_pair("client_secret", self.client_secret.secret());
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id.as_str())
			.field("client_secret", &"<redacted>")
			.finish()
	}
}
