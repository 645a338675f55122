//! Webhook registration payload.

// self
use crate::{_prelude::*, error::ValidationError};

/// Body of `PUT /cobranca/v3/cobrancas/webhook`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
	/// HTTPS endpoint that will receive charge notifications.
	pub webhook_url: String,
}
impl WebhookRegistration {
	/// Validates that `url` is served over HTTPS.
	pub fn new(url: &Url) -> Result<Self, ValidationError> {
		if url.scheme() != "https" {
			return Err(ValidationError::InsecureWebhookUrl { url: url.to_string() });
		}

		Ok(Self { webhook_url: url.to_string() })
	}
}
