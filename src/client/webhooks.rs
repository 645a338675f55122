//! Webhook registration and removal.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	client::{InterClient, encode, observed},
	error::ValidationError,
	http::ApiTransport,
	model::WebhookRegistration,
	obs::CallKind,
};

const WEBHOOK_PATH: &str = "/cobranca/v3/cobrancas/webhook";

impl<T> InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Registers `url` as the charge notification target. Only HTTPS targets are accepted.
	pub async fn register_webhook(&self, url: &Url) -> Result<()> {
		const KIND: CallKind = CallKind::RegisterWebhook;

		observed(KIND, async move {
			let body = encode(&WebhookRegistration::new(url)?)?;

			self.call(KIND, &ScopeSet::charge_write(), |token| {
				self.request(Method::PUT, WEBHOOK_PATH, token, Some(&body))
			})
			.await?;

			Ok(())
		})
		.await
	}

	/// Registers the webhook configured through [`ClientConfig::webhook_url`](crate::config::ClientConfig::webhook_url).
	pub async fn register_default_webhook(&self) -> Result<()> {
		let url = self
			.config()
			.webhook_url
			.clone()
			.ok_or(ValidationError::MissingField { field: "webhookUrl" })?;

		self.register_webhook(&url).await
	}

	/// Removes the registered webhook.
	pub async fn remove_webhook(&self) -> Result<()> {
		const KIND: CallKind = CallKind::RemoveWebhook;

		observed(KIND, async move {
			self.call(KIND, &ScopeSet::charge_write(), |token| {
				self.request(Method::DELETE, WEBHOOK_PATH, token, None)
			})
			.await?;

			Ok(())
		})
		.await
	}
}
