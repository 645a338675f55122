// self
use inter_cobranca::{
	_preludet::*,
	auth::CHARGE_WRITE,
	config::DEFAULT_TOKEN_PATH,
	error::ValidationError,
};

const WEBHOOK: &str = "/cobranca/v3/cobrancas/webhook";

fn url(value: &str) -> Url {
	Url::parse(value).expect("Test URL should parse.")
}

#[tokio::test]
async fn register_webhook_puts_the_target() {
	let (client, transport) = scripted_client();

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(Method::PUT, WEBHOOK, 204, "");

	client
		.register_webhook(&url("https://hooks.example.com/inter"))
		.await
		.expect("Webhook registration should succeed.");

	let call = &transport.requests_to(Method::PUT, WEBHOOK)[0];

	assert_eq!(call.json(), serde_json::json!({ "webhookUrl": "https://hooks.example.com/inter" }));
	assert_eq!(call.header("authorization"), Some("Bearer write-token"));
}

#[tokio::test]
async fn insecure_webhook_is_rejected_locally() {
	let (client, transport) = scripted_client();
	let err = client
		.register_webhook(&url("http://hooks.example.com/inter"))
		.await
		.expect_err("Plain HTTP webhook should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::InsecureWebhookUrl { .. })));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn default_webhook_requires_configuration() {
	let (client, transport) = scripted_client();
	let err =
		client.register_default_webhook().await.expect_err("Missing webhook URL should fail.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::MissingField { field: "webhookUrl" })
	));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn default_webhook_uses_the_configured_target() {
	let config = test_config_builder(url(TEST_BASE_URL))
		.webhook_url(url("https://hooks.example.com/default"))
		.build()
		.expect("Configuration should build.");
	let (client, transport) = scripted_client_with(config);

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(Method::PUT, WEBHOOK, 204, "");

	client.register_default_webhook().await.expect("Default webhook should register.");

	assert_eq!(
		transport.requests_to(Method::PUT, WEBHOOK)[0].json()["webhookUrl"],
		"https://hooks.example.com/default"
	);
}

#[tokio::test]
async fn remove_webhook_sends_delete() {
	let (client, transport) = scripted_client();

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(Method::DELETE, WEBHOOK, 204, "");

	client.remove_webhook().await.expect("Webhook removal should succeed.");

	let call = &transport.requests_to(Method::DELETE, WEBHOOK)[0];

	assert!(call.body.is_empty());
	assert_eq!(call.header("content-type"), None);
	assert_eq!(transport.hits(Method::POST, DEFAULT_TOKEN_PATH), 1);
}
