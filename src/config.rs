//! Validated client configuration and its builder.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, ScopeSet},
	cache::DEFAULT_CAPACITY,
	error::ConfigError,
	retry::RetryPolicy,
};

/// Production API base URL.
pub const PRODUCTION_BASE_URL: &str = "https://cdpj.partners.bancointer.com.br";
/// Sandbox API base URL.
pub const SANDBOX_BASE_URL: &str = "https://cdpj-sandbox.partners.uatinter.co";
/// Default token endpoint path, relative to the base URL.
pub const DEFAULT_TOKEN_PATH: &str = "/oauth/v2/token";

/// Errors raised while validating a [`ClientConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigBuildError {
	/// The OAuth client identifier is required.
	#[error("Client id is required.")]
	MissingClientId,
	/// The OAuth client secret is required.
	#[error("Client secret is required.")]
	MissingClientSecret,
	/// The API must be reached over HTTPS.
	#[error("Base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Rejected URL.
		url: String,
	},
	/// Webhook targets must be served over HTTPS.
	#[error("Webhook URL must use HTTPS: {url}.")]
	InsecureWebhookUrl {
		/// Rejected URL.
		url: String,
	},
	/// An account header was configured but left blank.
	#[error("Checking account cannot be blank.")]
	EmptyAccount,
	/// Retry settings are unusable.
	#[error("Retry policy is invalid: {reason}.")]
	InvalidRetryPolicy {
		/// Why the policy was rejected.
		reason: &'static str,
	},
	/// The token cache must hold at least one token.
	#[error("Token cache capacity must be at least 1.")]
	ZeroCacheCapacity,
	/// Timeouts and leeways must be positive or zero.
	#[error("The {setting} setting cannot be negative.")]
	NegativeDuration {
		/// Offending setting.
		setting: &'static str,
	},
}

/// Target API deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
	/// [`PRODUCTION_BASE_URL`].
	Production,
	/// [`SANDBOX_BASE_URL`].
	Sandbox,
	/// Any other base URL, e.g. a proxy or a local mock server.
	Custom(Url),
}
impl Environment {
	/// Base URL every endpoint path is joined onto.
	pub fn base_url(&self) -> Url {
		match self {
			Self::Production => builtin_url(PRODUCTION_BASE_URL),
			Self::Sandbox => builtin_url(SANDBOX_BASE_URL),
			Self::Custom(url) => url.clone(),
		}
	}
}

fn builtin_url(raw: &'static str) -> Url {
	Url::parse(raw).expect("Built-in base URLs must parse.")
}

/// Immutable client settings shared by every clone of a client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Base URL every endpoint path is joined onto.
	pub base_url: Url,
	/// Token endpoint path, relative to [`base_url`](Self::base_url).
	pub token_path: String,
	/// OAuth client credentials.
	pub credentials: Credentials,
	/// Scopes requested when an acquisition names none.
	pub default_scope: ScopeSet,
	/// Checking account sent as `x-conta-corrente`, when set.
	pub account: Option<String>,
	/// Target registered by [`register_default_webhook`](crate::client::InterClient::register_default_webhook).
	pub webhook_url: Option<Url>,
	/// Attempt budget and backoff for every outbound call.
	pub retry: RetryPolicy,
	/// Per-request timeout applied by the reqwest transport.
	pub request_timeout: Duration,
	/// Safety margin subtracted from token lifetimes before reuse.
	pub token_expiry_leeway: Duration,
	/// Maximum number of cached tokens.
	pub token_cache_capacity: usize,
	/// Invalidates the token and repeats the call once when the service answers 401.
	pub reauthenticate_on_unauthorized: bool,
}
impl ClientConfig {
	/// Starts a builder targeting `environment`.
	pub fn builder(environment: Environment) -> ClientConfigBuilder {
		ClientConfigBuilder::new(environment)
	}

	/// Joins `path` onto the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(path)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}

	/// Absolute token endpoint URL.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.token_path)
	}

	fn validate(&self) -> Result<(), ConfigBuildError> {
		if self.credentials.client_id.as_str().trim().is_empty() {
			return Err(ConfigBuildError::MissingClientId);
		}
		if self.credentials.client_secret.secret().trim().is_empty() {
			return Err(ConfigBuildError::MissingClientSecret);
		}
		if self.base_url.scheme() != "https" {
			return Err(ConfigBuildError::InsecureBaseUrl { url: self.base_url.to_string() });
		}
		if let Some(webhook) = &self.webhook_url
			&& webhook.scheme() != "https"
		{
			return Err(ConfigBuildError::InsecureWebhookUrl { url: webhook.to_string() });
		}
		if self.account.as_deref().is_some_and(|account| account.trim().is_empty()) {
			return Err(ConfigBuildError::EmptyAccount);
		}
		if self.token_cache_capacity == 0 {
			return Err(ConfigBuildError::ZeroCacheCapacity);
		}
		if self.request_timeout.is_negative() {
			return Err(ConfigBuildError::NegativeDuration { setting: "request_timeout" });
		}
		if self.token_expiry_leeway.is_negative() {
			return Err(ConfigBuildError::NegativeDuration { setting: "token_expiry_leeway" });
		}

		self.retry.validate()
	}
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
	environment: Environment,
	client_id: Option<String>,
	client_secret: Option<String>,
	token_path: String,
	default_scope: ScopeSet,
	account: Option<String>,
	webhook_url: Option<Url>,
	retry: RetryPolicy,
	request_timeout: Duration,
	token_expiry_leeway: Duration,
	token_cache_capacity: usize,
	reauthenticate_on_unauthorized: bool,
}
impl ClientConfigBuilder {
	fn new(environment: Environment) -> Self {
		Self {
			environment,
			client_id: None,
			client_secret: None,
			token_path: DEFAULT_TOKEN_PATH.into(),
			default_scope: ScopeSet::charge_default(),
			account: None,
			webhook_url: None,
			retry: RetryPolicy::default(),
			request_timeout: Duration::seconds(30),
			token_expiry_leeway: Duration::ZERO,
			token_cache_capacity: DEFAULT_CAPACITY,
			reauthenticate_on_unauthorized: true,
		}
	}

	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the OAuth client secret.
	pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Overrides the scopes requested when an acquisition names none.
	pub fn default_scope(mut self, scope: ScopeSet) -> Self {
		self.default_scope = scope;

		self
	}

	/// Sends `account` as the `x-conta-corrente` header on every operation.
	pub fn account(mut self, account: impl Into<String>) -> Self {
		self.account = Some(account.into());

		self
	}

	/// Sets the webhook target used by `register_default_webhook`.
	pub fn webhook_url(mut self, url: Url) -> Self {
		self.webhook_url = Some(url);

		self
	}

	/// Overrides the retry policy.
	pub fn retry(mut self, policy: RetryPolicy) -> Self {
		self.retry = policy;

		self
	}

	/// Overrides the per-request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Treats tokens as expired this long before their actual expiry.
	pub fn token_expiry_leeway(mut self, leeway: Duration) -> Self {
		self.token_expiry_leeway = leeway;

		self
	}

	/// Overrides the maximum number of cached tokens.
	pub fn token_cache_capacity(mut self, capacity: usize) -> Self {
		self.token_cache_capacity = capacity;

		self
	}

	/// Enables or disables the single re-authentication after a 401 answer.
	pub fn reauthenticate_on_unauthorized(mut self, enabled: bool) -> Self {
		self.reauthenticate_on_unauthorized = enabled;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigBuildError> {
		let client_id = self.client_id.ok_or(ConfigBuildError::MissingClientId)?;
		let client_secret = self.client_secret.ok_or(ConfigBuildError::MissingClientSecret)?;
		let config = ClientConfig {
			base_url: self.environment.base_url(),
			token_path: self.token_path,
			credentials: Credentials::new(client_id, client_secret),
			default_scope: self.default_scope,
			account: self.account,
			webhook_url: self.webhook_url,
			retry: self.retry,
			request_timeout: self.request_timeout,
			token_expiry_leeway: self.token_expiry_leeway,
			token_cache_capacity: self.token_cache_capacity,
			reauthenticate_on_unauthorized: self.reauthenticate_on_unauthorized,
		};

		config.validate()?;

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::retry::Backoff;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse.")
	}

	fn builder() -> ClientConfigBuilder {
		ClientConfig::builder(Environment::Sandbox).client_id("id").client_secret("secret")
	}

	#[test]
	fn defaults_follow_the_public_api() {
		let config = builder().build().expect("Minimal configuration should build.");

		assert_eq!(config.base_url.as_str(), "https://cdpj-sandbox.partners.uatinter.co/");
		assert_eq!(
			config.token_endpoint().expect("Token endpoint should join.").as_str(),
			"https://cdpj-sandbox.partners.uatinter.co/oauth/v2/token"
		);
		assert_eq!(config.default_scope, ScopeSet::charge_default());
		assert_eq!(config.retry.max_attempts(), 5);
		assert_eq!(config.request_timeout, Duration::seconds(30));
		assert_eq!(config.token_cache_capacity, 32);
		assert!(config.reauthenticate_on_unauthorized);
		assert!(config.account.is_none());
		assert_eq!(
			Environment::Production.base_url().as_str(),
			"https://cdpj.partners.bancointer.com.br/"
		);
	}

	#[test]
	fn missing_credentials_are_rejected() {
		assert_eq!(
			ClientConfig::builder(Environment::Production).client_secret("s").build().err(),
			Some(ConfigBuildError::MissingClientId)
		);
		assert_eq!(
			ClientConfig::builder(Environment::Production).client_id("id").build().err(),
			Some(ConfigBuildError::MissingClientSecret)
		);
		assert_eq!(
			ClientConfig::builder(Environment::Production)
				.client_id(" ")
				.client_secret("s")
				.build()
				.err(),
			Some(ConfigBuildError::MissingClientId)
		);
	}

	#[test]
	fn insecure_urls_are_rejected() {
		let err = ClientConfig::builder(Environment::Custom(url("http://localhost:8080")))
			.client_id("id")
			.client_secret("secret")
			.build()
			.expect_err("Plain HTTP base URL should be rejected.");

		assert!(matches!(err, ConfigBuildError::InsecureBaseUrl { .. }));

		let err = builder()
			.webhook_url(url("http://hooks.example.com/inter"))
			.build()
			.expect_err("Plain HTTP webhook should be rejected.");

		assert!(matches!(err, ConfigBuildError::InsecureWebhookUrl { .. }));
	}

	#[test]
	fn degenerate_settings_are_rejected() {
		assert_eq!(builder().account("  ").build().err(), Some(ConfigBuildError::EmptyAccount));
		assert_eq!(
			builder().token_cache_capacity(0).build().err(),
			Some(ConfigBuildError::ZeroCacheCapacity)
		);
		assert!(matches!(
			builder().retry(RetryPolicy::new(0)).build(),
			Err(ConfigBuildError::InvalidRetryPolicy { .. })
		));
		assert!(matches!(
			builder()
				.retry(RetryPolicy::new(2).with_backoff(Backoff { base: 0., ..Backoff::default() }))
				.build(),
			Err(ConfigBuildError::InvalidRetryPolicy { .. })
		));
		assert_eq!(
			builder().request_timeout(Duration::seconds(-1)).build().err(),
			Some(ConfigBuildError::NegativeDuration { setting: "request_timeout" })
		);
	}

	#[test]
	fn custom_token_path_is_joined() {
		let config = ClientConfig::builder(Environment::Custom(url("https://proxy.example.com")))
			.client_id("id")
			.client_secret("secret")
			.token_path("/auth/token")
			.account("12345678")
			.build()
			.expect("Custom configuration should build.");

		assert_eq!(
			config.token_endpoint().expect("Token endpoint should join.").as_str(),
			"https://proxy.example.com/auth/token"
		);
		assert_eq!(config.account.as_deref(), Some("12345678"));
	}
}
