//! Client-credentials exchange against the bank's token endpoint.
//!
//! The exchange is a form-encoded `POST` carrying `client_id`, `client_secret`,
//! `grant_type=client_credentials`, and the space-joined `scope`. It runs through the
//! [`RequestExecutor`], so transport faults are retried with backoff; once the budget is
//! spent the failure surfaces as [`AuthenticationError::Unreachable`].

pub use oauth2;

// crates.io
use oauth2::{
	HttpRequest, HttpResponse,
	basic::BasicErrorResponse,
	http::{
		Method,
		header::{ACCEPT, CONTENT_TYPE, HeaderValue},
	},
};
// self
use crate::{
	_prelude::*,
	auth::{Credentials, ScopeSet, Token},
	clock::Clock,
	error::AuthenticationError,
	http::ApiTransport,
	obs::{self, CallKind},
	retry::RequestExecutor,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";
const BODY_PREVIEW_LIMIT: usize = 256;

/// Raw token endpoint answer; every field is optional so missing values map to typed errors.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: Option<String>,
	expires_in: Option<i64>,
	scope: Option<String>,
	#[allow(dead_code)]
	token_type: Option<String>,
}

/// Performs one client-credentials exchange for `scope`.
pub(crate) async fn exchange_client_credentials<T>(
	executor: &RequestExecutor<T>,
	endpoint: &Url,
	credentials: &Credentials,
	scope: &ScopeSet,
	clock: &dyn Clock,
) -> Result<Token>
where
	T: ?Sized + ApiTransport,
{
	let body = encode_form(credentials, scope);
	let response = executor
		.send(CallKind::TokenExchange, || build_request(endpoint, &body))
		.await
		.map_err(|e| match e {
			Error::Transient(source) => AuthenticationError::Unreachable(source).into(),
			other => other,
		})?;

	if !response.status().is_success() {
		let status = response.status().as_u16();

		obs::call_rejected(CallKind::TokenExchange, status);

		return Err(
			AuthenticationError::Rejected { status, reason: rejection_reason(&response) }.into()
		);
	}

	let token = parse_token_response(&response, scope, clock.now())?;

	obs::token_exchanged(&token.scope.normalized(), token.expires_at);

	Ok(token)
}

fn encode_form(credentials: &Credentials, scope: &ScopeSet) -> String {
	let mut form = url::form_urlencoded::Serializer::new(String::new());

	credentials.append_to_form(&mut form);
	form.append_pair("grant_type", "client_credentials");

	if !scope.is_empty() {
		form.append_pair("scope", &scope.normalized());
	}

	form.finish()
}

fn build_request(endpoint: &Url, body: &str) -> Result<HttpRequest> {
	let request = oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(endpoint.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE))
		.body(body.as_bytes().to_vec())
		.map_err(crate::error::ConfigError::from)?;

	Ok(request)
}

fn rejection_reason(response: &HttpResponse) -> String {
	if let Ok(oauth) = serde_json::from_slice::<BasicErrorResponse>(response.body()) {
		return match oauth.error_description() {
			Some(description) => description.clone(),
			None => oauth.error().as_ref().to_owned(),
		};
	}

	let body = String::from_utf8_lossy(response.body());
	let trimmed = body.trim();

	if trimmed.is_empty() {
		return "empty response body".into();
	}

	trimmed.chars().take(BODY_PREVIEW_LIMIT).collect()
}

fn parse_token_response(
	response: &HttpResponse,
	requested: &ScopeSet,
	issued_at: OffsetDateTime,
) -> Result<Token, AuthenticationError> {
	let mut deserializer = serde_json::Deserializer::from_slice(response.body());
	let parsed: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| AuthenticationError::MalformedResponse { source })?;
	let access_token = parsed
		.access_token
		.filter(|value| !value.trim().is_empty())
		.ok_or(AuthenticationError::MissingAccessToken)?;
	let expires_in = parsed.expires_in.ok_or(AuthenticationError::MissingExpiresIn)?;

	if expires_in <= 0 {
		return Err(AuthenticationError::NonPositiveExpiresIn);
	}

	let lifetime = Duration::seconds(expires_in);
	let expires_at =
		issued_at.checked_add(lifetime).ok_or(AuthenticationError::ExpiresInOutOfRange)?;
	let granted = match parsed.scope.as_deref().map(str::trim) {
		Some(raw) if !raw.is_empty() =>
			ScopeSet::from_str(raw).map_err(AuthenticationError::InvalidGrantedScope)?,
		_ => requested.clone(),
	};

	if !requested.is_subset_of(&granted) {
		return Err(AuthenticationError::InsufficientScope {
			requested: requested.normalized(),
			granted: granted.normalized(),
		});
	}

	Token::builder(granted)
		.access_token(access_token)
		.issued_at(issued_at)
		.expires_at(expires_at)
		.build()
		.map_err(|_| AuthenticationError::MissingAccessToken)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::StatusCode;
	use time::macros;
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Fixture status should be valid.");

		response
	}

	#[test]
	fn form_carries_grant_and_scope() {
		let form =
			encode_form(&Credentials::new("client-1", "secret"), &ScopeSet::charge_default());

		assert_eq!(
			form,
			"client_id=client-1&client_secret=secret&grant_type=client_credentials\
			 &scope=boleto-cobranca.read+boleto-cobranca.write"
		);
	}

	#[test]
	fn token_lifetime_and_granted_scope_are_applied() {
		let issued_at = macros::datetime!(2025-05-01 10:00 UTC);
		let token = parse_token_response(
			&response(
				200,
				r#"{"access_token":"abc","token_type":"Bearer","expires_in":3600,
				"scope":"boleto-cobranca.write boleto-cobranca.read"}"#,
			),
			&ScopeSet::charge_read(),
			issued_at,
		)
		.expect("Valid token response should parse.");

		assert_eq!(token.access_token.expose(), "abc");
		assert_eq!(token.expires_at, macros::datetime!(2025-05-01 11:00 UTC));
		assert_eq!(token.scope, ScopeSet::charge_default());
	}

	#[test]
	fn missing_scope_falls_back_to_requested() {
		let token = parse_token_response(
			&response(200, r#"{"access_token":"abc","expires_in":60}"#),
			&ScopeSet::charge_write(),
			macros::datetime!(2025-05-01 10:00 UTC),
		)
		.expect("Token without scope should parse.");

		assert_eq!(token.scope, ScopeSet::charge_write());
	}

	#[test]
	fn incomplete_token_responses_are_rejected() {
		let now = macros::datetime!(2025-05-01 10:00 UTC);
		let read = ScopeSet::charge_read();

		assert!(matches!(
			parse_token_response(&response(200, r#"{"expires_in":60}"#), &read, now),
			Err(AuthenticationError::MissingAccessToken)
		));
		assert!(matches!(
			parse_token_response(&response(200, r#"{"access_token":"abc"}"#), &read, now),
			Err(AuthenticationError::MissingExpiresIn)
		));
		assert!(matches!(
			parse_token_response(
				&response(200, r#"{"access_token":"abc","expires_in":0}"#),
				&read,
				now
			),
			Err(AuthenticationError::NonPositiveExpiresIn)
		));
		assert!(matches!(
			parse_token_response(
				&response(200, r#"{"access_token":"abc","expires_in":9223372036854775807}"#),
				&read,
				now
			),
			Err(AuthenticationError::ExpiresInOutOfRange)
		));
		assert!(matches!(
			parse_token_response(&response(200, "<html>"), &read, now),
			Err(AuthenticationError::MalformedResponse { .. })
		));
		assert!(matches!(
			parse_token_response(
				&response(
					200,
					r#"{"access_token":"abc","expires_in":60,"scope":"boleto-cobranca.read"}"#
				),
				&ScopeSet::charge_default(),
				now
			),
			Err(AuthenticationError::InsufficientScope { .. })
		));
	}

	#[test]
	fn rejection_reason_prefers_oauth_description() {
		assert_eq!(
			rejection_reason(&response(
				400,
				r#"{"error":"invalid_client","error_description":"Client unknown"}"#
			)),
			"Client unknown"
		);
		assert_eq!(
			rejection_reason(&response(401, r#"{"error":"invalid_client"}"#)),
			"invalid_client"
		);
		assert_eq!(rejection_reason(&response(502, "Bad Gateway")), "Bad Gateway");
		assert_eq!(rejection_reason(&response(500, "")), "empty response body");
		assert_eq!(
			rejection_reason(&response(500, &"x".repeat(1_000))).len(),
			BODY_PREVIEW_LIMIT
		);
	}
}
