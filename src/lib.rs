//! Banco Inter charges (cobrança v3) client: mTLS client credentials, scope-aware token
//! caching, and retrying request execution behind typed issue, query, PDF, cancel, and webhook
//! operations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod oauth;
pub mod obs;
pub mod retry;
#[cfg(any(test, feature = "test"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by unit and integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;
	pub use oauth2::http::Method;

	// std
	use std::{collections::VecDeque, io};
	// crates.io
	use oauth2::{
		HttpRequest, HttpResponse,
		http::{HeaderMap, StatusCode},
	};
	// self
	#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;
	use crate::{
		client::InterClient,
		config::{ClientConfig, ClientConfigBuilder, DEFAULT_TOKEN_PATH, Environment},
		http::{ApiTransport, TransportFuture},
		retry::{Backoff, RetryPolicy},
	};

	/// Base URL used by tests that never leave the process.
	pub const TEST_BASE_URL: &str = "https://cdpj.test.bancointer.com.br";
	/// Client identifier used by test configurations.
	pub const TEST_CLIENT_ID: &str = "test-client";
	/// Client secret used by test configurations.
	pub const TEST_CLIENT_SECRET: &str = "test-secret";

	/// One scripted transport reaction.
	#[derive(Clone, Debug)]
	pub enum Reply {
		/// Answers with `status` and `body`.
		Respond {
			/// HTTP status code.
			status: u16,
			/// Response body.
			body: String,
		},
		/// Fails the send with an I/O fault.
		Fault,
	}

	/// Request captured by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub struct RecordedRequest {
		/// HTTP method.
		pub method: Method,
		/// URL path, without the query.
		pub path: String,
		/// Request headers.
		pub headers: HeaderMap,
		/// Raw request body.
		pub body: Vec<u8>,
	}
	impl RecordedRequest {
		/// Returns a header value as text.
		pub fn header(&self, name: &str) -> Option<&str> {
			self.headers.get(name).and_then(|value| value.to_str().ok())
		}

		/// Parses the body as JSON.
		pub fn json(&self) -> serde_json::Value {
			serde_json::from_slice(&self.body).expect("Recorded body should be valid JSON.")
		}

		/// Parses the body as an urlencoded form.
		pub fn form(&self) -> HashMap<String, String> {
			url::form_urlencoded::parse(&self.body).into_owned().collect()
		}
	}

	#[derive(Debug)]
	struct Route {
		method: Method,
		path: String,
		replies: VecDeque<Reply>,
	}

	/// In-process transport answering from per-route scripts.
	///
	/// Each route replays its replies in order and repeats the last one once the script runs
	/// dry. Requests without a route get a `404`.
	#[derive(Debug, Default)]
	pub struct ScriptedTransport {
		routes: Mutex<Vec<Route>>,
		requests: Mutex<Vec<RecordedRequest>>,
	}
	impl ScriptedTransport {
		/// Queues a response for `method path`.
		pub fn reply(&self, method: Method, path: &str, status: u16, body: impl Into<String>) {
			self.push(method, path, Reply::Respond { status, body: body.into() });
		}

		/// Queues a transport fault for `method path`.
		pub fn fault(&self, method: Method, path: &str) {
			self.push(method, path, Reply::Fault);
		}

		/// Queues a successful token exchange on the default token path.
		pub fn token(&self, access_token: &str, expires_in: i64, scope: &str) {
			self.reply(
				Method::POST,
				DEFAULT_TOKEN_PATH,
				200,
				token_body(access_token, expires_in, scope),
			);
		}

		/// Every request received so far.
		pub fn requests(&self) -> Vec<RecordedRequest> {
			self.requests.lock().clone()
		}

		/// Requests received for `method path`.
		pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
			self.requests
				.lock()
				.iter()
				.filter(|request| request.method == method && request.path == path)
				.cloned()
				.collect()
		}

		/// Number of requests received for `method path`.
		pub fn hits(&self, method: Method, path: &str) -> usize {
			self.requests_to(method, path).len()
		}

		fn push(&self, method: Method, path: &str, reply: Reply) {
			let mut routes = self.routes.lock();

			match routes.iter_mut().find(|route| route.method == method && route.path == path) {
				Some(route) => route.replies.push_back(reply),
				None => routes.push(Route {
					method,
					path: path.to_owned(),
					replies: VecDeque::from([reply]),
				}),
			}
		}

		fn next_reply(&self, method: &Method, path: &str) -> Option<Reply> {
			let mut routes = self.routes.lock();
			let route =
				routes.iter_mut().find(|route| &route.method == method && route.path == path)?;

			if route.replies.len() > 1 {
				route.replies.pop_front()
			} else {
				route.replies.front().cloned()
			}
		}
	}
	impl ApiTransport for ScriptedTransport {
		type Error = io::Error;

		fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error> {
			let (parts, body) = request.into_parts();
			let path = parts.uri.path().to_owned();
			let reply = self.next_reply(&parts.method, &path);

			self.requests.lock().push(RecordedRequest {
				method: parts.method,
				path,
				headers: parts.headers,
				body,
			});

			Box::pin(async move {
				match reply {
					Some(Reply::Respond { status, body }) => {
						let mut response = HttpResponse::new(body.into_bytes());

						*response.status_mut() =
							StatusCode::from_u16(status).map_err(io::Error::other)?;

						Ok(response)
					},
					Some(Reply::Fault) =>
						Err(io::Error::new(io::ErrorKind::ConnectionReset, "scripted fault")),
					None => {
						let mut response =
							HttpResponse::new(b"{\"title\":\"unscripted\"}".to_vec());

						*response.status_mut() = StatusCode::NOT_FOUND;

						Ok(response)
					},
				}
			})
		}
	}

	/// Token endpoint body granting `scope` for `expires_in` seconds.
	pub fn token_body(access_token: &str, expires_in: i64, scope: &str) -> String {
		serde_json::json!({
			"access_token": access_token,
			"token_type": "Bearer",
			"expires_in": expires_in,
			"scope": scope,
		})
		.to_string()
	}

	/// Configuration builder pointed at `base_url` with test credentials and immediate retries.
	pub fn test_config_builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfig::builder(Environment::Custom(base_url))
			.client_id(TEST_CLIENT_ID)
			.client_secret(TEST_CLIENT_SECRET)
			.retry(RetryPolicy::new(3).with_backoff(Backoff::immediate()))
	}

	/// Client over a fresh [`ScriptedTransport`], returned alongside for scripting.
	pub fn scripted_client() -> (InterClient<ScriptedTransport>, Arc<ScriptedTransport>) {
		let base_url = Url::parse(TEST_BASE_URL).expect("Test base URL should parse.");
		let config =
			test_config_builder(base_url).build().expect("Test configuration should build.");

		scripted_client_with(config)
	}

	/// Client over a fresh [`ScriptedTransport`] using `config`.
	pub fn scripted_client_with(
		config: ClientConfig,
	) -> (InterClient<ScriptedTransport>, Arc<ScriptedTransport>) {
		let transport = Arc::new(ScriptedTransport::default());
		let client = InterClient::with_transport(config, transport.clone())
			.expect("Scripted client should build.");

		(client, transport)
	}

	/// Rewrites an `httpmock` server URL to HTTPS on `localhost`; the mock server speaks both
	/// protocols on one port and picks its certificate from the SNI host name.
	pub fn https_url(server_url: &str) -> Url {
		let mut url = Url::parse(server_url).expect("Mock server URL should parse.");

		url.set_scheme("https").expect("Mock server URL should accept the https scheme.");
		url.set_host(Some("localhost")).expect("Mock server URL should accept a host name.");

		url
	}

	/// Reqwest transport that accepts the self-signed certificate served by `httpmock`.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.redirect(reqwest::redirect::Policy::none())
			.timeout(std::time::Duration::from_secs(5))
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use rust_decimal;
pub use time;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, inter_cobranca as _};
