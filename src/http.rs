//! Transport primitives for authenticated HTTPS calls.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack: it sends one
//! [`HttpRequest`] and yields the [`HttpResponse`] the server produced, whatever its status.
//! Any `Err` returned by a transport is treated as a transport fault and may be retried by
//! [`RequestExecutor`](crate::retry::RequestExecutor).
//!
//! With the `reqwest` feature, [`ReqwestTransport`] provides the mutual-TLS implementation
//! used against the bank: it presents a PEM client identity, applies a fixed request timeout,
//! and never follows redirects.

// std
use std::path::Path;
// crates.io
use oauth2::{HttpRequest, HttpResponse};
// self
use crate::{_prelude::*, error::ConfigError};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to perform authenticated HTTPS calls.
///
/// Implementations must be `Send + Sync + 'static` so one instance can be shared behind an
/// [`Arc`] by every clone of a client. Returned futures must be `Send` so calls can hop
/// executors.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type Error: 'static + Send + Sync + StdError;

	/// Sends `request` and resolves to the raw response.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error>;
}

/// PEM-encoded client certificate plus private key used for mutual TLS.
#[derive(Clone)]
pub struct ClientIdentity {
	pem: Vec<u8>,
}
impl ClientIdentity {
	/// Combines a PEM certificate (chain) with its PEM private key.
	pub fn from_pem(certificate: impl AsRef<[u8]>, private_key: impl AsRef<[u8]>) -> Self {
		let certificate = certificate.as_ref();
		let private_key = private_key.as_ref();
		let mut pem = Vec::with_capacity(certificate.len() + private_key.len() + 1);

		pem.extend_from_slice(certificate);

		if !certificate.ends_with(b"\n") {
			pem.push(b'\n');
		}

		pem.extend_from_slice(private_key);

		Self { pem }
	}

	/// Uses a single PEM bundle that already holds both the certificate and the key.
	pub fn from_pem_bundle(bundle: impl Into<Vec<u8>>) -> Self {
		Self { pem: bundle.into() }
	}

	/// Reads the certificate and key from the filesystem.
	pub fn from_pem_files(
		certificate_path: impl AsRef<Path>,
		private_key_path: impl AsRef<Path>,
	) -> Result<Self, ConfigError> {
		let certificate = read_identity_file(certificate_path.as_ref())?;
		let private_key = read_identity_file(private_key_path.as_ref())?;

		Ok(Self::from_pem(certificate, private_key))
	}

	/// Raw PEM material.
	pub fn as_pem(&self) -> &[u8] {
		&self.pem
	}
}
impl Debug for ClientIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientIdentity").field("pem", &"<redacted>").finish()
	}
}

fn read_identity_file(path: &Path) -> Result<Vec<u8>, ConfigError> {
	std::fs::read(path)
		.map_err(|source| ConfigError::IdentityRead { path: path.display().to_string(), source })
}

/// Reqwest-backed [`ApiTransport`] carrying the mTLS identity.
///
/// Redirects are never followed: the bank answers every endpoint directly, so a redirect is
/// surfaced to the caller as a non-success response.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Starts building a transport.
	pub fn builder() -> ReqwestTransportBuilder {
		ReqwestTransportBuilder::default()
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; callers must disable redirects themselves.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type Error = ReqwestError;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::Error> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Builder for [`ReqwestTransport`].
#[cfg(feature = "reqwest")]
#[derive(Debug, Default)]
pub struct ReqwestTransportBuilder {
	identity: Option<ClientIdentity>,
	timeout: Option<std::time::Duration>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransportBuilder {
	/// Presents `identity` during the TLS handshake.
	pub fn identity(mut self, identity: ClientIdentity) -> Self {
		self.identity = Some(identity);

		self
	}

	/// Total per-request timeout.
	pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Builds the transport.
	pub fn build(self) -> Result<ReqwestTransport, ConfigError> {
		let mut builder = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none());

		if let Some(identity) = self.identity {
			builder = builder.identity(reqwest::Identity::from_pem(identity.as_pem())?);
		}
		if let Some(timeout) = self.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(ReqwestTransport(builder.build()?))
	}
}
