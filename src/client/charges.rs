//! Charge operations: issue, query, PDF, cancel.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{RequestCode, ScopeSet},
	client::{InterClient, decode, encode, observed},
	error::ValidationError,
	http::ApiTransport,
	model::charge::{
		CancelChargeRequest, ChargeDetails, ChargePdf, IssueChargeRequest, IssueChargeResponse,
		PdfResponse,
	},
	obs::CallKind,
};

const CHARGES_PATH: &str = "/cobranca/v3/cobrancas";

impl<T> InterClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Issues a new charge and returns its `codigoSolicitacao`.
	///
	/// The request is validated first; invalid input never reaches the network.
	pub async fn issue_charge(&self, request: &IssueChargeRequest) -> Result<RequestCode> {
		const KIND: CallKind = CallKind::IssueCharge;

		observed(KIND, async move {
			request.validate()?;

			let body = encode(request)?;
			let response = self
				.call(KIND, &ScopeSet::charge_write(), |token| {
					self.request(Method::POST, CHARGES_PATH, token, Some(&body))
				})
				.await?;
			let status = response.status().as_u16();
			let issued: IssueChargeResponse = decode(&response)?;
			let code = issued
				.codigo_solicitacao
				.filter(|code| !code.trim().is_empty())
				.ok_or_else(|| Error::InvalidResponse {
					status,
					reason: "codigoSolicitacao is missing or empty".into(),
				})?;

			RequestCode::new(&code).map_err(|e| Error::InvalidResponse {
				status,
				reason: format!("codigoSolicitacao `{code}` is not a valid identifier: {e}"),
			})
		})
		.await
	}

	/// Fetches a charge with its slip and PIX details.
	pub async fn query_charge(&self, code: &RequestCode) -> Result<ChargeDetails> {
		const KIND: CallKind = CallKind::QueryCharge;

		observed(KIND, async move {
			let path = format!("{CHARGES_PATH}/{code}");
			let response = self
				.call(KIND, &ScopeSet::charge_read(), |token| {
					self.request(Method::GET, &path, token, None)
				})
				.await?;

			decode(&response)
		})
		.await
	}

	/// Downloads the PDF rendition of a charge.
	pub async fn fetch_pdf(&self, code: &RequestCode) -> Result<ChargePdf> {
		const KIND: CallKind = CallKind::FetchPdf;

		observed(KIND, async move {
			let path = format!("{CHARGES_PATH}/{code}/pdf");
			let response = self
				.call(KIND, &ScopeSet::charge_read(), |token| {
					self.request(Method::GET, &path, token, None)
				})
				.await?;
			let status = response.status().as_u16();
			let payload: PdfResponse = decode(&response)?;

			ChargePdf::from_base64(&payload.pdf).map_err(|e| Error::InvalidResponse {
				status,
				reason: format!("pdf field is not valid base64: {e}"),
			})
		})
		.await
	}

	/// Cancels a charge, recording `reason` as `motivoCancelamento`.
	pub async fn cancel_charge(&self, code: &RequestCode, reason: &str) -> Result<()> {
		const KIND: CallKind = CallKind::CancelCharge;

		observed(KIND, async move {
			let reason = reason.trim();

			if reason.is_empty() {
				return Err(ValidationError::MissingField { field: "motivoCancelamento" }.into());
			}

			let path = format!("{CHARGES_PATH}/{code}/cancelar");
			let body = encode(&CancelChargeRequest { motivo_cancelamento: reason })?;

			self.call(KIND, &ScopeSet::charge_write(), |token| {
				self.request(Method::PATCH, &path, token, Some(&body))
			})
			.await?;

			Ok(())
		})
		.await
	}
}
