//! Charge issuance, query, PDF, and cancellation payloads.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rust_decimal::Decimal;
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::RequestCode,
	error::ValidationError,
	model::{
		iso_date,
		person::{BENEFICIARY_FIELDS, PAYER_FIELDS, Person},
	},
};

const SEU_NUMERO_MAX_LEN: usize = 15;
const NUM_DIAS_AGENDA_MAX: u8 = 60;

/// Payment method offered by a charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptMethod {
	/// Bank slip.
	Boleto,
	/// Instant payment QR code.
	Pix,
}

/// Early-payment discount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
	/// Discount rule code, e.g. `PERCENTUALDATAINFORMADA`.
	pub codigo: String,
	/// Days before due date during which the discount applies.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quantidade_dias: Option<u32>,
	/// Discount rate.
	#[serde(with = "rust_decimal::serde::float")]
	pub taxa: Decimal,
}

/// Late-payment fine (`multa`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
	/// Fine rule code, e.g. `PERCENTUAL`.
	pub codigo: String,
	/// Fine rate.
	#[serde(with = "rust_decimal::serde::float")]
	pub taxa: Decimal,
}

/// Late-payment interest (`mora`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interest {
	/// Interest rule code, e.g. `TAXAMENSAL`.
	pub codigo: String,
	/// Interest rate.
	#[serde(with = "rust_decimal::serde::float")]
	pub taxa: Decimal,
}

/// Free-text lines printed on the slip.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
	/// First line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linha1: Option<String>,
	/// Second line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linha2: Option<String>,
	/// Third line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linha3: Option<String>,
	/// Fourth line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linha4: Option<String>,
	/// Fifth line.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub linha5: Option<String>,
}
impl Message {
	/// Builds a message from up to five lines; extra lines are ignored.
	pub fn from_lines<I, S>(lines: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut slots = lines.into_iter().map(Into::into);

		Self {
			linha1: slots.next(),
			linha2: slots.next(),
			linha3: slots.next(),
			linha4: slots.next(),
			linha5: slots.next(),
		}
	}
}

/// Body of `POST /cobranca/v3/cobrancas`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueChargeRequest {
	/// Caller's own reference for the charge.
	pub seu_numero: String,
	/// Face value.
	#[serde(with = "rust_decimal::serde::float")]
	pub valor_nominal: Decimal,
	/// Due date.
	#[serde(with = "iso_date")]
	pub data_vencimento: Date,
	/// Days after the due date during which payment is still accepted.
	pub num_dias_agenda: u8,
	/// Payer.
	pub pagador: Person,
	/// Early-payment discount.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub desconto: Option<Discount>,
	/// Late-payment fine.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub multa: Option<Fine>,
	/// Late-payment interest.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mora: Option<Interest>,
	/// Slip message.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mensagem: Option<Message>,
	/// Final beneficiary, when different from the account holder.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub beneficiario_final: Option<Person>,
	/// Payment methods offered; empty lets the bank decide.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub formas_recebimento: Vec<ReceiptMethod>,
}
impl IssueChargeRequest {
	/// Starts a builder.
	pub fn builder() -> IssueChargeRequestBuilder {
		IssueChargeRequestBuilder::default()
	}

	/// Checks every field constraint without touching the network.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let seu_numero = self.seu_numero.trim();

		if seu_numero.is_empty() {
			return Err(ValidationError::MissingField { field: "seuNumero" });
		}
		if seu_numero.chars().count() > SEU_NUMERO_MAX_LEN {
			return Err(ValidationError::TooLong { field: "seuNumero", max: SEU_NUMERO_MAX_LEN });
		}
		if self.valor_nominal <= Decimal::ZERO {
			return Err(ValidationError::NonPositiveAmount { field: "valorNominal" });
		}
		if self.num_dias_agenda > NUM_DIAS_AGENDA_MAX {
			return Err(ValidationError::OutOfRange {
				field: "numDiasAgenda",
				min: 0,
				max: NUM_DIAS_AGENDA_MAX.into(),
			});
		}

		self.pagador.validate_as(&PAYER_FIELDS)?;

		if let Some(beneficiary) = &self.beneficiario_final {
			beneficiary.validate_as(&BENEFICIARY_FIELDS)?;
		}

		Ok(())
	}
}

/// Builder for [`IssueChargeRequest`].
#[derive(Clone, Debug, Default)]
pub struct IssueChargeRequestBuilder {
	seu_numero: Option<String>,
	valor_nominal: Option<Decimal>,
	data_vencimento: Option<Date>,
	num_dias_agenda: u8,
	pagador: Option<Person>,
	desconto: Option<Discount>,
	multa: Option<Fine>,
	mora: Option<Interest>,
	mensagem: Option<Message>,
	beneficiario_final: Option<Person>,
	formas_recebimento: Vec<ReceiptMethod>,
}
impl IssueChargeRequestBuilder {
	/// Sets the caller's own reference (1 to 15 characters).
	pub fn seu_numero(mut self, value: impl Into<String>) -> Self {
		self.seu_numero = Some(value.into());

		self
	}

	/// Sets the face value; must be positive.
	pub fn valor_nominal(mut self, value: Decimal) -> Self {
		self.valor_nominal = Some(value);

		self
	}

	/// Sets the due date.
	pub fn data_vencimento(mut self, date: Date) -> Self {
		self.data_vencimento = Some(date);

		self
	}

	/// Sets how many days after the due date payment is still accepted (0 to 60).
	pub fn num_dias_agenda(mut self, days: u8) -> Self {
		self.num_dias_agenda = days;

		self
	}

	/// Sets the payer.
	pub fn pagador(mut self, person: Person) -> Self {
		self.pagador = Some(person);

		self
	}

	/// Sets the early-payment discount.
	pub fn desconto(mut self, discount: Discount) -> Self {
		self.desconto = Some(discount);

		self
	}

	/// Sets the late-payment fine.
	pub fn multa(mut self, fine: Fine) -> Self {
		self.multa = Some(fine);

		self
	}

	/// Sets the late-payment interest.
	pub fn mora(mut self, interest: Interest) -> Self {
		self.mora = Some(interest);

		self
	}

	/// Sets the slip message.
	pub fn mensagem(mut self, message: Message) -> Self {
		self.mensagem = Some(message);

		self
	}

	/// Sets the final beneficiary.
	pub fn beneficiario_final(mut self, person: Person) -> Self {
		self.beneficiario_final = Some(person);

		self
	}

	/// Adds an accepted payment method.
	pub fn forma_recebimento(mut self, method: ReceiptMethod) -> Self {
		if !self.formas_recebimento.contains(&method) {
			self.formas_recebimento.push(method);
		}

		self
	}

	/// Consumes the builder and validates the resulting request.
	pub fn build(self) -> Result<IssueChargeRequest, ValidationError> {
		let request = IssueChargeRequest {
			seu_numero: self.seu_numero.ok_or(ValidationError::MissingField { field: "seuNumero" })?,
			valor_nominal: self
				.valor_nominal
				.ok_or(ValidationError::MissingField { field: "valorNominal" })?,
			data_vencimento: self
				.data_vencimento
				.ok_or(ValidationError::MissingField { field: "dataVencimento" })?,
			num_dias_agenda: self.num_dias_agenda,
			pagador: self.pagador.ok_or(ValidationError::MissingField { field: "pagador" })?,
			desconto: self.desconto,
			multa: self.multa,
			mora: self.mora,
			mensagem: self.mensagem,
			beneficiario_final: self.beneficiario_final,
			formas_recebimento: self.formas_recebimento,
		};

		request.validate()?;

		Ok(request)
	}
}

/// Body answered by a successful issuance.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueChargeResponse {
	#[serde(default)]
	pub(crate) codigo_solicitacao: Option<String>,
}

/// Lifecycle state of a charge (`situacao`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
	/// Paid.
	Recebido,
	/// Awaiting payment.
	AReceber,
	/// Manually marked as paid.
	MarcadoRecebido,
	/// Overdue.
	Atrasado,
	/// Cancelled.
	Cancelado,
	/// Expired without payment.
	Expirado,
	/// Issuance failed.
	FalhaEmissao,
	/// Issuance still processing.
	EmProcessamento,
	/// Sent to protest.
	Protesto,
	/// Any status this crate does not know yet.
	#[serde(other)]
	Unknown,
}

/// Charge record returned by the query endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
	/// Provider-assigned identifier.
	#[serde(default)]
	pub codigo_solicitacao: Option<RequestCode>,
	/// Caller's own reference.
	pub seu_numero: String,
	/// Issuance date.
	#[serde(default, with = "iso_date::option")]
	pub data_emissao: Option<Date>,
	/// Due date.
	#[serde(with = "iso_date")]
	pub data_vencimento: Date,
	/// Face value.
	#[serde(with = "rust_decimal::serde::float")]
	pub valor_nominal: Decimal,
	/// Charge type, e.g. `SIMPLES`.
	#[serde(default)]
	pub tipo_cobranca: Option<String>,
	/// Current lifecycle state.
	pub situacao: ChargeStatus,
	/// Date the current state was reached.
	#[serde(default, with = "iso_date::option")]
	pub data_situacao: Option<Date>,
	/// Whether the charge was archived.
	#[serde(default)]
	pub arquivada: bool,
	/// Discounts applied.
	#[serde(default)]
	pub descontos: Vec<Discount>,
	/// Late-payment fine.
	#[serde(default)]
	pub multa: Option<Fine>,
	/// Late-payment interest.
	#[serde(default)]
	pub mora: Option<Interest>,
	/// Payer.
	pub pagador: Person,
	/// Total amount received so far.
	#[serde(default, with = "rust_decimal::serde::float_option")]
	pub valor_total_recebido: Option<Decimal>,
}

/// Bank slip details of a charge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Boleto {
	/// Bank-assigned slip number.
	#[serde(default)]
	pub nosso_numero: String,
	/// Barcode digits.
	#[serde(default)]
	pub codigo_barras: String,
	/// Typeable line.
	#[serde(default)]
	pub linha_digitavel: String,
}

/// PIX details of a charge.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pix {
	/// PIX transaction id.
	#[serde(default)]
	pub txid: String,
	/// Copy-and-paste payload.
	#[serde(default)]
	pub pix_copia_e_cola: String,
}

/// Body answered by `GET /cobranca/v3/cobrancas/{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChargeDetails {
	/// Charge record.
	pub cobranca: Charge,
	/// Bank slip details, when issued.
	#[serde(default)]
	pub boleto: Option<Boleto>,
	/// PIX details, when issued.
	#[serde(default)]
	pub pix: Option<Pix>,
}

/// Decoded PDF rendition of a charge.
#[derive(Clone, PartialEq, Eq)]
pub struct ChargePdf(Vec<u8>);
impl ChargePdf {
	/// Decodes the base64 payload returned by the API.
	pub fn from_base64(encoded: &str) -> Result<Self, base64::DecodeError> {
		Ok(Self(STANDARD.decode(encoded.trim())?))
	}

	/// Raw PDF bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	/// Consumes the wrapper and returns the raw bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.0
	}

	/// Size in bytes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` for an empty document.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for ChargePdf {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ChargePdf").field(&format_args!("{} bytes", self.0.len())).finish()
	}
}

#[derive(Debug, Deserialize)]
pub(crate) struct PdfResponse {
	pub(crate) pdf: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CancelChargeRequest<'a> {
	pub(crate) motivo_cancelamento: &'a str,
}
