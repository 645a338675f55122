//! Payer and final beneficiary records.

// self
use crate::{_prelude::*, error::ValidationError};

/// Legal nature of a person.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonKind {
	/// Natural person, identified by CPF.
	Fisica,
	/// Legal entity, identified by CNPJ.
	Juridica,
}

/// Person referenced by a charge (`pagador`, `beneficiarioFinal`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
	/// CPF or CNPJ, digits only.
	#[serde(default)]
	pub cpf_cnpj: String,
	/// Legal nature.
	pub tipo_pessoa: PersonKind,
	/// Full name or company name.
	#[serde(default)]
	pub nome: String,
	/// Street address.
	#[serde(default)]
	pub endereco: String,
	/// Street number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub numero: Option<String>,
	/// Address complement.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub complemento: Option<String>,
	/// Neighborhood.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bairro: Option<String>,
	/// City.
	#[serde(default)]
	pub cidade: String,
	/// Two-letter state code.
	#[serde(default)]
	pub uf: String,
	/// Postal code, digits only.
	#[serde(default)]
	pub cep: String,
	/// Contact e-mail.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	/// Phone area code.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ddd: Option<String>,
	/// Phone number.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub telefone: Option<String>,
}
impl Person {
	/// Creates a person with the identifying fields; the address is filled in through the
	/// chained setters.
	pub fn new(kind: PersonKind, cpf_cnpj: impl Into<String>, nome: impl Into<String>) -> Self {
		Self {
			cpf_cnpj: cpf_cnpj.into(),
			tipo_pessoa: kind,
			nome: nome.into(),
			endereco: String::new(),
			numero: None,
			complemento: None,
			bairro: None,
			cidade: String::new(),
			uf: String::new(),
			cep: String::new(),
			email: None,
			ddd: None,
			telefone: None,
		}
	}

	/// Sets the mandatory address fields.
	pub fn address(
		mut self,
		endereco: impl Into<String>,
		cidade: impl Into<String>,
		uf: impl Into<String>,
		cep: impl Into<String>,
	) -> Self {
		self.endereco = endereco.into();
		self.cidade = cidade.into();
		self.uf = uf.into();
		self.cep = cep.into();

		self
	}

	/// Sets the street number.
	pub fn numero(mut self, numero: impl Into<String>) -> Self {
		self.numero = Some(numero.into());

		self
	}

	/// Sets the address complement.
	pub fn complemento(mut self, complemento: impl Into<String>) -> Self {
		self.complemento = Some(complemento.into());

		self
	}

	/// Sets the neighborhood.
	pub fn bairro(mut self, bairro: impl Into<String>) -> Self {
		self.bairro = Some(bairro.into());

		self
	}

	/// Sets the contact e-mail.
	pub fn email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());

		self
	}

	/// Sets the contact phone.
	pub fn telefone(mut self, ddd: impl Into<String>, telefone: impl Into<String>) -> Self {
		self.ddd = Some(ddd.into());
		self.telefone = Some(telefone.into());

		self
	}

	/// Checks the mandatory fields, reporting them under `names`
	/// (`cpfCnpj`, `nome`, `endereco`, `cidade`, `uf`, `cep`, in that order).
	pub(crate) fn validate_as(&self, names: &[&'static str; 6]) -> Result<(), ValidationError> {
		let required =
			[&self.cpf_cnpj, &self.nome, &self.endereco, &self.cidade, &self.uf, &self.cep];

		for (value, field) in required.into_iter().zip(names) {
			if value.trim().is_empty() {
				return Err(ValidationError::MissingField { field: *field });
			}
		}

		Ok(())
	}
}

pub(crate) const PAYER_FIELDS: [&str; 6] = [
	"pagador.cpfCnpj",
	"pagador.nome",
	"pagador.endereco",
	"pagador.cidade",
	"pagador.uf",
	"pagador.cep",
];
pub(crate) const BENEFICIARY_FIELDS: [&str; 6] = [
	"beneficiarioFinal.cpfCnpj",
	"beneficiarioFinal.nome",
	"beneficiarioFinal.endereco",
	"beneficiarioFinal.cidade",
	"beneficiarioFinal.uf",
	"beneficiarioFinal.cep",
];
