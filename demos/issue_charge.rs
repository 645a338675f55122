//! Issues a charge, reads it back, and downloads its PDF against a local mock of the charges API.
//!
//! Against the real sandbox, replace the mock with `Environment::Sandbox`, load the certificate
//! pair through `ClientIdentity::from_pem_files`, and build the client with `ReqwestInterClient::connect`.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use rust_decimal::Decimal;
use time::macros::date;
use url::Url;
// self
use inter_cobranca::{
	auth::{CHARGE_READ, CHARGE_WRITE},
	client::ReqwestInterClient,
	config::{ClientConfig, DEFAULT_TOKEN_PATH, Environment},
	http::ReqwestTransport,
	model::{IssueChargeRequest, Person, PersonKind, ReceiptMethod},
};

const CODE: &str = "0b7c1e52-9a7d-4a5e-b3f1-2d6c8e4f0a19";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path(DEFAULT_TOKEN_PATH);
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"access_token\":\"demo-token\",\"token_type\":\"Bearer\",\"expires_in\":3600,\"scope\":\"{CHARGE_READ} {CHARGE_WRITE}\"}}"
			));
		})
		.await;
	let _issue_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/cobranca/v3/cobrancas");
			then.status(200)
				.header("content-type", "application/json")
				.body(format!("{{\"codigoSolicitacao\":\"{CODE}\"}}"));
		})
		.await;
	let _query_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/cobranca/v3/cobrancas/{CODE}"));
			then.status(200).header("content-type", "application/json").body(format!(
				"{{\"cobranca\":{{\"codigoSolicitacao\":\"{CODE}\",\"seuNumero\":\"DEMO-1\",\"dataVencimento\":\"2026-12-01\",\"valorNominal\":89.9,\"situacao\":\"A_RECEBER\",\"pagador\":{{\"cpfCnpj\":\"12345678909\",\"tipoPessoa\":\"FISICA\",\"nome\":\"Joana Souza\"}}}}}}"
			));
		})
		.await;
	let _pdf_mock = server
		.mock_async(|when, then| {
			when.method(GET).path(format!("/cobranca/v3/cobrancas/{CODE}/pdf"));
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"pdf\":\"JVBERi0xLjQKJcOkw7zDtsOf\"}");
		})
		.await;
	let mut base_url = Url::parse(&server.base_url())?;

	base_url.set_scheme("https").map_err(|_| color_eyre::eyre::eyre!("Mock URL rejected https."))?;
	base_url.set_host(Some("localhost"))?;

	let config = ClientConfig::builder(Environment::Custom(base_url))
		.client_id("demo-client")
		.client_secret("demo-secret")
		.build()?;
	// The mock server presents a self-signed certificate; the sandbox needs none of this.
	let http_client = inter_cobranca::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.redirect(inter_cobranca::reqwest::redirect::Policy::none())
		.build()?;
	let client =
		ReqwestInterClient::with_transport(config, ReqwestTransport::with_client(http_client))?;
	let payer = Person::new(PersonKind::Fisica, "12345678909", "Joana Souza")
		.address("Rua das Flores", "Belo Horizonte", "MG", "30110000")
		.email("joana@example.com");
	let request = IssueChargeRequest::builder()
		.seu_numero("DEMO-1")
		.valor_nominal(Decimal::new(8990, 2))
		.data_vencimento(date!(2026 - 12 - 01))
		.pagador(payer)
		.forma_recebimento(ReceiptMethod::Boleto)
		.forma_recebimento(ReceiptMethod::Pix)
		.build()?;
	let code = client.issue_charge(&request).await?;
	let details = client.query_charge(&code).await?;
	let pdf = client.fetch_pdf(&code).await?;

	println!("Issued charge {code} with status {:?}.", details.cobranca.situacao);
	println!("Downloaded {} PDF bytes.", pdf.len());
	println!("Token exchanges: {}.", client.token_metrics().exchanges());

	token_mock.assert_calls_async(1).await;

	Ok(())
}
