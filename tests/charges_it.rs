// crates.io
use rust_decimal::Decimal;
use time::macros::date;
// self
use inter_cobranca::{
	_preludet::*,
	auth::{CHARGE_READ, CHARGE_WRITE, RequestCode},
	config::DEFAULT_TOKEN_PATH,
	error::ValidationError,
	model::{ChargeStatus, IssueChargeRequest, Person, PersonKind},
};

const CHARGES: &str = "/cobranca/v3/cobrancas";
const CODE: &str = "8c5e7a0c-0a3b-4c89-9f3e-7d3f2b1f0c11";

fn payer() -> Person {
	Person::new(PersonKind::Fisica, "12345678909", "Maria Silva").address(
		"Avenida Paulista",
		"Sao Paulo",
		"SP",
		"01310100",
	)
}

fn issue_request() -> IssueChargeRequest {
	IssueChargeRequest::builder()
		.seu_numero("INV-2026-001")
		.valor_nominal(Decimal::new(15075, 2))
		.data_vencimento(date!(2026 - 11 - 30))
		.pagador(payer())
		.build()
		.expect("Charge request should build.")
}

fn code() -> RequestCode {
	RequestCode::new(CODE).expect("Request code should be valid.")
}

fn both_scopes() -> String {
	format!("{CHARGE_READ} {CHARGE_WRITE}")
}

fn charge_details_body() -> String {
	serde_json::json!({
		"cobranca": {
			"codigoSolicitacao": CODE,
			"seuNumero": "INV-2026-001",
			"dataEmissao": "2026-10-15",
			"dataVencimento": "2026-11-30",
			"valorNominal": 150.75,
			"tipoCobranca": "SIMPLES",
			"situacao": "A_RECEBER",
			"dataSituacao": "2026-10-15",
			"arquivada": false,
			"pagador": {
				"cpfCnpj": "12345678909",
				"tipoPessoa": "FISICA",
				"nome": "Maria Silva",
				"endereco": "Avenida Paulista",
				"cidade": "Sao Paulo",
				"uf": "SP",
				"cep": "01310100"
			}
		},
		"boleto": {
			"nossoNumero": "00123456789",
			"codigoBarras": "07791000000000150750001112345678900000000001",
			"linhaDigitavel": "07790001161234567890100000000017100000000015075"
		},
		"pix": {
			"txid": "txid-123",
			"pixCopiaECola": "00020101021226"
		}
	})
	.to_string()
}

#[tokio::test]
async fn issue_charge_posts_payload_and_returns_code() {
	let (client, transport) = scripted_client();

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(
		Method::POST,
		CHARGES,
		200,
		serde_json::json!({ "codigoSolicitacao": CODE }).to_string(),
	);

	let issued =
		client.issue_charge(&issue_request()).await.expect("Charge issuance should succeed.");

	assert_eq!(issued.as_str(), CODE);

	let exchange = &transport.requests_to(Method::POST, DEFAULT_TOKEN_PATH)[0];
	let form = exchange.form();

	assert_eq!(form.get("grant_type").map(String::as_str), Some("client_credentials"));
	assert_eq!(form.get("client_id").map(String::as_str), Some(TEST_CLIENT_ID));
	assert_eq!(form.get("scope").map(String::as_str), Some(CHARGE_WRITE));

	let call = &transport.requests_to(Method::POST, CHARGES)[0];
	let body = call.json();

	assert_eq!(call.header("authorization"), Some("Bearer write-token"));
	assert_eq!(call.header("content-type"), Some("application/json"));
	assert_eq!(call.header("x-conta-corrente"), None);
	assert_eq!(body["seuNumero"], "INV-2026-001");
	assert_eq!(body["valorNominal"], serde_json::json!(150.75));
	assert_eq!(body["dataVencimento"], "2026-11-30");
	assert_eq!(body["numDiasAgenda"], 0);
	assert_eq!(body["pagador"]["tipoPessoa"], "FISICA");
}

#[tokio::test]
async fn invalid_charge_never_reaches_the_network() {
	let (client, transport) = scripted_client();
	let mut request = issue_request();

	request.valor_nominal = Decimal::ZERO;

	let err = client.issue_charge(&request).await.expect_err("Zero amount should be rejected.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::NonPositiveAmount { field: "valorNominal" })
	));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn issue_charge_without_code_is_an_invalid_response() {
	let (client, transport) = scripted_client();

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(Method::POST, CHARGES, 200, "{}");

	let err = client
		.issue_charge(&issue_request())
		.await
		.expect_err("Missing codigoSolicitacao should fail.");

	assert!(matches!(err, Error::InvalidResponse { status: 200, .. }));
}

#[tokio::test]
async fn query_charge_decodes_details() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 200, charge_details_body());

	let details = client.query_charge(&code()).await.expect("Charge query should succeed.");

	assert_eq!(details.cobranca.situacao, ChargeStatus::AReceber);
	assert_eq!(details.cobranca.valor_nominal, Decimal::new(15075, 2));
	assert_eq!(details.cobranca.data_vencimento, date!(2026 - 11 - 30));
	assert_eq!(details.cobranca.codigo_solicitacao, Some(code()));
	assert_eq!(details.boleto.map(|boleto| boleto.nosso_numero).as_deref(), Some("00123456789"));
	assert_eq!(details.pix.map(|pix| pix.txid).as_deref(), Some("txid-123"));

	let exchange = &transport.requests_to(Method::POST, DEFAULT_TOKEN_PATH)[0];

	assert_eq!(exchange.form().get("scope").map(String::as_str), Some(CHARGE_READ));
}

#[tokio::test]
async fn malformed_charge_body_is_a_decode_error() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 200, "{\"cobranca\":{\"seuNumero\":42}}");

	let err = client.query_charge(&code()).await.expect_err("Malformed body should fail.");

	match err {
		Error::Decode { status, source } => {
			assert_eq!(status, 200);
			assert_eq!(source.path().to_string(), "cobranca.seuNumero");
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn not_found_is_a_domain_error_without_retry() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 404, "{\"title\":\"Cobranca nao encontrada\"}");

	let err = client.query_charge(&code()).await.expect_err("Unknown charge should fail.");

	assert!(matches!(err, Error::Domain { status: 404, ref body } if body.contains("nao encontrada")));
	assert_eq!(transport.hits(Method::GET, &path), 1);
}

#[tokio::test]
async fn transport_faults_are_retried_until_success() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.fault(Method::GET, &path);
	transport.fault(Method::GET, &path);
	transport.reply(Method::GET, &path, 200, charge_details_body());

	client.query_charge(&code()).await.expect("Third attempt should succeed.");

	assert_eq!(transport.hits(Method::GET, &path), 3);
	assert_eq!(transport.hits(Method::POST, DEFAULT_TOKEN_PATH), 1);
}

#[tokio::test]
async fn unauthorized_call_reauthenticates_once() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("revoked-token", 3600, CHARGE_READ);
	transport.token("fresh-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 401, "");
	transport.reply(Method::GET, &path, 200, charge_details_body());

	client.query_charge(&code()).await.expect("Call should succeed after re-authentication.");

	let calls = transport.requests_to(Method::GET, &path);

	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].header("authorization"), Some("Bearer revoked-token"));
	assert_eq!(calls[1].header("authorization"), Some("Bearer fresh-token"));
	assert_eq!(transport.hits(Method::POST, DEFAULT_TOKEN_PATH), 2);
	assert_eq!(client.token_metrics().invalidations(), 1);
}

#[tokio::test]
async fn persistent_unauthorized_surfaces_after_one_reauthentication() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 401, "");

	let err = client.query_charge(&code()).await.expect_err("Persistent 401 should surface.");

	assert!(err.is_unauthorized());
	assert_eq!(transport.hits(Method::GET, &path), 2);
	assert_eq!(transport.hits(Method::POST, DEFAULT_TOKEN_PATH), 2);
}

#[tokio::test]
async fn unauthorized_is_returned_as_is_when_reauthentication_is_disabled() {
	let base_url = Url::parse(TEST_BASE_URL).expect("Test base URL should parse.");
	let config = test_config_builder(base_url)
		.reauthenticate_on_unauthorized(false)
		.build()
		.expect("Configuration should build.");
	let (client, transport) = scripted_client_with(config);
	let path = format!("{CHARGES}/{CODE}");

	transport.token("token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 401, "");

	let err = client.query_charge(&code()).await.expect_err("401 should surface.");

	assert!(err.is_unauthorized());
	assert_eq!(transport.hits(Method::GET, &path), 1);
}

#[tokio::test]
async fn cached_token_serves_later_operations() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}");

	transport.token("shared-token", 3600, &both_scopes());
	transport.reply(Method::GET, &path, 200, charge_details_body());
	transport.reply(
		Method::POST,
		CHARGES,
		200,
		serde_json::json!({ "codigoSolicitacao": CODE }).to_string(),
	);

	client.query_charge(&code()).await.expect("Query should succeed.");
	client.issue_charge(&issue_request()).await.expect("Issuance should succeed.");
	client.query_charge(&code()).await.expect("Second query should succeed.");

	assert_eq!(transport.hits(Method::POST, DEFAULT_TOKEN_PATH), 1);
	assert_eq!(client.token_metrics().hits(), 2);
}

#[tokio::test]
async fn fetch_pdf_decodes_base64_payload() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}/pdf");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 200, "{\"pdf\":\"JVBERi0xLjQ=\"}");

	let pdf = client.fetch_pdf(&code()).await.expect("PDF download should succeed.");

	assert_eq!(pdf.as_bytes(), b"%PDF-1.4");
}

#[tokio::test]
async fn fetch_pdf_rejects_invalid_base64() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}/pdf");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 200, "{\"pdf\":\"not base64!\"}");

	let err = client.fetch_pdf(&code()).await.expect_err("Invalid base64 should fail.");

	assert!(matches!(err, Error::InvalidResponse { status: 200, .. }));
}

#[tokio::test]
async fn cancel_charge_patches_with_reason() {
	let (client, transport) = scripted_client();
	let path = format!("{CHARGES}/{CODE}/cancelar");

	transport.token("write-token", 3600, CHARGE_WRITE);
	transport.reply(Method::PATCH, &path, 202, "");

	client.cancel_charge(&code(), " ACERTOS ").await.expect("Cancellation should succeed.");

	let call = &transport.requests_to(Method::PATCH, &path)[0];

	assert_eq!(call.json(), serde_json::json!({ "motivoCancelamento": "ACERTOS" }));
}

#[tokio::test]
async fn cancel_charge_requires_a_reason() {
	let (client, transport) = scripted_client();
	let err = client.cancel_charge(&code(), "   ").await.expect_err("Blank reason should fail.");

	assert!(matches!(
		err,
		Error::Validation(ValidationError::MissingField { field: "motivoCancelamento" })
	));
	assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn configured_account_is_sent_on_every_call() {
	let base_url = Url::parse(TEST_BASE_URL).expect("Test base URL should parse.");
	let config = test_config_builder(base_url)
		.account("123456789")
		.build()
		.expect("Configuration should build.");
	let (client, transport) = scripted_client_with(config);
	let path = format!("{CHARGES}/{CODE}/pdf");

	transport.token("read-token", 3600, CHARGE_READ);
	transport.reply(Method::GET, &path, 200, "{\"pdf\":\"JVBERi0xLjQ=\"}");

	client.fetch_pdf(&code()).await.expect("PDF download should succeed.");

	assert_eq!(
		transport.requests_to(Method::GET, &path)[0].header("x-conta-corrente"),
		Some("123456789")
	);
}
