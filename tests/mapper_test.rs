use std::sync::{Arc, Once};

use billing_gateway::clients::{InvoiceFilter, ResourceClient};
use billing_gateway::config::ApiConfig;
use billing_gateway::framework::codec::{decode, FieldValue, ValueKind};
use billing_gateway::framework::mock::MockTransport;
use billing_gateway::framework::{from_xml, to_xml, Error, ErrorKind, Resource, ResourceMapper};
use billing_gateway::lifecycle::{setup_tracing, BillingSystem};
use billing_gateway::model::{Invoice, InvoiceComment, InvoicePayment, InvoiceStatus, Settings, User};
use chrono::NaiveDate;

const API_KEY: &str = "0123456789ABCDEF0123456789abcdef";

static TRACING: Once = Once::new();

fn system(mock: &MockTransport) -> BillingSystem {
    TRACING.call_once(setup_tracing);
    let config = ApiConfig::new("acme", API_KEY).expect("Failed to build config");
    BillingSystem::with_transport(config, Arc::new(mock.clone()))
}

fn invoice_entries(ids: std::ops::Range<i64>) -> String {
    ids.map(|id| format!(r#"<invoice><id type="integer">{id}</id><client_id type="integer">5</client_id></invoice>"#))
        .collect()
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn test_writable_fields_survive_round_trip() {
    let mut invoice = Invoice::new(5);
    invoice.transaction.intro = Some("Thanks for your order".into());
    invoice.transaction.currency_code = Some("EUR".into());
    invoice.numbered.number_pre = Some("RE".into());
    invoice.discount_rate = Some(2.5);
    invoice.due_date = NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

    let xml = to_xml("invoice", &invoice).expect("Failed to serialize");
    let decoded: Invoice = from_xml(&xml).expect("Failed to parse");
    assert_eq!(decoded, invoice);
}

#[test]
fn test_outgoing_type_tags() {
    let mut invoice = Invoice::new(5);
    invoice.transaction.intro = Some("Hello".into());
    invoice.discount_rate = Some(3.0);
    invoice.due_date = NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(0, 0, 0));

    let xml = to_xml("invoice", &invoice).unwrap();

    let client_id = xml.child("client_id").unwrap();
    assert_eq!(client_id.attribute("type"), Some("integer"));
    assert_eq!(client_id.text(), "5");

    assert_eq!(xml.child("discount_rate").unwrap().attribute("type"), Some("float"));

    let due_date = xml.child("due_date").unwrap();
    assert_eq!(due_date.attribute("type"), Some("datetime"));
    assert_eq!(due_date.text(), "2024-03-01T00:00:00");

    assert_eq!(xml.child("intro").unwrap().attribute("type"), None);

    // read-only and absent fields are never sent
    assert!(xml.child("id").is_none());
    assert!(xml.child("status").is_none());
    assert!(xml.child("note").is_none());
}

#[test]
fn test_bool_and_mismatched_tags() {
    assert_eq!(decode("flag", "1", None, ValueKind::Bool).unwrap(), Some(FieldValue::Bool(true)));
    assert_eq!(decode("flag", "0", Some("bool"), ValueKind::Bool).unwrap(), Some(FieldValue::Bool(false)));

    let err = decode("flag", "1", Some("integer"), ValueKind::Bool).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = decode("client_id", "5", None, ValueKind::Int).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    assert_eq!(decode("due_date", "", Some("datetime"), ValueKind::OptDateTime).unwrap(), None);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_credentials_are_validated_on_assignment() {
    let err = ApiConfig::new("Acme", API_KEY).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let err = ApiConfig::new("acme", "not-a-key").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);

    let config = ApiConfig::new("acme", API_KEY).unwrap();
    assert_eq!(config.api_key(), API_KEY.to_ascii_lowercase());
    assert_eq!(config.base_url(), "https://acme.billomat.net/api/");
}

// =============================================================================
// CRUD through the mock transport
// =============================================================================

#[tokio::test]
async fn test_find_all_walks_every_page() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices")
        .with_query("page", "1")
        .return_xml(&format!(r#"<invoices total="250">{}</invoices>"#, invoice_entries(1..101)));
    mock.expect_get("invoices")
        .with_query("page", "2")
        .return_xml(&format!(r#"<invoices total="250">{}</invoices>"#, invoice_entries(101..201)));
    mock.expect_get("invoices")
        .with_query("page", "3")
        .return_xml(&format!(r#"<invoices total="250">{}</invoices>"#, invoice_entries(201..251)));

    let invoices = system
        .invoices
        .find_all(&InvoiceFilter::default())
        .await
        .expect("Failed to list invoices");

    assert_eq!(invoices.len(), 250);
    assert_eq!(invoices.first().map(|i| i.id()), Some(1));
    assert_eq!(invoices.last().map(|i| i.id()), Some(250));

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| r.query_value("per_page") == Some("100")));
    mock.verify();
}

#[tokio::test]
async fn test_small_page_size_places_items_in_order() {
    TRACING.call_once(setup_tracing);
    let mock = MockTransport::new();
    let mut config = ApiConfig::new("acme", API_KEY).expect("Failed to build config");
    config.set_page_size(2).expect("Failed to set page size");
    let system = BillingSystem::with_transport(config, Arc::new(mock.clone()));

    for (page, ids) in [("1", 1..3), ("2", 3..5), ("3", 5..6)] {
        mock.expect_get("invoices")
            .with_query("page", page)
            .return_xml(&format!(r#"<invoices total="5">{}</invoices>"#, invoice_entries(ids)));
    }

    let invoices = system
        .invoices
        .find_all(&InvoiceFilter::default())
        .await
        .expect("Failed to list invoices");

    let ids: Vec<i64> = invoices.iter().map(|i| i.id()).collect();
    assert_eq!(ids, [1, 2, 3, 4, 5]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    let pages: Vec<_> = requests.iter().map(|r| r.query_value("page")).collect();
    assert_eq!(pages, [Some("1"), Some("2"), Some("3")]);
    assert!(requests.iter().all(|r| r.query_value("per_page") == Some("2")));
    mock.verify();
}

#[tokio::test]
async fn test_short_page_truncates_listing() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices")
        .with_query("page", "1")
        .return_xml(&format!(r#"<invoices total="250">{}</invoices>"#, invoice_entries(1..41)));

    let invoices = system.invoices.find_all(&InvoiceFilter::default()).await.unwrap();
    assert_eq!(invoices.len(), 40);
    assert_eq!(mock.requests().len(), 1);
    mock.verify();
}

#[tokio::test]
async fn test_empty_listing() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("invoices").return_xml(r#"<invoices total="0"/>"#);

    let invoices = system.invoices.find_all(&InvoiceFilter::default()).await.unwrap();
    assert!(invoices.is_empty());

    mock.expect_get("invoices").return_xml(r#"<invoices total="0"/>"#);
    assert!(system.invoices.list().await.unwrap().is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_listing_needs_plural_root_and_total() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices").return_xml("<maintenance><note>down</note></maintenance>");
    mock.expect_get("invoices").return_xml(&format!(r#"<offers total="1">{}</offers>"#, invoice_entries(1..2)));
    mock.expect_get("invoices").return_xml(&format!("<invoices>{}</invoices>", invoice_entries(1..2)));

    let err = system.invoices.find_all(&InvoiceFilter::default()).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed { status: None, .. }));
    assert!(err.to_string().contains("<maintenance>"));

    let err = system.invoices.find_all(&InvoiceFilter::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert!(err.to_string().contains("expected <invoices>"));

    let err = system.invoices.find_all(&InvoiceFilter::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert!(err.to_string().contains("total"));
    mock.verify();
}

#[tokio::test]
async fn test_single_answers_need_singular_root() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices/5").return_xml(r#"<client><id type="integer">5</id></client>"#);
    mock.expect_post("invoices").return_xml(r#"<invoices total="0"/>"#);

    let err = system.invoices.find(5).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert!(err.to_string().contains("expected <invoice>"));

    let mut invoice = Invoice::new(5);
    let err = system.invoices.create(&mut invoice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestFailed);
    assert_eq!(invoice.id(), 0);
    mock.verify();
}

#[tokio::test]
async fn test_non_finite_amount_is_never_sent() {
    let mock = MockTransport::new();
    let system = system(&mock);

    let mut invoice = Invoice::new(5);
    invoice.discount_rate = Some(f64::NAN);
    let err = system.invoices.create(&mut invoice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueConversion);

    invoice.discount_rate = Some(f64::INFINITY);
    let err = system.invoices.update(&invoice).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueConversion);

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_create_copies_server_fields_back() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_post("invoices").return_xml(
        r#"<invoice>
            <id type="integer">77</id>
            <created type="datetime">2024-03-01T10:00:00+01:00</created>
            <client_id type="integer">5</client_id>
            <invoice_number>RE77</invoice_number>
            <status>DRAFT</status>
            <total_gross type="float">119.0</total_gross>
            <total_net type="float">100.0</total_net>
        </invoice>"#,
    );

    let mut invoice = Invoice::new(5);
    let created = system.invoices.create(&mut invoice).await.expect("Failed to create invoice");

    assert_eq!(created.id(), 77);
    assert_eq!(invoice.id(), 77);
    assert_eq!(invoice.invoice_number(), Some("RE77"));
    assert_eq!(invoice.status(), Some(InvoiceStatus::Draft));
    assert_eq!(invoice.transaction.total_gross(), 119.0);
    assert_eq!(invoice.transaction.total_net(), 100.0);
    assert_eq!(
        invoice.meta().created(),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
    );

    let body = mock.requests()[0].body_xml().expect("Request body is not XML");
    assert_eq!(body.name(), "invoice");
    assert_eq!(body.child_text("client_id"), Some("5"));
    assert!(body.child("id").is_none());
    mock.verify();
}

#[tokio::test]
async fn test_create_checks_mandatory_fields_first() {
    let mock = MockTransport::new();
    let system = system(&mock);

    let err = system.invoices.create(&mut Invoice::default()).await.unwrap_err();
    assert!(matches!(err, Error::MissingField("client_id")));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_permissions_are_checked_before_any_request() {
    let mock = MockTransport::new();
    let system = system(&mock);

    let err = system
        .invoice_comments
        .update(&InvoiceComment::new(7, "Called the customer"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotPermitted);

    let err = system.invoice_payments.update(&InvoicePayment::new(7, 10.0)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotPermitted);

    let err = system.users.create(&mut User::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotPermitted);
    assert!(err.to_string().contains("does not allow create"));

    let err = system.users.delete_by_id(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotPermitted);

    let users = ResourceMapper::<User>::new(system.connection().clone());
    let err = users.update_singleton(&User::default()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OperationNotPermitted);

    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_singleton_update_has_no_id_in_path() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_put("settings").return_status(200, "");

    let settings = ResourceMapper::<Settings>::new(system.connection().clone());
    settings
        .update_singleton(&Settings::default())
        .await
        .expect("Failed to update settings");

    let request = &mock.requests()[0];
    assert_eq!(request.path, "settings");
    assert_eq!(request.body_xml().unwrap().name(), "settings");
    mock.verify();
}

#[tokio::test]
async fn test_error_statuses_are_mapped() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices/9")
        .return_status(404, "<errors><error>Resource not found!</error></errors>");
    mock.expect_get("invoices/10").return_status(401, "");
    mock.expect_get("invoices/11")
        .return_status(500, "<errors><error>Internal error</error></errors>");
    mock.expect_get("invoices/12").return_transport_error("connection refused");

    let err = system.invoices.find(9).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Resource not found!");

    let err = system.invoices.find(10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let err = system.invoices.find(11).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed { status: Some(500), .. }));

    let err = system.invoices.find(12).await.unwrap_err();
    assert!(matches!(err, Error::RequestFailed { status: None, .. }));
    mock.verify();
}

#[tokio::test]
async fn test_delete_reports_rejection_as_false() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_delete("invoices/7").return_status(200, "");
    mock.expect_delete("invoices/8")
        .return_status(400, "<errors><error>Invoice is locked</error></errors>");
    mock.expect_delete("invoices/9").return_status(401, "");

    assert!(system.invoices.delete_by_id(7).await.unwrap());
    assert!(!system.invoices.delete_by_id(8).await.unwrap());

    // authorization problems still surface
    let err = system.invoices.delete_by_id(9).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    mock.verify();
}

#[tokio::test]
async fn test_requests_carry_api_key_header() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("invoices/7").return_xml(r#"<invoice><id type="integer">7</id></invoice>"#);

    let invoice = system.invoices.find(7).await.unwrap();
    assert_eq!(invoice.id(), 7);

    let request = &mock.requests()[0];
    assert_eq!(request.header("X-ApiKey"), Some(API_KEY.to_ascii_lowercase().as_str()));
    mock.verify();
}
