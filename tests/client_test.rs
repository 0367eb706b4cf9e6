use std::sync::Arc;

use billing_gateway::clients::{InvoiceFilter, OfferFilter, ResourceClient, TransactionClient};
use billing_gateway::config::ApiConfig;
use billing_gateway::framework::mock::MockTransport;
use billing_gateway::framework::{ErrorKind, Resource};
use billing_gateway::lifecycle::BillingSystem;
use billing_gateway::model::{EmailMessage, InvoicePayment, InvoiceStatus, OfferStatus, ThumbType};
use chrono::NaiveDate;

const API_KEY: &str = "0123456789abcdef0123456789abcdef";

fn system(mock: &MockTransport) -> BillingSystem {
    let config = ApiConfig::new("acme", API_KEY).expect("Failed to build config");
    BillingSystem::with_transport(config, Arc::new(mock.clone()))
}

// =============================================================================
// Filters
// =============================================================================

#[tokio::test]
async fn test_invoice_filter_becomes_query() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("invoices").return_xml(r#"<invoices total="0"/>"#);

    let mut filter = InvoiceFilter::client(5)
        .status(InvoiceStatus::Open)
        .between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
    filter.number = Some("RE1".into());
    filter.note = Some(String::new());

    system.invoices.find_all(&filter).await.expect("Failed to search invoices");

    let request = &mock.requests()[0];
    assert_eq!(request.query_value("client_id"), Some("5"));
    assert_eq!(request.query_value("invoice_number"), Some("RE1"));
    assert_eq!(request.query_value("status"), Some("OPEN"));
    assert_eq!(request.query_value("from"), Some("2024-01-01"));
    assert_eq!(request.query_value("to"), Some("2024-01-31"));
    assert_eq!(request.query_value("page"), Some("1"));
    // empty criteria are not sent
    assert_eq!(request.query_value("note"), None);
    mock.verify();
}

#[tokio::test]
async fn test_offer_filter_uses_offer_number() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("offers").return_xml(r#"<offers total="0"/>"#);

    let mut filter = OfferFilter::default().status(OfferStatus::Won);
    filter.number = Some("AN7".into());
    system.offers.find_all(&filter).await.unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.query_value("offer_number"), Some("AN7"));
    assert_eq!(request.query_value("status"), Some("WON"));
    assert_eq!(request.query_value("invoice_number"), None);
    mock.verify();
}

#[tokio::test]
async fn test_customer_documents() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoices").with_query("client_id", "5").return_xml(
        r#"<invoices total="1"><invoice><id type="integer">7</id><client_id type="integer">5</client_id></invoice></invoices>"#,
    );
    mock.expect_get("offers").with_query("client_id", "5").return_xml(r#"<offers total="0"/>"#);

    let invoices = system.customers.invoices(5).await.expect("Failed to list invoices");
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].transaction.client_id, 5);

    let offers = system.customers.offers(5).await.expect("Failed to list offers");
    assert!(offers.is_empty());
    mock.verify();
}

// =============================================================================
// Document actions
// =============================================================================

#[tokio::test]
async fn test_complete_with_template() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_put("invoices/7/complete").return_status(200, "");
    mock.expect_put("invoices/8/complete").return_status(200, "");

    system.invoices.complete(7, Some(3)).await.expect("Failed to complete invoice");
    system.invoices.complete(8, None).await.expect("Failed to complete invoice");

    let requests = mock.requests();
    let body = requests[0].body_xml().unwrap();
    assert_eq!(body.name(), "complete");
    assert_eq!(body.child_text("template_id"), Some("3"));

    let body = requests[1].body_xml().unwrap();
    assert!(body.child("template_id").is_none());
    mock.verify();
}

#[tokio::test]
async fn test_send_mail() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_post("offers/4/email").return_status(200, "");

    let message = EmailMessage::to("a@example.org,b@example.org")
        .cc("boss@example.org")
        .subject("Our offer");
    system.offers.send_mail(4, &message).await.expect("Failed to send mail");

    let body = mock.requests()[0].body_xml().unwrap();
    assert_eq!(body.name(), "email");
    let recipients = body.child("recipients").unwrap();
    let to: Vec<_> = recipients
        .children_named("to")
        .map(|c| c.text().to_string())
        .collect();
    assert_eq!(to, ["a@example.org", "b@example.org"]);
    assert_eq!(recipients.child_text("cc"), Some("boss@example.org"));
    assert_eq!(body.child_text("subject"), Some("Our offer"));
    mock.verify();
}

#[tokio::test]
async fn test_send_mail_without_recipient_sends_nothing() {
    let mock = MockTransport::new();
    let system = system(&mock);

    let err = system
        .invoices
        .send_mail(7, &EmailMessage::to("").subject("Invoice"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_pdf_downloads() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("invoices/7/pdf")
        .with_query("format", "pdf")
        .return_bytes(b"%PDF-1.4 plain");
    mock.expect_get("invoices/7/pdf")
        .with_query("type", "signed")
        .return_bytes(b"%PDF-1.4 signed");

    assert_eq!(system.invoices.pdf(7).await.unwrap(), b"%PDF-1.4 plain");
    assert_eq!(system.invoices.signed_pdf(7).await.unwrap(), b"%PDF-1.4 signed");
    mock.verify();
}

#[tokio::test]
async fn test_cancel_and_signature_upload() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_put("invoices/7/cancel").return_status(200, "");
    mock.expect_put("invoices/7/upload-signature").return_status(200, "");

    system.invoices.cancel(7).await.unwrap();
    system.invoices.upload_signature(7, b"signed").await.unwrap();

    let body = mock.requests()[1].body_xml().unwrap();
    assert_eq!(body.name(), "signature");
    assert_eq!(body.child_text("base64file"), Some("c2lnbmVk"));
    mock.verify();
}

#[tokio::test]
async fn test_invoice_positions_and_payments() {
    let mock = MockTransport::new();
    let system = system(&mock);

    mock.expect_get("invoice-items").with_query("invoice_id", "7").return_xml(
        r#"<invoice-items total="1">
            <invoice-item>
                <id type="integer">70</id>
                <invoice_id type="integer">7</invoice_id>
                <position type="integer">1</position>
                <title>Consulting</title>
                <quantity type="float">2.5</quantity>
            </invoice-item>
        </invoice-items>"#,
    );
    mock.expect_post("invoice-payments").return_xml(
        r#"<invoice-payment>
            <id type="integer">12</id>
            <invoice_id type="integer">7</invoice_id>
            <amount type="float">50.0</amount>
            <mark_invoice_as_payed>1</mark_invoice_as_payed>
        </invoice-payment>"#,
    );

    let items = system.invoices.items(7).await.expect("Failed to list items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].item.title.as_deref(), Some("Consulting"));
    assert_eq!(items[0].item.position(), Some(1));
    assert_eq!(items[0].item.quantity, Some(2.5));

    let mut payment = InvoicePayment::new(7, 50.0);
    let created = system
        .invoice_payments
        .create_payment(&mut payment, true)
        .await
        .expect("Failed to book payment");
    assert_eq!(created.id(), 12);
    assert_eq!(payment.id(), 12);

    let body = mock.requests()[1].body_xml().unwrap();
    assert_eq!(body.name(), "invoice-payment");
    assert_eq!(body.child_text("mark_invoice_as_payed"), Some("1"));
    assert_eq!(body.child_text("amount"), Some("50"));
    mock.verify();
}

// =============================================================================
// Account
// =============================================================================

#[tokio::test]
async fn test_current_user() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("users/myself").return_xml(
        r#"<user><id type="integer">1</id><email>owner@acme.example</email><first_name>Ada</first_name></user>"#,
    );

    let user = system.users.myself().await.expect("Failed to load user");
    assert_eq!(user.id(), 1);
    assert_eq!(user.email(), Some("owner@acme.example"));
    assert_eq!(user.first_name(), Some("Ada"));
    mock.verify();
}

#[tokio::test]
async fn test_settings_load_and_update() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("settings").return_xml(
        r#"<settings>
            <invoice_intro>Dear customer</invoice_intro>
            <currency_code>EUR</currency_code>
            <tax_rate type="float">19.0</tax_rate>
            <due_days type="integer">14</due_days>
        </settings>"#,
    );
    mock.expect_put("settings").return_status(200, "");

    let mut settings = system.settings.load().await.expect("Failed to load settings");
    assert_eq!(settings.invoice_intro.as_deref(), Some("Dear customer"));
    assert_eq!(settings.tax_rate, 19.0);
    assert_eq!(settings.due_days, 14);

    settings.due_days = 30;
    system.settings.update(&settings).await.expect("Failed to update settings");

    let body = mock.requests()[1].body_xml().unwrap();
    assert_eq!(body.name(), "settings");
    assert_eq!(body.child_text("due_days"), Some("30"));
    mock.verify();
}

#[tokio::test]
async fn test_template_thumbnail() {
    let mock = MockTransport::new();
    let system = system(&mock);
    mock.expect_get("templates/3/thumb")
        .with_query("type", "gif")
        .return_bytes(b"GIF89a");

    let thumb = system.templates.thumb(3, ThumbType::Gif).await.unwrap();
    assert_eq!(thumb, b"GIF89a");
    mock.verify();
}
