// Integration tests for the public inquiry and catalog endpoints
// Run with: cargo test --test inquiry_api

mod common;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use chrono::Datelike;
use serde_json::{json, Value};

use common::{bearer, session_token, spawn_app, spawn_app_with, OPERATOR_EMAIL};

// Sample catalog ids
const HONDA: i32 = 1;
const FORD: i32 = 3;
const CIVIC: i32 = 2;
const F150: i32 = 5;
const ENGINE: i32 = 1;

fn contact_body() -> Value {
    json!({
        "name": "Jordan Wells",
        "email": "Jordan@Example.com",
        "subject": "Used engine availability",
        "message": "Do you have a 2.0L engine for a 2012 Civic?",
        "phone": "555-010-2000"
    })
}

fn parts_body(year: i32) -> Value {
    json!({
        "year": year,
        "manufacturer": HONDA,
        "model": CIVIC,
        "part_category": ENGINE,
        "name": "Riley Chen",
        "email": "riley@example.com",
        "phone": "(555) 222-3333",
        "zipcode": "30301",
        "additional_notes": "Prefer low mileage"
    })
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

#[tokio::test]
async fn test_health_lists_endpoints() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health/").await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["endpoints"]["contact"], "/api/contact/");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = spawn_app().await;

    let response = app.server.get("/api/health/").await;

    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Contact form
// ============================================================================

#[tokio::test]
async fn test_contact_submission_created() {
    let app = spawn_app().await;

    let response = app.server.post("/api/contact/").json(&contact_body()).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);

    let stored = app.store.contact_submissions();
    assert_eq!(stored.len(), 1);
    assert_eq!(body["submission_id"], stored[0].id.to_string());
    assert_eq!(stored[0].email, "jordan@example.com");
}

#[tokio::test]
async fn test_contact_missing_email_names_field() {
    let app = spawn_app().await;
    let mut body = contact_body();
    body.as_object_mut().unwrap().remove("email");

    let response = app.server.post("/api/contact/").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["email"], json!(["This field is required."]));
    assert!(app.store.contact_submissions().is_empty());
}

#[tokio::test]
async fn test_contact_reports_every_invalid_field() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/contact/")
        .json(&json!({ "email": "not-an-email", "message": "   short   ", "phone": "1".repeat(21) }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let errors = &response.json::<Value>()["errors"];
    assert!(errors.get("email").is_some());
    assert_eq!(errors["message"], json!(["Message must be at least 10 characters long"]));
    assert!(errors.get("phone").is_some());
}

#[tokio::test]
async fn test_contact_message_length_limit_applies_after_trim() {
    let app = spawn_app().await;
    let padded = |len: usize| format!("{}{}{}", " ".repeat(10), "a".repeat(len), "   ");

    let mut body = contact_body();
    body["message"] = json!(padded(5000));
    let accepted = app.server.post("/api/contact/").json(&body).await;
    assert_eq!(accepted.status_code(), StatusCode::CREATED);
    assert_eq!(app.store.contact_submissions()[0].message.len(), 5000);

    body["message"] = json!(padded(5001));
    let rejected = app.server.post("/api/contact/").json(&body).await;
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        rejected.json::<Value>()["errors"]["message"],
        json!(["Message is too long (max 5000 characters)"])
    );
    assert_eq!(app.store.contact_submissions().len(), 1);
}

#[tokio::test]
async fn test_contact_wrongly_typed_fields_reported_per_field() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/contact/")
        .json(&json!({ "email": ["a@b.com"], "message": "short", "subject": { "topic": "brakes" } }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let errors = &response.json::<Value>()["errors"];
    assert_eq!(errors["email"], json!(["Not a valid string."]));
    assert_eq!(errors["subject"], json!(["Not a valid string."]));
    assert_eq!(errors["message"], json!(["Message must be at least 10 characters long"]));
    assert!(errors.get("non_field_errors").is_none());
}

#[tokio::test]
async fn test_contact_with_invalid_token_is_accepted_anonymously() {
    let app = spawn_app().await;
    let (name, value) = bearer(&session_token("user_unknown", 600));

    let response = app.server.post("/api/contact/").add_header(name, value).json(&contact_body()).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(app.store.contact_submissions().len(), 1);
    assert!(app.store.user_profiles().is_empty());
}

#[tokio::test]
async fn test_contact_sends_notifications() {
    let app = spawn_app().await;

    app.server
        .post("/api/contact/")
        .json(&contact_body())
        .await
        .assert_status(StatusCode::CREATED);

    let providers = app.providers.read().await;
    assert_eq!(providers.sent_emails.len(), 2);
    assert!(providers
        .sent_emails
        .iter()
        .any(|email| email["to"] == json!([OPERATOR_EMAIL]) && email["reply_to"] == "jordan@example.com"));
    assert!(providers
        .sent_emails
        .iter()
        .any(|email| email["to"] == json!(["jordan@example.com"])));

    assert_eq!(providers.ga_events.len(), 1);
    let event = &providers.ga_events[0]["payload"]["events"][0];
    assert_eq!(event["name"], "form_submit");
    assert_eq!(event["params"]["form_type"], "contact");
    assert!(event["params"].get("ip_address").is_none());
}

#[tokio::test]
async fn test_email_provider_failure_keeps_created_status() {
    let app = spawn_app().await;
    app.providers.write().await.email_fails = true;

    let response = app.server.post("/api/contact/").json(&contact_body()).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(app.store.contact_submissions().len(), 1);
    assert!(app.providers.read().await.sent_emails.is_empty());
}

#[tokio::test]
async fn test_persistence_failure_is_generic_500() {
    let app = spawn_app().await;
    app.store.fail_writes(true);

    let response = app.server.post("/api/contact/").json(&contact_body()).await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.json::<Value>(),
        json!({ "success": false, "error": "Internal server error" })
    );
    assert!(app.providers.read().await.sent_emails.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/contact/")
        .bytes(Bytes::from_static(b"{\"email\": "))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn test_request_metadata_is_stored() {
    let app = spawn_app().await;

    app.server
        .post("/api/contact/")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.50, 10.0.0.1"),
        )
        .add_header(header::USER_AGENT, HeaderValue::from_str(&"M".repeat(600)).unwrap())
        .json(&contact_body())
        .await
        .assert_status(StatusCode::CREATED);

    let stored = &app.store.contact_submissions()[0];
    assert_eq!(stored.ip_address, Some("203.0.113.50".parse().unwrap()));
    assert_eq!(stored.user_agent.len(), 500);
}

#[tokio::test]
async fn test_ga_client_id_header_is_forwarded() {
    let app = spawn_app().await;

    app.server
        .post("/api/contact/")
        .add_header(
            HeaderName::from_static("x-ga-client-id"),
            HeaderValue::from_static("1234567890.1700000000"),
        )
        .json(&contact_body())
        .await
        .assert_status(StatusCode::CREATED);

    let providers = app.providers.read().await;
    assert_eq!(providers.ga_events[0]["payload"]["client_id"], "1234567890.1700000000");
    assert_eq!(providers.ga_events[0]["measurement_id"], "G-TEST123");
}

#[tokio::test]
async fn test_submissions_are_rate_limited_per_ip() {
    let app = spawn_app_with(|config| config.submission_rate_limit = 2).await;
    let forwarded = HeaderName::from_static("x-forwarded-for");

    for _ in 0..2 {
        app.server
            .post("/api/contact/")
            .add_header(forwarded.clone(), HeaderValue::from_static("198.51.100.7"))
            .json(&contact_body())
            .await
            .assert_status(StatusCode::CREATED);
    }

    let blocked = app
        .server
        .post("/api/parts-inquiry/")
        .add_header(forwarded.clone(), HeaderValue::from_static("198.51.100.7"))
        .json(&parts_body(2015))
        .await;

    assert_eq!(blocked.status_code(), StatusCode::TOO_MANY_REQUESTS);
    assert!(blocked.headers().contains_key(header::RETRY_AFTER));
    assert!(app.store.parts_inquiries().is_empty());

    app.server
        .post("/api/contact/")
        .add_header(forwarded, HeaderValue::from_static("198.51.100.8"))
        .json(&contact_body())
        .await
        .assert_status(StatusCode::CREATED);
}

// ============================================================================
// Parts inquiry
// ============================================================================

#[tokio::test]
async fn test_parts_inquiry_created_with_details() {
    let app = spawn_app().await;

    let response = app.server.post("/api/parts-inquiry/").json(&parts_body(2012)).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["details"],
        json!({ "year": 2012, "manufacturer": "Honda", "model": "Civic", "part": "Engine" })
    );

    let stored = app.store.parts_inquiries();
    assert_eq!(stored.len(), 1);
    assert_eq!(body["inquiry_id"], stored[0].id.to_string());

    let providers = app.providers.read().await;
    assert_eq!(providers.sent_emails.len(), 2);
    assert_eq!(providers.ga_events[0]["payload"]["events"][0]["params"]["form_type"], "parts_inquiry");
}

#[tokio::test]
async fn test_parts_inquiry_year_bounds() {
    let app = spawn_app().await;
    let cases = [
        (1949, StatusCode::BAD_REQUEST),
        (1950, StatusCode::CREATED),
        (current_year() + 2, StatusCode::CREATED),
        (current_year() + 3, StatusCode::BAD_REQUEST),
    ];

    for (year, expected) in cases {
        let response = app.server.post("/api/parts-inquiry/").json(&parts_body(year)).await;
        assert_eq!(response.status_code(), expected, "year {}", year);
        if expected == StatusCode::BAD_REQUEST {
            assert_eq!(
                response.json::<Value>()["errors"]["year"],
                json!([format!("Year must be between 1950 and {}", current_year() + 2)])
            );
        }
    }

    assert_eq!(app.store.parts_inquiries().len(), 2);
}

#[tokio::test]
async fn test_model_of_other_manufacturer_rejected() {
    let app = spawn_app().await;
    let mut body = parts_body(2018);
    body["manufacturer"] = json!(HONDA);
    body["model"] = json!(F150);

    let response = app.server.post("/api/parts-inquiry/").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["errors"],
        json!({ "model": ["Selected model does not belong to the selected manufacturer"] })
    );
    assert!(app.store.parts_inquiries().is_empty());
}

#[tokio::test]
async fn test_unknown_and_mistyped_reference_ids() {
    let app = spawn_app().await;
    let mut body = parts_body(2018);
    body["manufacturer"] = json!(9999);
    body["model"] = json!("civic");
    body["part_category"] = json!(null);

    let response = app.server.post("/api/parts-inquiry/").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let errors = &response.json::<Value>()["errors"];
    assert_eq!(errors["manufacturer"], json!([r#"Invalid pk "9999" - object does not exist."#]));
    assert_eq!(errors["model"], json!(["Incorrect type. Expected pk value, received str."]));
    assert!(errors.get("part_category").is_none());
}

#[tokio::test]
async fn test_parts_inquiry_without_vehicle_references() {
    let app = spawn_app().await;
    let mut body = parts_body(2008);
    for key in ["manufacturer", "model", "part_category"] {
        body.as_object_mut().unwrap().remove(key);
    }

    let response = app.server.post("/api/parts-inquiry/").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(
        response.json::<Value>()["details"],
        json!({ "year": 2008, "manufacturer": null, "model": null, "part": null })
    );
}

#[tokio::test]
async fn test_parts_inquiry_accepts_numeric_phone_and_zipcode() {
    let app = spawn_app().await;
    let mut body = parts_body(2010);
    body["phone"] = json!(5551234567u64);
    body["zipcode"] = json!(94110);

    let response = app.server.post("/api/parts-inquiry/").json(&body).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let stored = &app.store.parts_inquiries()[0];
    assert_eq!(stored.phone, "5551234567");
    assert_eq!(stored.zipcode, "94110");
}

#[tokio::test]
async fn test_parts_inquiry_missing_required_fields() {
    let app = spawn_app().await;

    let response = app.server.post("/api/parts-inquiry/").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let errors = &response.json::<Value>()["errors"];
    for field in ["year", "name", "email", "phone", "zipcode"] {
        assert_eq!(errors[field], json!(["This field is required."]), "field {}", field);
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_manufacturers_sorted_by_name() {
    let app = spawn_app().await;

    let body = app.server.get("/api/manufacturers/").await.json::<Value>();

    assert_eq!(body["success"], true);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Acura", "Ford", "Honda"]);
}

#[tokio::test]
async fn test_models_for_manufacturer() {
    let app = spawn_app().await;

    let response = app.server.get(&format!("/api/manufacturers/{}/models/", HONDA)).await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["manufacturer"], "Honda");
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Accord", "Civic"]);
}

#[tokio::test]
async fn test_models_for_inactive_or_unknown_manufacturer() {
    let app = spawn_app().await;
    let retired = app.store.add_manufacturer("Pontiac", "PON", false);

    for id in [retired.to_string(), "4040".to_string(), "abc".to_string()] {
        let response = app.server.get(&format!("/api/manufacturers/{}/models/", id)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "id {}", id);
        assert_eq!(response.json::<Value>()["error"], "Manufacturer not found");
    }
}

#[tokio::test]
async fn test_all_models_with_optional_filter() {
    let app = spawn_app().await;

    let all = app.server.get("/api/models/").await.json::<Value>();
    let first = &all["data"][0];
    assert_eq!(first["manufacturer_name"], "Acura");
    assert_eq!(all["data"].as_array().unwrap().len(), 5);

    let ford = app
        .server
        .get("/api/models/")
        .add_query_param("manufacturer_id", FORD)
        .await
        .json::<Value>();
    assert_eq!(ford["data"], json!([{
        "id": F150,
        "name": "F-150",
        "code": "F150",
        "manufacturer": FORD,
        "manufacturer_name": "Ford"
    }]));
}

#[tokio::test]
async fn test_part_categories() {
    let app = spawn_app().await;

    let body = app.server.get("/api/part-categories/").await.json::<Value>();

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alternator", "Engine", "Transmission"]);
}
