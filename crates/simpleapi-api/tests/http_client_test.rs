#![allow(clippy::unwrap_used)]
// Integration tests for `HttpClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use simpleapi_api::{Error, Headers, HttpClient, HttpRequest, Method, ParamsEncoding, Transport};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, HttpClient) {
    let server = MockServer::start().await;
    let client = HttpClient::with_client(reqwest::Client::new());
    (server, client)
}

fn request(server: &MockServer, method: Method, suffix: &str) -> HttpRequest {
    HttpRequest::new(method, format!("{}{suffix}", server.uri()))
}

// ── Happy path ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_returns_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Rex" }])))
        .mount(&server)
        .await;

    let body = client.send(request(&server, Method::Get, "/pets")).await.unwrap();

    assert_eq!(body, Some(json!([{ "name": "Rex" }])));
}

#[tokio::test]
async fn test_standard_get_puts_params_in_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pets"))
        .and(query_param("type", "dog"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(&server, Method::Get, "/pets");
    req.params = json!({ "type": "dog", "limit": 5 }).as_object().cloned();

    client.send(req).await.unwrap();
}

#[tokio::test]
async fn test_http_body_encoding_sends_form() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("param1=value1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "x" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(&server, Method::Get, "/search");
    req.encoding = ParamsEncoding::HttpBody;
    req.params = json!({ "param1": "value1" }).as_object().cloned();

    client.send(req).await.unwrap();
}

#[tokio::test]
async fn test_json_encoding_sends_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/pets"))
        .and(body_json(json!({ "name": "Rex", "age": 2 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "name": "Rex" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(&server, Method::Post, "/pets");
    req.encoding = ParamsEncoding::Json;
    req.params = json!({ "name": "Rex", "age": 2 }).as_object().cloned();

    let body = client.send(req).await.unwrap();
    assert_eq!(body, Some(json!({ "name": "Rex" })));
}

#[tokio::test]
async fn test_headers_are_forwarded() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/pets/rex"))
        .and(header("token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "rex" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut req = request(&server, Method::Delete, "/pets/rex");
    req.headers = Some(Headers::from([("token".to_string(), "abc".to_string())]));

    client.send(req).await.unwrap();
}

// ── Empty bodies ────────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_body_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/nothing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let body = client
        .send(request(&server, Method::Get, "/nothing"))
        .await
        .unwrap();
    assert_eq!(body, None);
}

#[tokio::test]
async fn test_json_null_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/null"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let body = client.send(request(&server, Method::Get, "/null")).await.unwrap();
    assert_eq!(body, None);
}

// ── Error paths ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_success_status_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let result = client.send(request(&server, Method::Get, "/missing")).await;

    match result {
        Err(Error::Status { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "not here");
        }
        other => panic!("expected Status error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let result = client.send(request(&server, Method::Get, "/html")).await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_sending() {
    let client = HttpClient::with_client(reqwest::Client::new());

    let result = client.send(HttpRequest::new(Method::Get, "not a url")).await;

    assert!(
        matches!(result, Err(Error::InvalidUrl(_))),
        "expected InvalidUrl error, got: {result:?}"
    );
}
