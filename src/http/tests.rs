use super::*;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpClient {
    HttpClient::new(Duration::from_secs(5))
}

#[test]
fn request_builder_collects_headers_and_body() {
    let url = Url::parse("http://localhost/rest/v1/items").expect("url should parse");
    let request = HttpRequest::new(Method::Post, url)
        .header("apikey", "secret")
        .json(&serde_json::json!({"a": 1}))
        .expect("body should serialize");

    assert_eq!(request.method(), Method::Post);
    assert_eq!(request.url().path(), "/rest/v1/items");
    assert_eq!(request.body(), Some(r#"{"a":1}"#));
    assert!(
        request
            .headers()
            .contains(&("Content-Type".to_string(), "application/json".to_string()))
    );
}

#[test]
fn long_error_bodies_are_shortened() {
    let body = "e".repeat(1000);
    let shortened = preview(&body);
    assert_eq!(shortened.chars().count(), ERROR_BODY_PREVIEW_CHARS + 1);
    assert!(shortened.ends_with('…'));
    assert_eq!(preview("  short  "), "short");
}

#[tokio::test]
async fn send_returns_body_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("x-test", "yes"))
        .and(body_string(r#"{"hello":"world"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_string("created"))
        .expect(1)
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/echo", server.uri())).expect("url should parse");
    let request = HttpRequest::new(Method::Post, url)
        .header("x-test", "yes")
        .json(&serde_json::json!({"hello": "world"}))
        .expect("body should serialize");

    let body = client().send(request).await.expect("request should succeed");
    assert_eq!(body, "created");
}

#[tokio::test]
async fn send_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"not here"}"#))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/missing", server.uri())).expect("url should parse");
    let err = client()
        .send(HttpRequest::new(Method::Get, url))
        .await
        .expect_err("request should fail");

    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("not here"));
}

#[tokio::test]
async fn send_reports_transport_errors() {
    let url = Url::parse("http://127.0.0.1:1/unreachable").expect("url should parse");
    let err = client()
        .send(HttpRequest::new(Method::Delete, url))
        .await
        .expect_err("request should fail");

    assert_eq!(err.status(), None);
    assert!(matches!(err, HttpError::Transport { .. }));
}
