//! Integration tests: `VerifyClient` against a scripted local authority.
//!
//! Covers the retry contract from the verification design: transport-level
//! failures and malformed bodies are retried, exhaustion surfaces an error
//! rather than a verdict, and a success stops the attempt loop.

mod common;

use common::authority::{self, Response};
use dsg_core::config::VerifierConfig;
use dsg_core::verify::{Verifier, VerifyClient, VerifyRequest};

fn fast_config(endpoint: &str) -> VerifierConfig {
    VerifierConfig {
        endpoint: endpoint.to_string(),
        connect_timeout_secs: 5,
        request_timeout_secs: 5,
        max_attempts: 3,
        base_delay_secs: 0.005,
        max_delay_secs: 1,
    }
}

fn request() -> VerifyRequest {
    VerifyRequest {
        id: 7,
        url: "https://example.com/files/report.pdf".to_string(),
        filename: "report.pdf".to_string(),
        mime: Some("application/pdf".to_string()),
    }
}

#[tokio::test]
async fn safe_verdict_on_first_attempt() {
    let auth = authority::start(vec![Response::ok(
        r#"{"isSafe":true,"proxyUrl":"http://127.0.0.1:8080/proxy/1"}"#,
    )]);
    let client = VerifyClient::new(&fast_config(&auth.url));

    let verdict = client.verify(&request()).await.expect("verdict");
    assert!(verdict.safe);
    assert_eq!(
        verdict.fetch_url.as_deref(),
        Some("http://127.0.0.1:8080/proxy/1")
    );

    let requests = auth.requests();
    assert_eq!(requests.len(), 1, "success issues no further attempts");
    assert!(requests[0].contains(r#""url":"https://example.com/files/report.pdf""#));
    assert!(requests[0].contains(r#""filename":"report.pdf""#));
}

#[tokio::test]
async fn unsafe_verdict_is_not_retried() {
    let auth = authority::start(vec![Response::ok(r#"{"isSafe":false,"proxyUrl":""}"#)]);
    let client = VerifyClient::new(&fast_config(&auth.url));

    let verdict = client.verify(&request()).await.expect("verdict");
    assert!(!verdict.safe);
    assert_eq!(verdict.fetch_url, None, "empty proxyUrl folded to None");
    assert_eq!(auth.requests().len(), 1);
}

#[tokio::test]
async fn server_error_retried_then_succeeds() {
    let auth = authority::start(vec![
        Response::error(500),
        Response::ok(r#"{"isSafe":true}"#),
    ]);
    let client = VerifyClient::new(&fast_config(&auth.url));

    let verdict = client.verify(&request()).await.expect("verdict");
    assert!(verdict.safe);
    assert_eq!(auth.requests().len(), 2, "one retry after the 500");
}

#[tokio::test]
async fn malformed_body_retried_then_succeeds() {
    let auth = authority::start(vec![
        Response::ok("this is not a verdict"),
        Response::ok(r#"{"isSafe":true}"#),
    ]);
    let client = VerifyClient::new(&fast_config(&auth.url));

    let verdict = client.verify(&request()).await.expect("verdict");
    assert!(verdict.safe);
    assert_eq!(auth.requests().len(), 2);
}

#[tokio::test]
async fn exhaustion_is_an_error_not_a_verdict() {
    let auth = authority::start(vec![
        Response::error(500),
        Response::error(503),
        Response::error(500),
    ]);
    let client = VerifyClient::new(&fast_config(&auth.url));

    let result = client.verify(&request()).await;
    assert!(result.is_err(), "three failures must not produce a verdict");
    assert_eq!(auth.requests().len(), 3, "three attempts total");
}
