// crates/bizreg-transport/tests/http_transport.rs
// ============================================================================
// Module: HTTP Transport Tests
// Description: Tests for the reqwest gateway transport against a local server.
// Purpose: Validate wire shape, API key handling, and envelope parsing.
// Dependencies: bizreg-core, bizreg-transport, serde_json, tiny_http
// ============================================================================
//! ## Overview
//! Spins up a one-shot `tiny_http` server per test, sends a request descriptor
//! through [`HttpTransport`], and checks what the server observed.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::mpsc;
use std::thread;
use std::thread::JoinHandle;

use bizreg_core::EnvelopeError;
use bizreg_core::GatewayCredentials;
use bizreg_core::GatewayEnvelope;
use bizreg_core::GatewayFailure;
use bizreg_core::GatewayTransport;
use bizreg_core::GatewayUrl;
use bizreg_core::HttpMethod;
use bizreg_core::Operation;
use bizreg_core::RequestDescriptor;
use bizreg_core::RequestPayload;
use bizreg_core::TransportError;
use bizreg_transport::HttpTransport;
use bizreg_transport::HttpTransportConfig;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// What the test server saw for one request.
#[derive(Debug)]
struct Observed {
    method: String,
    url: String,
    api_key: Option<String>,
    content_type: Option<String>,
    body: String,
}

fn header(request: &tiny_http::Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.as_str().to_string())
}

/// Serves one request with the given status and body.
fn serve_once(
    status: u16,
    body: &'static str,
) -> (String, mpsc::Receiver<Observed>, JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("http server");
    let addr = server.server_addr();
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).expect("body");
            let observed = Observed {
                method: request.method().as_str().to_string(),
                url: request.url().to_string(),
                api_key: header(&request, "X-Api-Key"),
                content_type: header(&request, "Content-Type"),
                body: received,
            };
            tx.send(observed).expect("send");
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}"), rx, handle)
}

fn transport() -> HttpTransport {
    HttpTransport::new(HttpTransportConfig::default()).expect("transport")
}

fn credentials(base: &str, key: Option<&str>) -> GatewayCredentials {
    GatewayCredentials::new(GatewayUrl::new(format!("{base}/")), key.map(str::to_string))
}

fn search_request() -> RequestDescriptor {
    RequestDescriptor {
        operation: Operation::CeidgSearch,
        method: HttpMethod::Get,
        path: "/api/ceidg/search".to_string(),
        payload: RequestPayload::Query(vec![
            ("searchBy".to_string(), "nazwa".to_string()),
            ("value".to_string(), "Zakład Kowalski & Syn".to_string()),
        ]),
    }
}

fn report_request() -> RequestDescriptor {
    let mut body = Map::new();
    body.insert("regon".to_string(), json!("123456789"));
    body.insert("reportType".to_string(), json!("BIR11OsPrawna"));
    body.insert("normalize".to_string(), json!(true));
    RequestDescriptor {
        operation: Operation::GusReport,
        method: HttpMethod::Post,
        path: "/api/gus/report".to_string(),
        payload: RequestPayload::Body(body),
    }
}

// ============================================================================
// SECTION: Wire Shape
// ============================================================================

#[test]
fn get_sends_encoded_query_and_api_key() {
    let (base, rx, handle) = serve_once(200, r#"{"success":true,"data":{"firmy":[]}}"#);
    let envelope = transport().send(&search_request(), &credentials(&base, Some("key-1"))).unwrap();
    assert!(envelope.is_success());
    let observed = rx.recv().unwrap();
    handle.join().expect("server thread");
    assert_eq!(observed.method, "GET");
    assert!(observed.url.starts_with("/api/ceidg/search?searchBy=nazwa&value="));
    assert!(observed.url.contains("%26"), "{}", observed.url);
    assert_eq!(observed.api_key.as_deref(), Some("key-1"));
    assert!(observed.body.is_empty());
}

#[test]
fn anonymous_requests_omit_api_key_header() {
    let (base, rx, handle) = serve_once(200, r#"{"success":true,"data":null}"#);
    transport().send(&search_request(), &credentials(&base, Some("   "))).unwrap();
    let observed = rx.recv().unwrap();
    handle.join().expect("server thread");
    assert_eq!(observed.api_key, None);
}

#[test]
fn post_sends_json_body() {
    let (base, rx, handle) = serve_once(200, r#"{"success":true,"data":{"regon":"123456789"}}"#);
    let envelope = transport().send(&report_request(), &credentials(&base, None)).unwrap();
    assert_eq!(
        envelope,
        GatewayEnvelope::Success {
            data: Some(json!({ "regon": "123456789" })),
        }
    );
    let observed = rx.recv().unwrap();
    handle.join().expect("server thread");
    assert_eq!(observed.method, "POST");
    assert_eq!(observed.url, "/api/gus/report");
    assert_eq!(observed.content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_str(&observed.body).unwrap();
    assert_eq!(
        body,
        json!({ "regon": "123456789", "reportType": "BIR11OsPrawna", "normalize": true })
    );
}

// ============================================================================
// SECTION: Status Handling
// ============================================================================

#[test]
fn rate_limit_status_still_yields_envelope() {
    let (base, _rx, handle) = serve_once(
        429,
        concat!(
            r#"{"success":false,"error":"#,
            r#"{"code":"ANONYMOUS_RATE_LIMIT","message":"Too many requests"}}"#
        ),
    );
    let envelope = transport().send(&report_request(), &credentials(&base, None)).unwrap();
    handle.join().expect("server thread");
    assert_eq!(
        envelope,
        GatewayEnvelope::Failure(GatewayFailure::new(
            Some("ANONYMOUS_RATE_LIMIT"),
            Some("Too many requests")
        ))
    );
}

#[test]
fn non_json_error_status_is_reported_as_status() {
    let (base, _rx, handle) = serve_once(502, "<html>bad gateway</html>");
    let err = transport().send(&report_request(), &credentials(&base, None)).unwrap_err();
    handle.join().expect("server thread");
    assert_eq!(
        err,
        TransportError::Status {
            status: 502,
        }
    );
}

#[test]
fn non_json_success_is_malformed() {
    let (base, _rx, handle) = serve_once(200, "ok");
    let err = transport().send(&report_request(), &credentials(&base, None)).unwrap_err();
    handle.join().expect("server thread");
    assert!(matches!(err, TransportError::MalformedEnvelope(EnvelopeError::Json(_))));
}

#[test]
fn envelope_without_success_flag_is_malformed() {
    let (base, _rx, handle) = serve_once(200, r#"{"data":[]}"#);
    let err = transport().send(&report_request(), &credentials(&base, None)).unwrap_err();
    handle.join().expect("server thread");
    assert_eq!(err, TransportError::MalformedEnvelope(EnvelopeError::MissingSuccess));
}

#[test]
fn oversized_responses_are_rejected() {
    let (base, _rx, handle) =
        serve_once(200, r#"{"success":true,"data":"this body is longer than the limit"}"#);
    let transport = HttpTransport::new(HttpTransportConfig {
        max_response_bytes: 16,
        ..HttpTransportConfig::default()
    })
    .unwrap();
    let err = transport.send(&report_request(), &credentials(&base, None)).unwrap_err();
    handle.join().expect("server thread");
    assert_eq!(
        err,
        TransportError::TooLarge {
            max_bytes: 16,
        }
    );
}

// ============================================================================
// SECTION: URL Policy
// ============================================================================

#[test]
fn cleartext_gateway_rejected_when_http_disallowed() {
    let transport = HttpTransport::new(HttpTransportConfig {
        allow_http: false,
        ..HttpTransportConfig::default()
    })
    .unwrap();
    let err = transport
        .send(&report_request(), &credentials("http://127.0.0.1:9", None))
        .unwrap_err();
    assert_eq!(err, TransportError::UnsupportedScheme("http".to_string()));
}

#[test]
fn invalid_gateway_url_is_rejected() {
    let err = transport().send(&report_request(), &credentials("not a url", None)).unwrap_err();
    assert!(matches!(err, TransportError::InvalidUrl(_)));
}
