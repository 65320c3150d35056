//! Client behaviour over real HTTP against the mock server.
//!
//! Each test starts its own server on a random port so tests stay
//! independent under the parallel runner.

mod common;

use api_harness::logging::capture;
use api_harness::{ApiClient, Headers, HttpMethod, TransportError};
use serde_json::Value;

fn headers(pairs: &[(&str, &str)]) -> Headers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn every_verb_returns_a_string_body() {
    let api = common::client();

    for (method, endpoint, body) in [
        (HttpMethod::Get, "/posts/1", None),
        (HttpMethod::Post, "/posts", Some(r#"{"title":"t"}"#)),
        (HttpMethod::Put, "/posts/1", Some(r#"{"title":"t"}"#)),
        (HttpMethod::Delete, "/posts/1", None),
        (HttpMethod::Get, "/_empty", None),
    ] {
        let response = api.send(method, endpoint, body, None).unwrap();
        assert!(
            response.status_code() < 300,
            "{method} {endpoint}: {}",
            response.status_code()
        );
        let _: &str = response.body();
    }
}

#[test]
fn empty_response_body_is_empty_string() {
    let api = common::client();
    let response = api.get("/_empty").unwrap();
    assert_eq!(response.status_code(), 204);
    assert_eq!(response.body(), "");
}

#[test]
fn default_and_caller_headers_reach_the_server() {
    let api = common::client();
    api.config().add_header("A", "1");
    api.config().add_header("B", "2");

    let response = api
        .get_with("/_echo", &headers(&[("B", "3"), ("C", "4")]))
        .unwrap();
    let echo: Value = response.json_value().unwrap();
    let sent = &echo["headers"];

    assert_eq!(sent["a"], "1");
    assert_eq!(sent["b"], "3");
    assert_eq!(sent["c"], "4");
    assert_eq!(sent["accept"], "application/json");
    assert_eq!(sent["user-agent"], "API-Test-Framework/1.0");
}

#[test]
fn post_body_is_sent_as_json() {
    let api = common::client();
    let body = r#"{"title":"hello","userId":1}"#;

    let response = api.post("/_echo", body).unwrap();
    let echo = response.json_value().unwrap();

    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"], body);
    assert_eq!(echo["headers"]["content-type"], "application/json");
}

#[test]
fn put_with_overrides_content_type() {
    let api = common::client();
    let response = api
        .put_with(
            "/_echo",
            "{}",
            &headers(&[("Content-Type", "application/merge-patch+json")]),
        )
        .unwrap();
    let echo = response.json_value().unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["headers"]["content-type"], "application/merge-patch+json");
}

#[test]
fn delete_with_sends_extra_headers() {
    let api = common::client();
    let response = api
        .delete_with("/_echo", &headers(&[("Authorization", "Bearer token")]))
        .unwrap();
    let echo = response.json_value().unwrap();
    assert_eq!(echo["method"], "DELETE");
    assert_eq!(echo["headers"]["authorization"], "Bearer token");
}

#[test]
fn error_statuses_are_not_errors() {
    let api = common::client();
    for code in [400u16, 404, 418, 500, 503] {
        let response = api.get(&format!("/_status/{code}")).unwrap();
        assert_eq!(response.status_code(), code);
    }
}

#[test]
fn long_body_is_logged_truncated_but_returned_whole() {
    let api = common::client();

    let (response, logs) = capture(|| api.get("/_bytes/500").unwrap());

    assert_eq!(response.body().len(), 500);
    assert!(logs.contains(&format!("body={}...", "x".repeat(200))));
    assert!(!logs.contains(&"x".repeat(201)));
}

#[test]
fn body_over_ten_mebibytes_is_read_whole() {
    const LEN: usize = 11 * 1024 * 1024;
    let api = common::client();

    let response = api.get(&format!("/_bytes/{LEN}")).unwrap();

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.body().len(), LEN);
    assert!(response.body().bytes().all(|b| b == b'x'));
}

#[test]
fn short_body_is_logged_whole() {
    let api = common::client();

    let (response, logs) = capture(|| api.get("/_bytes/20").unwrap());

    let body = "x".repeat(20);
    assert_eq!(response.body(), body);
    assert!(logs.contains(&format!("body={body}")));
    assert!(!logs.contains(&format!("{body}...")));
    assert!(logs.contains("sending request"));
    assert!(logs.contains("received response"));
}

#[test]
fn slow_response_times_out() {
    let base_url = common::spawn_server();
    let api = ApiClient::new(common::config_for(&base_url, 1)).unwrap();

    let err = api.get("/_delay/3000").unwrap_err();
    assert!(
        matches!(err, TransportError::Timeout { .. }),
        "expected timeout, got {err:?}"
    );
}

#[test]
fn connection_refused_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = ApiClient::new(common::config_for(&format!("http://127.0.0.1:{port}"), 2)).unwrap();

    let err = api.get("/posts").unwrap_err();
    assert!(!matches!(err, TransportError::Closed));
}

#[test]
fn closed_client_refuses_requests() {
    let mut api = common::client();
    assert_eq!(api.get("/posts/1").unwrap().status_code(), 200);

    api.close();
    api.close();

    assert!(api.transport().is_closed());
    assert!(matches!(api.get("/posts/1").unwrap_err(), TransportError::Closed));
}
