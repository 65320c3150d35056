use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, POSTS, PUT_UNKNOWN_BODY};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_posts_returns_seed() {
    let resp = app().oneshot(empty_request("GET", "/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts = body_json(resp).await;
    assert_eq!(posts.as_array().unwrap().len(), POSTS);
}

#[tokio::test]
async fn unknown_collection_is_404() {
    let resp = app().oneshot(empty_request("GET", "/comments")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- get ---

#[tokio::test]
async fn get_existing_user() {
    let resp = app().oneshot(empty_request("GET", "/users/1")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let user = body_json(resp).await;
    assert_eq!(user["id"], 1);
    assert!(user["email"].is_string());
}

#[tokio::test]
async fn get_missing_todo_returns_empty_object() {
    let resp = app().oneshot(empty_request("GET", "/todos/9999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, serde_json::json!({}));
}

// --- create ---

#[tokio::test]
async fn create_post_returns_201_with_next_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/posts",
            r#"{"title":"t","body":"b","userId":1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post = body_json(resp).await;
    assert_eq!(post["id"], POSTS as u64 + 1);
    assert_eq!(post["title"], "t");
    assert_eq!(post["userId"], 1);
}

#[tokio::test]
async fn create_accepts_nonsense_fields() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/todos",
            r#"{"title":12345,"completed":"maybe","userId":-1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn create_is_not_persisted() {
    let app = app();
    app.clone()
        .oneshot(json_request("POST", "/users", r#"{"name":"n"}"#))
        .await
        .unwrap();

    let resp = app.oneshot(empty_request("GET", "/users/11")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_malformed_json_is_rejected() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", "{not json"))
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

// --- update ---

#[tokio::test]
async fn update_keeps_path_id() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/posts/1",
            r#"{"id":77,"title":"new","body":"b","userId":1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let post = body_json(resp).await;
    assert_eq!(post["id"], 1);
    assert_eq!(post["title"], "new");
}

#[tokio::test]
async fn update_unknown_id_is_500() {
    let resp = app()
        .oneshot(json_request("PUT", "/posts/9999", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(resp).await, PUT_UNKNOWN_BODY.as_bytes());
}

// --- delete ---

#[tokio::test]
async fn delete_existing_and_missing_both_succeed() {
    let app = app();
    for uri in ["/todos/1", "/todos/9999"] {
        let resp = app.clone().oneshot(empty_request("DELETE", uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        assert_eq!(body_json(resp).await, serde_json::json!({}));
    }
}

// --- diagnostics ---

#[tokio::test]
async fn echo_reflects_request() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/_echo")
                .header("x-custom", "42")
                .body(r#"{"a":1}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let echo = body_json(resp).await;
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["headers"]["x-custom"], "42");
    assert_eq!(echo["body"], r#"{"a":1}"#);
}

#[tokio::test]
async fn bytes_returns_requested_length() {
    let resp = app().oneshot(empty_request("GET", "/_bytes/500")).await.unwrap();
    assert_eq!(body_bytes(resp).await.len(), 500);
}

#[tokio::test]
async fn empty_has_no_body() {
    let resp = app().oneshot(empty_request("GET", "/_empty")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn status_route_returns_requested_code() {
    let resp = app().oneshot(empty_request("GET", "/_status/503")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn delay_eventually_answers() {
    let resp = app().oneshot(empty_request("GET", "/_delay/10")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "done".as_bytes());
}
