use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Seeded records per collection, keyed by collection name.
pub type Db = Arc<HashMap<&'static str, Vec<Value>>>;

pub const POSTS: usize = 100;
pub const USERS: usize = 10;
pub const TODOS: usize = 200;

/// Body returned by PUT on an unknown id, mirroring the real service.
pub const PUT_UNKNOWN_BODY: &str = "TypeError: Cannot read properties of undefined (reading 'id')";

pub fn seed() -> Db {
    let posts = (1..=POSTS)
        .map(|id| {
            json!({
                "userId": (id - 1) / 10 + 1,
                "id": id,
                "title": format!("post title {id}"),
                "body": format!("post body {id}"),
            })
        })
        .collect();
    let users = (1..=USERS)
        .map(|id| {
            json!({
                "id": id,
                "name": format!("User {id}"),
                "username": format!("user{id}"),
                "email": format!("user{id}@example.test"),
            })
        })
        .collect();
    let todos = (1..=TODOS)
        .map(|id| {
            json!({
                "userId": (id - 1) / 20 + 1,
                "id": id,
                "title": format!("todo {id}"),
                "completed": id % 2 == 0,
            })
        })
        .collect();

    Arc::new(HashMap::from([("posts", posts), ("users", users), ("todos", todos)]))
}

/// JSONPlaceholder-style API: reads come from the seed, writes are echoed
/// back but never stored.
pub fn app() -> Router {
    Router::new()
        .route("/_echo", any(echo))
        .route("/_delay/{ms}", get(delay))
        .route("/_bytes/{n}", get(bytes))
        .route("/_empty", get(empty))
        .route("/_status/{code}", get(status))
        .route("/{collection}", get(list).post(create))
        .route(
            "/{collection}/{id}",
            get(fetch).put(update).delete(remove),
        )
        .with_state(seed())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn collection<'a>(db: &'a Db, name: &str) -> Result<&'a [Value], StatusCode> {
    db.get(name).map(Vec::as_slice).ok_or(StatusCode::NOT_FOUND)
}

fn find<'a>(records: &'a [Value], id: &str) -> Option<&'a Value> {
    let id: usize = id.parse().ok()?;
    id.checked_sub(1).and_then(|i| records.get(i))
}

fn with_id(body: Value, id: usize) -> Value {
    let mut fields = match body {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    fields.insert("id".to_string(), json!(id));
    Value::Object(fields)
}

async fn list(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    collection(&db, &name).map(|records| Json(records.to_vec()))
}

async fn fetch(State(db): State<Db>, Path((name, id)): Path<(String, String)>) -> Response {
    let Ok(records) = collection(&db, &name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match find(records, &id) {
        Some(record) => Json(record.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create(
    State(db): State<Db>,
    Path(name): Path<String>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let records = collection(&db, &name)?;
    Ok((StatusCode::CREATED, Json(with_id(input, records.len() + 1))))
}

async fn update(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
    Json(input): Json<Value>,
) -> Response {
    let Ok(records) = collection(&db, &name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match find(records, &id).and_then(|record| record["id"].as_u64()) {
        Some(id) => Json(with_id(input, id as usize)).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, PUT_UNKNOWN_BODY).into_response(),
    }
}

/// Succeeds whether or not the record exists.
async fn remove(Path((_name, _id)): Path<(String, String)>) -> Json<Value> {
    Json(json!({}))
}

/// Reflect the method, headers and body back as JSON.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                json!(String::from_utf8_lossy(value.as_bytes())),
            )
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "headers": headers,
        "body": body,
    }))
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

async fn bytes(Path(n): Path<usize>) -> String {
    "x".repeat(n)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}
