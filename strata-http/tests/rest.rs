use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use strata_data::prelude::*;
use strata_data::PaginationConfig;
use strata_http::RestService;
use tower::ServiceExt;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Todo {
    #[serde(default)]
    id: RecordId,
    title: String,
    #[serde(default)]
    done: bool,
}

impl Entity for Todo {
    fn table_name() -> &'static str {
        "todos"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "done"]
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

async fn app(n: usize) -> (Router, MemoryStore<Todo>) {
    let store = MemoryStore::new();
    let mut todos: Vec<Todo> = (1..=n)
        .map(|i| Todo {
            id: 0,
            title: format!("todo {i}"),
            done: false,
        })
        .collect();
    store.insert(&mut todos).await.unwrap();
    let pagination = PaginationConfig {
        default_limit: 2,
        max_limit: 3,
    };
    let router = RestService::<Todo, _>::new(store.clone(), pagination).router("todos");
    (router, store)
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = router.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_cursor_listing_uses_default_limit() {
    let (router, _) = app(5).await;
    let (status, body) = send(router, "GET", "/todos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["more"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_cursor_listing_caps_limit() {
    let (router, _) = app(5).await;
    let (_, body) = send(router, "GET", "/todos?start_id=1&limit=100", None).await;
    assert_eq!(body["start_id"], 1);
    assert_eq!(body["limit"], 3);
    let ids: Vec<u64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3, 4]);
    assert_eq!(body["more"], true);
}

#[tokio::test]
async fn test_offset_listing() {
    let (router, _) = app(7).await;
    let (status, body) = send(router.clone(), "GET", "/todos/pages?page=3&page_size=3", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
    assert_eq!(body["total_page"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(router, "GET", "/todos/pages", None).await;
    assert_eq!(body["total_page"], 0);
    assert_eq!(body["data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_bad_query_is_400_json() {
    let (router, _) = app(1).await;
    let (status, body) = send(router, "GET", "/todos?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_then_get() {
    let (router, store) = app(0).await;
    let (status, body) = send(
        router.clone(),
        "POST",
        "/todos",
        Some(json!({"data": {"id": 50, "title": "write docs"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("success"));
    assert_eq!(store.len(), 1);

    let (status, body) = send(router, "GET", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "write docs");
    assert_eq!(body["done"], false);
}

#[tokio::test]
async fn test_get_missing_is_404() {
    let (router, _) = app(1).await;
    let (status, body) = send(router.clone(), "GET", "/todos/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("todos"));

    let (status, _) = send(router, "GET", "/todos/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_missing_update() {
    let (router, _) = app(2).await;
    let (status, body) = send(
        router.clone(),
        "PUT",
        "/todos/2",
        Some(json!({"data": {"id": 1, "done": true}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("success"));

    let (_, body) = send(router.clone(), "GET", "/todos/2", None).await;
    assert_eq!(body["done"], true);
    assert_eq!(body["id"], 2);

    let (status, _) = send(
        router.clone(),
        "PUT",
        "/todos/8",
        Some(json!({"data": {"done": true}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        router,
        "PUT",
        "/todos/1",
        Some(json!({"data": {"colour": "red"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete() {
    let (router, store) = app(2).await;
    let (status, body) = send(router.clone(), "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("success"));
    assert_eq!(store.len(), 1);

    let (status, _) = send(router, "DELETE", "/todos/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
