use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use user_admin::query::UserFilter;
use user_admin::{app, AppError, AppState, ListQuery, MemoryUserStore, ServerConfig, User, UserDraft, UserStore};

fn test_router() -> Router {
    let state = AppState::new(Arc::new(MemoryUserStore::new()), 1000);
    app(state, &ServerConfig::default())
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn ada() -> Value {
    json!({"name": "Ada", "email": "ada@x.com", "role": "admin", "status": "active", "salary": 1000})
}

fn numbered(i: usize, status: &str) -> Value {
    json!({
        "name": format!("User {:02}", i),
        "email": format!("user{}@x.com", i),
        "role": "user",
        "status": status,
        "salary": i * 100
    })
}

#[tokio::test]
async fn create_assigns_ids_from_one() {
    let router = test_router();
    let (status, body) = send(&router, "POST", "/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
    assert_eq!(body["name"], "Ada");

    let (status, body) = send(&router, "POST", "/users", Some(numbered(2, "active"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 2);
}

#[tokio::test]
async fn create_ignores_client_id() {
    let router = test_router();
    let mut payload = ada();
    payload["id"] = json!(77);
    let (status, body) = send(&router, "POST", "/users", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn ids_strictly_increase_across_deletes() {
    let router = test_router();
    let mut last = 0;
    for i in 0..5 {
        let (_, body) = send(&router, "POST", "/users", Some(numbered(i, "active"))).await;
        let id = body["id"].as_i64().unwrap();
        assert!(id > last);
        last = id;
        if i % 2 == 0 {
            let (status, _) = send(&router, "DELETE", &format!("/users/{}", id), None).await;
            assert_eq!(status, StatusCode::OK);
        }
    }
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_id() {
    let router = test_router();
    send(&router, "POST", "/users", Some(ada())).await;

    let (status, body) = send(
        &router,
        "PUT",
        "/users/1",
        Some(json!({"id": 9, "name": "Ada L.", "email": "ada@x.com", "role": "admin", "status": "inactive", "salary": 1200})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["status"], "inactive");
    assert_eq!(body["name"], "Ada L.");

    let (status, body) = send(&router, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salary"], 1200.0);

    let (status, _) = send(&router, "GET", "/users/9", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_user_is_404() {
    let router = test_router();
    let (status, body) = send(&router, "PUT", "/users/3", Some(ada())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let router = test_router();
    send(&router, "POST", "/users", Some(ada())).await;
    let (status, body) = send(&router, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = send(&router, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_on_empty_store_is_404_with_error_body() {
    let router = test_router();
    let (status, body) = send(&router, "GET", "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(body["error"]["message"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn malformed_ids_are_400() {
    let router = test_router();
    for uri in ["/users/abc", "/users/0", "/users/-1"] {
        let (status, body) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "bad_request");
    }
    let (status, _) = send(&router, "DELETE", "/users/x", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_failure_names_the_field() {
    let router = test_router();
    let mut payload = ada();
    payload["email"] = json!("nope");
    let (status, body) = send(&router, "POST", "/users", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(body["error"]["details"]["field"], "email");

    let (status, body) = send(&router, "POST", "/users", Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn second_page_of_ten() {
    let router = test_router();
    for i in (1..=25).rev() {
        send(&router, "POST", "/users", Some(numbered(i, "active"))).await;
    }
    let (status, body) = send(&router, "GET", "/users?page=2&per_page=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 25);
    assert_eq!(body["totalPages"], 3);
    assert_eq!(body["currentPage"], 2);
    let names: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    let expected: Vec<String> = (11..=20).map(|i| format!("User {:02}", i)).collect();
    assert_eq!(names, expected);

    let (status, body) = send(&router, "GET", "/users?page=9&per_page=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["total"], 25);
}

#[tokio::test]
async fn status_filter_is_case_insensitive() {
    let router = test_router();
    for i in 1..=6 {
        let status = if i % 3 == 0 { "Inactive" } else { "Active" };
        send(&router, "POST", "/users", Some(numbered(i, status))).await;
    }
    for filter in ["active", "Active"] {
        let (status, body) = send(&router, "GET", &format!("/users?status={}", filter), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        for u in body["users"].as_array().unwrap() {
            assert_eq!(u["status"], "active");
        }
    }
}

#[tokio::test]
async fn search_role_and_sort_combine() {
    let router = test_router();
    for (name, role, salary) in [("Ada", "admin", 3), ("Adam", "user", 2), ("Adele", "admin", 1), ("Bob", "admin", 4)] {
        send(
            &router,
            "POST",
            "/users",
            Some(json!({"name": name, "email": "a@x.com", "role": role, "status": "active", "salary": salary})),
        )
        .await;
    }
    let (_, body) = send(&router, "GET", "/users?q=AD&role=admin&sortBy=salary&sortOrder=desc", None).await;
    let names: Vec<&str> = body["users"].as_array().unwrap().iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Ada", "Adele"]);
    assert_eq!(body["total"], 2);
    assert_eq!(body["totalPages"], 1);
}

#[tokio::test]
async fn bad_paging_params_are_400() {
    let router = test_router();
    for uri in ["/users?per_page=0", "/users?page=0", "/users?page=two", "/users?role=owner"] {
        let (status, body) = send(&router, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "bad_request");
    }
}

#[tokio::test]
async fn all_users_and_stats() {
    let router = test_router();
    for role in ["admin", "admin", "user"] {
        send(
            &router,
            "POST",
            "/users",
            Some(json!({"name": "Someone", "email": "s@x.com", "role": role, "status": "active", "salary": 1})),
        )
        .await;
    }
    let (status, body) = send(&router, "GET", "/users/allUsers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);

    let (status, body) = send(&router, "GET", "/users/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"], json!({"admin": 2, "user": 1}));
    assert_eq!(body["statuses"], json!({"active": 3}));
}

#[tokio::test]
async fn health_ready_version() {
    let router = test_router();
    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&router, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");

    let (_, body) = send(&router, "GET", "/version", None).await;
    assert_eq!(body["name"], "user-admin");
}

/// Memory store whose `find_all` takes `delay`, for exercising the request bounds.
struct SlowStore {
    inner: MemoryUserStore,
    delay: Duration,
}

#[async_trait]
impl UserStore for SlowStore {
    async fn count(&self, filter: &UserFilter) -> Result<u64, AppError> {
        self.inner.count(filter).await
    }

    async fn find_page(&self, query: &ListQuery) -> Result<Vec<User>, AppError> {
        self.inner.find_page(query).await
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, draft: &UserDraft) -> Result<User, AppError> {
        self.inner.insert(draft).await
    }

    async fn replace(&self, id: i64, draft: &UserDraft) -> Result<Option<User>, AppError> {
        self.inner.replace(id, draft).await
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.inner.delete(id).await
    }

    async fn import(&self, users: &[User]) -> Result<u64, AppError> {
        self.inner.import(users).await
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.inner.ping().await
    }
}

fn slow_router(delay: Duration, config: ServerConfig) -> Router {
    let store = SlowStore {
        inner: MemoryUserStore::new(),
        delay,
    };
    app(AppState::new(Arc::new(store), config.max_per_page), &config)
}

async fn status_of(router: &Router, request: Request<Body>) -> StatusCode {
    router.clone().oneshot(request).await.unwrap().status()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn oversized_body_is_413_and_creates_nothing() {
    let config = ServerConfig {
        max_body_bytes: 1024,
        ..ServerConfig::default()
    };
    let router = app(AppState::new(Arc::new(MemoryUserStore::new()), 1000), &config);

    let mut big = ada();
    big["name"] = json!("x".repeat(4096));
    let payload = big.to_string();
    for with_length in [true, false] {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json");
        if with_length {
            builder = builder.header("content-length", payload.len());
        }
        let request = builder.body(Body::from(payload.clone())).unwrap();
        assert_eq!(status_of(&router, request).await, StatusCode::PAYLOAD_TOO_LARGE, "content-length: {with_length}");
    }

    let (status, body) = send(&router, "POST", "/users", Some(ada())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn slow_request_times_out_with_408() {
    let config = ServerConfig {
        request_timeout: Duration::from_millis(50),
        ..ServerConfig::default()
    };
    let router = slow_router(Duration::from_millis(500), config);

    assert_eq!(status_of(&router, get("/users/allUsers")).await, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(status_of(&router, get("/users")).await, StatusCode::OK);
}

#[tokio::test]
async fn in_flight_requests_are_serialized_by_the_concurrency_bound() {
    async fn two_concurrent_reads(max_concurrent_requests: usize) -> Duration {
        let config = ServerConfig {
            max_concurrent_requests,
            ..ServerConfig::default()
        };
        let router = slow_router(Duration::from_millis(300), config);
        let started = tokio::time::Instant::now();
        let (first, second) = tokio::join!(
            status_of(&router, get("/users/allUsers")),
            status_of(&router, get("/users/allUsers")),
        );
        assert_eq!((first, second), (StatusCode::OK, StatusCode::OK));
        started.elapsed()
    }

    let bounded = two_concurrent_reads(1).await;
    assert!(bounded >= Duration::from_millis(600), "bounded took {bounded:?}");

    let unbounded = two_concurrent_reads(8).await;
    assert!(unbounded < Duration::from_millis(550), "unbounded took {unbounded:?}");
}
