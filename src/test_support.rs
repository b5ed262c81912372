//! Router-level test harness: in-memory repo, real token codec, fast hasher.
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::api::v1::extractors::AuthCtx;
use crate::app::build_api_router;
use crate::config::CookieConfig;
use crate::repos::memory::InMemoryUserRepo;
use crate::services::auth::{TokenCodec, password::test_hasher};
use crate::services::authz::Role;
use crate::state::AppState;

pub const TEST_SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes!!";

pub struct TestApp {
    pub repo: Arc<InMemoryUserRepo>,
    pub tokens: Arc<TokenCodec>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub set_cookie: Option<String>,
    pub body: Value,
}

/// State wired with an in-memory repo; also returns the handles tests poke at.
pub fn test_state() -> (Arc<InMemoryUserRepo>, Arc<TokenCodec>, AppState) {
    let repo = Arc::new(InMemoryUserRepo::new());
    let tokens = Arc::new(TokenCodec::new(TEST_SECRET, 900, 0).unwrap());
    let state = AppState::new(
        repo.clone(),
        tokens.clone(),
        Arc::new(test_hasher()),
        CookieConfig::default(),
    );
    (repo, tokens, state)
}

impl TestApp {
    pub fn new() -> Self {
        let (repo, tokens, state) = test_state();

        Self {
            repo,
            tokens,
            router: build_api_router(state),
        }
    }

    pub fn token_for(&self, user_id: i64, role: Role) -> String {
        self.tokens.sign(&AuthCtx::new(user_id, role)).unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(req).await
    }

    pub async fn request_with_cookie(&self, method: Method, uri: &str, token: &str) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("theme=dark; token={token}"))
            .body(Body::empty())
            .unwrap();
        self.send(req).await
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, bearer, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn put(&self, uri: &str, bearer: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(bearer), Some(body)).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let headers = res.headers().clone();
        let set_cookie = headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        TestResponse {
            status,
            headers,
            set_cookie,
            body,
        }
    }
}
