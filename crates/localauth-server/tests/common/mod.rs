#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use localauth_auth::{AuthConfig, PasswordHashParams};
use localauth_server::{AppState, ServerConfig, router};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// An in-process server over a throwaway data directory.
pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            data_dir: dir.path().to_path_buf(),
            auth: AuthConfig {
                password_hash: PasswordHashParams {
                    memory_kib: 8,
                    iterations: 1,
                    parallelism: 1,
                },
                ..AuthConfig::default()
            },
            ..ServerConfig::default()
        };
        let state = AppState::new(config).unwrap();
        Self {
            router: router(state.clone()),
            state,
            dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    /// Admin request; no credentials.
    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(build(method, uri, &[], body)).await
    }

    /// Credential request carrying an API key and, optionally, a token.
    pub async fn auth(
        &self,
        method: Method,
        path: &str,
        api_key: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let bearer = token.map(|t| format!("Bearer {t}"));
        let mut headers = vec![("x-api-key", api_key)];
        if let Some(bearer) = bearer.as_deref() {
            headers.push(("authorization", bearer));
        }
        self.send(build(method, &format!("/api/auth{path}"), &headers, body))
            .await
    }

    /// Create an app and return `(id, api_key)`.
    pub async fn create_app(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .admin(
                Method::POST,
                "/api/apps",
                Some(serde_json::json!({ "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        (
            body["app"]["id"].as_str().unwrap().to_owned(),
            body["app"]["api_key"].as_str().unwrap().to_owned(),
        )
    }
}

pub fn build(method: Method, uri: &str, headers: &[(&str, &str)], body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
