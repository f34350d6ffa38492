//! Shared helpers for integration tests.
//!
//! One WireMock server stands in for both github.com (OAuth endpoints) and
//! api.github.com (REST endpoints); their paths do not overlap.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use github_login_pr::server::{self, AppState};
use github_login_pr::AppConfig;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "secret-456";
pub const OWNER: &str = "vinayakshnd";
pub const REPO: &str = "newrepo";
pub const BASE_SHA: &str = "aa218f56b14c9653891f9e74264a383fa43fefbd";
pub const BLOB_SHA: &str = "95b966ae1c166bd92f8ae7d1c313e738c731dfc3";
pub const COMMIT_SHA: &str = "7638417db6d59f3c431d3e1f261cc637155684cd";
pub const PR_URL: &str = "https://github.com/vinayakshnd/newrepo/pull/42";

/// Configuration pointing every upstream call at `server`.
pub fn test_config(server: &MockServer) -> AppConfig {
    test_config_builder(server).build().unwrap()
}

pub fn test_config_builder(server: &MockServer) -> github_login_pr::AppConfigBuilder {
    AppConfig::builder()
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .oauth_base_url(server.uri())
        .api_base_url(server.uri())
        .timeout(Duration::from_secs(5))
}

pub fn app(config: AppConfig) -> Router {
    server::router(AppState::new(config).unwrap())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn repo_path(rest: &str) -> String {
    format!("/repos/{}/{}/{}", OWNER, REPO, rest)
}

/// Token endpoint answering `code` with `token`.
pub async fn mount_token_exchange(server: &MockServer, code: &str, token: &str) {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET,
            "code": code
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
            "scope": "repo"
        })))
        .mount(server)
        .await;
}

/// Token endpoint rejecting `code` the way GitHub rejects a redeemed code.
pub async fn mount_rejected_code(server: &MockServer, code: &str) {
    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET,
            "code": code
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "bad_verification_code",
            "error_description": "The code passed is incorrect or expired.",
            "error_uri": "https://docs.github.com/apps/troubleshooting"
        })))
        .mount(server)
        .await;
}

pub async fn mount_profile(server: &MockServer, token: &str, profile: Value) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", format!("token {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .mount(server)
        .await;
}

pub async fn mount_base_ref(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(repo_path("git/ref/heads/main")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ref": "refs/heads/main",
            "object": { "sha": BASE_SHA, "type": "commit" }
        })))
        .mount(server)
        .await;
}

pub async fn mount_create_ref(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(repo_path("git/refs")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/main_0",
            "object": { "sha": BASE_SHA, "type": "commit" }
        })))
        .mount(server)
        .await;
}

pub async fn mount_file_contents(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(repo_path("contents/myNewFile.md")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "encoding": "base64",
            "size": 12,
            "name": "myNewFile.md",
            "path": "myNewFile.md",
            "content": "b2xkIGNvbnRlbnQ=",
            "sha": BLOB_SHA
        })))
        .mount(server)
        .await;
}

pub async fn mount_commit_file(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path(repo_path("contents/myNewFile.md")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": null,
            "commit": {
                "sha": COMMIT_SHA,
                "message": "update",
                "html_url": "https://github.com/vinayakshnd/newrepo/commit/7638417"
            }
        })))
        .mount(server)
        .await;
}

pub async fn mount_create_pull(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(repo_path("pulls")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "number": 42,
            "title": "Pull request",
            "body": null,
            "state": "open",
            "head": { "ref": "main_0", "sha": COMMIT_SHA },
            "base": { "ref": "main", "sha": BASE_SHA },
            "html_url": PR_URL,
            "maintainer_can_modify": true
        })))
        .mount(server)
        .await;
}

/// `METHOD /path` of every request the server saw, in order.
pub async fn request_log(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect()
}

/// JSON body of the first request matching `method` and `path`.
pub async fn request_body(server: &MockServer, verb: &str, request_path: &str) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests
        .iter()
        .find(|r| r.method.to_string() == verb && r.url.path() == request_path)
        .unwrap_or_else(|| panic!("no {} {} request", verb, request_path));
    serde_json::from_slice(&request.body).unwrap()
}
