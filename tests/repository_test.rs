//! `GitHubRepository` against a mocked REST API.

mod common;

use common::*;
use github_login_pr::client::build_http_client;
use github_login_pr::repository::{FileUpdate, PullRequestDraft};
use github_login_pr::services::CommitAuthor;
use github_login_pr::{AccessToken, GitHubClient, GitHubErrorKind, GitHubRepository, RepositoryOps};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repository(server: &MockServer) -> GitHubRepository {
    let config = test_config(server);
    let http = build_http_client(&config).unwrap();
    let client = GitHubClient::new(http, &config, &AccessToken::new("tok_abc"));
    GitHubRepository::new(client, &config.target)
}

#[tokio::test]
async fn test_resolve_branch_sha() {
    let server = MockServer::start().await;
    mount_base_ref(&server).await;

    let sha = repository(&server).resolve_branch_sha("main").await.unwrap();
    assert_eq!(sha, BASE_SHA);
}

#[tokio::test]
async fn test_missing_branch_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(repo_path("git/ref/heads/nope")))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-github-request-id", "C0DE:1234")
                .set_body_json(json!({
                    "message": "Not Found",
                    "documentation_url": "https://docs.github.com/rest/git/refs#get-a-reference"
                })),
        )
        .mount(&server)
        .await;

    let err = repository(&server)
        .resolve_branch_sha("nope")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), GitHubErrorKind::NotFound);
    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.message(), "Not Found");
    assert_eq!(err.request_id(), Some("C0DE:1234"));
    assert_eq!(
        err.documentation_url(),
        Some("https://docs.github.com/rest/git/refs#get-a-reference")
    );
}

#[tokio::test]
async fn test_create_branch_sends_full_ref() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(repo_path("git/refs")))
        .and(body_partial_json(json!({
            "ref": "refs/heads/main_1700000000",
            "sha": BASE_SHA
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/main_1700000000",
            "object": { "sha": BASE_SHA, "type": "commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    repository(&server)
        .create_branch("main_1700000000", BASE_SHA)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_file_sha_reads_branch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(repo_path("contents/myNewFile.md")))
        .and(query_param("ref", "main_1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "name": "myNewFile.md",
            "path": "myNewFile.md",
            "sha": BLOB_SHA
        })))
        .mount(&server)
        .await;

    let sha = repository(&server)
        .get_file_sha("main_1700000000", "myNewFile.md")
        .await
        .unwrap();
    assert_eq!(sha, BLOB_SHA);
}

#[tokio::test]
async fn test_get_file_sha_encodes_reserved_characters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(repo_path("contents/notes/a%23b%3F.md")))
        .and(query_param("ref", "main_1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "file",
            "name": "a#b?.md",
            "path": "notes/a#b?.md",
            "sha": BLOB_SHA
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sha = repository(&server)
        .get_file_sha("main_1700000000", "notes/a#b?.md")
        .await
        .unwrap();
    assert_eq!(sha, BLOB_SHA);
}

#[tokio::test]
async fn test_get_file_sha_rejects_directory() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(repo_path("contents/docs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "dir",
            "name": "docs",
            "path": "docs",
            "sha": BLOB_SHA
        })))
        .mount(&server)
        .await;

    let err = repository(&server)
        .get_file_sha("main", "docs")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), GitHubErrorKind::InvalidParameter);
}

#[tokio::test]
async fn test_commit_file_encodes_content() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(repo_path("contents/myNewFile.md")))
        .and(body_partial_json(json!({
            "message": "Commit from test",
            "content": "aGVsbG8gd29ybGQ=",
            "sha": BLOB_SHA,
            "branch": "main_1700000000",
            "committer": { "name": "Octo Cat", "email": "octo@example.com" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": null,
            "commit": { "sha": COMMIT_SHA }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = FileUpdate {
        branch: "main_1700000000".to_string(),
        path: "myNewFile.md".to_string(),
        sha: Some(BLOB_SHA.to_string()),
        content: "hello world".to_string(),
        committer: CommitAuthor {
            name: "Octo Cat".to_string(),
            email: "octo@example.com".to_string(),
        },
        message: "Commit from test".to_string(),
    };

    let commit = repository(&server).commit_file(&update).await.unwrap();
    assert_eq!(commit, COMMIT_SHA);
}

#[tokio::test]
async fn test_create_pull_request_returns_html_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(repo_path("pulls")))
        .and(body_partial_json(json!({
            "head": "main_1700000000",
            "base": "main",
            "maintainer_can_modify": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "number": 42,
            "title": "t",
            "state": "open",
            "head": { "ref": "main_1700000000", "sha": COMMIT_SHA },
            "base": { "ref": "main", "sha": BASE_SHA },
            "html_url": PR_URL
        })))
        .mount(&server)
        .await;

    let draft = PullRequestDraft {
        head: "main_1700000000".to_string(),
        base: "main".to_string(),
        title: "t".to_string(),
        body: "b".to_string(),
    };

    let url = repository(&server).create_pull_request(&draft).await.unwrap();
    assert_eq!(url, PR_URL);
}

#[tokio::test]
async fn test_delete_branch() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(repo_path("git/refs/heads/main_1700000000")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    repository(&server)
        .delete_branch("main_1700000000")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_server_error_kind() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(repo_path("git/ref/heads/main")))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = repository(&server)
        .resolve_branch_sha("main")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), GitHubErrorKind::ServerError);
    assert_eq!(err.message(), "HTTP 502 error");
}
