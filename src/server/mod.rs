//! HTTP routes.
//!
//! | Route | Behavior |
//! |---|---|
//! | `GET /` | login link |
//! | `GET /login/github/` | 301 to the GitHub authorize page |
//! | `GET /login/github/callback` | code exchange, profile, pull request |
//! | `GET /loggedin` | logged-in page without a token, always unauthorized |

use crate::client::{build_http_client, GitHubClient};
use crate::config::AppConfig;
use crate::errors::GitHubResult;
use crate::oauth::{AccessToken, OAuthClient};
use crate::render;
use crate::repository::GitHubRepository;
use crate::workflow::{CleanupPolicy, PullRequestWorkflow};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{error, info, warn, Level};

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    http: Client,
    oauth: OAuthClient,
    workflow: Arc<PullRequestWorkflow>,
}

impl AppState {
    /// Builds the state, including the shared connection pool.
    pub fn new(config: AppConfig) -> GitHubResult<Self> {
        let http = build_http_client(&config)?;
        let config = Arc::new(config);
        let oauth = OAuthClient::new(http.clone(), config.clone());
        let workflow = PullRequestWorkflow::new(config.target.clone(), config.committer.clone())
            .with_cleanup(CleanupPolicy::from_flag(config.cleanup_on_failure));

        Ok(Self {
            config,
            http,
            oauth,
            workflow: Arc::new(workflow),
        })
    }

    /// Gets the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Query string of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login/github/", get(login))
        .route("/login/github/callback", get(callback))
        .route("/loggedin", get(logged_in))
        .layer(
            TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Binds the configured address and serves until the process is stopped.
pub async fn serve(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

async fn index() -> Html<&'static str> {
    Html(render::LOGIN_PAGE)
}

async fn login(State(state): State<AppState>) -> Response {
    let location = state.oauth.authorize_url();
    let body = render::redirect_body(&location);

    (
        StatusCode::MOVED_PERMANENTLY,
        [
            (header::LOCATION, location),
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
        ],
        body,
    )
        .into_response()
}

async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let code = params.code.unwrap_or_default();

    let token = match state.oauth.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, code = e.error_code(), "Login failed");
            return unauthorized();
        }
    };

    complete_login(&state, &token).await
}

async fn logged_in(State(state): State<AppState>) -> Response {
    complete_login(&state, &AccessToken::new("")).await
}

/// Fetches the profile, runs the workflow and renders the result.
async fn complete_login(state: &AppState, token: &AccessToken) -> Response {
    if token.is_empty() {
        return unauthorized();
    }

    let profile = match state.oauth.fetch_user_profile(token).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, code = e.error_code(), "Failed to fetch user profile");
            return bad_gateway("fetching the user profile");
        }
    };

    let client = GitHubClient::new(state.http.clone(), &state.config, token);
    let repo = GitHubRepository::new(client, &state.config.target);

    match state.workflow.run(&repo, Utc::now()).await {
        Ok(outcome) => {
            info!(
                branch = %outcome.branch,
                commit = %outcome.commit_sha,
                url = %outcome.pull_request_url,
                "Pull request created"
            );
            Html(render::success_page(&outcome.pull_request_url, &profile)).into_response()
        }
        Err(e) => {
            error!(
                step = %e.step,
                error = %e.source,
                cleanup = ?e.cleanup,
                "Pull request workflow failed"
            );
            bad_gateway(e.step.description())
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::OK, render::UNAUTHORIZED).into_response()
}

fn bad_gateway(step_description: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        render::upstream_failure(step_description),
    )
        .into_response()
}
