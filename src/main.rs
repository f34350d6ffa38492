use anyhow::Context;
use github_login_pr::config::ENV_FILE;
use github_login_pr::observability::LoggingConfig;
use github_login_pr::{server, AppConfig};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file = AppConfig::load_env_file(ENV_FILE);
    let config = env_file.clone().and_then(|_| AppConfig::from_env());

    let log_format = config
        .as_ref()
        .map(|c| c.log_format)
        .unwrap_or_default();
    LoggingConfig::new()
        .with_format(log_format)
        .init()
        .context("failed to initialise logging")?;

    match env_file {
        Ok(true) => info!(file = ENV_FILE, "Loaded environment file"),
        Ok(false) => debug!(file = ENV_FILE, "No environment file found"),
        Err(_) => {}
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Refusing to start");
            return Err(e.into());
        }
    };

    info!(
        bind = %config.bind_addr,
        owner = %config.target.owner,
        repo = %config.target.repo,
        base = %config.target.base_branch,
        "Starting github-login-pr"
    );

    let state = server::AppState::new(config).context("failed to build HTTP client")?;
    server::serve(state).await.context("server error")?;

    Ok(())
}
