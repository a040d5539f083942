//! BoxDrive server — an S3-compatible object store frontage.
//!
//! # Usage
//!
//! ```text
//! BOXDRIVE_LISTEN=0.0.0.0:9000 boxdrive-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BOXDRIVE_LISTEN` | `0.0.0.0:9000` | Bind address |
//! | `BOXDRIVE_STORE` | `memory` | Backing store: `memory` or `gitlab` |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `GITLAB_REPO_ID` | — | Numeric project ID (gitlab store) |
//! | `GITLAB_BRANCH` | `main` | Branch holding the object tree |
//! | `GITLAB_ACCESS_TOKEN` | — | Bearer token (gitlab store) |
//! | `GITLAB_API_URL` | `https://gitlab.com/api/v4/` | API base URL |
//! | `GITLAB_PLACEHOLDER` | `.gitkeep` | Placeholder file name |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use boxdrive_core::{GitlabConfig, GitlabStore, MemoryStore, ObjectStore};
use boxdrive_http::{S3Facade, S3HttpService};

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application configuration sourced from environment variables.
#[derive(Debug, Clone)]
struct ServerConfig {
    listen: String,
    store: String,
    log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:9000".to_owned(),
            store: "memory".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl ServerConfig {
    fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("BOXDRIVE_LISTEN") {
            config.listen = v;
        }
        if let Ok(v) = std::env::var("BOXDRIVE_STORE") {
            config.store = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }
        config
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the backing store selected by `BOXDRIVE_STORE`.
fn build_store(kind: &str) -> Result<Arc<dyn ObjectStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "gitlab" => {
            let config = gitlab_config_from_env()?;
            let store = GitlabStore::new(config).context("failed to construct GitLab store")?;
            Ok(Arc::new(store))
        }
        other => bail!("unknown BOXDRIVE_STORE value: {other} (expected memory or gitlab)"),
    }
}

/// Assemble the GitLab store configuration from `GITLAB_*` variables.
fn gitlab_config_from_env() -> Result<GitlabConfig> {
    let repo_id: u64 = std::env::var("GITLAB_REPO_ID")
        .context("GITLAB_REPO_ID is required for the gitlab store")?
        .parse()
        .context("GITLAB_REPO_ID must be a numeric project ID")?;
    let access_token = std::env::var("GITLAB_ACCESS_TOKEN")
        .context("GITLAB_ACCESS_TOKEN is required for the gitlab store")?;

    let mut config = GitlabConfig {
        repo_id,
        access_token,
        ..GitlabConfig::default()
    };
    if let Ok(v) = std::env::var("GITLAB_BRANCH") {
        config.branch = v;
    }
    if let Ok(v) = std::env::var("GITLAB_API_URL") {
        config.api_url = v;
    }
    if let Ok(v) = std::env::var("GITLAB_PLACEHOLDER") {
        config.placeholder_name = v;
    }
    Ok(config)
}

/// Run the accept loop, serving connections until a shutdown signal.
async fn serve(listener: TcpListener, service: S3HttpService<S3Facade>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(&config.log_level)?;

    info!(
        listen = %config.listen,
        store = %config.store,
        version = VERSION,
        "starting BoxDrive server",
    );

    let store = build_store(&config.store)?;
    let facade = S3Facade::new(store);
    let service = S3HttpService::new(facade);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_memory_store() {
        let config = ServerConfig::default();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.store, "memory");
    }

    #[test]
    fn test_should_reject_unknown_store_kind() {
        assert!(build_store("postgres").is_err());
    }
}
