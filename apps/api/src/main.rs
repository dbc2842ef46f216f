mod assistant;
mod autosave;
mod config;
mod documents;
mod errors;
mod export;
mod models;
mod routes;
mod settings;
mod state;
mod storage;
mod templates;
mod versions;
mod workspace;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assistant::CannedAssistant;
use crate::autosave::AutosaveConfig;
use crate::config::{Config, StorageBackend};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{BlobStore, FsBlobStore, MemoryBlobStore, S3BlobStore};
use crate::workspace::Workspace;

/// How long shutdown waits for a last save of unsaved changes.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed or missing env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting procv API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize blob storage
    let blobs = build_blob_store(&config).await?;

    // Load persisted state
    let workspace = Arc::new(Workspace::hydrate(blobs, config.max_versions).await?);

    // Start the autosave scheduler
    let autosave = autosave::spawn(
        workspace.clone(),
        AutosaveConfig {
            enabled: config.autosave_enabled,
            delay: config.autosave_delay,
        },
    )
    .await;

    // Initialize suggestion backend
    let assistant = Arc::new(CannedAssistant::new(config.ai_latency_scale));
    info!("Assistant initialized (latency scale {})", config.ai_latency_scale);

    // Build app state
    let state = AppState {
        workspace,
        autosave: autosave.clone(),
        assistant,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Last chance for pending edits.
    if autosave.exit_guard().requires_confirmation {
        warn!("Unsaved changes at shutdown, flushing");
        match tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, autosave.flush()).await {
            Ok(Ok(outcome)) => info!("Shutdown flush: {outcome:?}"),
            Ok(Err(e)) => warn!("Shutdown flush failed: {e}"),
            Err(_) => warn!("Shutdown flush timed out; unsaved changes are lost"),
        }
    }
    autosave.shutdown().await;
    info!("Stopped");

    Ok(())
}

async fn build_blob_store(config: &Config) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match &config.storage {
        StorageBackend::Fs { data_dir } => {
            info!("Blob storage: {}", data_dir.display());
            Arc::new(FsBlobStore::open(data_dir.clone()).await?)
        }
        StorageBackend::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
            prefix,
        } => {
            let client = build_s3_client(endpoint, access_key_id, secret_access_key).await;
            info!("Blob storage: s3://{bucket}/{prefix}");
            Arc::new(S3BlobStore::new(client, bucket.clone(), prefix.clone()))
        }
        StorageBackend::Memory => {
            warn!("Blob storage: in-memory, nothing will survive a restart");
            Arc::new(MemoryBlobStore::default())
        }
    };
    Ok(store)
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(
    endpoint: &str,
    access_key_id: &str,
    secret_access_key: &str,
) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        access_key_id,
        secret_access_key,
        None,
        None,
        "procv-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
