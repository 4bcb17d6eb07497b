use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;

use rvc_server::application::services::{
    ArtifactCache, ConversionInvoker, ConversionPipeline, JobProducer, JobQueueClient, JobWorker,
    WorkerConfig,
};
use rvc_server::infrastructure::archive::ZipArchiveExtractor;
use rvc_server::infrastructure::callback::HttpCallbackDispatcher;
use rvc_server::infrastructure::conversion::ConversionEngineFactory;
use rvc_server::infrastructure::http::HttpFetcher;
use rvc_server::infrastructure::observability::{TracingConfig, init_tracing};
use rvc_server::infrastructure::queue::MessageQueueFactory;
use rvc_server::infrastructure::storage::LocalScratchStore;
use rvc_server::presentation::{AppState, Environment, Settings, create_router_with_body_limit};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let settings = Settings::load(environment).context("Failed to load settings")?;

    let tracing_config = TracingConfig::new(environment.as_str())
        .with_json(settings.logging.json_format)
        .with_level(settings.logging.level.as_deref());
    init_tracing(&tracing_config);

    let storage_root = PathBuf::from(&settings.storage.root);

    let fetcher = Arc::new(
        HttpFetcher::new(
            Duration::from_secs(settings.fetch.timeout_secs),
            &settings.fetch.user_agent,
        )
        .context("Failed to build HTTP fetcher")?,
    );
    let cache = Arc::new(
        ArtifactCache::new(
            storage_root.join("models"),
            fetcher.clone(),
            Arc::new(ZipArchiveExtractor),
        )
        .context("Failed to prepare model cache directory")?,
    );
    let scratch = Arc::new(
        LocalScratchStore::new(&storage_root, settings.storage.retain_scratch)
            .context("Failed to prepare scratch directories")?,
    );
    let engine = ConversionEngineFactory::create(
        settings.conversion.provider.into(),
        settings.conversion.command.as_deref(),
        &settings.conversion.args,
    )
    .context("Failed to create conversion engine")?;
    let invoker = Arc::new(ConversionInvoker::new(
        engine,
        scratch,
        settings.conversion.serialize,
    ));
    let pipeline = Arc::new(ConversionPipeline::new(cache, invoker, fetcher));

    let queue = MessageQueueFactory::create(&settings.queue)
        .await
        .context("Failed to create job queue")?;
    let queue_client = Arc::new(JobQueueClient::new(
        queue,
        settings.queue.group_id.clone(),
        settings.queue.deduplication.into(),
    ));
    let producer = Arc::new(JobProducer::new(Arc::clone(&queue_client)));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_handle = if settings.worker.enabled {
        if settings.job_may_outlive_lease() {
            tracing::warn!(
                job_timeout_secs = ?settings.worker.job_timeout_secs,
                visibility_timeout_secs = settings.queue.visibility_timeout_secs,
                "Job budget is not below the queue visibility timeout; long jobs may be redelivered and called back twice"
            );
        }
        let notifier = Arc::new(
            HttpCallbackDispatcher::new(Duration::from_secs(settings.callback.timeout_secs))
                .context("Failed to build callback dispatcher")?,
        );
        let worker = JobWorker::new(
            Arc::clone(&queue_client),
            Arc::clone(&pipeline),
            notifier,
            WorkerConfig {
                wait_time: Duration::from_secs(settings.queue.wait_time_secs),
                max_receive_count: settings.queue.max_receive_count,
                job_timeout: settings.worker.job_timeout_secs.map(Duration::from_secs),
                idle_backoff: Duration::from_millis(settings.worker.idle_backoff_ms),
            },
        );
        Some(tokio::spawn(worker.run(shutdown_rx)))
    } else {
        tracing::warn!("Job worker disabled; queued jobs will not be processed by this instance");
        None
    };

    let state = AppState {
        pipeline,
        producer,
        diagnostic_fixture: PathBuf::from(&settings.server.diagnostic_fixture),
    };
    let router = create_router_with_body_limit(state, settings.server.max_body_bytes);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped, draining job worker");
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Job worker terminated abnormally");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
