use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use tripsearch_core::config;
use tripsearch_core::search::RelevanceWeights;
use tripsearch_core::storage::{load_snapshot, save_snapshot, Database};
use tripsearch_server::api::auth::ApiKeys;
use tripsearch_server::api::create_router;
use tripsearch_server::api::handlers::AppState;
use tripsearch_server::api::metrics;
use tripsearch_server::integrity::check_integrity;

#[derive(Parser)]
#[command(name = "tripsearch", about = "Trip listing and relevance search service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Data directory for snapshots
    #[arg(short, long, default_value = config::DEFAULT_DATA_DIR)]
    data_dir: String,

    /// Snapshot interval in seconds (0 = disabled)
    #[arg(long, default_value_t = config::DEFAULT_SNAPSHOT_INTERVAL_SECS)]
    snapshot_interval: u64,

    /// Integrity check interval in seconds (0 = disabled)
    #[arg(long, default_value_t = config::DEFAULT_INTEGRITY_INTERVAL_SECS)]
    integrity_interval: u64,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("tripsearch_server=info".parse()?)
                .add_directive("tripsearch_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }
    let data_path = Path::new(&args.data_dir);
    if data_path.exists() && !data_path.is_dir() {
        eprintln!(
            "Error: data_dir '{}' exists but is not a directory",
            args.data_dir
        );
        std::process::exit(1);
    }

    let weights = parse_weights();
    let api_keys = parse_api_keys();

    let db = match load_snapshot(data_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!(
                "Error: could not load snapshot from '{}': {}",
                args.data_dir, e
            );
            std::process::exit(1);
        }
    };

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    let state = AppState {
        db: db.clone(),
        weights: Arc::new(weights),
        data_dir: args.data_dir.clone(),
        api_keys,
        prometheus_handle,
        start_time: Instant::now(),
    };

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        data_dir = %args.data_dir,
        snapshot_interval_secs = args.snapshot_interval,
        integrity_interval_secs = args.integrity_interval,
        documents = db.document_count(),
        "tripsearch ready"
    );

    // Document count gauge
    let metrics_db = db.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(15));
        loop {
            interval.tick().await;
            metrics::update_document_metrics(&metrics_db);
        }
    });

    if args.snapshot_interval > 0 {
        let snap_db = db.clone();
        let snap_data_dir = args.data_dir.clone();
        let snap_interval = args.snapshot_interval;
        tracing::info!("Auto-snapshots enabled every {}s", snap_interval);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(snap_interval));
            interval.tick().await;
            loop {
                interval.tick().await;
                let db = snap_db.clone();
                let dir = snap_data_dir.clone();
                match tokio::task::spawn_blocking(move || save_snapshot(&db, Path::new(&dir))).await
                {
                    Ok(Ok(())) => tracing::info!("Periodic snapshot complete"),
                    Ok(Err(e)) => tracing::error!("Periodic snapshot failed: {}", e),
                    Err(e) => tracing::error!("Periodic snapshot task panicked: {}", e),
                }
            }
        });
    }

    if args.integrity_interval > 0 {
        let check_db = db.clone();
        let check_interval = args.integrity_interval;
        tracing::info!("Integrity checks enabled every {}s", check_interval);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(check_interval));
            loop {
                interval.tick().await;
                let db = check_db.clone();
                match tokio::task::spawn_blocking(move || check_integrity(&db)).await {
                    Ok(report) => metrics::update_corrupt_metrics(report.corrupt.len()),
                    Err(e) => tracing::error!("Integrity check task panicked: {}", e),
                }
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await?;

    flush_and_shutdown(&db, &args.data_dir, args.shutdown_timeout).await;

    Ok(())
}

fn parse_weights() -> RelevanceWeights {
    match std::env::var("TRIPSEARCH_RELEVANCE_WEIGHTS") {
        Ok(json) => match RelevanceWeights::from_json(&json) {
            Ok(weights) => {
                tracing::info!(?weights, "Using relevance weights from environment");
                weights
            }
            Err(e) => {
                eprintln!("Error: TRIPSEARCH_RELEVANCE_WEIGHTS is invalid: {}", e);
                std::process::exit(1);
            }
        },
        Err(_) => RelevanceWeights::default(),
    }
}

fn parse_api_keys() -> ApiKeys {
    match std::env::var("TRIPSEARCH_API_KEYS") {
        Ok(json) => match ApiKeys::from_json(&json) {
            Ok(keys) if !keys.is_empty() => {
                tracing::info!("API key authentication enabled");
                keys
            }
            Ok(keys) => {
                tracing::warn!("TRIPSEARCH_API_KEYS is empty, write routes are disabled");
                keys
            }
            Err(e) => {
                eprintln!("Error: TRIPSEARCH_API_KEYS contains invalid JSON: {}", e);
                std::process::exit(1);
            }
        },
        Err(_) => {
            tracing::warn!("No API keys set, write routes are disabled");
            ApiKeys::default()
        }
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}

async fn flush_and_shutdown(db: &Database, data_dir: &str, timeout_secs: u64) {
    tracing::info!("All requests drained, flushing data...");

    let db = db.clone();
    let dir = data_dir.to_string();
    let save = tokio::task::spawn_blocking(move || save_snapshot(&db, Path::new(&dir)));
    match tokio::time::timeout(Duration::from_secs(timeout_secs), save).await {
        Ok(Ok(Ok(()))) => tracing::info!("Snapshot saved on shutdown"),
        Ok(Ok(Err(e))) => tracing::error!("Failed to save snapshot on shutdown: {}", e),
        Ok(Err(e)) => tracing::error!("Shutdown snapshot task panicked: {}", e),
        Err(_) => tracing::error!(
            "Shutdown flush timeout ({}s) exceeded, snapshot may be incomplete",
            timeout_secs
        ),
    }
}
