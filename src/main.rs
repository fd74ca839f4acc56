//! Logstash exporter binary entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use prometheus::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logstash_exporter::{
    AppConfig, CollectorRegistry, HotThreadsCollector, NodeInfoCollector, NodeStatsCollector,
    ScrapeOrchestrator, StartupError,
    config::DEFAULT_CONFIG_PATH,
    server::{AppState, create_router},
};

/// Prometheus exporter for Logstash node diagnostics.
#[derive(Parser, Debug)]
#[command(name = "logstash-exporter", version, about, long_about = None)]
struct Cli {
    /// The protocol, host and port on which the Logstash metrics API listens
    #[arg(long = "logstash.endpoint", env = "LOGSTASH_ENDPOINT")]
    endpoint: Option<String>,

    /// Address on which to expose metrics
    #[arg(long = "web.listen-address", env = "EXPORTER_LISTEN_ADDRESS")]
    listen_address: Option<String>,

    /// Path to the bootstrap configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "EXPORTER_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,logstash_exporter=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!(error = %err, "exporter startup failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = AppConfig::load_or_create(&cli.config)?;
    config.apply_overrides(cli.endpoint, cli.listen_address);
    config.validate()?;

    let metrics_registry = Registry::new();
    register_build_info(&metrics_registry)?;

    // Client-side timeout backs up the orchestrator's per-poll deadline.
    let client = reqwest::Client::builder()
        .timeout(config.scrape_timeout)
        .build()?;

    let registry = Arc::new(CollectorRegistry::new(vec![
        Arc::new(NodeInfoCollector::new(&config.endpoint, client.clone())?),
        Arc::new(NodeStatsCollector::new(&config.endpoint, client.clone())?),
        Arc::new(HotThreadsCollector::new(&config.endpoint, client)?),
    ])?);
    tracing::info!(
        collectors = registry.len(),
        endpoint = %config.endpoint,
        "collector registry built"
    );

    let orchestrator = Arc::new(ScrapeOrchestrator::new(
        registry,
        &metrics_registry,
        config.scrape_timeout,
    )?);

    let app = create_router(AppState {
        orchestrator,
        metrics_registry,
    });

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "exporter listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

fn register_build_info(registry: &Registry) -> Result<(), prometheus::Error> {
    let opts = prometheus::Opts::new(
        "logstash_exporter_build_info",
        "Build information of the exporter.",
    )
    .const_label("version", env!("CARGO_PKG_VERSION"));
    let gauge = prometheus::IntGauge::with_opts(opts)?;
    gauge.set(1);
    registry.register(Box::new(gauge))
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C");
        }
        _ = terminate => {
            tracing::info!("received terminate signal");
        }
    }
}
