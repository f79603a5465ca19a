use anyhow::Result;
use clap::{Parser, Subcommand};
use credgate_broker::CredentialCoordinator;
use credgate_config::{Config, LogConfig, LogFormat};
use credgate_gateway::AppState;
use credgate_store::RemoteCredentialStore;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::MakeWriter, layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

#[derive(Parser, Debug)]
#[command(name = "credgate", about = "OAuth credential broker gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway.
    Serve {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Override the listening port (default: 8080).
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the listening address (default: 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },
    /// Load and validate the configuration without serving.
    Check {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port, host } => cmd_serve(config, port, host).await,
        Commands::Check { config } => cmd_check(config),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    Config::load(path.map(PathBuf::as_path)).map_err(|e| anyhow::anyhow!("config error: {e}"))
}

async fn cmd_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
) -> Result<()> {
    let mut config = load_config(config_path.as_ref())?;
    let _log_guard = init_tracing(&config.log)?;

    if let Some(p) = port {
        config.port = p;
    }
    if let Some(h) = host {
        config.host = h;
    }

    let http = credgate_gateway::build_http_client(
        config.proxy_url.as_deref(),
        Duration::from_secs(config.request_timeout_secs),
    );
    let store = Arc::new(RemoteCredentialStore::new(
        http.clone(),
        &config.store.endpoint,
        &config.store.user_key,
        &config.store.user_secret,
    ));
    let coordinator = CredentialCoordinator::from_config(store, http, &config);
    let app = credgate_gateway::make_router(AppState::new(coordinator));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, store = %config.store.endpoint, "credgate listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cmd_check(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_ref())?;
    println!(
        "configuration ok: listening on {}:{}, store at {}",
        config.host, config.port, config.store.endpoint
    );
    Ok(())
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `log.level`. The returned guard flushes the file writer on drop.
fn init_tracing(log: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log.level))?;

    let (layer, guard) = match &log.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let prefix = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log.file has no file name: {}", path.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, prefix));
            (fmt_layer(log.format, writer, false), Some(guard))
        }
        None => (fmt_layer(log.format, std::io::stderr, true), None),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()?;
    Ok(guard)
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Text => fmt::layer().with_ansi(ansi).with_writer(writer).boxed(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("graceful shutdown initiated");
}
