use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use redrag_server::{ServerConfig, Settings, app_router, build_services, init_tracing, seed_sample_documents};
use tracing::info;

/// Retrieval-augmented chat over Redis and Ollama.
#[derive(Debug, Parser)]
#[command(name = "redrag-server", version, about)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long, env = "REDRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Interface to bind (overrides REDRAG_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides REDRAG_PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter, e.g. `debug` or `redrag_runner=debug,info` (overrides LOG_LEVEL).
    #[arg(long)]
    log_level: Option<String>,

    /// Skip ingesting the sample corpus into an empty index.
    #[arg(long)]
    no_seed: bool,

    /// Drop the document index and its documents before seeding.
    #[arg(long)]
    reindex: bool,
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    settings.apply_env()?;

    if let Some(host) = &cli.host {
        settings.host = host.clone();
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    if let Some(level) = &cli.log_level {
        settings.log_level = level.clone();
    }

    settings.validate()?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    init_tracing(&settings.log_level);

    let services = build_services(&settings)?;
    if cli.reindex {
        services
            .state
            .runner
            .document_store()
            .drop_index()
            .await
            .context("failed to drop the document index")?;
    }
    if !cli.no_seed {
        seed_sample_documents(services.state.runner.document_store(), &services.documents).await;
    }

    let config = ServerConfig {
        cors_origins: settings.cors_origins.clone(),
        request_timeout: settings.request_timeout(),
    };
    let app = app_router(services.state, &config);

    let addr: SocketAddr = settings
        .bind_address()
        .parse()
        .with_context(|| format!("invalid host/port '{}'", settings.bind_address()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("redrag-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down services");
        })
        .await?;
    Ok(())
}
