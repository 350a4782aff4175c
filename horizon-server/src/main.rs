use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum::http::HeaderValue;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use horizon_config::Config;
use horizon_core::ingest::IngestPipeline;
use horizon_server::{AppState, routes};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "horizon-server")]
#[command(about = "Catalog backend serving taxonomy-scoped image metadata behind an access gate")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (the default when no subcommand is given)
    Serve,
    /// Synchronize the database with the static image tree, then exit
    Ingest {
        /// Root of the family/group/subgroup image tree; defaults to
        /// STATIC_ROOT
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    let pool = horizon_core::db::connect(&config.database).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Ingest { root } => {
            let root = root.unwrap_or_else(|| config.media.static_root.clone());
            run_ingest(pool, root).await
        }
        Command::Serve => serve(config, pool).await,
    }
}

// Per-failure and summary logging happen inside the pipeline run.
async fn run_ingest(pool: PgPool, root: PathBuf) -> anyhow::Result<()> {
    IngestPipeline::new(pool, root).run().await?;
    Ok(())
}

async fn serve(config: Config, pool: PgPool) -> anyhow::Result<()> {
    if config.media.ingest_on_startup {
        run_ingest(pool.clone(), config.media.static_root.clone()).await?;
    }

    let state = AppState::new(&config, pool)?;
    let app = routes::create_router(state)
        .layer(cors_layer(&config.server.cors_allowed_origins)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("invalid bind address")?;

    info!(%addr, "horizon server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server exited with error")
}

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let list = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid CORS origin")?;
        AllowOrigin::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any()))
}
