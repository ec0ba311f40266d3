//! Demo server for the multiplexer.
//!
//! Registers a handful of routes, then serves them behind the host adapter
//! until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use axum::{body::Body, http::Request};
use clap::Parser;
use tokio::net::TcpListener;

use http_mux::config::{load_config, ServerConfig};
use http_mux::observability::{logging, metrics};
use http_mux::routing::{default_recovery, PathParams, Router};
use http_mux::{lifecycle, HttpServer, MuxResult};

#[derive(Parser)]
#[command(name = "http-mux")]
#[command(about = "Demo server for the http-mux request router", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn build_router() -> MuxResult<Router> {
    let router = Router::new();
    router.recovery(default_recovery);
    router.use_middleware(|req, _sink| {
        tracing::info!(method = %req.method(), path = %req.uri().path(), "Request");
    });
    router.not_found(|req: Request<Body>| async move {
        (
            axum::http::StatusCode::NOT_FOUND,
            format!("Not Found : {}\n", req.uri()),
        )
    });

    router
        .handle("/hello", |req: Request<Body>| async move {
            format!("hello world Method:{}\n", req.method())
        })?
        .all();

    router
        .handle("/hello/:key/world/:value", |req: Request<Body>| async move {
            let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
            format!(
                "hello key:{} value:{}\n",
                params.get("key").unwrap_or_default(),
                params.get("value").unwrap_or_default()
            )
        })?
        .get()
        .post()
        .put()
        .delete();

    router.group("/group", |group| {
        group
            .handle("/foo/:id", |req: Request<Body>| async move {
                let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
                format!("group/foo id:{}\n", params.get("id").unwrap_or_default())
            })?
            .get();
        group
            .handle("/bar/:id", |req: Request<Body>| async move {
                let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
                format!("group/bar id:{}\n", params.get("id").unwrap_or_default())
            })?
            .get();
        Ok(())
    })?;

    Ok(router)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("http-mux v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let router = build_router()?;
    tracing::info!(router = ?router, "Routes registered");

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, router);
    server.run(listener, lifecycle::wait_for_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
