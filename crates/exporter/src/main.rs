//! `co2-exporter` -- serves an MH-Z16 CO2 reading as an OpenMetrics gauge.
//!
//! Every scrape of `/metrics` opens the serial device given on the command
//! line, reads the sensor once and closes it again.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default   | Description                  |
//! |------------------------|----------|-----------|------------------------------|
//! | `HOST`                 | no       | `0.0.0.0` | Bind address                 |
//! | `PORT`                 | no       | `2112`    | Bind port                    |
//! | `REQUEST_TIMEOUT_SECS` | no       | `30`      | HTTP request timeout         |
//! | `SENSOR_TIMEOUT_MS`    | no       | `1000`    | Serial read timeout          |

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use co2_core::collector::Co2Collector;
use co2_core::sensor::SerialOpener;
use co2_exporter::cli::{self, Command, RunOptions};
use co2_exporter::config::ServerConfig;
use co2_exporter::router::build_app_router;
use co2_exporter::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // --- Command line (fatal before anything is bound) ---
    let options = match cli::parse_args(std::env::args_os().skip(1)) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            print!("{}", cli::usage());
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}\n\n{}", cli::usage());
            return ExitCode::from(cli::USAGE_EXIT_CODE);
        }
    };

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "co2_exporter=info,co2_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "co2-exporter failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run(options: RunOptions) -> anyhow::Result<()> {
    // --- Configuration ---
    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        device = %options.device.display(),
        sensor_timeout_ms = config.sensor_timeout.as_millis() as u64,
        "Loaded exporter configuration",
    );

    // --- Collector + registry ---
    let collector = Co2Collector::new(options.device, SerialOpener::new(config.sensor_timeout));
    let state = AppState::new(collector);

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let host: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("invalid HOST address '{}'", config.host))?;
    let addr = SocketAddr::new(host, config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Serving metrics on /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the exporter
/// stops cleanly under systemd or a container runtime.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
