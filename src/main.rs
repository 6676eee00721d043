//! RLM relay server entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;

use rlm_relay::api::{create_router, ApiDoc, AppState};
use rlm_relay::config::Config;
use rlm_relay::ConfigError;
use rlm_relay::utils::{bind_address, shutdown_signal};

/// Relay for the RLM capacity management API.
#[derive(Parser, Debug)]
#[command(name = "rlm-relay")]
#[command(about = "Forwards appointment scheduling requests to the RLM API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Bind host, overrides HOST.
        #[arg(long)]
        host: Option<String>,

        /// Bind port, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration is read before logging so RUST_LOG (and .env) drive the filter
    let loaded = Config::load();

    // Initialize logging
    let directives = match &loaded {
        Ok(config) => config.log_directives(args.verbose),
        Err(_) => Config::default().log_directives(args.verbose),
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    match args.command {
        Some(Command::Serve { host, port }) => cmd_serve(loaded, host, port).await,
        Some(Command::CheckConfig) => cmd_check_config(loaded),
        Some(Command::Openapi) => cmd_openapi(),
        None => cmd_serve(loaded, None, None).await,
    }
}

/// Check configuration validity.
fn cmd_check_config(loaded: Result<Config, ConfigError>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("RLM RELAY - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match loaded {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Upstream: {}", config.rlm_api_url);
    println!("  Timeout: {}s", config.rlm_timeout_secs);
    println!("  Auth Header: {}: {}", config.api_header_name, config.masked_header_value());
    if !config.has_credentials() {
        println!("  WARNING: API_HEADER_VALUE is not set, requests will carry no auth header");
    }
    println!("  Bind: {}", bind_address(&config.host, config.port));
    println!("  Log Filter: {}", config.log_directives(false));
    println!(
        "  Responses: {}",
        if config.response_envelope { "Envelope" } else { "Transparent" }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the OpenAPI document.
fn cmd_openapi() -> anyhow::Result<()> {
    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(
    loaded: Result<Config, ConfigError>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = loaded.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Override with CLI args if provided
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    if !config.has_credentials() {
        warn!(
            "API_HEADER_VALUE not set; requests will be sent without the {} header",
            config.api_header_name
        );
    }

    let app_state = AppState::new(&config)?;

    info!(
        "Upstream: {} (auth header {})",
        app_state.rlm.url(),
        if app_state.rlm.has_auth() { "set" } else { "unset" }
    );
    info!(
        "Responses: {}",
        if config.response_envelope { "envelope" } else { "transparent" }
    );
    let router = create_router(app_state);

    let addr = bind_address(&config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
