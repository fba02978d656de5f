//! route-binder
//!
//! Serves the demo API through the binder pipeline.
//!
//! ```text
//!   TypeDescriptor ──▶ Processor ──▶ custom binders ──▶ RouteBinder ──▶ Router
//!                                                                         │
//!   Client ──▶ tower-http layers ──▶ dispatch ──▶ Route::execute ◀────────┘
//!                                        │
//!                                        └──▶ failure routes
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use route_binder::binding::Processor;
use route_binder::config::{load_config, AppConfig};
use route_binder::demo;
use route_binder::http::HttpServer;
use route_binder::lifecycle::{signals, startup, Shutdown};
use route_binder::observability::{logging, metrics};
use route_binder::routing::Router;

#[derive(Parser)]
#[command(name = "route-binder", version, about = "Bind tagged methods to HTTP routes")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print the bound route table and exit.
    Routes,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_blocking_threads = config.workers.max_blocking_threads,
        "Configuration loaded"
    );

    let processor = Processor::new();
    let router = demo::build_router(&processor, "Hello")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Routes => {
            print_routes(&router);
            Ok(())
        }
        Command::Serve => {
            let runtime = startup::build_runtime(&config.workers)?;
            runtime.block_on(serve(config, router))
        }
    }
}

async fn serve(config: AppConfig, router: Router) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = startup::bind_listener(&config.listener).await?;
    let server = HttpServer::new(config, &router)?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(router: &Router) {
    println!(
        "{:<6} {:<12} {:<16} {:<9} NAME",
        "ORDER", "METHODS", "PATH", "FLAGS"
    );
    for route in router.sorted() {
        let methods = if route.methods().is_empty() {
            "*".to_string()
        } else {
            route
                .methods()
                .iter()
                .map(|verb| verb.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        let mut flags = String::new();
        if route.is_blocking() {
            flags.push('B');
        }
        if route.has_failure_handler() {
            flags.push('F');
        }
        if !route.is_enabled() {
            flags.push('D');
        }
        println!(
            "{:<6} {:<12} {:<16} {:<9} {}",
            route.order(),
            methods,
            route.path().unwrap_or("*"),
            if flags.is_empty() { "-" } else { flags.as_str() },
            route.label()
        );
    }
}
