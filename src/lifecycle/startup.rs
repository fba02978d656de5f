//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the tokio runtime sized by configuration
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The blocking pool bound caps concurrent blocking handlers

use tokio::net::TcpListener;
use tokio::runtime::{Builder, Runtime};

use crate::config::schema::{ListenerConfig, WorkerConfig};

/// Multi-threaded runtime with the configured pool sizes.
pub fn build_runtime(workers: &WorkerConfig) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder
        .enable_all()
        .max_blocking_threads(workers.max_blocking_threads);
    if let Some(threads) = workers.worker_threads {
        builder.worker_threads(threads);
    }
    builder.build()
}

pub async fn bind_listener(listener: &ListenerConfig) -> std::io::Result<TcpListener> {
    let listener = TcpListener::bind(&listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");
    Ok(listener)
}
