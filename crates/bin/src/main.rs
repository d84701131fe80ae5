use std::sync::Arc;

use clap::Parser;
use cotext::session::CollabServer;
use cotext::store::InMemoryStore;
use tracing_subscriber::EnvFilter;

/// Real-time collaborative text server.
///
/// Serves the document WebSocket endpoint backed by in-memory stores. Every
/// document is open to any user; membership management sits in front of this
/// service in a full deployment.
#[derive(Debug, Parser)]
#[command(name = "cotext-server", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "COTEXT_BIND")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000, env = "COTEXT_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cotext=info".parse()?))
        .init();

    let store = Arc::new(InMemoryStore::permissive());
    let server = Arc::new(CollabServer::in_memory(store));
    let app = server.router();

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
