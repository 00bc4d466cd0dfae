use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Serves the browser build of the viewer
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    #[arg(long, default_value = "127.0.0.1:8083")]
    bind: SocketAddr,

    /// Directory holding the wasm bundle and other assets
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let args = Args::parse();
    let app = burako_server::router(&args.static_dir);

    let listener = TcpListener::bind(args.bind).await?;
    tracing::info!(
        "listening on {} (static files from {})",
        listener.local_addr()?,
        args.static_dir.display()
    );
    axum::serve(listener, app).await?;
    Ok(())
}
