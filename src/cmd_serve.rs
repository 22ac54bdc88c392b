//! `bite serve`: run the companion endpoint in the foreground.

use std::path::PathBuf;

use tracing::info;

use bite_companion_server::CompanionServer;
use bite_config::Config;

pub(crate) async fn run_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
    outline: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut server_config = config.server.clone();
    if let Some(host) = host {
        server_config.host = host;
    }
    if let Some(port) = port {
        server_config.port = port;
    }
    if outline.is_some() {
        server_config.outline_path = outline;
    }

    let server = CompanionServer::new(server_config);
    let addr = server.start().await?;
    info!("Companion listening on http://{} (Ctrl-C to stop)", addr);

    tokio::signal::ctrl_c().await?;
    info!(
        "Shutting down, {} message(s) left in queue",
        server.state().queue.len()
    );
    server.stop().await?;
    Ok(())
}
