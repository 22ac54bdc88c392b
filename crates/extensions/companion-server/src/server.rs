//! Server lifecycle: start, stop, toggle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use bite_config::ServerConfig;

use crate::error::ServerError;
use crate::outline::OutlineSink;
use crate::routes::{ServerState, create_router};

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

struct Running {
    addr: SocketAddr,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

/// The companion endpoint. Queued messages survive a stop/start cycle.
pub struct CompanionServer {
    config: ServerConfig,
    state: Arc<ServerState>,
    running: Mutex<Option<Running>>,
    started: Arc<AtomicBool>,
}

impl CompanionServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = Arc::new(ServerState::new(
            OutlineSink::from_path(config.outline_path.clone()),
            config.outline_keys.clone(),
        ));
        Self {
            config,
            state,
            running: Mutex::new(None),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configured listen address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub fn state(&self) -> Arc<ServerState> {
        self.state.clone()
    }

    pub fn is_running(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.addr)
    }

    /// Bind and serve. Refuses when already running or when something
    /// already answers on the configured port.
    pub async fn start(&self) -> Result<SocketAddr, ServerError> {
        let mut running = self.running.lock().await;
        if running.as_ref().is_some_and(|run| run.task.is_finished()) {
            warn!("Server task had exited; starting a new one");
            *running = None;
        }
        if running.is_some() {
            info!("Server is already running");
            return Err(ServerError::AlreadyRunning);
        }

        let addr = self.address();
        let listen_addr: SocketAddr = addr
            .parse()
            .map_err(|e| ServerError::InvalidAddress(format!("{}: {}", addr, e)))?;

        if listen_addr.port() != 0 && port_in_use(listen_addr.port()).await {
            warn!("Port {} is already in use", listen_addr.port());
            return Err(ServerError::PortInUse(listen_addr.port()));
        }

        let listener = TcpListener::bind(listen_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let bound = listener.local_addr()?;

        let shutdown = self.state.reset_shutdown();
        let router = create_router(self.state.clone());
        let signal = shutdown.clone();
        let started = self.started.clone();
        started.store(true, Ordering::SeqCst);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(signal.cancelled_owned())
                .await
            {
                error!("Companion server error: {}", e);
            }
            started.store(false, Ordering::SeqCst);
        });

        *running = Some(Running {
            addr: bound,
            shutdown,
            task,
        });
        info!("Server started on http://{}", bound);
        Ok(bound)
    }

    /// Stop serving. Any attached push stream ends first.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let Some(run) = self.running.lock().await.take() else {
            info!("Want to stop server but it is not running");
            return Err(ServerError::NotRunning);
        };
        self.state.close_stream();
        run.shutdown.cancel();
        if let Err(e) = run.task.await {
            error!("Companion server task failed: {}", e);
        }
        self.started.store(false, Ordering::SeqCst);
        info!("Server stopped");
        Ok(())
    }

    /// Start when stopped, stop when running. Returns whether the server
    /// runs afterwards.
    pub async fn toggle(&self) -> Result<bool, ServerError> {
        if self.is_running() {
            self.stop().await?;
            Ok(false)
        } else {
            self.start().await?;
            Ok(true)
        }
    }

    /// Queue a push message for the page side.
    pub fn enqueue(&self, message: Value) -> Result<usize, ServerError> {
        if !self.is_running() {
            info!("Want to send data but server is not running");
            return Err(ServerError::NotRunning);
        }
        self.state.enqueue(message)
    }
}

/// Whether something already accepts connections on the loopback port.
pub(crate) async fn port_in_use(port: u16) -> bool {
    matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(("127.0.0.1", port))).await,
        Ok(Ok(_))
    )
}
