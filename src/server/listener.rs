//! TCP listener for the console server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::app::Application;
use crate::config::ServerConfig;
use crate::directory::UserDirectory;
use crate::{Result, SchoolError};

/// Console server that accepts TCP connections.
pub struct ConsoleServer {
    listener: TcpListener,
    slots: Arc<Semaphore>,
    max_connections: usize,
}

impl ConsoleServer {
    /// Create a new ConsoleServer bound to the configured address.
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        info!("Console server listening on {}", local_addr);

        Ok(Self {
            listener,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Serve the application until the listener fails.
    ///
    /// Each connection gets its own console handler on a spawned task. A
    /// connection is only accepted once a slot is free, so clients beyond
    /// `max_connections` wait in the listen backlog.
    pub async fn serve<D>(self, app: Application<D>) -> Result<()>
    where
        D: UserDirectory + 'static,
    {
        loop {
            let slot = Arc::clone(&self.slots)
                .acquire_owned()
                .await
                .map_err(|_| SchoolError::Io(std::io::Error::other("connection slots closed")))?;

            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };
            debug!(
                peer = %peer,
                free_slots = self.slots.available_permits(),
                "Accepted connection"
            );

            let mut handler = app.create_handler();
            tokio::spawn(async move {
                info!(peer = %peer, "Client connected");
                let (reader, writer) = stream.into_split();
                if let Err(e) = handler.run(BufReader::new(reader), writer).await {
                    warn!(peer = %peer, error = %e, "Connection ended with error");
                }
                info!(peer = %peer, "Client disconnected");
                drop(slot);
            });
        }
    }
}
