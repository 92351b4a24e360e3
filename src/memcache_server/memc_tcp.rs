use std::sync::Arc;
use tokio::io;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::client_handler::{Client, ClientConfig};
use crate::cache::cache::Cache;
use crate::memcache::store as storage;

#[derive(Clone, Copy)]
pub struct MemcacheServerConfig {
    rx_timeout_secs: u64,
    connection_limit: u32,
    item_size_limit: usize,
    key_size_limit: usize,
}

impl MemcacheServerConfig {
    pub fn new(
        rx_timeout_secs: u64,
        connection_limit: u32,
        item_size_limit: usize,
        key_size_limit: usize,
    ) -> Self {
        MemcacheServerConfig {
            rx_timeout_secs,
            connection_limit,
            item_size_limit,
            key_size_limit,
        }
    }
}

pub struct MemcacheTcpServer {
    config: MemcacheServerConfig,
    storage: Arc<storage::MemcStore>,
    cancellation_token: CancellationToken,
    limit_connections: Arc<Semaphore>,
}

impl MemcacheTcpServer {
    pub fn new(
        config: MemcacheServerConfig,
        store: Arc<dyn Cache + Send + Sync>,
        cancellation_token: CancellationToken,
    ) -> MemcacheTcpServer {
        MemcacheTcpServer {
            config,
            storage: Arc::new(storage::MemcStore::new(store)),
            cancellation_token,
            limit_connections: Arc::new(Semaphore::new(config.connection_limit as usize)),
        }
    }

    pub async fn run<A: ToSocketAddrs>(&mut self, addr: A) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server is listening on: {}", listener.local_addr()?);
        loop {
            tokio::select! {
                connection = listener.accept() => {
                    match connection {
                        Ok((socket, peer_addr)) => {
                            socket.set_nodelay(true)?;
                            let client_config = ClientConfig {
                                item_size_limit: self.config.item_size_limit,
                                key_size_limit: self.config.key_size_limit,
                                rx_timeout_secs: self.config.rx_timeout_secs,
                            };
                            let mut client = Client::new(
                                self.storage.clone(),
                                socket,
                                peer_addr,
                                client_config,
                                self.limit_connections.clone(),
                            );

                            self.limit_connections.acquire().await.unwrap().forget();
                            // Spawn the client so it runs concurrently
                            // with every other connection. `move`
                            // transfers the store handle into the task.
                            tokio::spawn(async move { client.handle().await });
                        }
                        Err(err) => {
                            error!("{}", err);
                        }
                    }
                },
                _ = self.cancellation_token.cancelled() => {
                    debug!("Server received cancellation signal, stopping...");
                    return Ok(());
                },
            }
        }
    }
}
