use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error};

use super::handler;
use crate::memcache::store as storage;
use crate::protocol::text::connection::MemcacheTextConnection;
use crate::protocol::text::decoder::{DecodeError, TextRequest};
use crate::protocol::text::encoder::decode_error_to_response;

pub struct ClientConfig {
    pub(crate) item_size_limit: usize,
    pub(crate) key_size_limit: usize,
    pub(crate) rx_timeout_secs: u64,
}

pub struct Client {
    stream: MemcacheTextConnection,
    addr: SocketAddr,
    config: ClientConfig,
    handler: handler::TextHandler,
    /// Max connection semaphore.
    ///
    /// When the handler is dropped, a permit is returned to this semaphore. If
    /// the listener is waiting for connections to close, it will be notified of
    /// the newly available permit and resume accepting connections.
    limit_connections: Arc<Semaphore>,
}

impl Client {
    pub fn new(
        store: Arc<storage::MemcStore>,
        socket: TcpStream,
        addr: SocketAddr,
        config: ClientConfig,
        limit_connections: Arc<Semaphore>,
    ) -> Self {
        Client {
            stream: MemcacheTextConnection::new(
                socket,
                config.item_size_limit,
                config.key_size_limit,
            ),
            addr,
            config,
            handler: handler::TextHandler::new(store),
            limit_connections,
        }
    }

    pub async fn handle(&mut self) {
        debug!("New client connected: {}", self.addr);

        loop {
            let request = if self.config.rx_timeout_secs > 0 {
                match timeout(
                    Duration::from_secs(self.config.rx_timeout_secs),
                    self.stream.read_request(),
                )
                .await
                {
                    Ok(request) => request,
                    Err(err) => {
                        debug!(
                            "Timeout {}s elapsed, disconnecting client: {}, error: {}",
                            self.config.rx_timeout_secs, self.addr, err
                        );
                        return;
                    }
                }
            } else {
                self.stream.read_request().await
            };

            match request {
                Ok(Some(request)) => {
                    if self.handle_request(request).await {
                        return;
                    }
                }
                Ok(None) => {
                    // `read_request` returned `None`, the peer closed
                    // the connection.
                    debug!("Connection closed: {}", self.addr);
                    return;
                }
                Err(err) => {
                    if self.handle_decode_error(err).await {
                        return;
                    }
                }
            }
        }
    }

    /// Handles a single decoded request.
    /// Returns true if we should leave the client receive loop.
    async fn handle_request(&mut self, request: TextRequest) -> bool {
        let response = self.handler.handle_request(request);
        if let Some(response) = response {
            if let Err(err) = self.stream.write(&response).await {
                error!("error on sending response; error = {:?}", err);
                return true;
            }
        }
        false
    }

    /// Answers a protocol error. Recoverable errors leave the stream in
    /// sync and the receive loop continues; fatal ones close the socket
    /// after the reply.
    /// Returns true if we should leave the client receive loop.
    async fn handle_decode_error(&mut self, err: DecodeError) -> bool {
        if let DecodeError::Io(err) = err {
            debug!("Error when reading request; error = {:?}", err);
            return true;
        }
        let fatal = err.is_fatal();
        let response = decode_error_to_response(&err);
        if let Err(err) = self.stream.write(&response).await {
            error!("error on sending error response; error = {:?}", err);
            return true;
        }
        if fatal {
            debug!("Closing client socket after protocol error: {}", self.addr);
            if let Err(err) = self.stream.shutdown().await {
                debug!("Error on socket shutdown: {}", err);
            }
            return true;
        }
        false
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        // Add a permit back to the semaphore.
        //
        // Doing so unblocks the listener if the max number of
        // connections has been reached.
        //
        // This is done in a `Drop` implementation in order to guarantee that
        // the permit is added even if the task handling the connection panics.
        self.limit_connections.add_permits(1);
    }
}
