//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, ToyRedisError};
use crate::network::Connection;
use crate::protocol::{write_value, Value};

/// How long the accept loop sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for toyredis
pub struct Server {
    config: Config,
    engine: Arc<Engine>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

/// Cloneable handle that stops a running [`Server`]
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl Server {
    /// Bind the listener described by `config`
    ///
    /// The socket is bound immediately so that `local_addr` is meaningful
    /// before `run` is called (useful with port 0).
    pub fn bind(config: Config, engine: Arc<Engine>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr).map_err(|e| {
            ToyRedisError::Network(format!("failed to bind {}: {}", config.listen_addr, e))
        })?;
        // Non-blocking accept so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            engine,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Signal the server to shutdown gracefully
    ///
    /// Connections already being served run to completion.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&self) -> Result<()> {
        tracing::info!("Listening on {}", self.local_addr()?);

        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_connection(stream, peer),
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    // e.g. aborted handshakes; keep accepting
                    tracing::warn!("Failed to accept connection: {}", e);
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        // Accepted sockets may inherit the listener's non-blocking mode
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Failed to configure socket for {}: {}", peer, e);
            return;
        }

        let guard = match ConnectionGuard::acquire(
            &self.active_connections,
            self.config.max_connections,
        ) {
            Some(guard) => guard,
            None => {
                tracing::warn!("Rejecting {}: max connections reached", peer);
                reject(stream);
                return;
            }
        };

        let engine = Arc::clone(&self.engine);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                let mut connection = match Connection::from_tcp(stream, engine, &config) {
                    Ok(connection) => connection,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection for {}: {}", peer, e);
                        return;
                    }
                };
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} closed with error: {}", peer, e);
                }
                // Dropping the connection closes both halves of the socket
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn thread for {}: {}", peer, e);
        }
    }
}

/// Bind `addr` with default settings and serve until the process exits
pub fn bind_and_accept_forever(addr: &str) -> Result<()> {
    let config = Config::builder().listen_addr(addr).build();
    let server = Server::bind(config, Arc::new(Engine::new()))?;
    server.run()
}

fn reject(mut stream: TcpStream) {
    let reply = Value::Error("ERR max number of clients reached".to_string());
    if let Err(e) = write_value(&mut stream, &reply) {
        tracing::debug!("Failed to send rejection: {}", e);
    }
}

/// Counts a live connection for as long as it is held
struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    fn acquire(counter: &Arc<AtomicUsize>, limit: usize) -> Option<Self> {
        counter
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < limit).then_some(n + 1))
            .ok()
            .map(|_| Self {
                counter: Arc::clone(counter),
            })
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
