//! Server module
//!
//! Listener creation, connection handling and the accept loop.

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::bind_listener;
pub use signal::shutdown_signal;

/// Accept connections until `shutdown` resolves
///
/// In-flight connections keep running in their own tasks after return.
pub async fn run<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }
            () = &mut shutdown => {
                logger::log_info("[Shutdown] No longer accepting connections");
                break;
            }
        }
    }
}
