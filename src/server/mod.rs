// Server module entry point
// Binds the listener, accepts connections and stops on SIGINT/SIGTERM

pub mod connection;
pub mod listener;
pub mod network;
pub mod signal;

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

pub use listener::bind_listener;

/// Accept connections until a shutdown signal arrives
///
/// Must run inside a `LocalSet`; each connection is served on its own local task.
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let shutdown = signal::wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            signal_result = &mut shutdown => {
                let name = signal_result?;
                logger::log_shutdown(name);
                return Ok(());
            }
        }
    }
}
