//! Ctrl+C trap.
//!
//! The trap never touches the connection.  It posts a single cancellation
//! event to the session's [`CancellationToken`]; the reader and writer observe
//! the token cooperatively and the session closes the connection once the
//! writer has handed the sink back.
//!
//! A second interrupt fires a separate `force` token.  `main.rs` stops
//! waiting for the session when it fires, so an operator can always get out
//! even if the graceful close is stuck.  Further interrupts are only logged.

use futures_util::stream::{self, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Spawns the trap for the lifetime of the process.
pub fn spawn_shutdown_trap(
    cancel: CancellationToken,
    force: CancellationToken,
) -> JoinHandle<u32> {
    tokio::spawn(trap_interrupts(Box::pin(ctrl_c_stream()), cancel, force))
}

/// Cancels `cancel` on the first item of `interrupts`, `force` on the second,
/// and counts the rest.
///
/// Returns the number of interrupts observed once the stream ends.
pub async fn trap_interrupts<S>(
    mut interrupts: S,
    cancel: CancellationToken,
    force: CancellationToken,
) -> u32
where
    S: Stream<Item = ()> + Unpin,
{
    let mut seen = 0u32;
    while interrupts.next().await.is_some() {
        seen += 1;
        match seen {
            1 => {
                info!("received Ctrl+C, shutting down");
                cancel.cancel();
            }
            2 => {
                warn!("received Ctrl+C again, exiting without waiting for the close");
                force.cancel();
            }
            _ => debug!("interrupt #{seen} ignored; exit already forced"),
        }
    }
    seen
}

/// Stream of Ctrl+C notifications (SIGINT on Unix).
///
/// Ends if the handler cannot be installed.
fn ctrl_c_stream() -> impl Stream<Item = ()> + Send {
    stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                error!("failed to listen for Ctrl+C signal: {e}");
                None
            }
        }
    })
}
