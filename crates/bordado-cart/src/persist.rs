//! # Persistence Writer
//!
//! Serializes durable cart writes behind an unbounded channel.
//!
//! ## Ordering Contract
//! ```text
//! mutation 1 ──► send(Save state₁) ─┐
//! mutation 2 ──► send(Save state₂) ─┤──► writer task ──► storage.save(...)
//! mutation 3 ──► send(Save state₃) ─┘        (one write at a time,
//!                                             channel order preserved)
//! ```
//!
//! Mutations never block on storage latency; they enqueue the full cart
//! state and return. Because a single task drains the channel, a slow or
//! reordered write can never let an older state overwrite a newer one. A
//! failed write is logged and dropped: in-memory state stays authoritative
//! for the session and the next successful write restores durability.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::providers::CartStorage;
use crate::snapshot::PersistedCart;

/// Work accepted by the writer task.
pub(crate) enum PersistJob {
    /// Replace the durable cart with this state.
    Save(PersistedCart),
    /// Acknowledge once every previously enqueued write has been attempted.
    Flush(oneshot::Sender<()>),
}

/// Spawns the single writer task owning the storage handle.
pub(crate) fn spawn_writer<S>(storage: S) -> mpsc::UnboundedSender<PersistJob>
where
    S: CartStorage + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_writer(storage, rx));
    tx
}

async fn run_writer<S>(storage: S, mut rx: mpsc::UnboundedReceiver<PersistJob>)
where
    S: CartStorage,
{
    while let Some(job) = rx.recv().await {
        match job {
            PersistJob::Save(cart) => {
                match storage.save(&cart).await {
                    Ok(()) => debug!(lines = cart.items.len(), "cart state persisted"),
                    // No rollback: the in-memory cart remains authoritative
                    Err(error) => error!(%error, "cart persistence write failed"),
                }
            }
            PersistJob::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("persistence writer stopped");
}
