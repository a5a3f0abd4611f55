//! Background writer that applies cart persistence jobs in order.
//!
//! The cart store never awaits a save: it drops a job on the queue and
//! moves on. One task per store drains the queue, so saves land in the same
//! order the mutations happened and the last write always wins. Failures are
//! logged and otherwise ignored.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::storage::KeyValueStore;

pub(crate) enum Job {
    /// Replace the stored blob with this serialized cart.
    Save(String),
    /// Remove the stored blob, then ack.
    Delete { done: oneshot::Sender<()> },
    /// Ack once every earlier job has been attempted.
    Flush { done: oneshot::Sender<()> },
    /// Stop after the earlier jobs, release the store, then ack.
    Shutdown { done: oneshot::Sender<()> },
}

pub(crate) type JobSender = mpsc::UnboundedSender<Job>;

/// Spawn the writer on `handle`. It exits once every sender is dropped and
/// the queue is drained.
pub(crate) fn spawn(
    handle: &tokio::runtime::Handle,
    store: Arc<dyn KeyValueStore>,
    key: String,
) -> JobSender {
    let (tx, rx) = mpsc::unbounded_channel();
    handle.spawn(run(store, key, rx));
    tx
}

async fn run(store: Arc<dyn KeyValueStore>, key: String, mut rx: mpsc::UnboundedReceiver<Job>) {
    let mut shutdown_ack = None;
    while let Some(job) = rx.recv().await {
        match job {
            Job::Save(blob) => {
                if let Err(e) = store.set(&key, &blob).await {
                    tracing::error!(%key, error = %e, "failed to save cart to storage");
                } else {
                    tracing::debug!(%key, bytes = blob.len(), "cart saved");
                }
            }
            Job::Delete { done } => {
                if let Err(e) = store.delete(&key).await {
                    tracing::error!(%key, error = %e, "failed to delete stored cart");
                } else {
                    tracing::debug!(%key, "stored cart deleted");
                }
                let _ = done.send(());
            }
            Job::Flush { done } => {
                let _ = done.send(());
            }
            Job::Shutdown { done } => {
                rx.close();
                shutdown_ack = Some(done);
                break;
            }
        }
    }
    drop(store);
    tracing::trace!(%key, "cart writer stopped");
    if let Some(done) = shutdown_ack {
        let _ = done.send(());
    }
}
