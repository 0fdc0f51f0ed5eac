//! Fire-and-forget submission of collection pushes.

use super::{SyncMode, SyncTransport};
use crate::model::note::Note;
use crate::notice::Notifier;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

struct SyncJob {
    seq: u64,
    notes: Vec<Note>,
    done: oneshot::Sender<()>,
}

/// Schedules pushes on the tokio runtime and reports their outcome.
///
/// Submitting never waits for the network. Callers that must observe
/// completion (process exit, tests) use [`SyncDispatcher::flush`].
pub struct SyncDispatcher {
    mode: SyncMode,
    transport: Arc<dyn SyncTransport>,
    notifier: Notifier,
    queue: Option<UnboundedSender<SyncJob>>,
    pending: Vec<oneshot::Receiver<()>>,
    next_seq: u64,
}

impl SyncDispatcher {
    pub fn new(mode: SyncMode, transport: Arc<dyn SyncTransport>, notifier: Notifier) -> Self {
        Self {
            mode,
            transport,
            notifier,
            queue: None,
            pending: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn mode(&self) -> SyncMode {
        self.mode
    }

    /// Submits one full-collection push. Must run inside a tokio runtime.
    pub fn submit(&mut self, notes: Vec<Note>) {
        self.pending
            .retain_mut(|done| matches!(done.try_recv(), Err(oneshot::error::TryRecvError::Empty)));

        let seq = self.next_seq;
        self.next_seq += 1;
        let (done_tx, done_rx) = oneshot::channel();
        self.pending.push(done_rx);
        let job = SyncJob {
            seq,
            notes,
            done: done_tx,
        };

        match self.mode {
            SyncMode::Ordered => {
                let queue = self.ordered_queue();
                if let Err(mpsc::error::SendError(job)) = queue.send(job) {
                    // Worker gone (runtime shutting down); run inline instead.
                    self.queue = None;
                    self.spawn_one(job);
                }
            }
            SyncMode::Concurrent => self.spawn_one(job),
        }
    }

    /// Number of submitted pushes not yet completed.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Waits until every push submitted so far has completed.
    pub async fn flush(&mut self) {
        for done in self.pending.drain(..) {
            let _ = done.await;
        }
    }

    fn ordered_queue(&mut self) -> UnboundedSender<SyncJob> {
        if let Some(queue) = self.queue.as_ref() {
            return queue.clone();
        }
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_ordered_worker(
            rx,
            Arc::clone(&self.transport),
            self.notifier.clone(),
        ));
        self.queue = Some(tx.clone());
        tx
    }

    fn spawn_one(&self, job: SyncJob) {
        let transport = Arc::clone(&self.transport);
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            run_job(transport.as_ref(), &notifier, job).await;
        });
    }
}

async fn run_ordered_worker(
    mut rx: UnboundedReceiver<SyncJob>,
    transport: Arc<dyn SyncTransport>,
    notifier: Notifier,
) {
    while let Some(job) = rx.recv().await {
        run_job(transport.as_ref(), &notifier, job).await;
    }
}

async fn run_job(transport: &dyn SyncTransport, notifier: &Notifier, job: SyncJob) {
    let started_at = Instant::now();
    let count = job.notes.len();
    match transport.push(&job.notes).await {
        Ok(()) => {
            info!(
                "event=sync_push module=sync status=ok seq={} notes={} duration_ms={}",
                job.seq,
                count,
                started_at.elapsed().as_millis()
            );
            notifier.success(format!("Synced {count} notes to remote"));
        }
        Err(err) => {
            error!(
                "event=sync_push module=sync status=error seq={} notes={} duration_ms={} error={}",
                job.seq,
                count,
                started_at.elapsed().as_millis(),
                err
            );
            notifier.error(format!("Remote sync failed: {err}"));
        }
    }
    let _ = job.done.send(());
}
