//! Fixed-window ingestion batching.
//!
//! The first draft pushed into an idle batcher opens a window and arms one
//! timer. Drafts pushed while the window is open join the same batch and get a
//! clone of the same handle. When the timer fires the whole queue is handed to
//! the sink as one transition, in arrival order.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use console_types::MessageDraft;
use futures::FutureExt;
use futures::future::Shared;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::observability::SessionEvent;

/// Outcome of one applied batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Batch sequence number.
    pub batch_id: u64,
    /// Drafts stored.
    pub applied: usize,
    /// Drafts the store refused.
    pub rejected: usize,
}

/// Receiver of whole batches.
pub trait BatchSink: Send + 'static {
    /// Apply every draft of one batch as a single transition.
    fn apply_batch(&mut self, batch_id: u64, drafts: Vec<MessageDraft>) -> BatchReport;
}

/// Completion handle shared by every push into one batch.
#[derive(Clone)]
pub struct BatchHandle {
    batch_id: u64,
    outcome: Shared<oneshot::Receiver<BatchReport>>,
}

impl std::fmt::Debug for BatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchHandle")
            .field("batch_id", &self.batch_id)
            .finish_non_exhaustive()
    }
}

impl BatchHandle {
    /// Batch this handle waits on.
    #[must_use]
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }
}

impl Future for BatchHandle {
    type Output = Result<BatchReport, SessionError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let batch_id = self.batch_id;
        self.outcome
            .poll_unpin(cx)
            .map(|outcome| outcome.map_err(|_| SessionError::BatchAbandoned { batch_id }))
    }
}

struct PendingBatch {
    id: u64,
    drafts: Vec<MessageDraft>,
    done: oneshot::Sender<BatchReport>,
    handle: BatchHandle,
    timer: JoinHandle<()>,
}

struct BatcherInner<S> {
    sink: S,
    pending: Option<PendingBatch>,
    next_batch_id: u64,
}

/// Coalesces drafts into fixed-window batches.
pub struct IngestionBatcher<S: BatchSink> {
    inner: Arc<Mutex<BatcherInner<S>>>,
    window: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S: BatchSink> IngestionBatcher<S> {
    /// Batcher with the given window; a zero window is raised to 1 ms.
    pub fn new(sink: S, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BatcherInner {
                sink,
                pending: None,
                next_batch_id: 1,
            })),
            window: window.max(Duration::from_millis(1)),
        }
    }

    /// Batching window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queue a draft.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RuntimeUnavailable`] when called outside a
    /// tokio runtime and no window is open.
    pub fn push(&self, draft: MessageDraft) -> Result<BatchHandle, SessionError> {
        let mut inner = lock(&self.inner);
        if let Some(pending) = inner.pending.as_mut() {
            pending.drafts.push(draft);
            return Ok(pending.handle.clone());
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SessionError::RuntimeUnavailable {
                what: "a batch timer",
            })?;
        let id = inner.next_batch_id;
        inner.next_batch_id += 1;
        let (done, outcome) = oneshot::channel();
        let handle = BatchHandle {
            batch_id: id,
            outcome: outcome.shared(),
        };
        let shared = Arc::clone(&self.inner);
        let window = self.window;
        let timer = runtime.spawn(async move {
            tokio::time::sleep(window).await;
            Self::fire(&shared, id);
        });
        tracing::debug!(
            event = SessionEvent::BatchScheduled.as_str(),
            batch_id = id,
            window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            "ingestion batch window opened"
        );
        inner.pending = Some(PendingBatch {
            id,
            drafts: vec![draft],
            done,
            handle: handle.clone(),
            timer,
        });
        Ok(handle)
    }

    fn fire(inner: &Mutex<BatcherInner<S>>, batch_id: u64) {
        let mut inner = lock(inner);
        if inner
            .pending
            .as_ref()
            .is_none_or(|pending| pending.id != batch_id)
        {
            return;
        }
        if let Some(pending) = inner.pending.take() {
            let report = Self::apply(&mut inner.sink, pending);
            tracing::debug!(
                event = SessionEvent::BatchApplied.as_str(),
                batch_id = report.batch_id,
                applied = report.applied,
                rejected = report.rejected,
                "ingestion batch applied"
            );
        }
    }

    fn apply(sink: &mut S, pending: PendingBatch) -> BatchReport {
        let PendingBatch {
            id, drafts, done, ..
        } = pending;
        let report = sink.apply_batch(id, drafts);
        // Every handle may already be dropped; the batch still counts.
        let _ = done.send(report);
        report
    }

    /// Apply the open batch now instead of waiting for the timer.
    pub fn flush(&self) -> Option<BatchReport> {
        let mut inner = lock(&self.inner);
        let pending = inner.pending.take()?;
        pending.timer.abort();
        let report = Self::apply(&mut inner.sink, pending);
        tracing::debug!(
            event = SessionEvent::BatchFlushed.as_str(),
            batch_id = report.batch_id,
            applied = report.applied,
            rejected = report.rejected,
            "ingestion batch flushed"
        );
        Some(report)
    }

    /// Drop the open batch without applying it.
    ///
    /// Outstanding handles resolve with [`SessionError::BatchAbandoned`].
    /// Returns how many drafts were dropped.
    pub fn abandon(&self) -> usize {
        let Some(pending) = lock(&self.inner).pending.take() else {
            return 0;
        };
        pending.timer.abort();
        let dropped = pending.drafts.len();
        tracing::debug!(
            event = SessionEvent::BatchAbandoned.as_str(),
            batch_id = pending.id,
            dropped,
            "ingestion batch abandoned"
        );
        dropped
    }

    /// Drafts waiting in the open batch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        lock(&self.inner)
            .pending
            .as_ref()
            .map_or(0, |pending| pending.drafts.len())
    }

    /// Run `f` against the sink, serialized with batch application.
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut lock(&self.inner).sink)
    }
}

impl<S: BatchSink> Drop for IngestionBatcher<S> {
    fn drop(&mut self) {
        if let Some(pending) = lock(&self.inner).pending.take() {
            pending.timer.abort();
        }
    }
}
