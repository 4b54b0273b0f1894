/*!
 * Priority-aware request scheduler.
 *
 * Requests wait in a bounded multi-lane queue and are dispatched on a
 * fixed tick into a bounded pool of concurrent executions. Admission is
 * immediate: a full queue rejects rather than blocking the submitter, and
 * the caller decides whether to retry.
 */

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::app_config::SchedulerConfig;
use crate::errors::{CoreError, SchedulerError, TimeoutPhase};
use crate::request::{ProcessedTranslation, TranslationRequest};

use super::queue::{PriorityQueue, QueueItem};

/// The processing seam the scheduler dispatches into.
///
/// In production this is the translation core; tests plug in lightweight
/// processors to observe dispatch behavior in isolation.
#[async_trait]
pub trait RequestProcessor: Send + Sync {
    /// Process one request end to end
    async fn process(&self, request: TranslationRequest)
        -> Result<ProcessedTranslation, CoreError>;
}

/// Scheduler counters
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerStats {
    /// Requests admitted to the queue
    pub submitted: u64,
    /// Requests handed to the processor
    pub dispatched: u64,
    /// Requests that completed successfully
    pub completed: u64,
    /// Requests that finished with an error
    pub failed: u64,
    /// Requests rejected because the queue was full
    pub rejected_queue_full: u64,
    /// Requests whose deadline expired while still queued
    pub expired_queued: u64,
    /// Requests whose deadline expired while executing
    pub timed_out_executing: u64,
}

struct SchedulerInner {
    queue: Mutex<PriorityQueue>,
    processor: Arc<dyn RequestProcessor>,
    config: SchedulerConfig,
    in_flight: AtomicUsize,
    shutting_down: AtomicBool,
    stats: Mutex<SchedulerStats>,
}

impl SchedulerInner {
    /// One dispatch tick: drop overdue queued items, then fill free
    /// execution slots from the lanes
    fn dispatch_ready(self: &Arc<Self>) {
        let now = Instant::now();
        let expired = self.queue.lock().expire_overdue(now);
        for item in expired {
            let elapsed_ms = item.enqueued_at.elapsed().as_millis() as u64;
            self.stats.lock().expired_queued += 1;
            warn!(
                "Request {} expired after {}ms in queue",
                item.request.id, elapsed_ms
            );
            let _ = item.responder.send(Err(CoreError::Scheduler(SchedulerError::Timeout {
                elapsed_ms,
                phase: TimeoutPhase::Queued,
            })));
        }

        while self.in_flight.load(Ordering::SeqCst) < self.config.max_concurrent {
            let item = match self.queue.lock().pop_next() {
                Some(item) => item,
                None => break,
            };
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            self.stats.lock().dispatched += 1;
            self.execute(item);
        }
    }

    fn execute(self: &Arc<Self>, item: QueueItem) {
        let inner = self.clone();
        tokio::spawn(async move {
            let remaining = item.deadline.saturating_duration_since(Instant::now());
            debug!(
                "Dispatching request {} ({:?}, {}ms budget left)",
                item.request.id,
                item.request.priority,
                remaining.as_millis()
            );

            let result = match tokio::time::timeout(
                remaining,
                inner.processor.process(item.request.clone()),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => {
                    let elapsed_ms = item.enqueued_at.elapsed().as_millis() as u64;
                    inner.stats.lock().timed_out_executing += 1;
                    Err(CoreError::Scheduler(SchedulerError::Timeout {
                        elapsed_ms,
                        phase: TimeoutPhase::Executing,
                    }))
                }
            };

            {
                let mut stats = inner.stats.lock();
                match &result {
                    Ok(_) => stats.completed += 1,
                    Err(_) => stats.failed += 1,
                }
            }

            // Submitter may have given up; a dead channel is not an error
            let _ = item.responder.send(result);
            inner.in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }
}

/// The priority-aware scheduler
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
    dispatch_handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl Scheduler {
    /// Create a scheduler and start its dispatch loop
    pub fn new(config: SchedulerConfig, processor: Arc<dyn RequestProcessor>) -> Self {
        let inner = Arc::new(SchedulerInner {
            queue: Mutex::new(PriorityQueue::new(config.queue_capacity())),
            processor,
            config,
            in_flight: AtomicUsize::new(0),
            shutting_down: AtomicBool::new(false),
            stats: Mutex::new(SchedulerStats::default()),
        });

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let loop_inner = inner.clone();
        let handle = tokio::spawn(async move {
            let mut tick = tokio::time::interval(loop_inner.config.dispatch_tick());
            tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tick.tick() => loop_inner.dispatch_ready(),
                    _ = &mut shutdown_rx => break,
                }
            }
        });

        Self {
            inner,
            dispatch_handle: Mutex::new(Some(handle)),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        }
    }

    /// Submit a request and wait for its result
    pub async fn submit(
        &self,
        request: TranslationRequest,
    ) -> Result<ProcessedTranslation, CoreError> {
        let rx = self.enqueue(request)?;
        rx.await
            .map_err(|_| CoreError::Scheduler(SchedulerError::ShuttingDown))?
    }

    /// Submit a batch. Requests are enqueued grouped by language pair so
    /// related work dispatches together; results come back in input order.
    pub async fn submit_batch(
        &self,
        requests: Vec<TranslationRequest>,
    ) -> Vec<Result<ProcessedTranslation, CoreError>> {
        // Group indices by language-pair key, first-seen group order
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        for (index, request) in requests.iter().enumerate() {
            let key = request.languages.key();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, indices)) => indices.push(index),
                None => groups.push((key, vec![index])),
            }
        }

        let mut slots: Vec<Option<Result<ProcessedTranslation, CoreError>>> =
            requests.iter().map(|_| None).collect();
        let mut pending = Vec::new();

        for (_, indices) in groups {
            for index in indices {
                match self.enqueue(requests[index].clone()) {
                    Ok(rx) => pending.push((index, rx)),
                    Err(e) => slots[index] = Some(Err(e)),
                }
            }
        }

        let awaited = join_all(
            pending
                .into_iter()
                .map(|(index, rx)| async move { (index, rx.await) }),
        )
        .await;
        for (index, result) in awaited {
            let result = result
                .map_err(|_| CoreError::Scheduler(SchedulerError::ShuttingDown))
                .and_then(|r| r);
            slots[index] = Some(result);
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| Err(CoreError::Scheduler(SchedulerError::ShuttingDown)))
            })
            .collect()
    }

    /// Drain in-flight work within the grace period, then fail whatever is
    /// still queued and stop the dispatch loop
    pub async fn shutdown(&self) {
        self.inner.shutting_down.store(true, Ordering::SeqCst);
        info!("Scheduler shutting down, draining in-flight work");

        let deadline = Instant::now() + self.inner.config.shutdown_grace();
        while Instant::now() < deadline {
            let idle = self.inner.queue.lock().is_empty()
                && self.inner.in_flight.load(Ordering::SeqCst) == 0;
            if idle {
                break;
            }
            tokio::time::sleep(self.inner.config.dispatch_tick()).await;
        }

        if let Some(tx) = self.shutdown_tx.lock().take() {
            let _ = tx.send(());
        }

        let leftovers = self.inner.queue.lock().drain_all();
        if !leftovers.is_empty() {
            warn!("{} queued requests failed by shutdown", leftovers.len());
        }
        for item in leftovers {
            let _ = item
                .responder
                .send(Err(CoreError::Scheduler(SchedulerError::ShuttingDown)));
        }

        let handle = self.dispatch_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Requests currently waiting
    pub fn queue_depth(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Requests currently executing
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Copy of the counters
    pub fn stats(&self) -> SchedulerStats {
        *self.inner.stats.lock()
    }

    fn enqueue(
        &self,
        request: TranslationRequest,
    ) -> Result<oneshot::Receiver<Result<ProcessedTranslation, CoreError>>, CoreError> {
        if self.inner.shutting_down.load(Ordering::SeqCst) {
            return Err(CoreError::Scheduler(SchedulerError::ShuttingDown));
        }

        let (tx, rx) = oneshot::channel();
        let now = Instant::now();
        let item = QueueItem {
            request,
            enqueued_at: now,
            deadline: now + self.inner.config.request_timeout(),
            responder: tx,
        };

        let mut queue = self.inner.queue.lock();
        match queue.push(item) {
            Ok(()) => {
                drop(queue);
                self.inner.stats.lock().submitted += 1;
                Ok(rx)
            }
            Err(_) => {
                let capacity = queue.capacity();
                drop(queue);
                self.inner.stats.lock().rejected_queue_full += 1;
                Err(CoreError::Scheduler(SchedulerError::QueueFull { capacity }))
            }
        }
    }
}
