/*!
 * Tests for priority scheduling, backpressure and deadlines
 */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use lexipure::app_config::SchedulerConfig;
use lexipure::errors::{CoreError, SchedulerError, TimeoutPhase};
use lexipure::language_utils::LanguagePair;
use lexipure::request::{Priority, ProcessedTranslation, TranslationMethod, TranslationRequest};
use lexipure::scheduler::{RequestProcessor, Scheduler};

/// Processor that records completion order
struct OrderProcessor {
    delay: Duration,
    completed: Mutex<Vec<String>>,
}

impl OrderProcessor {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            completed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RequestProcessor for OrderProcessor {
    async fn process(
        &self,
        request: TranslationRequest,
    ) -> Result<ProcessedTranslation, CoreError> {
        tokio::time::sleep(self.delay).await;
        self.completed.lock().push(request.text.clone());
        Ok(ProcessedTranslation::clean(
            request.id,
            format!("[fr] {}", request.text),
            TranslationMethod::PrimaryAi,
            0.9,
            100.0,
        ))
    }
}

fn config(max_concurrent: usize, multiplier: usize, timeout_ms: u64) -> SchedulerConfig {
    SchedulerConfig {
        max_concurrent,
        queue_capacity_multiplier: multiplier,
        dispatch_tick_ms: 10,
        request_timeout_ms: timeout_ms,
        shutdown_grace_ms: 1_000,
    }
}

fn request(text: &str, priority: Priority) -> TranslationRequest {
    TranslationRequest::new(text, LanguagePair::ar_to_fr()).with_priority(priority)
}

#[tokio::test]
async fn test_scheduler_distinctPriorities_shouldDispatchMostUrgentFirst() {
    let processor = Arc::new(OrderProcessor::new(15));
    // Wide tick so all submissions are queued before the first dispatch
    let mut cfg = config(1, 10, 30_000);
    cfg.dispatch_tick_ms = 60;
    let scheduler = Arc::new(Scheduler::new(cfg, processor.clone()));

    let mut handles = Vec::new();
    for (text, priority) in [
        ("low", Priority::Low),
        ("high", Priority::High),
        ("normal", Priority::Normal),
        ("urgent", Priority::Urgent),
        ("rt", Priority::RealTime),
    ] {
        let scheduler = scheduler.clone();
        let req = request(text, priority);
        handles.push(tokio::spawn(async move { scheduler.submit(req).await }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(
        *processor.completed.lock(),
        vec!["rt", "urgent", "high", "normal", "low"]
    );
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_scheduler_queueAtCapacity_shouldRejectImmediately() {
    let processor = Arc::new(OrderProcessor::new(300));
    // Capacity = 1 * 1 = 1 queued request
    let scheduler = Arc::new(Scheduler::new(config(1, 1, 30_000), processor));

    let first = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.submit(request("first", Priority::Normal)).await })
    };
    // Let the first request dispatch out of the queue
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.submit(request("second", Priority::Normal)).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Queue holds "second"; this submission must bounce without waiting
    let third = scheduler.submit(request("third", Priority::RealTime)).await;
    assert!(matches!(
        third,
        Err(CoreError::Scheduler(SchedulerError::QueueFull { capacity: 1 }))
    ));

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();
    assert_eq!(scheduler.stats().rejected_queue_full, 1);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_scheduler_deadlineDuringExecution_shouldTimeOut() {
    let processor = Arc::new(OrderProcessor::new(400));
    let scheduler = Scheduler::new(config(1, 10, 80), processor);

    let result = scheduler.submit(request("slow", Priority::Normal)).await;

    match result {
        Err(CoreError::Scheduler(SchedulerError::Timeout { phase, elapsed_ms })) => {
            assert_eq!(phase, TimeoutPhase::Executing);
            assert!(elapsed_ms >= 80);
        }
        other => panic!("expected executing timeout, got {:?}", other.map(|r| r.text)),
    }
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_scheduler_submitBatch_shouldReturnResultsInInputOrder() {
    let processor = Arc::new(OrderProcessor::new(5));
    let scheduler = Scheduler::new(config(2, 10, 30_000), processor);

    let requests = vec![
        TranslationRequest::new("alpha", LanguagePair::ar_to_fr()),
        TranslationRequest::new("beta", LanguagePair::fr_to_ar()),
        TranslationRequest::new("gamma", LanguagePair::ar_to_fr()),
        TranslationRequest::new("delta", LanguagePair::fr_to_ar()),
    ];

    let results = scheduler.submit_batch(requests).await;

    let texts: Vec<String> = results
        .into_iter()
        .map(|r| r.unwrap().text)
        .collect();
    assert_eq!(
        texts,
        vec!["[fr] alpha", "[fr] beta", "[fr] gamma", "[fr] delta"]
    );
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_scheduler_afterShutdown_shouldRefuseNewWork() {
    let processor = Arc::new(OrderProcessor::new(1));
    let scheduler = Scheduler::new(config(2, 10, 30_000), processor);

    scheduler.submit(request("before", Priority::Normal)).await.unwrap();
    scheduler.shutdown().await;

    let late = scheduler.submit(request("after", Priority::Normal)).await;
    assert!(matches!(
        late,
        Err(CoreError::Scheduler(SchedulerError::ShuttingDown))
    ));
}

#[tokio::test]
async fn test_scheduler_stats_shouldCountLifecycle() {
    let processor = Arc::new(OrderProcessor::new(5));
    let scheduler = Scheduler::new(config(2, 10, 30_000), processor);

    for i in 0..4 {
        scheduler
            .submit(request(&format!("r{}", i), Priority::Normal))
            .await
            .unwrap();
    }

    let stats = scheduler.stats();
    assert_eq!(stats.submitted, 4);
    assert_eq!(stats.dispatched, 4);
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.failed, 0);
    scheduler.shutdown().await;
}
