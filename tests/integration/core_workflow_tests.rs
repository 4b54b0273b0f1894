/*!
 * End-to-end tests: scheduler dispatching into the translation core
 */

use std::sync::Arc;

use lexipure::app_config::Config;
use lexipure::backends::mock::{MockBackend, ScriptPurityValidator};
use lexipure::cache::CacheMaintenance;
use lexipure::request::{Priority, TranslationMethod};
use lexipure::scheduler::Scheduler;

use crate::common;

fn scheduler_over(core: lexipure::service::TranslationCore) -> (Scheduler, Arc<lexipure::service::TranslationCore>) {
    common::init_test_logging();
    let core = Arc::new(core);
    let scheduler = Scheduler::new(Config::default().scheduler, core.clone());
    (scheduler, core)
}

#[tokio::test]
async fn test_workflow_cleanRequest_shouldComeBackValidated() {
    let (scheduler, _core) = scheduler_over(common::working_core());

    let result = scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();

    assert_eq!(result.method, TranslationMethod::PrimaryAi);
    assert_eq!(result.purity_score, 100.0);
    assert!(result.text.starts_with("[fr]"));
    assert!(!result.from_cache);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_repeatedRequest_shouldHitCache() {
    let (scheduler, core) = scheduler_over(common::working_core());

    let first = scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();
    let second = scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(second.method, TranslationMethod::Cache);
    assert_eq!(second.text, first.text);
    assert_eq!(core.cache().stats().hits, 1);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_failingPrimary_shouldRecoverThroughScheduler() {
    let (scheduler, _core) =
        scheduler_over(common::core_with_primary(MockBackend::failing("primary_ai")));

    let result = scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();

    assert_eq!(result.method, TranslationMethod::Secondary);
    assert!(result.recovery_action.is_some());
    assert!(!result.quality_degraded);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_contaminatedPrimary_shouldEndPure() {
    let (scheduler, _core) = scheduler_over(common::core_with_primary(
        MockBackend::contaminated("primary_ai", "процедура"),
    ));

    let result = scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();

    assert!(!result.text.contains("процедура"));
    assert_eq!(result.purity_score, 100.0);
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_batchWithPriorities_shouldAllSucceedInInputOrder() {
    let (scheduler, _core) = scheduler_over(common::working_core());

    let requests = vec![
        common::arabic_request("المادة الأولى").with_priority(Priority::Low),
        common::arabic_request("المادة الثانية").with_priority(Priority::RealTime),
        common::arabic_request("المادة الثالثة").with_priority(Priority::Normal),
    ];
    let ids: Vec<_> = requests.iter().map(|r| r.id).collect();

    let results = scheduler.submit_batch(requests).await;

    assert_eq!(results.len(), 3);
    for (result, id) in results.into_iter().zip(ids) {
        let processed = result.unwrap();
        assert_eq!(processed.request_id, id);
        assert_eq!(processed.purity_score, 100.0);
    }
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_maintenanceTask_shouldRunAgainstCoreCache() {
    let core = common::working_core();
    let maintenance = Arc::new(CacheMaintenance::new(
        core.cache(),
        Arc::new(ScriptPurityValidator::new()),
    ));
    let (scheduler, core) = scheduler_over(core);

    scheduler
        .submit(common::arabic_request(common::sample_legal_text()))
        .await
        .unwrap();
    assert!(!core.cache().is_empty());

    let report = maintenance.run_cycle().await;

    // A freshly written perfect entry survives every maintenance step
    assert_eq!(report.revalidation_invalidations, 0);
    assert_eq!(report.rule_invalidations, 0);
    assert!(!core.cache().is_empty());
    scheduler.shutdown().await;
}

#[tokio::test]
async fn test_workflow_shutdown_shouldDrainInFlightWork() {
    let (scheduler, _core) = scheduler_over(common::working_core());
    let scheduler = Arc::new(scheduler);

    let mut handles = Vec::new();
    for i in 0..5 {
        let scheduler = scheduler.clone();
        let request = common::arabic_request(&format!("المادة رقم {}", i));
        handles.push(tokio::spawn(async move { scheduler.submit(request).await }));
    }
    // Let the submissions enqueue before shutting down
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    scheduler.shutdown().await;

    // Everything accepted before shutdown either completed or was
    // failed explicitly; nothing hangs
    for handle in handles {
        let _ = handle.await.unwrap();
    }
    assert_eq!(scheduler.queue_depth(), 0);
}
