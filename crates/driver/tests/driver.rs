//! End-to-end runs of the demo catalog through the driver

use std::sync::Arc;

use webtest_driver::demo::{demo_catalog, demo_page, FAILING_PATH, SEARCH_PATH, VALUES_PATH};
use webtest_driver::{Driver, DriverConfig, RunStatus};
use webtest_harness::{Harness, LogKind, ScriptCatalog};

fn driver_with(catalog: ScriptCatalog, config: DriverConfig) -> Driver {
    let harness = Harness::with_config(config.harness.clone(), demo_page().unwrap(), Arc::new(catalog));
    Driver::new(harness, config)
}

fn driver() -> Driver {
    driver_with(demo_catalog(), DriverConfig::default())
}

#[tokio::test(start_paused = true)]
async fn search_script_passes() {
    let report = driver().run_path(SEARCH_PATH).await.unwrap();

    assert_eq!(report.status, RunStatus::Passed, "{:#?}", report.logs);
    let names: Vec<_> = report.subtests.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["typing_shows_results", "case_toggle", "navigation"]);
    assert!(report.subtests.iter().all(|s| s.completed));
    assert_eq!(report.logs.first().unwrap().kind, LogKind::TestStart);
    assert_eq!(report.logs.last().unwrap().kind, LogKind::TestEnd);
}

#[tokio::test(start_paused = true)]
async fn values_script_uses_same_value_semantics() {
    let report = driver().run_path(VALUES_PATH).await.unwrap();

    assert_eq!(report.status, RunStatus::Passed);
    assert_eq!(report.passed, 3);
}

#[tokio::test(start_paused = true)]
async fn failing_script_aborts_after_error() {
    let report = driver().run_path(FAILING_PATH).await.unwrap();

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.subtests.len(), 2);
    assert_eq!(
        report.subtests[0].failures,
        vec!["arithmetic - Got 4, expected 5"]
    );
    assert!(report.subtests[0].completed);
    assert!(!report.subtests[1].completed);
    assert_eq!(
        report.subtests[1].failures,
        vec!["No element matches selector #does-not-exist"]
    );
    assert!(report.logs.iter().any(|e| e.kind == LogKind::Stack));
}

#[tokio::test(start_paused = true)]
async fn unknown_script_is_a_load_failure() {
    let report = driver().run_path("tests/webtest/nope.js").await.unwrap();

    assert_eq!(report.status, RunStatus::LoadFailed);
    assert_eq!(report.failed, 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_path_is_a_load_failure() {
    let report = driver().run_path("elsewhere/test.js").await.unwrap();

    assert_eq!(report.status, RunStatus::LoadFailed);
    assert_eq!(report.logs.len(), 1);
    assert_eq!(report.logs[0].kind, LogKind::Fail);
}

#[tokio::test(start_paused = true)]
async fn hung_test_times_out() {
    let catalog = ScriptCatalog::new().with_script(
        "tests/webtest/hang.js",
        |h: &Harness| -> anyhow::Result<()> {
            h.add_named_test("waits forever", |h: Harness| async move {
                h.wait_for_load().await;
                anyhow::Ok(())
            })?;
            Ok(())
        },
    );
    let config = DriverConfig {
        timeout_secs: 2,
        ..Default::default()
    };

    let report = driver_with(catalog, config)
        .run_path("tests/webtest/hang.js")
        .await
        .unwrap();

    assert_eq!(report.status, RunStatus::TimedOut);
    assert_eq!(report.subtests.len(), 1);
    assert!(!report.subtests[0].completed);
}

#[tokio::test(start_paused = true)]
async fn suite_is_written_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = DriverConfig {
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let driver = driver_with(demo_catalog(), config);

    let suite = driver
        .run_paths(&[SEARCH_PATH, FAILING_PATH])
        .await
        .unwrap();
    assert_eq!((suite.total, suite.passed, suite.failed), (2, 1, 1));

    let path = driver.write_results(&suite).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["results"][0]["status"], "passed");
    assert_eq!(json["results"][1]["status"], "failed");
    assert_eq!(json["results"][0]["logs"][0][0], "TEST_START");
}

fn spinning_catalog() -> ScriptCatalog {
    demo_catalog().with_script(
        "tests/webtest/spin.js",
        |h: &Harness| -> anyhow::Result<()> {
            h.add_named_test("spins", |h: Harness| async move {
                for _ in 0u64.. {
                    h.ok(false, "leftover from spin");
                    tokio::task::yield_now().await;
                }
                anyhow::Ok(())
            })?;
            Ok(())
        },
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn timed_out_run_does_not_leak_into_next_path() {
    let config = DriverConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let driver = driver_with(spinning_catalog(), config);

    let spun = driver.run_path("tests/webtest/spin.js").await.unwrap();
    assert_eq!(spun.status, RunStatus::TimedOut);
    assert!(spun.failed > 0);

    let clean = driver.run_path(VALUES_PATH).await.unwrap();
    assert_eq!(clean.status, RunStatus::Passed, "{:?}", clean.first_failure());
    assert!(clean
        .logs
        .iter()
        .all(|e| e.message != "leftover from spin"));
    assert_eq!(
        clean.logs.first().map(|e| (e.kind, e.message.as_str())),
        Some((LogKind::TestStart, VALUES_PATH))
    );
    assert!(driver.harness().get_logs().is_empty());
}

#[tokio::test(start_paused = true)]
async fn aborted_run_does_not_leak_into_next_path() {
    let driver = driver();

    let failing = driver.run_path(FAILING_PATH).await.unwrap();
    assert_eq!(failing.status, RunStatus::Failed);

    let clean = driver.run_path(VALUES_PATH).await.unwrap();
    assert_eq!(clean.status, RunStatus::Passed);
    assert_eq!(clean.failed, 0);
    assert!(clean
        .logs
        .iter()
        .all(|e| e.message != FAILING_PATH && e.kind != LogKind::Stack));
}
