//! load(path): prefix validation, markers and load failures

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use webtest_harness::{
    Harness, HarnessConfig, LogEntry, LogKind, MemoryFrame, RunState, ScriptCatalog,
};

fn entry(kind: LogKind, message: &str) -> LogEntry {
    LogEntry::new(kind, message)
}

fn kinds(logs: &[LogEntry]) -> Vec<LogKind> {
    logs.iter().map(|e| e.kind).collect()
}

fn passing_script(h: &Harness) -> anyhow::Result<()> {
    h.add_named_test("title", |h: Harness| async move {
        h.is(1 + 1, 2, "arithmetic");
        anyhow::Ok(())
    })?;
    Ok(())
}

fn catalog() -> ScriptCatalog {
    ScriptCatalog::new()
        .with_script("tests/webtest/pass.js", passing_script)
        .with_script("tests/webtest/broken.js", |_h: &Harness| -> anyhow::Result<()> {
            anyhow::bail!("SyntaxError: unexpected token")
        })
        .with_script("tests/webtest/panics.js", |_h: &Harness| -> anyhow::Result<()> {
            panic!("script exploded")
        })
        .with_script("tests/webtest/slow.js", |h: &Harness| -> anyhow::Result<()> {
            h.add_named_test("slow", |h: Harness| async move {
                h.sleep(50).await;
                anyhow::Ok(())
            })?;
            Ok(())
        })
        .with_script("tests/webtest/abort.js", |h: &Harness| -> anyhow::Result<()> {
            h.add_named_test("bad", |_h: Harness| async {
                if true {
                    anyhow::bail!("boom");
                }
                anyhow::Ok(())
            })?;
            h.add_named_test("skipped", |_h: Harness| async { anyhow::Ok(()) })?;
            Ok(())
        })
}

fn harness() -> Harness {
    Harness::new(Arc::new(MemoryFrame::new()), Arc::new(catalog()))
}

#[tokio::test]
async fn rejects_paths_outside_prefix() {
    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = invoked.clone();
    let catalog = ScriptCatalog::new().with_script("not/allowed/path", move |_h: &Harness| -> anyhow::Result<()> {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let h = Harness::new(Arc::new(MemoryFrame::new()), Arc::new(catalog));

    h.load("not/allowed/path").await;

    assert_eq!(
        h.get_logs(),
        vec![entry(LogKind::Fail, "Unsupported test path not/allowed/path")]
    );
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn successful_load_is_bracketed_by_markers() {
    let h = harness();
    h.load("tests/webtest/pass.js").await;

    assert_eq!(
        h.get_logs(),
        vec![
            entry(LogKind::TestStart, "tests/webtest/pass.js"),
            entry(LogKind::Subtest, "title"),
            entry(LogKind::Info, "Entering test title"),
            entry(LogKind::Pass, "arithmetic"),
            entry(LogKind::Info, "Leaving test title"),
            entry(LogKind::TestEnd, "tests/webtest/pass.js"),
        ]
    );
    assert_eq!(h.run_state(), RunState::Completed);
}

#[tokio::test]
async fn missing_script_has_no_test_end() {
    let h = harness();
    h.load("tests/webtest/missing.js").await;

    assert_eq!(
        h.get_logs(),
        vec![
            entry(LogKind::TestStart, "tests/webtest/missing.js"),
            entry(
                LogKind::Fail,
                "Failed to load tests/webtest/missing.js: no such script"
            ),
        ]
    );
}

#[tokio::test]
async fn script_error_during_registration_has_no_test_end() {
    let h = harness();
    h.load("tests/webtest/broken.js").await;

    let logs = h.get_logs();
    assert_eq!(kinds(&logs), vec![LogKind::TestStart, LogKind::Fail]);
    assert!(logs[1].message.contains("SyntaxError: unexpected token"));
}

#[tokio::test]
async fn script_panic_during_registration_is_logged() {
    let h = harness();
    h.load("tests/webtest/panics.js").await;

    let logs = h.get_logs();
    assert_eq!(kinds(&logs), vec![LogKind::TestStart, LogKind::Fail]);
    assert!(logs[1].message.contains("panicked: script exploded"));
}

#[tokio::test]
async fn aborted_run_still_ends_with_test_end() {
    let h = harness();
    h.load("tests/webtest/abort.js").await;

    let logs = h.get_logs();
    assert_eq!(
        kinds(&logs),
        vec![
            LogKind::TestStart,
            LogKind::Subtest,
            LogKind::Info,
            LogKind::Fail,
            LogKind::Stack,
            LogKind::TestEnd,
        ]
    );
    assert!(!logs.contains(&entry(LogKind::Subtest, "skipped")));
    assert_eq!(h.pending_tests(), 0);
}

#[tokio::test]
async fn leftovers_from_failed_load_do_not_leak_into_next_load() {
    let catalog = ScriptCatalog::new()
        .with_script("tests/webtest/half.js", |h: &Harness| -> anyhow::Result<()> {
            h.add_named_test("orphan", |_h: Harness| async { anyhow::Ok(()) })?;
            anyhow::bail!("ReferenceError: foo is not defined")
        })
        .with_script("tests/webtest/pass.js", passing_script);
    let h = Harness::new(Arc::new(MemoryFrame::new()), Arc::new(catalog));

    h.load("tests/webtest/half.js").await;
    assert_eq!(h.pending_tests(), 1);
    h.load("tests/webtest/pass.js").await;

    let logs = h.get_logs();
    assert!(!logs.contains(&entry(LogKind::Subtest, "orphan")));
    assert!(logs.contains(&entry(LogKind::Subtest, "title")));
}

#[tokio::test]
async fn logs_accumulate_across_loads_until_drained() {
    let h = harness();
    h.load("tests/webtest/pass.js").await;
    h.load("tests/webtest/pass.js").await;

    let logs = h.get_logs();
    let starts = logs.iter().filter(|e| e.kind == LogKind::TestStart).count();
    let ends = logs.iter().filter(|e| e.kind == LogKind::TestEnd).count();
    assert_eq!((starts, ends), (2, 2));
}

#[tokio::test]
async fn concurrent_loads_do_not_interleave() {
    let h = harness();
    let a = {
        let h = h.clone();
        tokio::spawn(async move { h.load("tests/webtest/pass.js").await })
    };
    let b = {
        let h = h.clone();
        tokio::spawn(async move { h.load("tests/webtest/abort.js").await })
    };
    a.await.unwrap();
    b.await.unwrap();

    let logs = h.get_logs();
    let mut open = None;
    for e in &logs {
        match e.kind {
            LogKind::TestStart => {
                assert!(open.is_none(), "nested TEST_START in {:?}", logs);
                open = Some(e.message.clone());
            }
            LogKind::TestEnd => {
                assert_eq!(open.take().as_deref(), Some(e.message.as_str()));
            }
            _ => assert!(open.is_some()),
        }
    }
}

#[tokio::test]
async fn custom_prefix_from_config() {
    let config = HarnessConfig {
        path_prefix: "suite/".to_string(),
        ..Default::default()
    };
    let catalog = ScriptCatalog::new().with_script("suite/one.js", passing_script);
    let h = Harness::with_config(config, Arc::new(MemoryFrame::new()), Arc::new(catalog));

    h.load("tests/webtest/pass.js").await;
    h.load("suite/one.js").await;

    let logs = h.get_logs();
    assert_eq!(
        logs[0],
        entry(LogKind::Fail, "Unsupported test path tests/webtest/pass.js")
    );
    assert_eq!(logs[1], entry(LogKind::TestStart, "suite/one.js"));
    assert_eq!(logs.last().unwrap(), &entry(LogKind::TestEnd, "suite/one.js"));
}

#[tokio::test(start_paused = true)]
async fn rejected_path_waits_for_running_load() {
    let h = harness();
    let accepted = {
        let h = h.clone();
        tokio::spawn(async move { h.load("tests/webtest/slow.js").await })
    };
    while h.log().is_empty() {
        tokio::task::yield_now().await;
    }

    let rejected = {
        let h = h.clone();
        tokio::spawn(async move { h.load("elsewhere/test.js").await })
    };
    accepted.await.unwrap();
    rejected.await.unwrap();

    assert_eq!(
        h.get_logs(),
        vec![
            entry(LogKind::TestStart, "tests/webtest/slow.js"),
            entry(LogKind::Subtest, "slow"),
            entry(LogKind::Info, "Entering test slow"),
            entry(LogKind::Info, "Leaving test slow"),
            entry(LogKind::TestEnd, "tests/webtest/slow.js"),
            entry(LogKind::Fail, "Unsupported test path elsewhere/test.js"),
        ]
    );
}
