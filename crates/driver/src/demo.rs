//! Bundled demo page and scripts
//!
//! Lets the `webtest` binary run without a browser. The page is a small
//! search form: typing into `#query` reveals `#results`, `#case-sensitive`
//! is a checkbox, and clicking `#open` navigates the frame, which fires
//! `load` and then `pageshow`.

use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::warn;
use webtest_harness::{DomError, EventTarget, Frame, Harness, MemoryFrame, ScriptCatalog};

pub const SEARCH_PATH: &str = "tests/webtest/search.js";
pub const VALUES_PATH: &str = "tests/webtest/values.js";
pub const FAILING_PATH: &str = "tests/webtest/failing.js";

/// Build the demo page
pub fn demo_page() -> Result<Arc<MemoryFrame>, DomError> {
    let frame = Arc::new(MemoryFrame::new());

    let form = frame.add_element("form", "search");
    let query = frame.add_input(Some(form), "query")?;
    frame.add_checkbox(Some(form), "case-sensitive")?;
    let results = frame.add_element("div", "results");
    frame.set_display(results, "none")?;
    let open = frame.add_element("a", "open");

    frame.on(form, "input", move |page, _, _| {
        let shown = page.value(query).map(|v| !v.is_empty()).unwrap_or(false);
        if let Err(err) = page.set_display(results, if shown { "block" } else { "none" }) {
            warn!("Demo page could not update #results: {}", err);
        }
    });

    let weak: Weak<MemoryFrame> = Arc::downgrade(&frame);
    frame.on(open, "click", move |_, _, _| {
        let weak = weak.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                if let Some(page) = weak.upgrade() {
                    page.fire(EventTarget::Frame, "load");
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                if let Some(page) = weak.upgrade() {
                    page.fire(EventTarget::ContentWindow, "pageshow");
                }
            });
        }
    });

    Ok(frame)
}

async fn typing_shows_results(h: Harness) -> anyhow::Result<()> {
    let query = h.query("#query")?;
    let results = h.query("#results")?;

    h.is(h.frame().computed_display(results)?, "none", "results start hidden");
    h.set_text(query, "fn main")?;
    h.wait_for_shown(results, "results shown after typing").await?;
    h.is(h.frame().value(query)?, "fn main", "query keeps typed text");
    Ok(())
}

async fn case_toggle(h: Harness) -> anyhow::Result<()> {
    let checkbox = h.query("#case-sensitive")?;

    h.ok(!h.frame().is_checked(checkbox)?, "unchecked by default");
    h.click_checkbox(checkbox)?;
    h.ok(h.frame().is_checked(checkbox)?, "checked after click");
    Ok(())
}

async fn navigation(h: Harness) -> anyhow::Result<()> {
    let link = h.query("#open")?;

    h.click(link)?;
    h.wait_for_load().await;
    h.info("navigated");
    Ok(())
}

async fn same_value_checks(h: Harness) -> anyhow::Result<()> {
    h.is(f64::NAN, f64::NAN, "nan check");
    h.isnot(0.0_f64, -0.0_f64, "signed zeros differ");
    h.is("webtest", String::from("webtest"), "strings");
    h.sleep(10).await;
    h.info("values done");
    Ok(())
}

async fn wrong_expectation(h: Harness) -> anyhow::Result<()> {
    h.is(2 + 2, 5, "arithmetic");
    h.ok(true, "keeps going after a failed check");
    Ok(())
}

async fn missing_element(h: Harness) -> anyhow::Result<()> {
    h.query("#does-not-exist")?;
    h.ok(true, "unreachable");
    Ok(())
}

async fn never_runs(h: Harness) -> anyhow::Result<()> {
    h.ok(true, "after abort");
    Ok(())
}

/// Scripts served by the demo catalog
pub fn demo_catalog() -> ScriptCatalog {
    ScriptCatalog::new()
        .with_script(SEARCH_PATH, |h: &Harness| -> anyhow::Result<()> {
            h.add_test(typing_shows_results)?;
            h.add_test(case_toggle)?;
            h.add_test(navigation)?;
            Ok(())
        })
        .with_script(VALUES_PATH, |h: &Harness| -> anyhow::Result<()> {
            h.add_test(same_value_checks)?;
            Ok(())
        })
        .with_script(FAILING_PATH, |h: &Harness| -> anyhow::Result<()> {
            h.add_test(wrong_expectation)?;
            h.add_test(missing_element)?;
            h.add_test(never_runs)?;
            Ok(())
        })
}
