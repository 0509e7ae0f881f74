//! Synchronization and input helpers for test bodies
//!
//! None of the waits here can be cancelled. `wait_for_condition` is bounded
//! by its try count and reports a timeout as a `FAIL` entry, not an error.
//! `wait_for_load` has no bound at all.

use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::config::WaitDefaults;
use crate::error::DomError;
use crate::frame::{DomEvent, ElementHandle, EventTarget};
use crate::harness::Harness;
use crate::log::LogKind;

/// Polling parameters for [`Harness::wait_for_condition_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    pub max_tries: u32,
}

impl WaitOptions {
    pub fn new(interval_ms: u64, max_tries: u32) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
            max_tries,
        }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        WaitDefaults::default().into()
    }
}

impl From<WaitDefaults> for WaitOptions {
    fn from(defaults: WaitDefaults) -> Self {
        Self::new(defaults.interval_ms, defaults.max_tries)
    }
}

/// Result of one poll of a wait predicate
pub trait Condition {
    fn into_outcome(self) -> anyhow::Result<bool>;
}

impl Condition for bool {
    fn into_outcome(self) -> anyhow::Result<bool> {
        Ok(self)
    }
}

impl<E> Condition for Result<bool, E>
where
    E: Into<anyhow::Error>,
{
    fn into_outcome(self) -> anyhow::Result<bool> {
        self.map_err(Into::into)
    }
}

/// Suspend the caller for `ms` milliseconds
pub async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

async fn signal(rx: oneshot::Receiver<()>, what: &str) {
    if rx.await.is_err() {
        // The frame dropped the listener; the signal can no longer arrive.
        warn!("Listener for {} was dropped, waiting indefinitely", what);
        futures::future::pending::<()>().await;
    }
}

impl Harness {
    pub async fn sleep(&self, ms: u64) {
        sleep(ms).await;
    }

    /// Poll `predicate` with the configured defaults
    pub async fn wait_for_condition<P, C>(&self, predicate: P, msg: &str) -> anyhow::Result<()>
    where
        P: FnMut() -> C,
        C: Condition,
    {
        let options = WaitOptions::from(self.config().wait);
        self.wait_for_condition_with(predicate, msg, options).await
    }

    /// Poll `predicate` until it holds or `max_tries` polls have failed.
    /// Logs `PASS msg` on success and a `FAIL` on timeout; only an error
    /// returned by the predicate itself is propagated.
    pub async fn wait_for_condition_with<P, C>(
        &self,
        mut predicate: P,
        msg: &str,
        options: WaitOptions,
    ) -> anyhow::Result<()>
    where
        P: FnMut() -> C,
        C: Condition,
    {
        for attempt in 1..=options.max_tries {
            if predicate().into_outcome()? {
                debug!("Condition {:?} met after {} poll(s)", msg, attempt);
                self.log().append(LogKind::Pass, msg);
                return Ok(());
            }
            if attempt < options.max_tries {
                tokio::time::sleep(options.interval).await;
            }
        }

        self.log().append(
            LogKind::Fail,
            format!("{} - timed out after {} tries.", msg, options.max_tries),
        );
        Ok(())
    }

    /// Wait until the element's resolved `display` is not `none`
    pub async fn wait_for_shown(&self, elem: ElementHandle, msg: &str) -> anyhow::Result<()> {
        let options = WaitOptions::from(self.config().wait);
        self.wait_for_shown_with(elem, msg, options).await
    }

    pub async fn wait_for_shown_with(
        &self,
        elem: ElementHandle,
        msg: &str,
        options: WaitOptions,
    ) -> anyhow::Result<()> {
        let frame = self.frame();
        self.wait_for_condition_with(
            || frame.computed_display(elem).map(|display| display != "none"),
            msg,
            options,
        )
        .await
    }

    /// Resolve once the frame has fired `load` and then its content window
    /// has fired `pageshow`. The `pageshow` listener is only registered
    /// after `load` arrives. There is no timeout.
    pub async fn wait_for_load(&self) {
        signal(self.frame().once(EventTarget::Frame, "load"), "load").await;
        self.info("Frame loaded, waiting for pageshow");

        signal(
            self.frame().once(EventTarget::ContentWindow, "pageshow"),
            "pageshow",
        )
        .await;
        self.info("Page shown");
    }

    /// Set an element's value and fire a bubbling `input` event
    pub fn set_text(&self, elem: ElementHandle, text: &str) -> Result<(), DomError> {
        self.frame().set_value(elem, text)?;
        self.frame().dispatch_event(elem, &DomEvent::bubbling("input"))
    }

    /// Toggle a checkbox and fire a bubbling `change` event
    pub fn click_checkbox(&self, elem: ElementHandle) -> Result<(), DomError> {
        let checked = self.frame().is_checked(elem)?;
        self.frame().set_checked(elem, !checked)?;
        self.frame().dispatch_event(elem, &DomEvent::bubbling("change"))
    }

    pub fn click(&self, elem: ElementHandle) -> Result<(), DomError> {
        self.frame().dispatch_event(elem, &DomEvent::bubbling("click"))
    }
}
