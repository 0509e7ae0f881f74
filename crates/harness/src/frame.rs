//! DOM surface the harness observes and manipulates
//!
//! The harness never owns the page under test. It reaches it through a
//! [`Frame`], which stands for the content frame the test page is loaded into.

use std::fmt;
use tokio::sync::oneshot;

use crate::error::DomError;

/// Opaque reference to an element inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Page-level objects that emit lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    /// The frame element itself (`load`)
    Frame,
    /// The window of the document currently inside the frame (`pageshow`)
    ContentWindow,
}

/// A synthesized DOM event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: String,
    pub bubbles: bool,
}

impl DomEvent {
    pub fn bubbling(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            bubbles: true,
        }
    }
}

/// Content frame of the page under test
pub trait Frame: Send + Sync {
    /// Resolve an `#id` selector to an element
    fn query(&self, selector: &str) -> Result<ElementHandle, DomError>;

    /// Resolved `display` style of an element
    fn computed_display(&self, elem: ElementHandle) -> Result<String, DomError>;

    fn value(&self, elem: ElementHandle) -> Result<String, DomError>;

    fn set_value(&self, elem: ElementHandle, value: &str) -> Result<(), DomError>;

    fn is_checked(&self, elem: ElementHandle) -> Result<bool, DomError>;

    fn set_checked(&self, elem: ElementHandle, checked: bool) -> Result<(), DomError>;

    fn dispatch_event(&self, elem: ElementHandle, event: &DomEvent) -> Result<(), DomError>;

    /// Register a one-time listener. The receiver completes the first time
    /// `event` fires on `target` after this call.
    fn once(&self, target: EventTarget, event: &str) -> oneshot::Receiver<()>;
}
