//! In-memory page implementing [`Frame`]
//!
//! Elements live in a flat arena with parent links. Events dispatched on an
//! element run the handlers registered for that element and, when the event
//! bubbles, for each of its ancestors. Page-level signals (`load`,
//! `pageshow`) are emitted explicitly with [`MemoryFrame::fire`].

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, trace};

use crate::error::DomError;
use crate::frame::{DomEvent, ElementHandle, EventTarget, Frame};

/// Handler invoked for an event reaching an element
pub type EventHandler = Arc<dyn Fn(&MemoryFrame, ElementHandle, &DomEvent) + Send + Sync>;

/// An event recorded by [`MemoryFrame::dispatched`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: ElementHandle,
    pub kind: String,
    pub bubbles: bool,
}

#[derive(Debug)]
struct ElementState {
    tag: String,
    parent: Option<ElementHandle>,
    display: String,
    value: Option<String>,
    checked: Option<bool>,
    attached: bool,
}

#[derive(Default)]
struct PageState {
    elements: Vec<ElementState>,
    by_id: HashMap<String, ElementHandle>,
    handlers: Vec<(ElementHandle, String, EventHandler)>,
    pending: Vec<(EventTarget, String, oneshot::Sender<()>)>,
    dispatched: Vec<DispatchedEvent>,
}

impl PageState {
    fn element(&self, elem: ElementHandle) -> Result<&ElementState, DomError> {
        self.elements
            .get(elem.raw() as usize)
            .filter(|e| e.attached)
            .ok_or(DomError::Detached(elem.raw()))
    }

    /// Parents are validated by the caller, so they always precede the child.
    fn push(
        &mut self,
        parent: Option<ElementHandle>,
        tag: &str,
        id: &str,
        checkbox: bool,
    ) -> ElementHandle {
        let handle = ElementHandle::from_raw(self.elements.len() as u64);
        let is_control = matches!(tag, "input" | "textarea" | "select");
        self.elements.push(ElementState {
            tag: tag.to_string(),
            parent,
            display: default_display(tag).to_string(),
            value: is_control.then(String::new),
            checked: checkbox.then_some(false),
            attached: true,
        });
        if !id.is_empty() {
            self.by_id.insert(id.to_string(), handle);
        }
        trace!("Added <{}> {} as {}", tag, id, handle);
        handle
    }

    fn element_mut(&mut self, elem: ElementHandle) -> Result<&mut ElementState, DomError> {
        self.elements
            .get_mut(elem.raw() as usize)
            .filter(|e| e.attached)
            .ok_or(DomError::Detached(elem.raw()))
    }
}

/// In-memory content frame
#[derive(Default)]
pub struct MemoryFrame {
    state: Mutex<PageState>,
}

fn default_display(tag: &str) -> &'static str {
    match tag {
        "span" | "a" | "input" | "label" | "button" | "select" | "textarea" => "inline",
        _ => "block",
    }
}

impl MemoryFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element. An empty `id` leaves it unreachable by selector.
    pub fn add_element(&self, tag: &str, id: &str) -> ElementHandle {
        self.state.lock().push(None, tag, id, false)
    }

    /// Add an element under `parent`, which must be attached
    pub fn add_child(
        &self,
        parent: ElementHandle,
        tag: &str,
        id: &str,
    ) -> Result<ElementHandle, DomError> {
        self.insert(Some(parent), tag, id, false)
    }

    /// Add a text input with an empty value
    pub fn add_input(
        &self,
        parent: Option<ElementHandle>,
        id: &str,
    ) -> Result<ElementHandle, DomError> {
        self.insert(parent, "input", id, false)
    }

    /// Add an unchecked checkbox
    pub fn add_checkbox(
        &self,
        parent: Option<ElementHandle>,
        id: &str,
    ) -> Result<ElementHandle, DomError> {
        self.insert(parent, "input", id, true)
    }

    fn insert(
        &self,
        parent: Option<ElementHandle>,
        tag: &str,
        id: &str,
        checkbox: bool,
    ) -> Result<ElementHandle, DomError> {
        let mut state = self.state.lock();
        if let Some(parent) = parent {
            state.element(parent)?;
        }
        Ok(state.push(parent, tag, id, checkbox))
    }

    pub fn set_display(&self, elem: ElementHandle, display: &str) -> Result<(), DomError> {
        self.state.lock().element_mut(elem)?.display = display.to_string();
        Ok(())
    }

    /// Detach an element and its descendants
    pub fn remove(&self, elem: ElementHandle) -> Result<(), DomError> {
        let mut state = self.state.lock();
        state.element(elem)?;
        let mut doomed = vec![elem];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i];
            for (idx, e) in state.elements.iter().enumerate() {
                if e.attached && e.parent == Some(current) {
                    doomed.push(ElementHandle::from_raw(idx as u64));
                }
            }
            i += 1;
        }
        for handle in &doomed {
            state.elements[handle.raw() as usize].attached = false;
        }
        state.by_id.retain(|_, h| !doomed.contains(h));
        Ok(())
    }

    /// Register a handler for events of `kind` reaching `elem`
    pub fn on<F>(&self, elem: ElementHandle, kind: &str, handler: F)
    where
        F: Fn(&MemoryFrame, ElementHandle, &DomEvent) + Send + Sync + 'static,
    {
        self.state
            .lock()
            .handlers
            .push((elem, kind.to_string(), Arc::new(handler)));
    }

    /// Emit a page-level signal, waking every one-time listener registered
    /// for it. Returns the number of listeners woken.
    pub fn fire(&self, target: EventTarget, event: &str) -> usize {
        let woken: Vec<_> = {
            let mut state = self.state.lock();
            let (hits, rest) = std::mem::take(&mut state.pending)
                .into_iter()
                .partition(|(t, e, _)| *t == target && e == event);
            state.pending = rest;
            hits
        };

        let mut count = 0;
        for (_, _, tx) in woken {
            if tx.send(()).is_ok() {
                count += 1;
            }
        }
        debug!("Fired {} on {:?} ({} listener(s))", event, target, count);
        count
    }

    /// Events dispatched on elements so far, in dispatch order
    pub fn dispatched(&self) -> Vec<DispatchedEvent> {
        self.state.lock().dispatched.clone()
    }

    pub fn tag(&self, elem: ElementHandle) -> Result<String, DomError> {
        Ok(self.state.lock().element(elem)?.tag.clone())
    }
}

impl Frame for MemoryFrame {
    fn query(&self, selector: &str) -> Result<ElementHandle, DomError> {
        let id = selector
            .strip_prefix('#')
            .ok_or_else(|| DomError::UnsupportedSelector(selector.to_string()))?;
        self.state
            .lock()
            .by_id
            .get(id)
            .copied()
            .ok_or_else(|| DomError::NoMatch(selector.to_string()))
    }

    fn computed_display(&self, elem: ElementHandle) -> Result<String, DomError> {
        Ok(self.state.lock().element(elem)?.display.clone())
    }

    fn value(&self, elem: ElementHandle) -> Result<String, DomError> {
        self.state
            .lock()
            .element(elem)?
            .value
            .clone()
            .ok_or(DomError::WrongKind {
                id: elem.raw(),
                expected: "form control",
            })
    }

    fn set_value(&self, elem: ElementHandle, value: &str) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let slot = state
            .element_mut(elem)?
            .value
            .as_mut()
            .ok_or(DomError::WrongKind {
                id: elem.raw(),
                expected: "form control",
            })?;
        *slot = value.to_string();
        Ok(())
    }

    fn is_checked(&self, elem: ElementHandle) -> Result<bool, DomError> {
        self.state
            .lock()
            .element(elem)?
            .checked
            .ok_or(DomError::WrongKind {
                id: elem.raw(),
                expected: "checkbox",
            })
    }

    fn set_checked(&self, elem: ElementHandle, checked: bool) -> Result<(), DomError> {
        let mut state = self.state.lock();
        let slot = state
            .element_mut(elem)?
            .checked
            .as_mut()
            .ok_or(DomError::WrongKind {
                id: elem.raw(),
                expected: "checkbox",
            })?;
        *slot = checked;
        Ok(())
    }

    fn dispatch_event(&self, elem: ElementHandle, event: &DomEvent) -> Result<(), DomError> {
        // Handlers run without the lock so they can touch the page.
        let handlers: Vec<EventHandler> = {
            let mut state = self.state.lock();
            state.element(elem)?;
            state.dispatched.push(DispatchedEvent {
                target: elem,
                kind: event.kind.clone(),
                bubbles: event.bubbles,
            });

            let mut path = vec![elem];
            if event.bubbles {
                let parent_of =
                    |h: ElementHandle| state.elements.get(h.raw() as usize).and_then(|e| e.parent);
                let mut current = parent_of(elem);
                while let Some(parent) = current {
                    path.push(parent);
                    current = parent_of(parent);
                }
            }

            let mut handlers = Vec::new();
            for node in &path {
                for (target, kind, handler) in &state.handlers {
                    if target == node && *kind == event.kind {
                        handlers.push(handler.clone());
                    }
                }
            }
            handlers
        };

        for handler in handlers {
            handler(self, elem, event);
        }
        Ok(())
    }

    fn once(&self, target: EventTarget, event: &str) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        let mut state = self.state.lock();
        state.pending.retain(|(_, _, tx)| !tx.is_closed());
        state.pending.push((target, event.to_string(), tx));
        rx
    }
}
