//! Transform change events.
//!
//! Delivery is two-phase: every matching filter runs first, in registration
//! order; if none of them consumed the event, the matching handlers run, and
//! the single `on_transform_changed` handler runs last.
//!
//! # Usage
//!
//! ```ignore
//! use rune_transform::{Affine, Transform, TransformEventType};
//!
//! let mut affine = Affine::new();
//! affine.set_on_transform_changed(Some(Box::new(|event| {
//!     println!("now {}", event.matrix());
//! })));
//! affine.add_event_filter(TransformEventType::Any, |event| event.consume());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

use crate::matrix::Matrix3x4;
use crate::property::ListenerId;

/// Event type hierarchy for transform events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformEventType {
    /// Root type; matches every transform event.
    Any,
    /// The matrix of a transform changed.
    TransformChanged,
}

impl TransformEventType {
    /// Parent in the type hierarchy.
    pub fn super_type(self) -> Option<Self> {
        match self {
            Self::Any => None,
            Self::TransformChanged => Some(Self::Any),
        }
    }

    /// Whether an event of this type is delivered to a callback registered for `registered`.
    pub fn is_subtype_of(self, registered: Self) -> bool {
        let mut current = Some(self);
        while let Some(ty) = current {
            if ty == registered {
                return true;
            }
            current = ty.super_type();
        }
        false
    }
}

/// Event fired once per completed mutation of a transform.
///
/// Carries the committed matrix so callbacks can inspect the final state.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformChangedEvent {
    event_type: TransformEventType,
    matrix: Matrix3x4,
    consumed: bool,
}

impl TransformChangedEvent {
    pub fn new(matrix: Matrix3x4) -> Self {
        Self {
            event_type: TransformEventType::TransformChanged,
            matrix,
            consumed: false,
        }
    }

    pub fn event_type(&self) -> TransformEventType {
        self.event_type
    }

    /// The transform's matrix after the change.
    pub fn matrix(&self) -> &Matrix3x4 {
        &self.matrix
    }

    /// Mark the event consumed; handlers that have not run yet are skipped.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Callback type for filters and handlers.
pub type EventCallback = Box<dyn FnMut(&mut TransformChangedEvent)>;

struct Registration {
    id: ListenerId,
    event_type: TransformEventType,
    callback: EventCallback,
}

/// Filters and handlers registered on one transform.
#[derive(Default)]
pub struct EventDispatcher {
    filters: Vec<Registration>,
    handlers: Vec<Registration>,
    on_transform_changed: Option<EventCallback>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event_filter(
        &mut self,
        event_type: TransformEventType,
        filter: impl FnMut(&mut TransformChangedEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.filters.push(Registration {
            id,
            event_type,
            callback: Box::new(filter),
        });
        id
    }

    pub fn remove_event_filter(&mut self, id: ListenerId) -> bool {
        remove_registration(&mut self.filters, id)
    }

    pub fn add_event_handler(
        &mut self,
        event_type: TransformEventType,
        handler: impl FnMut(&mut TransformChangedEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.handlers.push(Registration {
            id,
            event_type,
            callback: Box::new(handler),
        });
        id
    }

    pub fn remove_event_handler(&mut self, id: ListenerId) -> bool {
        remove_registration(&mut self.handlers, id)
    }

    /// Replace the single convenience handler. `None` clears it.
    pub fn set_on_transform_changed(&mut self, handler: Option<EventCallback>) {
        self.on_transform_changed = handler;
    }

    pub fn has_on_transform_changed(&self) -> bool {
        self.on_transform_changed.is_some()
    }

    /// Whether no filter or handler of any kind is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.handlers.is_empty() && self.on_transform_changed.is_none()
    }

    /// Deliver `event` to filters, then (unless consumed) handlers.
    pub(crate) fn dispatch(&mut self, event: &mut TransformChangedEvent) {
        let ty = event.event_type();

        for filter in self.filters.iter_mut() {
            if ty.is_subtype_of(filter.event_type) {
                (filter.callback)(event);
            }
        }
        if event.is_consumed() {
            trace!(event_type = ?ty, "transform event consumed by filter");
            return;
        }

        for handler in self.handlers.iter_mut() {
            if ty.is_subtype_of(handler.event_type) {
                (handler.callback)(event);
            }
        }
        if let Some(handler) = self.on_transform_changed.as_mut() {
            handler(event);
        }
    }
}

fn remove_registration(list: &mut Vec<Registration>, id: ListenerId) -> bool {
    let before = list.len();
    list.retain(|r| r.id != id);
    before != list.len()
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("filters", &self.filters.len())
            .field("handlers", &self.handlers.len())
            .field("on_transform_changed", &self.on_transform_changed.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(
        log: &Rc<RefCell<Vec<&'static str>>>,
        tag: &'static str,
    ) -> impl FnMut(&mut TransformChangedEvent) + 'static {
        let log = log.clone();
        move |_| log.borrow_mut().push(tag)
    }

    #[test]
    fn test_filters_run_before_handlers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = EventDispatcher::new();
        d.set_on_transform_changed(Some(Box::new(recorder(&log, "on_changed"))));
        d.add_event_handler(TransformEventType::TransformChanged, recorder(&log, "handler"));
        d.add_event_filter(TransformEventType::Any, recorder(&log, "filter"));

        d.dispatch(&mut TransformChangedEvent::new(Matrix3x4::IDENTITY));
        assert_eq!(*log.borrow(), vec!["filter", "handler", "on_changed"]);
    }

    #[test]
    fn test_consumed_event_skips_handlers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = EventDispatcher::new();
        d.add_event_filter(TransformEventType::TransformChanged, |e| e.consume());
        d.add_event_filter(TransformEventType::TransformChanged, recorder(&log, "second filter"));
        d.add_event_handler(TransformEventType::Any, recorder(&log, "handler"));
        d.set_on_transform_changed(Some(Box::new(recorder(&log, "on_changed"))));

        let mut event = TransformChangedEvent::new(Matrix3x4::IDENTITY);
        d.dispatch(&mut event);
        assert!(event.is_consumed());
        assert_eq!(*log.borrow(), vec!["second filter"]);
    }

    #[test]
    fn test_remove_handler() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut d = EventDispatcher::new();
        let id = d.add_event_handler(TransformEventType::Any, recorder(&log, "handler"));
        assert!(d.remove_event_handler(id));
        assert!(!d.remove_event_filter(id));
        assert!(d.is_empty());

        d.dispatch(&mut TransformChangedEvent::new(Matrix3x4::IDENTITY));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_type_hierarchy() {
        assert!(TransformEventType::TransformChanged.is_subtype_of(TransformEventType::Any));
        assert!(!TransformEventType::Any.is_subtype_of(TransformEventType::TransformChanged));
    }
}
