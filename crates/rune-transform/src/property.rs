//! Observable values with explicit notification.
//!
//! A [`Property`] stores a plain value plus the callbacks registered on it.
//! Owners update values silently with `replace` and call `notify` once every
//! value touched by an operation has been stored, so a compound mutation is
//! reported only after it is complete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Handle identifying a registered listener, filter or handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

type InvalidationListener = Box<dyn FnMut()>;
type ChangeListener<T> = Box<dyn FnMut(T, T)>;

/// An observable value.
///
/// Invalidation listeners are called with no arguments, change listeners with
/// `(old, new)`. Both fire only when the stored value actually differs.
pub struct Property<T> {
    name: &'static str,
    value: T,
    invalidation_listeners: Vec<(ListenerId, InvalidationListener)>,
    change_listeners: Vec<(ListenerId, ChangeListener<T>)>,
}

impl<T: Copy + PartialEq> Property<T> {
    pub fn new(name: &'static str, value: T) -> Self {
        Self {
            name,
            value,
            invalidation_listeners: Vec::new(),
            change_listeners: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Register a callback fired whenever the value changes.
    pub fn add_invalidation_listener(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = ListenerId::new();
        self.invalidation_listeners.push((id, Box::new(listener)));
        id
    }

    /// Register a callback receiving `(old, new)` whenever the value changes.
    pub fn add_change_listener(&mut self, listener: impl FnMut(T, T) + 'static) -> ListenerId {
        let id = ListenerId::new();
        self.change_listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener of either kind. Returns whether it was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listener_count();
        self.invalidation_listeners.retain(|(lid, _)| *lid != id);
        self.change_listeners.retain(|(lid, _)| *lid != id);
        before != self.listener_count()
    }

    pub fn listener_count(&self) -> usize {
        self.invalidation_listeners.len() + self.change_listeners.len()
    }

    /// Store `value` without notifying. Returns the previous value if it differed.
    pub(crate) fn replace(&mut self, value: T) -> Option<T> {
        if self.value == value {
            return None;
        }
        Some(std::mem::replace(&mut self.value, value))
    }

    /// Deliver the notification for a change from `old` to the current value.
    pub(crate) fn notify(&mut self, old: T) {
        let new = self.value;
        for (_, listener) in self.invalidation_listeners.iter_mut() {
            listener();
        }
        for (_, listener) in self.change_listeners.iter_mut() {
            listener(old, new);
        }
    }
}

/// Copies the value only; listeners stay with the original.
impl<T: Copy + PartialEq> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self::new(self.name, self.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("value", &self.value)
            .field(
                "listeners",
                &(self.invalidation_listeners.len() + self.change_listeners.len()),
            )
            .finish()
    }
}

/// Store all `values`, then notify each property whose value changed.
///
/// Returns whether anything changed.
pub(crate) fn assign_all<T, const N: usize>(
    mut properties: [&mut Property<T>; N],
    values: [T; N],
) -> bool
where
    T: Copy + PartialEq,
{
    let mut previous: [Option<T>; N] = [None; N];
    for ((property, value), old) in properties.iter_mut().zip(values).zip(previous.iter_mut()) {
        *old = property.replace(value);
    }

    let mut changed = false;
    for (property, old) in properties.into_iter().zip(previous) {
        if let Some(old) = old {
            property.notify(old);
            changed = true;
        }
    }
    changed
}
