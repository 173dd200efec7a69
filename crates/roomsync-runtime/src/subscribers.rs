//! Subscriber lists for state-change and event callbacks.
//!
//! A [`Subscription`] handle shares a liveness flag with its registry
//! entry, so a callback may unsubscribe *itself* (or any other entry)
//! while a notification pass is running: the flag is consulted before each
//! invocation and dead entries are pruned afterwards, never mid-iteration.

use std::cell::Cell;
use std::rc::Rc;

/// Handle returned by a subscribe operation. Dropping the handle does
/// *not* unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct Subscription {
    active: Rc<Cell<bool>>,
}

impl Subscription {
    /// Deactivate the associated callback. Idempotent.
    pub fn unsubscribe(&self) {
        self.active.set(false);
    }

    /// Whether the callback will still be invoked.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// An ordered list of callbacks with individually revocable entries.
pub(crate) struct Callbacks<F: ?Sized> {
    entries: Vec<(Rc<Cell<bool>>, Box<F>)>,
}

impl<F: ?Sized> Callbacks<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a callback; the returned handle controls its lifetime.
    pub(crate) fn add(&mut self, callback: Box<F>) -> Subscription {
        let active = Rc::new(Cell::new(true));
        self.entries.push((Rc::clone(&active), callback));
        Subscription { active }
    }

    /// Invoke every live callback in registration order. `invoke` receives
    /// the callback itself so callers choose the argument shape.
    pub(crate) fn notify(&mut self, mut invoke: impl FnMut(&mut F)) {
        for (active, callback) in &mut self.entries {
            if active.get() {
                invoke(callback);
            }
        }
        self.entries.retain(|(active, _)| active.get());
    }

    /// Drop every entry, deactivating outstanding handles.
    pub(crate) fn clear(&mut self) {
        for (active, _) in &self.entries {
            active.set(false);
        }
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<F: ?Sized> Default for Callbacks<F> {
    fn default() -> Self {
        Self::new()
    }
}
