//! Observer registration for state-change notifications.
//!
//! An [`Emitter`] keeps an ordered set of listeners and invokes them
//! synchronously on [`Emitter::fire`]. Registering returns a [`Subscription`]
//! handle; dropping or disposing the handle removes the listener.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// A registered change listener.
pub type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

type Listeners<E> = BTreeMap<u64, Listener<E>>;

/// Fan-out point for events of type `E`.
pub struct Emitter<E> {
    next_id: AtomicU64,
    listeners: Arc<Mutex<Listeners<E>>>,
}

impl<E: 'static> Emitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self { next_id: AtomicU64::new(1), listeners: Arc::new(Mutex::new(BTreeMap::new())) }
    }

    /// Register a listener. It stays registered for as long as the returned
    /// handle is alive.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, Arc::new(listener));

        let listeners: Weak<Mutex<Listeners<E>>> = Arc::downgrade(&self.listeners);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(listeners) = listeners.upgrade() {
                    listeners.lock().remove(&id);
                }
            })),
        }
    }

    /// Invoke every listener, in registration order.
    ///
    /// The listener set is snapshotted first, so a listener may subscribe or
    /// dispose handles without deadlocking.
    pub fn fire(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("listener_count", &self.listeners.lock().len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .finish()
    }
}

/// Handle returned by [`Emitter::subscribe`].
#[must_use = "dropping a Subscription unregisters the listener"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Unregister the listener now.
    pub fn dispose(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("active", &self.remove.is_some()).finish()
    }
}
