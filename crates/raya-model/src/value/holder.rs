//! Observable single-value holder
//!
//! A [`Variable`] is the value-carrying box used as a field type when a
//! property must stay mutable and observable behind a `final` reference.
//! Observers receive every change on a crossbeam channel, in the order the
//! changes were applied. Dropped signals are pruned on the next change or
//! subscription.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::Value;

static NEXT_HOLDER_ID: AtomicU64 = AtomicU64::new(1);

struct Observer {
    tx: Sender<Value>,
    alive: Weak<()>,
}

struct Inner {
    id: u64,
    value: RwLock<Value>,
    // Lock order: `value` before `observers`
    observers: Mutex<Vec<Observer>>,
}

/// Shared, observable holder of one value
#[derive(Clone)]
pub struct Variable {
    inner: Arc<Inner>,
}

impl Variable {
    /// Empty holder
    pub fn empty() -> Self {
        Self::of(Value::Null)
    }

    /// Holder containing `value`
    pub fn of(value: Value) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_HOLDER_ID.fetch_add(1, Ordering::Relaxed),
                value: RwLock::new(value),
                observers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Unique holder id
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Current value
    pub fn get(&self) -> Value {
        self.inner.value.read().clone()
    }

    /// Replace the value, returning the previous one
    ///
    /// Observers are notified only when the value actually changes.
    pub fn set(&self, value: Value) -> Value {
        let mut current = self.inner.value.write();
        let previous = std::mem::replace(&mut *current, value.clone());
        if previous != value {
            self.inner
                .observers
                .lock()
                .retain(|observer| observer.tx.send(value.clone()).is_ok());
        }
        previous
    }

    /// Whether the holder is empty
    pub fn is_absent(&self) -> bool {
        self.inner.value.read().is_null()
    }

    /// Whether the holder has a value
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Subscribe to future changes
    pub fn observe(&self) -> Signal {
        let (tx, rx) = channel::unbounded();
        let alive = Arc::new(());
        let mut observers = self.inner.observers.lock();
        observers.retain(|observer| observer.alive.strong_count() > 0);
        observers.push(Observer {
            tx,
            alive: Arc::downgrade(&alive),
        });
        Signal {
            receiver: Some(rx),
            _alive: Some(alive),
        }
    }

    /// Number of registered observers (pruned lazily)
    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    /// Whether both handles refer to the same holder
    pub fn ptr_eq(&self, other: &Variable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::empty()
    }
}

/// Change-notification handle
///
/// A signal obtained from something that cannot change is *absent*: it
/// never yields a value.
pub struct Signal {
    receiver: Option<Receiver<Value>>,
    _alive: Option<Arc<()>>,
}

impl Signal {
    /// A signal that never fires
    pub fn never() -> Self {
        Self {
            receiver: None,
            _alive: None,
        }
    }

    /// Whether this signal can never fire
    pub fn is_absent(&self) -> bool {
        self.receiver.is_none()
    }

    /// Next pending change, without blocking
    pub fn try_next(&self) -> Option<Value> {
        self.receiver.as_ref()?.try_recv().ok()
    }

    /// Wait up to `timeout` for the next change
    pub fn next_timeout(&self, timeout: Duration) -> Option<Value> {
        self.receiver.as_ref()?.recv_timeout(timeout).ok()
    }

    /// All pending changes
    pub fn drain(&self) -> Vec<Value> {
        match &self.receiver {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }
}
