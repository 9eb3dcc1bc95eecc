//! Listener registry kept by a package
//!
//! Every `listen()` call installs one unbounded channel and hands the receiving
//! end back as a [`Listener`]. Listeners are removed individually by id, so one
//! consumer dropping its binding never affects another consumer of the package.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Receiving side of one installed listener
#[derive(Debug)]
pub struct Listener<N> {
    id: ListenerId,
    rx: mpsc::UnboundedReceiver<N>,
}

impl<N> Listener<N> {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Wait for the next notification; None once the package dropped this listener
    pub async fn recv(&mut self) -> Option<N> {
        self.rx.recv().await
    }
}

/// Package-side set of installed listeners
pub struct ListenerRegistry<N> {
    next_id: AtomicU64,
    senders: Mutex<BTreeMap<ListenerId, mpsc::UnboundedSender<N>>>,
}

impl<N> Default for ListenerRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> ListenerRegistry<N> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            senders: Mutex::new(BTreeMap::new()),
        }
    }

    /// Install a new listener
    pub fn add(&self) -> Listener<N> {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(id, tx);
        debug!(%id, "ListenerRegistry::add: installed");
        Listener { id, rx }
    }

    /// Remove one listener; returns false if it was not installed
    pub fn remove(&self, id: ListenerId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        debug!(%id, removed, "ListenerRegistry::remove");
        removed
    }

    /// Remove every listener, including ones installed by other consumers
    pub fn clear(&self) -> usize {
        let mut senders = self.lock();
        let count = senders.len();
        senders.clear();
        debug!(count, "ListenerRegistry::clear");
        count
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ListenerId, mpsc::UnboundedSender<N>>> {
        self.senders.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<N: Clone> ListenerRegistry<N> {
    /// Deliver a notification to every listener, pruning ones whose receiver is gone
    pub fn dispatch(&self, notification: N) -> usize {
        let mut senders = self.lock();
        senders.retain(|_, tx| tx.send(notification.clone()).is_ok());
        let delivered = senders.len();
        debug!(delivered, "ListenerRegistry::dispatch");
        delivered
    }
}
