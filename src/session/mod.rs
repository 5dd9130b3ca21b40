//! Per-context session state.
//!
//! Each logical context (one configured integration instance) owns one
//! session: the current candidate list, the selection, the keyed lookup for
//! the latest search, the enable gate, and the status record. Sessions are
//! created lazily by a single constructor and replaced wholesale by the
//! workflows; observers get a no-payload change signal and re-read a
//! published snapshot.

mod status;

pub use status::{Stage, StatusRecord};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::candidates::Candidate;
use crate::catalog::CatalogCache;

/// Sentinel label meaning "no real candidate".
pub const SENTINEL_NONE: &str = "none";

/// Sentinel label meaning "the search toggle is off".
pub const SENTINEL_DISABLED: &str = "disabled";

/// Mutable per-context state. Only workflows touch this, under the
/// session's async lock.
pub(crate) struct SessionCore {
    pub(crate) candidates: Vec<String>,
    pub(crate) selected: String,
    pub(crate) lookup: HashMap<String, Candidate>,
    pub(crate) detail: Option<Candidate>,
    pub(crate) status: StatusRecord,
    pub(crate) search_enabled: bool,
}

impl SessionCore {
    fn new() -> Self {
        Self {
            candidates: vec![SENTINEL_NONE.to_string()],
            selected: SENTINEL_NONE.to_string(),
            lookup: HashMap::new(),
            detail: None,
            status: StatusRecord::new(
                Stage::WaitingForInput {
                    id_source_found: false,
                    title_source_found: false,
                    id_count: 0,
                    title_count: 0,
                },
                "Supply candidate TMDB ids or titles",
            ),
            search_enabled: true,
        }
    }

    /// Gate-off reset: sentinel candidates/selection, lookup and detail
    /// cleared. The status record is written by the caller.
    pub(crate) fn clear_to_disabled(&mut self) {
        self.candidates = vec![SENTINEL_DISABLED.to_string()];
        self.selected = SENTINEL_DISABLED.to_string();
        self.lookup.clear();
        self.detail = None;
    }

    /// No-result reset: sentinel candidates/selection and no detail. The
    /// lookup is left to the caller, which replaces it per search.
    pub(crate) fn reset_to_none(&mut self) {
        self.candidates = vec![SENTINEL_NONE.to_string()];
        self.selected = SENTINEL_NONE.to_string();
        self.detail = None;
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            candidates: self.candidates.clone(),
            selected: self.selected.clone(),
            detail: self.detail.clone(),
            status: self.status.clone(),
            search_enabled: self.search_enabled,
        }
    }
}

/// Read-only copy of a session, safe to take from observer callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Candidate labels in order, or a single sentinel entry.
    pub candidates: Vec<String>,
    /// The currently selected label, possibly a sentinel.
    pub selected: String,
    /// Full record of the selected candidate, when one exists.
    pub detail: Option<Candidate>,
    pub status: StatusRecord,
    pub search_enabled: bool,
}

struct Observer {
    id: u64,
    callback: Arc<dyn Fn() + Send + Sync>,
}

/// One context's session: the guarded core, its catalogue cache, and the
/// registered observers.
pub struct SessionHandle {
    pub(crate) core: tokio::sync::Mutex<SessionCore>,
    pub(crate) cache: CatalogCache,
    observers: Mutex<Vec<Observer>>,
    next_observer_id: AtomicU64,
    published: RwLock<SessionSnapshot>,
}

impl SessionHandle {
    pub(crate) fn new(cache: CatalogCache) -> Self {
        let core = SessionCore::new();
        let published = RwLock::new(core.snapshot());
        Self {
            core: tokio::sync::Mutex::new(core),
            cache,
            observers: Mutex::new(Vec::new()),
            next_observer_id: AtomicU64::new(0),
            published,
        }
    }

    /// Refresh the published snapshot from the core, optionally firing the
    /// candidates-changed signal. Callbacks run synchronously; they may take
    /// snapshots but must not await bridge workflows.
    pub(crate) fn commit(&self, core: &SessionCore, notify: bool) {
        *self.published.write().unwrap() = core.snapshot();
        if notify {
            self.notify_observers();
        }
    }

    fn notify_observers(&self) {
        // Clone the callback list first so a callback may subscribe or drop
        // subscriptions without deadlocking.
        let callbacks: Vec<Arc<dyn Fn() + Send + Sync>> = self
            .observers
            .lock()
            .unwrap()
            .iter()
            .map(|o| o.callback.clone())
            .collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Latest published state of this session.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.published.read().unwrap().clone()
    }

    /// Register a change observer. The subscription unregisters on drop.
    pub fn subscribe(self: Arc<Self>, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.next_observer_id.fetch_add(1, Ordering::SeqCst);
        self.observers.lock().unwrap().push(Observer {
            id,
            callback: Arc::new(callback),
        });
        Subscription { handle: self, id }
    }

    fn remove_observer(&self, id: u64) {
        self.observers.lock().unwrap().retain(|o| o.id != id);
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }
}

/// Handle returned by [`SessionHandle::subscribe`]; dropping it removes the
/// observer.
pub struct Subscription {
    handle: Arc<SessionHandle>,
    id: u64,
}

impl Subscription {
    /// Explicitly remove the observer (equivalent to dropping the handle).
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.remove_observer(self.id);
    }
}

/// All sessions, keyed by context id.
///
/// `get_or_create` is the single construction site for per-context state;
/// every entry starts from the same defaults.
pub(crate) struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn get_or_create(
        &self,
        context_id: &str,
        make_cache: impl FnOnce() -> CatalogCache,
    ) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(context_id.to_string())
            .or_insert_with(|| Arc::new(SessionHandle::new(make_cache())))
            .clone()
    }
}
